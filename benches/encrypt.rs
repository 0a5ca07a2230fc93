// SPDX-FileCopyrightText: 2022 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use rand::rngs::OsRng;
use rand::RngCore;

use elgamal_ext::backend::num_bigint::BigintCtx;
use elgamal_ext::context::Ctx;
use elgamal_ext::elgamal::*;
use elgamal_ext::homomorphic;
use elgamal_ext::padding::PaddingMode;
use elgamal_ext::params::ElGamalParameters;
use elgamal_ext::util;

const P512_HEX: &str = "cdbdecb14f7f4122c2dd759c2f15818521d7e4bc6ab68ce108894a96030076248a2cf7e16b0367c7f86869e8c5138c042670e7cceaa0bb9fae65ed471af3d997";

fn keypair<C: Ctx>() -> KeyPair<C> {
    let p = hex::decode(P512_HEX).unwrap();
    let params = ElGamalParameters::new(p, vec![2], vec![32], Some(vec![5]));
    KeyPair::import(&params).unwrap()
}

fn round_trip<C: Ctx>(kp: &KeyPair<C>, data: &[u8], mode: PaddingMode) {
    let cs = kp.encrypt_all(data, mode).unwrap();
    let _plaintext = kp.decrypt(&cs, mode).unwrap();
}

fn multiply<C: Ctx>(a: &[Ciphertext<C>], b: &[Ciphertext<C>]) {
    let _product = homomorphic::multiply_pairwise(a, b).unwrap();
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rug")] {
        use elgamal_ext::backend::rug::RugCtx;
    }
}

fn bench_encrypt(c: &mut Criterion) {
    let bkp = keypair::<BigintCtx>();
    cfg_if::cfg_if! {
        if #[cfg(feature = "rug")] {
            let gkp = keypair::<RugCtx>();
        }
    }

    let mut group = c.benchmark_group("encrypt");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);

    for n in [1024usize].iter() {
        let mut data = vec![0u8; *n];
        OsRng.fill_bytes(&mut data);

        for mode in [PaddingMode::ANSIX923, PaddingMode::LeadingZeros] {
            group.bench_with_input(BenchmarkId::new(format!("bigint {}", mode), n), n, |b, _| {
                b.iter(|| round_trip(&bkp, &data, mode))
            });
            #[cfg(feature = "rug")]
            group.bench_with_input(BenchmarkId::new(format!("rug {}", mode), n), n, |b, _| {
                b.iter(|| round_trip(&gkp, &data, mode))
            });
        }

        let a = util::random_ciphertexts(*n / 16, bkp.public());
        let b = util::random_ciphertexts(*n / 16, bkp.public());
        group.bench_with_input(BenchmarkId::new("bigint multiply", n), n, |bench, _| {
            bench.iter(|| multiply(&a, &b))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encrypt);
criterion_main!(benches);
