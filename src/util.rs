// SPDX-FileCopyrightText: 2022 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
use sha2::{Digest, Sha512};

use crate::context::Ctx;
use crate::elgamal::{Ciphertext, PublicKey};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::IntoParallelIterator;
        use rayon::prelude::*;
        use std::iter::IntoIterator;


        pub trait Par<I: IntoIterator + IntoParallelIterator> {
            fn par(self) -> <I as rayon::iter::IntoParallelIterator>::Iter;
        }

        impl<I: IntoIterator + IntoParallelIterator> Par<I> for I {
            #[inline(always)]
            fn par(self) -> <I as rayon::iter::IntoParallelIterator>::Iter {
                self.into_par_iter()
            }
        }

    } else {
        pub trait Par<I: IntoIterator> {
            fn par(self) -> I::IntoIter;
        }

        impl<I: IntoIterator> Par<I> for I {
            #[inline(always)]
            fn par(self) -> I::IntoIter {
                self.into_iter()
            }
        }
    }
}

/// Left pads a minimal big-endian value to `len` bytes.
///
/// Returns `None` if the value does not fit.
pub(crate) fn to_fixed_be(bytes: &[u8], len: usize) -> Option<Vec<u8>> {
    if bytes.len() > len {
        return None;
    }
    let mut ret = vec![0u8; len - bytes.len()];
    ret.extend_from_slice(bytes);

    Some(ret)
}

/// Encryptions of random elements, used for benchmarks.
pub fn random_ciphertexts<C: Ctx>(n: usize, pk: &PublicKey<C>) -> Vec<Ciphertext<C>> {
    (0..n)
        .par()
        .map(|_| pk.encrypt_block(&pk.ctx().rnd_element()))
        .collect()
}

pub const HASH_LENGTH_BYTES: usize = 64;

pub fn hash(bytes: &[u8]) -> Vec<u8> {
    let mut hasher = hasher();
    hasher.update(bytes);
    hasher.finalize().to_vec()
}
pub fn hasher() -> Sha512 {
    Sha512::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::num_bigint::BigintCtx;
    use crate::backend::tests::fixture_keypair;

    #[test]
    fn test_fixed_be() {
        assert_eq!(to_fixed_be(&[1, 2], 4), Some(vec![0, 0, 1, 2]));
        assert_eq!(to_fixed_be(&[], 2), Some(vec![0, 0]));
        assert_eq!(to_fixed_be(&[1, 2, 3], 2), None);
    }

    #[test]
    fn test_random_ciphertexts() {
        let kp = fixture_keypair::<BigintCtx>();
        let cs = random_ciphertexts(5, kp.public());
        assert_eq!(cs.len(), 5);
        for c in cs.iter() {
            assert!(kp.private().unwrap().decrypt_block(c).is_ok());
        }
    }

    #[test]
    fn test_hash() {
        assert_eq!(hash(b"abc").len(), HASH_LENGTH_BYTES);
        assert_eq!(hash(b"abc"), hash(b"abc"));
        assert_ne!(hash(b"abc"), hash(b"abd"));
    }
}
