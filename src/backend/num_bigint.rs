// SPDX-FileCopyrightText: 2022 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! # Examples
//!
//! ```
//! // This example shows how to obtain a context to use the num_bigint backend.
//! use elgamal_ext::context::{Ctx, Element};
//! use elgamal_ext::backend::num_bigint::BigintCtx;
//! let ctx = BigintCtx::generate(128).unwrap();
//! // do some stuff..
//! let g = ctx.generator();
//! let m = ctx.modulus();
//! let a = ctx.rnd_exp();
//! let b = ctx.rnd_exp();
//! let g_ab = g.mod_pow(&a, &m).mod_pow(&b, &m);
//! let g_ba = g.mod_pow(&b, &m).mod_pow(&a, &m);
//! assert_eq!(g_ab, g_ba);
//! ```
use std::sync::Arc;

use log::{debug, trace, warn};
use num_bigint::BigUint;
use num_bigint::RandBigInt;
use num_integer::Integer;
use num_modular::ModularUnaryOps;
use num_traits::{One, Zero};

use crate::backend::constants::*;
use crate::context::{Ctx, Element, Exponent};
use crate::error::{ElGamalError, Result};
use crate::rnd::StrandRng;

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct BigUintE(pub BigUint);
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct BigUintX(pub BigUint);

#[derive(Eq, PartialEq, Debug)]
struct BigintParams {
    generator: BigUintE,
    modulus: BigUintE,
    exp_modulus: BigUintX,
    bits: u64,
}

/// Prime field context, p and g are shared between clones.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct BigintCtx {
    params: Arc<BigintParams>,
}

impl BigintCtx {
    pub fn from_biguint(modulus: BigUint, generator: BigUint) -> Result<BigintCtx> {
        let bits = modulus.bits();
        if bits < MIN_MODULUS_BITS {
            return Err(ElGamalError::InvalidParameter(format!(
                "modulus has {} bits, at least {} required",
                bits, MIN_MODULUS_BITS
            )));
        }
        if !is_probable_prime(&modulus, MILLER_RABIN_ROUNDS) {
            return Err(ElGamalError::InvalidParameter(
                "modulus is not prime".to_string(),
            ));
        }
        let p_minus_one = &modulus - 1u32;
        // with q prime, every g in [2, p - 1) has order q or 2q
        let q: BigUint = &p_minus_one >> 1u32;
        if !is_probable_prime(&q, MILLER_RABIN_ROUNDS) {
            return Err(ElGamalError::InvalidParameter(
                "modulus is not a safe prime, (p - 1) / 2 is composite".to_string(),
            ));
        }
        if generator < BigUint::from(2u32) || generator >= p_minus_one {
            return Err(ElGamalError::InvalidParameter(
                "generator must satisfy 2 <= g < p - 1".to_string(),
            ));
        }

        Ok(BigintCtx::new_unchecked(modulus, generator))
    }

    fn new_unchecked(modulus: BigUint, generator: BigUint) -> BigintCtx {
        let exp_modulus = &modulus - 1u32;
        let params = BigintParams {
            bits: modulus.bits(),
            generator: BigUintE(generator),
            modulus: BigUintE(modulus),
            exp_modulus: BigUintX(exp_modulus),
        };

        BigintCtx {
            params: Arc::new(params),
        }
    }
}

impl Ctx for BigintCtx {
    type E = BigUintE;
    type X = BigUintX;

    fn new(modulus: &[u8], generator: &[u8]) -> Result<Self> {
        BigintCtx::from_biguint(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(generator),
        )
    }
    fn generate(bits: u64) -> Result<Self> {
        if bits < MIN_MODULUS_BITS {
            return Err(ElGamalError::InvalidParameter(format!(
                "requested {} bits, at least {} required",
                bits, MIN_MODULUS_BITS
            )));
        }
        let p = safe_prime_within(bits, bits * bits * PRIME_TRIALS_FACTOR)?;

        // squares of [2, p - 2] are exactly the quadratic residues other
        // than 1, all of them generate the subgroup of order q
        let mut gen = StrandRng;
        let two = BigUint::from(2u32);
        let h = gen.gen_biguint_range(&two, &(&p - 1u32));
        let g = h.modpow(&two, &p);

        Ok(BigintCtx::new_unchecked(p, g))
    }

    #[inline(always)]
    fn generator(&self) -> &Self::E {
        &self.params.generator
    }
    #[inline(always)]
    fn modulus(&self) -> &Self::E {
        &self.params.modulus
    }
    #[inline(always)]
    fn exp_modulus(&self) -> &Self::X {
        &self.params.exp_modulus
    }
    #[inline(always)]
    fn modulus_bits(&self) -> u64 {
        self.params.bits
    }
    #[inline(always)]
    fn gmod_pow(&self, exponent: &Self::X) -> Self::E {
        BigUintE(self.generator().0.modpow(&exponent.0, &self.modulus().0))
    }
    #[inline(always)]
    fn emod_pow(&self, base: &Self::E, exponent: &Self::X) -> Self::E {
        BigUintE(base.0.modpow(&exponent.0, &self.modulus().0))
    }
    #[inline(always)]
    fn rnd_exp(&self) -> Self::X {
        let mut gen = StrandRng;
        BigUintX(gen.gen_biguint_range(&BigUint::one(), &self.exp_modulus().0))
    }
    #[inline(always)]
    fn rnd_element(&self) -> Self::E {
        let mut gen = StrandRng;
        BigUintE(gen.gen_biguint_range(&BigUint::one(), &self.modulus().0))
    }
    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Self::E> {
        let value = BigUint::from_bytes_be(bytes);
        if value >= self.modulus().0 {
            Err(ElGamalError::BlockTooLarge(
                "value is not below the modulus".to_string(),
            ))
        } else {
            Ok(BigUintE(value))
        }
    }
    fn exp_from_bytes(&self, bytes: &[u8]) -> Result<Self::X> {
        let value = BigUint::from_bytes_be(bytes);
        if value >= self.exp_modulus().0 {
            Err(ElGamalError::InvalidParameter(
                "exponent is not below p - 1".to_string(),
            ))
        } else {
            Ok(BigUintX(value))
        }
    }
    fn exp_from_digest(&self, digest: &[u8]) -> Self::X {
        let num = BigUint::from_bytes_be(digest);
        BigUintX(num.mod_floor(&self.exp_modulus().0))
    }
    fn exp_from_element(&self, element: &Self::E) -> Self::X {
        BigUintX(element.0.mod_floor(&self.exp_modulus().0))
    }
    fn element_from_u64(&self, value: u64) -> Self::E {
        BigUintE(BigUint::from(value).mod_floor(&self.modulus().0))
    }
}

impl Element<BigintCtx> for BigUintE {
    #[inline(always)]
    fn mul(&self, other: &Self) -> Self {
        BigUintE(&self.0 * &other.0)
    }
    #[inline(always)]
    fn div(&self, other: &Self, modulus: &Self) -> Result<Self> {
        let inverse = Element::<BigintCtx>::inv(other, modulus).ok_or_else(|| {
            ElGamalError::Decryption("element has no inverse modulo p".to_string())
        })?;
        Ok(BigUintE(&self.0 * inverse.0))
    }
    #[inline(always)]
    fn inv(&self, modulus: &Self) -> Option<Self> {
        if self.0.is_zero() {
            return None;
        }
        (&self.0).invm(&modulus.0).map(BigUintE)
    }
    #[inline(always)]
    fn mod_pow(&self, other: &BigUintX, modulus: &Self) -> Self {
        BigUintE(self.0.modpow(&other.0, &modulus.0))
    }
    #[inline(always)]
    fn modulo(&self, modulus: &Self) -> Self {
        BigUintE(self.0.mod_floor(&modulus.0))
    }
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    fn to_bytes_be(&self) -> Vec<u8> {
        if self.0.is_zero() {
            vec![]
        } else {
            self.0.to_bytes_be()
        }
    }
}

impl Exponent<BigintCtx> for BigUintX {
    #[inline(always)]
    fn add(&self, other: &Self) -> Self {
        BigUintX(&self.0 + &other.0)
    }
    #[inline(always)]
    fn sub(&self, other: &Self, modulus: &Self) -> Self {
        let a = self.0.mod_floor(&modulus.0);
        let b = other.0.mod_floor(&modulus.0);
        if a >= b {
            BigUintX(a - b)
        } else {
            BigUintX(a + &modulus.0 - b)
        }
    }
    #[inline(always)]
    fn mul(&self, other: &Self) -> Self {
        BigUintX(&self.0 * &other.0)
    }
    #[inline(always)]
    fn inv(&self, modulus: &Self) -> Option<Self> {
        if self.0.is_zero() {
            return None;
        }
        (&self.0).invm(&modulus.0).map(BigUintX)
    }
    #[inline(always)]
    fn modulo(&self, modulus: &Self) -> Self {
        BigUintX(self.0.mod_floor(&modulus.0))
    }
    fn is_coprime(&self, modulus: &Self) -> bool {
        self.0.gcd(&modulus.0).is_one()
    }
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    fn to_bytes_be(&self) -> Vec<u8> {
        if self.0.is_zero() {
            vec![]
        } else {
            self.0.to_bytes_be()
        }
    }
}

/// True if `n` is divisible by one of the sieve primes other than itself.
fn has_small_factor(n: &BigUint) -> bool {
    SIEVE_PRIMES.iter().any(|&prime| {
        let prime = BigUint::from(prime);
        n != &prime && (n % &prime).is_zero()
    })
}

/// Miller-Rabin with random bases.
pub(crate) fn is_probable_prime(n: &BigUint, rounds: usize) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if n.is_even() || has_small_factor(n) {
        return false;
    }
    // everything below the largest sieve prime that survived is prime
    if n <= &BigUint::from(SIEVE_PRIMES[SIEVE_PRIMES.len() - 1]) {
        return true;
    }

    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;
    let mut gen = StrandRng;

    'witness: for _ in 0..rounds {
        let a = gen.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Finds a safe prime p = 2q + 1 with exactly `bits` bits.
///
/// Gives up after `max_trials` candidates.
fn safe_prime_within(bits: u64, max_trials: u64) -> Result<BigUint> {
    let one = BigUint::one();
    let top = &one << (bits - 2);
    let mut gen = StrandRng;

    for trial in 0..max_trials {
        let mut q = gen.gen_biguint(bits - 1);
        q |= &top;
        q |= &one;
        let p: BigUint = (&q << 1u32) | &one;

        if has_small_factor(&q) || has_small_factor(&p) {
            continue;
        }
        if is_probable_prime(&q, MILLER_RABIN_ROUNDS)
            && is_probable_prime(&p, MILLER_RABIN_ROUNDS)
        {
            debug!("found {} bit safe prime after {} candidates", bits, trial + 1);
            return Ok(p);
        }
        trace!("candidate {} rejected by primality test", trial + 1);
    }

    warn!("no {} bit safe prime within {} candidates", bits, max_trials);
    Err(ElGamalError::ParameterGeneration(format!(
        "no {} bit safe prime found within {} candidates",
        bits, max_trials
    )))
}

#[cfg(test)]
mod tests {
    use crate::backend::num_bigint::*;
    use crate::backend::tests::*;

    #[test]
    fn test_block() {
        test_block_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_elgamal() {
        test_elgamal_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_elgamal_zero_bytes() {
        test_elgamal_zero_bytes_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_homomorphic() {
        test_homomorphic_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_signature() {
        test_signature_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_import_validation() {
        test_import_validation_generic::<BigintCtx>();
    }

    #[test]
    fn test_ephemeral_uniqueness() {
        test_ephemeral_uniqueness_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_scenario() {
        test_scenario_generic(&fixture_keypair::<BigintCtx>());
    }

    #[test]
    fn test_keygen() {
        test_keygen_generic::<BigintCtx>();
    }

    #[test]
    fn test_primality() {
        let primes = [2u64, 3, 997, 1009, 7919, 2147483647, 18446744073709551557];
        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p), 20), "{}", p);
        }
        // 561 and 41041 are Carmichael numbers
        let composites = [0u64, 1, 4, 561, 1_000_000, 41041, 2147483649, 18446744073709551615];
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), 20), "{}", c);
        }
    }

    #[test]
    fn test_safe_prime() {
        let p = safe_prime_within(96, 96 * 96 * PRIME_TRIALS_FACTOR).unwrap();
        assert_eq!(p.bits(), 96);
        let q: BigUint = (&p - 1u32) >> 1u32;
        assert!(is_probable_prime(&q, 20));
    }

    #[test]
    fn test_safe_prime_budget() {
        match safe_prime_within(96, 0) {
            Err(ElGamalError::ParameterGeneration(_)) => {}
            other => panic!("expected ParameterGeneration, got {:?}", other),
        }
    }

    #[test]
    fn test_small_order_generator() {
        test_small_order_generator_generic::<BigintCtx>();
    }

    #[test]
    fn test_exponent_sub() {
        let m = BigUintX(BigUint::from(10u32));
        let a = BigUintX(BigUint::from(3u32));
        let b = BigUintX(BigUint::from(7u32));
        assert_eq!(a.sub(&b, &m), BigUintX(BigUint::from(6u32)));
        assert_eq!(b.sub(&a, &m), BigUintX(BigUint::from(4u32)));
    }

    #[test]
    fn test_zero_has_no_inverse() {
        let kp = fixture_keypair::<BigintCtx>();
        let ctx = kp.public().ctx();
        let zero = ctx.element_from_u64(0);
        assert!(Element::<BigintCtx>::inv(&zero, ctx.modulus()).is_none());
        assert!(zero.to_bytes_be().is_empty());
    }

    #[test]
    fn test_element_range() {
        let kp = fixture_keypair::<BigintCtx>();
        let ctx = kp.public().ctx();
        let p_bytes = ctx.modulus().0.to_bytes_be();
        assert!(ctx.element_from_bytes(&p_bytes).is_err());

        let p_minus_one = (&ctx.modulus().0 - 1u32).to_bytes_be();
        assert!(ctx.element_from_bytes(&p_minus_one).is_ok());
        assert!(ctx.exp_from_bytes(&p_minus_one).is_err());
    }
}
