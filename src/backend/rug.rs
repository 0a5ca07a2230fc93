// SPDX-FileCopyrightText: 2022 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! GMP backed arithmetic, a drop in replacement for
//! [`crate::backend::num_bigint`].
//!
//! # Examples
//!
//! ```
//! use elgamal_ext::context::{Ctx, Element};
//! use elgamal_ext::backend::rug::RugCtx;
//! let ctx = RugCtx::generate(128).unwrap();
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
use rand::RngCore;
use rug::{
    integer::{IsPrime, Order},
    rand::{RandGen, RandState},
    Integer,
};

use crate::backend::constants::*;
use crate::context::{Ctx, Element, Exponent};
use crate::error::{ElGamalError, Result};
use crate::rnd::StrandRng;

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct IntegerE(pub Integer);
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct IntegerX(pub Integer);

#[derive(Eq, PartialEq, Debug)]
struct RugParams {
    generator: IntegerE,
    modulus: IntegerE,
    exp_modulus: IntegerX,
    bits: u64,
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub struct RugCtx {
    params: Arc<RugParams>,
}

impl RugCtx {
    pub fn from_integer(modulus: Integer, generator: Integer) -> Result<RugCtx> {
        let bits = u64::from(modulus.significant_bits());
        if bits < MIN_MODULUS_BITS {
            return Err(ElGamalError::InvalidParameter(format!(
                "modulus has {} bits, at least {} required",
                bits, MIN_MODULUS_BITS
            )));
        }
        if modulus.is_probably_prime(MILLER_RABIN_ROUNDS as u32) == IsPrime::No {
            return Err(ElGamalError::InvalidParameter(
                "modulus is not prime".to_string(),
            ));
        }
        let p_minus_one = Integer::from(&modulus - 1u32);
        // with q prime, every g in [2, p - 1) has order q or 2q
        let q = Integer::from(&p_minus_one >> 1u32);
        if q.is_probably_prime(MILLER_RABIN_ROUNDS as u32) == IsPrime::No {
            return Err(ElGamalError::InvalidParameter(
                "modulus is not a safe prime, (p - 1) / 2 is composite".to_string(),
            ));
        }
        if generator < 2 || generator >= p_minus_one {
            return Err(ElGamalError::InvalidParameter(
                "generator must satisfy 2 <= g < p - 1".to_string(),
            ));
        }

        Ok(RugCtx::new_unchecked(modulus, generator))
    }

    fn new_unchecked(modulus: Integer, generator: Integer) -> RugCtx {
        let exp_modulus = Integer::from(&modulus - 1u32);
        let params = RugParams {
            bits: u64::from(modulus.significant_bits()),
            generator: IntegerE(generator),
            modulus: IntegerE(modulus),
            exp_modulus: IntegerX(exp_modulus),
        };

        RugCtx {
            params: Arc::new(params),
        }
    }
}

struct StrandRandgen(StrandRng);

impl RandGen for StrandRandgen {
    fn gen(&mut self) -> u32 {
        self.0.next_u32()
    }
}

/// Uniform in `[low, high)`.
fn random_range(low: &Integer, high: &Integer) -> Integer {
    let mut gen = StrandRandgen(StrandRng);
    let mut state = RandState::new_custom(&mut gen);
    let width = Integer::from(high - low);

    width.random_below(&mut state) + low
}

/// Finds a safe prime p = 2q + 1 with exactly `bits` bits, trying at most
/// `max_trials` candidates.
fn safe_prime_within(bits: u64, max_trials: u64) -> Result<Integer> {
    let low = Integer::from(1) << (bits - 2) as u32;
    let high = Integer::from(1) << (bits - 1) as u32;
    let reps = MILLER_RABIN_ROUNDS as u32;

    for trial in 0..max_trials {
        let mut q = random_range(&low, &high);
        q.set_bit(0, true);
        let p = Integer::from(&q << 1u32) + 1u32;

        if q.is_probably_prime(reps) != IsPrime::No && p.is_probably_prime(reps) != IsPrime::No {
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

impl Ctx for RugCtx {
    type E = IntegerE;
    type X = IntegerX;

    fn new(modulus: &[u8], generator: &[u8]) -> Result<Self> {
        RugCtx::from_integer(
            Integer::from_digits(modulus, Order::Msf),
            Integer::from_digits(generator, Order::Msf),
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
        let h = random_range(&Integer::from(2), &Integer::from(&p - 1u32));
        let g = Integer::from(&h * &h) % &p;

        Ok(RugCtx::new_unchecked(p, g))
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
        Element::<RugCtx>::mod_pow(self.generator(), exponent, self.modulus())
    }
    #[inline(always)]
    fn emod_pow(&self, base: &Self::E, exponent: &Self::X) -> Self::E {
        Element::<RugCtx>::mod_pow(base, exponent, self.modulus())
    }
    #[inline(always)]
    fn rnd_exp(&self) -> Self::X {
        IntegerX(random_range(&Integer::from(1), &self.exp_modulus().0))
    }
    #[inline(always)]
    fn rnd_element(&self) -> Self::E {
        IntegerE(random_range(&Integer::from(1), &self.modulus().0))
    }
    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Self::E> {
        let value = Integer::from_digits(bytes, Order::Msf);
        if value >= self.modulus().0 {
            Err(ElGamalError::BlockTooLarge(
                "value is not below the modulus".to_string(),
            ))
        } else {
            Ok(IntegerE(value))
        }
    }
    fn exp_from_bytes(&self, bytes: &[u8]) -> Result<Self::X> {
        let value = Integer::from_digits(bytes, Order::Msf);
        if value >= self.exp_modulus().0 {
            Err(ElGamalError::InvalidParameter(
                "exponent is not below p - 1".to_string(),
            ))
        } else {
            Ok(IntegerX(value))
        }
    }
    fn exp_from_digest(&self, digest: &[u8]) -> Self::X {
        let value = Integer::from_digits(digest, Order::Msf);
        IntegerX(value % &self.exp_modulus().0)
    }
    fn exp_from_element(&self, element: &Self::E) -> Self::X {
        IntegerX(Integer::from(&element.0 % &self.exp_modulus().0))
    }
    fn element_from_u64(&self, value: u64) -> Self::E {
        IntegerE(Integer::from(value) % &self.modulus().0)
    }
}

// All values handled here are non negative, so truncating remainders are
// already reduced.
impl Element<RugCtx> for IntegerE {
    #[inline(always)]
    fn mul(&self, other: &Self) -> Self {
        IntegerE(Integer::from(&self.0 * &other.0))
    }
    #[inline(always)]
    fn div(&self, other: &Self, modulus: &Self) -> Result<Self> {
        let inverse = Element::<RugCtx>::inv(other, modulus).ok_or_else(|| {
            ElGamalError::Decryption("element has no inverse modulo p".to_string())
        })?;
        Ok(IntegerE(Integer::from(&self.0 * &inverse.0)))
    }
    #[inline(always)]
    fn inv(&self, modulus: &Self) -> Option<Self> {
        self.0.clone().invert(&modulus.0).ok().map(IntegerE)
    }
    #[inline(always)]
    fn mod_pow(&self, other: &IntegerX, modulus: &Self) -> Self {
        // non negative exponents always have a result
        let ret = self.0.clone().pow_mod(&other.0, &modulus.0);
        IntegerE(ret.unwrap_or_default())
    }
    #[inline(always)]
    fn modulo(&self, modulus: &Self) -> Self {
        IntegerE(Integer::from(&self.0 % &modulus.0))
    }
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
    fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_digits::<u8>(Order::Msf)
    }
}

impl Exponent<RugCtx> for IntegerX {
    #[inline(always)]
    fn add(&self, other: &Self) -> Self {
        IntegerX(Integer::from(&self.0 + &other.0))
    }
    #[inline(always)]
    fn sub(&self, other: &Self, modulus: &Self) -> Self {
        let diff = Integer::from(&self.0 - &other.0);
        let (_, rem) = diff.div_rem_euc(modulus.0.clone());
        IntegerX(rem)
    }
    #[inline(always)]
    fn mul(&self, other: &Self) -> Self {
        IntegerX(Integer::from(&self.0 * &other.0))
    }
    #[inline(always)]
    fn inv(&self, modulus: &Self) -> Option<Self> {
        self.0.clone().invert(&modulus.0).ok().map(IntegerX)
    }
    #[inline(always)]
    fn modulo(&self, modulus: &Self) -> Self {
        IntegerX(Integer::from(&self.0 % &modulus.0))
    }
    fn is_coprime(&self, modulus: &Self) -> bool {
        self.0.clone().gcd(&modulus.0) == 1
    }
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
    fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_digits::<u8>(Order::Msf)
    }
}
