// SPDX-FileCopyrightText: 2022 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
use std::fmt::Debug;
use std::marker::{Send, Sync};

use crate::error::Result;

/// Arithmetic context for a prime field, holding the modulus p and the
/// generator g.
///
/// Elements ([`Ctx::E`]) live in `[0, p)`, exponents ([`Ctx::X`]) are reduced
/// modulo `p - 1`, the order of the multiplicative group.
///
/// Cloning a context is cheap, implementations share their parameters.
pub trait Ctx: Send + Sync + Sized + Clone + Eq + Debug {
    type E: Element<Self>;
    type X: Exponent<Self>;

    /// Builds a context from a modulus and a generator, checking that the
    /// modulus is a probable prime of sufficient size and that the
    /// generator is not degenerate.
    fn new(modulus: &[u8], generator: &[u8]) -> Result<Self>;
    /// Finds a fresh safe prime p = 2q + 1 of exactly `bits` bits and a
    /// generator of the order q subgroup.
    fn generate(bits: u64) -> Result<Self>;

    fn generator(&self) -> &Self::E;
    fn modulus(&self) -> &Self::E;
    fn exp_modulus(&self) -> &Self::X;
    fn modulus_bits(&self) -> u64;

    fn gmod_pow(&self, exponent: &Self::X) -> Self::E;
    fn emod_pow(&self, base: &Self::E, exponent: &Self::X) -> Self::E;

    /// Uniform in `[1, p - 1)`.
    fn rnd_exp(&self) -> Self::X;
    /// Uniform in `[1, p)`.
    fn rnd_element(&self) -> Self::E;

    /// Reads a big-endian element, which must be strictly below p.
    fn element_from_bytes(&self, bytes: &[u8]) -> Result<Self::E>;
    /// Reads a big-endian exponent, which must be strictly below p - 1.
    fn exp_from_bytes(&self, bytes: &[u8]) -> Result<Self::X>;
    /// Interprets a big-endian digest as an exponent, reducing modulo p - 1.
    fn exp_from_digest(&self, digest: &[u8]) -> Self::X;
    /// Reduces an element modulo p - 1.
    fn exp_from_element(&self, element: &Self::E) -> Self::X;
    fn element_from_u64(&self, value: u64) -> Self::E;

    /// Byte length of the modulus, the width of every fixed size encoding.
    fn byte_len(&self) -> usize {
        ((self.modulus_bits() + 7) / 8) as usize
    }
}

pub trait Element<C: Ctx>: Clone + Eq + Ord + Send + Sync + Debug {
    fn mul(&self, other: &C::E) -> C::E;
    /// Fails if `other` has no inverse modulo `modulus`.
    fn div(&self, other: &C::E, modulus: &C::E) -> Result<C::E>;
    fn inv(&self, modulus: &C::E) -> Option<C::E>;
    fn mod_pow(&self, exp: &C::X, modulus: &C::E) -> C::E;
    fn modulo(&self, modulus: &C::E) -> C::E;
    fn is_zero(&self) -> bool;

    /// Minimal big-endian representation, empty for zero.
    fn to_bytes_be(&self) -> Vec<u8>;

    #[inline(always)]
    fn modp(&self, ctx: &C) -> C::E {
        self.modulo(ctx.modulus())
    }
    #[inline(always)]
    fn mulp(&self, other: &C::E, ctx: &C) -> C::E {
        self.mul(other).modp(ctx)
    }
    #[inline(always)]
    fn divp(&self, other: &C::E, ctx: &C) -> Result<C::E> {
        Ok(self.div(other, ctx.modulus())?.modp(ctx))
    }
}

pub trait Exponent<C: Ctx>: Clone + Eq + Ord + Send + Sync + Debug {
    fn add(&self, other: &C::X) -> C::X;
    /// Modular subtraction, `self - other mod modulus`.
    fn sub(&self, other: &C::X, modulus: &C::X) -> C::X;
    fn mul(&self, other: &C::X) -> C::X;
    fn inv(&self, modulus: &C::X) -> Option<C::X>;
    fn modulo(&self, modulus: &C::X) -> C::X;
    fn is_coprime(&self, modulus: &C::X) -> bool;
    fn is_zero(&self) -> bool;

    fn to_bytes_be(&self) -> Vec<u8>;
}
