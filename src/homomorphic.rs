// SPDX-FileCopyrightText: 2023 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! Multiplicative homomorphism of ElGamal ciphertexts.
//!
//! (m1 * h^r1, g^r1) * (m2 * h^r2, g^r2) = (m1 * m2 * h^(r1 + r2), g^(r1 + r2))
//!
//! The product of the decrypted blocks is taken modulo p. It only carries
//! meaning for the padded plaintext under `LeadingZeros`, where the block
//! value is the chunk itself, and as long as the product stays below p.
use std::ops::Mul;

use crate::context::{Ctx, Element};
use crate::elgamal::Ciphertext;
use crate::error::{ElGamalError, Result};
use crate::util::Par;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Componentwise product of two ciphertexts under the same modulus.
pub fn multiply<C: Ctx>(a: &Ciphertext<C>, b: &Ciphertext<C>) -> Result<Ciphertext<C>> {
    if a.ctx.modulus() != b.ctx.modulus() {
        return Err(ElGamalError::IncompatibleCiphertext(
            "ciphertexts were produced under different moduli".to_string(),
        ));
    }
    let ctx = &a.ctx;

    Ok(Ciphertext {
        mhr: a.mhr.mulp(&b.mhr, ctx),
        gr: a.gr.mulp(&b.gr, ctx),
        ctx: ctx.clone(),
    })
}

/// Multiplies two equally long ciphertext sequences element by element.
pub fn multiply_pairwise<C: Ctx>(
    a: &[Ciphertext<C>],
    b: &[Ciphertext<C>],
) -> Result<Vec<Ciphertext<C>>> {
    if a.len() != b.len() {
        return Err(ElGamalError::IncompatibleCiphertext(format!(
            "sequences of {} and {} ciphertexts",
            a.len(),
            b.len()
        )));
    }
    let pairs: Vec<(&Ciphertext<C>, &Ciphertext<C>)> = a.iter().zip(b.iter()).collect();

    pairs.par().map(|(x, y)| multiply(x, y)).collect()
}

impl<C: Ctx> Ciphertext<C> {
    pub fn mul(&self, other: &Ciphertext<C>) -> Result<Ciphertext<C>> {
        multiply(self, other)
    }
}

impl<'a, C: Ctx> Mul<&'a Ciphertext<C>> for &'a Ciphertext<C> {
    type Output = Result<Ciphertext<C>>;

    fn mul(self, other: &'a Ciphertext<C>) -> Self::Output {
        multiply(self, other)
    }
}
