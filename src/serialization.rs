// SPDX-FileCopyrightText: 2023 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only

use borsh::{BorshDeserialize, BorshSerialize};

use crate::context::Ctx;
use crate::elgamal::Ciphertext;
use crate::error::{ElGamalError, Result};

use crate::util::Par;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Serialization frontend trait.
pub trait StrandSerialize {
    fn strand_serialize(&self) -> Result<Vec<u8>>;
}

/// Deserialization frontend trait.
pub trait StrandDeserialize {
    fn strand_deserialize(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

impl<T: BorshSerialize> StrandSerialize for T {
    fn strand_serialize(&self) -> Result<Vec<u8>> {
        self.try_to_vec()
            .map_err(|e| ElGamalError::Serialization(e.to_string()))
    }
}

impl<T: BorshDeserialize> StrandDeserialize for T {
    fn strand_deserialize(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        T::try_from_slice(bytes).map_err(|e| ElGamalError::Serialization(e.to_string()))
    }
}

/// Concatenates the fixed width encodings of `ciphertexts`, see
/// [`Ciphertext::to_bytes`].
pub fn ciphertexts_to_bytes<C: Ctx>(ciphertexts: &[Ciphertext<C>]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = ciphertexts.par().map(|c| c.to_bytes()).collect();

    encoded.concat()
}

/// Splits a concatenation of ciphertexts under `ctx`.
pub fn ciphertexts_from_bytes<C: Ctx>(bytes: &[u8], ctx: &C) -> Result<Vec<Ciphertext<C>>> {
    let width = 2 * ctx.byte_len();
    if bytes.len() % width != 0 {
        return Err(ElGamalError::Serialization(format!(
            "{} bytes is not a multiple of the ciphertext width {}",
            bytes.len(),
            width
        )));
    }
    let chunks: Vec<&[u8]> = bytes.chunks(width).collect();

    chunks
        .par()
        .map(|chunk| Ciphertext::from_bytes(chunk, ctx))
        .collect()
}
