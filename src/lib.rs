// SPDX-FileCopyrightText: 2021 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only

#![doc = include_str!("../README.md")]

extern crate cfg_if;

/// Prime field backends, num_bigint and optionally rug.
pub mod backend;
/// Defines a generic interface to concrete backends.
pub mod context;
/// ElGamal encryption.
pub mod elgamal;
/// Error type shared by all modules.
pub mod error;
/// Multiplication of ciphertexts.
pub mod homomorphic;
/// Block padding modes.
pub mod padding;
/// Import and export of key parameters.
pub mod params;
/// Borsh frontend and ciphertext byte sequences.
pub mod serialization;
/// ElGamal signatures.
pub mod signature;
/// Miscellaneous functions.
pub mod util;

mod rnd;

pub use error::{ElGamalError, Result};
