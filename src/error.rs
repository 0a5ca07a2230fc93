// SPDX-FileCopyrightText: 2023 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
use thiserror::Error;

/// Error type for all fallible operations in this crate.
///
/// Every variant is surfaced to the caller as is, nothing is corrected
/// silently. A signature that fails to verify is not an error, see
/// [`crate::elgamal::PublicKey::verify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElGamalError {
    /// The bounded search for a safe prime ran out of candidates.
    #[error("Failed to generate parameters: {0}")]
    ParameterGeneration(String),

    /// Imported or constructed parameters are inconsistent or degenerate.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A chunk or block does not fit below the modulus.
    #[error("Block too large: {0}")]
    BlockTooLarge(String),

    /// Padding recovered during decoding is malformed.
    #[error("Padding error: {0}")]
    Padding(String),

    /// A ciphertext cannot be decrypted under this key.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// No suitable ephemeral exponent within the retry budget.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Ciphertexts under different moduli, or sequences of different length.
    #[error("Incompatible ciphertexts: {0}")]
    IncompatibleCiphertext(String),

    /// Decrypting, signing or exporting x on a public only key.
    #[error("Operation requires the private exponent")]
    MissingPrivateKey,

    /// Malformed byte encoding of a ciphertext, signature or parameters.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ElGamalError>;
