// SPDX-FileCopyrightText: 2023 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! Reversible mapping between plaintext chunks and fixed size blocks whose
//! big-endian value is a field element.
//!
//! A block has [`Padding::capacity`] bytes, which is always strictly fewer
//! bits than the modulus, so every block value is below p. The mode is an
//! explicit argument everywhere, a block must be decoded with the mode that
//! encoded it.
//!
//! # Examples
//!
//! ```
//! use elgamal_ext::padding::{Padding, PaddingMode};
//!
//! let padding = Padding::new(PaddingMode::ANSIX923, 512).unwrap();
//! let block = padding.encode(b"hello").unwrap();
//! assert_eq!(block.len(), padding.capacity());
//! assert_eq!(padding.decode(&block, None).unwrap(), b"hello".to_vec());
//! ```
use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{ElGamalError, Result};

/// The count byte of ANSI X9.23 limits a block to 255 bytes.
const ANSIX923_MAX_CAPACITY: usize = 255;

/// Padding scheme used to map plaintext chunks to blocks.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub enum PaddingMode {
    /// Zero bytes followed by a final byte counting the padding bytes,
    /// itself included. Lossless.
    #[default]
    ANSIX923,
    /// Zero bytes in front of the chunk, so the block value is the chunk
    /// read as a big-endian integer. Leading zero bytes of the last chunk
    /// are only kept when the plaintext length is known at decryption.
    LeadingZeros,
    /// Zero bytes after the chunk, nothing recorded. Trailing zero bytes of
    /// the plaintext are lost unless the plaintext length is known at
    /// decryption.
    Zeros,
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaddingMode::ANSIX923 => "ANSIX923",
            PaddingMode::LeadingZeros => "LeadingZeros",
            PaddingMode::Zeros => "Zeros",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PaddingMode {
    type Err = ElGamalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ANSIX923" => Ok(PaddingMode::ANSIX923),
            "LeadingZeros" => Ok(PaddingMode::LeadingZeros),
            "Zeros" => Ok(PaddingMode::Zeros),
            other => Err(ElGamalError::InvalidParameter(format!(
                "unknown padding mode '{}'",
                other
            ))),
        }
    }
}

/// Padding codec for one mode and one modulus size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Padding {
    mode: PaddingMode,
    capacity: usize,
}

impl Padding {
    pub fn new(mode: PaddingMode, modulus_bits: u64) -> Result<Padding> {
        let raw = (modulus_bits.saturating_sub(1) / 8) as usize;
        let (capacity, min) = match mode {
            PaddingMode::ANSIX923 => (raw.min(ANSIX923_MAX_CAPACITY), 2),
            PaddingMode::LeadingZeros | PaddingMode::Zeros => (raw, 1),
        };
        if capacity < min {
            return Err(ElGamalError::InvalidParameter(format!(
                "a {} bit modulus leaves no room for {} blocks",
                modulus_bits, mode
            )));
        }

        Ok(Padding { mode, capacity })
    }

    pub fn mode(&self) -> PaddingMode {
        self.mode
    }

    /// Length in bytes of every encoded block.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Plaintext bytes carried by a full block.
    pub fn chunk_size(&self) -> usize {
        match self.mode {
            PaddingMode::ANSIX923 => self.capacity - 1,
            PaddingMode::LeadingZeros | PaddingMode::Zeros => self.capacity,
        }
    }

    /// Pads `chunk` to a block of exactly [`Padding::capacity`] bytes.
    pub fn encode(&self, chunk: &[u8]) -> Result<Vec<u8>> {
        if chunk.len() > self.chunk_size() {
            return Err(ElGamalError::BlockTooLarge(format!(
                "chunk of {} bytes exceeds {} bytes",
                chunk.len(),
                self.chunk_size()
            )));
        }
        let pad = self.capacity - chunk.len();
        let mut block = Vec::with_capacity(self.capacity);

        match self.mode {
            PaddingMode::ANSIX923 => {
                block.extend_from_slice(chunk);
                block.resize(self.capacity - 1, 0);
                // pad <= capacity <= 255
                block.push(pad as u8);
            }
            PaddingMode::LeadingZeros => {
                block.resize(pad, 0);
                block.extend_from_slice(chunk);
            }
            PaddingMode::Zeros => {
                block.extend_from_slice(chunk);
                block.resize(self.capacity, 0);
            }
        }

        Ok(block)
    }

    /// Recovers the chunk from a block.
    ///
    /// `expected_len` is the chunk length when the caller knows it. Without
    /// it, `LeadingZeros` strips every leading zero byte and `Zeros` every
    /// trailing zero byte. `ANSIX923` blocks carry their own length and only
    /// use it as a consistency check.
    pub fn decode(&self, block: &[u8], expected_len: Option<usize>) -> Result<Vec<u8>> {
        if block.len() != self.capacity {
            return Err(ElGamalError::Padding(format!(
                "block of {} bytes, expected {}",
                block.len(),
                self.capacity
            )));
        }
        if let Some(len) = expected_len {
            if len > self.chunk_size() {
                return Err(ElGamalError::Padding(format!(
                    "expected length {} exceeds chunk size {}",
                    len,
                    self.chunk_size()
                )));
            }
        }

        match self.mode {
            PaddingMode::ANSIX923 => {
                let count = block[self.capacity - 1] as usize;
                if count == 0 || count > self.capacity {
                    return Err(ElGamalError::Padding(format!(
                        "invalid padding count {}",
                        count
                    )));
                }
                let (data, pad) = block.split_at(self.capacity - count);
                if !is_zero(&pad[..count - 1]) {
                    return Err(ElGamalError::Padding(
                        "non zero padding bytes".to_string(),
                    ));
                }
                if let Some(len) = expected_len {
                    if len != data.len() {
                        return Err(ElGamalError::Padding(format!(
                            "padded chunk has {} bytes, expected {}",
                            data.len(),
                            len
                        )));
                    }
                }
                Ok(data.to_vec())
            }
            PaddingMode::LeadingZeros => match expected_len {
                Some(len) => {
                    let (pad, data) = block.split_at(self.capacity - len);
                    if !is_zero(pad) {
                        return Err(ElGamalError::Padding(
                            "chunk longer than expected".to_string(),
                        ));
                    }
                    Ok(data.to_vec())
                }
                None => {
                    let start = block
                        .iter()
                        .position(|b| *b != 0)
                        .unwrap_or(block.len());
                    Ok(block[start..].to_vec())
                }
            },
            PaddingMode::Zeros => match expected_len {
                Some(len) => {
                    let (data, pad) = block.split_at(len);
                    if !is_zero(pad) {
                        return Err(ElGamalError::Padding(
                            "chunk longer than expected".to_string(),
                        ));
                    }
                    Ok(data.to_vec())
                }
                None => {
                    let end = block
                        .iter()
                        .rposition(|b| *b != 0)
                        .map_or(0, |i| i + 1);
                    Ok(block[..end].to_vec())
                }
            },
        }
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let padding = Padding::new(PaddingMode::Zeros, 512).unwrap();
        assert_eq!(padding.capacity(), 63);
        assert_eq!(padding.chunk_size(), 63);

        let padding = Padding::new(PaddingMode::ANSIX923, 512).unwrap();
        assert_eq!(padding.chunk_size(), 62);

        // 8 * capacity must stay below the bit length of p
        let padding = Padding::new(PaddingMode::LeadingZeros, 513).unwrap();
        assert_eq!(padding.capacity(), 64);

        let padding = Padding::new(PaddingMode::ANSIX923, 4096).unwrap();
        assert_eq!(padding.capacity(), 255);

        assert!(Padding::new(PaddingMode::ANSIX923, 16).is_err());
        assert!(Padding::new(PaddingMode::Zeros, 8).is_err());
    }

    #[test]
    fn test_ansix923() {
        let padding = Padding::new(PaddingMode::ANSIX923, 64).unwrap();
        let block = padding.encode(&[1, 2, 3]).unwrap();
        assert_eq!(block, vec![1, 2, 3, 0, 0, 0, 4]);
        assert_eq!(padding.decode(&block, None).unwrap(), vec![1, 2, 3]);
        assert_eq!(padding.decode(&block, Some(3)).unwrap(), vec![1, 2, 3]);
        assert!(padding.decode(&block, Some(4)).is_err());

        let full = padding.encode(&[0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(full, vec![0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(padding.decode(&full, None).unwrap(), vec![0; 6]);
    }

    #[test]
    fn test_ansix923_malformed() {
        let padding = Padding::new(PaddingMode::ANSIX923, 64).unwrap();
        let zero_count = vec![1, 2, 3, 0, 0, 0, 0];
        let too_large = vec![1, 2, 3, 0, 0, 0, 8];
        let dirty = vec![1, 2, 3, 0, 9, 0, 4];

        for block in [zero_count, too_large, dirty] {
            match padding.decode(&block, None) {
                Err(ElGamalError::Padding(_)) => {}
                other => panic!("expected padding error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_leading_zeros() {
        let padding = Padding::new(PaddingMode::LeadingZeros, 64).unwrap();
        let block = padding.encode(&[0, 7, 8]).unwrap();
        assert_eq!(block, vec![0, 0, 0, 0, 0, 7, 8]);
        assert_eq!(padding.decode(&block, Some(3)).unwrap(), vec![0, 7, 8]);
        assert_eq!(padding.decode(&block, None).unwrap(), vec![7, 8]);
        assert!(padding.decode(&block, Some(1)).is_err());
    }

    #[test]
    fn test_zeros() {
        let padding = Padding::new(PaddingMode::Zeros, 64).unwrap();
        let block = padding.encode(&[7, 8, 0]).unwrap();
        assert_eq!(block, vec![7, 8, 0, 0, 0, 0, 0]);
        assert_eq!(padding.decode(&block, Some(3)).unwrap(), vec![7, 8, 0]);
        assert_eq!(padding.decode(&block, None).unwrap(), vec![7, 8]);
        assert!(padding.decode(&block, Some(1)).is_err());
    }

    #[test]
    fn test_oversized_chunk() {
        let padding = Padding::new(PaddingMode::Zeros, 64).unwrap();
        match padding.encode(&[1u8; 8]) {
            Err(ElGamalError::BlockTooLarge(_)) => {}
            other => panic!("expected BlockTooLarge, got {:?}", other),
        }
        assert!(padding.decode(&[0u8; 8], None).is_err());
    }

    #[test]
    fn test_mode_names() {
        for mode in [
            PaddingMode::ANSIX923,
            PaddingMode::LeadingZeros,
            PaddingMode::Zeros,
        ] {
            assert_eq!(mode.to_string().parse::<PaddingMode>().unwrap(), mode);
        }
        assert!("PKCS7".parse::<PaddingMode>().is_err());
    }
}
