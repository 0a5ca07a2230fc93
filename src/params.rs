// SPDX-FileCopyrightText: 2023 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! Exchange form of a key, big-endian byte strings for p, g, y and
//! optionally x.
//!
//! # Examples
//!
//! ```
//! use elgamal_ext::backend::num_bigint::BigintCtx;
//! use elgamal_ext::elgamal::KeyPair;
//! use elgamal_ext::padding::PaddingMode;
//!
//! let keypair = KeyPair::<BigintCtx>::generate(128).unwrap();
//! let public = keypair.export(false).unwrap().with_padding(PaddingMode::Zeros);
//! assert!(public.x.is_none());
//!
//! let json = serde_json::to_string(&public).unwrap();
//! let back: elgamal_ext::params::ElGamalParameters = serde_json::from_str(&json).unwrap();
//! let imported = KeyPair::<BigintCtx>::import(&back).unwrap();
//! assert_eq!(imported.public(), keypair.public());
//! assert_eq!(back.padding(), PaddingMode::Zeros);
//! ```
use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::context::{Ctx, Element, Exponent};
use crate::elgamal::{KeyPair, PrivateKey, PublicKey};
use crate::error::{ElGamalError, Result};
use crate::padding::PaddingMode;

/// Domain parameters and key material of an ElGamal key.
///
/// `padding` is the mode the key is meant to be used with. It travels with
/// the parameters for the benefit of the caller and takes no part in key
/// validation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ElGamalParameters {
    pub p: Vec<u8>,
    pub g: Vec<u8>,
    pub y: Vec<u8>,
    pub x: Option<Vec<u8>>,
    pub padding: PaddingMode,
}

impl ElGamalParameters {
    pub fn new(p: Vec<u8>, g: Vec<u8>, y: Vec<u8>, x: Option<Vec<u8>>) -> ElGamalParameters {
        ElGamalParameters {
            p,
            g,
            y,
            x,
            padding: PaddingMode::default(),
        }
    }
    pub fn with_padding(mut self, padding: PaddingMode) -> ElGamalParameters {
        self.padding = padding;
        self
    }
    pub fn padding(&self) -> PaddingMode {
        self.padding
    }
    pub fn has_private(&self) -> bool {
        self.x.is_some()
    }
}

impl fmt::Debug for ElGamalParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = hex::encode(&self.p);
        let y = hex::encode(&self.y);
        write!(
            f,
            "ElGamalParameters {{ p: {}.., g: {}, y: {}.., x: {}, padding: {} }}",
            &p[0..p.len().min(10)],
            hex::encode(&self.g),
            &y[0..y.len().min(10)],
            if self.x.is_some() { "<redacted>" } else { "None" },
            self.padding
        )
    }
}

impl<C: Ctx> KeyPair<C> {
    /// Validates and loads externally supplied parameters.
    ///
    /// Checks that p is a probable prime, that 2 <= g < p - 1, that
    /// 0 < y < p and, when x is present, that 1 <= x < p - 1 and g^x = y.
    pub fn import(params: &ElGamalParameters) -> Result<KeyPair<C>> {
        let ctx = C::new(&params.p, &params.g)?;
        let y = ctx.element_from_bytes(&params.y).map_err(|_| {
            ElGamalError::InvalidParameter("public key must satisfy y < p".to_string())
        })?;
        let public = PublicKey::from_element(&y, &ctx)?;

        let private = match &params.x {
            Some(bytes) => {
                let x = ctx.exp_from_bytes(bytes)?;
                if x.is_zero() {
                    return Err(ElGamalError::InvalidParameter(
                        "private key must satisfy 1 <= x < p - 1".to_string(),
                    ));
                }
                let sk = PrivateKey::from(&x, &ctx);
                if sk.pk_element() != public.element() {
                    return Err(ElGamalError::InvalidParameter(
                        "private key does not match public key, g^x != y".to_string(),
                    ));
                }
                Some(sk)
            }
            None => None,
        };
        debug!(
            "imported {} bit key, private part: {}",
            ctx.modulus_bits(),
            private.is_some()
        );

        Ok(KeyPair { public, private })
    }

    /// Projects the key onto its exchange form, x is only included when
    /// requested.
    pub fn export(&self, include_private: bool) -> Result<ElGamalParameters> {
        let ctx = self.public.ctx();
        let x = if include_private {
            Some(self.require_private()?.value.to_bytes_be())
        } else {
            None
        };

        Ok(ElGamalParameters::new(
            ctx.modulus().to_bytes_be(),
            ctx.generator().to_bytes_be(),
            self.public.element().to_bytes_be(),
            x,
        ))
    }
}
