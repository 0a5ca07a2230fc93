// SPDX-FileCopyrightText: 2023 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! ElGamal signatures over the key's own domain parameters.
//!
//! A signature on digest H is (R, S) with R = g^k and
//! S = (H - x * R) * k^-1 mod (p - 1), verified as g^H = y^R * R^S.
//!
//! # Examples
//!
//! ```
//! use elgamal_ext::backend::num_bigint::BigintCtx;
//! use elgamal_ext::elgamal::KeyPair;
//!
//! let keypair = KeyPair::<BigintCtx>::generate(128).unwrap();
//! let signature = keypair.sign_message(b"a message").unwrap();
//!
//! assert!(keypair.verify_message(b"a message", &signature));
//! assert!(!keypair.verify_message(b"another message", &signature));
//! ```
use log::{trace, warn};

use crate::backend::constants::SIGNING_RETRIES;
use crate::context::{Ctx, Element, Exponent};
use crate::elgamal::{KeyPair, PrivateKey, PublicKey};
use crate::error::{ElGamalError, Result};
use crate::util::{self, to_fixed_be};

/// An ElGamal signature (R, S).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature<C: Ctx> {
    pub(crate) r: C::E,
    pub(crate) s: C::X,
}

impl<C: Ctx> Signature<C> {
    /// Builds a signature from its parts, ranges are only checked on
    /// verification.
    pub fn from_parts(r: C::E, s: C::X) -> Signature<C> {
        Signature { r, s }
    }
    pub fn r(&self) -> &C::E {
        &self.r
    }
    pub fn s(&self) -> &C::X {
        &self.s
    }

    /// R followed by S, each left padded to the byte length of p.
    pub fn to_bytes(&self, ctx: &C) -> Vec<u8> {
        let len = ctx.byte_len();
        let mut bytes = to_fixed_be(&self.r.to_bytes_be(), len).unwrap_or_default();
        bytes.extend(to_fixed_be(&self.s.to_bytes_be(), len).unwrap_or_default());

        bytes
    }

    /// Parses R || S, rejecting R >= p and S >= p - 1.
    pub fn from_bytes(bytes: &[u8], ctx: &C) -> Result<Signature<C>> {
        let len = ctx.byte_len();
        if bytes.len() != 2 * len {
            return Err(ElGamalError::Serialization(format!(
                "signature of {} bytes, expected {}",
                bytes.len(),
                2 * len
            )));
        }
        let (r, s) = bytes.split_at(len);
        let r = ctx
            .element_from_bytes(r)
            .map_err(|e| ElGamalError::Serialization(e.to_string()))?;
        let s = ctx
            .exp_from_bytes(s)
            .map_err(|e| ElGamalError::Serialization(e.to_string()))?;

        Ok(Signature { r, s })
    }
}

impl<C: Ctx> PrivateKey<C> {
    /// Signs a digest, interpreted as a big-endian integer modulo p - 1.
    ///
    /// Draws k until it is coprime to p - 1 and S is non zero, at most
    /// `SIGNING_RETRIES` times.
    pub fn sign(&self, digest: &[u8]) -> Result<Signature<C>> {
        self.sign_within(digest, SIGNING_RETRIES)
    }

    pub(crate) fn sign_within(&self, digest: &[u8], retries: usize) -> Result<Signature<C>> {
        let ctx = &self.ctx;
        let order = ctx.exp_modulus();
        let h = ctx.exp_from_digest(digest);

        for attempt in 0..retries {
            let k = ctx.rnd_exp();
            if !k.is_coprime(order) {
                trace!("signing attempt {}: gcd(k, p - 1) != 1, resampling", attempt);
                continue;
            }
            let k_inv = match k.inv(order) {
                Some(k_inv) => k_inv,
                None => continue,
            };
            let r = ctx.gmod_pow(&k);
            let xr = self.value.mul(&ctx.exp_from_element(&r)).modulo(order);
            let s = h.sub(&xr, order).mul(&k_inv).modulo(order);
            if s.is_zero() {
                trace!("signing attempt {}: s = 0, resampling", attempt);
                continue;
            }

            return Ok(Signature { r, s });
        }

        warn!("no suitable k within {} attempts", retries);
        Err(ElGamalError::Signing(format!(
            "no suitable k within {} attempts",
            retries
        )))
    }

    /// Hashes `message` with SHA-512 and signs the digest.
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature<C>> {
        self.sign(&util::hash(message))
    }
}

impl<C: Ctx> PublicKey<C> {
    /// Returns true iff 0 < R < p, S < p - 1 and g^H = y^R * R^S mod p.
    pub fn verify(&self, digest: &[u8], signature: &Signature<C>) -> bool {
        let ctx = &self.ctx;
        if signature.r.is_zero() || &signature.r >= ctx.modulus() {
            return false;
        }
        if &signature.s >= ctx.exp_modulus() {
            return false;
        }
        let h = ctx.exp_from_digest(digest);

        let lhs = ctx.gmod_pow(&h);
        let yr = ctx.emod_pow(&self.element, &ctx.exp_from_element(&signature.r));
        let rs = ctx.emod_pow(&signature.r, &signature.s);

        lhs == yr.mulp(&rs, ctx)
    }

    pub fn verify_message(&self, message: &[u8], signature: &Signature<C>) -> bool {
        self.verify(&util::hash(message), signature)
    }
}

impl<C: Ctx> KeyPair<C> {
    pub fn sign(&self, digest: &[u8]) -> Result<Signature<C>> {
        self.require_private()?.sign(digest)
    }
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature<C>> {
        self.require_private()?.sign_message(message)
    }
    pub fn verify(&self, digest: &[u8], signature: &Signature<C>) -> bool {
        self.public.verify(digest, signature)
    }
    pub fn verify_message(&self, message: &[u8], signature: &Signature<C>) -> bool {
        self.public.verify_message(message, signature)
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::num_bigint::BigintCtx;
    use crate::backend::tests::fixture_keypair;
    use crate::context::{Ctx, Element, Exponent};
    use crate::elgamal::KeyPair;
    use crate::error::ElGamalError;
    use crate::signature::Signature;

    #[test]
    fn test_sign_message() {
        let kp = fixture_keypair::<BigintCtx>();
        let signature = kp.sign_message(b"message").unwrap();
        assert!(kp.verify_message(b"message", &signature));
        assert!(!kp.verify_message(b"massage", &signature));
        // the raw message is not the digest
        assert!(!kp.verify(b"message", &signature));
    }

    #[test]
    fn test_out_of_range() {
        let kp = fixture_keypair::<BigintCtx>();
        let ctx = kp.public().ctx();
        let digest = [7u8; 64];
        let signature = kp.sign(&digest).unwrap();

        let zero_r = Signature::<BigintCtx>::from_parts(ctx.element_from_u64(0), signature.s().clone());
        assert!(!kp.verify(&digest, &zero_r));

        let big_r = Signature::<BigintCtx>::from_parts(ctx.modulus().clone(), signature.s().clone());
        assert!(!kp.verify(&digest, &big_r));

        let big_s = Signature::<BigintCtx>::from_parts(
            signature.r().clone(),
            ctx.exp_modulus().add(signature.s()),
        );
        assert!(!kp.verify(&digest, &big_s));
    }

    #[test]
    fn test_signature_bytes() {
        let kp = fixture_keypair::<BigintCtx>();
        let ctx = kp.public().ctx();
        let signature = kp.sign(&[1, 2, 3]).unwrap();

        let bytes = signature.to_bytes(ctx);
        assert_eq!(bytes.len(), 2 * ctx.byte_len());
        let back = Signature::<BigintCtx>::from_bytes(&bytes, ctx).unwrap();
        assert_eq!(back, signature);
        assert!(kp.verify(&[1, 2, 3], &back));

        match Signature::<BigintCtx>::from_bytes(&bytes[2..], ctx) {
            Err(ElGamalError::Serialization(_)) => {}
            other => panic!("expected serialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_public_only() {
        let kp = fixture_keypair::<BigintCtx>();
        let signature = kp.sign(&[9u8; 32]).unwrap();

        let public = KeyPair::from(kp.public().clone());
        assert_eq!(public.sign(&[9u8; 32]), Err(ElGamalError::MissingPrivateKey));
        assert!(public.verify(&[9u8; 32], &signature));
    }

    #[test]
    fn test_signing_budget() {
        let kp = fixture_keypair::<BigintCtx>();
        let sk = kp.private().unwrap();
        match sk.sign_within(&[1u8; 32], 0) {
            Err(ElGamalError::Signing(_)) => {}
            other => panic!("expected Signing error, got {:?}", other),
        }
        assert!(sk.sign_within(&[1u8; 32], 1000).is_ok());
    }

    #[test]
    fn test_coprime() {
        let kp = fixture_keypair::<BigintCtx>();
        let ctx = kp.public().ctx();
        // p - 1 is even
        let two = ctx.exp_from_digest(&[2]);
        let three = ctx.exp_from_digest(&[3]);
        assert!(!two.is_coprime(ctx.exp_modulus()));
        assert!(three.is_coprime(ctx.exp_modulus()));
    }

    #[test]
    fn test_digest_reduction() {
        let kp = fixture_keypair::<BigintCtx>();
        let ctx = kp.public().ctx();
        // H and H + (p - 1) are the same exponent
        let digest = [3u8];
        let shifted = ctx.exp_modulus().add(&ctx.exp_from_digest(&digest));
        let signature = kp.sign(&digest).unwrap();
        assert!(kp.verify(&shifted.to_bytes_be(), &signature));
        assert!(!Element::<BigintCtx>::is_zero(signature.r()));
    }
}
