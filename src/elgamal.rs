// SPDX-FileCopyrightText: 2021 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
//! # Examples
//!
//! ```
//! // This example shows different operations related to ElGamal encryption.
//! use elgamal_ext::backend::num_bigint::BigintCtx;
//! use elgamal_ext::elgamal::KeyPair;
//! use elgamal_ext::homomorphic;
//! use elgamal_ext::padding::PaddingMode;
//!
//! // generate a keypair with a fresh 128 bit safe prime (test sized)
//! let keypair = KeyPair::<BigintCtx>::generate(128).unwrap();
//!
//! // encrypt, each block draws its own randomness
//! let ciphertexts = keypair.encrypt_all(b"attack at dawn", PaddingMode::ANSIX923).unwrap();
//! let plaintext = keypair.decrypt(&ciphertexts, PaddingMode::ANSIX923).unwrap();
//! assert_eq!(plaintext, b"attack at dawn".to_vec());
//!
//! // under LeadingZeros a single byte chunk is its own value
//! let six = keypair.encrypt_all(&[6u8], PaddingMode::LeadingZeros).unwrap();
//! let seven = keypair.encrypt_all(&[7u8], PaddingMode::LeadingZeros).unwrap();
//! let product = homomorphic::multiply(&six[0], &seven[0]).unwrap();
//! let decrypted = keypair.decrypt(&[product], PaddingMode::LeadingZeros).unwrap();
//! assert_eq!(decrypted, vec![42u8]);
//! ```
use std::fmt;

use log::debug;

use crate::context::{Ctx, Element};
use crate::error::{ElGamalError, Result};
use crate::padding::{Padding, PaddingMode};
use crate::util::{to_fixed_be, Par};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// An ElGamal ciphertext.
///
/// Composed of two group elements, computed as
///
/// (m * h^r, g^r)
///
/// where m = message, h = public key, g = generator, r = randomness.
///
/// The context of the key that produced it travels with the ciphertext,
/// combining ciphertexts under different moduli is rejected.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Ciphertext<C: Ctx> {
    pub(crate) mhr: C::E,
    pub(crate) gr: C::E,
    pub(crate) ctx: C,
}
impl<C: Ctx> Ciphertext<C> {
    /// Returns the ciphertext part computed as m * h^r.
    pub fn mhr(&self) -> &C::E {
        &self.mhr
    }
    /// Returns the ciphertext part computed as g^r.
    pub fn gr(&self) -> &C::E {
        &self.gr
    }
    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    /// g^r followed by m * h^r, each left padded to the byte length of p.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.ctx.byte_len();
        let mut bytes = Vec::with_capacity(2 * len);
        for part in [&self.gr, &self.mhr] {
            // parts are reduced modulo p, so they always fit
            let fixed = to_fixed_be(&part.to_bytes_be(), len).unwrap_or_default();
            bytes.extend(fixed);
        }

        bytes
    }

    pub fn from_bytes(bytes: &[u8], ctx: &C) -> Result<Ciphertext<C>> {
        let len = ctx.byte_len();
        if bytes.len() != 2 * len {
            return Err(ElGamalError::Serialization(format!(
                "ciphertext of {} bytes, expected {}",
                bytes.len(),
                2 * len
            )));
        }
        let (gr, mhr) = bytes.split_at(len);
        let parse = |part: &[u8]| {
            ctx.element_from_bytes(part).map_err(|_| {
                ElGamalError::Serialization("ciphertext part is not below p".to_string())
            })
        };

        Ok(Ciphertext {
            mhr: parse(mhr)?,
            gr: parse(gr)?,
            ctx: ctx.clone(),
        })
    }
}

/// An ElGamal public key, the domain parameters p, g together with
/// h = g^x.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PublicKey<C: Ctx> {
    pub(crate) element: C::E,
    pub(crate) ctx: C,
}

/// An ElGamal private key.
#[derive(Clone, Eq, PartialEq)]
pub struct PrivateKey<C: Ctx> {
    pub(crate) value: C::X,
    pub(crate) pk_element: C::E,
    pub(crate) ctx: C,
}

impl<C: Ctx> fmt::Debug for PrivateKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pk = hex::encode(self.pk_element.to_bytes_be());
        write!(f, "PrivateKey {{ pk: {}.. }}", &pk[0..pk.len().min(10)])
    }
}

impl<C: Ctx> PublicKey<C> {
    /// Builds a public key from h, which must satisfy 0 < h < p.
    pub fn from_element(element: &C::E, ctx: &C) -> Result<PublicKey<C>> {
        let reduced = element.modp(ctx);
        if element.is_zero() || &reduced != element {
            return Err(ElGamalError::InvalidParameter(
                "public key must satisfy 0 < y < p".to_string(),
            ));
        }

        Ok(PublicKey {
            element: element.clone(),
            ctx: ctx.clone(),
        })
    }
    pub fn element(&self) -> &C::E {
        &self.element
    }
    pub fn ctx(&self) -> &C {
        &self.ctx
    }
    pub fn padding(&self, mode: PaddingMode) -> Result<Padding> {
        Padding::new(mode, self.ctx.modulus_bits())
    }

    /// Encrypts a single field element with fresh randomness.
    pub fn encrypt_block(&self, plaintext: &C::E) -> Ciphertext<C> {
        let randomness = self.ctx.rnd_exp();
        self.encrypt_with_randomness(plaintext, &randomness)
    }
    /// Encrypts with caller supplied randomness, which must never be
    /// reused under the same key.
    pub fn encrypt_with_randomness(&self, plaintext: &C::E, randomness: &C::X) -> Ciphertext<C> {
        let ctx = &self.ctx;
        Ciphertext {
            mhr: plaintext.mulp(&ctx.emod_pow(&self.element, randomness), ctx),
            gr: ctx.gmod_pow(randomness),
            ctx: ctx.clone(),
        }
    }

    /// Lazily encrypts `plaintext` block by block, in order.
    pub fn encrypt<'a>(&'a self, plaintext: &'a [u8], mode: PaddingMode) -> Result<Encryption<'a, C>> {
        let padding = self.padding(mode)?;
        Ok(Encryption {
            pk: self,
            padding,
            chunks: plaintext.chunks(padding.chunk_size()),
        })
    }

    /// Encrypts every block of `plaintext`, in parallel with the `rayon`
    /// feature.
    pub fn encrypt_all(&self, plaintext: &[u8], mode: PaddingMode) -> Result<Vec<Ciphertext<C>>> {
        let padding = self.padding(mode)?;
        let chunks: Vec<&[u8]> = plaintext.chunks(padding.chunk_size()).collect();

        chunks
            .par()
            .map(|chunk| self.encrypt_chunk(&padding, chunk))
            .collect()
    }

    fn encrypt_chunk(&self, padding: &Padding, chunk: &[u8]) -> Result<Ciphertext<C>> {
        let block = padding.encode(chunk)?;
        let element = self.ctx.element_from_bytes(&block)?;

        Ok(self.encrypt_block(&element))
    }
}

/// Lazy, finite and non restartable stream of ciphertexts, one per chunk.
pub struct Encryption<'a, C: Ctx> {
    pk: &'a PublicKey<C>,
    padding: Padding,
    chunks: std::slice::Chunks<'a, u8>,
}

impl<'a, C: Ctx> Iterator for Encryption<'a, C> {
    type Item = Result<Ciphertext<C>>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        Some(self.pk.encrypt_chunk(&self.padding, chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<'a, C: Ctx> ExactSizeIterator for Encryption<'a, C> {}

impl<C: Ctx> PrivateKey<C> {
    /// Recovers the field element, m = (m * h^r) / (g^r)^x.
    pub fn decrypt_block(&self, c: &Ciphertext<C>) -> Result<C::E> {
        let ctx = &self.ctx;
        if c.ctx.modulus() != ctx.modulus() {
            return Err(ElGamalError::Decryption(
                "ciphertext was produced under a different modulus".to_string(),
            ));
        }
        if c.gr.is_zero() {
            return Err(ElGamalError::Decryption(
                "g^r is zero, shared secret has no inverse".to_string(),
            ));
        }
        let shared = ctx.emod_pow(&c.gr, &self.value);

        c.mhr.divp(&shared, ctx)
    }

    /// Decrypts and unpads a sequence of ciphertexts.
    ///
    /// Without the plaintext length, `LeadingZeros` and `Zeros` cannot tell
    /// padding from zero bytes at the edge of the last chunk, see
    /// [`PrivateKey::decrypt_exact`].
    pub fn decrypt(&self, ciphertexts: &[Ciphertext<C>], mode: PaddingMode) -> Result<Vec<u8>> {
        self.decrypt_blocks(ciphertexts, mode, None)
    }

    /// Decrypts a sequence of ciphertexts of a plaintext of `len` bytes.
    pub fn decrypt_exact(
        &self,
        ciphertexts: &[Ciphertext<C>],
        mode: PaddingMode,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.decrypt_blocks(ciphertexts, mode, Some(len))
    }

    fn decrypt_blocks(
        &self,
        ciphertexts: &[Ciphertext<C>],
        mode: PaddingMode,
        len: Option<usize>,
    ) -> Result<Vec<u8>> {
        let padding = Padding::new(mode, self.ctx.modulus_bits())?;
        let chunk_size = padding.chunk_size();
        let count = ciphertexts.len();

        let last_len = match len {
            Some(len) => {
                let blocks = len / chunk_size + usize::from(len % chunk_size != 0);
                if blocks != count {
                    return Err(ElGamalError::Padding(format!(
                        "{} bytes do not fit {} blocks of {} bytes",
                        len, count, chunk_size
                    )));
                }
                Some(len - chunk_size * count.saturating_sub(1))
            }
            None => None,
        };

        let elements: Vec<C::E> = ciphertexts
            .par()
            .map(|c| self.decrypt_block(c))
            .collect::<Result<Vec<C::E>>>()?;

        let mut plaintext = Vec::with_capacity(count * chunk_size);
        for (i, element) in elements.iter().enumerate() {
            let block = to_fixed_be(&element.to_bytes_be(), padding.capacity()).ok_or_else(|| {
                ElGamalError::Padding(format!("block {} exceeds the block capacity", i))
            })?;
            let expected = if i + 1 < count { Some(chunk_size) } else { last_len };
            plaintext.extend(padding.decode(&block, expected)?);
        }

        Ok(plaintext)
    }

    pub fn gen(ctx: &C) -> PrivateKey<C> {
        let secret = ctx.rnd_exp();
        PrivateKey::from(&secret, ctx)
    }
    pub fn from(secret: &C::X, ctx: &C) -> PrivateKey<C> {
        let pk_element = ctx.gmod_pow(secret);
        PrivateKey {
            value: secret.clone(),
            pk_element,
            ctx: (*ctx).clone(),
        }
    }
    pub fn pk_element(&self) -> &C::E {
        &self.pk_element
    }
    pub fn get_pk(&self) -> PublicKey<C> {
        PublicKey {
            element: self.pk_element.clone(),
            ctx: self.ctx.clone(),
        }
    }
}

/// A public key together with the matching private key, if held.
///
/// Immutable once built, so it can be shared between threads for
/// concurrent encryption, decryption and signing.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct KeyPair<C: Ctx> {
    pub(crate) public: PublicKey<C>,
    pub(crate) private: Option<PrivateKey<C>>,
}

impl<C: Ctx> KeyPair<C> {
    /// Generates a fresh safe prime modulus of `bits` bits, a generator and
    /// a private exponent uniform in `[1, p - 2]`.
    pub fn generate(bits: u64) -> Result<KeyPair<C>> {
        let ctx = C::generate(bits)?;
        let sk = PrivateKey::gen(&ctx);
        debug!("generated {} bit keypair", ctx.modulus_bits());

        Ok(KeyPair::from(sk))
    }

    pub fn public(&self) -> &PublicKey<C> {
        &self.public
    }
    pub fn private(&self) -> Option<&PrivateKey<C>> {
        self.private.as_ref()
    }
    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }
    pub(crate) fn require_private(&self) -> Result<&PrivateKey<C>> {
        self.private.as_ref().ok_or(ElGamalError::MissingPrivateKey)
    }

    pub fn encrypt<'a>(&'a self, plaintext: &'a [u8], mode: PaddingMode) -> Result<Encryption<'a, C>> {
        self.public.encrypt(plaintext, mode)
    }
    pub fn encrypt_all(&self, plaintext: &[u8], mode: PaddingMode) -> Result<Vec<Ciphertext<C>>> {
        self.public.encrypt_all(plaintext, mode)
    }
    pub fn decrypt(&self, ciphertexts: &[Ciphertext<C>], mode: PaddingMode) -> Result<Vec<u8>> {
        self.require_private()?.decrypt(ciphertexts, mode)
    }
    pub fn decrypt_exact(
        &self,
        ciphertexts: &[Ciphertext<C>],
        mode: PaddingMode,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.require_private()?.decrypt_exact(ciphertexts, mode, len)
    }
}

impl<C: Ctx> From<PrivateKey<C>> for KeyPair<C> {
    fn from(sk: PrivateKey<C>) -> KeyPair<C> {
        KeyPair {
            public: sk.get_pk(),
            private: Some(sk),
        }
    }
}

impl<C: Ctx> From<PublicKey<C>> for KeyPair<C> {
    fn from(pk: PublicKey<C>) -> KeyPair<C> {
        KeyPair {
            public: pk,
            private: None,
        }
    }
}
