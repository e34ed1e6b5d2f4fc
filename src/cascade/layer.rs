//! A single AEAD layer: one algorithm instance, one key, one nonce lane.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce as GcmNonce};
use aes_gcm_siv::{Aes256GcmSiv, Nonce as SivNonce};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};

use crate::cascade::algorithm::Algorithm;
use crate::cascade::nonce::NonceLane;
use crate::error::{CascadeError, Result};

enum AeadCipher {
    XChaCha(Box<XChaCha20Poly1305>),
    AesGcm(Box<Aes256Gcm>),
    AesGcmSiv(Box<Aes256GcmSiv>),
}

/// One layer of the cascade.
///
/// The key is consumed at construction; the only mutable state afterwards
/// is the nonce lane, which advances exactly once per sealed or opened
/// message.
pub struct Layer {
    cipher: AeadCipher,
    nonce: NonceLane,
}

impl Layer {
    /// Binds an algorithm instance to its key slice and lane seed.
    pub fn new(algorithm: Algorithm, key: &[u8], nonce_seed: &[u8]) -> Result<Self> {
        if key.len() != algorithm.key_size() {
            return Err(CascadeError::invalid(format!(
                "{algorithm} key must be {} bytes, got {}",
                algorithm.key_size(),
                key.len()
            )));
        }
        if nonce_seed.len() != algorithm.nonce_size() {
            return Err(CascadeError::invalid(format!(
                "{algorithm} nonce seed must be {} bytes, got {}",
                algorithm.nonce_size(),
                nonce_seed.len()
            )));
        }

        let cipher = match algorithm {
            Algorithm::XChaCha20Poly1305 => AeadCipher::XChaCha(Box::new(
                XChaCha20Poly1305::new_from_slice(key).map_err(|_| CascadeError::invalid("bad key length"))?,
            )),
            Algorithm::Aes256Gcm => AeadCipher::AesGcm(Box::new(
                Aes256Gcm::new_from_slice(key).map_err(|_| CascadeError::invalid("bad key length"))?,
            )),
            Algorithm::Aes256GcmSiv => AeadCipher::AesGcmSiv(Box::new(
                Aes256GcmSiv::new_from_slice(key).map_err(|_| CascadeError::invalid("bad key length"))?,
            )),
        };

        Ok(Self { cipher, nonce: NonceLane::seeded(nonce_seed) })
    }

    /// Encrypts-and-tags one message under the next nonce in the lane.
    pub fn seal(&mut self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let payload = Payload { msg: plaintext, aad };
        let nonce = self.nonce.advance();
        match &self.cipher {
            AeadCipher::XChaCha(cipher) => cipher.encrypt(XNonce::from_slice(nonce), payload),
            AeadCipher::AesGcm(cipher) => cipher.encrypt(GcmNonce::from_slice(nonce), payload),
            AeadCipher::AesGcmSiv(cipher) => cipher.encrypt(SivNonce::from_slice(nonce), payload),
        }
        .map_err(|_| CascadeError::invalid("aead seal failed"))
    }

    /// Verifies-and-decrypts one message under the next nonce in the lane.
    ///
    /// A tag mismatch is [`CascadeError::Authentication`]; the lane has
    /// still advanced, matching the seal side.
    pub fn open(&mut self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let payload = Payload { msg: ciphertext, aad };
        let nonce = self.nonce.advance();
        match &self.cipher {
            AeadCipher::XChaCha(cipher) => cipher.decrypt(XNonce::from_slice(nonce), payload),
            AeadCipher::AesGcm(cipher) => cipher.decrypt(GcmNonce::from_slice(nonce), payload),
            AeadCipher::AesGcmSiv(cipher) => cipher.decrypt(SivNonce::from_slice(nonce), payload),
        }
        .map_err(|_| CascadeError::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KEY_SIZE;

    fn layer(algorithm: Algorithm) -> Layer {
        let key = [7u8; KEY_SIZE];
        let seed = vec![0u8; algorithm.nonce_size()];
        Layer::new(algorithm, &key, &seed).unwrap()
    }

    #[test]
    fn test_seal_open_roundtrip_all_algorithms() {
        for algorithm in [Algorithm::XChaCha20Poly1305, Algorithm::Aes256Gcm, Algorithm::Aes256GcmSiv] {
            let mut sealer = layer(algorithm);
            let mut opener = layer(algorithm);

            let ciphertext = sealer.seal(b"attack at dawn", b"ctx").unwrap();
            assert_eq!(ciphertext.len(), 14 + algorithm.tag_size());

            let plaintext = opener.open(&ciphertext, b"ctx").unwrap();
            assert_eq!(plaintext, b"attack at dawn");
        }
    }

    #[test]
    fn test_nonce_advances_per_message() {
        let mut sealer = layer(Algorithm::Aes256Gcm);
        let a = sealer.seal(b"same message", b"").unwrap();
        let b = sealer.seal(b"same message", b"").unwrap();
        // Different nonces, different ciphertexts.
        assert_ne!(a, b);
    }

    #[test]
    fn test_aad_mismatch_fails_authentication() {
        let mut sealer = layer(Algorithm::XChaCha20Poly1305);
        let mut opener = layer(Algorithm::XChaCha20Poly1305);

        let ciphertext = sealer.seal(b"payload", b"context-a").unwrap();
        let result = opener.open(&ciphertext, b"context-b");
        assert!(matches!(result, Err(CascadeError::Authentication)));
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let mut sealer = layer(Algorithm::Aes256GcmSiv);
        let ciphertext = sealer.seal(b"payload", b"").unwrap();

        let mut opener = Layer::new(Algorithm::Aes256GcmSiv, &[8u8; KEY_SIZE], &[0u8; 12]).unwrap();
        assert!(matches!(opener.open(&ciphertext, b""), Err(CascadeError::Authentication)));
    }

    #[test]
    fn test_key_and_seed_widths_validated() {
        assert!(Layer::new(Algorithm::Aes256Gcm, &[0u8; 16], &[0u8; 12]).is_err());
        assert!(Layer::new(Algorithm::Aes256Gcm, &[0u8; KEY_SIZE], &[0u8; 24]).is_err());
    }
}
