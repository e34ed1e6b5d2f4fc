//! The cascade cipher engine.
//!
//! Composes one or three independently keyed AEAD layers over a byte
//! buffer. Encryption applies the suite's layers in order (layer 0 touches
//! the plaintext, the last layer produces the outermost ciphertext) and
//! decryption applies the exact reverse order, because the layer applied
//! last during encryption must be removed first.
//!
//! Every layer consumes its own slice of the derived key material and owns
//! its own nonce lane, seeded from the container's public nonce salt and
//! advanced once per message. The fixed [`APP_CONTEXT`] string is bound as
//! associated data into every layer's tag, so a cascrypt ciphertext cannot
//! be fed to a different application sharing the same primitives.

mod layer;
mod nonce;

pub mod algorithm;

pub use algorithm::{Algorithm, CipherSuite};
pub use nonce::NonceLane;

use layer::Layer;

use crate::config::APP_CONTEXT;
use crate::error::{CascadeError, Result};
use crate::types::Processing;

/// A cascade session: the layered cipher state for one file, one direction.
///
/// Bound to a single direction for its whole lifetime; calling the opposite
/// operation is an error rather than a silent nonce-schedule divergence.
pub struct Cascade {
    layers: Vec<Layer>,
    direction: Processing,
}

impl Cascade {
    /// Builds the layer stack for `suite`.
    ///
    /// `key_material` must hold exactly [`CipherSuite::key_len`] bytes (one
    /// 32-byte key per layer, in layer order) and `nonce_salt` exactly
    /// [`CipherSuite::nonce_salt_len`] bytes (one lane seed per layer,
    /// concatenated in layer order).
    pub fn new(suite: CipherSuite, direction: Processing, key_material: &[u8], nonce_salt: &[u8]) -> Result<Self> {
        if key_material.len() != suite.key_len() {
            return Err(CascadeError::invalid(format!(
                "suite {suite} needs {} key bytes, got {}",
                suite.key_len(),
                key_material.len()
            )));
        }
        if nonce_salt.len() != suite.nonce_salt_len() {
            return Err(CascadeError::invalid(format!(
                "suite {suite} needs {} nonce salt bytes, got {}",
                suite.nonce_salt_len(),
                nonce_salt.len()
            )));
        }

        let mut layers = Vec::with_capacity(suite.layer_count());
        let mut key_offset = 0;
        let mut salt_offset = 0;
        for &algorithm in suite.layers() {
            let key = &key_material[key_offset..key_offset + algorithm.key_size()];
            let seed = &nonce_salt[salt_offset..salt_offset + algorithm.nonce_size()];
            layers.push(Layer::new(algorithm, key, seed)?);
            key_offset += algorithm.key_size();
            salt_offset += algorithm.nonce_size();
        }

        Ok(Self { layers, direction })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Applies every layer in encryption order, replacing the buffer with
    /// ciphertext-within-ciphertext. Output grows by one tag per layer.
    pub fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if self.direction != Processing::Encryption {
            return Err(CascadeError::invalid("cascade session is bound to decryption"));
        }

        let mut buffer = plaintext.to_vec();
        for layer in &mut self.layers {
            buffer = layer.seal(&buffer, APP_CONTEXT)?;
        }
        Ok(buffer)
    }

    /// Applies every layer in the reverse of encryption order, unwrapping
    /// innermost-last. The first failed tag aborts immediately; the caller
    /// must treat the whole session as failed and process no further
    /// chunks.
    pub fn open(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if self.direction != Processing::Decryption {
            return Err(CascadeError::invalid("cascade session is bound to encryption"));
        }

        let mut buffer = ciphertext.to_vec();
        for layer in self.layers.iter_mut().rev() {
            buffer = layer.open(&buffer, APP_CONTEXT)?;
        }
        Ok(buffer)
    }
}
