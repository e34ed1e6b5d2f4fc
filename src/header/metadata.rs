//! The encrypted metadata block.
//!
//! Stores what the container must give back on decryption but must not
//! leak while encrypted: the original filename, the original file size and
//! a BLAKE3 hash of the plaintext. The fields are packed into a fixed
//! [`METADATA_BLOCK`]-sized buffer and the remainder is filled with random
//! bytes, so every container carries a metadata block of identical length
//! regardless of filename. The explicit `name_len` prefix is what makes the
//! padding recoverable at decode time.
//!
//! Block layout (big-endian):
//!
//! ```text
//! name_len   u16
//! size       u64
//! hash       [32]
//! name       [name_len]
//! filler     [METADATA_BLOCK - 42 - name_len]  random
//! ```

use crate::config::{HASH_SIZE, MAX_FILENAME_LENGTH, METADATA_BLOCK};
use crate::error::{CascadeError, Result};
use crate::rng::EntropySource;

const FIXED_FIELDS: usize = 2 + 8 + HASH_SIZE;

/// Authenticated facts about the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    size: u64,
    hash: [u8; HASH_SIZE],
}

impl Metadata {
    pub fn new(name: impl Into<String>, size: u64, hash: [u8; HASH_SIZE]) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CascadeError::invalid("filename cannot be empty"));
        }
        if name.len() > MAX_FILENAME_LENGTH {
            return Err(CascadeError::invalid(format!("filename exceeds {MAX_FILENAME_LENGTH} bytes")));
        }
        Ok(Self { name, size, hash })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn size(&self) -> u64 {
        self.size
    }

    pub fn hash(&self) -> &[u8; HASH_SIZE] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Packs the fields into a fresh [`METADATA_BLOCK`]-sized plaintext
    /// block, random-filled past the name.
    pub fn encode_block(&self, rng: &mut dyn EntropySource) -> Result<Vec<u8>> {
        let mut block = vec![0u8; METADATA_BLOCK];

        block[0..2].copy_from_slice(&(self.name.len() as u16).to_be_bytes());
        block[2..10].copy_from_slice(&self.size.to_be_bytes());
        block[10..FIXED_FIELDS].copy_from_slice(&self.hash);

        let name_end = FIXED_FIELDS + self.name.len();
        block[FIXED_FIELDS..name_end].copy_from_slice(self.name.as_bytes());

        rng.fill(&mut block[name_end..])?;
        Ok(block)
    }

    /// Recovers the fields from a decrypted metadata block, discarding the
    /// filler.
    pub fn decode_block(block: &[u8]) -> Result<Self> {
        if block.len() != METADATA_BLOCK {
            return Err(CascadeError::Malformed("metadata block has wrong size"));
        }

        let name_len = u16::from_be_bytes([block[0], block[1]]) as usize;
        if name_len == 0 || name_len > MAX_FILENAME_LENGTH || FIXED_FIELDS + name_len > METADATA_BLOCK {
            return Err(CascadeError::Malformed("metadata filename length out of range"));
        }

        let size = u64::from_be_bytes(block[2..10].try_into().expect("fixed slice"));
        let hash: [u8; HASH_SIZE] = block[10..FIXED_FIELDS].try_into().expect("fixed slice");

        let name = std::str::from_utf8(&block[FIXED_FIELDS..FIXED_FIELDS + name_len])
            .map_err(|_| CascadeError::Malformed("metadata filename is not UTF-8"))?
            .to_owned();

        Ok(Self { name, size, hash })
    }
}
