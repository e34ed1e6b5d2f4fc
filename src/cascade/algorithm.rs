//! The closed set of supported AEAD algorithms and cipher suites.
//!
//! Selection by name (CLI flags) and by id byte (container header) both
//! resolve into these enums, so an unknown algorithm can never reach the
//! engine: the set is statically known and exhaustively matched.

use crate::config::{AES_NONCE_SIZE, KEY_SIZE, TAG_SIZE, XCHACHA_NONCE_SIZE};
use crate::error::{CascadeError, Result};

/// A single AEAD primitive the engine knows how to drive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    /// XChaCha20-Poly1305: 256-bit key, 192-bit nonce lane.
    XChaCha20Poly1305,

    /// AES-256-GCM: 256-bit key, 96-bit nonce lane, hardware accelerated
    /// on most CPUs.
    Aes256Gcm,

    /// AES-256-GCM-SIV: nonce-misuse-resistant AES mode, 96-bit nonce lane.
    Aes256GcmSiv,
}

impl Algorithm {
    /// Key size in bytes. Uniform across the set.
    pub const fn key_size(self) -> usize {
        KEY_SIZE
    }

    /// Nonce lane width in bytes.
    pub const fn nonce_size(self) -> usize {
        match self {
            Self::XChaCha20Poly1305 => XCHACHA_NONCE_SIZE,
            Self::Aes256Gcm | Self::Aes256GcmSiv => AES_NONCE_SIZE,
        }
    }

    /// Authentication tag size in bytes. Uniform across the set.
    pub const fn tag_size(self) -> usize {
        TAG_SIZE
    }
}

/// A cascade composition: which algorithms are layered, and in what order.
///
/// `layers()` is the encryption order: index 0 touches the plaintext first,
/// the last index produces the outermost ciphertext. Decryption walks the
/// same slice in reverse.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum CipherSuite {
    /// Single-layer XChaCha20-Poly1305.
    #[default]
    XChaCha20Poly1305,

    /// Single-layer AES-256-GCM.
    Aes256Gcm,

    /// Three independently keyed layers, inner to outer:
    /// AES-256-GCM, then AES-256-GCM-SIV, then XChaCha20-Poly1305.
    /// Breaking any single layer's key leaves the payload protected by the
    /// other two.
    Triple,
}

impl CipherSuite {
    /// All suites, for selection menus.
    pub const ALL: &'static [Self] = &[Self::XChaCha20Poly1305, Self::Aes256Gcm, Self::Triple];

    /// Stable id byte stored in the container header.
    pub const fn id(self) -> u8 {
        match self {
            Self::XChaCha20Poly1305 => 0x01,
            Self::Aes256Gcm => 0x02,
            Self::Triple => 0x10,
        }
    }

    /// Resolves a header id byte back into a suite.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0x01 => Ok(Self::XChaCha20Poly1305),
            0x02 => Ok(Self::Aes256Gcm),
            0x10 => Ok(Self::Triple),
            _ => Err(CascadeError::Malformed("unknown cipher suite id")),
        }
    }

    /// Layer algorithms in encryption order.
    pub const fn layers(self) -> &'static [Algorithm] {
        match self {
            Self::XChaCha20Poly1305 => &[Algorithm::XChaCha20Poly1305],
            Self::Aes256Gcm => &[Algorithm::Aes256Gcm],
            Self::Triple => &[Algorithm::Aes256Gcm, Algorithm::Aes256GcmSiv, Algorithm::XChaCha20Poly1305],
        }
    }

    pub const fn layer_count(self) -> usize {
        self.layers().len()
    }

    /// Total key material the suite consumes, excluding the header MAC key.
    pub const fn key_len(self) -> usize {
        KEY_SIZE * self.layer_count()
    }

    /// Width of the container's nonce salt: one lane seed per layer,
    /// concatenated in layer order.
    pub fn nonce_salt_len(self) -> usize {
        self.layers().iter().map(|a| a.nonce_size()).sum()
    }

    /// Ciphertext growth per sealed message: one tag per layer. Nonces are
    /// never embedded in messages; they come from the lanes.
    pub fn overhead(self) -> usize {
        self.layers().iter().map(|a| a.tag_size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_suite_id_roundtrip() {
        for suite in CipherSuite::ALL {
            assert_eq!(CipherSuite::from_id(suite.id()).unwrap(), *suite);
        }
        assert!(CipherSuite::from_id(0xEE).is_err());
    }

    #[test]
    fn test_suite_parses_by_name() {
        assert_eq!(CipherSuite::from_str("triple").unwrap(), CipherSuite::Triple);
        assert_eq!(CipherSuite::from_str("XChaCha20Poly1305").unwrap(), CipherSuite::XChaCha20Poly1305);
        assert_eq!(CipherSuite::from_str("aes256gcm").unwrap(), CipherSuite::Aes256Gcm);
        assert!(CipherSuite::from_str("serpent").is_err());
    }

    #[test]
    fn test_triple_geometry() {
        let suite = CipherSuite::Triple;
        assert_eq!(suite.layer_count(), 3);
        assert_eq!(suite.key_len(), 96);
        // 12 (GCM) + 12 (GCM-SIV) + 24 (XChaCha)
        assert_eq!(suite.nonce_salt_len(), 48);
        assert_eq!(suite.overhead(), 48);
    }

    #[test]
    fn test_simple_geometry() {
        assert_eq!(CipherSuite::XChaCha20Poly1305.nonce_salt_len(), 24);
        assert_eq!(CipherSuite::Aes256Gcm.nonce_salt_len(), 12);
        assert_eq!(CipherSuite::XChaCha20Poly1305.overhead(), 16);
    }

    #[test]
    fn test_triple_outermost_layer_is_xchacha() {
        assert_eq!(*CipherSuite::Triple.layers().last().unwrap(), Algorithm::XChaCha20Poly1305);
    }
}
