//! Passphrase key derivation with Argon2id.
//!
//! One memory-hard derivation per session turns the passphrase and the
//! container salt into every key the cascade needs: `KEY_SIZE` bytes per
//! AEAD layer followed by the header MAC key. The derivation is fully
//! deterministic given identical inputs, which is what lets decryption
//! reproduce the keys bit-for-bit from the parameters stored in the header.
//!
//! Cost parameters come in three fixed tiers rather than free-form knobs.
//! The raw values (not the tier tag) are what end up in the container, so a
//! reader never needs to know which tier produced them.

use argon2::Algorithm::Argon2id;
use argon2::Version::V0x13;
use argon2::{Argon2, Params};

use crate::config::{KDF_LANES, SALT_LEN};
use crate::error::{CascadeError, Result};
use crate::secret::{KeyMaterial, Password};

/// Fixed Argon2id cost tiers.
///
/// A tier maps to a (memory, iterations) pair chosen so that Interactive
/// finishes in well under a second on typical hardware while Sensitive is
/// deliberately slow. The call blocks for its full duration; a session must
/// not treat the delay as a hang.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum KdfTier {
    /// 64 MiB, 3 iterations. Suitable for routine use.
    #[default]
    Interactive,

    /// 256 MiB, 4 iterations.
    Moderate,

    /// 1 GiB, 5 iterations. For long-lived archives.
    Sensitive,
}

impl KdfTier {
    /// All tiers, for selection menus.
    pub const ALL: &'static [Self] = &[Self::Interactive, Self::Moderate, Self::Sensitive];

    /// Memory cost in KiB.
    pub const fn memory_kib(self) -> u32 {
        match self {
            Self::Interactive => 64 * 1024,
            Self::Moderate => 256 * 1024,
            Self::Sensitive => 1024 * 1024,
        }
    }

    /// Time cost (number of passes over memory).
    pub const fn iterations(self) -> u32 {
        match self {
            Self::Interactive => 3,
            Self::Moderate => 4,
            Self::Sensitive => 5,
        }
    }
}

/// Derives `output_len` bytes of key material from a passphrase.
///
/// The salt must be exactly [`SALT_LEN`] bytes and the passphrase non-empty.
/// Failure here (parameter rejection, allocation failure for the requested
/// memory) is fatal to the session before any cipher work begins; callers
/// must not retry, since the cost is intentional.
pub fn derive(
    password: &Password,
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    lanes: u32,
    output_len: usize,
) -> Result<KeyMaterial> {
    if password.expose_secret().is_empty() {
        return Err(CascadeError::invalid("passphrase cannot be empty"));
    }
    if salt.len() != SALT_LEN {
        return Err(CascadeError::invalid(format!("salt must be {SALT_LEN} bytes, got {}", salt.len())));
    }

    let params = Params::new(memory_kib, iterations, lanes, Some(output_len))
        .map_err(|e| CascadeError::KeyDerivation(format!("invalid argon2 parameter: {e}")))?;
    let argon2 = Argon2::new(Argon2id, V0x13, params);

    let mut material = vec![0u8; output_len];
    argon2
        .hash_password_into(password.expose_secret().as_bytes(), salt, &mut material)
        .map_err(|e| CascadeError::KeyDerivation(e.to_string()))?;

    Ok(KeyMaterial::from_vec(material))
}

/// Derives with a tier's fixed parameters and the global lane count.
pub fn derive_tiered(password: &Password, salt: &[u8], tier: KdfTier, output_len: usize) -> Result<KeyMaterial> {
    derive(password, salt, tier.memory_kib(), tier.iterations(), KDF_LANES, output_len)
}
