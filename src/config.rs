//! Global configuration constants.
//!
//! All fixed parameters of the container format and the cascade engine live
//! here: magic bytes, format version, key and nonce geometry, KDF defaults,
//! and user-facing limits. Anything stored inside a container header has its
//! width documented next to it, because the on-disk layout must stay
//! self-consistent across releases.

/// Application name used in user interfaces and log output.
pub const APP_NAME: &str = "Cascrypt";

/// File extension for encrypted containers.
pub const FILE_EXTENSION: &str = ".ccx";

/// Magic bytes identifying a cascrypt container (first 4 bytes on disk,
/// big-endian). Checked before anything else during decryption; a mismatch
/// means the input is not a container at all.
pub const MAGIC_BYTES: u32 = 0xCA5C_ADE1;

/// Current container format version (u16, big-endian, directly after the
/// magic). Readers warn-and-continue on other versions rather than refusing:
/// the layout is additive, so a best-effort parse is more useful than a hard
/// error on either side of an upgrade.
pub const CURRENT_VERSION: u16 = 0x0001;

/// Public context string bound as associated data into every AEAD layer.
///
/// Ties ciphertexts to this application's container format so they cannot be
/// replayed into a different tool that happens to share primitives. Public,
/// fixed, and authenticated but never encrypted.
pub const APP_CONTEXT: &[u8] = b"cascrypt.container.v1";

// === Key derivation ===

/// Length of the Argon2id salt in bytes, stored in the clear in the header.
pub const SALT_LEN: usize = 16;

/// Argon2id lane count. Fixed rather than tiered: parallelism changes the
/// derived key, so it must be identical on both sides, and four lanes suit
/// typical hardware.
pub const KDF_LANES: u32 = 4;

/// Size of each AEAD layer key in bytes (256-bit keys for every supported
/// algorithm).
pub const KEY_SIZE: usize = 32;

/// Size of the header MAC key in bytes, derived after the layer keys from
/// the same Argon2id output.
pub const MAC_KEY_LEN: usize = 32;

/// Size of the HMAC-SHA256 header MAC in bytes.
pub const MAC_SIZE: usize = 32;

// === Cascade geometry ===

/// AEAD authentication tag size in bytes. All supported algorithms
/// (AES-256-GCM, AES-256-GCM-SIV, XChaCha20-Poly1305) use 128-bit tags, so
/// each layer grows a message by exactly this much.
pub const TAG_SIZE: usize = 16;

/// XChaCha20-Poly1305 nonce width in bytes.
pub const XCHACHA_NONCE_SIZE: usize = 24;

/// AES-256-GCM / AES-256-GCM-SIV nonce width in bytes.
pub const AES_NONCE_SIZE: usize = 12;

// === Streaming ===

/// Plaintext chunk size for streaming encryption. Chunks are sealed and
/// written independently; 64 KiB keeps peak memory flat while amortising
/// per-chunk tag overhead.
pub const CHUNK_SIZE: usize = 64 * 1024;

// === Metadata block ===

/// Size of the metadata plaintext block before sealing. The original
/// filename, size and content hash are packed into this block and the rest
/// is filled with random bytes, so the sealed block has the same length for
/// every file and does not leak the exact filename length.
pub const METADATA_BLOCK: usize = 384;

/// Maximum filename length (bytes, UTF-8) storable in the metadata block.
pub const MAX_FILENAME_LENGTH: usize = 256;

/// Size of the BLAKE3 content hash stored in the metadata block.
pub const HASH_SIZE: usize = 32;

// === User interface ===

/// Minimum accepted passphrase length.
pub const PASSWORD_MIN_LENGTH: usize = 8;
