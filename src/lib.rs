//! Cascrypt - layered cascade file encryption.
//!
//! A file encryption engine and CLI built around:
//! - up to three independently keyed AEAD layers (AES-256-GCM,
//!   AES-256-GCM-SIV, XChaCha20-Poly1305) applied in order and removed in
//!   reverse
//! - Argon2id for passphrase key derivation, in fixed cost tiers
//! - deterministic per-layer nonce lanes advanced across streamed chunks
//! - a self-describing container format with an authenticated metadata
//!   block (original filename, size, BLAKE3 content hash)

pub mod app;
pub mod cascade;
pub mod config;
pub mod error;
pub mod file;
pub mod header;
pub mod kdf;
pub mod processor;
pub mod rng;
pub mod secret;
pub mod stream;
pub mod types;
pub mod ui;
