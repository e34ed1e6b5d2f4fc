//! Zeroizing wrappers for passphrases and derived key material.
//!
//! Both types guarantee zero-on-drop via `secrecy`, and neither leaks its
//! contents through `Debug`. Key material only ever leaves these wrappers as
//! short-lived borrowed slices at the point of use.

use secrecy::{ExposeSecret, SecretBox, SecretString};

/// Derived key material: the Argon2id output holding every layer key plus
/// the header MAC key. Owned by one session and zeroized on drop.
pub struct KeyMaterial {
    inner: SecretBox<Vec<u8>>,
}

impl KeyMaterial {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { inner: SecretBox::new(Box::new(data)) }
    }

    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial([... {} bytes ...])", self.len())
    }
}

/// A user passphrase. Never persisted, never printed.
pub struct Password {
    inner: SecretString,
}

impl Password {
    pub fn new(password: &str) -> Self {
        Self { inner: SecretString::from(password.to_owned()) }
    }

    pub fn from_string(password: String) -> Self {
        Self { inner: SecretString::from(password) }
    }

    pub fn expose_secret(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([redacted])")
    }
}
