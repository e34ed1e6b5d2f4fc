//! Header authentication.
//!
//! The clear-text prelude (magic through nonce salt) is covered by an
//! HMAC-SHA256 keyed from the tail of the derived key material. Verifying
//! it before any payload work gives an early, constant-time answer to
//! "wrong passphrase or tampered header" without weakening the
//! indistinguishability of the two.

use hmac::{Hmac, Mac as _};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::MAC_SIZE;
use crate::error::{CascadeError, Result};

pub struct HeaderMac {
    key: Vec<u8>,
}

impl HeaderMac {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(CascadeError::invalid("empty mac key"));
        }
        Ok(Self { key: key.to_vec() })
    }

    pub fn compute(&self, data: &[u8]) -> Result<[u8; MAC_SIZE]> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|_| CascadeError::invalid("bad mac key length"))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    /// Constant-time comparison; a mismatch is an authentication failure,
    /// indistinguishable from a failed payload tag.
    pub fn verify(&self, expected: &[u8], data: &[u8]) -> Result<()> {
        if expected.len() != MAC_SIZE {
            return Err(CascadeError::Malformed("truncated header mac"));
        }

        let computed = self.compute(data)?;
        if bool::from(computed.ct_eq(expected)) {
            Ok(())
        } else {
            Err(CascadeError::Authentication)
        }
    }
}

impl Drop for HeaderMac {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.key.zeroize();
    }
}
