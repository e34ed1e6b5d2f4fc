//! Common type definitions shared across the application.

use std::fmt::{Display, Formatter, Result};
use std::path::PathBuf;

/// The type of file operation to perform.
///
/// Used to pick the processing direction and derive output paths.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProcessorMode {
    /// Encrypt the file, producing a `.ccx` container.
    Encrypt,

    /// Decrypt a `.ccx` container back to the original file.
    Decrypt,
}

impl ProcessorMode {
    /// All modes, for selection menus.
    pub const ALL: &'static [Self] = &[Self::Encrypt, Self::Decrypt];

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypt",
            Self::Decrypt => "Decrypt",
        }
    }
}

impl Display for ProcessorMode {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}

/// A processing operation in progress.
///
/// Carries progress labels and maps back to its [`ProcessorMode`]. A cascade
/// session is bound to exactly one of these for its whole lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Processing {
    Encryption,
    Decryption,
}

impl Processing {
    /// Progress label shown next to the progress bar.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encryption => "Encrypting...",
            Self::Decryption => "Decrypting...",
        }
    }

    #[inline]
    pub fn mode(self) -> ProcessorMode {
        match self {
            Self::Encryption => ProcessorMode::Encrypt,
            Self::Decryption => ProcessorMode::Decrypt,
        }
    }
}

impl Display for Processing {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(match self {
            Self::Encryption => "encryption",
            Self::Decryption => "decryption",
        })
    }
}

/// Basic facts about a file on disk, gathered before processing.
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub is_container: bool,
}
