//! Interactive prompts for wizard mode and passphrase entry.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inquire::validator::Validation;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};

use crate::cascade::CipherSuite;
use crate::kdf::KdfTier;
use crate::types::ProcessorMode;

/// Prompt handler; carries the passphrase policy.
pub struct Prompt {
    password_min_length: usize,
}

impl Prompt {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }

    /// Passphrase entry for encryption: masked, validated, entered twice.
    /// A typo in an encryption passphrase locks the data away for good, so
    /// confirmation is not optional here.
    pub fn prompt_encryption_password(&self) -> Result<String> {
        let min = self.password_min_length;
        Password::new("Enter encryption passphrase:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_custom_confirmation_message("Confirm passphrase:")
            .with_custom_confirmation_error_message("The passphrases do not match.")
            .with_validator(move |input: &str| -> Result<Validation, inquire::CustomUserError> {
                if input.trim().is_empty() {
                    return Ok(Validation::Invalid("passphrase cannot be empty or whitespace".into()));
                }
                if input.len() < min {
                    return Ok(Validation::Invalid(format!("passphrase must be at least {min} characters").into()));
                }
                Ok(Validation::Valid)
            })
            .prompt()
            .context("passphrase input failed")
    }

    /// Passphrase entry for decryption: single entry, no confirmation. A
    /// wrong passphrase is caught by the header MAC.
    pub fn prompt_decryption_password(&self) -> Result<String> {
        Password::new("Enter decryption passphrase:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("passphrase input failed")
    }

    pub fn select_processing_mode() -> Result<ProcessorMode> {
        Select::new("Select operation", ProcessorMode::ALL.to_vec()).prompt().context("mode selection failed")
    }

    pub fn select_suite() -> Result<CipherSuite> {
        Select::new("Select cipher suite", CipherSuite::ALL.to_vec()).prompt().context("suite selection failed")
    }

    pub fn select_tier() -> Result<KdfTier> {
        Select::new("Select key derivation tier", KdfTier::ALL.to_vec()).prompt().context("tier selection failed")
    }

    pub fn input_path() -> Result<PathBuf> {
        let raw = Text::new("Path to file:").prompt().context("path input failed")?;
        Ok(PathBuf::from(raw.trim()))
    }

    pub fn confirm_file_overwrite(path: &Path) -> Result<bool> {
        Self::confirm(&format!("Output file {} already exists. Overwrite?", display_name(path)))
    }

    pub fn confirm_file_deletion(path: &Path, label: &str) -> Result<bool> {
        Self::confirm(&format!("Delete {label} file {}?", display_name(path)))
    }

    fn confirm(message: &str) -> Result<bool> {
        Confirm::new(message).with_default(false).prompt().context("confirmation failed")
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
