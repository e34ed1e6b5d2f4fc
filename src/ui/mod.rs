//! Terminal output and interaction.
//!
//! Thin event surface around the core: progress bars, prompts, and styled
//! status lines. Nothing in here participates in the cryptographic
//! contract.

pub mod progress;
pub mod prompt;

use std::path::Path;

use anyhow::Result;
use bytesize::ByteSize;
use console::{Term, style};

use crate::types::{FileInfo, ProcessorMode};

/// Prints a per-file success line.
pub fn show_success(mode: ProcessorMode, path: &Path) {
    let action = match mode {
        ProcessorMode::Encrypt => "encrypted",
        ProcessorMode::Decrypt => "decrypted",
    };

    println!("{} {}", style("✓").green(), style(format!("File {action} successfully: {}", path.display())).bold());
}

/// Prints a per-file failure line. The batch goes on; this is the record.
pub fn show_failure(path: &Path, error: &dyn std::fmt::Display) {
    eprintln!("{} {}", style("✗").red(), style(format!("{}: {error}", path.display())).bold());
}

pub fn show_source_deleted(path: &Path) {
    println!("{} {}", style("✓").green(), format!("Source file deleted: {}", path.display()));
}

/// Prints the input files before an interactive run.
pub fn show_file_info(files: &[FileInfo]) {
    println!();
    for info in files {
        let status = if info.is_container { style("container").cyan() } else { style("plain").green() };
        let name = info.path.file_name().map_or_else(|| info.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        println!("  {:32} {:>10}  {status}", style(name).bold(), ByteSize::b(info.size).to_string());
    }
    println!();
}

pub fn clear_screen() -> Result<()> {
    Term::stdout().clear_screen().map_err(|e| anyhow::anyhow!("failed to clear screen: {e}"))
}

pub fn print_banner() {
    let banner = r"
                                         _
   ___ __ _ ___  ___ _ __ _   _ _ __ | |_
  / __/ _` / __|/ __| '__| | | | '_ \| __|
 | (_| (_| \__ \ (__| |  | |_| | |_) | |_
  \___\__,_|___/\___|_|   \__, | .__/ \__|
                          |___/|_|
";

    println!("{}", style(banner).green().bold());
}
