//! File handles and path helpers around tokio's filesystem API.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader, BufWriter};

use crate::config::{CHUNK_SIZE, FILE_EXTENSION, HASH_SIZE};
use crate::error::{CascadeError, Result};
use crate::types::{FileInfo, ProcessorMode};

/// A file participating in a session, as source or destination.
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// True if the filename carries the container extension.
    pub fn is_container(&self) -> bool {
        self.path.as_os_str().to_string_lossy().ends_with(FILE_EXTENSION)
    }

    /// The file's name component, as UTF-8.
    pub fn name(&self) -> Result<String> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(ToOwned::to_owned)
            .ok_or_else(|| CascadeError::invalid(format!("path has no usable filename: {}", self.path.display())))
    }

    /// Size in bytes, or a source I/O error if the file is unreadable.
    pub async fn size(&self) -> Result<u64> {
        let meta = fs::metadata(&self.path).await.map_err(CascadeError::SourceIo)?;
        Ok(meta.len())
    }

    pub async fn info(&self) -> Result<FileInfo> {
        Ok(FileInfo { path: self.path.clone(), size: self.size().await?, is_container: self.is_container() })
    }

    /// Opens the file for buffered reading.
    pub async fn open(&self) -> Result<BufReader<fs::File>> {
        let file = fs::File::open(&self.path).await.map_err(CascadeError::SourceIo)?;
        Ok(BufReader::new(file))
    }

    /// Creates (or truncates) the file for buffered writing, creating
    /// parent directories as needed.
    pub async fn create(&self) -> Result<BufWriter<fs::File>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(CascadeError::DestinationIo)?;
        }

        let file = fs::File::create(&self.path).await.map_err(CascadeError::DestinationIo)?;
        Ok(BufWriter::new(file))
    }

    pub async fn delete(&self) -> Result<()> {
        fs::remove_file(&self.path).await.map_err(CascadeError::SourceIo)
    }

    /// Removes a partial destination artifact after a failed session.
    /// Best effort: the original failure matters more than this cleanup.
    pub async fn delete_partial(&self) {
        if let Err(e) = fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial output");
        }
    }

    /// BLAKE3 hash of the file contents, streamed in chunk-sized reads.
    pub async fn content_hash(&self) -> Result<[u8; HASH_SIZE]> {
        let mut reader = self.open().await?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let n = reader.read(&mut buffer).await.map_err(CascadeError::SourceIo)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Default output path for the given mode: append the container
    /// extension when encrypting, strip it when decrypting.
    pub fn output_path(&self, mode: ProcessorMode) -> PathBuf {
        match mode {
            ProcessorMode::Encrypt => {
                let mut name = self.path.as_os_str().to_os_string();
                name.push(FILE_EXTENSION);
                PathBuf::from(name)
            }
            ProcessorMode::Decrypt => self
                .path
                .to_string_lossy()
                .strip_suffix(FILE_EXTENSION)
                .map_or_else(|| self.path.clone(), PathBuf::from),
        }
    }

    /// Output path for decryption using the filename recovered from the
    /// container metadata, placed next to the container.
    pub fn sibling(&self, name: &str) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
            _ => PathBuf::from(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn test_create_write_read() {
        let dir = tempdir().unwrap();
        let file = File::new(dir.path().join("nested/dir/data.bin"));

        let mut writer = file.create().await.unwrap();
        writer.write_all(b"hello cascade").await.unwrap();
        writer.flush().await.unwrap();

        assert_eq!(file.size().await.unwrap(), 13);
        assert_eq!(file.content_hash().await.unwrap(), *blake3::hash(b"hello cascade").as_bytes());
    }

    #[test]
    fn test_output_path_encrypt_appends_extension() {
        let file = File::new("notes.txt");
        assert_eq!(file.output_path(ProcessorMode::Encrypt), PathBuf::from("notes.txt.ccx"));
    }

    #[test]
    fn test_output_path_decrypt_strips_extension() {
        let file = File::new("notes.txt.ccx");
        assert_eq!(file.output_path(ProcessorMode::Decrypt), PathBuf::from("notes.txt"));

        // No extension to strip: path is returned unchanged.
        let odd = File::new("archive.bin");
        assert_eq!(odd.output_path(ProcessorMode::Decrypt), PathBuf::from("archive.bin"));
    }

    #[test]
    fn test_is_container() {
        assert!(File::new("a.ccx").is_container());
        assert!(!File::new("a.txt").is_container());
    }

    #[test]
    fn test_sibling_stays_in_directory() {
        let file = File::new("/tmp/archive/secret.ccx");
        assert_eq!(file.sibling("secret.pdf"), PathBuf::from("/tmp/archive/secret.pdf"));

        let bare = File::new("secret.ccx");
        assert_eq!(bare.sibling("secret.pdf"), PathBuf::from("secret.pdf"));
    }

    #[tokio::test]
    async fn test_missing_file_is_source_io() {
        let file = File::new("/nonexistent/definitely/missing.bin");
        assert!(matches!(file.size().await, Err(CascadeError::SourceIo(_))));
    }
}
