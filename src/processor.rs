//! High-level per-file encryption and decryption sessions.
//!
//! A [`Processor`] drives one file end to end: entropy, key derivation,
//! container framing, cascade setup and the chunk stream. Sessions are
//! strictly sequential internally; callers that batch multiple files run
//! one session after another and decide themselves whether a failure stops
//! the batch.
//!
//! Whatever goes wrong after the destination file was created (I/O,
//! authentication, cancellation), the partial artifact is deleted before
//! the error propagates. A session either yields a complete, fully
//! authenticated file or nothing.

use std::path::PathBuf;

use crate::cascade::{Cascade, CipherSuite};
use crate::config::{KDF_LANES, MAC_KEY_LEN, SALT_LEN};
use crate::error::Result;
use crate::file::File;
use crate::header::{ContainerReader, ContainerWriter, Header, Metadata};
use crate::kdf::{self, KdfTier};
use crate::rng::{EntropySource, OsEntropy};
use crate::secret::Password;
use crate::stream::{CancelFlag, decrypt_stream, encrypt_stream};
use crate::types::Processing;
use crate::ui::progress::Bar;

pub struct Processor {
    password: Password,
    suite: CipherSuite,
    tier: KdfTier,
}

impl Processor {
    pub fn new(password: Password, suite: CipherSuite, tier: KdfTier) -> Self {
        Self { password, suite, tier }
    }

    /// Encrypts `input` into a fresh container at `output`.
    pub async fn encrypt(&self, input: &File, output: &File, cancel: &CancelFlag) -> Result<()> {
        let info = input.info().await?;
        tracing::info!(path = %info.path.display(), size = info.size, suite = %self.suite, "encryption started");

        let metadata = Metadata::new(input.name()?, info.size, input.content_hash().await?)?;

        let mut rng = OsEntropy;
        let salt: [u8; SALT_LEN] = rng.bytes()?;
        let nonce_salt = rng.vec(self.suite.nonce_salt_len())?;

        tracing::info!(tier = %self.tier, "deriving keys (this may take a moment)");
        let material = kdf::derive_tiered(&self.password, &salt, self.tier, self.suite.key_len() + MAC_KEY_LEN)?;

        let header = Header::new(self.suite, self.tier, KDF_LANES, salt, nonce_salt.clone())?;

        let result = self.encrypt_inner(input, output, &header, material.expose_secret(), &nonce_salt, &metadata, &mut rng, cancel).await;
        if result.is_err() {
            output.delete_partial().await;
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn encrypt_inner(
        &self,
        input: &File,
        output: &File,
        header: &Header,
        material: &[u8],
        nonce_salt: &[u8],
        metadata: &Metadata,
        rng: &mut dyn EntropySource,
        cancel: &CancelFlag,
    ) -> Result<()> {
        let (layer_keys, mac_key) = material.split_at(self.suite.key_len());
        let mut cascade = Cascade::new(self.suite, Processing::Encryption, layer_keys, nonce_salt)?;

        let mut writer = ContainerWriter::new(output.create().await?);
        writer.write_header(header, mac_key).await?;
        writer.write_metadata(&cascade.seal(&metadata.encode_block(rng)?)?).await?;

        let bar = Bar::new(metadata.size(), Processing::Encryption.label());
        let mut source = input.open().await?;
        encrypt_stream(&mut source, &mut writer, &mut cascade, cancel, Some(&bar)).await?;
        writer.finalize().await?;
        bar.finish();

        tracing::info!(path = %output.path().display(), "encryption finished");
        Ok(())
    }

    /// Decrypts the container at `input`.
    ///
    /// With no explicit `output`, the destination is the original filename
    /// recovered from the metadata, placed next to the container. Returns
    /// the path actually written.
    pub async fn decrypt(&self, input: &File, output: Option<&File>, cancel: &CancelFlag) -> Result<PathBuf> {
        tracing::info!(path = %input.path().display(), "decryption started");

        let mut reader = ContainerReader::new(input.open().await?);
        let header = reader.read_header().await?;

        tracing::info!(memory_kib = header.kdf_memory, iterations = header.kdf_iterations, "deriving keys (this may take a moment)");
        let material = kdf::derive(
            &self.password,
            &header.salt,
            header.kdf_memory,
            header.kdf_iterations,
            u32::from(header.kdf_lanes),
            header.suite.key_len() + MAC_KEY_LEN,
        )?;
        let (layer_keys, mac_key) = material.expose_secret().split_at(header.suite.key_len());

        reader.verify(mac_key)?;

        let mut cascade = Cascade::new(header.suite, Processing::Decryption, layer_keys, &header.nonce_salt)?;
        let sealed = reader.read_metadata().await?;
        let metadata = Metadata::decode_block(&cascade.open(&sealed)?)?;

        let destination = match output {
            Some(file) => File::new(file.path()),
            None => File::new(input.sibling(metadata.name())),
        };

        if let Err(e) = Self::decrypt_inner(&mut reader, &destination, &mut cascade, &metadata, cancel).await {
            destination.delete_partial().await;
            return Err(e);
        }

        tracing::info!(path = %destination.path().display(), hash = %metadata.hash_hex(), "decryption finished");
        Ok(destination.path().to_path_buf())
    }

    async fn decrypt_inner(
        reader: &mut ContainerReader<tokio::io::BufReader<tokio::fs::File>>,
        destination: &File,
        cascade: &mut Cascade,
        metadata: &Metadata,
        cancel: &CancelFlag,
    ) -> Result<()> {
        let bar = Bar::new(metadata.size(), Processing::Decryption.label());
        let mut dest = destination.create().await?;
        decrypt_stream(reader, &mut dest, cascade, metadata, cancel, Some(&bar)).await?;
        bar.finish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::error::CascadeError;
    use crate::types::ProcessorMode;

    fn processor(password: &str, suite: CipherSuite) -> Processor {
        Processor::new(Password::new(password), suite, KdfTier::Interactive)
    }

    #[tokio::test]
    async fn test_roundtrip_with_filename_recovery() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("quarterly report.xlsx");
        tokio::fs::write(&src, b"cells and figures").await.unwrap();

        let input = File::new(&src);
        let container = File::new(input.output_path(ProcessorMode::Encrypt));
        let cancel = CancelFlag::new();

        processor("a sound passphrase", CipherSuite::Triple).encrypt(&input, &container, &cancel).await.unwrap();

        // Remove the original so decryption has to recreate it from
        // metadata alone.
        tokio::fs::remove_file(&src).await.unwrap();

        let recovered = processor("a sound passphrase", CipherSuite::Triple)
            .decrypt(&container, None, &cancel)
            .await
            .unwrap();

        assert_eq!(recovered, src);
        assert_eq!(tokio::fs::read(&src).await.unwrap(), b"cells and figures");
    }

    #[tokio::test]
    async fn test_wrong_passphrase_leaves_no_output() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("secret.txt");
        tokio::fs::write(&src, b"for your eyes only").await.unwrap();

        let input = File::new(&src);
        let container = File::new(input.output_path(ProcessorMode::Encrypt));
        let cancel = CancelFlag::new();

        processor("correct", CipherSuite::XChaCha20Poly1305).encrypt(&input, &container, &cancel).await.unwrap();

        let result = processor("incorrect", CipherSuite::XChaCha20Poly1305).decrypt(&container, None, &cancel).await;
        assert!(matches!(result, Err(CascadeError::Authentication)));
        assert!(!dir.path().join("secret.txt.ccx.out").exists());
        // The header MAC fails before a destination is even created.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_tampered_container_deletes_partial_output() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("data.bin");
        tokio::fs::write(&src, vec![0x42u8; 150_000]).await.unwrap();

        let input = File::new(&src);
        let container = File::new(input.output_path(ProcessorMode::Encrypt));
        let cancel = CancelFlag::new();

        processor("a sound passphrase", CipherSuite::Aes256Gcm).encrypt(&input, &container, &cancel).await.unwrap();

        // Corrupt a byte near the end of the payload so earlier chunks
        // decrypt fine and a partial output does get written first.
        let mut bytes = tokio::fs::read(container.path()).await.unwrap();
        let n = bytes.len();
        bytes[n - 5] ^= 0x80;
        tokio::fs::write(container.path(), &bytes).await.unwrap();

        tokio::fs::remove_file(&src).await.unwrap();

        let result = processor("a sound passphrase", CipherSuite::Aes256Gcm).decrypt(&container, None, &cancel).await;
        assert!(matches!(result, Err(CascadeError::Authentication)));
        assert!(!src.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_source_io() {
        let dir = tempdir().unwrap();
        let input = File::new(dir.path().join("does-not-exist.txt"));
        let output = File::new(dir.path().join("out.ccx"));
        let cancel = CancelFlag::new();

        let result = processor("irrelevant", CipherSuite::Triple).encrypt(&input, &output, &cancel).await;
        assert!(matches!(result, Err(CascadeError::SourceIo(_))));
    }
}
