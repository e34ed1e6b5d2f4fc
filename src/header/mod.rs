//! The on-disk container format.
//!
//! A container is a clear-text prelude, an HMAC over that prelude, one
//! cascade-sealed metadata block, and a stream of length-prefixed sealed
//! payload chunks:
//!
//! ```text
//! MAGIC          u32      0xCA5CADE1
//! VERSION        u16
//! SUITE          u8       cipher suite id
//! KDF_MEMORY     u32      Argon2id memory cost, KiB
//! KDF_ITERATIONS u32      Argon2id time cost
//! KDF_LANES      u8       Argon2id parallelism
//! SALT           [16]
//! NONCE_SALT     [suite.nonce_salt_len()]
//! HEADER_MAC     [32]     HMAC-SHA256 over everything above
//! METADATA       [METADATA_BLOCK + suite.overhead()]
//! CHUNK*                  u32 ciphertext length, then ciphertext
//! ```
//!
//! All integers are big-endian. [`ContainerWriter`] and [`ContainerReader`]
//! are strict state machines (header, then metadata, then chunks, then
//! finalize) and refuse out-of-order use, mirroring each other exactly.

mod mac;
pub mod metadata;

pub use mac::HeaderMac;
pub use metadata::Metadata;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::cascade::CipherSuite;
use crate::config::{CHUNK_SIZE, CURRENT_VERSION, MAC_SIZE, MAGIC_BYTES, METADATA_BLOCK, SALT_LEN};
use crate::error::{CascadeError, Result};
use crate::kdf::KdfTier;

/// The clear-text parameters of a container.
#[derive(Debug, Clone)]
pub struct Header {
    pub version: u16,
    pub suite: CipherSuite,
    pub kdf_memory: u32,
    pub kdf_iterations: u32,
    pub kdf_lanes: u8,
    pub salt: [u8; SALT_LEN],
    pub nonce_salt: Vec<u8>,
}

impl Header {
    /// Builds a current-version header for a fresh encryption session.
    pub fn new(suite: CipherSuite, tier: KdfTier, lanes: u32, salt: [u8; SALT_LEN], nonce_salt: Vec<u8>) -> Result<Self> {
        if nonce_salt.len() != suite.nonce_salt_len() {
            return Err(CascadeError::invalid(format!(
                "suite {suite} needs a {}-byte nonce salt, got {}",
                suite.nonce_salt_len(),
                nonce_salt.len()
            )));
        }

        Ok(Self {
            version: CURRENT_VERSION,
            suite,
            kdf_memory: tier.memory_kib(),
            kdf_iterations: tier.iterations(),
            kdf_lanes: lanes as u8,
            salt,
            nonce_salt,
        })
    }

    /// Serializes the prelude: every field the header MAC covers.
    pub fn prelude_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + self.nonce_salt.len());
        out.extend_from_slice(&MAGIC_BYTES.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.push(self.suite.id());
        out.extend_from_slice(&self.kdf_memory.to_be_bytes());
        out.extend_from_slice(&self.kdf_iterations.to_be_bytes());
        out.push(self.kdf_lanes);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce_salt);
        out
    }

    /// Sealed size of the metadata block for this suite.
    pub fn sealed_metadata_len(&self) -> usize {
        METADATA_BLOCK + self.suite.overhead()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum WriterState {
    Init,
    HeaderWritten,
    MetadataWritten,
    Finalized,
}

/// Writes a container in strict field order.
pub struct ContainerWriter<W> {
    writer: BufWriter<W>,
    state: WriterState,
    sealed_metadata_len: usize,
}

impl<W: AsyncWrite + Unpin> ContainerWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: BufWriter::new(writer), state: WriterState::Init, sealed_metadata_len: 0 }
    }

    /// Emits the prelude and its MAC. `Init -> HeaderWritten`.
    pub async fn write_header(&mut self, header: &Header, mac_key: &[u8]) -> Result<()> {
        if self.state != WriterState::Init {
            return Err(CascadeError::invalid("header already written"));
        }

        let prelude = header.prelude_bytes();
        let mac = HeaderMac::new(mac_key)?.compute(&prelude)?;

        self.writer.write_all(&prelude).await.map_err(CascadeError::DestinationIo)?;
        self.writer.write_all(&mac).await.map_err(CascadeError::DestinationIo)?;

        self.sealed_metadata_len = header.sealed_metadata_len();
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    /// Emits the cascade-sealed metadata block. `HeaderWritten ->
    /// MetadataWritten`. The block has a fixed sealed size per suite, so it
    /// carries no length prefix.
    pub async fn write_metadata(&mut self, sealed: &[u8]) -> Result<()> {
        if self.state != WriterState::HeaderWritten {
            return Err(CascadeError::invalid("metadata must follow the header"));
        }
        if sealed.len() != self.sealed_metadata_len {
            return Err(CascadeError::invalid("sealed metadata block has wrong size"));
        }

        self.writer.write_all(sealed).await.map_err(CascadeError::DestinationIo)?;
        self.state = WriterState::MetadataWritten;
        Ok(())
    }

    /// Emits one sealed payload chunk with its length prefix. Repeatable
    /// after the metadata block.
    pub async fn write_chunk(&mut self, ciphertext: &[u8]) -> Result<()> {
        if self.state != WriterState::MetadataWritten {
            return Err(CascadeError::invalid("chunks must follow the metadata block"));
        }

        self.writer
            .write_all(&(ciphertext.len() as u32).to_be_bytes())
            .await
            .map_err(CascadeError::DestinationIo)?;
        self.writer.write_all(ciphertext).await.map_err(CascadeError::DestinationIo)?;
        Ok(())
    }

    /// Flushes and ends the container; no more writes are possible.
    pub async fn finalize(mut self) -> Result<()> {
        if self.state != WriterState::MetadataWritten {
            return Err(CascadeError::invalid("container is incomplete"));
        }

        self.writer.flush().await.map_err(CascadeError::DestinationIo)?;
        self.state = WriterState::Finalized;
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ReaderState {
    Init,
    HeaderRead,
    MetadataRead,
}

/// Reads and validates a container in strict field order.
pub struct ContainerReader<R> {
    reader: BufReader<R>,
    state: ReaderState,
    prelude: Vec<u8>,
    stored_mac: [u8; MAC_SIZE],
    verified: bool,
    header: Option<Header>,
}

impl<R: AsyncRead + Unpin> ContainerReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            state: ReaderState::Init,
            prelude: Vec::new(),
            stored_mac: [0u8; MAC_SIZE],
            verified: false,
            header: None,
        }
    }

    /// Parses the prelude and the stored MAC. `Init -> HeaderRead`.
    ///
    /// A magic mismatch is fatal with no partial recovery. A version other
    /// than the current one is logged and tolerated in both directions: the
    /// format is additive, so best effort beats refusal.
    pub async fn read_header(&mut self) -> Result<Header> {
        if self.state != ReaderState::Init {
            return Err(CascadeError::invalid("header already read"));
        }

        let magic = u32::from_be_bytes(self.read_array::<4>().await?);
        if magic != MAGIC_BYTES {
            return Err(CascadeError::NotAContainer);
        }

        let version = u16::from_be_bytes(self.read_array::<2>().await?);
        if version > CURRENT_VERSION {
            tracing::warn!(version, current = CURRENT_VERSION, "container written by a newer release; proceeding best effort");
        } else if version < CURRENT_VERSION {
            tracing::warn!(version, current = CURRENT_VERSION, "legacy container version; parameters may differ");
        }

        let suite = CipherSuite::from_id(self.read_array::<1>().await?[0])?;
        let kdf_memory = u32::from_be_bytes(self.read_array::<4>().await?);
        let kdf_iterations = u32::from_be_bytes(self.read_array::<4>().await?);
        let kdf_lanes = self.read_array::<1>().await?[0];
        if kdf_memory == 0 || kdf_iterations == 0 || kdf_lanes == 0 {
            return Err(CascadeError::Malformed("zero KDF parameter"));
        }

        let salt: [u8; SALT_LEN] = self.read_array().await?;
        let mut nonce_salt = vec![0u8; suite.nonce_salt_len()];
        self.read_exact(&mut nonce_salt).await?;
        self.stored_mac = self.read_array().await?;

        let header = Header { version, suite, kdf_memory, kdf_iterations, kdf_lanes, salt, nonce_salt };
        self.prelude = header.prelude_bytes();
        self.header = Some(header.clone());
        self.state = ReaderState::HeaderRead;
        Ok(header)
    }

    /// Checks the header MAC against the derived MAC key. Must succeed
    /// before the metadata block may be read; failure means wrong
    /// passphrase or a tampered prelude.
    pub fn verify(&mut self, mac_key: &[u8]) -> Result<()> {
        if self.state != ReaderState::HeaderRead {
            return Err(CascadeError::invalid("verify requires a parsed header"));
        }

        HeaderMac::new(mac_key)?.verify(&self.stored_mac, &self.prelude)?;
        self.verified = true;
        Ok(())
    }

    /// Reads the sealed metadata block. `HeaderRead -> MetadataRead`, only
    /// after [`Self::verify`] has passed.
    pub async fn read_metadata(&mut self) -> Result<Vec<u8>> {
        if self.state != ReaderState::HeaderRead || !self.verified {
            return Err(CascadeError::invalid("metadata requires a verified header"));
        }

        let len = self.header.as_ref().expect("header parsed").sealed_metadata_len();
        let mut sealed = vec![0u8; len];
        self.read_exact(&mut sealed).await?;

        self.state = ReaderState::MetadataRead;
        Ok(sealed)
    }

    /// Reads the next sealed payload chunk, or `None` at end of container.
    pub async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.state != ReaderState::MetadataRead {
            return Err(CascadeError::invalid("chunks follow the metadata block"));
        }

        let mut prefix = [0u8; 4];
        match self.reader.read_exact(&mut prefix).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(CascadeError::SourceIo(e)),
        }

        let len = u32::from_be_bytes(prefix) as usize;
        let max = CHUNK_SIZE + self.header.as_ref().expect("header parsed").suite.overhead();
        if len == 0 || len > max {
            return Err(CascadeError::Malformed("chunk length out of range"));
        }

        let mut ciphertext = vec![0u8; len];
        self.read_exact(&mut ciphertext).await?;
        Ok(Some(ciphertext))
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf).await.map(|_| ()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                CascadeError::Malformed("container truncated")
            } else {
                CascadeError::SourceIo(e)
            }
        })
    }

    async fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out).await?;
        Ok(out)
    }
}
