//! Command-line application: argument parsing, batch driving, wizard mode.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::cascade::CipherSuite;
use crate::config::PASSWORD_MIN_LENGTH;
use crate::error::CascadeError;
use crate::file::File;
use crate::kdf::KdfTier;
use crate::processor::Processor;
use crate::secret::Password;
use crate::stream::CancelFlag;
use crate::types::{Processing, ProcessorMode};
use crate::ui;
use crate::ui::prompt::Prompt;

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt one or more files into containers.
    Encrypt {
        /// Source file(s). Each gets its own container.
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Destination path (single input only; default appends the
        /// container extension).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Passphrase; prompted with confirmation when omitted.
        #[arg(short, long)]
        password: Option<String>,

        /// Cipher suite: xchacha20poly1305, aes256gcm or triple.
        #[arg(short, long, default_value = "xchacha20poly1305")]
        suite: String,

        /// Key derivation tier: interactive, moderate or sensitive.
        #[arg(short, long, default_value = "interactive")]
        tier: String,
    },

    /// Decrypt one or more containers.
    Decrypt {
        /// Container file(s).
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Destination path (single input only; default restores the
        /// original filename from the container).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Passphrase; prompted when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Guided wizard mode.
    Interactive,
}

#[derive(Parser)]
#[command(name = "cascrypt", version, about = "Encrypt files with layered AEAD cascades and Argon2id key derivation.")]
pub struct App {
    #[command(subcommand)]
    command: Option<Commands>,
}

impl App {
    /// Installs the tracing subscriber and parses arguments.
    pub fn init() -> Result<Self> {
        let subscriber = tracing_subscriber::fmt().with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Self::parse())
    }

    pub async fn execute(self) -> Result<()> {
        let cancel = CancelFlag::new();
        Self::install_cancel_handler(&cancel);

        let prompt = Prompt::new(PASSWORD_MIN_LENGTH);
        match self.command {
            Some(Commands::Encrypt { input, output, password, suite, tier }) => {
                let suite = CipherSuite::from_str(&suite).map_err(|_| anyhow::anyhow!("unknown cipher suite: {suite}"))?;
                let tier = KdfTier::from_str(&tier).map_err(|_| anyhow::anyhow!("unknown KDF tier: {tier}"))?;
                Self::run_batch(input, output, password, suite, tier, Processing::Encryption, &prompt, &cancel).await
            }
            Some(Commands::Decrypt { input, output, password }) => {
                Self::run_batch(input, output, password, CipherSuite::default(), KdfTier::default(), Processing::Decryption, &prompt, &cancel)
                    .await
            }
            Some(Commands::Interactive) | None => Self::run_interactive(&prompt, &cancel).await,
        }
    }

    /// Ctrl-C flips the shared cancel flag; sessions notice at their next
    /// chunk boundary and clean up their partial output themselves.
    fn install_cancel_handler(cancel: &CancelFlag) {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("cancellation requested; stopping at the next chunk boundary");
                cancel.cancel();
            }
        });
    }

    /// Runs one mode over a batch of files. A failing file is reported and
    /// the batch moves on; only cancellation stops the loop early. Exits
    /// nonzero if anything failed.
    #[allow(clippy::too_many_arguments)]
    async fn run_batch(
        inputs: Vec<PathBuf>,
        output: Option<PathBuf>,
        password: Option<String>,
        suite: CipherSuite,
        tier: KdfTier,
        processing: Processing,
        prompt: &Prompt,
        cancel: &CancelFlag,
    ) -> Result<()> {
        if output.is_some() && inputs.len() > 1 {
            bail!("--output requires exactly one --input");
        }

        let password = match password {
            Some(password) => Password::from_string(password),
            None => Self::get_password(prompt, processing)?,
        };
        let processor = Processor::new(password, suite, tier);

        let total = inputs.len();
        let mut failures = 0usize;

        for path in inputs {
            let input = File::new(&path);
            let result = Self::process_one(&processor, &input, output.as_deref().map(File::new), processing, cancel).await;

            match result {
                Ok(written) => ui::show_success(processing.mode(), &written),
                Err(CascadeError::Aborted) => {
                    ui::show_failure(&path, &CascadeError::Aborted);
                    bail!("aborted by user");
                }
                Err(e) => {
                    ui::show_failure(&path, &e);
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            bail!("{failures} of {total} file(s) failed");
        }
        Ok(())
    }

    async fn process_one(
        processor: &Processor,
        input: &File,
        output: Option<File>,
        processing: Processing,
        cancel: &CancelFlag,
    ) -> Result<PathBuf, CascadeError> {
        match processing {
            Processing::Encryption => {
                let output = output.unwrap_or_else(|| File::new(input.output_path(ProcessorMode::Encrypt)));
                processor.encrypt(input, &output, cancel).await?;
                Ok(output.path().to_path_buf())
            }
            Processing::Decryption => processor.decrypt(input, output.as_ref(), cancel).await,
        }
    }

    async fn run_interactive(prompt: &Prompt, cancel: &CancelFlag) -> Result<()> {
        ui::clear_screen()?;
        ui::print_banner();

        let mode = Prompt::select_processing_mode()?;
        let processing = match mode {
            ProcessorMode::Encrypt => Processing::Encryption,
            ProcessorMode::Decrypt => Processing::Decryption,
        };

        let input = File::new(Prompt::input_path()?);
        if !input.exists() {
            bail!("no such file: {}", input.path().display());
        }
        ui::show_file_info(&[input.info().await?]);

        let (suite, tier) = match mode {
            // Decryption takes both from the container header.
            ProcessorMode::Decrypt => (CipherSuite::default(), KdfTier::default()),
            ProcessorMode::Encrypt => (Prompt::select_suite()?, Prompt::select_tier()?),
        };

        let default_output = File::new(input.output_path(mode));
        if mode == ProcessorMode::Encrypt && default_output.exists() && !Prompt::confirm_file_overwrite(default_output.path())? {
            bail!("operation canceled");
        }

        let password = Self::get_password(prompt, processing)?;
        let processor = Processor::new(password, suite, tier);

        let written = Self::process_one(&processor, &input, None, processing, cancel)
            .await
            .with_context(|| format!("{processing} failed: {}", input.path().display()))?;
        ui::show_success(mode, &written);

        let label = match mode {
            ProcessorMode::Encrypt => "original",
            ProcessorMode::Decrypt => "encrypted",
        };
        if Prompt::confirm_file_deletion(input.path(), label)? {
            input.delete().await?;
            ui::show_source_deleted(input.path());
        }

        Ok(())
    }

    fn get_password(prompt: &Prompt, processing: Processing) -> Result<Password> {
        match processing {
            Processing::Encryption => Ok(Password::new(&prompt.prompt_encryption_password()?)),
            Processing::Decryption => Ok(Password::new(&prompt.prompt_decryption_password()?)),
        }
    }
}
