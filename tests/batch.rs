//! Batch semantics: one file's failure aborts that session only.

use cascrypt::cascade::CipherSuite;
use cascrypt::error::CascadeError;
use cascrypt::file::File;
use cascrypt::kdf::KdfTier;
use cascrypt::processor::Processor;
use cascrypt::secret::Password;
use cascrypt::stream::CancelFlag;
use cascrypt::types::ProcessorMode;
use tempfile::tempdir;

const PASSPHRASE: &str = "a strong enough passphrase";

fn processor() -> Processor {
    Processor::new(Password::new(PASSPHRASE), CipherSuite::Aes256Gcm, KdfTier::Interactive)
}

#[tokio::test]
async fn batch_continues_past_an_invalid_container() {
    let dir = tempdir().unwrap();
    let cancel = CancelFlag::new();

    // Files 1 and 3 are real containers; file 2 is random noise with the
    // container extension.
    let mut containers = Vec::new();
    for name in ["one.txt", "three.txt"] {
        let src = dir.path().join(name);
        tokio::fs::write(&src, format!("content of {name}")).await.unwrap();
        let input = File::new(&src);
        let container = File::new(input.output_path(ProcessorMode::Encrypt));
        processor().encrypt(&input, &container, &cancel).await.unwrap();
        tokio::fs::remove_file(&src).await.unwrap();
        containers.push(container);
    }

    let bogus = dir.path().join("two.txt.ccx");
    tokio::fs::write(&bogus, b"this is not a container, just junk bytes").await.unwrap();

    let batch = [containers.remove(0), File::new(&bogus), containers.remove(0)];

    let mut failures = Vec::new();
    let mut successes = Vec::new();
    for container in &batch {
        match processor().decrypt(container, None, &cancel).await {
            Ok(path) => successes.push(path),
            Err(e) => failures.push(e),
        }
    }

    assert_eq!(successes.len(), 2);
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], CascadeError::NotAContainer));

    assert_eq!(tokio::fs::read(dir.path().join("one.txt")).await.unwrap(), b"content of one.txt");
    assert_eq!(tokio::fs::read(dir.path().join("three.txt")).await.unwrap(), b"content of three.txt");
    assert!(!dir.path().join("two.txt").exists());
}

#[tokio::test]
async fn missing_source_fails_only_its_own_session() {
    let dir = tempdir().unwrap();
    let cancel = CancelFlag::new();

    let present = dir.path().join("present.txt");
    tokio::fs::write(&present, b"here").await.unwrap();

    let inputs = [File::new(dir.path().join("missing.txt")), File::new(&present)];

    let mut outcomes = Vec::new();
    for input in &inputs {
        let output = File::new(input.output_path(ProcessorMode::Encrypt));
        outcomes.push(processor().encrypt(input, &output, &cancel).await);
    }

    assert!(matches!(outcomes[0], Err(CascadeError::SourceIo(_))));
    assert!(outcomes[1].is_ok());
    assert!(dir.path().join("present.txt.ccx").exists());
}
