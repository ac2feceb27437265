//! Encoded file I/O: strict-UTF-8 source reads (memory-mapped when large),
//! UTF-8 → Shift_JIS fallback decoding for persisted documents, and atomic
//! encoded writes for output artifacts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use thiserror::Error;

use crate::cli::OutputEncoding;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Both the primary and the legacy decode attempts failed.
#[derive(Debug, Error)]
#[error("text is neither valid UTF-8 nor valid Shift_JIS")]
pub struct DecodeError;

/// Read a source file as strict UTF-8, memory-mapping files above 1 MiB.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;

        // Safety: We're only reading the file, not modifying it
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {}", path.display()))?;

        let text = std::str::from_utf8(&mmap)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
        Ok(text.to_owned())
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))
    }
}

/// Decode bytes as UTF-8 first; on failure retry once as Shift_JIS.
/// Failing both is terminal - there is no further fallback.
pub fn decode_with_fallback(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_owned());
    }

    encoding_rs::SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|cow| cow.into_owned())
        .ok_or(DecodeError)
}

/// Read a persisted document applying the UTF-8 → Shift_JIS fallback rule.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;

    let text = decode_with_fallback(&bytes)
        .with_context(|| format!("Failed to decode document {}", path.display()))?;
    Ok(text)
}

/// Encode output text according to the requested artifact encoding.
pub fn encode_output(text: &str, encoding: OutputEncoding) -> Vec<u8> {
    match encoding {
        OutputEncoding::Utf8 => text.as_bytes().to_vec(),
        OutputEncoding::ShiftJis => {
            let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(text);
            bytes.into_owned()
        }
    }
}

/// Atomic write: same-dir tempfile, then persist over the destination.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = match tempfile::NamedTempFile::new_in(dir) {
        Ok(t) => t,
        Err(_) => tempfile::NamedTempFile::new()?, // fallback to OS temp
    };

    tmp.write_all(data)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    tmp.as_file().sync_all()?;

    match tmp.persist(path) {
        Ok(_) => {}
        Err(e) => {
            // Different filesystem? Try copy fallback
            std::fs::copy(e.file.path(), path)
                .with_context(|| format!("Failed to persist {}", path.display()))?;
        }
    }

    Ok(())
}

/// Encode and atomically write one output artifact.
pub fn write_output(path: &Path, text: &str, encoding: OutputEncoding) -> Result<()> {
    write_atomic(path, &encode_output(text, encoding))
}

/// Serialize with 4-space indentation, non-ASCII characters verbatim.
/// Every persisted JSON artifact goes through this for a uniform shape.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);

    value
        .serialize(&mut ser)
        .context("Failed to serialize JSON artifact")?;
    String::from_utf8(buf).context("Serialized JSON was not UTF-8")
}
