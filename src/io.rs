// File-level helpers for the transport pipeline.
//
// `encode_file()` reads a JSON document of delta records and writes the wire
// payload; `decode_file()` does the reverse. Optionally computes SHA-256
// digests of the JSON side (feature-gated behind `file-io`), so a sender and
// receiver can compare what went in with what came out.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use serde_json::Value;

use crate::pipeline::{self, PipelineError, PipelineOptions, PipelineStats};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Input JSON file size in bytes.
    pub input_size: u64,
    /// Wire payload size in bytes.
    pub wire_size: u64,
    /// Per-stage byte counts.
    pub pipeline: PipelineStats,
    /// SHA-256 of the input file (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Wire payload size in bytes.
    pub wire_size: u64,
    /// Written JSON size in bytes.
    pub output_size: u64,
    /// Number of records, when the payload was a sequence.
    pub records: Option<usize>,
    /// SHA-256 of the written JSON (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Input file is not JSON, or output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file / decode_file
// ---------------------------------------------------------------------------

/// Encode the JSON records in `input_path`, writing the wire payload to
/// `wire_path`.
pub fn encode_file(
    input_path: &Path,
    wire_path: &Path,
    key: &str,
    opts: &PipelineOptions,
) -> Result<EncodeStats, IoError> {
    let input = std::fs::read(input_path)?;
    let records: Value = serde_json::from_slice(&input)?;

    let (wire, stats) = pipeline::encode_with_stats(&records, key, opts)?;
    std::fs::write(wire_path, &wire)?;

    Ok(EncodeStats {
        input_size: input.len() as u64,
        wire_size: wire.len() as u64,
        pipeline: stats,
        input_sha256: sha256(&input),
    })
}

/// Decode the wire payload in `wire_path`, writing JSON records to
/// `output_path`. With `pretty`, the JSON is indented.
pub fn decode_file(
    wire_path: &Path,
    output_path: &Path,
    key: &str,
    opts: &PipelineOptions,
    pretty: bool,
) -> Result<DecodeStats, IoError> {
    let wire = std::fs::read(wire_path)?;
    let records = pipeline::decode_with_options(&wire, key, opts)?;

    let json = if pretty {
        serde_json::to_vec_pretty(&records)?
    } else {
        serde_json::to_vec(&records)?
    };

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(DecodeStats {
        wire_size: wire.len() as u64,
        output_size: json.len() as u64,
        records: records.as_array().map(Vec::len),
        output_sha256: sha256(&json),
    })
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
