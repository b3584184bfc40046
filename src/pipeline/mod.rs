// Transport pipeline: compact -> JSON -> compress(text) -> encrypt ->
// envelope JSON -> compress(generic), and its exact inverse.
//
// - `stages`: the ordered byte stages and their inverses
//
// Every call is a pure function of its inputs. The first failing stage aborts
// the call and its error is returned as-is; nothing is retried and no partial
// output escapes.

pub mod stages;

use serde_json::Value;

use crate::compact::{self, SchemaError, Strictness};
use crate::compress::{Codec, CompressionError};
use crate::crypto::{CryptoError, SecretKey, ValidationError};
use crate::model::DeltaRecord;

pub use stages::{Stage, StageContext, StageReport};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration shared by both directions. Decoding must use the same
/// codec the payload was encoded with.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Codec for both compression passes.
    pub codec: Codec,
    /// Quality of the first (JSON text) pass.
    pub text_quality: u32,
    /// Quality of the second (envelope) pass.
    pub generic_quality: u32,
    /// Fail decoding on abbreviated fields of the wrong shape instead of
    /// passing them through.
    pub strict_schema: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            codec: Codec::Brotli,
            text_quality: 9,
            generic_quality: 8,
            strict_schema: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error class of a failed pipeline call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Crypto,
    Compression,
    Schema,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("compression failed: {0}")]
    Compression(#[from] CompressionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The compact record JSON could not be written or read back.
    #[error("record body is not valid JSON: {0}")]
    Body(serde_json::Error),
    /// The `{iv, content}` envelope could not be serialized.
    #[error("envelope serialization failed: {0}")]
    Envelope(serde_json::Error),
}

impl From<ValidationError> for PipelineError {
    fn from(e: ValidationError) -> Self {
        Self::Crypto(CryptoError::Validation(e))
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Crypto(CryptoError::Validation(_)) | Self::Envelope(_) => ErrorKind::Validation,
            Self::Crypto(CryptoError::Decrypt(_)) => ErrorKind::Crypto,
            Self::Compression(_) => ErrorKind::Compression,
            Self::Schema(_) | Self::Body(_) => ErrorKind::Schema,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Size of the payload after each step of one encode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Number of records, when the input was a sequence.
    pub records: Option<usize>,
    /// Compact JSON text size before any byte stage.
    pub json_bytes: usize,
    pub stages: Vec<StageReport>,
}

impl PipelineStats {
    /// Final wire size.
    pub fn wire_bytes(&self) -> usize {
        self.stages.last().map_or(self.json_bytes, |r| r.output_bytes)
    }

    /// Wire size relative to the compact JSON text.
    pub fn ratio(&self) -> f64 {
        if self.json_bytes == 0 {
            return 0.0;
        }
        self.wire_bytes() as f64 / self.json_bytes as f64
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode delta records for the wire with default options.
pub fn encode(records: &Value, key: &str) -> Result<Vec<u8>, PipelineError> {
    encode_with_options(records, key, &PipelineOptions::default())
}

pub fn encode_with_options(
    records: &Value,
    key: &str,
    opts: &PipelineOptions,
) -> Result<Vec<u8>, PipelineError> {
    encode_with_stats(records, key, opts).map(|(wire, _)| wire)
}

/// Encode and report the payload size after every step.
pub fn encode_with_stats(
    records: &Value,
    key: &str,
    opts: &PipelineOptions,
) -> Result<(Vec<u8>, PipelineStats), PipelineError> {
    let key = SecretKey::new(key)?;
    let backend = opts.codec.backend();
    let ctx = StageContext {
        backend: backend.as_ref(),
        key: &key,
    };

    let compacted = compact::compact(records);
    if opts.strict_schema {
        // Refuse input whose compact form a strict decode would reject, so
        // decode(encode(x)) cannot fail on schema with the same options.
        compact::expand_strict(&compacted)?;
    }
    let json = serde_json::to_vec(&compacted).map_err(PipelineError::Body)?;

    let mut stats = PipelineStats {
        records: records.as_array().map(Vec::len),
        json_bytes: json.len(),
        stages: Vec::with_capacity(3),
    };
    let wire = stages::run_forward(&stages::plan(opts), &ctx, json, |r| stats.stages.push(r))?;

    log::debug!(
        "encoded {:?} records: {} json bytes -> {} wire bytes ({})",
        stats.records,
        stats.json_bytes,
        wire.len(),
        backend.name()
    );
    Ok((wire, stats))
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode wire bytes produced by [`encode`] with default options.
pub fn decode(wire: &[u8], key: &str) -> Result<Value, PipelineError> {
    decode_with_options(wire, key, &PipelineOptions::default())
}

pub fn decode_with_options(
    wire: &[u8],
    key: &str,
    opts: &PipelineOptions,
) -> Result<Value, PipelineError> {
    let key = SecretKey::new(key)?;
    let backend = opts.codec.backend();
    let ctx = StageContext {
        backend: backend.as_ref(),
        key: &key,
    };

    let json = stages::run_inverse(&stages::plan(opts), &ctx, wire.to_vec())?;
    let compacted: Value = serde_json::from_slice(&json).map_err(PipelineError::Body)?;

    let strictness = if opts.strict_schema {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };
    Ok(compact::expand_with(&compacted, strictness)?)
}

// ---------------------------------------------------------------------------
// Typed wrappers
// ---------------------------------------------------------------------------

pub fn encode_records(
    records: &[DeltaRecord],
    key: &str,
    opts: &PipelineOptions,
) -> Result<Vec<u8>, PipelineError> {
    let value = serde_json::to_value(records).map_err(PipelineError::Body)?;
    encode_with_options(&value, key, opts)
}

/// Decode into typed records. Fails with a schema error if the payload is
/// not a sequence of record objects.
pub fn decode_records(
    wire: &[u8],
    key: &str,
    opts: &PipelineOptions,
) -> Result<Vec<DeltaRecord>, PipelineError> {
    let value = decode_with_options(wire, key, opts)?;
    serde_json::from_value(value).map_err(PipelineError::Body)
}

// ---------------------------------------------------------------------------
// Batch helpers
// ---------------------------------------------------------------------------

/// Encode independent batches in parallel. Results keep input order.
#[cfg(feature = "parallel")]
pub fn encode_batch(
    batches: &[Value],
    key: &str,
    opts: &PipelineOptions,
) -> Vec<Result<Vec<u8>, PipelineError>> {
    use rayon::prelude::*;

    batches
        .par_iter()
        .map(|batch| encode_with_options(batch, key, opts))
        .collect()
}

/// Decode independent payloads in parallel. Results keep input order.
#[cfg(feature = "parallel")]
pub fn decode_batch(
    payloads: &[Vec<u8>],
    key: &str,
    opts: &PipelineOptions,
) -> Vec<Result<Value, PipelineError>> {
    use rayon::prelude::*;

    payloads
        .par_iter()
        .map(|wire| decode_with_options(wire, key, opts))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
