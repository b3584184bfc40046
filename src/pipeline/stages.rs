// Ordered byte stages of the transport pipeline.
//
// After compaction and JSON serialization the payload passes through a fixed
// list of byte -> byte stages. Encoding runs the list front to back; decoding
// runs the inverse of each stage back to front. Each stage consumes exactly
// the previous stage's output, and the first failure aborts the whole run.
//
//   [0] Compress { Text, 9 }     JSON text -> compressed
//   [1] Seal                     compressed -> {"iv","content"} JSON
//   [2] Compress { Generic, 8 }  envelope JSON -> wire bytes

use crate::compress::{CompressBackend, CompressionError, CompressionMode};
use crate::crypto::{self, EncryptedPayload, SecretKey};

use super::{PipelineError, PipelineOptions};

/// One reversible byte transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compress { mode: CompressionMode, quality: u32 },
    /// Encrypt and wrap in the hex JSON envelope.
    Seal,
}

/// Shared inputs for every stage of one run.
pub struct StageContext<'a> {
    pub backend: &'a dyn CompressBackend,
    pub key: &'a SecretKey,
}

/// Byte counts around one stage, as seen in the encode direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub input_bytes: usize,
    pub output_bytes: usize,
}

/// The stage list for the given options.
pub fn plan(opts: &PipelineOptions) -> [Stage; 3] {
    [
        Stage::Compress {
            mode: CompressionMode::Text,
            quality: opts.text_quality,
        },
        Stage::Seal,
        Stage::Compress {
            mode: CompressionMode::Generic,
            quality: opts.generic_quality,
        },
    ]
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compress {
                mode: CompressionMode::Text,
                ..
            } => "compress-text",
            Self::Compress {
                mode: CompressionMode::Generic,
                ..
            } => "compress-generic",
            Self::Seal => "seal",
        }
    }

    pub fn forward(&self, ctx: &StageContext<'_>, input: &[u8]) -> Result<Vec<u8>, PipelineError> {
        match *self {
            Self::Compress { mode, quality } => ctx
                .backend
                .compress(input, mode, quality)
                .map_err(|e| PipelineError::Compression(CompressionError::Io(e))),
            Self::Seal => {
                let sealed = crypto::encrypt_with(input, ctx.key)?;
                sealed.to_json().map_err(PipelineError::Envelope)
            }
        }
    }

    pub fn inverse(&self, ctx: &StageContext<'_>, input: &[u8]) -> Result<Vec<u8>, PipelineError> {
        match self {
            Self::Compress { .. } => Ok(ctx.backend.decompress(input)?),
            Self::Seal => {
                let sealed = EncryptedPayload::from_json(input)?;
                Ok(crypto::decrypt_with(&sealed, ctx.key)?)
            }
        }
    }
}

/// Run `stages` in order. `report` sees every completed stage.
pub fn run_forward(
    stages: &[Stage],
    ctx: &StageContext<'_>,
    input: Vec<u8>,
    mut report: impl FnMut(StageReport),
) -> Result<Vec<u8>, PipelineError> {
    stages.iter().try_fold(input, |bytes, stage| {
        let out = stage.forward(ctx, &bytes)?;
        log::debug!(
            "encode stage {}: {} -> {} bytes",
            stage.name(),
            bytes.len(),
            out.len()
        );
        report(StageReport {
            stage: *stage,
            input_bytes: bytes.len(),
            output_bytes: out.len(),
        });
        Ok(out)
    })
}

/// Undo `stages`, last stage first.
pub fn run_inverse(
    stages: &[Stage],
    ctx: &StageContext<'_>,
    input: Vec<u8>,
) -> Result<Vec<u8>, PipelineError> {
    stages.iter().rev().try_fold(input, |bytes, stage| {
        let out = stage.inverse(ctx, &bytes)?;
        log::debug!(
            "decode stage {}: {} -> {} bytes",
            stage.name(),
            bytes.len(),
            out.len()
        );
        Ok(out)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
