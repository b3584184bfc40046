// Byte-level compression codecs for the transport pipeline.
//
// Provides a pluggable `CompressBackend` trait with built-in implementations:
//   - Brotli (always available; honors text/generic mode and quality 0-11)
//   - Zlib/Deflate (via flate2, feature-gated `zlib-codec`)
//   - LZMA (via lzma-rs, feature-gated `lzma-codec`)
//   - NoCompression (passthrough)
//
// The wire format carries no codec tag: both ends must agree on the codec
// through `PipelineOptions`. Modes and qualities only affect the size of the
// output; any backend must decompress what it compressed under any setting.

use std::io;
use std::sync::Arc;

use brotli::enc::StandardAlloc;
use brotli::enc::backward_references::{BrotliEncoderMode, BrotliEncoderParams};
use brotli::{BrotliResult, BrotliState};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Input is corrupt or truncated.
    #[error("corrupt input: {0}")]
    Corrupt(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Content hint passed to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    /// UTF-8 text such as serialized JSON.
    Text,
    /// Arbitrary bytes.
    #[default]
    Generic,
}

impl CompressionMode {
    fn brotli_mode(self) -> BrotliEncoderMode {
        match self {
            Self::Text => BrotliEncoderMode::BROTLI_MODE_TEXT,
            Self::Generic => BrotliEncoderMode::BROTLI_MODE_GENERIC,
        }
    }
}

// ---------------------------------------------------------------------------
// CompressBackend trait
// ---------------------------------------------------------------------------

/// A stateless byte compressor.
///
/// # Implementing a custom backend
///
/// ```no_run
/// use deltaseal::compress::{CompressBackend, CompressionError, CompressionMode};
///
/// struct Reverse;
///
/// impl CompressBackend for Reverse {
///     fn name(&self) -> &'static str { "reverse" }
///     fn compress(&self, data: &[u8], _: CompressionMode, _: u32) -> std::io::Result<Vec<u8>> {
///         Ok(data.iter().rev().copied().collect())
///     }
///     fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
///         Ok(data.iter().rev().copied().collect())
///     }
/// }
/// ```
pub trait CompressBackend: Send + Sync {
    /// Short identifier used in logs and CLI output.
    fn name(&self) -> &'static str;

    /// Compress `data`. Backends clamp `quality` to their own range.
    fn compress(&self, data: &[u8], mode: CompressionMode, quality: u32) -> io::Result<Vec<u8>>;

    /// Decompress bytes produced by `compress()`.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError>;
}

// ---------------------------------------------------------------------------
// Brotli backend
// ---------------------------------------------------------------------------

/// Highest Brotli quality level.
pub const BROTLI_MAX_QUALITY: u32 = 11;

const BROTLI_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrotliBackend;

impl CompressBackend for BrotliBackend {
    fn name(&self) -> &'static str {
        "brotli"
    }

    fn compress(&self, data: &[u8], mode: CompressionMode, quality: u32) -> io::Result<Vec<u8>> {
        let params = BrotliEncoderParams {
            quality: quality.min(BROTLI_MAX_QUALITY) as i32,
            mode: mode.brotli_mode(),
            ..Default::default()
        };
        let mut input = data;
        let mut output = Vec::with_capacity(data.len() / 2 + 16);
        brotli::BrotliCompress(&mut input, &mut output, &params)?;
        Ok(output)
    }

    /// Decompress exactly one Brotli stream. Bytes left over after the end
    /// of the stream are rejected as corrupt.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut state = BrotliState::new(
            StandardAlloc::default(),
            StandardAlloc::default(),
            StandardAlloc::default(),
        );
        let mut available_in = data.len();
        let mut input_offset = 0;
        let mut total_out = 0;
        let mut chunk = vec![0u8; BROTLI_CHUNK];
        let mut output = Vec::with_capacity(data.len() * 4);

        loop {
            let mut available_out = chunk.len();
            let mut output_offset = 0;
            let result = brotli::BrotliDecompressStream(
                &mut available_in,
                &mut input_offset,
                data,
                &mut available_out,
                &mut output_offset,
                &mut chunk,
                &mut total_out,
                &mut state,
            );
            output.extend_from_slice(&chunk[..output_offset]);
            match result {
                BrotliResult::ResultSuccess => break,
                BrotliResult::NeedsMoreOutput => continue,
                BrotliResult::NeedsMoreInput => {
                    return Err(CompressionError::Corrupt("truncated Brotli stream".into()));
                }
                BrotliResult::ResultFailure => {
                    return Err(CompressionError::Corrupt("Brotli decompression failed".into()));
                }
            }
        }

        if available_in != 0 {
            return Err(CompressionError::Corrupt(format!(
                "{available_in} trailing bytes after Brotli stream"
            )));
        }
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Zlib backend
// ---------------------------------------------------------------------------

/// Zlib/Deflate compressor. Ignores the mode hint; quality is clamped to 0-9.
#[cfg(feature = "zlib-codec")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibBackend;

#[cfg(feature = "zlib-codec")]
impl CompressBackend for ZlibBackend {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn compress(&self, data: &[u8], _mode: CompressionMode, quality: u32) -> io::Result<Vec<u8>> {
        use flate2::write::ZlibEncoder;
        use io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(quality.min(9)));
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        use flate2::read::ZlibDecoder;
        use io::Read;

        let mut decoder = ZlibDecoder::new(data);
        let mut output = Vec::new();
        decoder
            .read_to_end(&mut output)
            .map_err(|e| CompressionError::Corrupt(format!("Zlib decompression failed: {e}")))?;
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// LZMA backend
// ---------------------------------------------------------------------------

/// LZMA compressor. lzma-rs has a single fixed profile, so mode and quality
/// are ignored.
#[cfg(feature = "lzma-codec")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LzmaBackend;

#[cfg(feature = "lzma-codec")]
impl CompressBackend for LzmaBackend {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn compress(&self, data: &[u8], _mode: CompressionMode, _quality: u32) -> io::Result<Vec<u8>> {
        let mut input = io::Cursor::new(data);
        let mut output = Vec::new();
        lzma_rs::lzma_compress(&mut input, &mut output)?;
        Ok(output)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut input = io::BufReader::new(io::Cursor::new(data));
        let mut output = Vec::new();
        lzma_rs::lzma_decompress(&mut input, &mut output)
            .map_err(|e| CompressionError::Corrupt(format!("LZMA decompression failed: {e}")))?;
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// No-compression backend
// ---------------------------------------------------------------------------

/// Passthrough "compressor". Handy for inspecting sealed envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl CompressBackend for NoCompression {
    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, data: &[u8], _mode: CompressionMode, _quality: u32) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        Ok(data.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Codec selection
// ---------------------------------------------------------------------------

/// The codec used for both compression passes.
#[derive(Clone, Default)]
pub enum Codec {
    #[default]
    Brotli,
    #[cfg(feature = "zlib-codec")]
    Zlib,
    #[cfg(feature = "lzma-codec")]
    Lzma,
    None,
    /// A custom backend provided by the caller.
    Custom(Arc<dyn CompressBackend>),
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brotli => write!(f, "Brotli"),
            #[cfg(feature = "zlib-codec")]
            Self::Zlib => write!(f, "Zlib"),
            #[cfg(feature = "lzma-codec")]
            Self::Lzma => write!(f, "Lzma"),
            Self::None => write!(f, "None"),
            Self::Custom(b) => write!(f, "Custom({})", b.name()),
        }
    }
}

impl Codec {
    pub fn backend(&self) -> Arc<dyn CompressBackend> {
        match self {
            Self::Brotli => Arc::new(BrotliBackend),
            #[cfg(feature = "zlib-codec")]
            Self::Zlib => Arc::new(ZlibBackend),
            #[cfg(feature = "lzma-codec")]
            Self::Lzma => Arc::new(LzmaBackend),
            Self::None => Arc::new(NoCompression),
            Self::Custom(b) => b.clone(),
        }
    }

    /// Look up a built-in codec by name.
    pub fn from_name(name: &str) -> Result<Self, CompressionError> {
        match name {
            "brotli" => Ok(Self::Brotli),
            #[cfg(feature = "zlib-codec")]
            "zlib" => Ok(Self::Zlib),
            #[cfg(not(feature = "zlib-codec"))]
            "zlib" => Err(CompressionError::Unsupported(
                "zlib codec requires the 'zlib-codec' feature".into(),
            )),
            #[cfg(feature = "lzma-codec")]
            "lzma" => Ok(Self::Lzma),
            #[cfg(not(feature = "lzma-codec"))]
            "lzma" => Err(CompressionError::Unsupported(
                "LZMA codec requires the 'lzma-codec' feature".into(),
            )),
            "none" => Ok(Self::None),
            other => Err(CompressionError::Unsupported(format!("unknown codec: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
