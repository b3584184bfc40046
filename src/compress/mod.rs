// Compression service for the transport pipeline.
//
// - `backend`: pluggable `CompressBackend` trait (Brotli, Zlib, LZMA, none)
//            plus the `Codec` selector used by `PipelineOptions`

pub mod backend;

pub use backend::{
    BrotliBackend, Codec, CompressBackend, CompressionError, CompressionMode, NoCompression,
};

#[cfg(feature = "lzma-codec")]
pub use backend::LzmaBackend;
#[cfg(feature = "zlib-codec")]
pub use backend::ZlibBackend;
