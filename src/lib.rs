//! Deltaseal: compact, compress and encrypt vessel telemetry delta records
//! for bandwidth-constrained links.
//!
//! The crate provides:
//! - A reversible schema compactor for delta records (`compact`)
//! - Pluggable byte codecs, Brotli by default (`compress`)
//! - AES-256-CBC sealing with a hex JSON envelope (`crypto`)
//! - The ordered encode/decode pipeline tying them together (`pipeline`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use deltaseal::pipeline;
//! use serde_json::json;
//!
//! let key = "0123456789abcdef0123456789abcdef";
//! let records = json!([{
//!     "context": "vessels.urn:mrn:imo:mmsi:123456789",
//!     "updates": [{
//!         "timestamp": "2024-01-01T00:00:00.000Z",
//!         "values": [{"path": "navigation.speedOverGround", "value": 4.2}]
//!     }]
//! }]);
//!
//! let wire = pipeline::encode(&records, key).unwrap();
//! let decoded = pipeline::decode(&wire, key).unwrap();
//! assert_eq!(decoded, records);
//! ```

pub mod compact;
pub mod compress;
pub mod crypto;
pub mod io;
pub mod model;
pub mod pipeline;

#[cfg(feature = "cli")]
pub mod cli;

pub use model::{DeltaRecord, PathValue, Update};
pub use pipeline::{PipelineError, PipelineOptions, decode, encode};
