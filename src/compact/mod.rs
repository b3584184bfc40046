// Schema compaction for delta records.
//
// - `prefix`   : ordered namespace prefix table (navigation. -> n. ...)
// - `context`  : vessel URN <-> MMSI token
// - `transform`: compact/expand over JSON values

pub mod context;
pub mod prefix;
pub mod transform;

pub use prefix::PREFIX_TABLE;
pub use transform::{Payload, SchemaError, Strictness, compact, expand, expand_strict, expand_with};
