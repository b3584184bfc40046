// Reversible compaction of delta records.
//
// compact() shortens field names and path prefixes:
//   record:     context -> c (MMSI token only), updates -> u
//   update:     timestamp -> t, values -> v
//   path value: path -> p (prefix table applied), value -> v
//
// expand() is the exact inverse. Both walk the input and build a new value;
// the input is never mutated. Fields neither side recognizes are copied
// verbatim, and optional fields are only emitted when present in the input.
//
// Compaction only rewrites shapes it recognizes (a string context matching
// the vessel URN, an array of updates, a string path, ...). Anything else is
// left under its long name, which keeps expand(compact(x)) == x as long as
// the input does not already use the short forms: a record carrying `c`,
// `u`, `t`, `v` or `p` keys, or a path that already starts with a short code
// (`n.custom` expands to `navigation.custom`), is not restored verbatim.
//
// Non-object elements inside `updates` and `values` are copied as-is in both
// directions. Strict expansion only rejects abbreviated fields of the wrong
// type, which compact() never produces from input free of short forms.

use serde_json::{Map, Value};

use super::{context, prefix};

const CONTEXT: &str = "context";
const UPDATES: &str = "updates";
const TIMESTAMP: &str = "timestamp";
const VALUES: &str = "values";
const PATH: &str = "path";
const VALUE: &str = "value";

const C: &str = "c";
const U: &str = "u";
const T: &str = "t";
const V: &str = "v";
const P: &str = "p";

// ---------------------------------------------------------------------------
// Input classification
// ---------------------------------------------------------------------------

/// Top-level input to the compactor.
///
/// Only a sequence of records is transformed. Any other JSON value is handed
/// back unchanged by both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    Sequence(&'a [Value]),
    Other(&'a Value),
}

impl<'a> Payload<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            other => Self::Other(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A compacted field whose shape does not match what expansion expects,
/// e.g. `u` present but not a sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema error at `{location}`: expected {expected}")]
pub struct SchemaError {
    /// JSON-path-like location, e.g. `[0].u[1].v[2].p`.
    pub location: String,
    pub expected: &'static str,
}

/// How expansion treats abbreviated fields of the wrong shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Leave the field as-is and keep going.
    #[default]
    Lenient,
    /// Fail with [`SchemaError`].
    Strict,
}

// ---------------------------------------------------------------------------
// compact
// ---------------------------------------------------------------------------

/// Compact a sequence of delta records. Non-sequence input is returned as-is.
pub fn compact(input: &Value) -> Value {
    match Payload::of(input) {
        Payload::Sequence(records) => {
            log::trace!("compacting {} delta records", records.len());
            Value::Array(records.iter().map(compact_record).collect())
        }
        Payload::Other(value) => value.clone(),
    }
}

fn compact_record(record: &Value) -> Value {
    let Value::Object(fields) = record else {
        return record.clone();
    };

    let mut out = Map::new();
    for (key, value) in fields {
        match (key.as_str(), value) {
            (CONTEXT, Value::String(ctx)) => match context::mmsi_of(ctx) {
                Some(mmsi) => {
                    out.insert(C.into(), Value::String(mmsi.to_string()));
                }
                None => {
                    out.insert(key.clone(), value.clone());
                }
            },
            (UPDATES, Value::Array(updates)) => {
                let updates = updates.iter().map(compact_update).collect();
                out.insert(U.into(), Value::Array(updates));
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

fn compact_update(update: &Value) -> Value {
    let Value::Object(fields) = update else {
        return update.clone();
    };

    let mut out = Map::new();
    for (key, value) in fields {
        match (key.as_str(), value) {
            (TIMESTAMP, _) => {
                out.insert(T.into(), value.clone());
            }
            (VALUES, Value::Array(values)) => {
                let values = values.iter().map(compact_path_value).collect();
                out.insert(V.into(), Value::Array(values));
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

fn compact_path_value(entry: &Value) -> Value {
    let Value::Object(fields) = entry else {
        return entry.clone();
    };

    let mut out = Map::new();
    for (key, value) in fields {
        match (key.as_str(), value) {
            (PATH, Value::String(path)) => {
                out.insert(P.into(), Value::String(prefix::shorten(path)));
            }
            (VALUE, _) => {
                out.insert(V.into(), value.clone());
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

// ---------------------------------------------------------------------------
// expand
// ---------------------------------------------------------------------------

/// Expand compacted records back to their verbose form.
///
/// Abbreviated fields of an unexpected shape are left untouched (and logged).
/// Non-sequence input is returned as-is.
pub fn expand(input: &Value) -> Value {
    // Lenient expansion never rejects a field.
    expand_with(input, Strictness::Lenient).unwrap_or_else(|_| input.clone())
}

/// Expand compacted records, failing on abbreviated fields of the wrong shape.
///
/// Non-sequence input is still returned as-is.
pub fn expand_strict(input: &Value) -> Result<Value, SchemaError> {
    expand_with(input, Strictness::Strict)
}

/// Expand compacted records with the given strictness.
pub fn expand_with(input: &Value, strictness: Strictness) -> Result<Value, SchemaError> {
    match Payload::of(input) {
        Payload::Sequence(records) => {
            log::trace!("expanding {} compact records", records.len());
            let expander = Expander { strictness };
            let mut out = Vec::with_capacity(records.len());
            for (idx, record) in records.iter().enumerate() {
                out.push(expander.record(idx, record)?);
            }
            Ok(Value::Array(out))
        }
        Payload::Other(value) => Ok(value.clone()),
    }
}

struct Expander {
    strictness: Strictness,
}

impl Expander {
    fn reject(
        &self,
        location: impl FnOnce() -> String,
        expected: &'static str,
    ) -> Result<(), SchemaError> {
        let location = location();
        match self.strictness {
            Strictness::Strict => Err(SchemaError { location, expected }),
            Strictness::Lenient => {
                log::warn!("leaving `{location}` unexpanded: expected {expected}");
                Ok(())
            }
        }
    }

    fn record(&self, r: usize, record: &Value) -> Result<Value, SchemaError> {
        let Value::Object(fields) = record else {
            return Ok(record.clone());
        };

        let mut out = Map::new();
        for (key, value) in fields {
            match (key.as_str(), value) {
                (C, Value::String(mmsi)) => {
                    out.insert(CONTEXT.into(), Value::String(context::context_for(mmsi)));
                }
                (C, _) => {
                    self.reject(|| format!("[{r}].c"), "a string")?;
                    out.insert(key.clone(), value.clone());
                }
                (U, Value::Array(updates)) => {
                    let mut expanded = Vec::with_capacity(updates.len());
                    for (u, update) in updates.iter().enumerate() {
                        expanded.push(self.update(r, u, update)?);
                    }
                    out.insert(UPDATES.into(), Value::Array(expanded));
                }
                (U, _) => {
                    self.reject(|| format!("[{r}].u"), "a sequence")?;
                    out.insert(key.clone(), value.clone());
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(Value::Object(out))
    }

    fn update(&self, r: usize, u: usize, update: &Value) -> Result<Value, SchemaError> {
        let Value::Object(fields) = update else {
            return Ok(update.clone());
        };

        let mut out = Map::new();
        for (key, value) in fields {
            match (key.as_str(), value) {
                (T, _) => {
                    out.insert(TIMESTAMP.into(), value.clone());
                }
                (V, Value::Array(values)) => {
                    let mut expanded = Vec::with_capacity(values.len());
                    for (v, entry) in values.iter().enumerate() {
                        expanded.push(self.path_value(r, u, v, entry)?);
                    }
                    out.insert(VALUES.into(), Value::Array(expanded));
                }
                (V, _) => {
                    self.reject(|| format!("[{r}].u[{u}].v"), "a sequence")?;
                    out.insert(key.clone(), value.clone());
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(Value::Object(out))
    }

    fn path_value(&self, r: usize, u: usize, v: usize, entry: &Value) -> Result<Value, SchemaError> {
        let Value::Object(fields) = entry else {
            return Ok(entry.clone());
        };

        let mut out = Map::new();
        for (key, value) in fields {
            match (key.as_str(), value) {
                (P, Value::String(path)) => {
                    out.insert(PATH.into(), Value::String(prefix::lengthen(path)));
                }
                (P, _) => {
                    self.reject(|| format!("[{r}].u[{u}].v[{v}].p"), "a string")?;
                    out.insert(key.clone(), value.clone());
                }
                (V, _) => {
                    out.insert(VALUE.into(), value.clone());
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(Value::Object(out))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
