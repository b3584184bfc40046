// Symmetric encryption of pipeline payloads.
//
// AES-256-CBC with PKCS#7 padding. Every call to `encrypt` draws a fresh
// random 16-byte IV, so identical plaintexts never produce identical
// envelopes. The envelope is hex-encoded JSON: {"iv": "...", "content": "..."}.
//
// The key is a 32-character string used verbatim as the 32-byte AES key, so
// it must be 32 single-byte (ASCII) characters.

use std::fmt;
use std::str::FromStr;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use serde_json::Value;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Required key length in characters (and bytes).
pub const KEY_LEN: usize = 32;
/// IV length in bytes (32 hex characters on the wire).
pub const IV_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed caller input, detected before any cipher work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Secret key must be exactly 32 characters")]
    KeyLength,
    #[error("Text to encrypt cannot be empty")]
    EmptyPlaintext,
    #[error("Invalid encrypted data structure")]
    MalformedEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The cipher rejected the ciphertext, typically because the key is wrong.
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// A validated 32-byte AES-256 key.
#[derive(Clone)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub fn new(key: &str) -> Result<Self, ValidationError> {
        if key.chars().count() != KEY_LEN {
            return Err(ValidationError::KeyLength);
        }
        // 32 characters but multi-byte UTF-8 cannot serve as a 32-byte key.
        let bytes: [u8; KEY_LEN] = key
            .as_bytes()
            .try_into()
            .map_err(|_| ValidationError::KeyLength)?;
        Ok(Self(bytes))
    }

    /// Validate a key that may be absent.
    pub fn from_optional(key: Option<&str>) -> Result<Self, ValidationError> {
        key.ok_or(ValidationError::KeyLength).and_then(Self::new)
    }
}

impl FromStr for SecretKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Hex-encoded IV and ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub iv: String,
    pub content: String,
}

impl EncryptedPayload {
    /// Serialize as `{"iv": ..., "content": ...}` JSON text.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse envelope JSON. Missing, empty, or non-string `iv`/`content`
    /// fields are rejected as a malformed structure.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|_| ValidationError::MalformedEnvelope)?;
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .ok_or(ValidationError::MalformedEnvelope)
        };
        Ok(Self {
            iv: field("iv")?,
            content: field("content")?,
        })
    }
}

// ---------------------------------------------------------------------------
// encrypt / decrypt
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` under a 32-character key.
pub fn encrypt(plaintext: &[u8], key: &str) -> Result<EncryptedPayload, CryptoError> {
    let key = SecretKey::new(key)?;
    encrypt_with(plaintext, &key)
}

/// Decrypt an envelope under a 32-character key.
pub fn decrypt(payload: &EncryptedPayload, key: &str) -> Result<Vec<u8>, CryptoError> {
    let key = SecretKey::new(key)?;
    decrypt_with(payload, &key)
}

pub fn encrypt_with(plaintext: &[u8], key: &SecretKey) -> Result<EncryptedPayload, CryptoError> {
    if plaintext.is_empty() {
        return Err(ValidationError::EmptyPlaintext.into());
    }

    let iv: [u8; IV_LEN] = rand::random();
    let ciphertext =
        Aes256CbcEnc::new(&key.0.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(EncryptedPayload {
        iv: hex::encode(iv),
        content: hex::encode(ciphertext),
    })
}

pub fn decrypt_with(payload: &EncryptedPayload, key: &SecretKey) -> Result<Vec<u8>, CryptoError> {
    if payload.iv.is_empty() || payload.content.is_empty() {
        return Err(ValidationError::MalformedEnvelope.into());
    }

    let iv: [u8; IV_LEN] = hex::decode(&payload.iv)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ValidationError::MalformedEnvelope)?;
    let content = hex::decode(&payload.content).map_err(|_| ValidationError::MalformedEnvelope)?;

    Aes256CbcDec::new(&key.0.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&content)
        .map_err(|_| CryptoError::Decrypt("ciphertext or padding rejected".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
