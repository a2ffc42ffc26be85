//! The two parallel envelope representations.
//!
//! [`DagJwe`] carries every binary field as a base64url string and is the
//! form embedded in JSON. [`EncodedJwe`] carries the same fields as raw
//! bytes for binary containers such as CBOR. Headers are free-form JSON maps
//! in both forms and pass through every transform untouched.

use serde::{Deserialize, Serialize};

use crate::error::DagJoseError;

/// Free-form header map (`unprotected`, per-recipient `header`).
pub type Header = serde_json::Map<String, serde_json::Value>;

/// One recipient of a textual envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    /// Wrapped content encryption key (base64url).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<String>,
    /// Per-recipient unprotected header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
}

/// Textual envelope: a general JWE JSON serialization whose payload is a CID.
///
/// Field order follows the serialized form: `aad`, `ciphertext`, `iv`,
/// `protected`, `recipients`, `tag`, `unprotected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDagJwe")]
pub struct DagJwe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aad: Option<String>,
    pub ciphertext: String,
    pub iv: String,
    pub protected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<Recipient>>,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprotected: Option<Header>,
}

/// One recipient of a binary envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedRecipient {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub encrypted_key: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
}

/// Binary envelope: [`DagJwe`] with every base64url field as raw bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEncodedJwe")]
pub struct EncodedJwe {
    #[serde(skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub aad: Option<Vec<u8>>,
    #[serde(with = "serde_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub iv: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub protected: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<EncodedRecipient>>,
    #[serde(with = "serde_bytes")]
    pub tag: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprotected: Option<Header>,
}

// Deserialization goes through these so that a missing mandatory field is a
// `MalformedEnvelope` rather than a generic serde error.

#[derive(Deserialize)]
pub(crate) struct RawDagJwe {
    aad: Option<String>,
    ciphertext: Option<String>,
    iv: Option<String>,
    protected: Option<String>,
    recipients: Option<Vec<Recipient>>,
    tag: Option<String>,
    unprotected: Option<Header>,
}

#[derive(Deserialize)]
pub(crate) struct RawEncodedJwe {
    #[serde(default, with = "serde_bytes")]
    aad: Option<Vec<u8>>,
    #[serde(default, with = "serde_bytes")]
    ciphertext: Option<Vec<u8>>,
    #[serde(default, with = "serde_bytes")]
    iv: Option<Vec<u8>>,
    #[serde(default, with = "serde_bytes")]
    protected: Option<Vec<u8>>,
    #[serde(default)]
    recipients: Option<Vec<EncodedRecipient>>,
    #[serde(default, with = "serde_bytes")]
    tag: Option<Vec<u8>>,
    #[serde(default)]
    unprotected: Option<Header>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, DagJoseError> {
    value.ok_or_else(|| DagJoseError::MalformedEnvelope(format!("missing {}", field)))
}

fn non_empty<T>(recipients: Option<Vec<T>>) -> Result<Option<Vec<T>>, DagJoseError> {
    match recipients {
        Some(list) if list.is_empty() => Err(DagJoseError::MalformedEnvelope(
            "recipients must not be empty when present".to_string(),
        )),
        other => Ok(other),
    }
}

impl TryFrom<RawDagJwe> for DagJwe {
    type Error = DagJoseError;

    fn try_from(raw: RawDagJwe) -> Result<Self, Self::Error> {
        Ok(DagJwe {
            aad: raw.aad,
            ciphertext: required(raw.ciphertext, "ciphertext")?,
            iv: required(raw.iv, "iv")?,
            protected: required(raw.protected, "protected")?,
            recipients: non_empty(raw.recipients)?,
            tag: required(raw.tag, "tag")?,
            unprotected: raw.unprotected,
        })
    }
}

impl TryFrom<RawEncodedJwe> for EncodedJwe {
    type Error = DagJoseError;

    fn try_from(raw: RawEncodedJwe) -> Result<Self, Self::Error> {
        Ok(EncodedJwe {
            aad: raw.aad,
            ciphertext: required(raw.ciphertext, "ciphertext")?,
            iv: required(raw.iv, "iv")?,
            protected: required(raw.protected, "protected")?,
            recipients: non_empty(raw.recipients)?,
            tag: required(raw.tag, "tag")?,
            unprotected: raw.unprotected,
        })
    }
}

impl DagJwe {
    /// Parse a textual envelope from an untyped JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DagJoseError> {
        let raw: RawDagJwe = serde_json::from_value(value)?;
        raw.try_into()
    }

    /// Parse a textual envelope from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DagJoseError> {
        let raw: RawDagJwe = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Serialize to JSON text, omitting absent optional fields.
    pub fn to_json(&self) -> Result<String, DagJoseError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to an untyped JSON document.
    pub fn to_value(&self) -> Result<serde_json::Value, DagJoseError> {
        Ok(serde_json::to_value(self)?)
    }
}
