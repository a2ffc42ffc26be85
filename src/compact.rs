//! Compact serialization: `protected.encrypted_key.iv.ciphertext.tag`.

use crate::error::{DagJoseError, Result};
use crate::types::{DagJwe, Recipient};

/// Number of segments in a compact JWE.
pub const COMPACT_SEGMENTS: usize = 5;

fn segment<S: AsRef<str>>(value: &S) -> String {
    value.as_ref().to_string()
}

/// Rebuild a textual envelope from already-split compact segments.
///
/// Segments are positional: protected header, encrypted key, IV, ciphertext,
/// tag. An empty encrypted-key segment means the envelope has no recipients
/// (direct key agreement). Segments past the fifth are ignored. Segment
/// contents are not validated here; `encode` or decryption will reject bad
/// base64url on first use.
pub fn from_split<S: AsRef<str>>(split: &[S]) -> Result<DagJwe> {
    let [protected, encrypted_key, iv, ciphertext, tag, ..] = split else {
        return Err(DagJoseError::MalformedCompactForm(format!(
            "expected {} segments, got {}",
            COMPACT_SEGMENTS,
            split.len()
        )));
    };

    let encrypted_key: &str = encrypted_key.as_ref();
    let recipients = (!encrypted_key.is_empty()).then(|| {
        vec![Recipient {
            encrypted_key: Some(encrypted_key.to_string()),
            header: None,
        }]
    });

    Ok(DagJwe {
        aad: None,
        ciphertext: segment(ciphertext),
        iv: segment(iv),
        protected: segment(protected),
        recipients,
        tag: segment(tag),
        unprotected: None,
    })
}

/// Parse a dot-delimited compact JWE string.
pub fn from_compact(compact: &str) -> Result<DagJwe> {
    let segments: Vec<&str> = compact.split('.').collect();
    from_split(&segments)
}

/// Serialize a textual envelope in compact form.
///
/// Only envelopes without `aad`, without `unprotected`, and with either no
/// recipients or one header-less recipient carrying a non-empty key have a
/// compact form. No segment may contain a `.`.
pub fn to_compact(jwe: &DagJwe) -> Result<String> {
    if jwe.aad.is_some() {
        return Err(DagJoseError::MalformedCompactForm(
            "aad has no compact representation".to_string(),
        ));
    }
    if jwe.unprotected.is_some() {
        return Err(DagJoseError::MalformedCompactForm(
            "unprotected header has no compact representation".to_string(),
        ));
    }

    let encrypted_key = match jwe.recipients.as_deref() {
        None => "",
        Some([recipient]) if recipient.header.is_some() => {
            return Err(DagJoseError::MalformedCompactForm(
                "recipient header has no compact representation".to_string(),
            ))
        }
        Some([recipient]) => match recipient.encrypted_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            // An empty key segment reads back as "no recipients".
            _ => {
                return Err(DagJoseError::MalformedCompactForm(
                    "recipient without encrypted_key has no compact representation".to_string(),
                ))
            }
        },
        Some(list) => {
            return Err(DagJoseError::MalformedCompactForm(format!(
                "compact form carries one recipient, envelope has {}",
                list.len()
            )))
        }
    };

    let segments = [
        ("protected", jwe.protected.as_str()),
        ("encrypted_key", encrypted_key),
        ("iv", jwe.iv.as_str()),
        ("ciphertext", jwe.ciphertext.as_str()),
        ("tag", jwe.tag.as_str()),
    ];
    if let Some((field, _)) = segments.iter().find(|(_, value)| value.contains('.')) {
        return Err(DagJoseError::MalformedCompactForm(format!(
            "{} contains a segment separator",
            field
        )));
    }

    Ok(segments.map(|(_, value)| value).join("."))
}
