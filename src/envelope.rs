//! Transcoding between the textual and binary envelope forms.
//!
//! `encode` base64url-decodes every ciphertext-material field; `decode`
//! base64url-encodes them back. Headers are copied as-is. Optional fields
//! keep their presence: nothing absent is synthesized, nothing present is
//! dropped, and recipient order is preserved.

use jose_crypto::{base64url_decode, base64url_encode};

use crate::error::{DagJoseError, Result};
use crate::types::{DagJwe, EncodedJwe, EncodedRecipient, Recipient};

/// Base64url-decode one envelope field, naming it in the error.
pub(crate) fn decode_field(value: &str, field: &str) -> Result<Vec<u8>> {
    base64url_decode(value).map_err(|e| DagJoseError::InvalidEncoding(format!("{}: {}", field, e)))
}

fn encode_recipient(index: usize, recipient: &Recipient) -> Result<EncodedRecipient> {
    let encrypted_key = match &recipient.encrypted_key {
        Some(key) => Some(decode_field(
            key,
            &format!("recipients[{}].encrypted_key", index),
        )?),
        None => None,
    };
    Ok(EncodedRecipient {
        encrypted_key,
        header: recipient.header.clone(),
    })
}

fn decode_recipient(encoded: &EncodedRecipient) -> Recipient {
    Recipient {
        encrypted_key: encoded.encrypted_key.as_deref().map(base64url_encode),
        header: encoded.header.clone(),
    }
}

/// Convert a textual envelope into its binary form.
///
/// Fails with [`DagJoseError::InvalidEncoding`] if any base64url field is
/// malformed; no partial result is returned.
pub fn encode(jwe: &DagJwe) -> Result<EncodedJwe> {
    let recipients = match &jwe.recipients {
        Some(list) => Some(
            list.iter()
                .enumerate()
                .map(|(index, recipient)| encode_recipient(index, recipient))
                .collect::<Result<Vec<_>>>()?,
        ),
        None => None,
    };

    Ok(EncodedJwe {
        aad: jwe
            .aad
            .as_deref()
            .map(|aad| decode_field(aad, "aad"))
            .transpose()?,
        ciphertext: decode_field(&jwe.ciphertext, "ciphertext")?,
        iv: decode_field(&jwe.iv, "iv")?,
        protected: decode_field(&jwe.protected, "protected")?,
        recipients,
        tag: decode_field(&jwe.tag, "tag")?,
        unprotected: jwe.unprotected.clone(),
    })
}

/// Convert a binary envelope back into its textual form.
pub fn decode(encoded: &EncodedJwe) -> DagJwe {
    DagJwe {
        aad: encoded.aad.as_deref().map(base64url_encode),
        ciphertext: base64url_encode(&encoded.ciphertext),
        iv: base64url_encode(&encoded.iv),
        protected: base64url_encode(&encoded.protected),
        recipients: encoded
            .recipients
            .as_ref()
            .map(|list| list.iter().map(decode_recipient).collect()),
        tag: base64url_encode(&encoded.tag),
        unprotected: encoded.unprotected.clone(),
    }
}
