//! JWE construction and decryption over pluggable key-management algorithms.
//!
//! [`create_jwe`] seals a payload once under a content encryption key (CEK)
//! and lets each [`Encrypter`] contribute one recipient. [`decrypt_jwe`]
//! walks the recipients with a single [`Decrypter`] until one opens the
//! content.
//!
//! Content AAD follows RFC 7516 §5.1: `ASCII(protected)`, or
//! `ASCII(protected || '.' || aad)` when the envelope carries `aad`.

mod dir;
mod ecdh_es;

pub use dir::{DirDecrypter, DirEncrypter};
pub use ecdh_es::{EcdhEsA256KwDecrypter, EcdhEsA256KwEncrypter};

use async_trait::async_trait;
use jose_crypto::{base64url_encode, canonical_json};
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use crate::envelope::decode_field;
use crate::error::{DagJoseError, Result};
use crate::types::{DagJwe, Header, Recipient};

/// `alg` for a CEK shared directly between sender and recipient.
pub const ALG_DIR: &str = "dir";
/// `alg` for ECDH-ES key agreement with AES-256 key wrap.
pub const ALG_ECDH_ES_A256KW: &str = "ECDH-ES+A256KW";
/// `enc` for AES-256-GCM content encryption.
pub const ENC_A256GCM: &str = "A256GCM";

/// What one [`Encrypter`] produces for a fresh envelope.
pub struct EncryptionResult {
    pub ciphertext: String,
    pub iv: String,
    pub protected: String,
    pub tag: String,
    /// The recipient entry for this encrypter, if it has one (`dir` does not).
    pub recipient: Option<Recipient>,
    /// The CEK, handed to the remaining encrypters for wrapping.
    pub cek: Option<Zeroizing<Vec<u8>>>,
}

/// The content half of an envelope, as handed to a [`Decrypter`].
pub struct ProtectedContent<'a> {
    pub ciphertext: &'a [u8],
    pub iv: &'a [u8],
    pub tag: &'a [u8],
    /// Full content AAD (protected header, plus envelope `aad` if present).
    pub aad: &'a [u8],
}

/// One recipient's key-management method on the sending side.
#[async_trait]
pub trait Encrypter: Send + Sync {
    /// JWE `alg` this encrypter produces.
    fn alg(&self) -> &str;

    /// JWE `enc` this encrypter produces.
    fn enc(&self) -> &str;

    /// Seal `cleartext` as a fresh envelope and produce this encrypter's
    /// recipient.
    async fn encrypt(
        &self,
        cleartext: &[u8],
        protected_header: Option<&Header>,
        aad: Option<&[u8]>,
    ) -> Result<EncryptionResult>;

    /// Wrap a CEK produced by another encrypter. Encrypters that cannot
    /// share a CEK return `None`.
    async fn encrypt_cek(&self, _cek: &[u8]) -> Result<Option<Recipient>> {
        Ok(None)
    }
}

/// One recipient's key-management method on the receiving side.
#[async_trait]
pub trait Decrypter: Send + Sync {
    /// JWE `alg` this decrypter accepts.
    fn alg(&self) -> &str;

    /// JWE `enc` this decrypter accepts.
    fn enc(&self) -> &str;

    /// Recover the plaintext. `recipient` carries the recipient's
    /// `encrypted_key` and its header merged with the protected header;
    /// it is `None` for envelopes without recipients.
    async fn decrypt(
        &self,
        content: &ProtectedContent<'_>,
        recipient: Option<&Recipient>,
    ) -> Result<Vec<u8>>;
}

/// Build the protected header: the caller's members plus `enc`, and `alg`
/// when the algorithm is not carried per recipient.
pub(crate) fn protected_header(caller: Option<&Header>, alg: Option<&str>, enc: &str) -> Header {
    let mut header = Header::new();
    if let Some(alg) = alg {
        header.insert("alg".to_string(), Value::String(alg.to_string()));
    }
    if let Some(caller) = caller {
        header.extend(caller.clone());
    }
    header.insert("enc".to_string(), Value::String(enc.to_string()));
    header
}

pub(crate) fn content_aad(protected: &str, aad: Option<&str>) -> Vec<u8> {
    match aad {
        Some(aad) => format!("{}.{}", protected, aad).into_bytes(),
        None => protected.as_bytes().to_vec(),
    }
}

/// Encrypt `cleartext` under `cek` with the given protected header.
pub(crate) fn seal_content(
    cek: &[u8],
    cleartext: &[u8],
    header: &Header,
    aad: Option<&[u8]>,
) -> Result<EncryptionResult> {
    let header_json = canonical_json(&Value::Object(header.clone()))?;
    let protected = base64url_encode(header_json.as_bytes());
    let aad_b64 = aad.map(base64url_encode);

    let sealed = jose_crypto::seal(cek, cleartext, &content_aad(&protected, aad_b64.as_deref()))?;

    Ok(EncryptionResult {
        ciphertext: base64url_encode(&sealed.ciphertext),
        iv: base64url_encode(&sealed.iv),
        protected,
        tag: base64url_encode(&sealed.tag),
        recipient: None,
        cek: None,
    })
}

fn header_str<'a>(header: &'a Header, key: &str) -> Option<&'a str> {
    header.get(key).and_then(Value::as_str)
}

/// Encrypt `cleartext` for every encrypter into one envelope.
///
/// A `dir` encrypter must be used alone. Otherwise all encrypters must agree
/// on `enc`; the first seals the content and the rest wrap its CEK, in order.
pub async fn create_jwe(
    cleartext: &[u8],
    encrypters: &[&dyn Encrypter],
    protected_header: Option<&Header>,
    aad: Option<&[u8]>,
) -> Result<DagJwe> {
    let Some((first, rest)) = encrypters.split_first() else {
        return Err(DagJoseError::EncryptionFailed(
            "at least one encrypter is required".to_string(),
        ));
    };

    if !rest.is_empty() && encrypters.iter().any(|e| e.alg() == ALG_DIR) {
        return Err(DagJoseError::EncryptionFailed(
            "dir encrypter can only be used with a single recipient".to_string(),
        ));
    }
    if let Some(other) = rest.iter().find(|e| e.enc() != first.enc()) {
        return Err(DagJoseError::EncryptionFailed(format!(
            "all encrypters must use the same enc: {} vs {}",
            first.enc(),
            other.enc()
        )));
    }

    debug!(
        alg = first.alg(),
        enc = first.enc(),
        encrypters = encrypters.len(),
        "creating JWE"
    );

    let result = first.encrypt(cleartext, protected_header, aad).await?;
    let mut recipients: Vec<Recipient> = result.recipient.into_iter().collect();

    if !rest.is_empty() {
        let Some(cek) = result.cek.as_ref() else {
            return Err(DagJoseError::EncryptionFailed(format!(
                "{} encrypter did not expose a CEK for additional recipients",
                first.alg()
            )));
        };
        for (offset, encrypter) in rest.iter().enumerate() {
            match encrypter.encrypt_cek(cek).await? {
                Some(recipient) => recipients.push(recipient),
                None => {
                    return Err(DagJoseError::EncryptionFailed(format!(
                        "encrypter {} ({}) cannot wrap a shared CEK",
                        offset + 1,
                        encrypter.alg()
                    )))
                }
            }
        }
    }

    Ok(DagJwe {
        aad: aad.map(base64url_encode),
        ciphertext: result.ciphertext,
        iv: result.iv,
        protected: result.protected,
        recipients: (!recipients.is_empty()).then_some(recipients),
        tag: result.tag,
        unprotected: None,
    })
}

fn parse_protected_header(protected: &str) -> Result<Header> {
    let bytes = decode_field(protected, "protected")?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(header)) => Ok(header),
        Ok(_) => Err(DagJoseError::MalformedEnvelope(
            "protected header is not a JSON object".to_string(),
        )),
        Err(e) => Err(DagJoseError::MalformedEnvelope(format!(
            "protected header is not JSON: {}",
            e
        ))),
    }
}

fn as_decryption_failure(err: DagJoseError) -> DagJoseError {
    match err {
        DagJoseError::DecryptionFailed(_) => err,
        other => DagJoseError::DecryptionFailed(other.to_string()),
    }
}

/// Decrypt an envelope with one decrypter.
///
/// Every recipient whose `alg` matches the decrypter is tried in order and
/// the first that opens the content wins.
pub async fn decrypt_jwe(jwe: &DagJwe, decrypter: &dyn Decrypter) -> Result<Vec<u8>> {
    let protected = parse_protected_header(&jwe.protected)?;

    let enc = header_str(&protected, "enc");
    if enc != Some(decrypter.enc()) {
        return Err(DagJoseError::DecryptionFailed(format!(
            "decrypter handles enc {}, envelope uses {}",
            decrypter.enc(),
            enc.unwrap_or("<none>")
        )));
    }

    if let Some(aad) = &jwe.aad {
        decode_field(aad, "aad")?;
    }
    let ciphertext = decode_field(&jwe.ciphertext, "ciphertext")?;
    let iv = decode_field(&jwe.iv, "iv")?;
    let tag = decode_field(&jwe.tag, "tag")?;
    let aad = content_aad(&jwe.protected, jwe.aad.as_deref());
    let content = ProtectedContent {
        ciphertext: &ciphertext,
        iv: &iv,
        tag: &tag,
        aad: &aad,
    };

    let Some(recipients) = &jwe.recipients else {
        let alg = header_str(&protected, "alg");
        if alg != Some(decrypter.alg()) {
            return Err(DagJoseError::DecryptionFailed(format!(
                "decrypter handles alg {}, envelope uses {}",
                decrypter.alg(),
                alg.unwrap_or("<none>")
            )));
        }
        return decrypter
            .decrypt(&content, None)
            .await
            .map_err(as_decryption_failure);
    };

    for (index, recipient) in recipients.iter().enumerate() {
        // Protected members take precedence over the per-recipient header.
        let mut merged = recipient.header.clone().unwrap_or_default();
        merged.extend(protected.clone());

        if header_str(&merged, "alg") != Some(decrypter.alg()) {
            debug!(index, "skipping recipient with different alg");
            continue;
        }

        let candidate = Recipient {
            encrypted_key: recipient.encrypted_key.clone(),
            header: Some(merged),
        };
        match decrypter.decrypt(&content, Some(&candidate)).await {
            Ok(cleartext) => return Ok(cleartext),
            Err(e) => debug!(index, error = %e, "recipient did not decrypt"),
        }
    }

    Err(DagJoseError::DecryptionFailed(
        "no recipient could be decrypted".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn protected_header_forces_enc() {
        let caller = json!({"enc": "other", "cty": "cid"});
        let header = protected_header(caller.as_object(), None, ENC_A256GCM);
        assert_eq!(header["enc"], ENC_A256GCM);
        assert_eq!(header["cty"], "cid");
        assert!(header.get("alg").is_none());
    }

    #[test]
    fn protected_header_alg_is_overridable() {
        let caller = json!({"alg": "custom"});
        let header = protected_header(caller.as_object(), Some(ALG_DIR), ENC_A256GCM);
        assert_eq!(header["alg"], "custom");
        let header = protected_header(None, Some(ALG_DIR), ENC_A256GCM);
        assert_eq!(header["alg"], ALG_DIR);
    }

    #[test]
    fn content_aad_appends_envelope_aad() {
        assert_eq!(content_aad("eyJ9", None), b"eyJ9");
        assert_eq!(content_aad("eyJ9", Some("YWFk")), b"eyJ9.YWFk");
    }

    #[test]
    fn seal_content_uses_canonical_protected_header() {
        let header = protected_header(json!({"z": 1, "a": 2}).as_object(), None, ENC_A256GCM);
        let result = seal_content(&[5u8; 32], b"payload", &header, None).unwrap();
        let decoded = jose_crypto::base64url_decode(&result.protected).unwrap();
        assert_eq!(decoded, br#"{"a":2,"enc":"A256GCM","z":1}"#);
    }

    #[test]
    fn protected_header_must_be_a_json_object() {
        let not_object = base64url_encode(b"[1]");
        assert!(matches!(
            parse_protected_header(&not_object),
            Err(DagJoseError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            parse_protected_header("!!"),
            Err(DagJoseError::InvalidEncoding(_))
        ));
    }
}
