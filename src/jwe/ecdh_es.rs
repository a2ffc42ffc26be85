//! `ECDH-ES+A256KW` + `A256GCM` on P-256.
//!
//! Each recipient gets its own ephemeral key agreement; the derived KEK wraps
//! the shared CEK. `alg` and `epk` travel in the recipient header, so one
//! envelope can carry several ECDH-ES recipients.

use async_trait::async_trait;
use jose_crypto::{
    ecdh_es_recipient_kek, ecdh_es_sender_kek, generate_cek, import_p256_private_jwk,
    import_p256_public_jwk, unwrap_key, wrap_key, P256PublicKey, P256SecretKey,
};
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use super::{
    protected_header, seal_content, Decrypter, EncryptionResult, Encrypter, ProtectedContent,
    ALG_ECDH_ES_A256KW, ENC_A256GCM,
};
use crate::envelope::decode_field;
use crate::error::{DagJoseError, Result};
use crate::types::{Header, Recipient};

/// Encrypts for one P-256 recipient public key.
pub struct EcdhEsA256KwEncrypter {
    recipient: P256PublicKey,
    kid: Option<String>,
}

impl EcdhEsA256KwEncrypter {
    /// `recipient_jwk` is the recipient's public JWK. `kid`, if given, is
    /// copied into the recipient header so the receiver can pick its key.
    pub fn new(recipient_jwk: &Value, kid: Option<String>) -> Result<Self> {
        Ok(Self {
            recipient: import_p256_public_jwk(recipient_jwk)?,
            kid,
        })
    }

    fn wrap_cek(&self, cek: &[u8]) -> Result<Recipient> {
        let agreement = ecdh_es_sender_kek(&self.recipient, ALG_ECDH_ES_A256KW)?;
        let encrypted_key = wrap_key(agreement.kek.as_slice(), cek)?;

        let mut header = Header::new();
        header.insert(
            "alg".to_string(),
            Value::String(ALG_ECDH_ES_A256KW.to_string()),
        );
        header.insert("epk".to_string(), agreement.epk);
        if let Some(kid) = &self.kid {
            header.insert("kid".to_string(), Value::String(kid.clone()));
        }

        Ok(Recipient {
            encrypted_key: Some(jose_crypto::base64url_encode(&encrypted_key)),
            header: Some(header),
        })
    }
}

#[async_trait]
impl Encrypter for EcdhEsA256KwEncrypter {
    fn alg(&self) -> &str {
        ALG_ECDH_ES_A256KW
    }

    fn enc(&self) -> &str {
        ENC_A256GCM
    }

    async fn encrypt(
        &self,
        cleartext: &[u8],
        protected: Option<&Header>,
        aad: Option<&[u8]>,
    ) -> Result<EncryptionResult> {
        let cek = generate_cek()?;
        let header = protected_header(protected, None, ENC_A256GCM);

        let mut result = seal_content(cek.as_slice(), cleartext, &header, aad)?;
        result.recipient = Some(self.wrap_cek(cek.as_slice())?);
        result.cek = Some(Zeroizing::new(cek.to_vec()));
        Ok(result)
    }

    async fn encrypt_cek(&self, cek: &[u8]) -> Result<Option<Recipient>> {
        self.wrap_cek(cek).map(Some)
    }
}

/// Decrypts with a P-256 private key.
pub struct EcdhEsA256KwDecrypter {
    secret: P256SecretKey,
}

impl EcdhEsA256KwDecrypter {
    /// `private_jwk` must carry the `d` member.
    pub fn new(private_jwk: &Value) -> Result<Self> {
        Ok(Self {
            secret: import_p256_private_jwk(private_jwk)?,
        })
    }

    pub fn from_secret(secret: P256SecretKey) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl Decrypter for EcdhEsA256KwDecrypter {
    fn alg(&self) -> &str {
        ALG_ECDH_ES_A256KW
    }

    fn enc(&self) -> &str {
        ENC_A256GCM
    }

    async fn decrypt(
        &self,
        content: &ProtectedContent<'_>,
        recipient: Option<&Recipient>,
    ) -> Result<Vec<u8>> {
        let Some(recipient) = recipient else {
            return Err(DagJoseError::DecryptionFailed(
                "ECDH-ES+A256KW requires a recipient".to_string(),
            ));
        };
        let Some(encrypted_key) = recipient.encrypted_key.as_deref() else {
            return Err(DagJoseError::DecryptionFailed(
                "recipient has no encrypted_key".to_string(),
            ));
        };
        let Some(epk) = recipient.header.as_ref().and_then(|h| h.get("epk")) else {
            return Err(DagJoseError::DecryptionFailed(
                "recipient header has no epk".to_string(),
            ));
        };

        let epk = import_p256_public_jwk(epk)?;
        let kek = ecdh_es_recipient_kek(&self.secret, &epk, ALG_ECDH_ES_A256KW);
        let wrapped = decode_field(encrypted_key, "encrypted_key")?;
        let cek = unwrap_key(kek.as_slice(), &wrapped)?;
        debug!("unwrapped content key");

        Ok(jose_crypto::open(
            &cek,
            content.iv,
            content.ciphertext,
            content.tag,
            content.aad,
        )?)
    }
}
