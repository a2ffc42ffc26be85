//! `dir` + `A256GCM`: the content is encrypted directly under a shared key.

use async_trait::async_trait;
use jose_crypto::{CryptoError, AES_KEY_LENGTH};
use zeroize::Zeroizing;

use super::{
    protected_header, seal_content, Decrypter, EncryptionResult, Encrypter, ProtectedContent,
    ALG_DIR, ENC_A256GCM,
};
use crate::error::Result;
use crate::types::{Header, Recipient};

fn shared_key(key: &[u8]) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>> {
    let key: [u8; AES_KEY_LENGTH] = key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: AES_KEY_LENGTH,
        got: key.len(),
    })?;
    Ok(Zeroizing::new(key))
}

/// Encrypts with a pre-shared 32-byte key. Produces no recipients.
pub struct DirEncrypter {
    key: Zeroizing<[u8; AES_KEY_LENGTH]>,
}

impl DirEncrypter {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            key: shared_key(key)?,
        })
    }
}

#[async_trait]
impl Encrypter for DirEncrypter {
    fn alg(&self) -> &str {
        ALG_DIR
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
        let header = protected_header(protected, Some(ALG_DIR), ENC_A256GCM);
        seal_content(self.key.as_slice(), cleartext, &header, aad)
    }
}

/// Decrypts `dir` envelopes with the pre-shared key.
pub struct DirDecrypter {
    key: Zeroizing<[u8; AES_KEY_LENGTH]>,
}

impl DirDecrypter {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            key: shared_key(key)?,
        })
    }
}

#[async_trait]
impl Decrypter for DirDecrypter {
    fn alg(&self) -> &str {
        ALG_DIR
    }

    fn enc(&self) -> &str {
        ENC_A256GCM
    }

    async fn decrypt(
        &self,
        content: &ProtectedContent<'_>,
        _recipient: Option<&Recipient>,
    ) -> Result<Vec<u8>> {
        Ok(jose_crypto::open(
            self.key.as_slice(),
            content.iv,
            content.ciphertext,
            content.tag,
            content.aad,
        )?)
    }
}
