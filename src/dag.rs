//! Encrypting and recovering content addresses.

use tracing::{debug, warn};

use crate::address::ContentAddress;
use crate::error::{DagJoseError, Result};
use crate::jwe::{create_jwe, decrypt_jwe, Decrypter, Encrypter};
use crate::types::{DagJwe, Header};

/// Encrypt `address` for every encrypter.
///
/// The payload is exactly the canonical bytes of the address. An invalid
/// address fails with [`DagJoseError::InvalidPayload`] before any encrypter
/// is invoked.
pub async fn create_dag_jwe<A: ContentAddress>(
    address: &A,
    encrypters: &[&dyn Encrypter],
    protected_header: Option<&Header>,
    aad: Option<&[u8]>,
) -> Result<DagJwe> {
    if !address.is_valid() {
        return Err(DagJoseError::InvalidPayload(
            "a content address must be used as the payload".to_string(),
        ));
    }

    let payload = address.to_bytes();
    debug!(payload_len = payload.len(), "encrypting content address");
    create_jwe(&payload, encrypters, protected_header, aad).await
}

/// Decrypt `jwe` and rebuild the content address it carries.
pub async fn decrypt_dag_jwe<A: ContentAddress>(
    jwe: &DagJwe,
    decrypter: &dyn Decrypter,
) -> Result<A> {
    let payload = decrypt_jwe(jwe, decrypter).await?;
    A::from_bytes(&payload).map_err(|e| {
        warn!(error = %e, "decrypted payload is not a content address");
        match e {
            DagJoseError::InvalidPayload(_) => e,
            other => DagJoseError::InvalidPayload(other.to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwe::{DirDecrypter, DirEncrypter, EncryptionResult};
    use async_trait::async_trait;
    use cid::multihash::Multihash;
    use cid::Cid;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: [u8; 32] = [0x11; 32];

    struct Broken;

    impl ContentAddress for Broken {
        fn is_valid(&self) -> bool {
            false
        }

        fn to_bytes(&self) -> Vec<u8> {
            vec![0xde, 0xad]
        }

        fn from_bytes(_bytes: &[u8]) -> Result<Self> {
            Ok(Broken)
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Encrypter for Counting {
        fn alg(&self) -> &str {
            "test"
        }

        fn enc(&self) -> &str {
            "test"
        }

        async fn encrypt(
            &self,
            _cleartext: &[u8],
            _protected: Option<&Header>,
            _aad: Option<&[u8]>,
        ) -> Result<EncryptionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DagJoseError::EncryptionFailed("unreachable".to_string()))
        }
    }

    fn cid() -> Cid {
        Cid::new_v1(0x71, Multihash::wrap(0x12, &[3u8; 32]).unwrap())
    }

    #[tokio::test]
    async fn invalid_address_invokes_no_encrypter() {
        let counting = Counting::default();
        let err = create_dag_jwe(&Broken, &[&counting], None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DagJoseError::InvalidPayload(_)));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn address_round_trip() {
        let encrypter = DirEncrypter::new(&KEY).unwrap();
        let decrypter = DirDecrypter::new(&KEY).unwrap();

        let jwe = create_dag_jwe(&cid(), &[&encrypter], None, None)
            .await
            .unwrap();
        let recovered: Cid = decrypt_dag_jwe(&jwe, &decrypter).await.unwrap();
        assert_eq!(recovered, cid());
    }

    #[tokio::test]
    async fn non_address_payload_is_invalid() {
        let encrypter = DirEncrypter::new(&KEY).unwrap();
        let decrypter = DirDecrypter::new(&KEY).unwrap();

        let jwe = create_jwe(b"not a cid", &[&encrypter], None, None)
            .await
            .unwrap();
        let err = decrypt_dag_jwe::<Cid>(&jwe, &decrypter).await.unwrap_err();
        assert!(matches!(err, DagJoseError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn decryption_errors_pass_through() {
        let encrypter = DirEncrypter::new(&KEY).unwrap();
        let decrypter = DirDecrypter::new(&[0x22; 32]).unwrap();

        let jwe = create_dag_jwe(&cid(), &[&encrypter], None, None)
            .await
            .unwrap();
        assert!(matches!(
            decrypt_dag_jwe::<Cid>(&jwe, &decrypter).await,
            Err(DagJoseError::DecryptionFailed(_))
        ));
    }
}
