//! Encrypted envelopes whose payload is a content address (DAG-JOSE JWE).
//!
//! The textual form [`DagJwe`] is the general JWE JSON serialization with
//! base64url fields; the binary form [`EncodedJwe`] carries raw bytes and
//! is what goes into CBOR. [`encode`] and [`decode`] convert between them.

pub mod address;
#[cfg(feature = "cbor")]
mod cbor;
pub mod compact;
pub mod dag;
pub mod envelope;
pub mod error;
pub mod jwe;
pub mod types;

pub use address::ContentAddress;
pub use cid::Cid;
pub use compact::{from_compact, from_split, to_compact};
pub use dag::{create_dag_jwe, decrypt_dag_jwe};
pub use envelope::{decode, encode};
pub use error::{DagJoseError, Result};
pub use jwe::{
    create_jwe, decrypt_jwe, Decrypter, DirDecrypter, DirEncrypter, EcdhEsA256KwDecrypter,
    EcdhEsA256KwEncrypter, EncryptionResult, Encrypter, ProtectedContent,
};
pub use types::{DagJwe, EncodedJwe, EncodedRecipient, Header, Recipient};
