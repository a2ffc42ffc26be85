//! CBOR container for the binary envelope.
//!
//! Byte fields are CBOR byte strings; headers are CBOR maps. Absent
//! optional fields are omitted from the map.

use crate::error::{DagJoseError, Result};
use crate::types::{EncodedJwe, RawEncodedJwe};

impl EncodedJwe {
    /// Encode as CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| DagJoseError::CborEncode(format!("{}", e)))?;
        Ok(buf)
    }

    /// Decode CBOR bytes. A missing mandatory field is a `MalformedEnvelope`.
    pub fn from_cbor(data: &[u8]) -> Result<Self> {
        let raw: RawEncodedJwe =
            ciborium::from_reader(data).map_err(|e| DagJoseError::CborDecode(format!("{}", e)))?;
        raw.try_into()
    }
}
