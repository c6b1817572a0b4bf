use bytes::Buf as _;
use num_bigint_dig::BigUint;
use std::str;
use zeroize::Zeroizing;
use crate::error::{Result, Error};

/// Decoding of SSH2 key blobs (low level API).
///
/// The field encodings are described in RFC 4251, section 5. This struct borrows the blob, so
/// decoding never copies key material except into the returned values.
#[derive(Debug, Clone)]
pub struct BlobDecode<'a> {
    buf: &'a [u8],
}

impl<'a> BlobDecode<'a> {
    /// Wraps the bytes into [`BlobDecode`].
    pub fn new(buf: &'a [u8]) -> BlobDecode<'a> {
        BlobDecode { buf }
    }

    /// Decode a `uint32`.
    pub fn get_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    /// Decode a `string`.
    pub fn get_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.get_u32()? as usize;
        self.ensure(len)?;
        let (bytes, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(bytes)
    }

    /// Decode a `string` in UTF-8.
    pub fn get_string(&mut self) -> Result<&'a str> {
        let bytes = self.get_bytes()?;
        str::from_utf8(bytes).map_err(|_| Error::Decode("string is not valid utf-8"))
    }

    /// Decode a `mpint` as [`BigUint`].
    ///
    /// Negative numbers are not valid in key blobs, so the bytes are always interpreted as
    /// unsigned.
    pub fn get_biguint(&mut self) -> Result<BigUint> {
        // `BigUint::from_bytes_be()` reverses the bytes in a temporary buffer that is not wiped
        let mut bytes_le = Zeroizing::new(self.get_bytes()?.to_vec());
        bytes_le.reverse();
        Ok(BigUint::from_bytes_le(&bytes_le))
    }

    fn ensure(&self, min_remaining: usize) -> Result<()> {
        if min_remaining <= self.buf.remaining() {
            Ok(())
        } else {
            Err(Error::Decode("unexpected end of blob"))
        }
    }

    /// Return the remaining undecoded bytes.
    pub fn remaining(&self) -> &'a [u8] {
        self.buf
    }

    /// Return the number of remaining undecoded bytes.
    pub fn remaining_len(&self) -> usize {
        self.buf.len()
    }
}
