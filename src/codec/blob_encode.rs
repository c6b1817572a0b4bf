use bytes::BufMut as _;
use derivative::Derivative;
use num_bigint_dig::BigUint;
use zeroize::Zeroizing;
use super::reserve_secret;

/// Encoder of SSH2 key blobs.
///
/// A blob is a sequence of `uint32`, `string` and `mpint` fields from RFC 4251, section 5. Both
/// key file formats store the key as a public and a private blob. The private blob holds secret
/// key material, so the buffer is wiped when it is dropped, and also whenever it grows.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub struct BlobEncode {
    #[derivative(Debug = "ignore")]
    buf: Zeroizing<Vec<u8>>,
}

impl BlobEncode {
    /// Creates an empty blob.
    pub fn new() -> BlobEncode {
        Self::default()
    }

    /// Creates an empty blob with room for `capacity` bytes.
    ///
    /// Reserve enough capacity up front for private blobs to avoid copying the key material when
    /// the buffer grows.
    pub fn with_capacity(capacity: usize) -> BlobEncode {
        BlobEncode { buf: Zeroizing::new(Vec::with_capacity(capacity)) }
    }

    /// Append a `uint32` field.
    pub fn put_u32(&mut self, value: u32) {
        reserve_secret(&mut self.buf, 4);
        self.buf.put_u32(value);
    }

    /// Append a `string` field with arbitrary contents.
    ///
    /// In legacy OpenSSH keys, this is also used to store the DER integers verbatim, because their
    /// two's complement encoding is the same as the encoding of `mpint`.
    pub fn put_bytes(&mut self, value: &[u8]) {
        reserve_secret(&mut self.buf, 4 + value.len());
        self.put_len(value.len());
        self.buf.put_slice(value);
    }

    /// Append a `string` field with UTF-8 contents, such as an algorithm name.
    pub fn put_str(&mut self, value: &str) {
        self.put_bytes(value.as_bytes())
    }

    /// Append a non-negative `mpint` field.
    ///
    /// The value is encoded with the minimal number of bytes, with a zero byte prepended if the
    /// highest bit is set (so that the number is not negative). Zero is encoded as an empty
    /// string.
    pub fn put_biguint(&mut self, value: &BigUint) {
        let bytes = Zeroizing::new(value.to_bytes_be());
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let digits = &bytes[start..];
        let sign_byte = matches!(digits.first(), Some(&b) if b & 0x80 != 0);

        let len = digits.len() + usize::from(sign_byte);
        reserve_secret(&mut self.buf, 4 + len);
        self.put_len(len);
        if sign_byte {
            self.buf.put_u8(0);
        }
        self.buf.put_slice(digits);
    }

    /// Number of bytes that [`put_biguint()`][Self::put_biguint] appends for `value` (at most).
    pub fn biguint_len(value: &BigUint) -> usize {
        4 + value.bits() / 8 + 1
    }

    fn put_len(&mut self, len: usize) {
        let len = u32::try_from(len).expect("blob field is longer than 4 GiB");
        self.buf.put_u32(len);
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing was encoded yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Return the encoded blob.
    pub fn finish(self) -> Zeroizing<Vec<u8>> {
        self.buf
    }
}
