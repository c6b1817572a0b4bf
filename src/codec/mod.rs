//! Low level encodings shared by the key file formats.
use zeroize::Zeroizing;
pub use self::blob_encode::BlobEncode;
pub use self::blob_decode::BlobDecode;

pub mod armor;
mod blob_encode;
mod blob_decode;

/// Make room for `additional` bytes in a secret buffer without leaking its contents.
///
/// `Vec` would reallocate and free the old allocation as it is, so we move the contents into a
/// larger buffer ourselves and let the old one be wiped on drop.
pub(crate) fn reserve_secret(buf: &mut Zeroizing<Vec<u8>>, additional: usize) {
    let needed = buf.len().checked_add(additional).expect("secret buffer is too large");
    if needed <= buf.capacity() {
        return
    }
    let mut grown = Zeroizing::new(Vec::with_capacity(needed.max(2 * buf.capacity())));
    grown.extend_from_slice(buf);
    std::mem::swap(buf, &mut grown);
}
