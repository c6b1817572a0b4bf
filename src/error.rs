/// Result type for our [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Status returned by [`convert()`][crate::convert()] when the conversion succeeded.
pub const STATUS_OK: i32 = 0;

/// Status returned for I/O errors that do not carry an OS error code (`EIO`).
pub const STATUS_IO: i32 = 5;

/// Status returned for invalid input, bad passphrase or unsupported format (`EINVAL`).
pub const STATUS_INVALID: i32 = 22;

/// Error that occured while converting a key.
///
/// This enum is `#[non_exhaustive]`, so we reserve the right to add more variants and don't
/// consider this to break backwards compatibility.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum Error {
    #[error("IO error when reading key file")]
    ReadIo(#[source] std::io::Error),
    #[error("IO error when writing key file")]
    WriteIo(#[source] std::io::Error),
    #[error("bad key file header: {0}")]
    Header(&'static str),
    #[error("unsupported cipher {0:?}")]
    UnsupportedCipher(String),
    #[error("invalid base64 encoding")]
    Base64,
    #[error("ASN.1 decoding failure: {0}")]
    Asn1(&'static str),
    #[error("bad passphrase for private key")]
    BadKeyPassphrase,
    #[error("could not construct key: {0}")]
    KeyConstruction(&'static str),
    #[error("invalid key comment: {0}")]
    Comment(&'static str),
    #[error("could not decode bytes: {0}")]
    Decode(&'static str),
    #[error("mac verification failed")]
    Mac,
    #[error("cryptography error: {0}")]
    Crypto(&'static str),
}

impl Error {
    /// Translates the error into the integer status reported by [`convert()`][crate::convert()].
    ///
    /// I/O errors are reported with their OS error code (or [`STATUS_IO`] if there is none), all
    /// other errors are reported as [`STATUS_INVALID`].
    pub fn status(&self) -> i32 {
        match self {
            Error::ReadIo(err) | Error::WriteIo(err) =>
                err.raw_os_error().filter(|&code| code != 0).unwrap_or(STATUS_IO),
            _ => STATUS_INVALID,
        }
    }
}
