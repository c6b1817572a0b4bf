//! Hash functions.
//!
//! Both key formats derive keys from passphrases with plain hash functions: legacy OpenSSH keys
//! use MD5 (the OpenSSL `EVP_BytesToKey` construction), PuTTY key files use SHA-1.
//!
//! # Supported algorithms
//!
//! - "sha1" ([`SHA1`])
//! - "md5" ([`MD5`])
use derivative::Derivative;
use sha1::Digest as _;
use sha1::digest::FixedOutputReset;
use zeroize::Zeroizing;

/// Hash function.
///
/// See the [module documentation][self] for details.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct HashAlgo {
    /// Name of the algorithm.
    pub name: &'static str,
    /// Length of the digest in bytes.
    pub output_len: usize,
    #[derivative(Debug = "ignore")]
    pub(crate) make_hash: fn() -> Box<dyn Hash + Send>,
}

/// Streaming hash computation.
pub trait Hash {
    /// Feed more data into the hash.
    fn update(&mut self, data: &[u8]);
    /// Finish the hash and return the digest.
    fn finish(self: Box<Self>) -> Zeroizing<Vec<u8>>;
}

/// SHA-1 from FIPS 180-4.
pub static SHA1: HashAlgo = HashAlgo {
    name: "sha1",
    output_len: 20,
    make_hash: || Box::new(DigestHash(sha1::Sha1::new())),
};

/// MD5 from RFC 1321.
pub static MD5: HashAlgo = HashAlgo {
    name: "md5",
    output_len: 16,
    make_hash: || Box::new(DigestHash(md5::Md5::new())),
};

impl HashAlgo {
    /// Start a new hash computation.
    pub fn start(&self) -> Box<dyn Hash + Send> {
        (self.make_hash)()
    }

    /// Hash the concatenation of `parts` in one go.
    pub fn digest(&self, parts: &[&[u8]]) -> Zeroizing<Vec<u8>> {
        let mut hash = self.start();
        for part in parts {
            hash.update(part);
        }
        hash.finish()
    }
}

/// Hash state that is wiped when dropped.
///
/// The `sha1` and `md-5` states hold the last input block, which contains secrets when we derive
/// keys, and they don't implement `Zeroize`. Both are flat structs of integer arrays.
struct DigestHash<D: FlatDigest>(D);

trait FlatDigest: sha1::Digest + FixedOutputReset {}
impl FlatDigest for sha1::Sha1 {}
impl FlatDigest for md5::Md5 {}

impl<D: FlatDigest> Hash for DigestHash<D> {
    fn update(&mut self, data: &[u8]) {
        sha1::Digest::update(&mut self.0, data);
    }

    fn finish(mut self: Box<Self>) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.finalize_reset().to_vec())
    }
}

impl<D: FlatDigest> Drop for DigestHash<D> {
    fn drop(&mut self) {
        // SAFETY: `FlatDigest` is implemented only for hashes made of integers and integer arrays,
        // for which all zeros is a valid value
        unsafe { zeroize::zeroize_flat_type(&mut self.0 as *mut D) }
    }
}
