//! Public key algorithms.
//!
//! Both key file formats store a key as a pair of SSH2 blobs: the public blob (algorithm name
//! followed by the public parameters) and the private blob (the remaining secret parameters). The
//! algorithm table in this module turns such a pair into a validated [`Privkey`] and back.
//!
//! # Supported algorithms
//!
//! - "ssh-rsa" ([`SSH_RSA`], uses [`RsaPrivkey`])
//! - "ssh-dss" ([`SSH_DSS`], uses [`DssPrivkey`])
use base64::Engine as _;
use derivative::Derivative;
use sha2::Digest as _;
use zeroize::Zeroizing;
use crate::codec::BlobDecode;
use crate::error::{Result, Error};
pub use self::dss::{SSH_DSS, DssPrivkey};
pub use self::rsa::{SSH_RSA, RsaPrivkey};

mod dss;
mod rsa;

/// Algorithm for public key cryptography.
///
/// See the [module documentation][self] for details.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct KeyAlgo {
    /// Name of the algorithm, as stored at the start of the public blob.
    pub name: &'static str,
    #[derivative(Debug = "ignore")]
    pub(crate) make_privkey: fn(public_blob: &[u8], private_blob: &[u8]) -> Result<Privkey>,
}

impl KeyAlgo {
    /// Construct a private key from its public and private blob.
    ///
    /// The key is validated, any inconsistency between the fields is reported as
    /// [`Error::KeyConstruction`].
    pub fn privkey_from_blobs(&self, public_blob: &[u8], private_blob: &[u8]) -> Result<Privkey> {
        (self.make_privkey)(public_blob, private_blob)
    }
}

/// Find the algorithm with the given name.
pub fn algo_by_name(name: &str) -> Option<&'static KeyAlgo> {
    static ALGOS: &[&KeyAlgo] = &[&SSH_RSA, &SSH_DSS];
    ALGOS.iter().copied().find(|algo| algo.name == name)
}

/// Private key (keypair) in one of supported formats.
///
/// This enum is marked as `#[non_exhaustive]`, so we might add new variants without breaking
/// backwards compatibility.
#[derive(Clone)]
#[non_exhaustive]
#[cfg_attr(feature = "debug_less_secure", derive(Debug))]
pub enum Privkey {
    /// RSA private key.
    Rsa(RsaPrivkey),
    /// DSA private key.
    Dss(DssPrivkey),
}

impl Privkey {
    /// Get the algorithm of this key.
    pub fn algo(&self) -> &'static KeyAlgo {
        match self {
            Privkey::Rsa(_) => &SSH_RSA,
            Privkey::Dss(_) => &SSH_DSS,
        }
    }

    /// Encode the public blob of this key (algorithm name and public parameters).
    ///
    /// You can use this blob to compute a digest of the public key.
    pub fn public_blob(&self) -> Vec<u8> {
        match self {
            Privkey::Rsa(privkey) => privkey.public_blob(),
            Privkey::Dss(privkey) => privkey.public_blob(),
        }
    }

    /// Encode the private blob of this key (secret parameters only).
    pub fn private_blob(&self) -> Zeroizing<Vec<u8>> {
        match self {
            Privkey::Rsa(privkey) => privkey.private_blob(),
            Privkey::Dss(privkey) => privkey.private_blob(),
        }
    }

    /// Compute a fingerprint of the public key.
    ///
    /// The fingerprint is in the SHA-256 digest of the public blob encoded with base64 (not padded
    /// with `=` characters) and prefixed with `SHA256:` (e.g.
    /// `"SHA256:eaBPG/rqx+IPa0Lc9KHypkG3UxjmUwerwq9CZ/xpPWM"`).
    pub fn fingerprint(&self) -> String {
        let digest = sha2::Sha256::digest(self.public_blob());
        format!("SHA256:{}", base64::engine::general_purpose::STANDARD_NO_PAD.encode(digest))
    }

    /// Decode a private key from its public and private blob.
    ///
    /// The algorithm is selected by the name at the start of the public blob.
    pub fn from_blobs(public_blob: &[u8], private_blob: &[u8]) -> Result<Privkey> {
        let name = BlobDecode::new(public_blob).get_string()?;
        match algo_by_name(name) {
            Some(algo) => algo.privkey_from_blobs(public_blob, private_blob),
            None => {
                log::debug!("unknown key algorithm {:?}", name);
                Err(Error::Decode("unknown public key algorithm"))
            },
        }
    }
}

impl PartialEq for Privkey {
    fn eq(&self, other: &Self) -> bool {
        self.public_blob() == other.public_blob() && self.private_blob() == other.private_blob()
    }
}
impl Eq for Privkey {}

/// Private key with its comment, as stored in a key file.
#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct UserKey {
    /// The private key.
    #[derivative(Debug = "ignore")]
    pub privkey: Privkey,
    /// Comment stored next to the key.
    pub comment: String,
}

/// Read the algorithm name at the start of a public blob and check that it is `expected`.
pub(crate) fn check_blob_algo(blob: &mut BlobDecode, expected: &'static str) -> Result<()> {
    if blob.get_string()? != expected {
        return Err(Error::Decode("unexpected algorithm name in public blob"))
    }
    Ok(())
}

/// Check that the whole blob was consumed.
pub(crate) fn check_blob_end(blob: &BlobDecode) -> Result<()> {
    if blob.remaining_len() != 0 {
        return Err(Error::Decode("trailing bytes after key blob"))
    }
    Ok(())
}
