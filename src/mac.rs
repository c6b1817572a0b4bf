//! Message authentication algorithms.
//!
//! PuTTY key files protect the integrity of all fields (and detect a wrong passphrase) with a MAC
//! that is stored in the `Private-MAC` line.
//!
//! # Supported algorithms
//!
//! - "hmac-sha1" ([`HMAC_SHA1`])
use derivative::Derivative;
use hmac::Mac as _;
use hmac::digest::FixedOutputReset;
use crate::error::{Result, Error};

/// Algorithm for authenticating messages.
///
/// See the [module documentation][self] for details.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct MacAlgo {
    /// Name of the algorithm.
    pub name: &'static str,
    /// Length of the tag in bytes.
    pub tag_len: usize,
    #[derivative(Debug = "ignore")]
    pub(crate) make_mac: fn(key: &[u8]) -> Result<Box<dyn Mac + Send>>,
}

/// Streaming MAC computation.
pub trait Mac {
    /// Feed more data into the MAC.
    fn update(&mut self, data: &[u8]);
    /// Finish the MAC and return the tag.
    fn sign(self: Box<Self>) -> Vec<u8>;
    /// Finish the MAC and compare it with `tag` in constant time.
    fn verify(self: Box<Self>, tag: &[u8]) -> Result<()>;
}

/// HMAC with SHA-1 from RFC 2104.
///
/// Keys longer than the 64-byte block of SHA-1 are hashed first, shorter keys are padded with
/// zeros.
pub static HMAC_SHA1: MacAlgo = MacAlgo {
    name: "hmac-sha1",
    tag_len: 20,
    make_mac: |key| {
        let hmac = hmac::Hmac::<sha1::Sha1>::new_from_slice(key)
            .map_err(|_| Error::Crypto("invalid key length for hmac-sha1"))?;
        Ok(Box::new(HmacMac { hmac }))
    },
};

impl MacAlgo {
    /// Start a new MAC computation with `key`.
    pub fn start(&self, key: &[u8]) -> Result<Box<dyn Mac + Send>> {
        (self.make_mac)(key)
    }
}

/// HMAC state that is wiped when dropped, because it holds the key and the last input block.
struct HmacMac<M: FlatMac> {
    hmac: M,
}

trait FlatMac: hmac::Mac + FixedOutputReset {}
impl FlatMac for hmac::Hmac<sha1::Sha1> {}

impl<M: FlatMac> Mac for HmacMac<M> {
    fn update(&mut self, data: &[u8]) {
        hmac::Mac::update(&mut self.hmac, data);
    }

    fn sign(mut self: Box<Self>) -> Vec<u8> {
        self.hmac.finalize_reset().into_bytes().to_vec()
    }

    fn verify(mut self: Box<Self>, tag: &[u8]) -> Result<()> {
        self.hmac.verify_slice_reset(tag).map_err(|_| Error::Mac)
    }
}

impl<M: FlatMac> Drop for HmacMac<M> {
    fn drop(&mut self) {
        // SAFETY: `FlatMac` is implemented only for HMACs over hashes made of integers and integer
        // arrays, for which all zeros is a valid value
        unsafe { zeroize::zeroize_flat_type(&mut self.hmac as *mut M) }
    }
}
