use num_bigint_dig::BigUint;
use zeroize::Zeroizing;
use crate::codec::{BlobDecode, BlobEncode};
use crate::error::{Result, Error};
use super::{KeyAlgo, Privkey, check_blob_algo, check_blob_end};

/// "ssh-dss" public key algorithm from RFC 4253.
///
/// This algorithm is compatible with [`DssPrivkey`].
pub static SSH_DSS: KeyAlgo = KeyAlgo {
    name: "ssh-dss",
    make_privkey: |public_blob, private_blob| {
        DssPrivkey::from_blobs(public_blob, private_blob).map(Privkey::Dss)
    },
};

/// DSA private key.
///
/// You can convert it into [`dsa::SigningKey`] using `into()`.
#[derive(Clone)]
#[cfg_attr(feature = "debug_less_secure", derive(Debug))]
pub struct DssPrivkey {
    pub(crate) signing: dsa::SigningKey,
}

impl DssPrivkey {
    /// Construct the key from its fields, checking that they are consistent.
    ///
    /// The domain parameters and both keys are checked by [`dsa`], we additionally check that
    /// `y = g^x mod p`.
    pub fn from_components(p: BigUint, q: BigUint, g: BigUint, y: BigUint, x: BigUint) -> Result<DssPrivkey> {
        let x = Zeroizing::new(x);
        let components = dsa::Components::from_components(p, q, g)
            .map_err(|_| Error::KeyConstruction("dsa domain parameters are invalid"))?;

        let expected_y = Zeroizing::new(components.g().modpow(&x, components.p()));
        if *expected_y != y {
            return Err(Error::KeyConstruction("dsa public key does not match private key"))
        }

        let verifying = dsa::VerifyingKey::from_components(components, y)
            .map_err(|_| Error::KeyConstruction("dsa public key is invalid"))?;
        let signing = dsa::SigningKey::from_components(verifying, (*x).clone())
            .map_err(|_| Error::KeyConstruction("dsa private key is invalid"))?;
        Ok(DssPrivkey { signing })
    }

    pub(crate) fn from_blobs(public_blob: &[u8], private_blob: &[u8]) -> Result<DssPrivkey> {
        let mut public = BlobDecode::new(public_blob);
        check_blob_algo(&mut public, SSH_DSS.name)?;
        let p = public.get_biguint()?;
        let q = public.get_biguint()?;
        let g = public.get_biguint()?;
        let y = public.get_biguint()?;
        check_blob_end(&public)?;

        let x = BlobDecode::new(private_blob).get_biguint()?;
        Self::from_components(p, q, g, y, x)
    }

    pub(crate) fn public_blob(&self) -> Vec<u8> {
        let verifying = self.signing.verifying_key();
        let components = verifying.components();
        let mut blob = BlobEncode::new();
        blob.put_str(SSH_DSS.name);
        blob.put_biguint(components.p());
        blob.put_biguint(components.q());
        blob.put_biguint(components.g());
        blob.put_biguint(verifying.y());
        blob.finish().to_vec()
    }

    pub(crate) fn private_blob(&self) -> Zeroizing<Vec<u8>> {
        let x = self.signing.x();
        let mut blob = BlobEncode::with_capacity(BlobEncode::biguint_len(x));
        blob.put_biguint(x);
        blob.finish()
    }
}

impl From<DssPrivkey> for dsa::SigningKey {
    fn from(privkey: DssPrivkey) -> Self { privkey.signing }
}
