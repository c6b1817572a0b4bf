use num_bigint_dig::{BigUint, ModInverse as _};
use rsa::traits::{PublicKeyParts as _, PrivateKeyParts as _};
use zeroize::Zeroizing;
use crate::codec::{BlobDecode, BlobEncode};
use crate::error::{Result, Error};
use super::{KeyAlgo, Privkey, check_blob_algo, check_blob_end};

/// "ssh-rsa" public key algorithm from RFC 4253.
///
/// This algorithm is compatible with [`RsaPrivkey`].
pub static SSH_RSA: KeyAlgo = KeyAlgo {
    name: "ssh-rsa",
    make_privkey: |public_blob, private_blob| {
        RsaPrivkey::from_blobs(public_blob, private_blob).map(Privkey::Rsa)
    },
};

/// RSA private key.
///
/// The key always has exactly two primes, stored so that `p > q`, together with
/// `iqmp = q^-1 mod p` (the CRT coefficient used by PuTTY).
#[derive(Clone)]
#[cfg_attr(feature = "debug_less_secure", derive(Debug))]
pub struct RsaPrivkey {
    pub(crate) privkey: rsa::RsaPrivateKey,
    iqmp: Zeroizing<BigUint>,
}

impl RsaPrivkey {
    /// Construct the key from its fields, checking that they are consistent.
    ///
    /// We check that `n = p*q`, that `d` is the inverse of `e` modulo `p-1` and `q-1` and that
    /// `iqmp` is the inverse of `q` modulo `p`. If `p < q`, the primes are swapped and `iqmp` is
    /// recomputed, so that the stored key is in the form that PuTTY expects.
    ///
    /// The key is finally validated by [`rsa::RsaPrivateKey`], which rejects public exponents
    /// larger than [`rsa::RsaPublicKey::MAX_PUB_EXPONENT`] (2^33 - 1). Such keys are valid RSA keys,
    /// but they cannot be converted and fail with [`Error::KeyConstruction`].
    pub fn from_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        iqmp: BigUint,
    ) -> Result<RsaPrivkey> {
        let d = Zeroizing::new(d);
        let mut p = Zeroizing::new(p);
        let mut q = Zeroizing::new(q);
        let mut iqmp = Zeroizing::new(iqmp);

        let one = BigUint::from(1u32);
        if *p <= one || *q <= one {
            return Err(Error::KeyConstruction("rsa primes must be greater than one"))
        }
        if &*p * &*q != n {
            return Err(Error::KeyConstruction("rsa modulus is not the product of the primes"))
        }

        let ed = Zeroizing::new(&e * &*d);
        for prime in [&p, &q] {
            let prime_1 = Zeroizing::new(&**prime - &one);
            let rem = Zeroizing::new(&*ed % &*prime_1);
            if *rem != one {
                return Err(Error::KeyConstruction("rsa private exponent does not match public exponent"))
            }
        }

        if *p < *q {
            log::debug!("rsa key has p < q, swapping the primes and recomputing iqmp");
            std::mem::swap(&mut p, &mut q);
            iqmp = Zeroizing::new((&*q).mod_inverse(&*p)
                .and_then(|inverse| inverse.to_biguint())
                .ok_or(Error::KeyConstruction("rsa primes are not coprime"))?);
        }

        let rem = Zeroizing::new(&*iqmp * &*q % &*p);
        if *rem != one {
            return Err(Error::KeyConstruction("rsa iqmp is not the inverse of q modulo p"))
        }

        let primes = vec![(*p).clone(), (*q).clone()];
        let privkey = rsa::RsaPrivateKey::from_components(n, e, (*d).clone(), primes)
            .map_err(|_| Error::KeyConstruction("rsa key was rejected"))?;
        Ok(RsaPrivkey { privkey, iqmp })
    }

    pub(crate) fn from_blobs(public_blob: &[u8], private_blob: &[u8]) -> Result<RsaPrivkey> {
        let mut public = BlobDecode::new(public_blob);
        check_blob_algo(&mut public, SSH_RSA.name)?;
        let e = public.get_biguint()?;
        let n = public.get_biguint()?;
        check_blob_end(&public)?;

        // trailing bytes of the private blob are padding
        let mut private = BlobDecode::new(private_blob);
        let d = private.get_biguint()?;
        let p = private.get_biguint()?;
        let q = private.get_biguint()?;
        let iqmp = private.get_biguint()?;

        Self::from_components(n, e, d, p, q, iqmp)
    }

    pub(crate) fn public_blob(&self) -> Vec<u8> {
        let mut blob = BlobEncode::new();
        blob.put_str(SSH_RSA.name);
        blob.put_biguint(self.privkey.e());
        blob.put_biguint(self.privkey.n());
        blob.finish().to_vec()
    }

    pub(crate) fn private_blob(&self) -> Zeroizing<Vec<u8>> {
        let primes = self.privkey.primes();
        let fields = [self.privkey.d(), &primes[0], &primes[1], &*self.iqmp];
        let capacity = fields.iter().copied().map(BlobEncode::biguint_len).sum();
        let mut blob = BlobEncode::with_capacity(capacity);
        for field in fields {
            blob.put_biguint(field);
        }
        blob.finish()
    }

    /// The modulus `n`.
    pub fn n(&self) -> &BigUint {
        self.privkey.n()
    }

    /// The public exponent `e`.
    pub fn e(&self) -> &BigUint {
        self.privkey.e()
    }

    /// The larger prime `p`.
    pub fn p(&self) -> &BigUint {
        &self.privkey.primes()[0]
    }

    /// The smaller prime `q`.
    pub fn q(&self) -> &BigUint {
        &self.privkey.primes()[1]
    }

    /// The CRT coefficient `q^-1 mod p`.
    pub fn iqmp(&self) -> &BigUint {
        &self.iqmp
    }
}

impl From<RsaPrivkey> for rsa::RsaPrivateKey {
    fn from(privkey: RsaPrivkey) -> Self { privkey.privkey }
}
