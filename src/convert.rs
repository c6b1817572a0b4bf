use derivative::Derivative;
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;
use crate::error::{Result, Error, STATUS_OK};
use crate::keys::{self, IMPORTED_COMMENT};

/// Configuration of a key conversion.
///
/// You should start from the [default][Default] instance, which reproduces the behavior of
/// [`convert()`], and tweak it as needed:
///
/// ```
/// # use keyconvert::ConvertConfig;
/// let config = ConvertConfig::default().with(|c| {
///     c.export_passphrase = Some(String::from("hunter2").into());
///     c.comment = "work laptop".into();
/// });
/// ```
#[derive(Derivative, Clone)]
#[derivative(Debug)]
#[non_exhaustive]
pub struct ConvertConfig {
    /// Passphrase for an encrypted OpenSSH key.
    ///
    /// If the key is encrypted and the passphrase is missing or wrong, the conversion fails with
    /// [`Error::BadKeyPassphrase`]. The passphrase is ignored for unencrypted keys.
    #[derivative(Debug = "ignore")]
    pub import_passphrase: Option<Zeroizing<String>>,

    /// Passphrase for the PuTTY key file.
    ///
    /// If set, the private key is encrypted with "aes256-cbc", otherwise it is written in
    /// plaintext (encryption "none").
    #[derivative(Debug = "ignore")]
    pub export_passphrase: Option<Zeroizing<String>>,

    /// Comment stored in the PuTTY key file.
    ///
    /// Defaults to [`IMPORTED_COMMENT`], because OpenSSH files do not store any comment.
    pub comment: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            import_passphrase: None,
            export_passphrase: None,
            comment: IMPORTED_COMMENT.into(),
        }
    }
}

impl ConvertConfig {
    /// Mutate `self` in a closure.
    ///
    /// This method applies your closure to `self` and returns the mutated configuration.
    pub fn with<F: FnOnce(&mut Self)>(mut self, f: F) -> Self {
        f(&mut self);
        self
    }
}

/// Convert the OpenSSH key at `import_path` into a PuTTY key file at `export_path`.
///
/// This is the plain entry point: it uses [`ConvertConfig::default()`] (no passphrases) and
/// reports the outcome as an integer status: [`STATUS_OK`] on success, otherwise
/// [`Error::status()`] of the failure.
pub fn convert(import_path: impl AsRef<Path>, export_path: impl AsRef<Path>) -> i32 {
    match convert_file(import_path.as_ref(), export_path.as_ref(), &ConvertConfig::default()) {
        Ok(()) => STATUS_OK,
        Err(err) => {
            log::debug!("key conversion failed: {}", err);
            err.status()
        },
    }
}

/// Convert the OpenSSH key at `import_path` into a PuTTY key file at `export_path`.
///
/// Read failures are reported as [`Error::ReadIo`], write failures as [`Error::WriteIo`]. The
/// output file is written only if the whole conversion succeeded.
pub fn convert_file(import_path: &Path, export_path: &Path, config: &ConvertConfig) -> Result<()> {
    let pem_data = Zeroizing::new(fs::read(import_path).map_err(Error::ReadIo)?);
    let (putty_data, fingerprint) = convert_pem(&pem_data, config)?;
    fs::write(export_path, putty_data.as_bytes()).map_err(Error::WriteIo)?;
    log::info!("converted {} to {}, key fingerprint {}",
        import_path.display(), export_path.display(), fingerprint);
    Ok(())
}

/// Convert an OpenSSH key in memory, returning the PuTTY key file and the key fingerprint.
pub fn convert_pem(pem_data: &[u8], config: &ConvertConfig) -> Result<(Zeroizing<String>, String)> {
    let container = keys::parse_openssh_pem(pem_data)?;
    let import_passphrase = config.import_passphrase.as_deref().map(String::as_bytes);
    if container.is_encrypted() && import_passphrase.is_none() {
        log::debug!("key is encrypted but no passphrase was given");
    }

    let mut key = container.decode(import_passphrase.unwrap_or_default())?;
    key.comment.clone_from(&config.comment);

    let export_passphrase = config.export_passphrase.as_deref().map(String::as_bytes);
    let putty_data = keys::encode_putty_keyfile(&key, export_passphrase)?;
    let fingerprint = key.privkey.fingerprint();
    log::debug!("converted {} key with fingerprint {}", key.privkey.algo().name, fingerprint);
    Ok((putty_data, fingerprint))
}
