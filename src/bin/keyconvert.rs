use anyhow::{Result, Context as _};
use keyconvert::{ConvertConfig, Error};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use zeroize::Zeroizing;

const PASSPHRASE_VAR: &str = "KEYCONVERT_PASSPHRASE";
const EXPORT_PASSPHRASE_VAR: &str = "KEYCONVERT_EXPORT_PASSPHRASE";

fn main() -> ExitCode {
    env_logger::init();
    match run_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("keyconvert: {:?}", err);
            let status = err.downcast_ref::<Error>()
                .map(Error::status)
                .unwrap_or(keyconvert::STATUS_INVALID);
            ExitCode::from(u8::try_from(status).unwrap_or(1))
        },
    }
}

fn run_main() -> Result<()> {
    let matches = clap::Command::new("keyconvert")
        .about("Convert an OpenSSH private key into a PuTTY key file")
        .arg(clap::Arg::new("import")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(clap::ValueHint::FilePath)
            .value_name("openssh-key"))
        .arg(clap::Arg::new("export")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(clap::ValueHint::FilePath)
            .value_name("putty-key"))
        .arg(clap::Arg::new("passphrase").short('P').long("passphrase")
            .action(clap::ArgAction::Set)
            .value_name("passphrase")
            .help("Passphrase of the OpenSSH key"))
        .arg(clap::Arg::new("export-passphrase").short('E').long("export-passphrase")
            .action(clap::ArgAction::Set)
            .value_name("passphrase")
            .help("Encrypt the PuTTY key with this passphrase"))
        .arg(clap::Arg::new("comment").short('C').long("comment")
            .action(clap::ArgAction::Set)
            .value_name("comment")
            .help("Comment stored in the PuTTY key"))
        .arg(clap::Arg::new("ask-passphrase").short('a').long("ask-passphrase")
            .action(clap::ArgAction::SetTrue)
            .help("Ask for a passphrase to encrypt the PuTTY key"))
        .get_matches();

    let import_path = matches.get_one::<PathBuf>("import").cloned().unwrap_or_default();
    let export_path = matches.get_one::<PathBuf>("export").cloned().unwrap_or_default();
    let ask_passphrase = matches.get_flag("ask-passphrase");

    let pem_data = Zeroizing::new(fs::read(&import_path).map_err(Error::ReadIo)
        .with_context(|| format!("could not read {}", import_path.display()))?);
    let container = keyconvert::keys::parse_openssh_pem(&pem_data)
        .with_context(|| format!("could not parse {}", import_path.display()))?;
    log::debug!("{} contains {:?} key, encrypted {}",
        import_path.display(), container.key_type(), container.is_encrypted());

    let mut import_passphrase = passphrase_arg(&matches, "passphrase", PASSPHRASE_VAR);
    if import_passphrase.is_none() && container.is_encrypted() {
        import_passphrase = Some(prompt("Enter passphrase to load key: ")?);
    }

    let mut export_passphrase = passphrase_arg(&matches, "export-passphrase", EXPORT_PASSPHRASE_VAR);
    if export_passphrase.is_none() && ask_passphrase {
        export_passphrase = Some(prompt("Enter passphrase to save key (empty for none): ")?);
    }
    let export_passphrase = export_passphrase.filter(|passphrase| !passphrase.is_empty());

    let config = ConvertConfig::default().with(|c| {
        c.import_passphrase = import_passphrase;
        c.export_passphrase = export_passphrase;
        if let Some(comment) = matches.get_one::<String>("comment") {
            c.comment.clone_from(comment);
        }
    });

    let (putty_data, fingerprint) = keyconvert::convert_pem(&pem_data, &config)
        .with_context(|| format!("could not convert {}", import_path.display()))?;
    fs::write(&export_path, putty_data.as_bytes()).map_err(Error::WriteIo)
        .with_context(|| format!("could not write {}", export_path.display()))?;

    println!("{}: {}", export_path.display(), fingerprint);
    Ok(())
}

fn passphrase_arg(matches: &clap::ArgMatches, name: &str, var: &str) -> Option<Zeroizing<String>> {
    if let Some(passphrase) = matches.get_one::<String>(name) {
        return Some(Zeroizing::new(passphrase.clone()))
    }
    match std::env::var(var) {
        Ok(passphrase) => {
            log::warn!("Using a passphrase from environment variable {} is insecure", var);
            Some(Zeroizing::new(passphrase))
        },
        Err(_) => None,
    }
}

fn prompt(message: &str) -> Result<Zeroizing<String>> {
    rpassword::prompt_password(message)
        .map(Zeroizing::new)
        .context("could not read passphrase from terminal")
}
