//! Model signing utility for Prognos.
//!
//! Creates a signed manifest (`manifest.json`) and Ed25519 signature
//! (`manifest.sig`) covering the five category model files, enabling
//! verification at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_model -- sign <model_dir>
//! cargo run --bin sign_model -- keygen --out-seed <path> [--out-pub <path>] [--force]
//! ```
//!
//! # Security
//!
//! - Signing key sourced from secure locations (FD, file, Docker secret)
//! - Manifest includes SHA-256 hashes of all bound files
//! - Private key material zeroized after use

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
#[cfg(unix)]
use std::os::unix::io::FromRawFd;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use prognos::adapters::model::manifest::{
    sha256_hex, ModelManifest, MANIFEST_FILE, MANIFEST_VERSION, SIGNATURE_FILE,
};
use prognos::DiseaseCategory;

const KEY_FD_ENV: &str = "PROGNOS_MODEL_SIGNING_KEY_B64_FD";
const KEY_FILE_ENV: &str = "PROGNOS_MODEL_SIGNING_KEY_B64_FILE";
const KEY_ENV: &str = "PROGNOS_MODEL_SIGNING_KEY_B64";
const DOCKER_SECRET_PATH: &str = "/run/secrets/prognos_model_signing_key_b64";

const USAGE: &str = "Usage:\n  sign_model sign <model_dir>\n  sign_model keygen --out-seed <path> [--out-pub <path>] [--force]";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

enum Command {
    Sign {
        model_dir: PathBuf,
    },
    Keygen {
        out_seed: PathBuf,
        out_pub: Option<PathBuf>,
        force: bool,
    },
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn non_empty_secret(raw: &str) -> Result<Zeroizing<String>> {
    let secret = raw.trim_end_matches(['\n', '\r']).to_string();
    if secret.is_empty() {
        bail!("Empty signing key");
    }
    Ok(Zeroizing::new(secret))
}

fn read_signing_seed_b64() -> Result<Zeroizing<String>> {
    #[cfg(unix)]
    if let Ok(fd_str) = env::var(KEY_FD_ENV) {
        let fd: i32 = fd_str.trim().parse().map_err(|_| anyhow!("Invalid key FD"))?;
        if fd <= 2 {
            bail!("Refusing to read signing key from stdio FD");
        }
        // SAFETY: take ownership of FD for one-time secret read.
        let mut file = unsafe { fs::File::from_raw_fd(fd) };
        let mut buf = Zeroizing::new(String::new());
        use std::io::Read;
        file.read_to_string(&mut buf)
            .context("Failed reading signing key from FD")?;
        return non_empty_secret(&buf);
    }

    if let Ok(path) = env::var(KEY_FILE_ENV) {
        let content = Zeroizing::new(
            fs::read_to_string(path.trim()).context("Failed reading signing key file")?,
        );
        return non_empty_secret(&content);
    }

    if Path::new(DOCKER_SECRET_PATH).exists() {
        let content = Zeroizing::new(
            fs::read_to_string(DOCKER_SECRET_PATH).context("Failed reading docker secret")?,
        );
        return non_empty_secret(&content);
    }

    // Dev-only fallback for convenience.
    if cfg!(debug_assertions) {
        if let Ok(v) = env::var(KEY_ENV) {
            return non_empty_secret(&Zeroizing::new(v));
        }
    }

    Err(anyhow!(
        "Missing signing key. Provide one of: {KEY_FD_ENV}, {KEY_FILE_ENV}, or {DOCKER_SECRET_PATH} ({KEY_ENV} fallback only in debug builds)."
    ))
}

fn read_signing_seed() -> Result<Seed> {
    let b64 = read_signing_seed_b64()?;
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(b64.trim())
            .context("Invalid base64 in signing key")?,
    );

    if raw.len() != 32 {
        bail!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        );
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn parse_args() -> Result<Command> {
    let mut args = env::args().skip(1);
    let sub = args.next().ok_or_else(|| anyhow!(USAGE))?;

    match sub.as_str() {
        "sign" => {
            let model_dir = args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?;
            if args.next().is_some() {
                bail!(USAGE);
            }
            Ok(Command::Sign { model_dir })
        }
        "keygen" => {
            let mut out_seed = None;
            let mut out_pub = None;
            let mut force = false;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--out-seed" => {
                        out_seed = Some(args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?);
                    }
                    "--out-pub" => {
                        out_pub = Some(args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?);
                    }
                    "--force" => force = true,
                    _ => bail!("Unknown arg: {arg}\n{USAGE}"),
                }
            }
            Ok(Command::Keygen {
                out_seed: out_seed.ok_or_else(|| anyhow!(USAGE))?,
                out_pub,
                force,
            })
        }
        _ => bail!(USAGE),
    }
}

fn sign(model_dir: &Path) -> Result<()> {
    let mut files = BTreeMap::new();
    for category in DiseaseCategory::ALL {
        let name = category.model_file_name();
        let path = model_dir.join(name);
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read {category} model at {path:?}"))?;
        files.insert(name.to_string(), sha256_hex(&bytes));
    }

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest = ModelManifest {
        version: MANIFEST_VERSION,
        created_at: chrono::Utc::now().timestamp(),
        files,
    };
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest")?;

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = model_dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes()).with_context(|| format!("Failed to write {sig_path:?}"))?;

    let pub_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());
    println!("Signed manifest: {manifest_path:?} ({} files)", manifest.files.len());
    println!("Wrote signature: {sig_path:?}");
    println!("Verifying key (base64)={pub_b64}");
    Ok(())
}

fn write_new(path: &Path, contents: &[u8], mode: u32, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Refusing to overwrite existing file {path:?}. Use --force.");
    }
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    opts.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .with_context(|| format!("Failed to open {path:?}"))?;
    file.write_all(contents)?;
    file.write_all(b"\n")?;
    Ok(())
}

fn keygen(out_seed: &Path, out_pub: Option<&Path>, force: bool) -> Result<()> {
    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);

    let verifying_key = SigningKey::from_bytes(&seed.0).verifying_key();
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));
    seed.zeroize();

    let pub_b64 = general_purpose::STANDARD.encode(verifying_key.as_bytes());

    write_new(out_seed, seed_b64.as_bytes(), 0o600, force)?;
    if let Some(pub_path) = out_pub {
        // Public key is non-secret; allow read access.
        write_new(pub_path, pub_b64.as_bytes(), 0o644, force)?;
    }

    // Print only non-secret material.
    println!("Wrote signing seed (base64) to {out_seed:?}");
    if let Some(pub_path) = out_pub {
        println!("Wrote public key (base64) to {pub_path:?}");
    }
    println!("Verifying key (base64)={pub_b64}");
    println!("Verifying key (hex)={}", to_hex(verifying_key.as_bytes()));
    Ok(())
}

fn main() -> Result<()> {
    match parse_args()? {
        Command::Sign { model_dir } => sign(&model_dir),
        Command::Keygen {
            out_seed,
            out_pub,
            force,
        } => keygen(&out_seed, out_pub.as_deref(), force),
    }
}
