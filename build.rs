//! Build script for cratedigger.
//!
//! Copies `.env.example` from the crate root into the user's local data
//! directory, next to the `.env` that `config::load_env` reads at startup:
//! - Linux: `~/.local/share/cratedigger/.env.example`
//! - macOS: `~/Library/Application Support/cratedigger/.env.example`
//! - Windows: `%LOCALAPPDATA%/cratedigger/.env.example`
//!
//! Nothing here is fatal: a missing template or an unwritable data directory
//! (sandboxed builds) only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return Ok(());
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("cratedigger");
    let copied = fs::create_dir_all(&out_dir)
        .and_then(|()| fs::copy(&env_example_path, out_dir.join(".env.example")));
    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
