//! Build script for the spotiply CLI.
//!
//! Copies the `.env.example` template into the local data directory, where
//! `spotiply` looks for its `.env` file:
//! - Linux: `~/.local/share/spotiply/.env.example`
//! - macOS: `~/Library/Application Support/spotiply/.env.example`
//! - Windows: `%LOCALAPPDATA%/spotiply/.env.example`
//!
//! Nothing here may break a build: every failure is reported as a cargo
//! warning.

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=.env.example");

    if let Err(e) = copy_env_example() {
        println!("cargo:warning=could not install .env.example: {e}");
    }
}

fn copy_env_example() -> Result<(), Box<dyn std::error::Error>> {
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
    out_dir.push("spotiply");
    fs::create_dir_all(&out_dir)?;

    let contents = fs::read_to_string(&env_example_path)?;
    fs::write(out_dir.join(".env.example"), contents)?;

    Ok(())
}
