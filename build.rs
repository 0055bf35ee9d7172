//! Build script for the playlist bot.
//!
//! Copies the `.env.example` configuration template into the user's local
//! data directory, next to where `config::load_env` looks for `.env`.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

/// Copies `.env.example` to `<data_local_dir>/playlistbot/.env.example`.
///
/// Nothing here can fail the build: a missing template or an unwritable
/// data directory (sandboxed builds, CI) only produces a cargo warning.
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
    out_dir.push("playlistbot");
    if let Err(e) = copy_template(&env_example_path, &out_dir) {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}

fn copy_template(template: &Path, out_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;
    let contents = fs::read_to_string(template)?;
    fs::write(out_dir.join(".env.example"), contents)
}
