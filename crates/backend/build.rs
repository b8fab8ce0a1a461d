//! Copies the workspace `config.toml` next to the backend executable.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

/// `target/<profile>`, found by walking up from OUT_DIR
/// (`target/<profile>/build/backend-<hash>/out`)
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").ok()?);
    let profile = env::var("PROFILE").ok()?;
    out_dir
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

fn main() {
    println!("cargo:rerun-if-changed=../../{}", CONFIG_FILE);

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let source = workspace_root.join(CONFIG_FILE);

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=Could not locate target profile directory; {} not copied", CONFIG_FILE);
        return;
    };

    if !source.exists() {
        println!(
            "cargo:warning={} not found at {:?}, the embedded default will be used",
            CONFIG_FILE, source
        );
        return;
    }

    let dest = target_dir.join(CONFIG_FILE);
    if let Err(e) = fs::copy(&source, &dest) {
        panic!("Failed to copy {} to {:?}: {}", CONFIG_FILE, dest, e);
    }
}
