// Embeds every `.md` file under `messages/` into the binary.
//
// Writes `$OUT_DIR/bundled_messages.rs`, a slice of (relative path, contents)
// pairs built from `include_str!`, sorted by path.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn collect(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect(root, &path, out)?;
            continue;
        }
        let is_message = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".md"));
        if !is_message {
            continue;
        }
        let rel = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push((rel, path));
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let root = manifest_dir.join("messages");
    println!("cargo:rerun-if-changed={}", root.display());

    let mut entries = Vec::new();
    if root.is_dir() {
        collect(&root, &root, &mut entries)?;
    }
    entries.sort();

    let mut generated = String::from("&[\n");
    for (rel, path) in &entries {
        println!("cargo:rerun-if-changed={}", path.display());
        generated.push_str(&format!(
            "    ({rel:?}, include_str!({:?})),\n",
            path.display().to_string()
        ));
    }
    generated.push_str("]\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    fs::write(out_dir.join("bundled_messages.rs"), generated)
}
