//! Compiles `config/gestures.toml` into `$OUT_DIR/gesture_config.rs`, which
//! `src/config.rs` pulls in with `include!`.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const CONFIG: &str = "config/gestures.toml";
const GENERATED: &str = "gesture_config.rs";

fn cargo_dir(var: &str) -> PathBuf {
    env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| panic!("cargo did not set {var}"))
}

fn render(source: &Path) -> String {
    gesture_config_compiler::generate_from_path(source)
        .unwrap_or_else(|err| panic!("{}: {err}", source.display()))
}

fn main() {
    let source = cargo_dir("CARGO_MANIFEST_DIR").join(CONFIG);
    println!("cargo:rerun-if-changed={}", source.display());

    let target = cargo_dir("OUT_DIR").join(GENERATED);
    if let Err(err) = fs::write(&target, render(&source)) {
        panic!("cannot write tuning table to {}: {err}", target.display());
    }
}
