//! Build script for the snipkit desktop app.
//!
//! The Tauri codegen step only runs when the `desktop` feature is on.
//! The core library (selection, annotation, history) has no build-time
//! requirements, so a plain `cargo test` skips this entirely.

fn main() {
    println!("cargo:rerun-if-changed=tauri.conf.json");

    #[cfg(feature = "desktop")]
    tauri_build::build();
}
