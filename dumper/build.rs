//! Generates `gb_dumper.h` for the C firmware shell when the `ffi` feature
//! is enabled. The header lands in `OUT_DIR`.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");
    if env::var_os("CARGO_FEATURE_FFI").is_none() {
        return;
    }

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
    let out_dir = match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => return,
    };

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("GB_DUMPER_H".into()),
        ..Default::default()
    };
    match cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("gb_dumper.h"));
        }
        Err(err) => println!("cargo:warning=cbindgen failed: {err}"),
    }
}
