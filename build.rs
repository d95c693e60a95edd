use std::env;
use std::path::{Path, PathBuf};

fn main() {
    // Tell cargo to rerun if these change
    println!("cargo:rerun-if-changed=src/c_api/");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping C header");
            return;
        }
    };

    // The header is a convenience for C consumers; a failure here must not
    // break Rust builds.
    if let Err(message) = generate_header(&crate_dir) {
        println!("cargo:warning=C header not generated: {}", message);
    }
}

fn generate_header(crate_dir: &Path) -> Result<(), String> {
    let include_dir = crate_dir.join("include").join("geoblob");
    std::fs::create_dir_all(&include_dir)
        .map_err(|e| format!("cannot create {}: {}", include_dir.display(), e))?;

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))
        .map_err(|e| format!("cannot read cbindgen.toml: {}", e))?;

    let bindings = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
        .map_err(|e| format!("cbindgen failed: {}", e))?;

    bindings.write_to_file(include_dir.join("geoblob.h"));
    Ok(())
}
