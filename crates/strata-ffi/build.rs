use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Regenerate `include/strata.h` from the exported items.
fn generate_header(crate_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))?;
    let header = crate_dir.join("include").join("strata.h");
    if let Some(dir) = header.parent() {
        std::fs::create_dir_all(dir)?;
    }
    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()?
        .write_to_file(&header);
    Ok(header)
}

fn main() {
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    // The library itself does not depend on the header, so a cbindgen
    // failure is reported without failing the build.
    if let Err(e) = generate_header(&crate_dir) {
        println!("cargo:warning=strata.h not regenerated: {e}");
    }
}
