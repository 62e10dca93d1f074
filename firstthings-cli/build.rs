use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct Manifest {
    package: Package,
}

#[derive(Deserialize)]
struct Package {
    metadata: Metadata,
}

#[derive(Deserialize)]
struct Metadata {
    firstthings: BuildInfo,
}

#[derive(Deserialize)]
struct BuildInfo {
    codename: String,
}

fn main() {
    let manifest = fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
    let manifest: Manifest = toml::from_str(&manifest).expect("Failed to parse Cargo.toml");

    // Exposed to the crate as env!("CODENAME")
    println!(
        "cargo:rustc-env=CODENAME={}",
        manifest.package.metadata.firstthings.codename
    );
    println!("cargo:rerun-if-changed=Cargo.toml");
}
