use std::env;
use std::path::PathBuf;

fn main() {
    // IMPORTANT: Initialize the ESP-IDF build system
    embuild::espidf::sysenv::output();

    // Path to the secrets.toml file
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let secrets_path = PathBuf::from(&manifest_dir).join("secrets.toml");

    // Rerun the build script if secrets.toml changes
    println!("cargo:rerun-if-changed={}", secrets_path.display());

    // Check if secrets.toml exists
    if !secrets_path.exists() {
        panic!(
            "\n\n\
            ERROR: secrets.toml not found!\n\
            \n\
            Expected in: {}\n\
            \n\
            Create the file:\n\
            cp secrets.toml.example secrets.toml\n\
            ",
            secrets_path.display()
        );
    }
}
