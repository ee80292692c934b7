use std::env;
use std::path::PathBuf;

/// Set to a directory to also copy the generated header there.
const HEADER_DIR_VAR: &str = "CONTACT_GRAPH_HEADER_DIR";

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-env-changed={HEADER_DIR_VAR}");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("set by cargo"));

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CONTACT_GRAPH_H")
        .generate();
    let bindings = match bindings {
        Ok(bindings) => bindings,
        Err(err) => {
            println!("cargo:warning=skipping C header generation: {err}");
            return;
        }
    };

    bindings.write_to_file(out_dir.join("contact_graph.h"));

    if let Some(dir) = env::var_os(HEADER_DIR_VAR) {
        let dir = PathBuf::from(dir);
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                bindings.write_to_file(dir.join("contact_graph.h"));
            }
            Err(err) => println!("cargo:warning=cannot create {}: {err}", dir.display()),
        }
    }
}
