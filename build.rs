use std::env::var;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn main() {
  let out_dir = var("OUT_DIR").unwrap();
  let path = Path::new(&out_dir).join("res_path.rs");

  println!("cargo:rerun-if-env-changed=ENGINE_RES_PATH");
  println!("cargo:rerun-if-changed=build.rs");

  let res_path = var("ENGINE_RES_PATH").unwrap_or_else(|_| {
    let manifest_dir = var("CARGO_MANIFEST_DIR").unwrap();
    Path::new(&manifest_dir).join("res").display().to_string()
  });

  let mut manifest = File::create(path).unwrap();

  writeln!(&mut manifest, "// resource root substituted for the reserved include prefix").unwrap();
  writeln!(&mut manifest, "pub const ENGINE_RES_PATH: &str = {:?};", res_path).unwrap();
}
