use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() -> std::io::Result<()> {
    // The driver and bus transport are written once in src/async.rs, the blocking flavour is
    // generated from it by dropping the async keywords
    println!("cargo:rerun-if-changed=src/async.rs");
    if env::var_os("CARGO_FEATURE_SYNC").is_none() {
        return Ok(());
    }

    let source = std::fs::read_to_string("src/async.rs")?;

    let blocking = source
        .replace("embedded_hal_async", "embedded_hal")
        .replace("async", "")
        .replace(".await", "");

    let mut out_path = PathBuf::from(env::var("OUT_DIR").expect("cargo always sets OUT_DIR"));
    out_path.push("blocking.rs");

    File::create(out_path)?.write_all(blocking.as_bytes())?;

    Ok(())
}
