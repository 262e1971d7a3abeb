fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure().compile(&["proto/provider.proto"], &["proto"])?;
    println!("cargo:rerun-if-changed=proto/provider.proto");
    Ok(())
}
