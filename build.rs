use std::io::Result;

fn main() -> Result<()> {
    tonic_build::configure()
        .build_server(false)
        .compile_protos(&["proto/auth.proto"], &["proto"])?;

    Ok(())
}
