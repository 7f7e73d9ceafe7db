fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile product service proto
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/product.proto"], &["proto/"])?;

    // Compile identity (user) service proto
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/user.proto"], &["proto/"])?;

    Ok(())
}
