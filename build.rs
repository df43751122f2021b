fn main() {
    // Rebuild when the build script changes
    println!("cargo:rerun-if-changed=build.rs");

    // Embed package name, version and build time for the ping route
    built::write_built_file()
        .expect("Failed to acquire build-time information");
}
