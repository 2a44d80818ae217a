//! Placeholder sources for outputs the plugin did not generate
//!
//! Some plugins only write a file when the proto source has relevant
//! definitions (services for grpc, for example). The build still expects
//! every declared output, so missing ones get a stub the Go toolchain skips.

/// Get the placeholder source written for a missing Go output
pub fn get_placeholder_source() -> &'static str {
    "// +build ignore\n\npackage ignore"
}

/// Get the placeholder source as bytes, ready to write
pub fn get_placeholder_bytes() -> &'static [u8] {
    get_placeholder_source().as_bytes()
}
