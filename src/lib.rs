pub mod commands;
pub mod debugger;
pub mod keys;
pub mod records;
pub mod store;

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
