// maskmail-cli/src/commands/mod.rs
pub mod masked;
pub mod setup;
