pub mod commands;
pub mod display;
pub mod k8s;

pub use commands::CliArgs;
