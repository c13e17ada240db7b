//! certpin CLI - generate Rust certificate bundles from live endpoints

pub mod generate;

pub use generate::{run_generate, GenerateRequest};
