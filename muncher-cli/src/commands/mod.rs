//! Command implementations for the CLI.

/// The encode queue: probe, prompt, encode and report each input.
pub mod encode;
