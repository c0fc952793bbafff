// muncher-cli/src/lib.rs
//
// Library portion of the Muncher CLI application.
// Contains argument definitions, logging setup and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use commands::encode::{RunSummary, run_encode};
pub use error::{CliErrorContext, CliResult};
pub use logging::{init_logging, use_color};
