//! Command handlers for the CLI.

mod analyze;
mod completions;
mod extract;

pub use analyze::handle_analyze;
pub use completions::handle_completions;
pub use extract::handle_extract;
