//! Command implementations, one module per subcommand.

pub mod completions;
pub mod extract;
pub mod validate;
