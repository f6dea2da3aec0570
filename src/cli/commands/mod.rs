//! One module per subcommand, each with clap args and an `execute` entry point

pub mod evaluate;
pub mod query;
pub mod train;
