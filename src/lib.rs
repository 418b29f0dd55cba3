pub mod cli;
pub mod composer;
pub mod config;
pub mod load_config;
pub mod registry;
pub mod resolver;

pub use cli::{run, Cli, Commands};
