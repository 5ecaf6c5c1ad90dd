pub mod cli;
pub mod deploy;
pub mod stage;
pub mod upload;

pub use cli::{run, Cli};
