//! Subcommands of the `learnlab` binary

pub mod banana;
pub mod music;
pub mod robo;
