//! Subcommand implementations.

pub mod attack;
pub mod embed;
pub mod evaluate;
pub mod extract;
