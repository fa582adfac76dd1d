//! CLI subcommand implementations.

pub mod area;
pub mod department;
pub mod employee;
pub mod init;
pub mod record;
pub mod resolve;
pub mod roster;
pub mod status;
pub mod util;
pub mod vacation;
