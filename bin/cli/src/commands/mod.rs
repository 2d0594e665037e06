//! CLI subcommands.

mod inspect;
mod verify;

pub use inspect::InspectCommand;
pub use verify::VerifyCommand;
