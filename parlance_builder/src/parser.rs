mod assemble;
mod base;
mod command;
mod interface;
mod middleware;
mod printer;

pub(crate) use assemble::ClassValidator;
pub use assemble::ParsedArguments;
pub use base::*;
pub use command::{Command, CommandManager, CommandParser};
pub(crate) use middleware::Factory;
pub use middleware::{Dispatch, Parser};
pub use printer::{ArgumentUsage, CommandUsage, Usage};
