mod core;
mod model;
mod resolve;
mod schema;
mod token;

pub(crate) use self::core::{DuplicateHandler, Machine, Outcome, ParseState};
pub use model::ArgumentDescriptor;
pub(crate) use resolve::{Resolution, Resolver};
pub(crate) use schema::Schema;

#[cfg(test)]
pub(crate) use model::test;
