//! Authors resource.
//!
//! CRUD over the `authors` collection. Reading a single author expands its
//! `books` references into full book records; deleting an author first
//! de-references every book that points at it. The `books` list itself is
//! caller-maintained: creating a book does not append it to its author
//! (see `relations.link_both_sides` for the stricter mode).

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;
