//! Books resource.
//!
//! CRUD over the `books` collection. A book optionally references its
//! author by id; nothing is checked against the `authors` collection on
//! write. Deleting a book never touches any author record unless the
//! `relations.link_both_sides` mode is enabled.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;
