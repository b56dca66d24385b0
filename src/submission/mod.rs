//! Everything between a validated step store and the persistence API: the validation
//! schema, the wire payload mapping and the repository boundary.

mod payload;
mod repository;
mod schema;

pub use payload::*;
pub use repository::*;
pub use schema::*;
