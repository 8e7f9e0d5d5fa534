//! Infrastructure layer: assignment stores backing the access core.

pub mod in_memory;
pub mod postgres;
pub mod seed;

pub use in_memory::InMemoryAssignmentStore;
pub use postgres::PgAssignmentStore;
