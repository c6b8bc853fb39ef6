// Library root: the query engine, exposed for the binary and integration tests.
// The binary entry point is src/main.rs.

pub mod bootstrap;
pub mod core;
pub mod profile;
pub mod sparql;
pub mod subjects;

pub use bootstrap::logger;
pub use core::{config, error};
