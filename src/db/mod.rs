pub mod analyses;
pub mod captures;
pub mod connection;
pub mod processing;
pub mod progress;
pub mod schema;

pub use connection::Database;
