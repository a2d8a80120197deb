pub mod analyses;
pub mod captures;
pub mod health;
pub mod progress;
pub mod taxonomy;
