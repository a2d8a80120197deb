pub mod loader;
pub mod store;

pub use loader::{load_taxonomy, parse_taxonomy, BUILTIN_TAXONOMY};
pub use store::TaxonomyStore;
