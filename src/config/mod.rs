mod configuration;
mod store_options;

pub use configuration::{Configuration, Coordinator, keys};
pub use store_options::StoreOptions;
