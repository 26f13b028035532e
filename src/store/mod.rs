pub mod gateway;
pub mod json_store;
pub mod memory;
pub mod schema;
