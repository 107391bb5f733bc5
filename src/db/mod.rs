pub mod dbclient;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod schema;
pub mod store;
