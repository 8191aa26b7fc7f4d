pub mod classifier;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod mysql;
pub mod service;
pub mod store;
