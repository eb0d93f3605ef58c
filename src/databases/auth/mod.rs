pub mod pending;
pub mod pendingdb;
