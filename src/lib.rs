pub mod client;
pub mod config;
pub mod databases;
pub mod otp;
pub mod payloads;
pub mod routes;
pub mod services;
pub mod store;
