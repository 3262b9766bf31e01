pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod generator;
pub mod server;
pub mod service;
pub mod strength;
pub mod vault;
