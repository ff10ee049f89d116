//! Core client module

pub mod client;
pub mod config;
pub mod decoder;
pub mod endpoints;
pub mod errors;
pub mod models;
