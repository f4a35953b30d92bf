//! Core translation client module

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod operation;
pub mod paging;
pub mod transport;
