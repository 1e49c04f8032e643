//! Shelter Guru - REST backend for home listings and bookings
//!
//! Users, homes and bookings live in a document store; routes that touch a
//! caller's own data sit behind bearer-token authentication and an
//! ownership check.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod mail;
pub mod store;

pub use config::Config;
pub use error::Error;
