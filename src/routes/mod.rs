//! Route modules for the Scrawl server

pub mod access;
pub mod analytics;
pub mod cleanup;
pub mod health;
pub mod process;
