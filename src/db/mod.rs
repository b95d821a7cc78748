//! Database models and queries

pub mod activity;
pub mod init;
pub mod recipes;

pub use init::*;
pub use recipes::Recipe;
