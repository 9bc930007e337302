pub mod auth;
pub mod cli;
pub mod data;
pub mod entity;
pub mod error;
pub mod favorites;
pub mod server;
