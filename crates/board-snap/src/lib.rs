pub mod clients;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod files;
pub mod paste;
pub mod render;
pub mod session;
