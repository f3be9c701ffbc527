pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod navigation;
pub mod remote;
pub mod session;
pub mod state;
pub mod testing;
pub mod types;
