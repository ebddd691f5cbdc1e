pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod index;
pub mod middleware;
pub mod services;
pub mod state;
pub mod storage;
