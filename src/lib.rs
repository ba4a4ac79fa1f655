pub mod auth;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod signing;

pub use db::create_pool;
