pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod live;
pub mod models;
pub mod storage;
pub mod workflow;

pub use db::create_pool;
