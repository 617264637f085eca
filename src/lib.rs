//! taskdesk — todo list + user account REST services with static file serving.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod static_files;
pub mod store;
pub mod todos;
pub mod users;
