pub mod app;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod replay;
pub mod rollout;
pub mod sanitize;
