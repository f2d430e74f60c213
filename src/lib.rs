pub mod app;
pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod memorize;
pub mod paths;
pub mod scoring;
pub mod state;

#[cfg(test)]
pub mod testing;
