pub mod accounts;
pub mod auth;
pub mod bridge;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod seed;
pub mod store;
pub mod templates_structs;
