pub mod application;
pub mod config;
pub mod domain;
pub mod eastern;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
