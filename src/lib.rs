pub mod config;
pub mod errors;
pub mod fragments;
pub mod resolution;
pub mod resources;
pub mod types;
