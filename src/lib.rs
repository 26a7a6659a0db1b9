// Main library entry point for tracewrap.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
