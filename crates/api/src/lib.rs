//! HTTP API: configuration, routing, access control and error mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
