//! Oxplot builds SVG scenes and writes them as documents.
pub mod args;
pub mod commands;
pub mod config;
