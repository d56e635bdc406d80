//! Lumina - an AI virtual try-on studio service
//!
//! This crate provides the core functionality for Lumina, including:
//! - Wardrobe catalog and scene data with model grounding context
//! - Gemini client for analysis, image generation, and chat
//! - Studio logic: request builders, response parsing, sessions,
//!   the stylist advisor, and inline reference markup
//! - HTTP server for UI integration

pub mod catalog;
pub mod cli;
pub mod config;
pub mod gemini;
pub mod imagery;
pub mod server;
pub mod studio;

pub use config::Config;
