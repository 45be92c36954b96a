//! This module aggregates various utility submodules used throughout the application.

/// Environment-driven bot configuration.
pub mod config;
/// Utilities for interacting with an Ollama client/server.
pub mod ollama_client;
