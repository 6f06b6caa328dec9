//! Configuration module
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every setting has a default, and command-line flags
//! override what the file sets.
//!
//! # Example
//!
//! ```no_run
//! use crawl4xx::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Report goes to: {}", config.output);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, RendererKind, DEFAULT_OUTPUT, DEFAULT_USER_AGENT};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_base_url};
