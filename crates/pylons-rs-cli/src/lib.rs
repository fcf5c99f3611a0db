//! # pylons-rs-cli
//!
//! Management commands for pylons-rs applications.
//!
//! Commands work on an application described by a declarative config file
//! ([`AppConfig`]): its settings file, handler manifests, routes, REST
//! resources, and helpers. Built-in commands:
//!
//! - `routes` - list routes and the views registered for each
//! - `check` - replay the config and report problems
//! - `url` - generate the URL of a named route
//!
//! ## Quick Start
//!
//! ```rust
//! use pylons_rs_cli::command::CommandRegistry;
//! use pylons_rs_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! assert_eq!(registry.list_commands(), vec!["check", "routes", "url"]);
//! ```

// - doc_markdown: backtick requirements for documentation items are too strict
// - unused_async: command handlers keep consistent async signatures
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]

pub mod app_config;
pub mod command;
pub mod commands;

pub use app_config::{AppConfig, RestConfig, RouteConfig};
pub use command::{CommandRegistry, ManagementCommand};
