//! # pylons-rs
//!
//! Handler-style routing and configuration for Rust web applications.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `pylons-rs` to get everything, or on individual crates
//! for finer-grained control.
//!
//! ```
//! use pylons_rs::config::{Configurator, HandlerOptions, HandlerSpec};
//! use pylons_rs::http::{HttpRequest, HttpResponse};
//!
//! let config = Configurator::new();
//! let pages = HandlerSpec::new("pages")
//!     .action("index", |_| HttpResponse::ok("home"))
//!     .action("about", |_| HttpResponse::ok("about us"));
//! config
//!     .add_handler("pages", Some("/pages/{action}"), pages, HandlerOptions::new())
//!     .unwrap();
//!
//! let app = config.make_app();
//! let response = app.handle(HttpRequest::builder().path("/pages/about").build());
//! assert_eq!(response.body(), "about us");
//! ```

/// Error type, settings, settings loader, and logging.
pub use pylons_rs_core as core;

/// Requests, responses, routes, and route predicates.
#[cfg(feature = "http")]
pub use pylons_rs_http as http;

/// Configurator, registry, handlers, REST resources, and dispatch.
#[cfg(feature = "config")]
pub use pylons_rs_config as config;

/// Action controllers with before/after hooks.
#[cfg(feature = "controllers")]
pub use pylons_rs_controllers as controllers;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use pylons_rs_cli as cli;

pub use pylons_rs_core::{PylonsError, PylonsResult, Settings};

// Third-party crates used in pylons-rs signatures.
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;
