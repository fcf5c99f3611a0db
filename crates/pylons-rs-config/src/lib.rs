//! # pylons-rs-config
//!
//! The configuration layer of pylons-rs. A [`Configurator`] registers routes,
//! handlers, REST resources, helpers and cache regions on a [`Registry`], and
//! makes an [`Application`] that dispatches requests to handler actions.
//!
//! ## Modules
//!
//! - [`configurator`] - The registration API and handler-to-view expansion
//! - [`handler`] - Handler specifications and declarative manifests
//! - [`predicates`] - [`ActionPredicate`]
//! - [`views`] - View registrations
//! - [`rest`] - REST route table and bound REST handlers
//! - [`cache`] - Cache regions read from settings
//! - [`globals`] - Helpers and renderer globals
//! - [`registry`] - The registry and the current-registry stack
//! - [`resolver`] - Dotted-name resolution
//! - [`app`] - Request dispatch

pub mod app;
pub mod cache;
pub mod configurator;
pub mod globals;
pub mod handler;
pub mod predicates;
pub mod registry;
pub mod resolver;
pub mod rest;
pub mod views;

pub use app::Application;
pub use cache::CacheRegion;
pub use configurator::{Configurator, HandlerOptions};
pub use globals::{globals_factory, Helpers, RendererGlobals, RendererSystem};
pub use handler::{AutoExpose, ExposeOptions, HandlerManifest, HandlerSpec};
pub use predicates::ActionPredicate;
pub use registry::{get_current_registry, Registry};
pub use resolver::{NameResolver, Resolvable, StaticResolver};
pub use rest::{RestHandler, RestHandlerFactory};
pub use views::ViewRegistration;
