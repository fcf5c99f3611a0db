//! # pylons-rs-controllers
//!
//! Action controllers. A [`Controller`] names its actions through a lookup
//! table of method pointers and may hook in before and after every action.
//! A [`ControllerApp`] creates a fresh controller per request and dispatches
//! on the request's `action` match-dict value.
//!
//! ## Modules
//!
//! - [`controller`] - The [`Controller`] trait and [`ControllerApp`]
//! - [`result`] - [`ActionResult`], what actions return

pub mod controller;
pub mod result;

pub use controller::{Action, Controller, ControllerApp, DEFAULT_ACTION};
pub use result::ActionResult;
