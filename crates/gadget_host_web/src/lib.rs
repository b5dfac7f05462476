//! Browser (`wasm32`) bindings for the gadget runtime.
//!
//! This crate wires [`gadget_runtime`] to the page: the player client global, the page load
//! event, DOM custom events, the installed controller object, and `postMessage` traffic.
//!
//! Off wasm every probe reports a loaded page without a host and every source attaches inertly,
//! so services built here run in preview mode under native tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Service and source factories for runtime wiring.
pub mod adapters;
#[cfg(target_arch = "wasm32")]
pub mod client;
pub mod frame;
mod interop;
pub mod probe;
pub mod sources;

pub use adapters::{browser_gadget_service, browser_gadget_service_with, browser_signal_sources};
#[cfg(target_arch = "wasm32")]
pub use client::JsGadgetClient;
pub use frame::WebFrameMessenger;
pub use probe::WebHostProbe;
pub use sources::{
    command_from_detail, command_from_parts, ControllerSource, DomEventSource, MessageSource,
};
