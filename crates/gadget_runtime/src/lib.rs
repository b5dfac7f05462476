//! Gadget-side runtime for talking to an embedding player.
//!
//! The runtime owns two independent pieces, composed by [`GadgetService`]:
//!
//! - [`ClientResolver`] binds the player client (or the [`NoopGadgetClient`] fallback) exactly
//!   once per page, tolerating the race between page load and host-script injection.
//! - [`EventBridge`] fans DOM events, controller calls, and `postMessage` traffic into the
//!   `ready`/`start`/`stop`/`command`/`config`/`raw_message` channels and implements the
//!   popup-to-opener config relay.
//!
//! Browser bindings for probes and sources live in `gadget_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod bridge;
pub mod config;
pub mod fallback;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod zone;

pub use bridge::{BridgeChannels, BridgeInlet, EventBridge, HostSignal, SignalSource};
pub use config::BridgeConfig;
pub use fallback::{NoopGadgetClient, SDK_VERSION};
pub use provider::{
    provide_gadget_service, ready_signal, use_gadget_service, GadgetProvider,
    GadgetServiceFactory,
};
pub use resolver::{ClientBinding, ClientResolver, HostProbe, SharedBinding};
pub use service::GadgetService;
pub use zone::{ExecutionZone, ImmediateZone, LeptosZone};
