//! Typed player-host contracts and shared models used by the gadget runtime and browser adapters.
//!
//! This crate is the API-first boundary between a gadget and the player that embeds it. It
//! exposes the command/config wire models, the [`GadgetClient`] command/telemetry contract, the
//! [`FrameMessenger`] cross-window contract, and the notification channel primitives the runtime
//! publishes through. Concrete browser bindings live in `gadget_host_web`; resolution and event
//! bridging live in `gadget_runtime`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod channel;
pub mod client;
pub mod error;
pub mod frame;
pub mod model;
pub mod prefs;
pub mod time;

pub use channel::{Broadcast, ReplayChannel, Subscription};
pub use client::{ClientFuture, GadgetClient, MemoryGadgetClient, RecordedCall};
pub use error::{ClientError, ClientResult};
pub use frame::{FrameMessenger, MemoryFrameMessenger, NoopFrameMessenger, PostedFrameMessage};
pub use model::{Command, ConfigMessage, ConfigMessageKind, Device, DeviceLocation};
pub use prefs::GadgetPrefs;
pub use time::device_time_now_iso;
