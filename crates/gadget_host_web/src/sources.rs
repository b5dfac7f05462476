//! Browser [`SignalSource`]s for the three host delivery mechanisms.
//!
//! DOM custom events and controller calls carry the same command shape in different wrappers;
//! both are normalized here so the bridge sees identical [`Command`] values.

use gadget_host::{Command, Subscription};
use gadget_runtime::{BridgeConfig, BridgeInlet, HostSignal, SignalSource};
use serde_json::Value;

use crate::interop::{self, ControllerHandlers};

/// Builds a command from controller-call arguments.
///
/// String args pass through untouched, a missing arg becomes empty, and any other value is
/// carried as its compact JSON text.
pub fn command_from_parts(name: &Value, arg: &Value) -> Command {
    let name = match name {
        Value::String(name) => name.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let arg = match arg {
        Value::String(arg) => arg.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Command { name, arg }
}

/// Builds a command from a `<ns>.Command` event detail (`{name, arg}`).
pub fn command_from_detail(detail: &Value) -> Command {
    command_from_parts(
        detail.get("name").unwrap_or(&Value::Null),
        detail.get("arg").unwrap_or(&Value::Null),
    )
}

fn combine(mut parts: Vec<Subscription>) -> Subscription {
    Subscription::new(move || {
        for part in parts.iter_mut() {
            part.unsubscribe();
        }
    })
}

#[derive(Debug, Clone, Copy, Default)]
/// Listens for `<ns>.Start`, `<ns>.Stop`, and `<ns>.Command` on the document.
pub struct DomEventSource;

impl SignalSource for DomEventSource {
    fn attach(&self, config: &BridgeConfig, inlet: BridgeInlet) -> Subscription {
        let start = inlet.clone();
        let stop = inlet.clone();
        combine(vec![
            interop::listen_document_event(
                &config.start_event(),
                Box::new(move |_| start.signal(HostSignal::Start)),
            ),
            interop::listen_document_event(
                &config.stop_event(),
                Box::new(move |_| stop.signal(HostSignal::Stop)),
            ),
            interop::listen_document_event(
                &config.command_event(),
                Box::new(move |detail| {
                    inlet.signal(HostSignal::Command(command_from_detail(&detail)))
                }),
            ),
        ])
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Installs `window.<ns>.<controller>` with `onCommand`, `onStart`, and `onStop`.
///
/// Detaching removes the controller if it is still the installed one.
pub struct ControllerSource;

impl SignalSource for ControllerSource {
    fn attach(&self, config: &BridgeConfig, inlet: BridgeInlet) -> Subscription {
        let start = inlet.clone();
        let stop = inlet.clone();
        interop::install_controller(
            &config.namespace,
            &config.controller_property,
            ControllerHandlers {
                on_command: Box::new(move |name, arg| {
                    inlet.signal(HostSignal::Command(command_from_parts(&name, &arg)))
                }),
                on_start: Box::new(move || start.signal(HostSignal::Start)),
                on_stop: Box::new(move || stop.signal(HostSignal::Stop)),
            },
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Forwards string `message` events on `window`; other payloads are dropped.
pub struct MessageSource;

impl SignalSource for MessageSource {
    fn attach(&self, _config: &BridgeConfig, inlet: BridgeInlet) -> Subscription {
        interop::listen_window_messages(Box::new(move |data| {
            if let Some(data) = data {
                inlet.message(&data);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_and_controller_args_normalize_identically() {
        let detail = json!({ "name": "changeSlide", "arg": "{\"index\":2}" });
        assert_eq!(
            command_from_detail(&detail),
            command_from_parts(&json!("changeSlide"), &json!("{\"index\":2}"))
        );
        assert_eq!(
            command_from_detail(&detail),
            Command::new("changeSlide", r#"{"index":2}"#)
        );
    }

    #[test]
    fn missing_or_structured_args_are_stringified() {
        assert_eq!(
            command_from_detail(&json!({ "name": "stop" })),
            Command::new("stop", "")
        );
        assert_eq!(
            command_from_parts(&json!("seek"), &json!({ "ms": 500 })),
            Command::new("seek", r#"{"ms":500}"#)
        );
        assert_eq!(
            command_from_parts(&json!("volume"), &json!(7)),
            Command::new("volume", "7")
        );
        assert_eq!(command_from_detail(&Value::Null), Command::new("", ""));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_sources_attach_inertly() {
        let config = BridgeConfig::default();
        let bridge = gadget_runtime::EventBridge::new(
            &config,
            std::rc::Rc::new(gadget_runtime::ImmediateZone),
            std::rc::Rc::new(gadget_host::NoopFrameMessenger),
            &[],
        );
        let mut subscription = DomEventSource.attach(&config, bridge.inlet());
        subscription.unsubscribe();
        assert!(subscription.is_closed());
        assert!(ControllerSource
            .attach(&config, bridge.inlet())
            .is_closed());
    }
}
