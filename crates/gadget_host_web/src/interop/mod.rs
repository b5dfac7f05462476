//! Browser interop for the player host surfaces, with a non-wasm shim.
//!
//! Every function here has the same signature on both targets so adapters above stay
//! target-neutral. JS values are converted to `serde_json::Value` at this edge.

use std::rc::Rc;

use gadget_host::{GadgetClient, Subscription};
use serde_json::Value;

/// Callbacks installed on the global controller object.
pub struct ControllerHandlers {
    pub on_command: Box<dyn Fn(Value, Value)>,
    pub on_start: Box<dyn Fn()>,
    pub on_stop: Box<dyn Fn()>,
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::cell::RefCell;

    use super::*;
    use js_sys::{Object, Reflect};
    use wasm_bindgen::{closure::Closure, JsCast, JsValue};

    use crate::client::JsGadgetClient;

    pub fn js_to_json(value: &JsValue) -> Value {
        if value.is_undefined() || value.is_null() {
            return Value::Null;
        }
        serde_wasm_bindgen::from_value(value.clone()).unwrap_or(Value::Null)
    }

    fn is_present(value: &JsValue) -> bool {
        !value.is_undefined() && !value.is_null()
    }

    pub fn locate_client(global: &str) -> Option<Rc<dyn GadgetClient>> {
        let window = web_sys::window()?;
        let host = Reflect::get(&window, &JsValue::from_str(global)).ok()?;
        if !is_present(&host) {
            return None;
        }
        Some(Rc::new(JsGadgetClient::new(host)))
    }

    pub fn document_loaded() -> bool {
        web_sys::window()
            .and_then(|window| window.document())
            .map(|document| document.ready_state() == "complete")
            .unwrap_or(true)
    }

    /// Dropping `callback` unrun (no window, failed registration) is the caller's fallback signal,
    /// so the listener stays Rust-owned until it fires.
    pub fn on_window_load_once(callback: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let slot: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let release = slot.clone();
        let listener = Closure::once(move || {
            callback();
            let fired = release.borrow_mut().take();
            drop(fired);
        });
        let options = web_sys::AddEventListenerOptions::new();
        options.set_once(true);
        let registered = window.add_event_listener_with_callback_and_add_event_listener_options(
            "load",
            listener.as_ref().unchecked_ref(),
            &options,
        );
        if registered.is_ok() {
            *slot.borrow_mut() = Some(listener);
        }
    }

    pub fn has_opener() -> bool {
        web_sys::window()
            .and_then(|window| window.opener().ok())
            .map(|opener| is_present(&opener))
            .unwrap_or(false)
    }

    pub fn post_to_opener_or_parent(message: &str) -> Result<(), String> {
        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let message = JsValue::from_str(message);
        let opener = window
            .opener()
            .map_err(|err| format!("opener lookup failed: {err:?}"))?;
        if is_present(&opener) {
            return opener
                .unchecked_into::<web_sys::Window>()
                .post_message(&message, "*")
                .map_err(|err| format!("opener postMessage failed: {err:?}"));
        }
        window
            .parent()
            .map_err(|err| format!("parent lookup failed: {err:?}"))?
            .ok_or_else(|| "parent window unavailable".to_string())?
            .post_message(&message, "*")
            .map_err(|err| format!("parent postMessage failed: {err:?}"))
    }

    pub fn listen_document_event(event_name: &str, handler: Box<dyn Fn(Value)>) -> Subscription {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return Subscription::empty();
        };
        let listener = Closure::<dyn Fn(web_sys::Event)>::wrap(Box::new(move |event| {
            let detail = event
                .dyn_ref::<web_sys::CustomEvent>()
                .map(|custom| js_to_json(&custom.detail()))
                .unwrap_or(Value::Null);
            handler(detail);
        }));
        if document
            .add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())
            .is_err()
        {
            return Subscription::empty();
        }
        let event_name = event_name.to_string();
        Subscription::new(move || {
            let _ = document
                .remove_event_listener_with_callback(&event_name, listener.as_ref().unchecked_ref());
        })
    }

    pub fn listen_window_messages(handler: Box<dyn Fn(Option<String>)>) -> Subscription {
        let Some(window) = web_sys::window() else {
            return Subscription::empty();
        };
        let listener = Closure::<dyn Fn(web_sys::MessageEvent)>::wrap(Box::new(move |event| {
            handler(event.data().as_string());
        }));
        if window
            .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
            .is_err()
        {
            return Subscription::empty();
        }
        Subscription::new(move || {
            let _ = window
                .remove_event_listener_with_callback("message", listener.as_ref().unchecked_ref());
        })
    }

    pub fn install_controller(
        namespace: &str,
        property: &str,
        handlers: ControllerHandlers,
    ) -> Subscription {
        let Some(window) = web_sys::window() else {
            return Subscription::empty();
        };
        let namespace_key = JsValue::from_str(namespace);
        let container: Object = match Reflect::get(&window, &namespace_key) {
            Ok(existing) if existing.is_object() => existing.unchecked_into(),
            _ => {
                let created = Object::new();
                if Reflect::set(&window, &namespace_key, &created).is_err() {
                    return Subscription::empty();
                }
                created
            }
        };

        let ControllerHandlers {
            on_command,
            on_start,
            on_stop,
        } = handlers;
        let on_command = Closure::<dyn Fn(JsValue, JsValue)>::wrap(Box::new(move |name, arg| {
            on_command(js_to_json(&name), js_to_json(&arg));
        }));
        let on_start = Closure::<dyn Fn()>::wrap(on_start);
        let on_stop = Closure::<dyn Fn()>::wrap(on_stop);

        let controller = Object::new();
        let wired = Reflect::set(&controller, &"onCommand".into(), on_command.as_ref())
            .and_then(|_| Reflect::set(&controller, &"onStart".into(), on_start.as_ref()))
            .and_then(|_| Reflect::set(&controller, &"onStop".into(), on_stop.as_ref()))
            .and_then(|_| Reflect::set(&container, &JsValue::from_str(property), &controller));
        if wired.is_err() {
            return Subscription::empty();
        }

        let property_key = JsValue::from_str(property);
        Subscription::new(move || {
            let still_ours = Reflect::get(&container, &property_key)
                .map(|current| Object::is(&current, &controller))
                .unwrap_or(false);
            if still_ours {
                let _ = Reflect::delete_property(&container, &property_key);
            }
            drop((on_command, on_start, on_stop));
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;

#[cfg(target_arch = "wasm32")]
pub use imp::*;
#[cfg(not(target_arch = "wasm32"))]
pub use non_wasm::*;
