//! Player command/telemetry contract and an in-memory implementation.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ClientError, ClientResult, Device};

/// Object-safe boxed future used by [`GadgetClient`] query methods.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Command and telemetry surface exposed by the player host.
///
/// Queries are asynchronous and resolve to `None` when the host has no value. Commands are
/// synchronous fire-and-forget calls; an `Err` only means the host's own method threw.
pub trait GadgetClient {
    /// Invokes the host's generic callback hook.
    fn callback(&self, args: &[Value]) -> ClientResult<()>;

    /// Returns the device-local time, optionally converting the given ISO-8601 instant.
    fn get_device_time<'a>(
        &'a self,
        date: Option<&'a str>,
    ) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Returns the device time-zone display name.
    fn get_device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Returns the device time-zone identifier.
    fn get_device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Returns the device time-zone offset in minutes.
    fn get_device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>>;

    /// Returns the device language code.
    fn get_language_code<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Returns the device registration key.
    fn get_device_key<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Sends a command to the local player.
    fn send_command(&self, name: &str, arg: &str) -> ClientResult<()>;

    /// Sends a command to other players identified by their device keys.
    fn send_remote_command(&self, device_keys: &[String], name: &str, arg: &str)
        -> ClientResult<()>;

    /// Records an analytics event.
    fn track(&self, event_name: &str, properties: Option<&Value>) -> ClientResult<()>;

    /// Starts a timer for an analytics event.
    fn time_event(&self, event_name: &str) -> ClientResult<()>;

    /// Starts a new analytics session, optionally with an explicit identifier.
    fn new_event_session(&self, id: Option<&str>) -> ClientResult<()>;

    /// Returns the root URL of player-side resources.
    fn get_revel_root<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Returns the player's command map.
    fn get_command_map<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Value>>>;

    /// Signals that the gadget finished its presentation.
    fn finish(&self) -> ClientResult<()>;

    /// Returns the device description.
    fn get_device<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Device>>>;

    /// Returns the gadget width in pixels.
    fn get_width<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>>;

    /// Returns the gadget height in pixels.
    fn get_height<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>>;

    /// Returns the scheduled duration in milliseconds.
    fn get_duration<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>>;

    /// Returns the host SDK version.
    fn get_sdk_version<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>>;

    /// Applies configuration edits.
    fn apply_config(&self, prefs: &Map<String, Value>) -> ClientResult<()>;
}

/// One call observed by a [`MemoryGadgetClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Host method name in wire form (`sendCommand`, `getWidth`, ...).
    pub method: String,
    /// Arguments in call order.
    pub args: Vec<Value>,
}

#[derive(Debug, Default)]
struct MemoryClientState {
    values: HashMap<String, Value>,
    failures: HashMap<String, String>,
    calls: Vec<RecordedCall>,
}

/// In-memory client that answers queries from configured values and records every call.
///
/// Unconfigured queries resolve to `None`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryGadgetClient {
    state: Rc<RefCell<MemoryClientState>>,
}

impl MemoryGadgetClient {
    /// Creates an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the value returned by query `method` (wire name, e.g. `getDeviceKey`).
    pub fn with_value(self, method: &str, value: Value) -> Self {
        self.state
            .borrow_mut()
            .values
            .insert(method.to_string(), value);
        self
    }

    /// Makes `method` fail with a [`ClientError::HostCall`] carrying `message`.
    pub fn failing(self, method: &str, message: &str) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert(method.to_string(), message.to_string());
        self
    }

    /// Returns every recorded call in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    /// Returns the recorded calls for one method.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    fn record(&self, method: &str, args: Vec<Value>) -> ClientResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            method: method.to_string(),
            args,
        });
        match state.failures.get(method) {
            Some(message) => Err(ClientError::host_call(method, message.clone())),
            None => Ok(()),
        }
    }

    fn query<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> ClientResult<Option<T>> {
        self.record(method, args)?;
        let Some(value) = self.state.borrow().values.get(method).cloned() else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| ClientError::Decode {
                method: method.to_string(),
                message: err.to_string(),
            })
    }

    fn query_future<'a, T: DeserializeOwned + 'a>(
        &'a self,
        method: &'static str,
    ) -> ClientFuture<'a, ClientResult<Option<T>>> {
        Box::pin(async move { self.query(method, Vec::new()) })
    }
}

impl GadgetClient for MemoryGadgetClient {
    fn callback(&self, args: &[Value]) -> ClientResult<()> {
        self.record("callback", args.to_vec())
    }

    fn get_device_time<'a>(
        &'a self,
        date: Option<&'a str>,
    ) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(async move {
            let args = date.map(|d| vec![Value::from(d)]).unwrap_or_default();
            self.query("getDeviceTime", args)
        })
    }

    fn get_device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        self.query_future("getDeviceTimeZoneName")
    }

    fn get_device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        self.query_future("getDeviceTimeZoneID")
    }

    fn get_device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        self.query_future("getDeviceTimeZoneOffset")
    }

    fn get_language_code<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        self.query_future("getLanguageCode")
    }

    fn get_device_key<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        self.query_future("getDeviceKey")
    }

    fn send_command(&self, name: &str, arg: &str) -> ClientResult<()> {
        self.record("sendCommand", vec![name.into(), arg.into()])
    }

    fn send_remote_command(
        &self,
        device_keys: &[String],
        name: &str,
        arg: &str,
    ) -> ClientResult<()> {
        self.record(
            "sendRemoteCommand",
            vec![
                Value::from(device_keys.to_vec()),
                name.into(),
                arg.into(),
            ],
        )
    }

    fn track(&self, event_name: &str, properties: Option<&Value>) -> ClientResult<()> {
        let mut args = vec![Value::from(event_name)];
        args.extend(properties.cloned());
        self.record("track", args)
    }

    fn time_event(&self, event_name: &str) -> ClientResult<()> {
        self.record("timeEvent", vec![event_name.into()])
    }

    fn new_event_session(&self, id: Option<&str>) -> ClientResult<()> {
        self.record(
            "newEventSession",
            id.map(|id| vec![Value::from(id)]).unwrap_or_default(),
        )
    }

    fn get_revel_root<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        self.query_future("getRevelRoot")
    }

    fn get_command_map<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Value>>> {
        self.query_future("getCommandMap")
    }

    fn finish(&self) -> ClientResult<()> {
        self.record("finish", Vec::new())
    }

    fn get_device<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Device>>> {
        self.query_future("getDevice")
    }

    fn get_width<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        self.query_future("getWidth")
    }

    fn get_height<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        self.query_future("getHeight")
    }

    fn get_duration<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        self.query_future("getDuration")
    }

    fn get_sdk_version<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        self.query_future("getSdkVersion")
    }

    fn apply_config(&self, prefs: &Map<String, Value>) -> ClientResult<()> {
        self.record("applyConfig", vec![Value::Object(prefs.clone())])
    }
}
