//! Application-facing gadget service composing the resolver and the event bridge.

use std::rc::Rc;

use gadget_host::{ClientError, ClientResult, Command, Device, Subscription};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    bridge::{BridgeChannels, EventBridge},
    resolver::{ClientBinding, ClientResolver},
};

/// Future-returning facade over the player host plus its notification channels.
///
/// Every host-dependent method waits for the page-lifetime client binding, then forwards.
/// Host-method failures come back unchanged as [`ClientError`]; host absence is not a failure.
/// Clones share the same resolver and bridge.
#[derive(Clone, Debug)]
pub struct GadgetService {
    resolver: Rc<ClientResolver>,
    bridge: Rc<EventBridge>,
}

impl GadgetService {
    /// Composes an already-wired bridge with a resolver.
    pub fn new(resolver: ClientResolver, bridge: EventBridge) -> Self {
        Self {
            resolver: Rc::new(resolver),
            bridge: Rc::new(bridge),
        }
    }

    /// Returns the client resolver.
    pub fn resolver(&self) -> &ClientResolver {
        &self.resolver
    }

    /// Returns the notification channels.
    pub fn channels(&self) -> &BridgeChannels {
        self.bridge.channels()
    }

    /// Returns the bound client, resolving it on first use.
    pub async fn client(&self) -> ClientBinding {
        self.resolver.resolve().await
    }

    /// Returns whether the gadget runs without a player (preview, standalone, blocked host).
    pub async fn is_preview_mode(&self) -> bool {
        self.resolver.is_preview_mode().await
    }

    /// Forwards to the host's generic callback hook.
    pub async fn callback(&self, args: &[Value]) -> ClientResult<()> {
        self.client().await.client().callback(args)
    }

    /// Returns the device-local time, optionally converting an ISO-8601 instant.
    pub async fn get_device_time(&self, date: Option<&str>) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_device_time(date).await
    }

    /// Returns the device time-zone display name.
    pub async fn get_device_time_zone_name(&self) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_device_time_zone_name().await
    }

    /// Returns the device time-zone identifier.
    pub async fn get_device_time_zone_id(&self) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_device_time_zone_id().await
    }

    /// Returns the device time-zone offset in minutes.
    pub async fn get_device_time_zone_offset(&self) -> ClientResult<Option<f64>> {
        let binding = self.client().await;
        binding.client().get_device_time_zone_offset().await
    }

    /// Returns the device language code.
    pub async fn get_language_code(&self) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_language_code().await
    }

    /// Returns the device registration key.
    pub async fn get_device_key(&self) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_device_key().await
    }

    /// Sends a command to the local player.
    pub async fn send_command(&self, name: &str, arg: &str) -> ClientResult<()> {
        self.client().await.client().send_command(name, arg)
    }

    /// Sends a command whose argument is `value` encoded as JSON.
    pub async fn send_command_json<T: Serialize>(&self, name: &str, value: &T) -> ClientResult<()> {
        let command = Command::json(name, value).map_err(|message| ClientError::Encode {
            method: "sendCommand".to_string(),
            message,
        })?;
        self.send_command(&command.name, &command.arg).await
    }

    /// Sends a command to other players.
    pub async fn send_remote_command(
        &self,
        device_keys: &[String],
        name: &str,
        arg: &str,
    ) -> ClientResult<()> {
        self.client()
            .await
            .client()
            .send_remote_command(device_keys, name, arg)
    }

    /// Records an analytics event.
    pub async fn track(&self, event_name: &str, properties: Option<&Value>) -> ClientResult<()> {
        self.client().await.client().track(event_name, properties)
    }

    /// Starts a timer for an analytics event.
    pub async fn time_event(&self, event_name: &str) -> ClientResult<()> {
        self.client().await.client().time_event(event_name)
    }

    /// Starts a new analytics session; `id` is passed through when provided.
    pub async fn new_event_session(&self, id: Option<&str>) -> ClientResult<()> {
        self.client().await.client().new_event_session(id)
    }

    /// Returns the root URL of player-side resources.
    pub async fn get_revel_root(&self) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_revel_root().await
    }

    /// Returns the player's command map.
    pub async fn get_command_map(&self) -> ClientResult<Option<Value>> {
        let binding = self.client().await;
        binding.client().get_command_map().await
    }

    /// Signals that the gadget finished its presentation.
    pub async fn finish(&self) -> ClientResult<()> {
        self.client().await.client().finish()
    }

    /// Returns the device description.
    pub async fn get_device(&self) -> ClientResult<Option<Device>> {
        let binding = self.client().await;
        binding.client().get_device().await
    }

    /// Returns the gadget width in pixels.
    pub async fn get_width(&self) -> ClientResult<Option<f64>> {
        let binding = self.client().await;
        binding.client().get_width().await
    }

    /// Returns the gadget height in pixels.
    pub async fn get_height(&self) -> ClientResult<Option<f64>> {
        let binding = self.client().await;
        binding.client().get_height().await
    }

    /// Returns the scheduled duration in milliseconds.
    pub async fn get_duration(&self) -> ClientResult<Option<f64>> {
        let binding = self.client().await;
        binding.client().get_duration().await
    }

    /// Returns the SDK version reported by the bound client.
    pub async fn get_sdk_version(&self) -> ClientResult<Option<String>> {
        let binding = self.client().await;
        binding.client().get_sdk_version().await
    }

    /// Applies configuration edits.
    pub async fn apply_config(&self, prefs: &Map<String, Value>) -> ClientResult<()> {
        self.client().await.client().apply_config(prefs)
    }

    /// Subscribes to the bridge readiness flag; the current value is delivered immediately.
    pub fn on_ready(&self, listener: impl Fn(bool) + 'static) -> Subscription {
        self.channels()
            .ready()
            .subscribe(move |ready: &bool| listener(*ready))
    }

    /// Subscribes to player start signals.
    pub fn on_start(&self, listener: impl Fn() + 'static) -> Subscription {
        self.channels().start().subscribe(move |_: &()| listener())
    }

    /// Subscribes to player stop signals.
    pub fn on_stop(&self, listener: impl Fn() + 'static) -> Subscription {
        self.channels().stop().subscribe(move |_: &()| listener())
    }

    /// Subscribes to player commands.
    pub fn on_command(&self, listener: impl Fn(&Command) + 'static) -> Subscription {
        self.channels().command().subscribe(listener)
    }

    /// Subscribes to open-config requests.
    pub fn on_config(&self, listener: impl Fn() + 'static) -> Subscription {
        self.channels().config().subscribe(move |_: &()| listener())
    }

    /// Subscribes to every accepted `postMessage` object.
    pub fn on_message(&self, listener: impl Fn(&Value) + 'static) -> Subscription {
        self.channels().raw_message().subscribe(listener)
    }

    /// Detaches the bridge sources and marks it not ready.
    ///
    /// The client binding is kept; it lives for the whole page.
    pub fn destroy(&self) {
        self.bridge.teardown();
    }
}
