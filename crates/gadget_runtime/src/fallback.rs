//! Inert client bound when the player host cannot be reached.

use std::{fmt, rc::Rc};

use gadget_host::{
    device_time_now_iso, ClientFuture, ClientResult, ConfigMessage, Device, FrameMessenger,
    GadgetClient, NoopFrameMessenger,
};
use leptos::logging;
use serde_json::{Map, Value};

/// Version reported by the fallback client's `get_sdk_version`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// No-op [`GadgetClient`] used in preview, standalone, and blocked-host modes.
///
/// Queries resolve to `None` except device time (current time) and SDK version (this adapter's
/// version). Commands are discarded. `apply_config` still relays the config to the opener or
/// parent so design-time tooling hosting the gadget receives edits.
#[derive(Clone)]
pub struct NoopGadgetClient {
    messenger: Rc<dyn FrameMessenger>,
}

impl Default for NoopGadgetClient {
    fn default() -> Self {
        Self::new(Rc::new(NoopFrameMessenger))
    }
}

impl fmt::Debug for NoopGadgetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoopGadgetClient").finish_non_exhaustive()
    }
}

impl NoopGadgetClient {
    /// Creates a fallback client relaying config through `messenger`.
    pub fn new(messenger: Rc<dyn FrameMessenger>) -> Self {
        Self { messenger }
    }
}

fn none<'a, T: 'a>() -> ClientFuture<'a, ClientResult<Option<T>>> {
    Box::pin(async { Ok(None) })
}

impl GadgetClient for NoopGadgetClient {
    fn callback(&self, _args: &[Value]) -> ClientResult<()> {
        Ok(())
    }

    fn get_device_time<'a>(
        &'a self,
        _date: Option<&'a str>,
    ) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(async { Ok(Some(device_time_now_iso())) })
    }

    fn get_device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        none()
    }

    fn get_device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        none()
    }

    fn get_device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        none()
    }

    fn get_language_code<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        none()
    }

    fn get_device_key<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        none()
    }

    fn send_command(&self, _name: &str, _arg: &str) -> ClientResult<()> {
        Ok(())
    }

    fn send_remote_command(
        &self,
        _device_keys: &[String],
        _name: &str,
        _arg: &str,
    ) -> ClientResult<()> {
        Ok(())
    }

    fn track(&self, _event_name: &str, _properties: Option<&Value>) -> ClientResult<()> {
        Ok(())
    }

    fn time_event(&self, _event_name: &str) -> ClientResult<()> {
        Ok(())
    }

    fn new_event_session(&self, _id: Option<&str>) -> ClientResult<()> {
        Ok(())
    }

    fn get_revel_root<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        none()
    }

    fn get_command_map<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Value>>> {
        none()
    }

    fn finish(&self) -> ClientResult<()> {
        Ok(())
    }

    fn get_device<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Device>>> {
        none()
    }

    fn get_width<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        none()
    }

    fn get_height<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        none()
    }

    fn get_duration<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        none()
    }

    fn get_sdk_version<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(async { Ok(Some(SDK_VERSION.to_string())) })
    }

    fn apply_config(&self, prefs: &Map<String, Value>) -> ClientResult<()> {
        let message = ConfigMessage::apply(prefs.clone(), self.messenger.has_opener());
        let relayed = message
            .to_json()
            .and_then(|raw| self.messenger.post_to_opener_or_parent(&raw));
        if let Err(err) = relayed {
            logging::warn!("preview applyConfig relay failed: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use gadget_host::{MemoryFrameMessenger, PostedFrameMessage};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn queries_resolve_to_benign_defaults() {
        let client = NoopGadgetClient::default();
        let client_obj: &dyn GadgetClient = &client;

        assert_eq!(block_on(client_obj.get_device()).expect("device"), None);
        assert_eq!(block_on(client_obj.get_device_key()).expect("key"), None);
        assert_eq!(block_on(client_obj.get_width()).expect("width"), None);
        assert_eq!(block_on(client_obj.get_height()).expect("height"), None);
        assert_eq!(block_on(client_obj.get_duration()).expect("duration"), None);
        assert_eq!(block_on(client_obj.get_command_map()).expect("map"), None);
        assert_eq!(block_on(client_obj.get_revel_root()).expect("root"), None);
        assert_eq!(block_on(client_obj.get_language_code()).expect("lang"), None);
        assert_eq!(
            block_on(client_obj.get_device_time_zone_offset()).expect("offset"),
            None
        );
        assert_eq!(
            block_on(client_obj.get_sdk_version()).expect("version"),
            Some(SDK_VERSION.to_string())
        );
    }

    #[test]
    fn device_time_is_current_iso_text() {
        let client = NoopGadgetClient::default();
        let time = block_on(client.get_device_time(None))
            .expect("time")
            .expect("some time");
        assert!(chrono_like_iso(&time), "{time}");
    }

    fn chrono_like_iso(text: &str) -> bool {
        text.len() >= 20 && text.as_bytes()[4] == b'-' && text.contains('T')
    }

    #[test]
    fn commands_are_accepted_and_discarded() {
        let client = NoopGadgetClient::default();
        client.callback(&[json!(1)]).expect("callback");
        client.send_command("x", "y").expect("send");
        client
            .send_remote_command(&["k".to_string()], "x", "y")
            .expect("remote");
        client.track("evt", Some(&json!({ "a": 1 }))).expect("track");
        client.time_event("evt").expect("time event");
        client.new_event_session(Some("s")).expect("session");
        client.finish().expect("finish");
    }

    #[test]
    fn apply_config_from_popup_relays_to_opener_tagged() {
        let messenger = MemoryFrameMessenger::popup();
        let client = NoopGadgetClient::new(Rc::new(messenger.clone()));
        let mut prefs = Map::new();
        prefs.insert("a".into(), json!(1));

        client.apply_config(&prefs).expect("apply");

        let posts = messenger.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, PostedFrameMessage::Opener);
        let sent: Value = serde_json::from_str(&posts[0].1).expect("json");
        assert_eq!(
            sent,
            json!({ "type": "applyConfig", "prefs": { "a": 1 }, "isOpener": true })
        );
    }

    #[test]
    fn apply_config_from_frame_posts_to_parent_untagged() {
        let messenger = MemoryFrameMessenger::embedded();
        let client = NoopGadgetClient::new(Rc::new(messenger.clone()));
        client.apply_config(&Map::new()).expect("apply");

        let posts = messenger.posts();
        assert_eq!(posts[0].0, PostedFrameMessage::Parent);
        let sent: Value = serde_json::from_str(&posts[0].1).expect("json");
        assert_eq!(sent["isOpener"], json!(false));
    }
}
