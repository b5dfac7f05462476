//! Fan-in of player signals into the gadget notification channels.
//!
//! Three host mechanisms deliver the same information: DOM custom events, direct calls on the
//! installed controller global, and `postMessage` traffic. Each is wrapped by a
//! [`SignalSource`] that translates its native shape into [`HostSignal`] values or raw message
//! text and hands them to a [`BridgeInlet`]. The inlet publishes inside the bridge's
//! [`ExecutionZone`].
//!
//! `applyConfig` messages tagged `isOpener: true` came from a popup config window; they are
//! re-tagged and forwarded to this window's opener or parent before local publication.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use gadget_host::{
    Broadcast, Command, ConfigMessageKind, FrameMessenger, ReplayChannel, Subscription,
};
use leptos::logging;
use serde_json::{Map, Value};

use crate::{config::BridgeConfig, zone::ExecutionZone};

/// Player lifecycle or command signal, independent of delivery mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// The player started presenting the gadget.
    Start,
    /// The player stopped presenting the gadget.
    Stop,
    /// The player sent a command.
    Command(Command),
}

/// One external delivery mechanism wired into the bridge.
pub trait SignalSource {
    /// Starts forwarding into `inlet`; the returned subscription detaches the source.
    fn attach(&self, config: &BridgeConfig, inlet: BridgeInlet) -> Subscription;
}

/// Notification channels published by the bridge.
#[derive(Clone)]
pub struct BridgeChannels {
    ready: ReplayChannel<bool>,
    start: Broadcast<()>,
    stop: Broadcast<()>,
    command: Broadcast<Command>,
    config: Broadcast<()>,
    raw_message: Broadcast<Value>,
}

impl BridgeChannels {
    fn new() -> Self {
        Self {
            ready: ReplayChannel::new(false),
            start: Broadcast::new(),
            stop: Broadcast::new(),
            command: Broadcast::new(),
            config: Broadcast::new(),
            raw_message: Broadcast::new(),
        }
    }

    /// `true` while the bridge is wired; replayed to new subscribers.
    pub fn ready(&self) -> &ReplayChannel<bool> {
        &self.ready
    }

    /// Player start signals.
    pub fn start(&self) -> &Broadcast<()> {
        &self.start
    }

    /// Player stop signals.
    pub fn stop(&self) -> &Broadcast<()> {
        &self.stop
    }

    /// Player commands.
    pub fn command(&self) -> &Broadcast<Command> {
        &self.command
    }

    /// Requests to open the configuration UI.
    pub fn config(&self) -> &Broadcast<()> {
        &self.config
    }

    /// Every accepted `postMessage` object, after relay processing.
    pub fn raw_message(&self) -> &Broadcast<Value> {
        &self.raw_message
    }
}

struct BridgeCore {
    zone: Rc<dyn ExecutionZone>,
    messenger: Rc<dyn FrameMessenger>,
    channels: BridgeChannels,
}

impl BridgeCore {
    fn publish_signal(&self, signal: HostSignal) {
        let channels = &self.channels;
        self.zone.run(Box::new(move || match signal {
            HostSignal::Start => channels.start.publish(&()),
            HostSignal::Stop => channels.stop.publish(&()),
            HostSignal::Command(command) => channels.command.publish(&command),
        }));
    }

    fn publish_message(&self, data: &str) {
        let Some((kind, mut message)) = parse_message(data) else {
            return;
        };

        if kind == ConfigMessageKind::ApplyConfig.as_str()
            && message.get("isOpener") == Some(&Value::Bool(true))
        {
            message.insert("isOpener".to_string(), Value::Bool(false));
            self.relay(&message);
        }

        let channels = &self.channels;
        let open_config = kind == ConfigMessageKind::OpenConfig.as_str();
        self.zone.run(Box::new(move || {
            if open_config {
                channels.config.publish(&());
            }
            channels.raw_message.publish(&Value::Object(message));
        }));
    }

    fn relay(&self, message: &Map<String, Value>) {
        let relayed = serde_json::to_string(message)
            .map_err(|e| e.to_string())
            .and_then(|raw| self.messenger.post_to_opener_or_parent(&raw));
        if let Err(err) = relayed {
            logging::warn!("applyConfig relay to opener/parent failed: {err}");
        }
    }
}

/// Accepts only JSON objects carrying a string `type`.
fn parse_message(data: &str) -> Option<(String, Map<String, Value>)> {
    let Ok(Value::Object(message)) = serde_json::from_str::<Value>(data) else {
        return None;
    };
    let kind = message.get("type")?.as_str()?.to_string();
    Some((kind, message))
}

/// Entry point sources push translated signals into.
///
/// Holds the bridge weakly; input arriving after the bridge is dropped is ignored.
#[derive(Clone)]
pub struct BridgeInlet {
    core: Weak<BridgeCore>,
}

impl fmt::Debug for BridgeInlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeInlet")
            .field("live", &(self.core.strong_count() > 0))
            .finish()
    }
}

impl BridgeInlet {
    /// Publishes a start, stop, or command signal.
    pub fn signal(&self, signal: HostSignal) {
        if let Some(core) = self.core.upgrade() {
            core.publish_signal(signal);
        }
    }

    /// Handles text received through `postMessage`.
    pub fn message(&self, data: &str) {
        if let Some(core) = self.core.upgrade() {
            core.publish_message(data);
        }
    }
}

/// Owns the wired sources and the channels they feed.
pub struct EventBridge {
    core: Rc<BridgeCore>,
    sources: RefCell<Vec<Subscription>>,
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("ready", &self.core.channels.ready.get())
            .field("sources", &self.sources.borrow().len())
            .finish()
    }
}

impl EventBridge {
    /// Attaches every source and marks the bridge ready.
    pub fn new(
        config: &BridgeConfig,
        zone: Rc<dyn ExecutionZone>,
        messenger: Rc<dyn FrameMessenger>,
        sources: &[Box<dyn SignalSource>],
    ) -> Self {
        let core = Rc::new(BridgeCore {
            zone,
            messenger,
            channels: BridgeChannels::new(),
        });
        let attached = sources
            .iter()
            .map(|source| {
                source.attach(
                    config,
                    BridgeInlet {
                        core: Rc::downgrade(&core),
                    },
                )
            })
            .collect();

        let bridge = Self {
            core,
            sources: RefCell::new(attached),
        };
        bridge.set_ready(true);
        bridge
    }

    /// Returns the published channels.
    pub fn channels(&self) -> &BridgeChannels {
        &self.core.channels
    }

    /// Returns an inlet feeding this bridge.
    pub fn inlet(&self) -> BridgeInlet {
        BridgeInlet {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Returns whether the bridge is wired.
    pub fn is_ready(&self) -> bool {
        self.core.channels.ready.get()
    }

    /// Detaches every source and flips `ready` to false. Repeated calls do nothing.
    pub fn teardown(&self) {
        let mut sources = std::mem::take(&mut *self.sources.borrow_mut());
        for source in sources.iter_mut() {
            source.unsubscribe();
        }
        self.set_ready(false);
    }

    fn set_ready(&self, ready: bool) {
        let channel = &self.core.channels.ready;
        if channel.store(ready) {
            self.core.zone.run(Box::new(move || channel.notify()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use leptos::SignalDispose;
    use gadget_host::{MemoryFrameMessenger, PostedFrameMessage};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::zone::ImmediateZone;

    #[derive(Default)]
    struct CountingZone {
        entries: Cell<usize>,
    }

    impl ExecutionZone for CountingZone {
        fn run<'a>(&self, task: Box<dyn FnOnce() + 'a>) {
            self.entries.set(self.entries.get() + 1);
            task();
        }
    }

    #[derive(Default)]
    struct CapturingSource {
        inlet: Rc<RefCell<Option<BridgeInlet>>>,
        detached: Rc<Cell<usize>>,
    }

    impl SignalSource for CapturingSource {
        fn attach(&self, _config: &BridgeConfig, inlet: BridgeInlet) -> Subscription {
            *self.inlet.borrow_mut() = Some(inlet);
            let detached = self.detached.clone();
            Subscription::new(move || detached.set(detached.get() + 1))
        }
    }

    fn record<T: Clone + 'static>(
        channel: &Broadcast<T>,
    ) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = channel.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
        (seen, sub)
    }

    fn bridge_with(messenger: MemoryFrameMessenger) -> EventBridge {
        EventBridge::new(
            &BridgeConfig::default(),
            Rc::new(ImmediateZone),
            Rc::new(messenger),
            &[],
        )
    }

    #[test]
    fn ready_is_true_after_construction_and_replayed() {
        let bridge = bridge_with(MemoryFrameMessenger::embedded());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bridge
            .channels()
            .ready()
            .subscribe(move |ready: &bool| sink.borrow_mut().push(*ready));
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn signals_route_to_their_channels_in_order() {
        let bridge = bridge_with(MemoryFrameMessenger::embedded());
        let (starts, _a) = record(bridge.channels().start());
        let (stops, _b) = record(bridge.channels().stop());
        let (commands, _c) = record(bridge.channels().command());

        let inlet = bridge.inlet();
        inlet.signal(HostSignal::Start);
        inlet.signal(HostSignal::Command(Command::new("a", "1")));
        inlet.signal(HostSignal::Command(Command::new("b", "2")));
        inlet.signal(HostSignal::Stop);

        assert_eq!(starts.borrow().len(), 1);
        assert_eq!(stops.borrow().len(), 1);
        assert_eq!(
            *commands.borrow(),
            vec![Command::new("a", "1"), Command::new("b", "2")]
        );
    }

    #[test]
    fn late_command_subscriber_misses_past_commands() {
        let bridge = bridge_with(MemoryFrameMessenger::embedded());
        bridge
            .inlet()
            .signal(HostSignal::Command(Command::new("early", "")));
        let (commands, _sub) = record(bridge.channels().command());
        assert!(commands.borrow().is_empty());
    }

    #[test]
    fn popup_apply_config_is_relayed_untagged_before_raw_publication() {
        let messenger = MemoryFrameMessenger::embedded();
        let bridge = bridge_with(messenger.clone());
        let (configs, _a) = record(bridge.channels().config());
        let posts_at_publication = Rc::new(Cell::new(usize::MAX));
        let observed = posts_at_publication.clone();
        let probe = messenger.clone();
        let (raw, _b) = record(bridge.channels().raw_message());
        let _c = bridge
            .channels()
            .raw_message()
            .subscribe(move |_| observed.set(probe.posts().len()));

        bridge
            .inlet()
            .message(r#"{"type":"applyConfig","prefs":{"a":1},"isOpener":true}"#);

        let posts = messenger.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, PostedFrameMessage::Parent);
        let relayed: Value = serde_json::from_str(&posts[0].1).expect("json");
        let expected = json!({ "type": "applyConfig", "prefs": { "a": 1 }, "isOpener": false });
        assert_eq!(relayed, expected);
        assert!(configs.borrow().is_empty());
        assert_eq!(posts_at_publication.get(), 1);
        assert_eq!(*raw.borrow(), vec![expected]);
    }

    #[test]
    fn untagged_apply_config_is_not_relayed() {
        let messenger = MemoryFrameMessenger::embedded();
        let bridge = bridge_with(messenger.clone());
        let (raw, _sub) = record(bridge.channels().raw_message());

        bridge
            .inlet()
            .message(r#"{"type":"applyConfig","prefs":{"a":1},"isOpener":false}"#);

        assert!(messenger.posts().is_empty());
        assert_eq!(
            *raw.borrow(),
            vec![json!({ "type": "applyConfig", "prefs": { "a": 1 }, "isOpener": false })]
        );
    }

    #[test]
    fn open_config_fires_config_and_raw() {
        let bridge = bridge_with(MemoryFrameMessenger::embedded());
        let (configs, _a) = record(bridge.channels().config());
        let (raw, _b) = record(bridge.channels().raw_message());

        bridge.inlet().message(r#"{"type":"openConfig"}"#);

        assert_eq!(configs.borrow().len(), 1);
        assert_eq!(*raw.borrow(), vec![json!({ "type": "openConfig" })]);
    }

    #[test]
    fn malformed_messages_emit_nothing() {
        let messenger = MemoryFrameMessenger::popup();
        let bridge = bridge_with(messenger.clone());
        let (configs, _a) = record(bridge.channels().config());
        let (raw, _b) = record(bridge.channels().raw_message());

        for data in ["not json", "42", "\"text\"", "[1,2]", r#"{"prefs":{}}"#, r#"{"type":7}"#] {
            bridge.inlet().message(data);
        }

        assert!(configs.borrow().is_empty());
        assert!(raw.borrow().is_empty());
        assert!(messenger.posts().is_empty());
    }

    #[test]
    fn every_publication_enters_the_zone() {
        let zone = Rc::new(CountingZone::default());
        let bridge = EventBridge::new(
            &BridgeConfig::default(),
            zone.clone(),
            Rc::new(MemoryFrameMessenger::embedded()),
            &[],
        );
        assert_eq!(zone.entries.get(), 1);

        bridge.inlet().signal(HostSignal::Start);
        bridge.inlet().message(r#"{"type":"openConfig"}"#);
        assert_eq!(zone.entries.get(), 3);
    }

    #[test]
    fn teardown_detaches_sources_once_and_flips_ready() {
        let source = CapturingSource::default();
        let detached = source.detached.clone();
        let captured = source.inlet.clone();
        let sources: Vec<Box<dyn SignalSource>> = vec![Box::new(source)];
        let bridge = EventBridge::new(
            &BridgeConfig::default(),
            Rc::new(ImmediateZone),
            Rc::new(MemoryFrameMessenger::embedded()),
            &sources,
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bridge
            .channels()
            .ready()
            .subscribe(move |ready: &bool| sink.borrow_mut().push(*ready));

        bridge.teardown();
        bridge.teardown();

        assert_eq!(detached.get(), 1);
        assert!(!bridge.is_ready());
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(captured.borrow().is_some());
    }

    #[cfg(feature = "csr")]
    #[test]
    fn teardown_flips_ready_after_owner_is_disposed() {
        use leptos::{create_effect, create_runtime, Owner};

        use crate::zone::LeptosZone;

        let runtime = create_runtime();
        let captured = Rc::new(Cell::new(None::<Owner>));
        let slot = captured.clone();
        let effect = create_effect(move |_| slot.set(Owner::current()));
        let owner = captured.get().expect("effect owner");

        let bridge = EventBridge::new(
            &BridgeConfig::default(),
            Rc::new(LeptosZone::new(owner)),
            Rc::new(MemoryFrameMessenger::embedded()),
            &[],
        );
        assert!(bridge.is_ready());

        effect.dispose();
        bridge.teardown();

        assert!(!bridge.is_ready());
        assert!(!bridge.channels().ready().get());
        runtime.dispose();
    }

    #[test]
    fn inlet_outliving_bridge_is_inert() {
        let bridge = bridge_with(MemoryFrameMessenger::embedded());
        let inlet = bridge.inlet();
        drop(bridge);
        inlet.signal(HostSignal::Start);
        inlet.message(r#"{"type":"openConfig"}"#);
    }
}
