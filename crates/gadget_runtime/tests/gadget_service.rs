use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::executor::block_on;
use gadget_host::{
    ClientError, Command, GadgetClient, MemoryFrameMessenger, MemoryGadgetClient, Subscription,
};
use gadget_runtime::{
    BridgeConfig, BridgeInlet, ClientResolver, EventBridge, GadgetService, HostProbe, HostSignal,
    ImmediateZone, NoopGadgetClient, SignalSource, SDK_VERSION,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

#[derive(Default)]
struct TestProbe {
    client: RefCell<Option<Rc<dyn GadgetClient>>>,
    loaded: Cell<bool>,
    listeners: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl TestProbe {
    fn with_client(client: MemoryGadgetClient) -> Rc<Self> {
        let probe = Self::default();
        *probe.client.borrow_mut() = Some(Rc::new(client));
        Rc::new(probe)
    }

    fn loaded_without_host() -> Rc<Self> {
        let probe = Self::default();
        probe.loaded.set(true);
        Rc::new(probe)
    }

    fn fire_load(&self) {
        self.loaded.set(true);
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in listeners {
            listener();
        }
    }
}

impl HostProbe for TestProbe {
    fn locate_client(&self) -> Option<Rc<dyn GadgetClient>> {
        self.client.borrow().clone()
    }

    fn document_loaded(&self) -> bool {
        self.loaded.get()
    }

    fn on_load_once(&self, callback: Box<dyn FnOnce()>) {
        self.listeners.borrow_mut().push(callback);
    }
}

/// Source that hands its inlet to the test, standing in for one delivery mechanism.
#[derive(Clone, Default)]
struct HandleSource {
    inlet: Rc<RefCell<Option<BridgeInlet>>>,
}

impl HandleSource {
    fn inlet(&self) -> BridgeInlet {
        self.inlet.borrow().clone().expect("source attached")
    }
}

impl SignalSource for HandleSource {
    fn attach(&self, _config: &BridgeConfig, inlet: BridgeInlet) -> Subscription {
        *self.inlet.borrow_mut() = Some(inlet);
        let slot = self.inlet.clone();
        Subscription::new(move || {
            slot.borrow_mut().take();
        })
    }
}

fn service(probe: Rc<TestProbe>, sources: &[Box<dyn SignalSource>]) -> GadgetService {
    let messenger = Rc::new(MemoryFrameMessenger::embedded());
    let resolver = ClientResolver::new(probe, NoopGadgetClient::new(messenger.clone()));
    let bridge = EventBridge::new(
        &BridgeConfig::default(),
        Rc::new(ImmediateZone),
        messenger,
        sources,
    );
    GadgetService::new(resolver, bridge)
}

#[test]
fn host_never_loads_runs_in_preview_mode() {
    let service = service(TestProbe::loaded_without_host(), &[]);

    assert!(block_on(service.is_preview_mode()));
    block_on(service.send_command("x", "y")).expect("send resolves");
    assert_eq!(block_on(service.get_width()).expect("width"), None);
    assert_eq!(block_on(service.get_device()).expect("device"), None);
    assert_eq!(
        block_on(service.get_sdk_version()).expect("version"),
        Some(SDK_VERSION.to_string())
    );
    assert!(block_on(service.get_device_time(None))
        .expect("time")
        .is_some());
}

#[test]
fn live_host_values_pass_through_unmodified() {
    let host = MemoryGadgetClient::new()
        .with_value("getDeviceKey", json!("  KEY-0042 "))
        .with_value("getDuration", json!(15000));
    let service = service(TestProbe::with_client(host), &[]);

    assert!(!block_on(service.is_preview_mode()));
    assert_eq!(
        block_on(service.get_device_key()).expect("key"),
        Some("  KEY-0042 ".to_string())
    );
    assert_eq!(
        block_on(service.get_duration()).expect("duration"),
        Some(15000.0)
    );
}

#[test]
fn calls_before_load_all_observe_the_late_host() {
    let probe = Rc::new(TestProbe::default());
    let service = service(probe.clone(), &[]);

    let pending: Vec<_> = (0..4).map(|_| service.resolver().resolve()).collect();
    let host = MemoryGadgetClient::new();
    *probe.client.borrow_mut() = Some(Rc::new(host.clone()));
    probe.fire_load();

    let bindings: Vec<_> = pending.into_iter().map(block_on).collect();
    assert!(bindings.iter().all(|binding| !binding.is_fallback()));
    assert!(bindings
        .windows(2)
        .all(|pair| pair[0].same_instance(&pair[1])));

    block_on(service.finish()).expect("finish");
    assert_eq!(host.calls_to("finish").len(), 1);
}

#[test]
fn host_method_failure_propagates_unchanged() {
    let host = MemoryGadgetClient::new().failing("sendCommand", "player rejected");
    let service = service(TestProbe::with_client(host), &[]);

    let err = block_on(service.send_command("play", "")).expect_err("rejects");
    assert_eq!(err, ClientError::host_call("sendCommand", "player rejected"));
}

#[test]
fn event_session_id_is_passed_through_when_provided() {
    let host = MemoryGadgetClient::new();
    let service = service(TestProbe::with_client(host.clone()), &[]);

    block_on(service.new_event_session(Some("session-7"))).expect("with id");
    block_on(service.new_event_session(None)).expect("without id");

    let calls = host.calls_to("newEventSession");
    assert_eq!(calls[0].args, vec![json!("session-7")]);
    assert!(calls[1].args.is_empty());
}

#[test]
fn json_commands_encode_their_argument() {
    let host = MemoryGadgetClient::new();
    let service = service(TestProbe::with_client(host.clone()), &[]);

    block_on(service.send_command_json("volume", &json!({ "level": 4 }))).expect("send");

    assert_eq!(
        host.calls_to("sendCommand")[0].args,
        vec![json!("volume"), json!(r#"{"level":4}"#)]
    );
}

#[test]
fn apply_config_in_preview_relays_to_parent() {
    let messenger = MemoryFrameMessenger::embedded();
    let resolver = ClientResolver::new(
        TestProbe::loaded_without_host(),
        NoopGadgetClient::new(Rc::new(messenger.clone())),
    );
    let bridge = EventBridge::new(
        &BridgeConfig::default(),
        Rc::new(ImmediateZone),
        Rc::new(messenger.clone()),
        &[],
    );
    let service = GadgetService::new(resolver, bridge);
    let mut prefs = Map::new();
    prefs.insert("color".into(), json!("red"));

    block_on(service.apply_config(&prefs)).expect("apply");

    let posted: Value = serde_json::from_str(&messenger.posts()[0].1).expect("json");
    assert_eq!(
        posted,
        json!({ "type": "applyConfig", "prefs": { "color": "red" }, "isOpener": false })
    );
}

#[test]
fn both_delivery_paths_produce_identical_commands() {
    let dom = HandleSource::default();
    let controller = HandleSource::default();
    let sources: Vec<Box<dyn SignalSource>> =
        vec![Box::new(dom.clone()), Box::new(controller.clone())];
    let service = service(TestProbe::loaded_without_host(), &sources);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _sub = service.on_command(move |command| sink.borrow_mut().push(command.clone()));

    let command = Command::new("changeSlide", r#"{"index":2}"#);
    dom.inlet().signal(HostSignal::Command(command.clone()));
    controller.inlet().signal(HostSignal::Command(command.clone()));

    assert_eq!(*seen.borrow(), vec![command.clone(), command]);
}

#[test]
fn ready_replays_and_destroy_detaches_sources() {
    let source = HandleSource::default();
    let sources: Vec<Box<dyn SignalSource>> = vec![Box::new(source.clone())];
    let service = service(TestProbe::loaded_without_host(), &sources);

    let ready = Rc::new(RefCell::new(Vec::new()));
    let sink = ready.clone();
    let _ready = service.on_ready(move |value| sink.borrow_mut().push(value));
    let starts = Rc::new(Cell::new(0));
    let counter = starts.clone();
    let _start = service.on_start(move || counter.set(counter.get() + 1));

    source.inlet().signal(HostSignal::Start);
    service.destroy();
    service.destroy();

    assert_eq!(*ready.borrow(), vec![true, false]);
    assert_eq!(starts.get(), 1);
    assert!(source.inlet.borrow().is_none());
    assert!(block_on(service.is_preview_mode()));
}
