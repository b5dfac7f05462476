use std::rc::Rc;

use gadget_host::FrameMessenger;
use gadget_runtime::{
    BridgeConfig, ClientResolver, EventBridge, ExecutionZone, GadgetService, NoopGadgetClient,
    SignalSource,
};

use crate::{ControllerSource, DomEventSource, MessageSource, WebFrameMessenger, WebHostProbe};

/// Returns every browser delivery mechanism the bridge listens on.
pub fn browser_signal_sources() -> Vec<Box<dyn SignalSource>> {
    vec![
        Box::new(DomEventSource),
        Box::new(ControllerSource),
        Box::new(MessageSource),
    ]
}

/// Builds the page's [`GadgetService`] with default host names.
///
/// Matches [`gadget_runtime::GadgetServiceFactory`] so it can be handed to `GadgetProvider`.
pub fn browser_gadget_service(zone: Rc<dyn ExecutionZone>) -> GadgetService {
    browser_gadget_service_with(&BridgeConfig::default(), zone)
}

/// Builds the page's [`GadgetService`] for the host names in `config`.
pub fn browser_gadget_service_with(
    config: &BridgeConfig,
    zone: Rc<dyn ExecutionZone>,
) -> GadgetService {
    let messenger: Rc<dyn FrameMessenger> = Rc::new(WebFrameMessenger);
    let resolver = ClientResolver::new(
        Rc::new(WebHostProbe::new(config)),
        NoopGadgetClient::new(messenger.clone()),
    );
    let bridge = EventBridge::new(config, zone, messenger, &browser_signal_sources());
    GadgetService::new(resolver, bridge)
}
