//! Browser [`HostProbe`] that looks for the player client global on `window`.

use std::rc::Rc;

use gadget_host::GadgetClient;
use gadget_runtime::{BridgeConfig, HostProbe};

use crate::interop;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Probe over the page's `window` and `document`.
pub struct WebHostProbe {
    client_global: String,
}

impl WebHostProbe {
    /// Creates a probe for the client global named in `config`.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            client_global: config.client_global.clone(),
        }
    }
}

impl Default for WebHostProbe {
    fn default() -> Self {
        Self::new(&BridgeConfig::default())
    }
}

impl HostProbe for WebHostProbe {
    fn locate_client(&self) -> Option<Rc<dyn GadgetClient>> {
        interop::locate_client(&self.client_global)
    }

    fn document_loaded(&self) -> bool {
        interop::document_loaded()
    }

    fn on_load_once(&self, callback: Box<dyn FnOnce()>) {
        interop::on_window_load_once(callback);
    }
}
