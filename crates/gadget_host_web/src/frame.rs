//! Cross-window messaging for the page the gadget runs in.

use gadget_host::FrameMessenger;

use crate::interop;

#[derive(Debug, Clone, Copy, Default)]
/// Posts to `window.opener` when present, otherwise to `window.parent`.
pub struct WebFrameMessenger;

impl FrameMessenger for WebFrameMessenger {
    fn has_opener(&self) -> bool {
        interop::has_opener()
    }

    fn post_to_opener_or_parent(&self, message: &str) -> Result<(), String> {
        interop::post_to_opener_or_parent(message)
    }
}
