use super::*;

pub fn locate_client(_global: &str) -> Option<Rc<dyn GadgetClient>> {
    None
}

pub fn document_loaded() -> bool {
    true
}

pub fn on_window_load_once(_callback: Box<dyn FnOnce()>) {}

pub fn has_opener() -> bool {
    false
}

pub fn post_to_opener_or_parent(_message: &str) -> Result<(), String> {
    Ok(())
}

pub fn listen_document_event(_event_name: &str, _handler: Box<dyn Fn(Value)>) -> Subscription {
    Subscription::empty()
}

pub fn listen_window_messages(_handler: Box<dyn Fn(Option<String>)>) -> Subscription {
    Subscription::empty()
}

pub fn install_controller(
    _namespace: &str,
    _property: &str,
    _handlers: ControllerHandlers,
) -> Subscription {
    Subscription::empty()
}
