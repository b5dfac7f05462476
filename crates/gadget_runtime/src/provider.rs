//! Leptos context wiring for [`GadgetService`].
#![allow(clippy::clone_on_copy)]

use std::rc::Rc;

use leptos::*;

use crate::{
    service::GadgetService,
    zone::{ExecutionZone, ImmediateZone, LeptosZone},
};

/// Builds a service whose bridge publishes through the given zone.
pub type GadgetServiceFactory = fn(Rc<dyn ExecutionZone>) -> GadgetService;

#[component]
/// Builds a [`GadgetService`] under the current reactive owner and provides it to descendants.
///
/// The bridge is torn down when the provider is disposed.
pub fn GadgetProvider(
    /// Factory assembled by the entry layer, e.g. the browser service builder.
    factory: GadgetServiceFactory,
    children: Children,
) -> impl IntoView {
    let zone: Rc<dyn ExecutionZone> = match LeptosZone::current() {
        Some(zone) => Rc::new(zone),
        None => Rc::new(ImmediateZone),
    };
    provide_gadget_service(factory(zone));

    children().into_view()
}

/// Provides `service` as context and tears its bridge down with the current owner.
pub fn provide_gadget_service(service: GadgetService) {
    let on_dispose = service.clone();
    on_cleanup(move || on_dispose.destroy());
    provide_context(service);
}

/// Returns the provided [`GadgetService`].
///
/// # Panics
///
/// Panics if called outside [`GadgetProvider`] or [`provide_gadget_service`].
pub fn use_gadget_service() -> GadgetService {
    use_context::<GadgetService>().expect("GadgetService not provided")
}

/// Mirrors the bridge `ready` channel into a reactive signal owned by the current scope.
pub fn ready_signal(service: &GadgetService) -> RwSignal<bool> {
    let ready = create_rw_signal(service.channels().ready().get());
    let mut subscription = service.on_ready(move |value| ready.set(value));
    on_cleanup(move || subscription.unsubscribe());
    ready
}
