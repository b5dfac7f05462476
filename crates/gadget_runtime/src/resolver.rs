//! Page-lifetime binding to the player host client.
//!
//! The player injects its client global asynchronously, so a gadget may start before, during,
//! or after it appears, and the global may never arrive at all (network failure, content
//! blockers, standalone preview). [`ClientResolver`] settles this exactly once:
//!
//! 1. global present at first call: bind it;
//! 2. document already fully loaded: the host is not coming, bind the fallback;
//! 3. otherwise wait for the single load event, then bind whichever is available.
//!
//! Every caller, including those arriving while step 3 is pending, shares one [`SharedBinding`].

use std::{cell::RefCell, fmt, rc::Rc};

use futures::{
    channel::oneshot,
    future::{self, FutureExt, LocalBoxFuture, Shared},
};
use gadget_host::GadgetClient;
use leptos::logging;

use crate::fallback::NoopGadgetClient;

/// Environment probe used to locate the host client and observe page load.
pub trait HostProbe {
    /// Returns the host client when its global is currently present.
    fn locate_client(&self) -> Option<Rc<dyn GadgetClient>>;

    /// Returns whether the document has already finished loading.
    fn document_loaded(&self) -> bool;

    /// Runs `callback` once when the document finishes loading.
    ///
    /// Dropping the callback without running it resolves pending callers to the fallback.
    fn on_load_once(&self, callback: Box<dyn FnOnce()>);
}

/// The implementation bound for the lifetime of the page.
#[derive(Clone)]
pub enum ClientBinding {
    /// The player's own client.
    Live(Rc<dyn GadgetClient>),
    /// The inert preview client.
    Fallback(Rc<NoopGadgetClient>),
}

impl ClientBinding {
    /// Borrows the bound client.
    pub fn client(&self) -> &dyn GadgetClient {
        match self {
            Self::Live(client) => client.as_ref(),
            Self::Fallback(client) => client.as_ref(),
        }
    }

    /// Returns whether the fallback is bound.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Returns whether both bindings refer to the same client instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Live(a), Self::Live(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Self::Fallback(a), Self::Fallback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ClientBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(_) => f.write_str("ClientBinding::Live"),
            Self::Fallback(_) => f.write_str("ClientBinding::Fallback"),
        }
    }
}

/// Memoized future shared by every caller of [`ClientResolver::resolve`].
pub type SharedBinding = Shared<LocalBoxFuture<'static, ClientBinding>>;

/// Owns the single resolution of the host client.
pub struct ClientResolver {
    probe: Rc<dyn HostProbe>,
    fallback: Rc<NoopGadgetClient>,
    pending: RefCell<Option<SharedBinding>>,
}

impl fmt::Debug for ClientResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientResolver")
            .field("started", &self.pending.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl ClientResolver {
    /// Creates an idle resolver. Nothing is probed until the first [`Self::resolve`].
    pub fn new(probe: Rc<dyn HostProbe>, fallback: NoopGadgetClient) -> Self {
        Self {
            probe,
            fallback: Rc::new(fallback),
            pending: RefCell::new(None),
        }
    }

    /// Returns the shared binding future, starting resolution on first use.
    pub fn resolve(&self) -> SharedBinding {
        let mut pending = self.pending.borrow_mut();
        if let Some(shared) = pending.as_ref() {
            return shared.clone();
        }
        let shared = self.start().shared();
        *pending = Some(shared.clone());
        shared
    }

    /// Returns whether resolution has been started.
    pub fn is_started(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Resolves and reports whether the fallback was bound.
    pub async fn is_preview_mode(&self) -> bool {
        self.resolve().await.is_fallback()
    }

    fn start(&self) -> LocalBoxFuture<'static, ClientBinding> {
        if let Some(client) = self.probe.locate_client() {
            return future::ready(ClientBinding::Live(client)).boxed_local();
        }
        if self.probe.document_loaded() {
            return future::ready(bind_fallback(&self.fallback, "document already loaded"))
                .boxed_local();
        }

        let (tx, rx) = oneshot::channel::<Option<Rc<dyn GadgetClient>>>();
        let probe = self.probe.clone();
        self.probe.on_load_once(Box::new(move || {
            let _ = tx.send(probe.locate_client());
        }));

        let fallback = self.fallback.clone();
        async move {
            match rx.await {
                Ok(Some(client)) => ClientBinding::Live(client),
                Ok(None) => bind_fallback(&fallback, "not present after load"),
                Err(_) => bind_fallback(&fallback, "load listener dropped"),
            }
        }
        .boxed_local()
    }
}

fn bind_fallback(fallback: &Rc<NoopGadgetClient>, reason: &str) -> ClientBinding {
    logging::warn!("player client unavailable ({reason}); running in preview mode");
    ClientBinding::Fallback(fallback.clone())
}
