use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::binder::{Binder, Binding, PageEvent};
use crate::config::Config;
use crate::model::{CartActionResult, CartChanged};
use crate::notifier::Notifier;
use crate::page::SharedPage;
use crate::service::CartService;
use crate::synchronizer::Synchronizer;
use crate::view::CartViewState;

/// One controller per page view. It owns the bindings taken when it was
/// built and lives as long as the page does.
pub struct CartController {
    page: SharedPage,
    binder: Binder,
    sync: Synchronizer,
}

impl CartController {
    pub fn new(cfg: &Config, page: SharedPage, service: Arc<dyn CartService>) -> Self {
        let binder = page.with(|p| Binder::bind(p, &cfg.page));
        let notifier = Notifier::new(page.clone(), &cfg.page.notification);
        let (changes, _) = broadcast::channel(cfg.signal.capacity.max(1));
        let sync = Synchronizer::new(service, page.clone(), cfg.page.clone(), notifier, changes);

        Self {
            page,
            binder,
            sync,
        }
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn bindings(&self) -> &[Binding] {
        self.binder.bindings()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
        self.sync.subscribe()
    }

    pub fn view_state(&self) -> CartViewState {
        self.sync.view_state()
    }

    /// Handles a page event. Unbound targets are ignored; bound ones start
    /// their operation in the background and hand back its handle.
    pub fn dispatch(&self, event: PageEvent) -> Option<JoinHandle<CartActionResult>> {
        let request = self.page.with(|page| self.binder.intent_for(page, event))?;
        tracing::debug!(element = %event.target, action = %request.kind, product_id = %request.product_id, "dispatching");

        let sync = self.sync.clone();
        Some(tokio::spawn(async move { sync.perform(&request).await }))
    }
}
