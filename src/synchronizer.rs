//! Sends cart intents to the cart service and applies the replies.
//!
//! Each operation goes `Pending` while its request is in flight and settles
//! into success or failure when the reply arrives. Nothing guards against two
//! overlapping operations: whichever reply lands last is what the page shows.
//! Failures are never retried.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::api::parse_result;
use crate::config::PageConfig;
use crate::csrf::csrf_token;
use crate::model::{ActionKind, CartActionRequest, CartActionResult, CartChanged, CartSnapshot, Severity};
use crate::notifier::Notifier;
use crate::page::{Page, SharedPage};
use crate::service::CartService;
use crate::view::{self, CartViewState};

const DEFAULT_SUCCESS_MESSAGE: &str = "Cart updated";

#[derive(Clone)]
pub struct Synchronizer {
    service: Arc<dyn CartService>,
    page: SharedPage,
    cfg: PageConfig,
    view: Arc<Mutex<CartViewState>>,
    notifier: Notifier,
    changes: broadcast::Sender<CartChanged>,
}

impl Synchronizer {
    pub fn new(
        service: Arc<dyn CartService>,
        page: SharedPage,
        cfg: PageConfig,
        notifier: Notifier,
        changes: broadcast::Sender<CartChanged>,
    ) -> Self {
        Self {
            service,
            page,
            cfg,
            view: Arc::new(Mutex::new(CartViewState::default())),
            notifier,
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
        self.changes.subscribe()
    }

    pub fn view_state(&self) -> CartViewState {
        self.page
            .with(|_| self.view.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    pub async fn add_item(&self, product_id: &str, quantity: u32) -> CartActionResult {
        let request = CartActionRequest::add(product_id, quantity);
        let result = self.submit(&request).await;

        match &result {
            CartActionResult::Success {
                snapshot,
                message,
                payload,
            } => {
                self.apply_snapshot(snapshot, |_| ());
                self.emit(&request, payload);
                self.notifier
                    .show(message.as_deref().unwrap_or(DEFAULT_SUCCESS_MESSAGE), Severity::Success);
            }
            CartActionResult::Failure(e) => {
                self.notifier.show(e.user_message(), Severity::Error);
            }
        }
        result
    }

    pub async fn remove_item(&self, product_id: &str) -> CartActionResult {
        let request = CartActionRequest::remove(product_id);
        let result = self.submit(&request).await;

        match &result {
            CartActionResult::Success {
                snapshot,
                message,
                payload,
            } => {
                let removed =
                    self.apply_snapshot(snapshot, |page| view::remove_item_row(page, &self.cfg, product_id));
                tracing::debug!(product_id, removed, "removed line item rows");
                self.emit(&request, payload);
                self.notifier
                    .show(message.as_deref().unwrap_or(DEFAULT_SUCCESS_MESSAGE), Severity::Success);
            }
            CartActionResult::Failure(e) => {
                self.notifier.show(e.user_message(), Severity::Error);
            }
        }
        result
    }

    /// Quantity edits never raise a notification, whatever the outcome.
    pub async fn update_item_quantity(&self, product_id: &str, quantity: u32) -> CartActionResult {
        let request = CartActionRequest::update(product_id, quantity);
        let result = self.submit(&request).await;

        if let CartActionResult::Success { snapshot, payload, .. } = &result {
            self.apply_snapshot(snapshot, |page| {
                if let Some(item_total) = snapshot.item_total {
                    view::render_item_total(page, &self.cfg, product_id, item_total);
                }
            });
            self.emit(&request, payload);
        }
        result
    }

    /// Re-reads the count and total from the service. Not a mutation, so no
    /// signal and no notification.
    pub async fn refresh_count(&self) -> CartActionResult {
        let request = CartActionRequest::count();
        let result = self.submit(&request).await;

        if let CartActionResult::Success { snapshot, .. } = &result {
            self.apply_snapshot(snapshot, |_| ());
        }
        result
    }

    pub async fn perform(&self, request: &CartActionRequest) -> CartActionResult {
        match request.kind {
            ActionKind::Add => self.add_item(&request.product_id, request.quantity.unwrap_or(1)).await,
            ActionKind::Remove => self.remove_item(&request.product_id).await,
            ActionKind::Update => {
                self.update_item_quantity(&request.product_id, request.quantity.unwrap_or(0))
                    .await
            }
            ActionKind::Count => self.refresh_count().await,
        }
    }

    async fn submit(&self, request: &CartActionRequest) -> CartActionResult {
        let token = self.page.with(|page| csrf_token(page, &self.cfg.csrf_field));
        if token.is_empty() {
            tracing::warn!(field = %self.cfg.csrf_field, "no csrf token on page, sending empty token");
        }

        let result = match self.service.execute(request, &token).await {
            Ok(payload) => parse_result(request.kind, payload),
            Err(e) => CartActionResult::Failure(e),
        };

        match &result {
            CartActionResult::Success { snapshot, .. } => tracing::info!(
                action = %request.kind,
                product_id = %request.product_id,
                cart_count = snapshot.item_count,
                cart_total = snapshot.cart_total,
                "cart request settled"
            ),
            CartActionResult::Failure(e) => tracing::warn!(
                action = %request.kind,
                product_id = %request.product_id,
                kind = ?e.kind(),
                error = %crate::unpack_error(e),
                "cart request failed"
            ),
        }
        result
    }

    /// Applies one settled reply: totals, the action's own page effect and
    /// the view state all change under a single page lock, so no other reply
    /// can land in between. Lock order is page, then view.
    fn apply_snapshot<R>(&self, snapshot: &CartSnapshot, effect: impl FnOnce(&mut Page) -> R) -> R {
        self.page.with(|page| {
            view::render_totals(page, &self.cfg, snapshot);
            let out = effect(page);
            self.view
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(snapshot.clone());
            out
        })
    }

    fn emit(&self, request: &CartActionRequest, payload: &serde_json::Value) {
        let event = CartChanged {
            action: request.kind,
            product_id: request.product_id.clone(),
            payload: payload.clone(),
        };
        // No listeners is fine.
        let _ = self.changes.send(event);
    }
}
