#![allow(dead_code)]

use async_trait::async_trait;
use cartsync::config::Config;
use cartsync::error::SyncError;
use cartsync::model::CartActionRequest;
use cartsync::page::{Page, SharedPage};
use cartsync::service::CartService;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

pub const PAGE: &str = r#"
elements:
  - tag: input
    name: csrfmiddlewaretoken
    value: page-token
  - tag: span
    classes: [cart-count]
    text: "0"
  - tag: span
    classes: [cart-count]
    text: "0"
  - tag: span
    classes: [cart-total]
    text: KSh 0.00
  - tag: strong
    classes: [cart-total]
    text: KSh 0.00
  - tag: button
    classes: [add-to-cart-btn]
    data: { product-id: "3", quantity: "2" }
  - tag: tr
    classes: [cart-item-3]
  - tag: td
    classes: [item-total-3]
    text: KSh 100.00
  - tag: input
    classes: [quantity-input]
    data: { product-id: "3" }
    value: "1"
  - tag: a
    classes: [remove-from-cart-btn]
    data: { product-id: "3" }
  - tag: tr
    classes: [cart-item-4]
  - tag: td
    classes: [item-total-4]
    text: KSh 40.00
"#;

pub fn config() -> Config {
    Config::from_yaml("service:\n  base_url: http://shop.test\n").expect("test config")
}

pub fn page() -> SharedPage {
    SharedPage::new(Page::from_yaml(PAGE).expect("test page"))
}

pub fn texts(page: &SharedPage, class: &str) -> Vec<String> {
    page.with(|p| p.texts_of_class(class).into_iter().map(|s| s.to_string()).collect())
}

pub fn notification_count(page: &SharedPage) -> usize {
    page.with(|p| p.select_class("cart-notification").len())
}

pub fn snapshot(count: u32, total: f64) -> Value {
    json!({"success": true, "message": "Cart updated.", "cart_count": count, "cart_total": total})
}

pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Replies from a fixed script, recording every call it gets.
#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<Value, SyncError>>>,
    calls: Mutex<Vec<(CartActionRequest, String)>>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Result<Value, SyncError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(CartActionRequest, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CartService for ScriptedService {
    async fn execute(&self, request: &CartActionRequest, csrf_token: &str) -> Result<Value, SyncError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), csrf_token.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Transport("script exhausted".to_string())))
    }
}

pub type Pending = (CartActionRequest, oneshot::Sender<Result<Value, SyncError>>);

/// Holds every request until the test releases its reply.
pub struct GatedService {
    pending: mpsc::UnboundedSender<Pending>,
}

impl GatedService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Pending>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { pending: tx }, rx)
    }
}

#[async_trait]
impl CartService for GatedService {
    async fn execute(&self, request: &CartActionRequest, _csrf_token: &str) -> Result<Value, SyncError> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .send((request.clone(), tx))
            .map_err(|_| SyncError::Transport("gate closed".to_string()))?;
        rx.await
            .map_err(|_| SyncError::Transport("reply dropped".to_string()))?
    }
}
