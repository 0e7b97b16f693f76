//! Event bindings for the cart controls on a page.
//!
//! Bindings are taken once, when the controller starts. Elements inserted
//! afterwards stay unbound until a new controller is built for the page.

use serde::Serialize;

use crate::config::PageConfig;
use crate::model::{ActionKind, CartActionRequest};
use crate::page::{ElementId, Page};

pub const PRODUCT_ID_ATTR: &str = "product-id";
pub const QUANTITY_ATTR: &str = "quantity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEvent {
    pub target: ElementId,
    pub kind: EventKind,
}

impl PageEvent {
    pub fn click(target: ElementId) -> Self {
        PageEvent {
            target,
            kind: EventKind::Click,
        }
    }

    pub fn change(target: ElementId) -> Self {
        PageEvent {
            target,
            kind: EventKind::Change,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub element: ElementId,
    pub event: EventKind,
    pub intent: ActionKind,
}

#[derive(Debug, Clone, Default)]
pub struct Binder {
    bindings: Vec<Binding>,
}

impl Binder {
    pub fn bind(page: &Page, cfg: &PageConfig) -> Self {
        let mut bindings = Vec::new();
        let groups = [
            (&cfg.add_trigger, EventKind::Click, ActionKind::Add),
            (&cfg.quantity_input, EventKind::Change, ActionKind::Update),
            (&cfg.remove_trigger, EventKind::Click, ActionKind::Remove),
        ];
        for (class, event, intent) in groups {
            for element in page.select_class(class) {
                bindings.push(Binding { element, event, intent });
            }
        }

        tracing::info!(bound = bindings.len(), "cart controls bound");
        Binder { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding_for(&self, event: PageEvent) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.element == event.target && b.event == event.kind)
    }

    /// Reads the element's attributes as they are right now and builds the
    /// request the bound intent asks for.
    pub fn intent_for(&self, page: &Page, event: PageEvent) -> Option<CartActionRequest> {
        let binding = self.binding_for(event)?;
        let Some(element) = page.get(binding.element) else {
            tracing::debug!(element = %binding.element, "bound element no longer on page");
            return None;
        };

        let Some(product_id) = element.data(PRODUCT_ID_ATTR).filter(|id| !id.is_empty()) else {
            tracing::warn!(element = %binding.element, intent = %binding.intent, "element has no product id");
            return None;
        };

        match binding.intent {
            ActionKind::Add => {
                let quantity = element
                    .data(QUANTITY_ATTR)
                    .and_then(|q| q.trim().parse::<u32>().ok())
                    .filter(|q| *q > 0)
                    .unwrap_or(1);
                Some(CartActionRequest::add(product_id, quantity))
            }
            ActionKind::Update => {
                let raw = element.value.as_deref().unwrap_or("");
                match raw.trim().parse::<u32>() {
                    Ok(quantity) => Some(CartActionRequest::update(product_id, quantity)),
                    Err(_) => {
                        tracing::warn!(element = %binding.element, value = raw, "quantity input is not a number");
                        None
                    }
                }
            }
            ActionKind::Remove => Some(CartActionRequest::remove(product_id)),
            ActionKind::Count => None,
        }
    }
}
