//! Cart view state and its rendering onto the page.

use serde::Serialize;

use crate::config::PageConfig;
use crate::model::CartSnapshot;
use crate::page::Page;

/// What the page is currently showing. Only ever replaced by a snapshot from
/// the cart service, never computed locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartViewState {
    pub snapshot: Option<CartSnapshot>,
    pub revision: u64,
}

impl CartViewState {
    pub fn apply(&mut self, snapshot: CartSnapshot) {
        self.snapshot = Some(snapshot);
        self.revision += 1;
    }
}

pub fn format_currency(prefix: &str, amount: f64) -> String {
    format!("{} {:.2}", prefix, amount)
}

/// Writes the count and total into every badge and total display.
pub fn render_totals(page: &mut Page, cfg: &PageConfig, snapshot: &CartSnapshot) {
    page.set_text_by_class(&cfg.count_badge, &snapshot.item_count.to_string());
    page.set_text_by_class(&cfg.total_display, &format_currency(&cfg.currency_prefix, snapshot.cart_total));
}

pub fn render_item_total(page: &mut Page, cfg: &PageConfig, product_id: &str, item_total: f64) -> usize {
    page.set_text_by_class(
        &cfg.item_total_class(product_id),
        &format_currency(&cfg.currency_prefix, item_total),
    )
}

pub fn remove_item_row(page: &mut Page, cfg: &PageConfig, product_id: &str) -> usize {
    page.remove_by_class(&cfg.item_row_class(product_id))
}
