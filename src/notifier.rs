use chrono::Utc;
use std::time::Duration;

use crate::model::{Notification, Severity};
use crate::page::{Element, SharedPage};

/// How long every notification stays on the page.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_millis(3000);

/// Floating, self-dismissing messages.
///
/// Every notification gets its own removal timer. There is no cap, no
/// deduplication and no way to cancel a timer.
#[derive(Debug, Clone)]
pub struct Notifier {
    page: SharedPage,
    class: String,
}

impl Notifier {
    pub fn new(page: SharedPage, class: &str) -> Self {
        Self {
            page,
            class: class.to_string(),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&self, message: &str, severity: Severity) -> Notification {
        let element = Element::new("div")
            .with_class(&self.class)
            .with_class(&format!("{}-{}", self.class, severity.as_str()))
            .with_data("icon", severity.icon())
            .with_text(message);
        let id = self.page.with(|page| page.insert(element));
        tracing::info!(element = %id, severity = severity.as_str(), text = message, "showing notification");

        let page = self.page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(NOTIFICATION_LIFETIME).await;
            if page.with(|page| page.remove(id)) {
                tracing::debug!(element = %id, "notification dismissed");
            }
        });

        Notification {
            element: id,
            message: message.to_string(),
            severity,
            shown_at: Utc::now(),
            lifetime_ms: NOTIFICATION_LIFETIME.as_millis() as u64,
        }
    }
}
