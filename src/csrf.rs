use crate::page::Page;

/// Reads the anti-forgery token from the hidden form field named `field`.
///
/// A page without the field yields an empty token; the cart service is the
/// one that rejects it.
pub fn csrf_token(page: &Page, field: &str) -> String {
    page.find_by_name(field)
        .and_then(|id| page.get(id))
        .and_then(|el| el.value.clone())
        .unwrap_or_default()
}
