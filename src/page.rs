//! In-memory page model.
//!
//! Stands in for the browser DOM: an ordered set of elements addressable by
//! id, class or form field name. The initial markup is loaded from a YAML
//! fixture, the way the server-side template would have rendered it.
//!
//! ```yaml
//! elements:
//!   - tag: input
//!     name: csrfmiddlewaretoken
//!     value: abc123
//!   - tag: span
//!     classes: [cart-count]
//!     text: "0"
//!   - tag: button
//!     classes: [add-to-cart-btn]
//!     data: { product-id: "7", quantity: "2" }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub classes: BTreeSet<String>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub text: String,
}

fn default_tag() -> String {
    "div".to_string()
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Default, Serialize)]
pub struct Page {
    elements: BTreeMap<ElementId, Element>,
    #[serde(skip)]
    next_id: u64,
}

impl Page {
    pub fn new() -> Self {
        Page::default()
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let fixture: Fixture = serde_yaml::from_str(yaml_str)?;
        let mut page = Page::new();
        for element in fixture.elements {
            page.insert(element);
        }
        Ok(page)
    }

    pub fn load(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Page::from_yaml(&yaml_str)
    }

    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, element);
        id
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        self.elements.remove(&id).is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Ids of every element carrying `class`, in document order.
    pub fn select_class(&self, class: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, el)| el.has_class(class))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, el)| el.name.as_deref() == Some(name))
            .map(|(id, _)| *id)
    }

    pub fn texts_of_class(&self, class: &str) -> Vec<&str> {
        self.elements
            .values()
            .filter(|el| el.has_class(class))
            .map(|el| el.text.as_str())
            .collect()
    }

    /// Returns how many elements were touched.
    pub fn set_text_by_class(&mut self, class: &str, text: &str) -> usize {
        let mut touched = 0;
        for el in self.elements.values_mut().filter(|el| el.has_class(class)) {
            el.text = text.to_string();
            touched += 1;
        }
        touched
    }

    pub fn remove_by_class(&mut self, class: &str) -> usize {
        let before = self.elements.len();
        self.elements.retain(|_, el| !el.has_class(class));
        before - self.elements.len()
    }

    pub fn set_data(&mut self, id: ElementId, key: &str, value: &str) -> bool {
        match self.elements.get_mut(&id) {
            Some(el) => {
                el.data.insert(key.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, id: ElementId, value: &str) -> bool {
        match self.elements.get_mut(&id) {
            Some(el) => {
                el.value = Some(value.to_string());
                true
            }
            None => false,
        }
    }
}

/// Page handle shared by the controller, in-flight requests and notification
/// timers. The lock is only ever held inside `with`, never across an await.
#[derive(Debug, Clone, Default)]
pub struct SharedPage(Arc<Mutex<Page>>);

impl SharedPage {
    pub fn new(page: Page) -> Self {
        SharedPage(Arc::new(Mutex::new(page)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        let mut page = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut page)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.with(|page| serde_json::to_value(&*page).unwrap_or(serde_json::Value::Null))
    }
}
