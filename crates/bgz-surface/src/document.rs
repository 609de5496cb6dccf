//! Element lookup: resolving a selector to a drawable target

use crate::surface::{Surface, SurfaceRef};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A resolved element
#[derive(Clone)]
pub enum Element {
    /// A canvas with its 2D surface
    Canvas(SurfaceRef),
    /// Any other element, identified by lower-case tag name
    Other { tag: String },
}

impl Element {
    pub fn tag(&self) -> &str {
        match self {
            Element::Canvas(_) => "canvas",
            Element::Other { tag } => tag,
        }
    }

    pub fn is_canvas(&self) -> bool {
        matches!(self, Element::Canvas(_))
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.tag())
    }
}

/// Resolves selectors to elements
pub trait ElementLookup {
    fn query_selector(&self, selector: &str) -> Option<Element>;
}

/// In-memory element registry keyed by exact selector string
#[derive(Default)]
pub struct Document {
    elements: HashMap<String, Element>,
    lookups: Cell<usize>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canvas under `selector`, returning typed access to its surface
    pub fn insert_canvas<S: Surface + 'static>(
        &mut self,
        selector: impl Into<String>,
        surface: S,
    ) -> Rc<RefCell<S>> {
        let shared = Rc::new(RefCell::new(surface));
        let as_dyn: SurfaceRef = shared.clone();
        self.elements.insert(selector.into(), Element::Canvas(as_dyn));
        shared
    }

    /// Register a non-canvas element
    pub fn insert_element(&mut self, selector: impl Into<String>, tag: impl Into<String>) {
        self.elements.insert(
            selector.into(),
            Element::Other {
                tag: tag.into().to_ascii_lowercase(),
            },
        );
    }

    /// Remove an element; a canvas surface stays alive only while loops borrow it
    pub fn remove(&mut self, selector: &str) -> Option<Element> {
        self.elements.remove(selector)
    }

    /// How many lookups have been made against this document
    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }
}

impl ElementLookup for Document {
    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.lookups.set(self.lookups.get() + 1);
        self.elements.get(selector.trim()).cloned()
    }
}
