use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub mod event;
pub mod selector;

pub use event::{EventKind, ListenerId};
pub use selector::{Selector, SelectorError};

use event::Listeners;

#[derive(Default)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    children: Vec<Element>,
    parent: Weak<RefCell<Node>>,
    listeners: Listeners,
}

#[derive(Clone)]
pub struct Element(Rc<RefCell<Node>>);

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0.borrow();
        write!(f, "<{}", node.tag)?;
        if let Some(id) = &node.id {
            write!(f, "#{id}")?;
        }
        for class in &node.classes {
            write!(f, ".{class}")?;
        }
        write!(f, ">")
    }
}

impl Element {
    pub fn create(tag: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(Node {
            tag: tag.into().to_ascii_lowercase(),
            ..Node::default()
        })))
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_style(self, name: &str, value: impl Into<String>) -> Self {
        self.set_style(name, value);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.0.borrow_mut().text = text.into();
        self
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn id(&self) -> Option<String> {
        self.0.borrow().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().id = Some(id.into());
    }

    // -- tree --

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.borrow().children.clone()
    }

    pub fn root(&self) -> Element {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(el) = current {
            if el == *self {
                return true;
            }
            current = el.parent();
        }
        false
    }

    // appending an ancestor of `self` is ignored
    pub fn append_child(&self, child: &Element) {
        if child.contains(self) {
            log::warn!("Refusing to append {:?} into its own subtree", child);
            return;
        }
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| c != self);
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        for child in self.children() {
            out.push(child.clone());
            out.extend(child.descendants());
        }
        out
    }

    // -- text --

    pub fn text_content(&self) -> String {
        let node = self.0.borrow();
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&child.text_content());
        }
        text
    }

    pub fn set_text_content(&self, text: impl Into<String>) {
        self.clear_children();
        self.0.borrow_mut().text = text.into();
    }

    // -- classes --

    pub fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.borrow_mut().classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    // -- attributes --

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.borrow().attrs.get(name).cloned()
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.0.borrow().attrs.contains_key(name)
    }

    pub fn set_attr(&self, name: &str, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .attrs
            .insert(name.to_string(), value.into());
    }

    pub fn remove_attr(&self, name: &str) {
        self.0.borrow_mut().attrs.remove(name);
    }

    // -- inline style --

    pub fn style(&self, name: &str) -> Option<String> {
        self.0.borrow().style.get(name).cloned()
    }

    pub fn set_style(&self, name: &str, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .style
            .insert(name.to_string(), value.into());
    }

    pub fn remove_style(&self, name: &str) {
        self.0.borrow_mut().style.remove(name);
    }

    // -- queries --

    pub fn find(&self, selector: &Selector) -> Option<Element> {
        self.descendants().into_iter().find(|el| selector.matches(el))
    }

    pub fn find_all(&self, selector: &Selector) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|el| selector.matches(el))
            .collect()
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, SelectorError> {
        Ok(self.find(&selector.parse()?))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, SelectorError> {
        Ok(self.find_all(&selector.parse()?))
    }

    // -- events --

    pub fn add_listener(&self, kind: EventKind, handler: impl Fn(&Element) + 'static) -> ListenerId {
        self.0
            .borrow_mut()
            .listeners
            .insert(kind, Rc::new(handler))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.0.borrow_mut().listeners.remove(id)
    }

    pub fn clear_listeners(&self) {
        self.0.borrow_mut().listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    /// Runs every handler registered for `kind` and returns how many ran.
    pub fn dispatch(&self, kind: EventKind) -> usize {
        let handlers = self.0.borrow().listeners.handlers_for(kind);
        for handler in &handlers {
            handler(self);
        }
        handlers.len()
    }
}
