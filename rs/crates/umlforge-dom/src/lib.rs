//! umlforge-dom: DomNode tree shared by the view, the HTML renderer and the
//! browser script
//!
//! The view produces a `DomNode` tree; the server sends it to the browser as a
//! JSON snapshot (`{"root": ...}`) and renders it to HTML for first paint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single node in the view tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    /// HTML tag name (e.g. "div", "button", "img")
    pub tag: String,

    /// Stable identity, lets the browser script keep focused inputs alive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// HTML attributes (class, src, placeholder, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<HashMap<String, String>>,

    /// Map of DOM event name → action name (e.g. "click" → "generate")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<HashMap<String, String>>,

    /// Text content for leaf nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DomNode>>,
}

/// A complete snapshot wrapping the root DomNode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub root: DomNode,
}

impl DomNode {
    /// Bare element with no attributes, events or children.
    pub fn element(tag: &str) -> Self {
        DomNode {
            tag: tag.to_string(),
            key: None,
            attrs: None,
            events: None,
            text: None,
            children: None,
        }
    }

    /// Create a simple text node
    pub fn text(tag: &str, content: &str) -> Self {
        Self::element(tag).with_text(content)
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Bind a DOM event to an action name.
    pub fn on(mut self, event: &str, action: &str) -> Self {
        self.events
            .get_or_insert_with(HashMap::new)
            .insert(event.to_string(), action.to_string());
        self
    }

    pub fn with_text(mut self, content: &str) -> Self {
        self.text = Some(content.to_string());
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.get_or_insert_with(Vec::new).extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(name).map(|s| s.as_str())
    }

    /// Iterate over children (empty slice if none)
    pub fn children_iter(&self) -> &[DomNode] {
        match &self.children {
            Some(c) => c,
            None => &[],
        }
    }

    /// Get an event action by event name
    pub fn event(&self, name: &str) -> Option<&str> {
        self.events.as_ref()?.get(name).map(|s| s.as_str())
    }

    /// Depth-first search for the first node carrying `key`.
    pub fn find_key(&self, key: &str) -> Option<&DomNode> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children_iter().iter().find_map(|c| c.find_key(key))
    }

    /// Depth-first search for the first node with the given tag.
    pub fn find_tag(&self, tag: &str) -> Option<&DomNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.children_iter().iter().find_map(|c| c.find_tag(tag))
    }
}

impl Snapshot {
    pub fn new(root: DomNode) -> Self {
        Snapshot { root }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
