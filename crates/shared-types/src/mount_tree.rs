//! # In-Memory Mount Tree
//!
//! A minimal rendering surface: a tree of named nodes with attributes and
//! text content. It implements [`TargetHandle`] for every node and
//! [`TargetResolver`] for the tree, so the runtime works without a browser.
//!
//! Selector syntax understood by [`MountTree::resolve`]:
//!
//! | Selector        | Matches                                  |
//! |-----------------|------------------------------------------|
//! | `#app` / `app`  | node whose id is `app`                   |
//! | `[attr]`        | first node carrying `attr`               |
//! | `[attr=value]`  | first node whose `attr` equals `value`   |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use crate::markup::{Markup, MountSpec};
use crate::target::{HandleId, Target, TargetHandle, TargetResolver};

/// A node in the in-memory tree.
pub struct MountNode {
    handle_id: HandleId,
    id: String,
    is_root: bool,
    attributes: RwLock<BTreeMap<String, String>>,
    content: RwLock<String>,
    children: RwLock<Vec<Arc<MountNode>>>,
    parent: RwLock<Weak<MountNode>>,
    this: Weak<MountNode>,
    ids: Arc<AtomicU64>,
}

impl MountNode {
    fn create(id: &str, is_root: bool, ids: Arc<AtomicU64>) -> Arc<Self> {
        let handle_id = HandleId(ids.fetch_add(1, Ordering::Relaxed));
        Arc::new_cyclic(|this| Self {
            handle_id,
            id: id.to_string(),
            is_root,
            attributes: RwLock::new(BTreeMap::new()),
            content: RwLock::new(String::new()),
            children: RwLock::new(Vec::new()),
            parent: RwLock::new(Weak::new()),
            this: this.clone(),
            ids,
        })
    }

    /// Element id of this node.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn children(&self) -> Vec<Arc<MountNode>> {
        self.children.read().clone()
    }

    /// Append a new child built from `spec` (recursively).
    pub fn append(&self, spec: &MountSpec) -> Arc<MountNode> {
        let child = Self::create(&spec.id, false, Arc::clone(&self.ids));
        child.attributes.write().extend(spec.attributes.clone());
        for grandchild in &spec.children {
            child.append(grandchild);
        }
        *child.parent.write() = self.this.clone();
        self.children.write().push(Arc::clone(&child));
        child
    }

    /// Remove this node from its parent. Returns `false` if already detached.
    pub fn detach(&self) -> bool {
        let parent = std::mem::take(&mut *self.parent.write());
        let Some(parent) = parent.upgrade() else {
            return false;
        };
        parent
            .children
            .write()
            .retain(|child| child.handle_id != self.handle_id);
        debug!(node = %self.id, "Mount node detached");
        true
    }

    fn collect_descendants(&self, out: &mut Vec<Arc<MountNode>>) {
        for child in self.children.read().iter() {
            out.push(Arc::clone(child));
            child.collect_descendants(out);
        }
    }

    fn find(&self, predicate: &dyn Fn(&MountNode) -> bool) -> Option<Arc<MountNode>> {
        for child in self.children.read().iter() {
            if predicate(child) {
                return Some(Arc::clone(child));
            }
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }
}

impl fmt::Debug for MountNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountNode")
            .field("handle_id", &self.handle_id)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl TargetHandle for MountNode {
    fn handle_id(&self) -> HandleId {
        self.handle_id
    }

    fn label(&self) -> String {
        format!("#{}", self.id)
    }

    fn is_connected(&self) -> bool {
        if self.is_root {
            return true;
        }
        let mut current = self.parent.read().upgrade();
        while let Some(node) = current {
            if node.is_root {
                return true;
            }
            current = node.parent.read().upgrade();
        }
        false
    }

    fn render(&self, markup: Markup) {
        let previous = std::mem::take(&mut *self.children.write());
        for child in &previous {
            *child.parent.write() = Weak::new();
        }
        *self.content.write() = markup.html;
        for spec in &markup.mounts {
            self.append(spec);
        }
    }

    fn content(&self) -> String {
        self.content.read().clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .write()
            .insert(name.to_string(), value.to_string());
    }

    fn descendants(&self) -> Vec<Target> {
        let mut nodes = Vec::new();
        self.collect_descendants(&mut nodes);
        nodes.into_iter().map(|node| node as Target).collect()
    }
}

/// In-memory tree of mount points rooted at a synthetic document node.
pub struct MountTree {
    root: Arc<MountNode>,
}

impl MountTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: MountNode::create("document", true, Arc::new(AtomicU64::new(1))),
        }
    }

    #[must_use]
    pub fn root(&self) -> Arc<MountNode> {
        Arc::clone(&self.root)
    }

    /// Append a bare node with `id` directly under the root.
    pub fn append_to_root(&self, id: &str) -> Target {
        self.root.append(&MountSpec::new(id))
    }

    /// Look a connected node up by handle identity.
    #[must_use]
    pub fn node(&self, handle_id: HandleId) -> Option<Arc<MountNode>> {
        self.root.find(&|node| node.handle_id == handle_id)
    }

    /// Detach the node behind `target` from the tree.
    pub fn detach(&self, target: &Target) -> bool {
        self.node(target.handle_id())
            .is_some_and(|node| node.detach())
    }

    fn find_by_attribute(&self, name: &str, value: Option<&str>) -> Option<Arc<MountNode>> {
        self.root.find(&|node| match (node.attributes.read().get(name), value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

impl Default for MountTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetResolver for MountTree {
    fn resolve(&self, selector: &str) -> Option<Target> {
        let selector = selector.trim();
        let found = if let Some(inner) = selector
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            match inner.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    self.find_by_attribute(name.trim(), Some(value))
                }
                None => self.find_by_attribute(inner.trim(), None),
            }
        } else {
            let id = selector.strip_prefix('#').unwrap_or(selector);
            if id.is_empty() {
                return None;
            }
            self.root.find(&|node| node.id == id)
        };
        found.map(|node| node as Target)
    }
}
