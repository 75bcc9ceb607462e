//! Parse-time notifications.
//!
//! Callers subscribe callbacks per [`NodeCategory`]. Each node is handed to
//! the matching callbacks exactly once, when it is finished, and never if
//! the parser backtracks over it.

use crate::nodes::{Node, NodeCategory, NodeId};

type Callback<'l> = Box<dyn FnMut(NodeId, &Node) + 'l>;

#[derive(Default)]
pub struct Listeners<'l> {
    subscribers: Vec<(NodeCategory, Callback<'l>)>,
}

impl<'l> Listeners<'l> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to nodes of `category`.
    pub fn on(
        &mut self,
        category: NodeCategory,
        callback: impl FnMut(NodeId, &Node) + 'l,
    ) -> &mut Self {
        self.subscribers.push((category, Box::new(callback)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Listeners<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Receiver of finished nodes.
pub(crate) trait Publish {
    fn publish(&mut self, id: NodeId, node: &Node);
}

impl Publish for () {
    fn publish(&mut self, _id: NodeId, _node: &Node) {}
}

impl Publish for Listeners<'_> {
    fn publish(&mut self, id: NodeId, node: &Node) {
        let Some(category) = node.kind().category() else {
            return;
        };
        for (subscribed, callback) in &mut self.subscribers {
            if *subscribed == category {
                callback(id, node);
            }
        }
    }
}
