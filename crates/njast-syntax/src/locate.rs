//! Position queries.

use njast_core::Position;

use crate::ast::Ast;
use crate::nodes::NodeId;

impl Ast {
    /// The most specific node whose span contains `line`/`ch`.
    ///
    /// The root also answers for the position just past its end, so a cursor
    /// at the end of the buffer resolves. Returns `None` outside the root.
    ///
    /// # Panics
    ///
    /// If two siblings both contain the position, which means the parser
    /// produced overlapping spans.
    pub fn locate(&self, line: u32, ch: u32) -> Option<NodeId> {
        self.locate_at(Position::new(line, ch))
    }

    pub fn locate_at(&self, pos: Position) -> Option<NodeId> {
        let root = self.span(self.root);
        if pos < root.start || pos > root.end {
            return None;
        }

        let mut current = self.root;
        loop {
            let mut matches = self
                .children(current)
                .into_iter()
                .filter(|&child| self.span(child).contains(pos));
            let Some(found) = matches.next() else {
                return Some(current);
            };
            if let Some(other) = matches.next() {
                panic!(
                    "overlapping siblings at {pos}: {} {} and {} {}",
                    self.kind(found).name(),
                    self.span(found),
                    self.kind(other).name(),
                    self.span(other),
                );
            }
            current = found;
        }
    }
}
