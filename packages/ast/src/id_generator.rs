use crate::ast::AstNode;
use crc32fast::Hasher;
use std::collections::HashSet;
use std::sync::Arc;

/// Generate a scope ID (scenario, iteration, edit target) using CRC32
pub fn get_scope_id(scope: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(scope.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for AST nodes within one editing session.
///
/// The counter only moves forward, so an id handed out once is never
/// produced again, even after the node carrying it was deleted.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Scope ID (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(scope: &str) -> Self {
        Self {
            seed: get_scope_id(scope),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get scope ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Copy of `node` where every node carries a fresh id
    pub fn stamp(&mut self, node: &AstNode) -> AstNode {
        AstNode {
            id: self.new_id(),
            kind: node.kind.clone(),
            children: node
                .children
                .iter()
                .map(|c| Arc::new(self.stamp(c)))
                .collect(),
            named_arguments: node
                .named_arguments
                .iter()
                .map(|(k, v)| (k.clone(), Arc::new(self.stamp(v))))
                .collect(),
        }
    }

    /// Copy of `node` that keeps existing ids where they are unique and
    /// assigns fresh ones to blank or duplicated ids.
    ///
    /// Ids minted by this generator that are already present push the
    /// counter past them, so later ids cannot collide.
    pub fn normalize(&mut self, node: &AstNode) -> AstNode {
        self.observe(node);
        let mut seen = HashSet::new();
        self.normalize_inner(node, &mut seen)
    }

    fn normalize_inner(&mut self, node: &AstNode, seen: &mut HashSet<String>) -> AstNode {
        let id = if node.id.is_empty() || !seen.insert(node.id.clone()) {
            self.new_id()
        } else {
            node.id.clone()
        };
        AstNode {
            id,
            kind: node.kind.clone(),
            children: node
                .children
                .iter()
                .map(|c| Arc::new(self.normalize_inner(c, seen)))
                .collect(),
            named_arguments: node
                .named_arguments
                .iter()
                .map(|(k, v)| (k.clone(), Arc::new(self.normalize_inner(v, seen))))
                .collect(),
        }
    }

    fn observe(&mut self, node: &AstNode) {
        let prefix = format!("{}-", self.seed);
        let mut highest = self.count;
        node.walk(&mut |_, n| {
            if let Some(n) = n.id.strip_prefix(&prefix).and_then(|s| s.parse::<u64>().ok()) {
                highest = highest.max(n);
            }
        });
        self.count = highest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_id_generation() {
        let id1 = get_scope_id("scenario-1/iteration-1/trigger");
        let id2 = get_scope_id("scenario-1/iteration-1/trigger");

        // Same scope always generates same ID
        assert_eq!(id1, id2);

        // Different scopes generate different IDs
        let id3 = get_scope_id("scenario-1/iteration-1/rule:r1");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("scope");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id3.ends_with("-3"));

        let seed = gen.seed();
        assert!(id1.starts_with(seed));
        assert!(id3.starts_with(seed));
    }

    #[test]
    fn test_stamp_assigns_every_node() {
        let mut gen = IdGenerator::from_seed("s".to_string());
        let tree = AstNode::and(vec![AstNode::boolean(true), AstNode::undefined()]);

        let stamped = gen.stamp(&tree);

        assert_eq!(stamped.id, "s-1");
        assert_eq!(stamped.children[0].id, "s-2");
        assert_eq!(stamped.children[1].id, "s-3");
    }

    #[test]
    fn test_normalize_keeps_unique_ids_and_skips_past_them() {
        let mut gen = IdGenerator::from_seed("s".to_string());
        let mut left = AstNode::boolean(true);
        left.id = "s-7".to_string();
        let mut right = AstNode::boolean(false);
        right.id = "s-7".to_string();
        let tree = AstNode::and(vec![left, right]);

        let normalized = gen.normalize(&tree);

        assert_eq!(normalized.id, "s-8");
        assert_eq!(normalized.children[0].id, "s-7");
        assert_eq!(normalized.children[1].id, "s-9");
    }
}
