//! Content tree client model
//!
//! A read-mostly snapshot of the subject→chapter→topic→question hierarchy.
//! Every successful mutation anywhere in the tree goes through
//! `invalidate_and_reload` — the snapshot is rebuilt wholesale, never
//! patched in place, so the client can never diverge from server-side
//! cascades. Expansion state lives beside the snapshot and survives every
//! reload; only explicit toggles change it.

use std::collections::HashMap;

use qbank_common::api::types::SubjectNode;

use crate::gateway::{ClientError, Gateway};

/// Identity of an expandable node. Typed rather than stringly keyed so a
/// subject and a chapter with the same row id can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Subject(i64),
    Chapter(i64),
    Topic(i64),
    Question(i64),
}

/// Content tree snapshot plus per-node expansion state.
#[derive(Debug, Default)]
pub struct ContentTree {
    snapshot: Vec<SubjectNode>,
    expanded: HashMap<NodeKey, bool>,
    loaded: bool,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full hierarchy and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place
    /// (stale-but-available) and the error is returned for display. No
    /// automatic retry: the next mutation or user-initiated refresh is the
    /// recovery path.
    pub async fn load(&mut self, gateway: &impl Gateway) -> Result<(), ClientError> {
        let tree = gateway.fetch_tree().await?;
        self.snapshot = tree;
        self.loaded = true;
        Ok(())
    }

    /// Rebuild the snapshot after a successful mutation. Expansion state is
    /// untouched.
    pub async fn invalidate_and_reload(&mut self, gateway: &impl Gateway) -> Result<(), ClientError> {
        self.load(gateway).await
    }

    /// True once at least one load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn subjects(&self) -> &[SubjectNode] {
        &self.snapshot
    }

    /// Flip a node's expansion. The only way expansion state changes.
    pub fn toggle(&mut self, key: NodeKey) {
        let entry = self.expanded.entry(key).or_insert(false);
        *entry = !*entry;
    }

    pub fn set_expanded(&mut self, key: NodeKey, expanded: bool) {
        self.expanded.insert(key, expanded);
    }

    /// Nodes start collapsed.
    pub fn is_expanded(&self, key: NodeKey) -> bool {
        self.expanded.get(&key).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::RecordingGateway;
    use qbank_common::models::Subject;

    fn subjects(names: &[&str]) -> Vec<SubjectNode> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| SubjectNode {
                subject: Subject {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    description: None,
                },
                chapters: vec![],
            })
            .collect()
    }

    #[tokio::test]
    async fn test_load_replaces_snapshot() {
        let gateway = RecordingGateway::with_tree(subjects(&["Biology", "Chemistry"]));
        let mut tree = ContentTree::new();

        tree.load(&gateway).await.unwrap();
        assert!(tree.is_loaded());
        assert_eq!(tree.subjects().len(), 2);
        assert_eq!(tree.subjects()[0].subject.name, "Biology");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let gateway = RecordingGateway::with_tree(subjects(&["Biology"]));
        let mut tree = ContentTree::new();

        tree.load(&gateway).await.unwrap();
        gateway.set_fail(true);
        let result = tree.invalidate_and_reload(&gateway).await;

        assert!(result.is_err());
        // Stale-but-available: the old snapshot is still rendered.
        assert_eq!(tree.subjects().len(), 1);
        assert!(tree.is_loaded());
    }

    #[tokio::test]
    async fn test_reload_preserves_expansion_state() {
        let gateway = RecordingGateway::with_tree(subjects(&["Biology", "Chemistry"]));
        let mut tree = ContentTree::new();
        tree.load(&gateway).await.unwrap();

        tree.toggle(NodeKey::Subject(1));
        tree.toggle(NodeKey::Chapter(4));
        tree.toggle(NodeKey::Question(9));
        tree.toggle(NodeKey::Question(9)); // collapsed again

        for _ in 0..3 {
            tree.invalidate_and_reload(&gateway).await.unwrap();
        }

        assert!(tree.is_expanded(NodeKey::Subject(1)));
        assert!(tree.is_expanded(NodeKey::Chapter(4)));
        assert!(!tree.is_expanded(NodeKey::Question(9)));
        // Untouched nodes stay collapsed.
        assert!(!tree.is_expanded(NodeKey::Topic(2)));
    }

    #[test]
    fn test_node_keys_do_not_collide_across_kinds() {
        let mut tree = ContentTree::new();
        tree.set_expanded(NodeKey::Subject(3), true);
        assert!(!tree.is_expanded(NodeKey::Chapter(3)));
        assert!(!tree.is_expanded(NodeKey::Question(3)));
    }
}
