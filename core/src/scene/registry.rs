use std::collections::HashMap;

/// Child-index path from the scene root to a node.
///
/// The empty path designates the root itself.
pub type NodePath = Vec<usize>;

/// Name to node lookup.
///
/// Registering a name twice overwrites the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    entries: HashMap<String, NodePath>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` at `path`. Empty names are ignored.
    pub fn register(&mut self, name: &str, path: NodePath) {
        if name.is_empty() {
            return;
        }
        if let Some(previous) = self.entries.insert(name.to_owned(), path) {
            log::debug!("Name '{name}' re-registered, replacing node at {previous:?}");
        }
    }

    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Re-root every path after the root's only child was promoted.
    ///
    /// Paths below child `0` lose their first element; any other path no
    /// longer exists and is dropped.
    pub(crate) fn promote_first_child(&mut self) {
        self.entries.retain(|_, path| {
            if path.first() == Some(&0) {
                path.remove(0);
                true
            } else {
                false
            }
        });
    }
}
