use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use treesor_types::{NodeId, Path};

/// A node as seen by callers: where it is and who it is.
///
/// Items are derived views and are not stored. Two items are equal when
/// their identities are equal, whatever their paths; an item fetched before
/// a rename equals the one fetched after it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub path: Path,
    pub id: NodeId,
}

impl Item {
    pub fn new(path: Path, id: NodeId) -> Self {
        Self { path, id }
    }
}

impl From<(Path, NodeId)> for Item {
    fn from((path, id): (Path, NodeId)) -> Self {
        Self { path, id }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.id.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(item: &Item) -> u64 {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn items_are_equal_if_ids_are_equal() {
        let id = NodeId::generate();
        let a = Item::new(Path::parse("a"), id);
        let b = Item::new(Path::parse("b"), id);
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn items_with_equal_ids_hash_equal() {
        let id = NodeId::generate();
        let a = Item::new(Path::parse("a"), id);
        let b = Item::new(Path::parse("b"), id);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn items_with_different_ids_differ() {
        let a = Item::new(Path::parse("a"), NodeId::generate());
        let b = Item::new(Path::parse("a"), NodeId::generate());
        assert_ne!(a, b);
    }
}
