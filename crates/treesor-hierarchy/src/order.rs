use serde::{Deserialize, Serialize};

/// Order in which descendants are enumerated.
///
/// Both orders are pre-order: a node always comes before its own
/// descendants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Each subtree is finished before the next sibling starts.
    #[default]
    DepthFirst,
    /// All nodes at one depth before any node at the next depth.
    BreadthFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_depth_first() {
        assert_eq!(TraversalOrder::default(), TraversalOrder::DepthFirst);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&TraversalOrder::BreadthFirst).unwrap();
        assert_eq!(json, "\"breadth_first\"");
    }
}
