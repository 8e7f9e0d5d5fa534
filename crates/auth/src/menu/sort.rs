use serde::{Deserialize, Serialize};

use super::MenuNode;

/// Sibling ordering over the sort key.
///
/// Parsing never fails: anything that is not `desc` means [`SortDirection::Asc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl From<&str> for SortDirection {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortDirection> for String {
    fn from(value: SortDirection) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders every sibling list of a tree.
///
/// Keys compare as plain strings (byte-wise lexicographic), so `"10"` sorts
/// before `"9"`. Equal keys keep their input order in both directions.
pub struct TreeSorter;

impl TreeSorter {
    /// Sort `nodes` in place, then every sibling list below them.
    ///
    /// Walks the tree with an explicit stack, so depth is not limited by the
    /// call stack.
    pub fn sort(nodes: &mut [MenuNode], direction: SortDirection) {
        let mut pending: Vec<&mut [MenuNode]> = vec![nodes];
        while let Some(siblings) = pending.pop() {
            match direction {
                SortDirection::Asc => siblings.sort_by(|a, b| a.sort.cmp(&b.sort)),
                SortDirection::Desc => siblings.sort_by(|a, b| b.sort.cmp(&a.sort)),
            }
            for node in siblings {
                pending.push(node.children.as_mut_slice());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PermissionType;

    fn leaf(key: &str, sort: &str) -> MenuNode {
        let mut node = MenuNode::root();
        node.key = key.to_string();
        node.label = key.to_string();
        node.sort = sort.to_string();
        node.level = 1;
        node.permission_type = PermissionType::Menu;
        node
    }

    fn keys(nodes: &[MenuNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.key.as_str()).collect()
    }

    #[test]
    fn ascending_sort_is_stable() {
        let mut nodes = vec![leaf("b", "b"), leaf("a1", "a"), leaf("a2", "a")];
        TreeSorter::sort(&mut nodes, SortDirection::Asc);
        assert_eq!(keys(&nodes), vec!["a1", "a2", "b"]);
    }

    #[test]
    fn descending_sort_is_stable() {
        let mut nodes = vec![leaf("a1", "a"), leaf("b", "b"), leaf("a2", "a")];
        TreeSorter::sort(&mut nodes, SortDirection::Desc);
        assert_eq!(keys(&nodes), vec!["b", "a1", "a2"]);
    }

    #[test]
    fn unknown_direction_behaves_like_asc() {
        let input = vec![leaf("b", "b"), leaf("a1", "a"), leaf("a2", "a")];

        let mut bogus = input.clone();
        TreeSorter::sort(&mut bogus, SortDirection::parse("bogus"));
        let mut asc = input;
        TreeSorter::sort(&mut asc, SortDirection::parse("asc"));

        assert_eq!(bogus, asc);
        assert_eq!(SortDirection::parse(""), SortDirection::Asc);
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
    }

    #[test]
    fn keys_compare_lexicographically() {
        let mut nodes = vec![leaf("nine", "9"), leaf("ten", "10"), leaf("one", "1")];
        TreeSorter::sort(&mut nodes, SortDirection::Asc);
        assert_eq!(keys(&nodes), vec!["one", "ten", "nine"]);
    }

    #[test]
    fn sorting_recurses_into_children() {
        let mut parent = leaf("p", "0");
        parent.children = vec![leaf("c2", "2"), leaf("c1", "1")];
        let mut grandchild_holder = leaf("c3", "3");
        grandchild_holder.children = vec![leaf("g2", "z"), leaf("g1", "y")];
        parent.children.push(grandchild_holder);

        let mut nodes = vec![parent];
        TreeSorter::sort(&mut nodes, SortDirection::Desc);

        assert_eq!(keys(&nodes[0].children), vec!["c3", "c2", "c1"]);
        assert_eq!(keys(&nodes[0].children[0].children), vec!["g2", "g1"]);
    }

    #[test]
    fn very_deep_tree_sorts_without_recursing() {
        let mut chain = leaf("bottom", "0");
        chain.children = vec![leaf("b", "b"), leaf("a", "a")];
        for depth in 0..10_000 {
            let mut parent = leaf(&format!("d{depth}"), "0");
            parent.children = vec![chain];
            chain = parent;
        }

        let mut nodes = vec![chain];
        TreeSorter::sort(&mut nodes, SortDirection::Asc);

        let mut cursor = &nodes[0];
        while cursor.children.len() == 1 {
            cursor = &cursor.children[0];
        }
        assert_eq!(keys(&cursor.children), vec!["a", "b"]);

        // Tear down iteratively; the derived drop would recurse per level.
        let mut stack = nodes;
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }

    #[test]
    fn direction_deserializes_leniently() {
        let d: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(d, SortDirection::Desc);
        let d: SortDirection = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(d, SortDirection::Asc);
        assert_eq!(serde_json::to_string(&SortDirection::Desc).unwrap(), "\"desc\"");
    }
}
