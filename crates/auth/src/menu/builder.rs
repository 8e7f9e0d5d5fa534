//! Flat `menu` rows → ordered tree under a synthetic root.
//!
//! Parents are referenced by id, never by pointer. Nodes live in an arena
//! (`Vec`) with an id → index map; attachment is resolved by lookup into
//! per-node child index lists, and only then assembled into owned
//! [`MenuNode`]s. No back-references exist at any point.
//!
//! Placement rules, in order:
//! 1. `level == 1` → child of the root.
//! 2. parent resolves → child of that parent.
//! 3. parent does not resolve → child of the root (orphan).
//!
//! Nodes left unreachable after that can only sit on (or below) a parent
//! cycle. The cycle member found by walking up from the earliest such node is
//! promoted to the root, which breaks the ring without dropping anything.
//!
//! Finally no node may sit deeper than [`MAX_MENU_DEPTH`] below the root. A
//! node that would is promoted to the root as well, so assembling, sorting
//! and serializing the tree stay within a fixed recursion depth.

use std::collections::{HashMap, HashSet, VecDeque};

use rolegate_core::PermissionId;

use super::{MenuNode, SortDirection, TreeSorter};
use crate::{FlatAssignmentRecord, PermissionType};

/// Deepest nesting kept under one top-level node (top-level nodes are depth 1).
pub const MAX_MENU_DEPTH: usize = 64;

/// Structural anomalies met while building. None of them is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeReport {
    /// Non-top-level nodes whose parent was not among the user's menu nodes.
    pub orphans: Vec<PermissionId>,
    /// Level-1 nodes that nonetheless name a resolvable parent.
    pub misplaced_top_level: Vec<PermissionId>,
    /// Nodes promoted to the root to break a parent cycle.
    pub cycle_breaks: Vec<PermissionId>,
    /// Nodes promoted to the root because they sat below [`MAX_MENU_DEPTH`].
    pub depth_breaks: Vec<PermissionId>,
    /// Repeated rows for an already materialized permission (one per extra role).
    pub duplicate_rows: usize,
}

impl TreeReport {
    /// True when the source data needed no repair.
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty()
            && self.misplaced_top_level.is_empty()
            && self.cycle_breaks.is_empty()
            && self.depth_breaks.is_empty()
    }
}

struct Slot {
    id: PermissionId,
    parent_id: Option<PermissionId>,
    top_level: bool,
    node: Option<MenuNode>,
}

/// Builds the navigation tree for one request.
pub struct MenuTreeBuilder;

impl MenuTreeBuilder {
    /// Build and sort the tree; anomalies are repaired silently.
    pub fn build(records: &[FlatAssignmentRecord], direction: SortDirection) -> MenuNode {
        Self::build_with_report(records, direction).0
    }

    /// Build and sort the tree, also returning what had to be repaired.
    pub fn build_with_report(
        records: &[FlatAssignmentRecord],
        direction: SortDirection,
    ) -> (MenuNode, TreeReport) {
        let mut report = TreeReport::default();

        // Materialize: first occurrence wins, later ones are no-ops.
        let mut slots: Vec<Slot> = Vec::new();
        let mut index: HashMap<PermissionId, usize> = HashMap::new();
        for record in records.iter().filter(|r| r.is_type(&PermissionType::Menu)) {
            if index.contains_key(&record.permission_id) {
                report.duplicate_rows += 1;
                continue;
            }
            index.insert(record.permission_id, slots.len());
            slots.push(Slot {
                id: record.permission_id,
                parent_id: record.parent_id,
                top_level: record.is_top_level(),
                node: Some(MenuNode::from_record(record)),
            });
        }

        // Attach by lookup.
        let mut roots: Vec<usize> = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
        let mut parent_of: Vec<Option<usize>> = vec![None; slots.len()];
        for (i, slot) in slots.iter().enumerate() {
            let resolved = slot.parent_id.and_then(|p| index.get(&p).copied());
            if slot.top_level {
                roots.push(i);
                if resolved.is_some() {
                    report.misplaced_top_level.push(slot.id);
                }
                continue;
            }
            match resolved {
                Some(p) => {
                    children[p].push(i);
                    parent_of[i] = Some(p);
                }
                None => {
                    roots.push(i);
                    report.orphans.push(slot.id);
                }
            }
        }

        // Anything unreachable from the root hangs off a cycle.
        let mut reached = vec![false; slots.len()];
        for &r in &roots {
            mark_reachable(r, &children, &mut reached);
        }
        for i in 0..slots.len() {
            if reached[i] {
                continue;
            }
            let member = cycle_member_above(i, &parent_of);
            if let Some(p) = parent_of[member].take() {
                children[p].retain(|&c| c != member);
            }
            roots.push(member);
            report.cycle_breaks.push(slots[member].id);
            mark_reachable(member, &children, &mut reached);
        }

        let deep = cap_depth(&roots, &mut children);
        report.depth_breaks.extend(deep.iter().map(|&i| slots[i].id));
        roots.extend(deep);

        let mut root = MenuNode::root();
        root.children = roots
            .iter()
            .filter_map(|&r| assemble(r, &mut slots, &children))
            .collect();
        TreeSorter::sort(&mut root.children, direction);

        (root, report)
    }
}

fn mark_reachable(start: usize, children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(i) = stack.pop() {
        if reached[i] {
            continue;
        }
        reached[i] = true;
        stack.extend(children[i].iter().copied());
    }
}

/// Walk parent links up from `start` until a node repeats; that node is on
/// the cycle. Unreached nodes always have a parent, so the walk cannot end
/// anywhere else.
fn cycle_member_above(start: usize, parent_of: &[Option<usize>]) -> usize {
    let mut seen = HashSet::new();
    let mut current = start;
    while seen.insert(current) {
        match parent_of[current] {
            Some(p) => current = p,
            None => break,
        }
    }
    current
}

/// Detach every node deeper than [`MAX_MENU_DEPTH`] from its parent and
/// return them, shallowest first, for promotion to the root. Depth restarts
/// at 1 below each promoted node. The forest is acyclic by now.
fn cap_depth(roots: &[usize], children: &mut [Vec<usize>]) -> Vec<usize> {
    let mut promoted = Vec::new();
    let mut queue: VecDeque<(usize, usize)> = roots.iter().map(|&r| (r, 1)).collect();
    while let Some((i, depth)) = queue.pop_front() {
        if depth < MAX_MENU_DEPTH {
            queue.extend(children[i].iter().map(|&c| (c, depth + 1)));
            continue;
        }
        for c in std::mem::take(&mut children[i]) {
            promoted.push(c);
            queue.push_back((c, 1));
        }
    }
    promoted
}

/// Move a node and its subtree out of the arena into an owned tree.
///
/// Recursion is bounded by [`MAX_MENU_DEPTH`].
fn assemble(i: usize, slots: &mut [Slot], children: &[Vec<usize>]) -> Option<MenuNode> {
    let mut node = slots[i].node.take()?;
    node.children = children[i]
        .iter()
        .filter_map(|&c| assemble(c, slots, children))
        .collect();
    Some(node)
}
