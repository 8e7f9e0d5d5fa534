//! Collapse a user's flat assignment rows into a unique permission set.
//!
//! Rows repeat whenever a permission is reachable through several roles. The
//! aggregator keys everything by permission id so those repeats vanish.
//!
//! With many roles the scan fans out: role groups are dealt to a bounded pool
//! of scoped workers (at most [`MAX_FAN_OUT_WORKERS`], never more than the
//! machine's available parallelism), each filtering its roles' rows and
//! publishing matches over a channel. The scope end is the join barrier; the
//! set is only assembled after every worker has finished.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::thread;

use rolegate_core::{PermissionId, RoleId};

use crate::{FlatAssignmentRecord, Permission, PermissionType};

/// Role count above which aggregation fans out.
pub const DEFAULT_FAN_OUT_THRESHOLD: usize = 4;

/// Upper bound on worker threads per aggregation, whatever the role count.
pub const MAX_FAN_OUT_WORKERS: usize = 8;

/// De-duplicated permissions keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    by_id: HashMap<PermissionId, Permission>,
}

impl PermissionSet {
    /// Insert unless the id is already present. Returns `true` if inserted.
    pub fn insert(&mut self, permission: Permission) -> bool {
        match self.by_id.entry(permission.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(permission);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: PermissionId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Exact string match against every permission's path.
    pub fn contains_path(&self, path: &str) -> bool {
        self.by_id.values().any(|p| p.path == path)
    }

    /// Permissions ordered by id (stable output for display/audit).
    pub fn to_sorted_vec(&self) -> Vec<Permission> {
        let mut out: Vec<Permission> = self.by_id.values().cloned().collect();
        out.sort_by_key(|p| p.id);
        out
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = PermissionSet::default();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

/// One-pass aggregation result split by permission type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedPermissions {
    pub api: PermissionSet,
    pub menu: PermissionSet,
    /// Rows whose type was not recognised (ignored, counted).
    pub unknown_rows: usize,
}

/// Aggregates flat assignment rows into [`PermissionSet`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionAggregator {
    fan_out_threshold: usize,
}

impl Default for PermissionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionAggregator {
    pub fn new() -> Self {
        Self {
            fan_out_threshold: DEFAULT_FAN_OUT_THRESHOLD,
        }
    }

    /// Fan out once the number of distinct roles exceeds `threshold`.
    ///
    /// `0` always fans out; `usize::MAX` never does.
    pub fn with_fan_out_threshold(mut self, threshold: usize) -> Self {
        self.fan_out_threshold = threshold;
        self
    }

    pub fn fan_out_threshold(&self) -> usize {
        self.fan_out_threshold
    }

    /// Unique permissions of `permission_type` across all roles.
    ///
    /// Empty input is a normal outcome and yields an empty set.
    pub fn aggregate(
        &self,
        records: &[FlatAssignmentRecord],
        permission_type: &PermissionType,
    ) -> PermissionSet {
        self.scan(records, |r| r.is_type(permission_type))
            .into_iter()
            .collect()
    }

    /// Both the `api` and `menu` sets from a single scan.
    pub fn partition(&self, records: &[FlatAssignmentRecord]) -> PartitionedPermissions {
        let mut out = PartitionedPermissions::default();
        for permission in self.scan(records, |_| true) {
            match permission.permission_type {
                PermissionType::Api => {
                    out.api.insert(permission);
                }
                PermissionType::Menu => {
                    out.menu.insert(permission);
                }
                PermissionType::Unknown(_) => out.unknown_rows += 1,
            }
        }
        out
    }

    /// All matching rows projected to permissions (duplicates included).
    fn scan<F>(&self, records: &[FlatAssignmentRecord], keep: F) -> Vec<Permission>
    where
        F: Fn(&FlatAssignmentRecord) -> bool + Sync,
    {
        let groups = group_by_role(records);
        let workers = worker_count(groups.len());
        if groups.len() > self.fan_out_threshold && workers > 1 {
            fan_out(&groups, workers, &keep)
        } else {
            records
                .iter()
                .filter(|r| keep(*r))
                .map(FlatAssignmentRecord::permission)
                .collect()
        }
    }
}

/// Rows grouped by role, roles in order of first appearance.
fn group_by_role(records: &[FlatAssignmentRecord]) -> Vec<(RoleId, Vec<&FlatAssignmentRecord>)> {
    let mut index: HashMap<RoleId, usize> = HashMap::new();
    let mut groups: Vec<(RoleId, Vec<&FlatAssignmentRecord>)> = Vec::new();
    for record in records {
        let slot = *index.entry(record.role_id).or_insert_with(|| {
            groups.push((record.role_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }
    groups
}

/// Threads to use for `roles` role groups.
fn worker_count(roles: usize) -> usize {
    let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    roles.min(cores).min(MAX_FAN_OUT_WORKERS)
}

fn fan_out<F>(
    groups: &[(RoleId, Vec<&FlatAssignmentRecord>)],
    workers: usize,
    keep: &F,
) -> Vec<Permission>
where
    F: Fn(&FlatAssignmentRecord) -> bool + Sync,
{
    let (tx, rx) = mpsc::channel::<Permission>();
    let per_worker = groups.len().div_ceil(workers.max(1));

    thread::scope(|scope| {
        for batch in groups.chunks(per_worker.max(1)) {
            let tx = tx.clone();
            scope.spawn(move || {
                for (_role, rows) in batch {
                    for row in rows.iter().copied().filter(|r| keep(*r)) {
                        // The receiver outlives the scope; send cannot fail here.
                        let _ = tx.send(row.permission());
                    }
                }
            });
        }
    });

    // Every worker has joined. Dropping the last sender closes the channel so
    // draining terminates.
    drop(tx);
    rx.into_iter().collect()
}
