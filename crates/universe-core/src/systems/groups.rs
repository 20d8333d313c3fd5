//! Group Formation Tracking
//!
//! Counts interactions per unordered pair and promotes pairs that reach the
//! threshold into shared groups. Keeps a reverse index from group to members
//! so merges can move every member of the losing group.

use bevy_ecs::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use universe_events::{EntityId, GroupId};

/// Unordered pair key, smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey(EntityId, EntityId);

impl PairKey {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Outcome of a pair crossing the threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChange {
    /// Neither was grouped; both join a new group
    Formed { group: GroupId },
    /// One was grouped; the other joins that group
    Absorbed { group: GroupId, joined: EntityId },
    /// Both were grouped apart; the smaller id wins and absorbs the other
    Merged {
        winner: GroupId,
        loser: GroupId,
        moved: Vec<EntityId>,
    },
}

impl GroupChange {
    /// The group both participants share afterwards
    pub fn group(&self) -> GroupId {
        match self {
            GroupChange::Formed { group } => *group,
            GroupChange::Absorbed { group, .. } => *group,
            GroupChange::Merged { winner, .. } => *winner,
        }
    }

    /// The group folded into the winner, for merges
    pub fn merged_from(&self) -> Option<GroupId> {
        match self {
            GroupChange::Merged { loser, .. } => Some(*loser),
            _ => None,
        }
    }
}

/// Resource: pairwise interaction counts and group membership
#[derive(Resource, Debug)]
pub struct GroupTracker {
    threshold: u64,
    counts: BTreeMap<PairKey, u64>,
    membership: BTreeMap<EntityId, GroupId>,
    members: BTreeMap<GroupId, BTreeSet<EntityId>>,
    last_group: u64,
}

impl GroupTracker {
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            counts: BTreeMap::new(),
            membership: BTreeMap::new(),
            members: BTreeMap::new(),
            last_group: 0,
        }
    }

    /// Interactions recorded so far for the unordered pair
    pub fn count(&self, a: EntityId, b: EntityId) -> u64 {
        self.counts.get(&PairKey::new(a, b)).copied().unwrap_or(0)
    }

    pub fn group_of(&self, id: EntityId) -> Option<GroupId> {
        self.membership.get(&id).copied()
    }

    pub fn members(&self, group: GroupId) -> Option<&BTreeSet<EntityId>> {
        self.members.get(&group)
    }

    /// Live groups with their members, in id order
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &BTreeSet<EntityId>)> + '_ {
        self.members.iter().map(|(g, m)| (*g, m))
    }

    pub fn group_count(&self) -> usize {
        self.members.len()
    }

    /// Record one interaction between `a` and `b`.
    ///
    /// Returns the membership change when the pair has reached the threshold
    /// and does not already share a group.
    pub fn record(&mut self, a: EntityId, b: EntityId) -> Option<GroupChange> {
        let count = self.counts.entry(PairKey::new(a, b)).or_insert(0);
        *count += 1;
        if *count < self.threshold {
            return None;
        }

        match (self.group_of(a), self.group_of(b)) {
            (Some(ga), Some(gb)) if ga == gb => None,
            (None, None) => {
                self.last_group += 1;
                let group = GroupId(self.last_group);
                self.join(a, group);
                self.join(b, group);
                Some(GroupChange::Formed { group })
            }
            (Some(group), None) => {
                self.join(b, group);
                Some(GroupChange::Absorbed { group, joined: b })
            }
            (None, Some(group)) => {
                self.join(a, group);
                Some(GroupChange::Absorbed { group, joined: a })
            }
            (Some(ga), Some(gb)) => {
                let (winner, loser) = if ga < gb { (ga, gb) } else { (gb, ga) };
                let moved: Vec<EntityId> = self
                    .members
                    .remove(&loser)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default();
                for id in &moved {
                    self.join(*id, winner);
                }
                Some(GroupChange::Merged {
                    winner,
                    loser,
                    moved,
                })
            }
        }
    }

    fn join(&mut self, id: EntityId, group: GroupId) {
        if let Some(previous) = self.membership.insert(id, group) {
            if previous != group {
                if let Some(set) = self.members.get_mut(&previous) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.members.remove(&previous);
                    }
                }
            }
        }
        self.members.entry(group).or_default().insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: EntityId = EntityId(0);
    const B: EntityId = EntityId(1);
    const C: EntityId = EntityId(2);
    const D: EntityId = EntityId(3);
    const E: EntityId = EntityId(4);

    fn record_n(tracker: &mut GroupTracker, a: EntityId, b: EntityId, n: usize) -> Vec<GroupChange> {
        (0..n).filter_map(|_| tracker.record(a, b)).collect()
    }

    #[test]
    fn test_forms_on_threshold_not_before() {
        let mut tracker = GroupTracker::new(3);

        assert_eq!(tracker.record(A, B), None);
        assert_eq!(tracker.record(B, A), None);
        assert_eq!(tracker.record(A, B), Some(GroupChange::Formed { group: GroupId(1) }));

        assert_eq!(tracker.count(A, B), 3);
        assert_eq!(tracker.group_of(A), Some(GroupId(1)));
        assert_eq!(tracker.group_of(B), Some(GroupId(1)));

        // Already sharing a group: further interactions only count
        assert_eq!(tracker.record(A, B), None);
        assert_eq!(tracker.count(B, A), 4);
    }

    #[test]
    fn test_absorption() {
        let mut tracker = GroupTracker::new(2);
        record_n(&mut tracker, A, B, 2);

        let changes = record_n(&mut tracker, C, B, 2);
        assert_eq!(
            changes,
            vec![GroupChange::Absorbed {
                group: GroupId(1),
                joined: C
            }]
        );
        assert_eq!(tracker.members(GroupId(1)).unwrap().len(), 3);
    }

    #[test]
    fn test_merge_picks_smaller_group() {
        let mut tracker = GroupTracker::new(2);
        record_n(&mut tracker, A, C, 2);
        record_n(&mut tracker, B, D, 2);
        record_n(&mut tracker, D, E, 2);
        assert_eq!(tracker.group_of(A), Some(GroupId(1)));
        assert_eq!(tracker.group_of(B), Some(GroupId(2)));
        assert_eq!(tracker.group_of(E), Some(GroupId(2)));

        let changes = record_n(&mut tracker, B, A, 2);
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.group(), GroupId(1));
        assert_eq!(change.merged_from(), Some(GroupId(2)));
        assert_eq!(
            change,
            &GroupChange::Merged {
                winner: GroupId(1),
                loser: GroupId(2),
                moved: vec![B, D, E],
            }
        );

        for id in [A, B, C, D, E] {
            assert_eq!(tracker.group_of(id), Some(GroupId(1)));
        }
        assert!(tracker.members(GroupId(2)).is_none());
        assert_eq!(tracker.group_count(), 1);
    }

    #[test]
    fn test_new_groups_get_fresh_ids() {
        let mut tracker = GroupTracker::new(1);
        tracker.record(A, B);
        tracker.record(C, D);
        tracker.record(B, C);
        // Group 2 merged away; a new pair must not reuse it
        let change = tracker.record(E, EntityId(5));
        assert_eq!(change, Some(GroupChange::Formed { group: GroupId(3) }));
    }
}
