//! Group bucketing for day cells and the routine manager.
//!
//! Groups exist only as the set of items referencing them, so an empty group
//! has no persisted identity. The tracker below keeps the numbers of groups
//! the user created but has not filled yet, letting the drop surface render
//! them until a member arrives or the user discards them.

use serde::Serialize;

/// Items of one group number, ordered by their order index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBucket<T> {
    pub group_number: i32,
    pub items: Vec<T>,
}

/// Bucket `items` by group number, ascending, each bucket sorted by order
/// index (stable, so ties keep presentation order). Tracked placeholder
/// numbers appear as empty buckets unless a real member already occupies them.
pub fn bucket_by_group<T, G, O>(
    items: &[T],
    placeholders: &[i32],
    group_of: G,
    order_of: O,
) -> Vec<GroupBucket<T>>
where
    T: Clone,
    G: Fn(&T) -> i32,
    O: Fn(&T) -> i32,
{
    let mut buckets: Vec<GroupBucket<T>> = Vec::new();
    for item in items {
        let group_number = group_of(item);
        match buckets
            .iter_mut()
            .find(|bucket| bucket.group_number == group_number)
        {
            Some(bucket) => bucket.items.push(item.clone()),
            None => buckets.push(GroupBucket {
                group_number,
                items: vec![item.clone()],
            }),
        }
    }

    for placeholder in placeholders {
        if !buckets.iter().any(|bucket| bucket.group_number == *placeholder) {
            buckets.push(GroupBucket {
                group_number: *placeholder,
                items: Vec::new(),
            });
        }
    }

    for bucket in &mut buckets {
        bucket.items.sort_by_key(|item| order_of(item));
    }
    buckets.sort_by_key(|bucket| bucket.group_number);
    buckets
}

/// Empty-group placeholders for one drop surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyGroupTracker {
    numbers: Vec<i32>,
}

impl EmptyGroupTracker {
    /// Track a new group numbered one past everything known (occupied or
    /// already tracked), and return that number.
    pub fn create_group(&mut self, occupied: &[i32]) -> i32 {
        let highest = occupied
            .iter()
            .chain(self.numbers.iter())
            .copied()
            .max()
            .unwrap_or(0);
        let group_number = highest + 1;
        self.numbers.push(group_number);
        group_number
    }

    pub fn remove_group(&mut self, group_number: i32) {
        self.numbers.retain(|tracked| *tracked != group_number);
    }

    /// Drop placeholders that gained a real member; they are ordinary groups
    /// from that point on.
    pub fn prune(&mut self, occupied: &[i32]) {
        self.numbers.retain(|tracked| !occupied.contains(tracked));
    }

    pub fn numbers(&self) -> &[i32] {
        &self.numbers
    }

    pub fn is_tracked(&self, group_number: i32) -> bool {
        self.numbers.contains(&group_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        group: i32,
        order: i32,
    }

    fn row(id: i32, group: i32, order: i32) -> Row {
        Row { id, group, order }
    }

    #[test]
    fn buckets_sort_groups_and_members() {
        let rows = vec![row(1, 2, 1), row(2, 1, 0), row(3, 2, 0)];
        let buckets = bucket_by_group(&rows, &[], |r| r.group, |r| r.order);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].group_number, 1);
        assert_eq!(buckets[1].group_number, 2);
        assert_eq!(
            buckets[1].items.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![3, 1]
        );
    }

    #[test]
    fn placeholders_appear_as_empty_buckets() {
        let rows = vec![row(1, 1, 0)];
        let buckets = bucket_by_group(&rows, &[3], |r| r.group, |r| r.order);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].group_number, 3);
        assert!(buckets[1].items.is_empty());
    }

    #[test]
    fn placeholder_matching_occupied_group_is_not_duplicated() {
        let rows = vec![row(1, 2, 0)];
        let buckets = bucket_by_group(&rows, &[2], |r| r.group, |r| r.order);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].items.len(), 1);
    }

    #[test]
    fn tracker_numbers_new_groups_past_everything_known() {
        let mut tracker = EmptyGroupTracker::default();
        assert_eq!(tracker.create_group(&[1, 2]), 3);
        assert_eq!(tracker.create_group(&[1, 2]), 4);
        assert_eq!(tracker.numbers(), &[3, 4]);
    }

    #[test]
    fn tracker_prunes_once_occupied() {
        let mut tracker = EmptyGroupTracker::default();
        tracker.create_group(&[1]);
        assert!(tracker.is_tracked(2));
        tracker.prune(&[1, 2]);
        assert!(!tracker.is_tracked(2));
    }

    #[test]
    fn tracker_remove_discards_a_placeholder() {
        let mut tracker = EmptyGroupTracker::default();
        let created = tracker.create_group(&[]);
        tracker.remove_group(created);
        assert!(tracker.numbers().is_empty());
    }
}
