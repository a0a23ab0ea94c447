    use std::collections::BTreeSet;

    use super::*;

    fn snapshot(group_ids: &[&str], member_ids: &[&str]) -> Snapshot {
        Snapshot::new(
            member_ids
                .iter()
                .map(|id| Member {
                    id: id.to_string(),
                    name: format!("name-{}", id),
                })
                .collect(),
            group_ids
                .iter()
                .map(|id| Group {
                    id: id.to_string(),
                    name: format!("group-{}", id),
                    is_private: false,
                    members: BTreeSet::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn reconcile_keeps_focus_that_still_exists() {
        let mut tracker = SelectionTracker::new();
        tracker.select_group("g1");
        tracker.select_member("u1");

        let report = tracker.reconcile(&snapshot(&["g1"], &["u1"]));
        assert!(!report.any_cleared());
        assert_eq!(tracker.focus().group_id.as_deref(), Some("g1"));
        assert_eq!(tracker.focus().member_id.as_deref(), Some("u1"));
    }

    #[test]
    fn reconcile_clears_a_vanished_group_without_touching_member_focus() {
        let mut tracker = SelectionTracker::new();
        tracker.select_group("g1");
        tracker.select_member("u1");

        let report = tracker.reconcile(&snapshot(&["g2"], &["u1"]));
        assert!(report.group_cleared);
        assert!(!report.member_cleared);
        assert_eq!(tracker.focus().group_id, None);
        assert_eq!(tracker.focus().member_id.as_deref(), Some("u1"));
    }

    #[test]
    fn reconcile_clears_a_vanished_member_without_touching_group_focus() {
        let mut tracker = SelectionTracker::new();
        tracker.select_group("g1");
        tracker.select_member("u9");

        let report = tracker.reconcile(&snapshot(&["g1"], &["u1"]));
        assert!(!report.group_cleared);
        assert!(report.member_cleared);
        assert_eq!(tracker.focus().group_id.as_deref(), Some("g1"));
        assert_eq!(tracker.focus().member_id, None);
    }

    #[test]
    fn reconcile_against_an_empty_snapshot_is_safe() {
        let mut tracker = SelectionTracker::new();
        let report = tracker.reconcile(&Snapshot::default());
        assert!(!report.any_cleared());

        tracker.select_group("g1");
        let report = tracker.reconcile(&Snapshot::default());
        assert!(report.group_cleared);
    }

    #[test]
    fn dangling_focus_resolves_to_nothing_before_reconcile() {
        let mut tracker = SelectionTracker::new();
        tracker.select_group("gone");
        let snap = snapshot(&["g1"], &[]);
        assert!(tracker.focused_group(&snap).is_none());

        tracker.select_group("g1");
        assert_eq!(tracker.focused_group(&snap).map(|g| g.id.as_str()), Some("g1"));
    }
