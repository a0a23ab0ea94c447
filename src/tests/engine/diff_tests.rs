    use super::*;

    fn ids(v: &[&str]) -> BTreeSet<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn group(id: &str, members: &[&str]) -> Group {
        Group {
            id: id.to_string(),
            name: id.to_string(),
            is_private: false,
            members: ids(members),
        }
    }

    #[test]
    fn group_plan_is_the_checked_set_verbatim() {
        let g1 = group("g1", &["u1", "u2"]);
        let plan = diff_for_group(&g1, &ids(&["u2", "u3"]));
        assert_eq!(plan.group_id, "g1");
        assert_eq!(plan.target_members, ids(&["u2", "u3"]));
    }

    #[test]
    fn group_plan_keeps_dangling_ids_that_stay_checked() {
        let g1 = group("g1", &["u1", "ghost"]);
        let plan = diff_for_group(&g1, &ids(&["ghost"]));
        assert_eq!(plan.target_members, ids(&["ghost"]));
    }

    #[test]
    fn member_diff_only_touches_groups_whose_presence_changes() {
        let groups = vec![
            group("g1", &["u1", "u5"]),
            group("g2", &["u1"]),
            group("g3", &["u4"]),
        ];
        let updates = diff_for_member("u1", &ids(&["g2", "g3"]), &groups);

        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[0],
            GroupUpdate {
                group_id: "g1".to_string(),
                new_member_set: ids(&["u5"]),
                change: MembershipChange::Remove,
            }
        );
        assert_eq!(
            updates[1],
            GroupUpdate {
                group_id: "g3".to_string(),
                new_member_set: ids(&["u1", "u4"]),
                change: MembershipChange::Add,
            }
        );
        assert!(updates.iter().all(|u| u.group_id != "g2"));
    }

    #[test]
    fn member_diff_with_unchanged_checks_is_empty() {
        let groups = vec![group("g1", &["u1"]), group("g2", &[]), group("g3", &["u1"])];
        let updates = diff_for_member("u1", &ids(&["g1", "g3"]), &groups);
        assert!(updates.is_empty());
    }

    #[test]
    fn member_diff_for_unaffiliated_member_with_no_checks_is_empty() {
        let groups = vec![group("g1", &["u2"]), group("g2", &[])];
        assert!(diff_for_member("u1", &BTreeSet::new(), &groups).is_empty());
    }

    #[test]
    fn member_diff_ignores_checked_ids_for_unknown_groups() {
        let groups = vec![group("g1", &[])];
        let updates = diff_for_member("u1", &ids(&["g1", "archived"]), &groups);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].group_id, "g1");
    }

    #[test]
    fn member_diff_update_count_matches_presence_mismatches() {
        let groups: Vec<Group> = (0..8)
            .map(|i| {
                let members: &[&str] = if i % 2 == 0 { &["u1"] } else { &[] };
                group(&format!("g{}", i), members)
            })
            .collect();
        // Check g0..g3: g1 and g3 flip in, g4 and g6 flip out.
        let checked = ids(&["g0", "g1", "g2", "g3"]);
        let mismatches = groups
            .iter()
            .filter(|g| g.has_member("u1") != checked.contains(&g.id))
            .count();

        let updates = diff_for_member("u1", &checked, &groups);
        assert_eq!(updates.len(), mismatches);
        assert_eq!(updates.len(), 4);
    }
