    use super::*;
    use crate::remote::fake::{FakeRemote, RecordedCall};

    fn ids(v: &[&str]) -> BTreeSet<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn directory() -> FakeRemote {
        let members = ["u1", "u2", "u3"]
            .iter()
            .map(|id| Member {
                id: id.to_string(),
                name: format!("user-{}", id),
            })
            .collect();
        let groups = vec![
            Group {
                id: "g1".to_string(),
                name: "eng".to_string(),
                is_private: false,
                members: ids(&["u1", "u2"]),
            },
            Group {
                id: "g2".to_string(),
                name: "ops".to_string(),
                is_private: false,
                members: ids(&["u1"]),
            },
            Group {
                id: "g3".to_string(),
                name: "sales".to_string(),
                is_private: true,
                members: ids(&["u3"]),
            },
        ];
        FakeRemote::new(members, groups)
    }

    async fn loaded(remote: Arc<FakeRemote>) -> Session<FakeRemote> {
        let mut session = Session::new(remote);
        session.refresh().await.expect("initial load");
        session
    }

    #[tokio::test]
    async fn group_sync_replaces_membership_and_refreshes_once() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_group("g1");

        let before = remote.fetch_count();
        let report = session.sync_group(ids(&["u2", "u3"])).await.expect("sync");

        assert!(report.is_success());
        assert_eq!(remote.fetch_count(), before + 1);
        assert_eq!(
            remote.calls(),
            vec![RecordedCall::SetGroupMembers {
                group_id: "g1".to_string(),
                member_ids: ids(&["u2", "u3"]),
            }]
        );
        let snap = session.snapshot();
        assert_eq!(snap.group("g1").map(|g| g.members.clone()), Some(ids(&["u2", "u3"])));
        assert_eq!(
            session.status().map(|s| s.kind),
            Some(StatusKind::Success)
        );
    }

    #[tokio::test]
    async fn failed_group_sync_still_refreshes() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_group("g3");
        remote.fail_group("g3");

        let before = remote.fetch_count();
        let report = session.sync_group(ids(&["u1"])).await.expect("sync");
        assert!(!report.is_success());
        assert_eq!(remote.fetch_count(), before + 1);
        let status = session.status().expect("status");
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("#sales"), "{}", status.text);
    }

    #[tokio::test]
    async fn member_sync_with_partial_failure_reports_counts_and_refreshes_once() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_member("u2");
        remote.fail_group("g3");

        // u2 is only in g1: leave g1, join g2 and g3.
        let before = remote.fetch_count();
        let report = session.sync_member(ids(&["g2", "g3"])).await.expect("sync");

        match &report {
            ActionReport::MemberSynced { outcome, .. } => {
                assert_eq!(outcome.success_count, 2);
                assert_eq!(outcome.failure_count, 1);
            }
            other => panic!("unexpected report {:?}", other),
        }
        assert_eq!(remote.fetch_count(), before + 1);
        assert_eq!(remote.calls().len(), 3);
        let status = session.status().expect("status");
        assert_eq!(status.kind, StatusKind::Warning);
        assert!(status.text.contains("2 group(s) updated, 1 failed"), "{}", status.text);
    }

    #[tokio::test]
    async fn member_sync_without_changes_makes_no_calls() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_member("u1");

        let before = remote.fetch_count();
        let report = session.sync_member(ids(&["g1", "g2"])).await.expect("sync");
        assert!(report.is_success());
        assert!(remote.calls().is_empty());
        assert_eq!(remote.fetch_count(), before + 1);
    }

    #[tokio::test]
    async fn sync_without_focus_is_refused() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        assert_eq!(
            session.sync_group(BTreeSet::new()).await.unwrap_err(),
            SessionError::NoGroupFocused
        );
        assert_eq!(
            session.sync_member(BTreeSet::new()).await.unwrap_err(),
            SessionError::NoMemberFocused
        );
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn same_action_cannot_start_twice_but_different_ones_overlap() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_group("g1");
        session.select_member("u1");

        let first = session.prepare_group_sync(ids(&["u1"])).expect("first");
        assert_eq!(
            first.replacement_plan().map(|p| p.target_members.clone()),
            Some(ids(&["u1"]))
        );
        assert!(first.member_updates().is_none());
        assert!(matches!(
            session.prepare_group_sync(ids(&["u1"])),
            Err(SessionError::Busy(Action::SyncGroup))
        ));
        let member = session.prepare_member_sync(ids(&["g1"])).expect("member sync");
        // u1 leaves g2; g1 is unchanged.
        let updates = member.member_updates().expect("member plan");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].group_id, "g2");
        assert!(member.replacement_plan().is_none());
        assert!(session.in_flight().is_active(Action::SyncGroup));
        assert!(session.in_flight().is_active(Action::SyncMember));

        let report = first.run().await;
        assert!(session.complete(&report));
        assert!(!session.in_flight().is_active(Action::SyncGroup));
        let report = member.run().await;
        session.complete(&report);
        assert!(!session.in_flight().is_active(Action::SyncMember));
    }

    #[tokio::test]
    async fn archive_clears_group_focus_before_the_refresh() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_group("g2");
        session.select_member("u1");

        let pending = session.prepare_archive(Confirmation::Granted).expect("prepare");
        let report = pending.run().await;
        assert!(session.complete(&report));
        // Focus is gone even though the old snapshot still lists g2.
        assert!(session.snapshot().contains_group("g2"));
        assert_eq!(session.selection().focus().group_id, None);
        assert_eq!(session.selection().focus().member_id.as_deref(), Some("u1"));

        session.refresh().await.expect("refresh");
        assert!(!session.snapshot().contains_group("g2"));
    }

    #[tokio::test]
    async fn declined_archive_makes_no_call() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_group("g1");
        assert_eq!(
            session
                .archive_focused_group(Confirmation::Declined)
                .await
                .unwrap_err(),
            SessionError::NotConfirmed
        );
        assert!(remote.calls().is_empty());
        assert!(!session.in_flight().is_active(Action::ArchiveGroup));
    }

    #[tokio::test]
    async fn failed_create_preserves_the_form_and_skips_refresh() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        remote.fail_create(Some("name_taken"));

        let form = CreateGroupForm {
            name: "design".to_string(),
            is_private: true,
        };
        let before = remote.fetch_count();
        let report = session.create_group(form.clone()).await.expect("create");
        assert!(!report.is_success());
        assert_eq!(session.create_form(), &form);
        assert_eq!(remote.fetch_count(), before);

        remote.fail_create(None);
        let pending = session.prepare_create_group().expect("retry");
        let report = session.settle(pending.run().await).await;
        assert!(report.is_success());
        assert_eq!(session.create_form(), &CreateGroupForm::default());
        assert_eq!(remote.fetch_count(), before + 1);
        assert!(session.snapshot().find_group("design").is_some());
    }

    #[tokio::test]
    async fn blank_group_names_are_rejected_locally() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        let err = session
            .create_group(CreateGroupForm {
                name: "   ".to_string(),
                is_private: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::EmptyGroupName);
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_stale_data_and_reports_it() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        remote.fail_fetch(Some(FetchError::Decode("bad json".to_string())));

        let err = session.refresh().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(session.snapshot().groups.len(), 3);
        assert_eq!(session.status().map(|s| s.kind), Some(StatusKind::Error));
        assert!(!session.in_flight().is_active(Action::Refresh));
    }

    #[tokio::test]
    async fn refresh_requested_mid_flight_runs_again() {
        let remote = Arc::new(directory());
        let mut session = Session::new(remote.clone());

        assert!(session.request_refresh());
        assert!(!session.request_refresh());
        let fetched = remote.fetch_all().await;
        let outcome = session.finish_refresh(fetched);
        assert!(outcome.result.is_ok());
        assert!(outcome.again);
        assert!(session.in_flight().is_active(Action::Refresh));

        let fetched = remote.fetch_all().await;
        let outcome = session.finish_refresh(fetched);
        assert!(!outcome.again);
        assert!(session.in_flight().is_idle());
    }

    #[tokio::test]
    async fn refresh_drops_focus_on_entities_that_disappeared() {
        let remote = Arc::new(directory());
        let mut session = loaded(remote.clone()).await;
        session.select_group("g1");
        remote.archive_group("g1").await.expect("archive behind our back");

        let report = session.refresh().await.expect("refresh");
        assert!(report.group_cleared);
        assert!(session.focused_group().is_none());
    }
