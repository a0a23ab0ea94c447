    use std::collections::BTreeSet;
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::model::{Group, Member};
    use crate::remote::fake::{FakeRemote, RecordedCall};

    fn ids(v: &[&str]) -> BTreeSet<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn directory() -> FakeRemote {
        let members = [("u1", "alice"), ("u2", "bob"), ("u3", "carol")]
            .iter()
            .map(|(id, name)| Member {
                id: id.to_string(),
                name: name.to_string(),
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

    async fn loaded(remote: Arc<FakeRemote>) -> App {
        let mut app = App::new(remote, "fake".to_string(), tokio::runtime::Handle::current());
        app.start_refresh();
        assert!(app.settle_next().await);
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn enter_focuses_the_group_and_renders_its_membership() {
        let remote = Arc::new(directory());
        let mut app = loaded(remote).await;

        assert_eq!(app.list_ids(), vec!["g1", "g2", "g3"]);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focused_id(), Some("g1"));
        assert_eq!(app.pane, Pane::Editor);
        let checks = app.checks.as_ref().expect("checks");
        assert_eq!(checks.checked(), &ids(&["u1", "u2"]));
        assert!(!checks.all_checked());
    }

    #[tokio::test]
    async fn toggling_and_syncing_a_group_replaces_and_rerenders() {
        let remote = Arc::new(directory());
        let mut app = loaded(remote.clone()).await;
        press(&mut app, KeyCode::Enter);

        // Rows: select-all, u1, u2, u3.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('s'));

        assert!(app.settle_next().await, "sync result");
        assert!(app.settle_next().await, "refresh result");

        assert_eq!(
            remote.calls(),
            vec![RecordedCall::SetGroupMembers {
                group_id: "g1".to_string(),
                member_ids: ids(&["u1", "u2", "u3"]),
            }]
        );
        let checks = app.checks.as_ref().expect("checks");
        assert!(checks.all_checked());
        assert_eq!(app.session.status().map(|s| s.kind), Some(StatusKind::Success));
        assert!(app.session.in_flight().is_idle());
    }

    #[tokio::test]
    async fn select_all_row_flips_every_box() {
        let remote = Arc::new(directory());
        let mut app = loaded(remote).await;
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.checks.as_ref().is_some_and(|c| c.all_checked()));
        press(&mut app, KeyCode::Char('a'));
        assert!(app.checks.as_ref().is_some_and(|c| c.checked().is_empty()));
    }

    #[tokio::test]
    async fn member_view_reports_partial_failure_as_warning() {
        let remote = Arc::new(directory());
        remote.fail_group("g3");
        let mut app = loaded(remote.clone()).await;

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, ViewKind::ByMember);
        // bob
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focused_id(), Some("u2"));

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('s'));
        assert!(app.settle_next().await);
        assert!(app.settle_next().await);

        let status = app.session.status().expect("status");
        assert_eq!(status.kind, StatusKind::Warning);
        assert!(status.text.contains("1 group(s) updated, 1 failed"), "{}", status.text);
        // Re-rendered from the authority: g2 joined, g3 refused.
        assert_eq!(app.checks.as_ref().map(|c| c.checked().clone()), Some(ids(&["g1", "g2"])));
    }

    #[tokio::test]
    async fn second_sync_while_first_is_running_is_refused() {
        let remote = Arc::new(directory());
        let mut app = loaded(remote.clone()).await;
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.notice.as_deref(), Some("group sync already in progress"));

        assert!(app.settle_next().await);
        assert!(app.settle_next().await);
        assert_eq!(remote.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_create_keeps_the_modal_and_the_typed_name() {
        let remote = Arc::new(directory());
        remote.fail_create(Some("name_taken"));
        let mut app = loaded(remote.clone()).await;
        let fetches = remote.fetch_count();

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "design");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert!(app.settle_next().await);

        match &app.modal {
            Some(Modal::CreateGroup {
                input,
                error,
                submitting,
            }) => {
                assert_eq!(input.buf, "design");
                assert!(!submitting);
                assert!(error.as_deref().is_some_and(|e| e.contains("name_taken")));
            }
            _ => panic!("create modal should stay open"),
        }
        assert!(app.session.create_form().is_private);
        assert_eq!(remote.fetch_count(), fetches);

        remote.fail_create(None);
        press(&mut app, KeyCode::Enter);
        assert!(app.settle_next().await);
        assert!(app.settle_next().await);

        assert!(app.modal.is_none());
        assert_eq!(app.focused_id(), None);
        assert_eq!(app.session.create_form().name, "");
        assert!(app.list_ids().contains(&"GNEW1".to_string()));
    }

    #[tokio::test]
    async fn creating_a_group_keeps_focus_and_unsynced_checks() {
        let remote = Arc::new(directory());
        let mut app = loaded(remote.clone()).await;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focused_id(), Some("g1"));

        // Rows: select-all, u1, u2, u3.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        let edits = app.checks.as_ref().map(|c| c.checked().clone());
        assert_eq!(edits, Some(ids(&["u1", "u2", "u3"])));

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "design");
        press(&mut app, KeyCode::Enter);
        assert!(app.settle_next().await, "create result");
        assert!(app.settle_next().await, "refresh result");

        assert!(app.modal.is_none());
        assert_eq!(app.view, ViewKind::ByGroup);
        assert_eq!(app.focused_id(), Some("g1"));
        assert_eq!(app.checks.as_ref().map(|c| c.checked().clone()), edits);
        assert!(app.list_ids().contains(&"GNEW1".to_string()));
    }

    #[tokio::test]
    async fn select_all_keeps_members_missing_from_the_directory() {
        let members = vec![Member {
            id: "u1".to_string(),
            name: "alice".to_string(),
        }];
        let groups = vec![Group {
            id: "g1".to_string(),
            name: "eng".to_string(),
            is_private: false,
            members: ids(&["ghost"]),
        }];
        let remote = Arc::new(FakeRemote::new(members, groups));
        let mut app = loaded(remote.clone()).await;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.editor_ids(), vec!["u1", "ghost"]);

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('s'));
        assert!(app.settle_next().await);
        assert!(app.settle_next().await);

        assert_eq!(
            remote.calls(),
            vec![RecordedCall::SetGroupMembers {
                group_id: "g1".to_string(),
                member_ids: ids(&["ghost", "u1"]),
            }]
        );
    }

    #[tokio::test]
    async fn group_and_member_syncs_run_side_by_side() {
        let remote = Arc::new(directory().with_delay(Duration::from_millis(20)));
        let mut app = loaded(remote.clone()).await;

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('s'));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focused_id(), Some("u1"));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.busy_labels(), vec!["group sync", "member sync"]);

        while !app.session.in_flight().is_idle() {
            assert!(app.settle_next().await);
        }
        assert_eq!(remote.calls().len(), 2);
        assert_eq!(remote.group_members("g3"), Some(ids(&["u1", "u3"])));
        assert_eq!(app.notice, None);
    }

    #[tokio::test]
    async fn archive_needs_confirmation_and_drops_focus() {
        let remote = Arc::new(directory());
        let mut app = loaded(remote.clone()).await;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focused_id(), Some("g2"));

        press(&mut app, KeyCode::Char('x'));
        assert!(matches!(app.modal, Some(Modal::ConfirmArchive { .. })));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.modal.is_none());
        assert_eq!(app.notice.as_deref(), Some("archive cancelled"));
        assert!(remote.calls().is_empty());

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.settle_next().await);
        assert_eq!(app.focused_id(), None);
        assert!(app.settle_next().await);

        assert_eq!(app.list_ids(), vec!["g1", "g3"]);
        assert!(app.checks.is_none());
        assert_eq!(app.pane, Pane::List);
    }
