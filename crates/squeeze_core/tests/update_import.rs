use squeeze_core::{update, AppState, Effect, ImageRecord, ListSnapshot, Msg, NotificationLevel};

#[test]
fn import_request_becomes_an_effect() {
    let (_, effects) = update(
        AppState::new(),
        Msg::ImportRequested {
            paths: vec!["/photos".into()],
            recursive: true,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ImportPaths {
            paths: vec!["/photos".into()],
            recursive: true
        }]
    );

    let (_, effects) = update(
        AppState::new(),
        Msg::ImportRequested {
            paths: Vec::new(),
            recursive: false,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn import_events_drive_progress() {
    let (state, _) = update(AppState::new(), Msg::ImportStarted);
    assert!(state.view().import.is_some());

    let (state, _) = update(
        state,
        Msg::ImportProgress {
            progress: 4,
            total: 9,
        },
    );
    let import = state.view().import.unwrap();
    assert_eq!((import.progress, import.total), (4, 9));

    let (mut state, _) = update(state, Msg::ImportFinished { added: 9 });
    assert_eq!(state.view().import, None);
    let notifications = state.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Success);
    assert_eq!(notifications[0].body, "Imported 9 files");
}

#[test]
fn list_changed_ends_the_import() {
    let (state, _) = update(AppState::new(), Msg::ImportStarted);
    let snapshot = ListSnapshot {
        items: vec![ImageRecord {
            id: "a".into(),
            ..ImageRecord::default()
        }],
        base_folder: "/photos".into(),
        total_count: 1,
    };
    let (state, _) = update(state, Msg::ListChanged(snapshot));
    let view = state.view();
    assert_eq!(view.import, None);
    assert_eq!(view.total_count, 1);
    assert_eq!(view.base_folder, "/photos");
}

#[test]
fn other_command_failures_are_reported() {
    let (mut state, effects) = update(
        AppState::new(),
        Msg::CommandFailed {
            command: "import".into(),
            message: "no such directory".into(),
        },
    );
    assert!(effects.is_empty());
    let notifications = state.take_notifications();
    assert_eq!(notifications[0].title, "import failed");
    assert_eq!(notifications[0].level, NotificationLevel::Error);
}
