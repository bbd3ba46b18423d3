//! End-to-end flows over the in-memory collaborators: sign in, score a day,
//! read it back through the month view, delete it, and race month loads.

use habit_tracker_backend::auth::{AuthProvider, MemoryAuth};
use habit_tracker_backend::domain::{
    CalendarService, MonthViewService, RecordService, ScoringPolicy, ViewMode,
};
use habit_tracker_backend::storage::MemoryRecordStore;
use habit_tracker_backend::AppState;
use shared::{Credentials, ScoreTier};
use std::collections::BTreeMap;
use std::sync::Arc;

fn scores(teeth: u32, food: u32, sport: u32) -> BTreeMap<String, u32> {
    let mut map = BTreeMap::new();
    map.insert("teeth".to_string(), teeth);
    map.insert("food".to_string(), food);
    map.insert("sport".to_string(), sport);
    map
}

#[tokio::test]
async fn save_then_delete_round_trip() {
    let app = AppState::in_memory(ScoringPolicy::checklist_v2());
    let session = app
        .auth
        .sign_in_with_password(&Credentials {
            email: "u1@example.test".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.owner_id, "u1");

    app.calendar_service.set_focus_date(3, 2024).unwrap();
    app.month_view.refresh(Some(&session)).await;

    // Score a perfect day
    app.month_view.open_day("2024-03-15").unwrap();
    let stored = app
        .month_view
        .save_edited_day(Some(&session), scores(10, 10, 10), None)
        .await
        .unwrap();
    assert_eq!(stored.total(), 30);

    let month = app.month_view.calendar_month().unwrap();
    let cell = month.days.iter().find(|d| d.date == "2024-03-15").unwrap();
    assert_eq!(cell.total, Some(30));
    assert_eq!(cell.tier, Some(ScoreTier::Top));

    // Delete it again
    app.month_view.open_day("2024-03-15").unwrap();
    app.month_view.delete_edited_day(Some(&session)).await.unwrap();

    let month = app.month_view.calendar_month().unwrap();
    let cell = month.days.iter().find(|d| d.date == "2024-03-15").unwrap();
    assert!(cell.record.is_none());
    assert_eq!(cell.total, None);
    assert_eq!(cell.tier, None);
}

#[tokio::test]
async fn out_of_order_month_loads_keep_latest_request() {
    let store = Arc::new(MemoryRecordStore::new());
    let records = RecordService::new(store.clone(), ScoringPolicy::checklist_v2());
    let view = MonthViewService::new(records.clone(), CalendarService::new());
    let auth = MemoryAuth::signed_in("u1");
    let session = auth.current_session().await.unwrap();

    // One record in March, one in April
    records
        .save_day(
            Some(&session),
            shared::SaveDayScoreRequest {
                date: "2024-03-15".to_string(),
                category_scores: scores(10, 10, 10),
                notes: None,
            },
        )
        .await
        .unwrap();
    records
        .save_day(
            Some(&session),
            shared::SaveDayScoreRequest {
                date: "2024-04-10".to_string(),
                category_scores: scores(5, 5, 5),
                notes: None,
            },
        )
        .await
        .unwrap();

    // Navigate March -> April -> March; the April fetch completes last
    let april_ticket = view.begin_load(4, 2024);
    let april_result = records.load_month(Some(&session), 4, 2024).await;
    let march_ticket = view.begin_load(3, 2024);
    let march_result = records.load_month(Some(&session), 3, 2024).await;

    assert!(view.apply_load(&march_ticket, march_result));
    assert!(!view.apply_load(&april_ticket, april_result));

    // March is what is displayed
    let state = view.state();
    assert_eq!(state.focus.month, 3);
    assert!(state.records.contains_key("2024-03-15"));
    assert!(!state.records.contains_key("2024-04-10"));
}

#[tokio::test]
async fn expired_session_blocks_writes() {
    let store = Arc::new(MemoryRecordStore::new());
    let records = RecordService::new(store.clone(), ScoringPolicy::checklist_v2());
    let view = MonthViewService::new(records, CalendarService::new());
    let auth = MemoryAuth::signed_in("u1");

    auth.expire_session();
    let session = auth.current_session().await;
    assert!(session.is_none());

    view.open_day("2024-03-15").unwrap();
    let result = view
        .save_edited_day(session.as_ref(), scores(5, 5, 5), None)
        .await;
    assert!(result.is_err());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn session_watcher_observes_logout() {
    let auth = MemoryAuth::new();
    let mut sessions = auth.subscribe();

    auth.sign_in_with_password(&Credentials {
        email: "u1@example.test".to_string(),
        password: "hunter2".to_string(),
    })
    .await
    .unwrap();
    sessions.changed().await.unwrap();
    assert!(sessions.borrow().is_some());

    auth.sign_out().await.unwrap();
    sessions.changed().await.unwrap();
    // Consumer redirects to the unauthenticated view at this point
    assert!(sessions.borrow().is_none());
}

#[tokio::test]
async fn grid_state_distinguishes_editing_transitions() {
    let app = AppState::in_memory(ScoringPolicy::checklist_v2());
    let session = app
        .auth
        .sign_in_with_password(&Credentials {
            email: "u1@example.test".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();
    app.calendar_service.set_focus_date(3, 2024).unwrap();
    app.month_view.refresh(Some(&session)).await;

    assert_eq!(app.month_view.state().mode, ViewMode::Browsing);

    app.month_view.open_day("2024-03-15").unwrap();
    assert!(matches!(
        app.month_view.state().mode,
        ViewMode::Editing { .. }
    ));

    app.month_view.cancel_edit();
    assert_eq!(app.month_view.state().mode, ViewMode::Browsing);
}
