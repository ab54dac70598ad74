//! Sessions and the app driven end to end against the mock backend.

use std::sync::Arc;
use std::time::Duration;

use querydesk::api::{Backend, MockBackend, QueryResult};
use querydesk::config::Config;
use querydesk::render::{render_message, ResultView};
use querydesk::session::{ConversationSession, Phase, QuerySession, Role};
use querydesk::tui::keymap::Command;
use querydesk::tui::{spawn_job, App, AsyncMessage, Tab};
use tokio::sync::mpsc;

fn slow_backend() -> Arc<dyn Backend> {
    Arc::new(MockBackend::new().with_delay(Duration::from_millis(50)))
}

async fn settle(app: &mut App, rx: &mut mpsc::Receiver<AsyncMessage>) {
    while app.is_busy() {
        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("completion timed out")
            .expect("channel closed");
        app.apply(message);
    }
}

#[tokio::test]
async fn test_query_session_success_then_failure() {
    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let mut session = QuerySession::new("SELECT * FROM Artist LIMIT 5");

    let pending = session.run(&backend).into_pending().unwrap();
    session.complete(pending.resolve().await);
    assert_eq!(session.phase(), Phase::Succeeded);
    match session.view() {
        ResultView::Table(table) => {
            assert_eq!(table.row_count, 5);
            assert_eq!(table.summary(), "5 rows returned | 2 columns");
        }
        other => panic!("expected table, got {other:?}"),
    }

    session.set_query_text("DROP everything");
    let pending = session.run(&backend).into_pending().unwrap();
    session.complete(pending.resolve().await);
    assert_eq!(session.phase(), Phase::Failed);
    assert!(session.result().is_none());
    assert!(matches!(session.view(), ResultView::Error(_)));
}

#[tokio::test]
async fn test_empty_result_projects_empty_view() {
    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let mut session = QuerySession::new("SELECT * FROM Artist WHERE 1 = 0");

    let pending = session.run(&backend).into_pending().unwrap();
    session.complete(pending.resolve().await);

    let expected = QueryResult::with_data(
        vec!["ArtistId".to_string(), "Name".to_string()],
        Vec::new(),
    );
    assert_eq!(session.result(), Some(&expected));
    assert!(matches!(session.view(), ResultView::Empty));
}

#[tokio::test]
async fn test_conversation_answer_renders_markup() {
    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let mut session = ConversationSession::new(Vec::new());

    let pending = session
        .submit("Show me the top 5 selling artists", &backend)
        .into_pending()
        .unwrap();
    session.complete(pending.resolve().await);

    let answer = &session.transcript()[1];
    assert_eq!(answer.role, Role::Assistant);
    assert!(!answer.is_error);
    assert!(render_message(&answer.content).len() > 1);
}

#[tokio::test]
async fn test_app_runs_query_while_conversation_waits() {
    let mut app = App::new(slow_backend(), &Config::default());
    let (tx, mut rx) = mpsc::channel(8);

    let query_job = app.dispatch(Command::RunQuery).expect("query should start");
    spawn_job(query_job, tx.clone());

    app.dispatch(Command::SelectTab(Tab::Ai));
    let ask_job = app.dispatch(Command::SendSuggestion(1)).expect("ask should start");
    spawn_job(ask_job, tx.clone());

    assert!(app.query.is_running());
    assert!(app.conversation.is_waiting());
    assert!(app.query_spinner.is_some());
    assert!(app.chat_spinner.is_some());

    settle(&mut app, &mut rx).await;

    assert_eq!(app.query.phase(), Phase::Succeeded);
    assert_eq!(app.conversation.phase(), Phase::Succeeded);
    assert_eq!(app.conversation.transcript().len(), 2);
    assert!(app.query_spinner.is_none());
    assert!(app.chat_spinner.is_none());
}

#[tokio::test]
async fn test_clear_during_run_drops_late_result() {
    let mut app = App::new(slow_backend(), &Config::default());
    let (tx, mut rx) = mpsc::channel(8);

    let job = app.dispatch(Command::RunQuery).expect("query should start");
    spawn_job(job, tx);
    app.dispatch(Command::ClearQuery);
    assert!(!app.is_busy());

    let late = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    app.apply(late);

    assert_eq!(app.query.phase(), Phase::Idle);
    assert!(app.query.result().is_none());
    assert_eq!(app.query.query_text(), "");
}

#[tokio::test]
async fn test_second_send_while_waiting_is_ignored() {
    let mut app = App::new(slow_backend(), &Config::default());
    let (tx, mut rx) = mpsc::channel(8);
    app.dispatch(Command::SelectTab(Tab::Ai));

    for c in "hello".chars() {
        app.dispatch(Command::Insert(c));
    }
    let job = app.dispatch(Command::Send).expect("first send starts");
    spawn_job(job, tx);

    for c in "again".chars() {
        app.dispatch(Command::Insert(c));
    }
    assert!(app.dispatch(Command::Send).is_none());

    settle(&mut app, &mut rx).await;
    assert_eq!(app.conversation.transcript().len(), 2);
    assert_eq!(app.conversation.draft().text(), "again");
}
