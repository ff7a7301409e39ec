//! Timer behaviour of [`BindingController`] under a paused tokio clock,
//! plus one end-to-end run against a mock backend over HTTP.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use doorctl_binding::machine::{MSG_CONNECTION_LOST, MSG_INITIATION_FAILED};
use doorctl_binding::{
    BindRequest, BindingBackend, BindingConfig, BindingController, BindingError, BindingOutcome,
    BindingState,
};
use doorctl_client::{AdminApi, ApiError, ClientConfig};
use doorctl_core::models::BindingStatus;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

enum Reply {
    Status(BindingStatus),
    Fail,
    Expired,
}

#[derive(Default)]
struct ScriptedBackend {
    initiate_delay: Option<Duration>,
    initiate_error: Option<Option<String>>,
    replies: Mutex<VecDeque<Reply>>,
    polls: AtomicUsize,
    initiations: AtomicUsize,
}

impl ScriptedBackend {
    fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BindingBackend for ScriptedBackend {
    async fn initiate(&self, _request: &BindRequest) -> Result<Option<String>, ApiError> {
        self.initiations.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.initiate_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.initiate_error {
            Some(detail) => Err(ApiError::Request {
                status: 404,
                detail: detail.clone(),
            }),
            None => Ok(None),
        }
    }

    async fn check_status(&self, _subject_id: &str) -> Result<BindingStatus, ApiError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Status(status)) => Ok(status),
            Some(Reply::Fail) => Err(ApiError::Decode("connection reset".into())),
            Some(Reply::Expired) => Err(ApiError::AuthExpired),
            None => Ok(unbound()),
        }
    }
}

fn unbound() -> BindingStatus {
    BindingStatus {
        bound: false,
        ..Default::default()
    }
}

fn bound_done(card_count: u32, initial: Option<u32>) -> BindingStatus {
    BindingStatus {
        bound: true,
        binding_in_progress: Some(false),
        card_count: Some(card_count),
        initial_count: initial,
        ..Default::default()
    }
}

fn controller(backend: ScriptedBackend) -> (BindingController<ScriptedBackend>, Arc<ScriptedBackend>) {
    let backend = Arc::new(backend);
    let controller = BindingController::new(Arc::clone(&backend), BindingConfig::default());
    (controller, backend)
}

/// Let spawned tasks run without reaching the first timer tick.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ---------------------------------------------------------------------------
// Terminal outcomes
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn second_poll_completes_binding() {
    let (controller, backend) = controller(ScriptedBackend::with_replies([
        Reply::Status(unbound()),
        Reply::Status(bound_done(2, Some(1))),
    ]));

    let started = Instant::now();
    let session = controller
        .start(BindRequest::existing("S12345", Some("wristband".into())))
        .unwrap();
    let outcome = controller.wait_for_outcome(session).await;

    assert_eq!(outcome, Some(BindingOutcome::Bound { card_count: Some(2) }));
    assert_eq!(started.elapsed(), Duration::from_secs(4));
    assert_eq!(backend.polls(), 2);

    let snap = controller.snapshot();
    assert_eq!(snap.state, BindingState::Success);
    assert!(snap.message.contains('2'));
    assert_eq!(snap.initial_card_count, Some(1));
    assert!(!snap.timers_running);
}

#[tokio::test(start_paused = true)]
async fn unbound_polls_time_out_at_budget() {
    let (controller, backend) = controller(ScriptedBackend::default());

    let started = Instant::now();
    let session = controller.start(BindRequest::existing("S99999", None)).unwrap();
    let outcome = controller.wait_for_outcome(session).await;

    assert_eq!(outcome, Some(BindingOutcome::TimedOut));
    assert_eq!(started.elapsed(), Duration::from_secs(90));
    let snap = controller.snapshot();
    assert_eq!(snap.state, BindingState::Timeout);
    assert_eq!(snap.remaining_seconds, 0);
    assert!(!snap.timers_running);
    assert!((44..=45).contains(&backend.polls()));
}

#[tokio::test(start_paused = true)]
async fn nothing_changes_after_terminal_state() {
    let (controller, backend) = controller(ScriptedBackend::with_replies([Reply::Status(
        bound_done(1, Some(0)),
    )]));

    let session = controller.start(BindRequest::existing("S1", None)).unwrap();
    controller.wait_for_outcome(session).await;
    let terminal = controller.snapshot();
    let polls = backend.polls();

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(controller.snapshot(), terminal);
    assert_eq!(backend.polls(), polls);
}

#[tokio::test(start_paused = true)]
async fn countdown_never_increases() {
    let (controller, _backend) = controller(ScriptedBackend::default());
    let mut rx = controller.subscribe();
    controller.start(BindRequest::existing("S1", None)).unwrap();

    let mut previous = u32::MAX;
    loop {
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        if snap.state == BindingState::AwaitingScan || snap.state.is_terminal() {
            assert!(snap.remaining_seconds <= previous);
            previous = snap.remaining_seconds;
        }
        if snap.state.is_terminal() {
            break;
        }
    }
    assert_eq!(previous, 0);
}

#[tokio::test(start_paused = true)]
async fn poll_failure_is_terminal() {
    let (controller, backend) = controller(ScriptedBackend::with_replies([
        Reply::Status(unbound()),
        Reply::Fail,
    ]));

    let session = controller.start(BindRequest::existing("S1", None)).unwrap();
    let outcome = controller.wait_for_outcome(session).await;

    assert_matches!(outcome, Some(BindingOutcome::Failed { message }) if message == MSG_CONNECTION_LOST);
    assert_eq!(controller.snapshot().state, BindingState::Error);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(backend.polls(), 2, "failed polls are not retried");
}

#[tokio::test(start_paused = true)]
async fn expired_session_during_poll_is_not_a_connection_error() {
    let (controller, backend) = controller(ScriptedBackend::with_replies([Reply::Expired]));

    let session = controller.start(BindRequest::existing("S1", None)).unwrap();
    let outcome = controller.wait_for_outcome(session).await;

    assert_matches!(
        outcome,
        Some(BindingOutcome::Failed { message }) if message == ApiError::AuthExpired.user_message()
    );
    assert_eq!(controller.snapshot().state, BindingState::Error);
    assert_eq!(backend.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn initiation_failure_uses_backend_detail() {
    let (controller, backend) = controller(ScriptedBackend {
        initiate_error: Some(Some("User not found".into())),
        ..Default::default()
    });

    let session = controller.start(BindRequest::existing("S404", None)).unwrap();
    let outcome = controller.wait_for_outcome(session).await;

    assert_matches!(outcome, Some(BindingOutcome::Failed { message }) if message == "User not found");
    assert!(!controller.snapshot().timers_running);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(backend.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn initiation_failure_without_detail_uses_fallback() {
    let (controller, _backend) = controller(ScriptedBackend {
        initiate_error: Some(None),
        ..Default::default()
    });

    let session = controller.start(BindRequest::existing("S1", None)).unwrap();
    controller.wait_for_outcome(session).await;
    assert_eq!(controller.snapshot().message, MSG_INITIATION_FAILED);
}

// ---------------------------------------------------------------------------
// Cancellation and restarts
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_stops_polling() {
    let (controller, backend) = controller(ScriptedBackend::default());
    let session = controller.start(BindRequest::existing("S1", None)).unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(controller.snapshot().state, BindingState::AwaitingScan);

    assert!(controller.cancel());
    assert!(!controller.cancel());
    controller.dispose();

    assert_eq!(controller.wait_for_outcome(session).await, Some(BindingOutcome::Cancelled));
    let snap = controller.snapshot();
    assert_eq!(snap.state, BindingState::Idle);
    assert!(!snap.timers_running);

    let polls = backend.polls();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.polls(), polls);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_submitting_discards_initiation() {
    let (controller, backend) = controller(ScriptedBackend {
        initiate_delay: Some(Duration::from_secs(3)),
        ..Default::default()
    });
    controller.start(BindRequest::existing("S1", None)).unwrap();
    settle().await;
    assert_eq!(controller.snapshot().state, BindingState::Submitting);

    assert!(controller.cancel());
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(controller.snapshot().state, BindingState::Idle);
    assert_eq!(backend.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn second_start_while_active_is_rejected() {
    let (controller, backend) = controller(ScriptedBackend::default());
    controller.start(BindRequest::existing("S1", None)).unwrap();

    let err = controller
        .start(BindRequest::existing("S2", None))
        .unwrap_err();
    assert_matches!(err, BindingError::SessionActive { subject_id } if subject_id == "S1");

    settle().await;
    assert_eq!(backend.initiations.load(Ordering::SeqCst), 1);
    assert_eq!(controller.snapshot().subject_id.as_deref(), Some("S1"));
}

#[tokio::test(start_paused = true)]
async fn invalid_subject_is_rejected_before_any_request() {
    let (controller, backend) = controller(ScriptedBackend::default());
    assert_matches!(
        controller.start(BindRequest::existing("   ", None)),
        Err(BindingError::InvalidSubject(_))
    );
    settle().await;
    assert_eq!(backend.initiations.load(Ordering::SeqCst), 0);
    assert_eq!(controller.snapshot().state, BindingState::Idle);
}

#[tokio::test(start_paused = true)]
async fn restart_after_terminal_resets_session() {
    let (controller, _backend) = controller(ScriptedBackend::with_replies([
        Reply::Status(BindingStatus {
            step: Some(1),
            ..unbound()
        }),
        Reply::Fail,
    ]));

    let first = controller.start(BindRequest::existing("S1", None)).unwrap();
    controller.wait_for_outcome(first).await;
    assert_eq!(controller.snapshot().step, 1);

    let second = controller.start(BindRequest::existing("S2", None)).unwrap();
    assert!(second > first);
    settle().await;

    let snap = controller.snapshot();
    assert_eq!(snap.session_id, second);
    assert_eq!(snap.state, BindingState::AwaitingScan);
    assert_eq!(snap.step, 0);
    assert_eq!(snap.remaining_seconds, 90);
    assert_matches!(
        controller.wait_for_outcome(first).await,
        Some(BindingOutcome::Failed { .. })
    );
    controller.dispose();
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_stops_the_task() {
    let (controller, backend) = controller(ScriptedBackend::default());
    controller.start(BindRequest::existing("S1", None)).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    drop(controller);

    let polls = backend.polls();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.polls(), polls);
}

// ---------------------------------------------------------------------------
// Over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn binds_through_admin_api() {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mode/register"))
        .and(body_string_contains("student_id=S12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Scan the card on the reader"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_status/S12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bound": true, "binding_in_progress": true, "card_count": 3, "initial_count": 2
        })))
        .mount(&server)
        .await;

    let api = Arc::new(AdminApi::new(&ClientConfig::new(server.uri())).unwrap());
    let config = BindingConfig {
        poll_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let controller = BindingController::new(api, config);

    let session = controller
        .start(BindRequest::existing("S12345", Some("spare".into())))
        .unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(5), controller.wait_for_outcome(session))
        .await
        .expect("binding should finish");

    assert_eq!(outcome, Some(BindingOutcome::Bound { card_count: Some(3) }));
}
