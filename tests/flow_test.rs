use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use grupeta::flow;
use grupeta::importer::{HeaderRow, ParseOptions};
use grupeta::model::DeliveryStatus;
use grupeta::provider::{AddOutcome, ApiError, GroupService};
use grupeta::session::{Session, SessionError};

fn opts() -> ParseOptions {
    ParseOptions {
        header: HeaderRow::None,
        ..ParseOptions::default()
    }
}

#[derive(Debug, Clone)]
struct CreateCall {
    subject: String,
    admin: String,
}

#[derive(Debug, Clone)]
struct AddCall {
    group_id: String,
    phones: Vec<String>,
}

/// Scripted provider: records every call, pops pre-loaded responses, and
/// defaults to success when the script runs dry.
#[derive(Default)]
struct RecordingService {
    create_responses: Arc<Mutex<VecDeque<Result<String, ApiError>>>>,
    add_responses: Arc<Mutex<VecDeque<Result<AddOutcome, ApiError>>>>,
    create_calls: Arc<Mutex<Vec<CreateCall>>>,
    add_calls: Arc<Mutex<Vec<AddCall>>>,
}

impl RecordingService {
    fn with_add_responses(responses: Vec<Result<AddOutcome, ApiError>>) -> Self {
        Self {
            add_responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    fn create_calls(&self) -> Vec<CreateCall> {
        self.create_calls.lock().unwrap().clone()
    }

    fn add_calls(&self) -> Vec<AddCall> {
        self.add_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroupService for RecordingService {
    async fn create_group(&self, subject: &str, admin_phone: &str) -> Result<String, ApiError> {
        self.create_calls.lock().unwrap().push(CreateCall {
            subject: subject.to_string(),
            admin: admin_phone.to_string(),
        });
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("group-1".into()))
    }

    async fn add_participants(
        &self,
        group_id: &str,
        phones: &[String],
    ) -> Result<AddOutcome, ApiError> {
        self.add_calls.lock().unwrap().push(AddCall {
            group_id: group_id.to_string(),
            phones: phones.to_vec(),
        });
        self.add_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AddOutcome::default()))
    }
}

fn statuses(session: &Session) -> Vec<DeliveryStatus> {
    session
        .selected_participants()
        .iter()
        .map(|p| p.status)
        .collect()
}

#[tokio::test]
async fn full_flow_folds_the_failed_list_into_statuses() {
    // Three imported, one with an undeliverable number.
    let roster = "id,Jane,612345678\nid,John,698765432\nid,Bad,512345678";
    let mut session = Session::new();
    session.import("Yoga", roster, &opts()).unwrap();
    assert_eq!(
        statuses(&session),
        vec![
            DeliveryStatus::Pending,
            DeliveryStatus::Pending,
            DeliveryStatus::Error,
        ]
    );

    let service = RecordingService::with_add_responses(vec![Ok(AddOutcome {
        failed: vec!["34698765432".to_string()],
    })]);

    let admin = "600 000 000";
    let group_id = flow::create_group(&service, &mut session, admin).await.unwrap();
    assert_eq!(group_id, "group-1");
    assert_eq!(session.group_id(), Some("group-1"));

    let summary = flow::add_participants(&service, &mut session, admin)
        .await
        .unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.failed, 1);

    // One provider rejection plus the parse-time error.
    assert_eq!(
        statuses(&session),
        vec![
            DeliveryStatus::Success,
            DeliveryStatus::Error,
            DeliveryStatus::Error,
        ]
    );

    let create_calls = service.create_calls();
    assert_eq!(create_calls.len(), 1);
    assert_eq!(create_calls[0].subject, "Yoga");
    assert_eq!(create_calls[0].admin, "34600000000");

    // The invalid number never reaches the provider.
    let add_calls = service.add_calls();
    assert_eq!(add_calls.len(), 1);
    assert_eq!(add_calls[0].group_id, "group-1");
    assert_eq!(
        add_calls[0].phones,
        vec!["34612345678".to_string(), "34698765432".to_string()]
    );
}

#[tokio::test]
async fn create_group_requires_a_selected_activity() {
    let service = RecordingService::default();
    let mut session = Session::new();
    let err = flow::create_group(&service, &mut session, "600000000")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::NoActivitySelected)
    ));
    assert!(service.create_calls().is_empty());
}

#[tokio::test]
async fn add_participants_requires_a_created_group() {
    let service = RecordingService::default();
    let mut session = Session::new();
    session
        .import("Yoga", "id,Jane,612345678", &opts())
        .unwrap();

    let err = flow::add_participants(&service, &mut session, "600000000")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::GroupNotCreated)
    ));
    assert!(service.add_calls().is_empty());
    assert_eq!(
        statuses(&session),
        vec![DeliveryStatus::Pending],
        "a refused action leaves the batch untouched"
    );
}

#[tokio::test]
async fn admin_only_rosters_refuse_to_submit() {
    let service = RecordingService::default();
    let mut session = Session::new();
    session
        .import("Yoga", "id,Admin,612345678", &opts())
        .unwrap();
    session.set_group("group-1".into());

    let err = flow::add_participants(&service, &mut session, "612345678")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::NothingToAdd)
    ));
    assert!(service.add_calls().is_empty());
}

#[tokio::test]
async fn a_provider_failure_keeps_statuses_pending_for_retry() {
    let service = RecordingService::with_add_responses(vec![Err(ApiError::RateLimited)]);
    let mut session = Session::new();
    session
        .import("Yoga", "id,Jane,612345678\nid,John,698765432", &opts())
        .unwrap();
    flow::create_group(&service, &mut session, "600000000")
        .await
        .unwrap();

    let err = flow::add_participants(&service, &mut session, "600000000")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::RateLimited)
    ));
    // No outcome was applied; a manual re-run starts from the same state.
    assert_eq!(
        statuses(&session),
        vec![DeliveryStatus::Pending, DeliveryStatus::Pending]
    );
    assert_eq!(session.group_id(), Some("group-1"));

    // Second attempt succeeds and resolves everything.
    let summary = flow::add_participants(&service, &mut session, "600000000")
        .await
        .unwrap();
    assert_eq!(summary.failed, 0);
    assert_eq!(
        statuses(&session),
        vec![DeliveryStatus::Success, DeliveryStatus::Success]
    );
}
