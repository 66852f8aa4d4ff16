//! The sequential user actions: create a group, add participants.
//!
//! Each function is one awaited step over the session and the provider
//! service; nothing runs concurrently and nothing is retried. Failures leave
//! the session intact so the action can simply be re-invoked.

use anyhow::Result;
use tracing::info;

use crate::phone;
use crate::provider::GroupService;
use crate::session::{Session, SessionError};

/// Counts reported after an add-participants action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddSummary {
    pub attempted: usize,
    pub failed: usize,
}

/// Create the provider group for the selected activity and record its id.
pub async fn create_group(
    service: &dyn GroupService,
    session: &mut Session,
    admin_phone: &str,
) -> Result<String> {
    let subject = session
        .selected_activity()
        .ok_or(SessionError::NoActivitySelected)?
        .to_string();
    if session.selected_participants().is_empty() {
        return Err(SessionError::NoParticipants.into());
    }

    let admin = phone::normalize(admin_phone);
    let id = service.create_group(&subject, &admin).await?;
    info!(group = %id, subject = %subject, "group created");
    session.set_group(id.clone());
    Ok(id)
}

/// Add the selection's deliverable numbers to the created group and fold the
/// provider's outcome into per-record status.
pub async fn add_participants(
    service: &dyn GroupService,
    session: &mut Session,
    admin_phone: &str,
) -> Result<AddSummary> {
    let group_id = session
        .group_id()
        .ok_or(SessionError::GroupNotCreated)?
        .to_string();
    let recipients = session.recipients(admin_phone);
    if recipients.is_empty() {
        return Err(SessionError::NothingToAdd.into());
    }

    let attempted = recipients.len();
    let outcome = service.add_participants(&group_id, &recipients).await?;
    session.apply_add_outcome(admin_phone, &outcome.failed);
    info!(
        group = %group_id,
        attempted,
        failed = outcome.failed.len(),
        "participants submitted"
    );
    Ok(AddSummary {
        attempted,
        failed: outcome.failed.len(),
    })
}
