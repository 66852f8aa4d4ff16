//! Session state: the activity roster, the current selection, and the group
//! id returned by the provider.
//!
//! One `Session` spans one run of the tool. Nothing in it is persisted;
//! `reset` and drop are equivalent.

use thiserror::Error;

use crate::importer::{parse_participants, ParseOptions};
use crate::model::{DeliveryStatus, Participant};
use crate::phone;
use crate::roster::ActivityRoster;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("activity name must be non-empty")]
    EmptyActivityName,
    #[error("the input contains no valid participants")]
    NoParticipants,
    #[error("no activity selected")]
    NoActivitySelected,
    #[error("create the group before adding participants")]
    GroupNotCreated,
    #[error("no deliverable numbers to add (only the admin or invalid numbers)")]
    NothingToAdd,
}

#[derive(Debug, Default)]
pub struct Session {
    roster: ActivityRoster,
    selected: Option<String>,
    group_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all imported data and any created group id.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Parse `text`, register the batch under `name`, and select it.
    ///
    /// Rejects a blank activity name and an empty parse result before the
    /// registry is touched, so no half-imported state is left behind.
    pub fn import(
        &mut self,
        name: &str,
        text: &str,
        opts: &ParseOptions,
    ) -> Result<usize, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyActivityName);
        }
        let participants = parse_participants(text, opts);
        if participants.is_empty() {
            return Err(SessionError::NoParticipants);
        }
        let count = participants.len();
        self.roster.add_activity(name, participants);
        self.selected = Some(name.to_string());
        Ok(count)
    }

    /// Switch the selection; a blank name clears it. Returns the number of
    /// participants now in view.
    pub fn select(&mut self, name: &str) -> usize {
        if name.trim().is_empty() {
            self.selected = None;
            return 0;
        }
        let count = self.roster.select(name).len();
        self.selected = Some(name.to_string());
        count
    }

    pub fn selected_activity(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_participants(&self) -> &[Participant] {
        self.selected
            .as_deref()
            .map(|name| self.roster.select(name))
            .unwrap_or(&[])
    }

    pub fn roster(&self) -> &ActivityRoster {
        &self.roster
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Record the id of a successfully created group.
    pub fn set_group(&mut self, id: String) {
        self.group_id = Some(id);
    }

    /// Normalized phones to submit for the current selection: deliverable
    /// numbers only, the admin's own number excluded, source order kept.
    pub fn recipients(&self, admin_phone: &str) -> Vec<String> {
        let admin = phone::normalize(admin_phone);
        self.selected_participants()
            .iter()
            .filter(|p| p.is_deliverable())
            .map(|p| p.phone.clone())
            .filter(|tel| *tel != admin)
            .collect()
    }

    /// Fold the provider's add-participants outcome into per-record status.
    ///
    /// Invalid numbers stay `error`, the admin's own number is `success`
    /// (already in the group from creation), numbers in the provider's
    /// `failed` list become `error`, and everything else becomes `success`.
    pub fn apply_add_outcome(&mut self, admin_phone: &str, failed: &[String]) {
        let admin = phone::normalize(admin_phone);
        let Some(name) = self.selected.clone() else {
            return;
        };
        let Some(participants) = self.roster.select_mut(&name) else {
            return;
        };
        for p in participants.iter_mut() {
            p.status = if !phone::is_valid(&p.phone) {
                DeliveryStatus::Error
            } else if p.phone == admin {
                DeliveryStatus::Success
            } else if failed.iter().any(|f| f == &p.phone) {
                DeliveryStatus::Error
            } else {
                DeliveryStatus::Success
            };
        }
    }
}
