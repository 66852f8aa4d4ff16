//! Insertion-ordered registry of activities and their participants.

use chrono::Utc;

use crate::model::{Activity, Participant};

/// Activity registry for one session.
///
/// Names keep first-insertion order; re-adding a name overwrites its
/// participant list in place (no merge).
#[derive(Debug, Default)]
pub struct ActivityRoster {
    entries: Vec<Activity>,
}

impl ActivityRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp every participant with `name` and store the batch under it.
    ///
    /// Preconditions (non-empty name, non-empty batch) are the session's to
    /// enforce; the registry itself accepts whatever it is handed.
    pub fn add_activity(&mut self, name: &str, mut participants: Vec<Participant>) {
        for p in &mut participants {
            p.activity = name.to_string();
        }
        let activity = Activity {
            name: name.to_string(),
            participants,
            imported_at: Utc::now(),
        };
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => *existing = activity,
            None => self.entries.push(activity),
        }
    }

    /// The stored batch for `name`; empty for unknown or blank names.
    pub fn select(&self, name: &str) -> &[Participant] {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.participants.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn select_mut(&mut self, name: &str) -> Option<&mut Vec<Participant>> {
        self.entries
            .iter_mut()
            .find(|a| a.name == name)
            .map(|a| &mut a.participants)
    }

    /// Activity names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
