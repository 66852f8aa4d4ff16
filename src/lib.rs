//! Roster import and group creation against a messaging provider.
//!
//! The pipeline: acquire delimited text ([`source`]), parse it into
//! participant records with normalized phone numbers ([`importer`],
//! [`phone`]), register the batch under an activity name ([`roster`],
//! [`session`]), then drive the provider's HTTP API to create a group and
//! add the numbers to it ([`provider`], [`flow`]).

pub mod config;
pub mod flow;
pub mod importer;
pub mod model;
pub mod phone;
pub mod provider;
pub mod roster;
pub mod session;
pub mod source;
