//! Payload DTOs for the contact-graph API.
//!
//! # Design
//! These mirror the service's JSON bodies but are defined independently of
//! the mock server's copies; integration tests catch drift between the two.
//! Optional fields and empty lists are left out of the encoded JSON so the
//! service applies its own defaults.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a user in the caller's own system.
///
/// Always sent as a JSON string, even when built or decoded from a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(id) => Self(id),
            Raw::Number(id) => Self(id.to_string()),
        })
    }
}

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id percent-encoded for use as a single path segment.
    pub fn path_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One contact from a user's address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<String>,
}

/// Where an address book was imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookSource {
    /// Provider name, e.g. `gmail`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AddressBookSource {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            email: None,
        }
    }
}

/// Body of `POST address-book`.
///
/// The filter and promote flags tune the ranked suggestions the service
/// computes from the upload; unset flags are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookUpload {
    pub user_id: UserId,
    pub source: AddressBookSource,
    pub entries: Vec<AddressBookEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_suggested_seen: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_existing_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_invites_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_blank_names: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promote_existing_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promote_matching_domain: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl AddressBookUpload {
    pub fn new(
        user_id: impl Into<UserId>,
        source: AddressBookSource,
        entries: Vec<AddressBookEntry>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            source,
            entries,
            filter_suggested_seen: None,
            filter_existing_users: None,
            filter_invites_sent: None,
            filter_blank_names: None,
            promote_existing_users: None,
            promote_matching_domain: None,
            limit: None,
        }
    }
}

/// How an invitee is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteeType {
    Email,
    Phone,
}

/// An invite a user sent. `sent_at` is an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteSent {
    pub user_id: UserId,
    pub invitee_id: String,
    pub invitee_type: InviteeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
}

/// An invite that was accepted. `new_user_id` is the account the invitee
/// created, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteAccepted {
    pub user_id: UserId,
    pub invitee_id: String,
    pub invitee_type: InviteeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_user_id: Option<UserId>,
}

/// A user of the caller's application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<String>,
}

/// `{"entries": [...]}` wrapper used by the batch endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Entries<'a, T> {
    pub entries: &'a [T],
}
