//! Request builder for the contact-graph API.
//!
//! # Design
//! `GraphClient` holds only a `ClientConfig`. `prepare_request` is a pure
//! function of that config and its arguments: it returns a
//! `PreparedRequest` and never sends anything, so the caller picks the
//! transport. The `build_*` helpers go through the `ApiCall` table and add
//! no logic of their own.

use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoints::ApiCall;
use crate::error::ApiError;
use crate::http::{HttpMethod, PreparedRequest, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE};
use crate::types::{
    AddressBookEntry, AddressBookSource, AddressBookUpload, InviteAccepted, InviteSent,
    InviteeType, User, UserId,
};

/// Synchronous request builder for the contact-graph API.
///
/// The secret key and base URL may be changed between calls; every request
/// reflects the values current at the time it is built.
#[derive(Debug, Clone)]
pub struct GraphClient {
    config: ClientConfig,
}

impl GraphClient {
    /// Client for the default base URL.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(secret_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn secret_key(&self) -> &str {
        &self.config.secret_key
    }

    pub fn set_secret_key(&mut self, secret_key: impl Into<String>) {
        self.config.secret_key = secret_key.into();
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.config.base_url = base_url.into();
    }

    /// Join the base URL and `endpoint` with exactly one `/` between them.
    ///
    /// A leading slash on `endpoint` stays under the base URL's path.
    pub fn build_url(&self, endpoint: &str) -> String {
        join_url(&self.config.base_url, endpoint)
    }

    /// Build a request with the bearer token and, when `data` is given, a
    /// JSON body. Data that encodes to JSON `null` counts as no body.
    pub fn prepare_request<T>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: Option<&T>,
    ) -> Result<PreparedRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let body = data
            .map(serde_json::to_string)
            .transpose()?
            .filter(|body| body != "null");

        let mut headers = vec![(
            AUTHORIZATION.to_string(),
            format!("Bearer {}", self.config.secret_key),
        )];
        if body.is_some() {
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }

        let url = self.build_url(endpoint);
        debug!(%method, %url, has_body = body.is_some(), "prepared request");

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    pub fn prepare_call(&self, call: &ApiCall<'_>) -> Result<PreparedRequest, ApiError> {
        self.prepare_request(call.method(), &call.endpoint(), call.payload().as_ref())
    }

    /// `GET test`: checks the secret key.
    pub fn build_test(&self) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::Test)
    }

    pub fn build_get_address_book(&self, user_id: &UserId) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::GetAddressBook(user_id))
    }

    pub fn build_post_address_book(
        &self,
        upload: &AddressBookUpload,
    ) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::PostAddressBook(upload))
    }

    /// Upload an address book given its parts; the source is shaped from
    /// `source_type`, `source_name` and `source_email`.
    pub fn build_upload_address_book(
        &self,
        user_id: impl Into<UserId>,
        entries: Vec<AddressBookEntry>,
        source_type: &str,
        source_name: Option<&str>,
        source_email: Option<&str>,
    ) -> Result<PreparedRequest, ApiError> {
        let source = AddressBookSource {
            kind: source_type.to_string(),
            name: source_name.map(str::to_string),
            email: source_email.map(str::to_string),
        };
        self.build_post_address_book(&AddressBookUpload::new(user_id, source, entries))
    }

    pub fn build_get_client_key(&self, user_id: &UserId) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::GetClientKey(user_id))
    }

    pub fn build_post_invites_accepted(
        &self,
        invites: &[InviteAccepted],
    ) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::PostInvitesAccepted(invites))
    }

    /// Record a single accepted invite as a one-entry batch.
    pub fn build_post_invite_accepted(
        &self,
        user_id: impl Into<UserId>,
        invitee_id: &str,
        invitee_type: InviteeType,
        accepted_at: Option<&str>,
    ) -> Result<PreparedRequest, ApiError> {
        let invite = InviteAccepted {
            user_id: user_id.into(),
            invitee_id: invitee_id.to_string(),
            invitee_type,
            accepted_at: accepted_at.map(str::to_string),
            new_user_id: None,
        };
        self.build_post_invites_accepted(std::slice::from_ref(&invite))
    }

    pub fn build_post_invites_sent(
        &self,
        invites: &[InviteSent],
    ) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::PostInvitesSent(invites))
    }

    /// Record a single sent invite as a one-entry batch.
    pub fn build_post_invite_sent(
        &self,
        user_id: impl Into<UserId>,
        invitee_id: &str,
        invitee_type: InviteeType,
        sent_at: Option<&str>,
    ) -> Result<PreparedRequest, ApiError> {
        let invite = InviteSent {
            user_id: user_id.into(),
            invitee_id: invitee_id.to_string(),
            invitee_type,
            sent_at: sent_at.map(str::to_string),
        };
        self.build_post_invites_sent(std::slice::from_ref(&invite))
    }

    pub fn build_get_users(&self) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::GetUsers)
    }

    pub fn build_post_users(&self, users: &[User]) -> Result<PreparedRequest, ApiError> {
        self.prepare_call(&ApiCall::PostUsers(users))
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
