//! Fixed table of API operations.
//!
//! Each variant maps typed arguments to the `(method, endpoint, payload)`
//! triple that `GraphClient::prepare_call` feeds into `prepare_request`.
//! Nothing here touches configuration or the network.

use serde::Serialize;

use crate::http::HttpMethod;
use crate::types::{AddressBookUpload, Entries, InviteAccepted, InviteSent, User, UserId};

#[derive(Debug, Clone, Copy)]
pub enum ApiCall<'a> {
    /// Authentication check.
    Test,
    GetAddressBook(&'a UserId),
    PostAddressBook(&'a AddressBookUpload),
    GetClientKey(&'a UserId),
    PostInvitesAccepted(&'a [InviteAccepted]),
    PostInvitesSent(&'a [InviteSent]),
    GetUsers,
    PostUsers(&'a [User]),
}

/// Request body of an `ApiCall`, borrowed from the call's arguments.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload<'a> {
    AddressBook(&'a AddressBookUpload),
    InvitesAccepted(Entries<'a, InviteAccepted>),
    InvitesSent(Entries<'a, InviteSent>),
    Users(Entries<'a, User>),
}

impl<'a> ApiCall<'a> {
    pub fn method(&self) -> HttpMethod {
        match self {
            ApiCall::Test
            | ApiCall::GetAddressBook(_)
            | ApiCall::GetClientKey(_)
            | ApiCall::GetUsers => HttpMethod::Get,
            ApiCall::PostAddressBook(_)
            | ApiCall::PostInvitesAccepted(_)
            | ApiCall::PostInvitesSent(_)
            | ApiCall::PostUsers(_) => HttpMethod::Post,
        }
    }

    /// Path relative to the base URL. User ids are percent-encoded.
    pub fn endpoint(&self) -> String {
        match self {
            ApiCall::Test => "test".to_string(),
            ApiCall::GetAddressBook(user_id) => {
                format!("address-book/{}", user_id.path_segment())
            }
            ApiCall::PostAddressBook(_) => "address-book".to_string(),
            ApiCall::GetClientKey(user_id) => format!("client-key/{}", user_id.path_segment()),
            ApiCall::PostInvitesAccepted(_) => "invite/accepted".to_string(),
            ApiCall::PostInvitesSent(_) => "invite/sent".to_string(),
            ApiCall::GetUsers | ApiCall::PostUsers(_) => "users".to_string(),
        }
    }

    pub fn payload(&self) -> Option<Payload<'a>> {
        match *self {
            ApiCall::Test
            | ApiCall::GetAddressBook(_)
            | ApiCall::GetClientKey(_)
            | ApiCall::GetUsers => None,
            ApiCall::PostAddressBook(upload) => Some(Payload::AddressBook(upload)),
            ApiCall::PostInvitesAccepted(entries) => {
                Some(Payload::InvitesAccepted(Entries { entries }))
            }
            ApiCall::PostInvitesSent(entries) => Some(Payload::InvitesSent(Entries { entries })),
            ApiCall::PostUsers(entries) => Some(Payload::Users(Entries { entries })),
        }
    }
}
