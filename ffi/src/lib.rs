//! C-ABI wrapper around `contact-graph-core`.
//!
//! # Overview
//! Exposes request building through `extern "C"` functions so any language
//! with a C FFI can produce authenticated contact-graph requests and send
//! them with its own HTTP stack. `cbindgen` generates `contact_graph.h` into
//! the build's `OUT_DIR`; set `CONTACT_GRAPH_HEADER_DIR` at build time to
//! also write it to a directory of your choice.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `graph_build_*` per core `build_*`; payloads are passed as JSON
//!   strings and decoded into the core DTOs.
//! - Null or invalid arguments yield a null return.
//! - The C caller owns every returned pointer and must release it with the
//!   matching `graph_free_*` function.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, UnwindSafe};

use contact_graph_core::{
    AddressBookUpload, ClientConfig, GraphClient, InviteAccepted, InviteSent, PreparedRequest,
    User, UserId,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use types::*;

/// Borrow a C string as `&str`. `None` for null or non-UTF-8 input.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Decode a JSON C string into `T`, logging why it was rejected.
///
/// # Safety
/// Same contract as `c_str`.
unsafe fn c_json<T: DeserializeOwned>(ptr: *const c_char, what: &str) -> Option<T> {
    let raw = unsafe { c_str(ptr) }?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(argument = what, error = %err, "rejected invalid JSON argument");
            None
        }
    }
}

/// Run `build` against the client behind `client` and hand the result to C.
fn build_request<F>(client: *const FfiGraphClient, build: F) -> *mut FfiHttpRequest
where
    F: FnOnce(&GraphClient) -> Option<PreparedRequest> + UnwindSafe,
{
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        build(&client.inner)
            .and_then(FfiHttpRequest::from_core)
            .unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `GraphClient` for `secret_key`.
///
/// `base_url` may be null, in which case the public API root is used.
/// Returns null if `secret_key` is null or not UTF-8.
/// The caller must free the returned pointer with `graph_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn graph_client_new(
    secret_key: *const c_char,
    base_url: *const c_char,
) -> *mut FfiGraphClient {
    catch_unwind(|| {
        let Some(key) = (unsafe { c_str(secret_key) }) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(key);
        if let Some(url) = unsafe { c_str(base_url) } {
            config = config.with_base_url(url);
        }
        let client = GraphClient::with_config(config);
        Box::into_raw(Box::new(FfiGraphClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `graph_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn graph_client_free(client: *mut FfiGraphClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Replace the secret key used by subsequent requests.
///
/// Returns false if either argument is null or the key is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn graph_client_set_secret_key(
    client: *mut FfiGraphClient,
    secret_key: *const c_char,
) -> bool {
    catch_unwind(|| {
        if client.is_null() {
            return false;
        }
        let Some(key) = (unsafe { c_str(secret_key) }) else {
            return false;
        };
        let client = unsafe { &mut *client };
        client.inner.set_secret_key(key);
        true
    })
    .unwrap_or(false)
}

/// Replace the base URL used by subsequent requests.
#[unsafe(no_mangle)]
pub extern "C" fn graph_client_set_base_url(
    client: *mut FfiGraphClient,
    base_url: *const c_char,
) -> bool {
    catch_unwind(|| {
        if client.is_null() {
            return false;
        }
        let Some(url) = (unsafe { c_str(base_url) }) else {
            return false;
        };
        let client = unsafe { &mut *client };
        client.inner.set_base_url(url);
        true
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Generic building
// ---------------------------------------------------------------------------

/// Absolute URL for `endpoint` under the client's base URL.
///
/// The caller must free the returned string with `graph_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_url(
    client: *const FfiGraphClient,
    endpoint: *const c_char,
) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(endpoint) = (unsafe { c_str(endpoint) }) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        CString::new(client.inner.build_url(endpoint))
            .map_or(std::ptr::null_mut(), CString::into_raw)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for an arbitrary endpoint.
///
/// `json_body` may be null for a bodyless request; otherwise it must be
/// valid JSON, which is re-encoded as the request body. A JSON `null` is
/// treated the same as a null pointer.
#[unsafe(no_mangle)]
pub extern "C" fn graph_prepare_request(
    client: *const FfiGraphClient,
    method: FfiHttpMethod,
    endpoint: *const c_char,
    json_body: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let endpoint = unsafe { c_str(endpoint) }?;
        let body: Option<serde_json::Value> = if json_body.is_null() {
            None
        } else {
            Some(unsafe { c_json(json_body, "json_body") }?)
        };
        client
            .prepare_request(method.into(), endpoint, body.as_ref())
            .ok()
    })
}

// ---------------------------------------------------------------------------
// Endpoint builders
// ---------------------------------------------------------------------------

/// `GET test`.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_test(client: *const FfiGraphClient) -> *mut FfiHttpRequest {
    build_request(client, |client| client.build_test().ok())
}

/// `GET address-book/{user_id}`.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_get_address_book(
    client: *const FfiGraphClient,
    user_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let user_id = UserId::from(unsafe { c_str(user_id) }?);
        client.build_get_address_book(&user_id).ok()
    })
}

/// `POST address-book`. `upload_json` is an address book upload object.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_post_address_book(
    client: *const FfiGraphClient,
    upload_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let upload: AddressBookUpload = unsafe { c_json(upload_json, "upload_json") }?;
        client.build_post_address_book(&upload).ok()
    })
}

/// `GET client-key/{user_id}`.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_get_client_key(
    client: *const FfiGraphClient,
    user_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let user_id = UserId::from(unsafe { c_str(user_id) }?);
        client.build_get_client_key(&user_id).ok()
    })
}

/// `POST invite/accepted`. `entries_json` is a JSON array of events.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_post_invites_accepted(
    client: *const FfiGraphClient,
    entries_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let invites: Vec<InviteAccepted> = unsafe { c_json(entries_json, "entries_json") }?;
        client.build_post_invites_accepted(&invites).ok()
    })
}

/// `POST invite/sent`. `entries_json` is a JSON array of events.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_post_invites_sent(
    client: *const FfiGraphClient,
    entries_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let invites: Vec<InviteSent> = unsafe { c_json(entries_json, "entries_json") }?;
        client.build_post_invites_sent(&invites).ok()
    })
}

/// `GET users`.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_get_users(client: *const FfiGraphClient) -> *mut FfiHttpRequest {
    build_request(client, |client| client.build_get_users().ok())
}

/// `POST users`. `users_json` is a JSON array of users.
#[unsafe(no_mangle)]
pub extern "C" fn graph_build_post_users(
    client: *const FfiGraphClient,
    users_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, move |client| {
        let users: Vec<User> = unsafe { c_json(users_json, "users_json") }?;
        client.build_post_users(&users).ok()
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any builder. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn graph_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn graph_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn new_client(key: &str, base_url: Option<&str>) -> *mut FfiGraphClient {
        let key = CString::new(key).unwrap();
        let url = base_url.map(|u| CString::new(u).unwrap());
        graph_client_new(
            key.as_ptr(),
            url.as_ref().map_or(std::ptr::null(), |u| u.as_ptr()),
        )
    }

    fn read(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    fn headers(req: &FfiHttpRequest) -> Vec<(String, String)> {
        if req.headers.is_null() {
            return Vec::new();
        }
        let slice = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        slice.iter().map(|h| (read(h.key), read(h.value))).collect()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client("foo", None);
        assert!(!client.is_null());
        graph_client_free(client);
    }

    #[test]
    fn client_new_null_key_returns_null() {
        let client = graph_client_new(std::ptr::null(), std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        graph_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_url_uses_default_base() {
        let client = new_client("foo", None);
        let endpoint = CString::new("/test").unwrap();
        let url = graph_build_url(client, endpoint.as_ptr());
        assert_eq!(read(url), "https://api.example.com/v0/test");
        graph_free_string(url);
        graph_client_free(client);
    }

    #[test]
    fn build_test_returns_authorized_get() {
        let client = new_client("foo", None);
        let req = graph_build_test(client);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(read(req_ref.url), "https://api.example.com/v0/test");
        assert!(req_ref.body.is_null());
        assert_eq!(
            headers(req_ref),
            vec![("authorization".to_string(), "Bearer foo".to_string())]
        );

        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn build_test_null_client_returns_null() {
        assert!(graph_build_test(std::ptr::null()).is_null());
    }

    #[test]
    fn setters_affect_next_request() {
        let client = new_client("old", None);
        let key = CString::new("the-s3cr3t-key").unwrap();
        let url = CString::new("http://www.example.org").unwrap();
        assert!(graph_client_set_secret_key(client, key.as_ptr()));
        assert!(graph_client_set_base_url(client, url.as_ptr()));

        let req = graph_build_get_users(client);
        let req_ref = unsafe { &*req };
        assert_eq!(read(req_ref.url), "http://www.example.org/users");
        assert_eq!(headers(req_ref)[0].1, "Bearer the-s3cr3t-key");

        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn setters_reject_null() {
        let client = new_client("foo", None);
        assert!(!graph_client_set_secret_key(client, std::ptr::null()));
        assert!(!graph_client_set_base_url(std::ptr::null_mut(), std::ptr::null()));
        graph_client_free(client);
    }

    #[test]
    fn get_address_book_embeds_user_id() {
        let client = new_client("foo", Some("http://localhost:3000/v0/"));
        let id = CString::new("42").unwrap();
        let req = graph_build_get_address_book(client, id.as_ptr());
        assert!(!req.is_null());
        assert_eq!(read(unsafe { &*req }.url), "http://localhost:3000/v0/address-book/42");
        graph_free_request(req);

        let req = graph_build_get_client_key(client, id.as_ptr());
        assert_eq!(read(unsafe { &*req }.url), "http://localhost:3000/v0/client-key/42");
        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn post_users_produces_json_body() {
        let client = new_client("foo", None);
        let users = CString::new(r#"[{"user_id":"1","name":"Ada"}]"#).unwrap();
        let req = graph_build_post_users(client, users.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(req_ref.headers_len, 2);
        let body: serde_json::Value = serde_json::from_str(&read(req_ref.body)).unwrap();
        assert_eq!(body["entries"][0]["user_id"], "1");
        assert_eq!(body["entries"][0]["name"], "Ada");

        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn post_invites_sent_rejects_bad_invitee_type() {
        let client = new_client("foo", None);
        let entries =
            CString::new(r#"[{"user_id":"1","invitee_id":"x","invitee_type":"fax"}]"#).unwrap();
        assert!(graph_build_post_invites_sent(client, entries.as_ptr()).is_null());
        graph_client_free(client);
    }

    #[test]
    fn post_invites_accepted_and_address_book() {
        let client = new_client("foo", None);
        let entries = CString::new(
            r#"[{"user_id":"42","invitee_id":"a@example.com","invitee_type":"email"}]"#,
        )
        .unwrap();
        let req = graph_build_post_invites_accepted(client, entries.as_ptr());
        assert_eq!(read(unsafe { &*req }.url), "https://api.example.com/v0/invite/accepted");
        graph_free_request(req);

        let upload =
            CString::new(r#"{"user_id":"1","source":{"type":"gmail"},"entries":[]}"#).unwrap();
        let req = graph_build_post_address_book(client, upload.as_ptr());
        let body: serde_json::Value = serde_json::from_str(&read(unsafe { &*req }.body)).unwrap();
        assert_eq!(body["source"]["type"], "gmail");
        graph_free_request(req);
        graph_client_free(client);
    }

    /// `graph_prepare_request` with an optional JSON body string.
    fn prepare(
        client: *const FfiGraphClient,
        method: FfiHttpMethod,
        endpoint: &str,
        body: Option<&str>,
    ) -> *mut FfiHttpRequest {
        let endpoint = CString::new(endpoint).unwrap();
        let body = body.map(|b| CString::new(b).unwrap());
        let body_ptr = body.as_ref().map_or(std::ptr::null(), |b| b.as_ptr());
        graph_prepare_request(client, method, endpoint.as_ptr(), body_ptr)
    }

    #[test]
    fn prepare_request_with_and_without_body() {
        let client = new_client("foo", None);

        let req = prepare(client, FfiHttpMethod::Delete, "custom/thing", None);
        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Delete);
        assert!(req_ref.body.is_null());
        assert_eq!(req_ref.headers_len, 1);
        graph_free_request(req);

        let req = prepare(client, FfiHttpMethod::Patch, "custom/thing", Some(r#"{ "a" : 1 }"#));
        let req_ref = unsafe { &*req };
        assert_eq!(read(req_ref.body), r#"{"a":1}"#);
        assert_eq!(
            headers(req_ref)[1],
            ("content-type".to_string(), "application/json".to_string())
        );
        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn prepare_request_json_null_is_bodyless() {
        let client = new_client("foo", None);
        let req = prepare(client, FfiHttpMethod::Post, "custom/thing", Some(" null "));
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(req_ref.body.is_null());
        assert_eq!(req_ref.headers_len, 1);
        assert_eq!(headers(req_ref)[0].0, "authorization");

        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn prepare_request_rejects_invalid_json() {
        let client = new_client("foo", None);
        let req = prepare(client, FfiHttpMethod::Post, "users", Some("{not json"));
        assert!(req.is_null());
        graph_client_free(client);
    }

    #[test]
    fn numeric_user_ids_are_sent_as_strings() {
        let client = new_client("foo", None);
        let users = CString::new(r#"[{"user_id":42,"name":"Ada"}]"#).unwrap();
        let req = graph_build_post_users(client, users.as_ptr());
        assert!(!req.is_null());
        let body: serde_json::Value = serde_json::from_str(&read(unsafe { &*req }.body)).unwrap();
        assert_eq!(body["entries"][0]["user_id"], "42");
        graph_free_request(req);

        let entries = serde_json::json!([{
            "user_id": 42,
            "invitee_id": "a@example.com",
            "invitee_type": "email",
            "new_user_id": 43,
        }]);
        let entries = CString::new(entries.to_string()).unwrap();
        let req = graph_build_post_invites_accepted(client, entries.as_ptr());
        assert!(!req.is_null());
        let body: serde_json::Value = serde_json::from_str(&read(unsafe { &*req }.body)).unwrap();
        assert_eq!(body["entries"][0]["user_id"], "42");
        assert_eq!(body["entries"][0]["new_user_id"], "43");
        graph_free_request(req);
        graph_client_free(client);
    }

    #[test]
    fn header_is_generated_into_out_dir() {
        let path = std::path::Path::new(env!("OUT_DIR")).join("contact_graph.h");
        let header = std::fs::read_to_string(path).unwrap();
        assert!(header.contains("CONTACT_GRAPH_H"));
        assert!(header.contains("graph_prepare_request"));
        assert!(header.contains("FfiHttpRequest"));
    }

    #[test]
    fn free_request_null_is_safe() {
        graph_free_request(std::ptr::null_mut());
        graph_free_string(std::ptr::null_mut());
    }
}
