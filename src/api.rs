//! Typed client for the photo-event service HTTP contract.
//!
//! The server is an opaque collaborator: face matching, storage and sessions
//! all live behind these endpoints. Application-level failures carry a
//! message extracted from a small prioritized list of response fields;
//! anything that fails before a parsable response is a transport failure and
//! is reported generically.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Where a successful login lands.
pub const DASHBOARD_PATH: &str = "/cms/dashboard";

pub const LOGIN_FALLBACK: &str = "Login failed! Please check your credentials and try again.";
pub const REGISTER_FALLBACK: &str = "Registration failed! Please check your inputs and try again.";
const UNSPECIFIED_SERVER_ERROR: &str = "The server reported an unspecified error.";

pub type PhotoId = u64;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered and signaled failure; the payload is the message
    /// to show the user.
    #[error("{0}")]
    Server(String),
    /// The request never produced a usable response.
    #[error("network failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One face-match hit, in server relevance order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchResult {
    pub id: PhotoId,
    pub similarity: f64,
}

/// A photo known only by reference; bytes are fetched lazily by id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoRef {
    pub id: PhotoId,
}

#[derive(Deserialize)]
struct MatchReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    matches: Vec<MatchResult>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct GalleryReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    photos: Vec<PhotoRef>,
    error: Option<String>,
}

/// The operations the controllers need from the service.
///
/// [`ApiClient`] is the wire implementation; tests substitute recording
/// stubs to observe exactly which calls a controller issues.
pub trait PhotoEventApi {
    fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;
    fn register(
        &self,
        master_token: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<(), ApiError>;
    fn edit_event(&self, event_id: &str, fields: &[(String, String)]) -> Result<(), ApiError>;
    fn delete_event(&self, event_id: &str) -> Result<(), ApiError>;
    fn selfie_match(
        &self,
        selfie_data: &str,
        person_name: &str,
        event_id: &str,
    ) -> Result<Vec<MatchResult>, ApiError>;
    fn all_images(&self, event_id: &str) -> Result<Vec<PhotoRef>, ApiError>;
    fn image_url(&self, id: PhotoId) -> String;
    fn image_available(&self, id: PhotoId) -> bool;
}

pub struct ApiClient {
    base: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Redirects are followed automatically, so a login that ends in a
        // redirect to the dashboard reads as a plain 2xx here.
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl PhotoEventApi for ApiClient {
    fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let form = multipart::Form::new()
            .text("email", email.to_string())
            .text("password", password.to_string());
        let resp = self.http.post(self.url("/auth/login")).multipart(form).send()?;
        if resp.status().is_success() {
            return Ok(DASHBOARD_PATH.to_string());
        }
        let body = resp.text().unwrap_or_default();
        Err(ApiError::Server(extract_message(
            &body,
            &["message", "errors.message"],
            LOGIN_FALLBACK,
        )))
    }

    fn register(
        &self,
        master_token: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "role": role,
        });
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .bearer_auth(master_token)
            .json(&body)
            .send()?;
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        // Success needs both a 2xx and a truthy body flag.
        let accepted = serde_json::from_str::<Value>(&text)
            .map(|v| v["success"].as_bool().unwrap_or(false))
            .unwrap_or(false);
        if status.is_success() && accepted {
            Ok(())
        } else {
            Err(ApiError::Server(extract_message(
                &text,
                &["message", "detail"],
                REGISTER_FALLBACK,
            )))
        }
    }

    fn edit_event(&self, event_id: &str, fields: &[(String, String)]) -> Result<(), ApiError> {
        // The event id rides both in the path and as a form field, matching
        // the edit form the CMS page submits.
        let mut form: Vec<(String, String)> = vec![("event_id".to_string(), event_id.to_string())];
        form.extend(fields.iter().cloned());
        let resp = self
            .http
            .post(self.url(&format!("/cms/edit-event/{event_id}")))
            .form(&form)
            .send()?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Server(format!(
                "edit rejected with status {}",
                resp.status()
            )))
        }
    }

    fn delete_event(&self, event_id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/cms/delete-event/{event_id}")))
            .send()?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Server(format!(
                "delete rejected with status {}",
                resp.status()
            )))
        }
    }

    fn selfie_match(
        &self,
        selfie_data: &str,
        person_name: &str,
        event_id: &str,
    ) -> Result<Vec<MatchResult>, ApiError> {
        let form = multipart::Form::new()
            .text("selfie_data", selfie_data.to_string())
            .text("person_name", person_name.to_string())
            .text("event_id", event_id.to_string());
        let resp = self
            .http
            .post(self.url("/download/selfie-match"))
            .multipart(form)
            .send()?;
        let text = resp.text()?;
        let reply: MatchReply = serde_json::from_str(&text)?;
        if reply.success {
            Ok(reply.matches)
        } else {
            Err(ApiError::Server(reply.error.unwrap_or_else(|| {
                UNSPECIFIED_SERVER_ERROR.to_string()
            })))
        }
    }

    fn all_images(&self, event_id: &str) -> Result<Vec<PhotoRef>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/download/all-images/{event_id}")))
            .send()?;
        let text = resp.text()?;
        let reply: GalleryReply = serde_json::from_str(&text)?;
        if reply.success {
            Ok(reply.photos)
        } else {
            Err(ApiError::Server(reply.error.unwrap_or_else(|| {
                UNSPECIFIED_SERVER_ERROR.to_string()
            })))
        }
    }

    fn image_url(&self, id: PhotoId) -> String {
        self.url(&format!("/download/image/{id}"))
    }

    fn image_available(&self, id: PhotoId) -> bool {
        match self.http.get(self.image_url(id)).send() {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                log::debug!("image {id} probe failed: {err}");
                false
            }
        }
    }
}

/// Walk `fields` (dotted paths) through a JSON error body, returning the
/// first string found, or `fallback` when the body is unparsable or none of
/// the fields are present.
fn extract_message(body: &str, fields: &[&str], fallback: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return fallback.to_string(),
    };
    for path in fields {
        let mut cursor = &value;
        for segment in path.split('.') {
            cursor = &cursor[segment];
        }
        if let Some(msg) = cursor.as_str() {
            return msg.to_string();
        }
    }
    fallback.to_string()
}
