//! Login and registration controllers.
//!
//! Both are single-shot: read the submitted fields, make one request, report
//! through the notification center. Credentials are request-scoped and
//! dropped afterwards.

use crate::api::{ApiError, PhotoEventApi};
use crate::notify::NotifyCenter;

pub const LOGIN_NETWORK_ERROR: &str = "An error occurred during login.";
pub const REGISTER_NETWORK_ERROR: &str = "An error occurred during registration.";
pub const MASTER_TOKEN_REQUIRED: &str = "Master token is required!";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match!";
pub const REGISTER_SUCCESS: &str = "Admin registered successfully!";

/// Submit credentials. On success returns the dashboard path the caller
/// should navigate to; on failure the reason lands in `notify`.
pub fn login(
    api: &impl PhotoEventApi,
    notify: &mut NotifyCenter,
    email: &str,
    password: &str,
) -> Option<String> {
    match api.login(email, password) {
        Ok(destination) => Some(destination),
        Err(ApiError::Server(message)) => {
            notify.error(message);
            None
        }
        Err(err) => {
            log::error!("login request failed: {err}");
            notify.error(LOGIN_NETWORK_ERROR);
            None
        }
    }
}

/// The admin-creation form. The role selection survives a successful
/// submission; the four text inputs are cleared.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub master_token: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            master_token: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: "admin".to_string(),
        }
    }
}

impl RegistrationForm {
    fn clear_inputs(&mut self) {
        self.master_token.clear();
        self.email.clear();
        self.password.clear();
        self.confirm_password.clear();
        // role selector deliberately untouched
    }
}

/// Validate locally, then submit. Validation failures short-circuit with a
/// toast and no request. Returns whether the admin was created.
pub fn register(
    api: &impl PhotoEventApi,
    notify: &mut NotifyCenter,
    form: &mut RegistrationForm,
) -> bool {
    if form.master_token.is_empty() {
        notify.error(MASTER_TOKEN_REQUIRED);
        return false;
    }
    if form.password != form.confirm_password {
        notify.error(PASSWORD_MISMATCH);
        return false;
    }
    match api.register(&form.master_token, &form.email, &form.password, &form.role) {
        Ok(()) => {
            notify.success(REGISTER_SUCCESS);
            form.clear_inputs();
            true
        }
        Err(ApiError::Server(message)) => {
            notify.error(message);
            false
        }
        Err(err) => {
            log::error!("registration request failed: {err}");
            notify.error(REGISTER_NETWORK_ERROR);
            false
        }
    }
}
