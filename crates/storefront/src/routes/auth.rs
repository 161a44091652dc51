//! Authentication route handlers.
//!
//! Login and registration proxy to the shop API; the storefront stores no
//! credentials of its own. Field-level validation runs before any network
//! call and re-renders the form with the entered values, so a validation
//! failure never reaches the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use wishmark_core::Email;

use crate::error;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Field-level validation messages for the login form.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoginFieldErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginFieldErrors {
    /// Whether every field passed validation.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Field-level validation messages for the registration form.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RegisterFieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterFieldErrors {
    /// Whether every field passed validation.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Validate the login form without touching the network.
fn validate_login(form: &LoginForm) -> LoginFieldErrors {
    LoginFieldErrors {
        email: Email::parse(form.email.trim()).err().map(|e| e.to_string()),
        password: if form.password.is_empty() {
            Some("Password is required".to_string())
        } else {
            None
        },
    }
}

/// Validate the registration form without touching the network.
fn validate_register(form: &RegisterForm) -> RegisterFieldErrors {
    RegisterFieldErrors {
        name: if form.name.trim().is_empty() {
            Some("Name is required".to_string())
        } else {
            None
        },
        email: Email::parse(form.email.trim()).err().map(|e| e.to_string()),
        password: if form.password.len() < MIN_PASSWORD_LENGTH {
            Some(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ))
        } else {
            None
        },
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    /// Entered email, echoed back on validation failure.
    pub email: String,
    pub fields: LoginFieldErrors,
    /// Form-level failure (backend rejection).
    pub form_error: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl LoginTemplate {
    fn empty(user: Option<CurrentUser>) -> Self {
        Self {
            current_user: user,
            email: String::new(),
            fields: LoginFieldErrors::default(),
            form_error: None,
            error: None,
            success: None,
        }
    }
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub name: String,
    pub email: String,
    pub fields: RegisterFieldErrors,
    pub form_error: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl RegisterTemplate {
    fn empty(user: Option<CurrentUser>) -> Self {
        Self {
            current_user: user,
            name: String::new(),
            email: String::new(),
            fields: RegisterFieldErrors::default(),
            form_error: None,
            error: None,
            success: None,
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
        ..LoginTemplate::empty(user)
    }
}

/// Handle login form submission.
///
/// On success the shop API's `{ name, token }` payload becomes the session
/// user and the visitor lands back on the catalog.
#[instrument(skip(state, session, user, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<LoginForm>,
) -> Response {
    let fields = validate_login(&form);
    if !fields.is_clean() {
        return LoginTemplate {
            email: form.email,
            fields,
            ..LoginTemplate::empty(user)
        }
        .into_response();
    }

    match state.shop().login(form.email.trim(), &form.password).await {
        Ok(auth) => {
            let current = CurrentUser {
                name: auth.name,
                token: auth.token,
            };

            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/login?error=Could%20not%20start%20a%20session")
                    .into_response();
            }

            if let Some(id) = current.user_id() {
                error::set_sentry_user(&id.as_str(), Some(form.email.trim()));
            }
            error::add_breadcrumb("auth", "Logged in", None);

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            let message = e
                .api_message()
                .map_or_else(|| "Login failed".to_string(), ToOwned::to_owned);
            LoginTemplate {
                email: form.email,
                form_error: Some(message),
                ..LoginTemplate::empty(user)
            }
            .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error,
        success: query.success,
        ..RegisterTemplate::empty(user)
    }
}

/// Handle registration form submission.
///
/// The backend logs the new account in as part of registration, so success
/// behaves exactly like a login.
#[instrument(skip(state, session, user, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RegisterForm>,
) -> Response {
    let fields = validate_register(&form);
    if !fields.is_clean() {
        return RegisterTemplate {
            name: form.name,
            email: form.email,
            fields,
            ..RegisterTemplate::empty(user)
        }
        .into_response();
    }

    match state
        .shop()
        .register(form.name.trim(), form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => {
            let current = CurrentUser {
                name: auth.name,
                token: auth.token,
            };

            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session after registration: {e}");
                return Redirect::to("/login?error=Could%20not%20start%20a%20session")
                    .into_response();
            }

            if let Some(id) = current.user_id() {
                error::set_sentry_user(&id.as_str(), Some(form.email.trim()));
            }
            error::add_breadcrumb("auth", "Registered", None);

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            let message = e
                .api_message()
                .map_or_else(|| "Registration failed".to_string(), ToOwned::to_owned);
            RegisterTemplate {
                name: form.name,
                email: form.email,
                form_error: Some(message),
                ..RegisterTemplate::empty(user)
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the session user and destroys the session; name and token go
/// together.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    error::clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn register_form(name: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_login_form_passes() {
        let errors = validate_login(&login_form("dana@example.com", "hunter2"));
        assert!(errors.is_clean());
    }

    #[test]
    fn login_rejects_malformed_email() {
        let errors = validate_login(&login_form("not-an-email", "hunter2"));
        assert!(errors.email.is_some());
        assert!(errors.password.is_none());

        // Domain must carry a dot
        let errors = validate_login(&login_form("dana@localhost", "hunter2"));
        assert!(errors.email.is_some());
    }

    #[test]
    fn login_rejects_empty_password() {
        let errors = validate_login(&login_form("dana@example.com", ""));
        assert_eq!(errors.password.as_deref(), Some("Password is required"));
    }

    #[test]
    fn login_email_is_trimmed_before_validation() {
        let errors = validate_login(&login_form("  dana@example.com  ", "hunter2"));
        assert!(errors.is_clean());
    }

    #[test]
    fn valid_register_form_passes() {
        let errors = validate_register(&register_form("Dana", "dana@example.com", "hunter2"));
        assert!(errors.is_clean());
    }

    #[test]
    fn register_requires_a_name() {
        let errors = validate_register(&register_form("   ", "dana@example.com", "hunter2"));
        assert_eq!(errors.name.as_deref(), Some("Name is required"));
    }

    #[test]
    fn register_enforces_password_length() {
        let errors = validate_register(&register_form("Dana", "dana@example.com", "12345"));
        assert_eq!(
            errors.password.as_deref(),
            Some("Password must be at least 6 characters")
        );

        let errors = validate_register(&register_form("Dana", "dana@example.com", "123456"));
        assert!(errors.password.is_none());
    }

    #[test]
    fn multiple_field_failures_report_together() {
        let errors = validate_register(&register_form("", "nope", "x"));
        assert!(errors.name.is_some());
        assert!(errors.email.is_some());
        assert!(errors.password.is_some());
    }
}
