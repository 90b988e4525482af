pub mod messages;
pub mod validation;

use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use validator::{Validate, ValidationErrors};

use crate::client::ApiClient;
use crate::error::AppError;
use crate::models::User;
use crate::session::Session;

pub use messages::{Field, MessageBoard};
pub use validation::{
    validate_email, validate_name, validate_password, validate_repeat, ValidationResult,
};

use validation::{email_rule, name_rule, password_rule, EMAIL_TAKEN_MESSAGE};

/// Answers whether an email address is already registered.
#[async_trait]
pub trait EmailRegistry: Send + Sync {
    /// Must not fail: an unconfirmable check reports `false`.
    async fn email_exists(&self, email: &str) -> bool;
}

#[async_trait]
impl EmailRegistry for ApiClient {
    async fn email_exists(&self, email: &str) -> bool {
        ApiClient::email_exists(self, email).await
    }
}

/// Values of the login form.
#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(custom = "email_rule")]
    pub email: String,
    #[validate(custom = "password_rule")]
    pub password: String,
}

impl LoginForm {
    const FIELDS: [Field; 2] = [Field::Email, Field::Password];
}

/// Values of the registration form.
#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(custom = "name_rule")]
    pub username: String,
    #[validate(custom = "email_rule")]
    pub email: String,
    #[validate(custom = "password_rule")]
    pub password: String,
    pub repeat_password: String,
}

impl RegisterForm {
    const FIELDS: [Field; 3] = [Field::Name, Field::Email, Field::Password];
}

/// Result of a login submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A field failed validation; nothing was sent.
    Invalid,
    /// The backend refused the request; the reason is shown on the form.
    Rejected(String),
    /// The token is stored and the task page can be shown.
    LoggedIn(User),
}

/// Validates a single input, e.g. when it loses focus.
pub fn validate_field(messages: &mut MessageBoard, field: Field, value: &str) -> bool {
    let result = match field {
        Field::Name => validate_name(value),
        Field::Email => validate_email(value),
        Field::Password => validate_password(value),
        Field::Repeat | Field::Form => return true,
    };
    messages.report(field, &result)
}

/// Renders one message per failing field and clears the passing ones.
fn render_errors(
    messages: &mut MessageBoard,
    fields: &[Field],
    result: Result<(), ValidationErrors>,
) -> bool {
    let errors = result.err();
    let field_errors = errors
        .as_ref()
        .map(|e| e.field_errors())
        .unwrap_or_else(HashMap::new);

    for field in fields {
        let message = field_errors
            .get(field.as_str())
            .and_then(|errs| errs.first())
            .map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string())
            });
        match message {
            Some(message) => messages.show(*field, message),
            None => messages.clear(*field),
        }
    }
    errors.is_none()
}

/// Runs every login rule. A failing email does not stop the password check.
pub fn validate_login(form: &LoginForm, messages: &mut MessageBoard) -> bool {
    render_errors(messages, &LoginForm::FIELDS, form.validate())
}

/// Runs every synchronous registration rule, then the email existence check.
///
/// The existence check only runs for a syntactically valid email.
pub async fn validate_register(
    form: &RegisterForm,
    messages: &mut MessageBoard,
    registry: &dyn EmailRegistry,
) -> bool {
    let fields_valid = render_errors(messages, &RegisterForm::FIELDS, form.validate());
    let repeat_valid = messages.report(
        Field::Repeat,
        &validate_repeat(&form.password, &form.repeat_password),
    );

    let email_free = if messages.get(Field::Email).is_none() {
        let exists = registry.email_exists(&form.email).await;
        if exists {
            messages.show(Field::Email, EMAIL_TAKEN_MESSAGE);
        }
        !exists
    } else {
        true
    };

    fields_valid && repeat_valid && email_free
}

/// Validates the form, logs in and stores the session token.
///
/// Rejected credentials and transport failures are shown as a form-level
/// message; only storage failures are returned as errors.
pub async fn submit_login(
    form: &LoginForm,
    messages: &mut MessageBoard,
    client: &ApiClient,
    session: &Session,
) -> Result<LoginOutcome, AppError> {
    messages.clear(Field::Form);
    if !validate_login(form, messages) {
        return Ok(LoginOutcome::Invalid);
    }

    match client.login(&form.email, &form.password).await {
        Ok(auth) => {
            session.store(&auth.token)?;
            info!("Logged in as {}", form.email);
            Ok(LoginOutcome::LoggedIn(auth.user))
        }
        Err(e) => reject(messages, e),
    }
}

/// Validates the form, registers the account and logs it in.
pub async fn submit_register(
    form: &RegisterForm,
    messages: &mut MessageBoard,
    client: &ApiClient,
    session: &Session,
) -> Result<LoginOutcome, AppError> {
    messages.clear(Field::Form);
    if !validate_register(form, messages, client).await {
        return Ok(LoginOutcome::Invalid);
    }

    match client
        .register(form.username.trim(), &form.email, &form.password)
        .await
    {
        Ok(auth) => {
            session.store(&auth.token)?;
            info!("Registered and logged in as {}", form.email);
            Ok(LoginOutcome::LoggedIn(auth.user))
        }
        Err(e) => reject(messages, e),
    }
}

fn reject(messages: &mut MessageBoard, error: AppError) -> Result<LoginOutcome, AppError> {
    if !error.is_recoverable() {
        return Err(error);
    }
    warn!("Authentication failed: {}", error);
    let message = error.user_message();
    messages.show(Field::Form, message.clone());
    Ok(LoginOutcome::Rejected(message))
}
