use serde::Serialize;

use super::Category;

/// Credentials submitted by the login form.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: Option<bool>,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember_me: None,
        }
    }

    pub fn remember_me(mut self, remember: bool) -> Self {
        self.remember_me = Some(remember);
        self
    }

    /// Form fields for `POST /api/login`. `rememberMe` is only sent when set.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("email".to_string(), self.email.clone()),
            ("password".to_string(), self.password.clone()),
        ];
        if let Some(remember) = self.remember_me {
            fields.push(("rememberMe".to_string(), remember.to_string()));
        }
        fields
    }

    /// Check required fields before submitting.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.push(FieldError::new(Field::Password, "Password harus diisi"));
        }
        into_result(errors)
    }
}

/// Payload submitted by the sign-up form.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub category: Category,
}

/// JSON body of `POST /api/regis`. The backend column is `fullname`.
#[derive(Serialize)]
pub(crate) struct RegisterPayload<'a> {
    fullname: &'a str,
    username: &'a str,
    email: &'a str,
    password: &'a str,
    category: Category,
}

impl RegisterRequest {
    pub(crate) fn payload(&self) -> RegisterPayload<'_> {
        RegisterPayload {
            fullname: &self.full_name,
            username: &self.username,
            email: &self.email,
            password: &self.password,
            category: self.category,
        }
    }

    /// Check required fields before submitting.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.full_name.trim().is_empty() {
            errors.push(FieldError::new(Field::FullName, "Nama lengkap harus diisi"));
        }
        if self.username.trim().is_empty() {
            errors.push(FieldError::new(Field::Username, "Username harus diisi"));
        }
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.push(FieldError::new(Field::Password, "Password harus diisi"));
        }
        into_result(errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Username,
    Email,
    Password,
}

/// A form field that failed validation, with the message to show under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn into_result(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.is_empty() {
        errors.push(FieldError::new(Field::Email, "Email harus diisi"));
    } else if !looks_like_email(email) {
        errors.push(FieldError::new(Field::Email, "Format email tidak valid"));
    }
}

/// Loose shape check: `something@something.something`, no whitespace around
/// the separators.
pub fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let non_space = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
    if !non_space(local) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => non_space(host) && non_space(tld),
        None => false,
    }
}
