//! Checks run before a form is submitted. Failures are `Validation` errors
//! carrying the notice text shown to the user.

use crate::{
    domain::{EventDraft, EventPatch},
    error::ApiError,
};

pub const MIN_PASSWORD_LEN: usize = 6;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";

fn all_filled(fields: &[&str]) -> bool {
    fields.iter().all(|field| !field.trim().is_empty())
}

pub fn validate_login_form(email: &str, password: &str) -> Result<(), ApiError> {
    if !all_filled(&[email, password]) {
        return Err(ApiError::validation(FILL_ALL_FIELDS));
    }
    Ok(())
}

pub fn validate_registration_form(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ApiError> {
    if !all_filled(&[name, email, password, confirm_password]) {
        return Err(ApiError::validation(FILL_ALL_FIELDS));
    }
    if password != confirm_password {
        return Err(ApiError::validation("Passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

pub fn validate_contact_message(message: &ContactMessage) -> Result<(), ApiError> {
    if !all_filled(&[
        &message.name,
        &message.email,
        &message.subject,
        &message.message,
    ]) {
        return Err(ApiError::validation(FILL_ALL_FIELDS));
    }
    Ok(())
}

pub fn validate_event_draft(draft: &EventDraft) -> Result<(), ApiError> {
    if !all_filled(&[&draft.title, &draft.location, &draft.category]) {
        return Err(ApiError::validation(
            "Title, location and category are required",
        ));
    }
    if draft.capacity == 0 {
        return Err(ApiError::validation("Capacity must be greater than zero"));
    }
    Ok(())
}

/// Same rules as [`validate_event_draft`], applied only to the fields the
/// patch sets.
pub fn validate_event_patch(patch: &EventPatch) -> Result<(), ApiError> {
    let required = [&patch.title, &patch.location, &patch.category];
    if required
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| v.trim().is_empty()))
    {
        return Err(ApiError::validation(
            "Title, location and category are required",
        ));
    }
    if patch.capacity == Some(0) {
        return Err(ApiError::validation("Capacity must be greater than zero"));
    }
    Ok(())
}

/// Lenient ticket-count input: anything unparseable or below one becomes one.
pub fn parse_ticket_count(raw: &str) -> u32 {
    raw.trim().parse::<u32>().map_or(1, |count| count.max(1))
}
