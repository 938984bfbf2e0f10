//! Identifier (phone/email) normalization and validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static E164_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{7,14}$").unwrap()
});

// Email address regex, intentionally conservative
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9._%+\-]*@[a-z0-9][a-z0-9.\-]*\.[a-z]{2,}$").unwrap()
});

/// Normalize an identifier to its canonical form.
///
/// Phone numbers have formatting characters stripped and must end up in
/// E.164 format; email addresses are lowercased. Returns `None` when the
/// identifier is malformed.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains('@') {
        let email = trimmed.to_ascii_lowercase();
        if EMAIL_REGEX.is_match(&email) {
            Some(email)
        } else {
            None
        }
    } else {
        let phone: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        if E164_PHONE_REGEX.is_match(&phone) {
            Some(phone)
        } else {
            None
        }
    }
}

/// Mask an identifier for logging.
///
/// Phones keep the last 4 digits (e.g. `***4567`), emails keep the first
/// character of the local part and the domain (e.g. `a***@example.com`).
pub fn mask_identifier(identifier: &str) -> String {
    if let Some(at) = identifier.find('@') {
        let (local, domain) = identifier.split_at(at);
        match local.chars().next() {
            Some(first) => format!("{}***{}", first, domain),
            None => format!("***{}", domain),
        }
    } else if identifier.len() > 4 {
        format!("***{}", &identifier[identifier.len() - 4..])
    } else {
        "****".to_string()
    }
}
