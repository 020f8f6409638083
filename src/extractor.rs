use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}\b").expect("email regex")
});

// Optional country code, then 2-4 / 3-4 / 3-4 digit groups with optional separators.
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{2,4}\)?[-.\s]?\d{3,4}[-.\s]?\d{3,4}")
        .expect("phone regex")
});

/// Unique email-shaped substrings of `text`, in no particular order.
pub fn extract_emails(text: &str) -> HashSet<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Unique phone-shaped substrings of `text`, in no particular order.
pub fn extract_phones(text: &str) -> HashSet<String> {
    PHONE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Display name for a result title: everything before the first `" - "`.
pub fn name_from_title(title: &str) -> String {
    title.split(" - ").next().unwrap_or_default().trim().to_string()
}
