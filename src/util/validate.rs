use anyhow::{bail, Result};
use regex::Regex;

const LOCAL_PART_PATTERN: &str = r"^[A-Za-z0-9.-]+$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Trimmed alias local part; letters, digits, dots and dashes only.
pub fn local_part(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        bail!("alias is required");
    }
    if !Regex::new(LOCAL_PART_PATTERN)?.is_match(value) {
        bail!("alias contains invalid characters: {}", value);
    }
    Ok(value.to_string())
}

/// Trimmed destination address with a loose `user@host.tld` shape.
pub fn email(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        bail!("destination email is required");
    }
    if !Regex::new(EMAIL_PATTERN)?.is_match(value) {
        bail!("invalid destination email: {}", value);
    }
    Ok(value.to_string())
}
