//! Credential checks run before any request reaches the identity provider.

const MIN_PASSWORD_LEN: usize = 8;

/// Outcome of [`validate_password`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub valid: bool,
    pub message: &'static str,
}

impl PasswordCheck {
    const fn fail(message: &'static str) -> Self {
        Self { valid: false, message }
    }
}

/// Structural email check: `local@domain.tld`, each part non-empty and free
/// of whitespace and `@`. Not RFC 5322; the provider has the final word.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if !is_plain_segment(local) || !is_plain_segment(domain) {
        return false;
    }
    // Any dot with text on both sides will do; the domain may have several.
    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

fn is_plain_segment(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(|c| c == '@' || c.is_whitespace())
}

/// Check password strength, reporting the first rule that fails.
///
/// Length is counted in UTF-16 code units, the way browsers measure form
/// input, so a character outside the Basic Multilingual Plane counts twice.
///
/// Rules, in order: at least eight characters, an uppercase letter, a
/// lowercase letter, a digit.
#[must_use]
pub fn validate_password(password: &str) -> PasswordCheck {
    if password.encode_utf16().count() < MIN_PASSWORD_LEN {
        return PasswordCheck::fail("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return PasswordCheck::fail("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return PasswordCheck::fail("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return PasswordCheck::fail("Password must contain a number");
    }
    PasswordCheck { valid: true, message: "Password is strong" }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
