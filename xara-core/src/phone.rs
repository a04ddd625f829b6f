// Identity capture: the first chat turn of an unverified session carries the visitor's
// phone number (and optionally email) so the agent can load their profile.

use crate::error::WidgetError;

pub const MIN_PHONE_DIGITS: usize = 10;

pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Builds the chat text that announces the visitor's identity.
///
/// A bare digit string when no usable email is given, otherwise
/// `phone: <digits>, email: <email>`.
pub fn build_identity_message(phone: &str, email: &str) -> Result<String, WidgetError> {
    let digits = normalize_phone(phone);
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(WidgetError::InvalidPhone);
    }

    let email = email.trim();
    if email.contains('@') {
        Ok(format!("phone: {digits}, email: {email}"))
    } else {
        Ok(digits)
    }
}

/// Guesses whether the agent is asking for the phone number again.
///
/// The agent's reply carries no explicit verification flag, so this string match is
/// the only signal available. Keep every caller going through this function.
pub fn is_phone_request(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    lower.contains("phone") && (lower.contains("provide") || lower.contains("enter"))
}
