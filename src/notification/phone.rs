pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Put a phone number in the form expected by the messaging API: digits only, country code first.
/// This is a prefix check, not a full E.164 validation.
/// Return `None` when there are no digits to send to.
pub fn normalize_phone_number(mobile: &str, country_code: &str) -> Option<String> {
    let digits = mobile
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }

    if digits.starts_with(country_code) {
        Some(digits)
    } else {
        Some(format!("{country_code}{digits}"))
    }
}
