/// Normalizes a phone number to `+<digits>`, assuming Chile (`+56`) when no
/// country code is given. Numbers with fewer than 8 digits are rejected.
pub fn validate_phone_number(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 8 {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(format!("+{}", digits))
    } else {
        Some(format!("+56{}", digits))
    }
}
