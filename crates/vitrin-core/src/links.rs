//! Contact link derivation.
//!
//! Pure string helpers that turn contact metadata into the `href` values the
//! host page expects. Each returns an empty string when its input is absent
//! so callers can treat "empty" as "clear the attribute".

/// Base URL for WhatsApp click-to-chat links.
pub const WHATSAPP_BASE: &str = "https://wa.me/";

/// Keep only ASCII digits from a phone number.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Build a `https://wa.me/<digits>[?text=<message>]` link.
///
/// Returns an empty string when the phone has no digits.
pub fn whatsapp_link(phone: Option<&str>, message: Option<&str>) -> String {
    let digits = phone_digits(phone.unwrap_or_default());
    if digits.is_empty() {
        return String::new();
    }
    let mut url = format!("{WHATSAPP_BASE}{digits}");
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        url.push_str("?text=");
        url.push_str(&urlencoding::encode(message));
    }
    url
}

/// Build a `tel:` link with all whitespace removed.
///
/// An existing `tel:` prefix is kept rather than duplicated.
pub fn tel_href(phone: &str) -> String {
    let normalized: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if normalized.is_empty() || normalized.starts_with("tel:") {
        normalized
    } else {
        format!("tel:{normalized}")
    }
}

/// Build a `mailto:` link, or empty for an empty address.
pub fn mailto_href(email: &str) -> String {
    let email = email.trim();
    if email.is_empty() {
        String::new()
    } else {
        format!("mailto:{email}")
    }
}
