//! User-facing classification of response generator failures
//!
//! A failed bot round-trip surfaces as an inline chat bubble, so the raw
//! error text is never shown. Classification is a substring match against
//! the lowercased error, checked in a fixed order: ownership first (its
//! message is the most specific), then credentials, connectivity, timeout,
//! server trouble, and missing service.

/// Map a raw responder error onto a user-facing message
///
/// # Examples
///
/// ```
/// use chatling::session::user_facing_error;
///
/// let message = user_facing_error("HTTP error! status: 401");
/// assert!(message.contains("permission"));
/// ```
pub fn user_facing_error(raw: &str) -> String {
    let lower = raw.to_lowercase();

    let message = if lower.contains("you don't own this chat") {
        "This conversation belongs to another user. Please start a new conversation to continue."
    } else if lower.contains("unauthorized") || lower.contains("401") {
        "You don't have permission to access this conversation. Please check your credentials."
    } else if lower.contains("network") || lower.contains("connection") || lower.contains("fetch")
    {
        "Connection failed. Please check your internet connection and try again."
    } else if lower.contains("timeout") {
        "Request timed out. The server might be busy, please try again in a moment."
    } else if lower.contains("500") || lower.contains("server") {
        "The server is experiencing issues. Please try again later."
    } else if lower.contains("404") {
        "The chat service is currently unavailable. Please contact support."
    } else {
        "Something went wrong. Please try again."
    };

    message.to_string()
}
