//! Substitute values used when the overlay service gives us nothing usable

/// Comment shown whenever the service does not supply one
pub const DEFAULT_AI_COMMENT: &str = "You look amazing! This style really suits you.";

/// Fixed encouraging phrase, never empty
pub fn default_comment() -> &'static str {
    DEFAULT_AI_COMMENT
}

/// The customer's own photo, unchanged
pub fn identity_image(person_image: &str) -> String {
    person_image.to_string()
}
