//! Secret masking for log and debug output

/// Mask a secret, keeping a short prefix for identification
///
/// Short values are masked completely.
pub fn mask(secret: &str) -> String {
    let visible = secret.chars().count() / 4;
    if visible < 4 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(visible.min(8)).collect();
    format!("{}***", prefix)
}
