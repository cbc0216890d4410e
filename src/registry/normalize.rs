use crate::RegistryError;

/// Normalizes user input into a registry key
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Reject empty input
/// 3. Prefix `https://` unless the input already starts with `http://` or `https://`
///
/// No further canonicalization happens; duplicate detection is an exact
/// string comparison on the result.
///
/// # Examples
///
/// ```
/// use sumi_gather::registry::normalize_input;
///
/// assert_eq!(normalize_input("  example.com ").unwrap(), "https://example.com");
/// assert_eq!(normalize_input("http://example.com").unwrap(), "http://example.com");
/// ```
pub fn normalize_input(raw: &str) -> Result<String, RegistryError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(RegistryError::InvalidInput(
            "Please enter a URL".to_string(),
        ));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}
