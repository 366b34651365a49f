//! URL utilities for consistent endpoint construction
//!
//! Both remote APIs are addressed as `base URL + path`; these helpers keep
//! trailing and leading slashes from producing malformed endpoints.

/// Normalize a base URL by removing trailing slashes.
///
/// # Examples
///
/// ```
/// use cevap::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.groq.com/openai/v1"), "https://api.groq.com/openai/v1");
/// assert_eq!(normalize_base_url("https://api.groq.com/openai/v1/"), "https://api.groq.com/openai/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and a path.
///
/// # Examples
///
/// ```
/// use cevap::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.groq.com/openai/v1/", "chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
/// assert_eq!(
///     construct_api_url("https://generativelanguage.googleapis.com/v1beta", "/models/gemini-2.0-flash-lite:generateContent"),
///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-lite:generateContent"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
