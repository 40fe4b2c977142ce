//! URL utilities for stream URLs
//!
//! Helpers for inspecting resolved stream URLs and for keeping authorization
//! keys out of log output.

use regex::Regex;
use url::Url;

/// URL utilities shared by the resolver and the playback session
pub struct UrlUtils;

impl UrlUtils {
    /// Check whether a descriptor value is already a URL rather than a
    /// provider stream key
    ///
    /// Any value containing `http` counts, which also covers values that
    /// carry a scheme further in (for example behind a redirector prefix).
    pub fn looks_absolute(value: &str) -> bool {
        value.contains("http")
    }

    /// Extract the host from a URL
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to extract the host from
    ///
    /// # Returns
    ///
    /// * `Some(String)` - Host if successfully parsed
    /// * `None` - If the URL is invalid or has no host
    pub fn extract_host(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    /// Lowercased extension of the last path segment, ignoring query and
    /// fragment
    ///
    /// Falls back to plain string handling for values that do not parse as a
    /// URL so relative paths are still classified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fbstream::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::path_extension("https://a.example/live/x.M3U8?k=1"), Some("m3u8".to_string()));
    /// assert_eq!(UrlUtils::path_extension("https://a.example/live/"), None);
    /// ```
    pub fn path_extension(url: &str) -> Option<String> {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        let segment = path.rsplit('/').next()?;
        let (stem, extension) = segment.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(extension.to_ascii_lowercase())
    }

    /// Mask authorization keys and credentials for safe logging
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to obfuscate
    ///
    /// # Returns
    ///
    /// URL string with `auth_key`, token and password values replaced with asterisks
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            let mut new_url = parsed.clone();
            let _ = new_url.set_username("****");
            let _ = new_url.set_password(Some("****"));
            obfuscated = new_url.to_string();
        }

        let sensitive_params = ["auth_key", "token", "password", "pass"];

        for param in &sensitive_params {
            let pattern = format!(r"(?i)([?&]{}=)[^&#]*", regex::escape(param));
            if let Ok(re) = Regex::new(&pattern) {
                obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
            }
        }

        obfuscated
    }
}
