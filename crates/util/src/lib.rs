//! Shared helpers for the Conform binaries: configuration loading, config
//! directory paths, and secret redaction for anything that ends up in logs.

pub mod config;
pub mod path_processing;

pub use config::{ConfigError, ConsoleConfig, default_config_path};
pub use path_processing::{config_root, default_log_path, expand_tilde};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+ ]+)",
        r#"(?i)("api_key"\s*:\s*)("[^"]*")"#,
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SECRET_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .to_string();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_authorization_headers() {
        let out = redact_sensitive("Authorization: Bearer abc.def");
        assert_eq!(out, "Authorization: <redacted>");
    }

    #[test]
    fn redacts_api_key_in_json_bodies() {
        let out = redact_sensitive(r#"{"email":"a@b.io","api_key":"sk-123"}"#);
        assert_eq!(out, r#"{"email":"a@b.io","api_key":<redacted>}"#);
    }

    #[test]
    fn redacts_env_style_assignments() {
        let out = redact_sensitive("CONFORM_API_KEY=secret other=value");
        assert_eq!(out, "CONFORM_API_KEY=<redacted> other=value");
    }
}
