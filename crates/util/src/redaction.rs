use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Header names whose values are always redacted.
const SENSITIVE_HEADER_KEYWORDS: &[&str] = &["authorization", "cookie", "token", "secret", "api-key", "apikey", "password"];

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)*)",
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
        r"(?i)((?:^|\b)Basic\s+)([A-Za-z0-9+/]+=*)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REDACTED}")
            })
            .to_string();
    }
    redacted
}

/// Returns a copy of `headers` that is safe to log.
pub fn redact_headers(headers: &IndexMap<String, String>) -> IndexMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let lowered = name.to_ascii_lowercase();
            let sensitive = SENSITIVE_HEADER_KEYWORDS.iter().any(|keyword| lowered.contains(keyword));
            let value = if sensitive { REDACTED.to_string() } else { redact_sensitive(value) };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_inline_secrets() {
        assert_eq!(redact_sensitive("API_KEY=abc123 mode=fast"), "API_KEY=[REDACTED] mode=fast");
        assert_eq!(redact_sensitive("Authorization: Bearer abc"), "Authorization: [REDACTED]");
        assert_eq!(redact_sensitive("nothing to hide"), "nothing to hide");
    }

    #[test]
    fn redacts_sensitive_headers_by_name() {
        let mut headers = IndexMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc".to_string());
        headers.insert("X-Api-Key".to_string(), "k-123".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        let redacted = redact_headers(&headers);
        assert_eq!(redacted["Authorization"], "[REDACTED]");
        assert_eq!(redacted["X-Api-Key"], "[REDACTED]");
        assert_eq!(redacted["Accept"], "application/json");
    }
}
