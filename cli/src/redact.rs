//! Masking of secrets in command lines before they are displayed.

use std::sync::OnceLock;

use regex::Regex;

fn secret_assignment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(password|passwd|pwd|token|secret|api[_-]?key)\s*[:=]\s*(\S+)")
            .expect("secret assignment pattern is valid")
    })
}

fn bearer_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bbearer\s+([A-Za-z0-9\-._~+/]+=*)")
            .expect("bearer token pattern is valid")
    })
}

/// Replace `key=value`/`key:value` secrets with `key=***` and bearer tokens
/// with `bearer ***`.
///
/// Whitespace-only input is returned unchanged.
pub fn mask_sensitive_args(input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }
    let masked = secret_assignment().replace_all(input, "${1}=***");
    bearer_token().replace_all(&masked, "bearer ***").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_assignments_and_bearer_tokens() {
        let input = "server --token=abc123 --password:letmein --api_key =k123 Authorization: Bearer qwerty.zzz";
        let out = mask_sensitive_args(input);

        for secret in ["abc123", "letmein", "k123", "qwerty.zzz"] {
            assert!(!out.contains(secret), "{} leaked in {}", secret, out);
        }
        assert!(out.contains("token=***"));
        assert!(out.contains("password=***"));
        assert!(out.contains("api_key=***"));
        assert!(out.to_lowercase().contains("bearer ***"));
    }

    #[test]
    fn test_key_variants_and_case() {
        assert_eq!(mask_sensitive_args("PWD=hunter2"), "PWD=***");
        assert_eq!(mask_sensitive_args("--api-key: xyz"), "--api-key=***");
        assert_eq!(mask_sensitive_args("--apikey=xyz"), "--apikey=***");
        assert_eq!(mask_sensitive_args("SECRET = s3"), "SECRET=***");
    }

    #[test]
    fn test_leaves_other_text_alone() {
        assert_eq!(mask_sensitive_args("   \t"), "   \t");
        assert_eq!(mask_sensitive_args(""), "");
        assert_eq!(
            mask_sensitive_args("node server.js --port 3000"),
            "node server.js --port 3000"
        );
        // Not a key on its own.
        assert_eq!(mask_sensitive_args("--tokens-file=a.txt"), "--tokens-file=a.txt");
    }
}
