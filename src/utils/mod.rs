pub mod constants;
mod errors;

pub use errors::{AdapterError, AdapterResult};

/// Shorten a secret (user key, session id) for log output
pub fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::redact;

    #[test]
    fn redact_keeps_short_prefix_only() {
        assert_eq!(redact("abcde12345abcde12345"), "abcd****");
        assert_eq!(redact("abc"), "****");
        assert_eq!(redact(""), "****");
    }
}
