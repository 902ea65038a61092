use std::sync::LazyLock;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("session".to_string())
});

/// Absolute session lifetime in seconds.
pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(43200) // Default to 12 hours if not set or invalid
});

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use std::env;

    /// Helper function to set an environment variable for the duration of the test
    /// and restore the original value afterward.
    fn with_env_var<F, R>(key: &str, value: Option<&str>, test: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();

        match value {
            Some(val) => unsafe { env::set_var(key, val) },
            None => unsafe { env::remove_var(key) },
        }

        let result = test();

        match original {
            Some(val) => unsafe { env::set_var(key, val) },
            None => unsafe { env::remove_var(key) },
        }

        result
    }

    fn parse_max_age() -> u64 {
        env::var("SESSION_COOKIE_MAX_AGE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(43200)
    }

    #[test]
    #[serial]
    fn test_parse_session_cookie_name() {
        with_env_var("SESSION_COOKIE_NAME", None, || {
            let default_value = env::var("SESSION_COOKIE_NAME")
                .ok()
                .unwrap_or("session".to_string());
            assert_eq!(default_value, "session");
        });

        with_env_var("SESSION_COOKIE_NAME", Some("CustomSessionId"), || {
            let custom_value = env::var("SESSION_COOKIE_NAME")
                .ok()
                .unwrap_or("session".to_string());
            assert_eq!(custom_value, "CustomSessionId");
        });
    }

    #[test]
    #[serial]
    fn test_parse_session_cookie_max_age() {
        with_env_var("SESSION_COOKIE_MAX_AGE", None, || {
            assert_eq!(parse_max_age(), 43200);
        });

        with_env_var("SESSION_COOKIE_MAX_AGE", Some("1800"), || {
            assert_eq!(parse_max_age(), 1800);
        });

        // Invalid values fall back to the default
        with_env_var("SESSION_COOKIE_MAX_AGE", Some("invalid"), || {
            assert_eq!(parse_max_age(), 43200);
        });
    }
}
