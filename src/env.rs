//! EnvSource trait for testable environment access.
//!
//! This module provides the `EnvSource` trait that abstracts reading the
//! process environment, enabling dependency injection for testing.

use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::RwLock;

/// Read access to environment variables.
///
/// # Example
///
/// ```ignore
/// // Production
/// let env = Environment::new();  // Uses RealEnv
///
/// // Testing
/// let env = Environment::with_source(
///     MockEnv::new().with_env("WEIGHT", "300"),
/// );
/// ```
pub trait EnvSource: Send + Sync {
    /// Get an environment variable by name.
    ///
    /// Returns `None` only if the variable is not set.
    fn get_env(&self, name: &str) -> Option<String>;
}

/// Production environment backed by `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl EnvSource for RealEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(decode_os)
    }
}

/// Decode a raw OS value. Invalid Unicode becomes U+FFFD, so a set variable
/// never reads as absent and its value still goes through unmarshalling.
pub(crate) fn decode_os(value: OsString) -> String {
    match value.into_string() {
        Ok(value) => value,
        Err(value) => value.to_string_lossy().into_owned(),
    }
}

/// Mock environment for testing.
///
/// # Example
///
/// ```
/// use envspec::env::{EnvSource, MockEnv};
///
/// let env = MockEnv::new()
///     .with_env("REDIS_PRIMARY_SERVICE_HOST", "redis.example.org")
///     .with_env("REDIS_PRIMARY_SERVICE_PORT", "6379");
///
/// assert_eq!(env.get_env("REDIS_PRIMARY_SERVICE_PORT"), Some("6379".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MockEnv {
    env_vars: RwLock<HashMap<String, String>>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable.
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Set multiple environment variables from an iterator.
    pub fn with_envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.set_env(k, v);
        }
        self
    }

    /// Update an environment variable.
    ///
    /// Useful for tests that check a resolved value does not change.
    pub fn set_env(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env_vars
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), value.into());
    }

    /// Remove an environment variable.
    pub fn remove_env(&self, name: &str) {
        self.env_vars
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
    }
}

impl EnvSource for MockEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        self.env_vars
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for std::sync::Arc<E> {
    fn get_env(&self, name: &str) -> Option<String> {
        (**self).get_env(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_real_env_missing_var() {
        let env = RealEnv::new();
        assert_eq!(env.get_env("ENVSPEC_TEST_DEFINITELY_NOT_SET"), None);
    }

    #[test]
    fn test_mock_env_vars() {
        let env = MockEnv::new()
            .with_env("APP_HOST", "localhost")
            .with_envs([("APP_PORT", "8080"), ("OTHER_VAR", "value")]);

        assert_eq!(env.get_env("APP_HOST"), Some("localhost".to_string()));
        assert_eq!(env.get_env("APP_PORT"), Some("8080".to_string()));
        assert_eq!(env.get_env("MISSING"), None);
    }

    #[test]
    fn test_mock_env_mutations() {
        let env = MockEnv::new().with_env("VAR", "original");

        env.set_env("VAR", "modified");
        assert_eq!(env.get_env("VAR"), Some("modified".to_string()));

        env.remove_env("VAR");
        assert_eq!(env.get_env("VAR"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_is_present() {
        use std::os::unix::ffi::OsStringExt;

        struct OsEnv(HashMap<String, OsString>);

        impl EnvSource for OsEnv {
            fn get_env(&self, name: &str) -> Option<String> {
                self.0.get(name).cloned().map(decode_os)
            }
        }

        let raw = OsString::from_vec(vec![b'4', 0xff, b'2']);
        assert_eq!(decode_os(raw.clone()), "4\u{fffd}2");

        let source = OsEnv(HashMap::from([("WEIGHT".to_string(), raw)]));
        let env = crate::Environment::with_source(source);
        let weight = crate::declarations::integer(&env, "WEIGHT", "weight")
            .default(7)
            .declare()
            .unwrap();
        env.try_initialize().unwrap_err();

        let err = weight.value().unwrap_err();
        assert!(
            matches!(
                err,
                crate::Error::Variable(crate::error::VariableError::Value(_))
            ),
            "{err}"
        );
    }

    #[test]
    fn test_shared_mock_env() {
        let env = Arc::new(MockEnv::new().with_env("VAR", "a"));
        let shared = Arc::clone(&env);
        env.set_env("VAR", "b");
        assert_eq!(shared.get_env("VAR"), Some("b".to_string()));
    }
}
