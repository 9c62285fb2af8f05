use url::Url;

use crate::constraint::Constraint;
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;
use crate::words::disjunction;

/// Options for a `Url` declaration.
#[derive(Debug, Clone, Default)]
pub struct UrlKind {
    base: Option<Url>,
    protocols: Vec<String>,
}

/// Declare a URL.
pub fn url(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<UrlKind> {
    DeclarationBuilder::new(env, name, description, UrlKind::default())
}

impl DeclarationBuilder<UrlKind> {
    /// Resolve relative references against `base`.
    pub fn base(mut self, base: Url) -> Self {
        self.kind.base = Some(base);
        self
    }

    /// Restrict the protocol, given as `https` or `https:`.
    pub fn protocols<I>(mut self, protocols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.kind.protocols = protocols.into_iter().map(Into::into).collect();
        self
    }
}

fn normalize_protocol(protocol: &str) -> String {
    let protocol = protocol.to_ascii_lowercase();
    if protocol.ends_with(':') {
        protocol
    } else {
        format!("{}:", protocol)
    }
}

fn protocol_constraint(protocols: &[String]) -> Result<Option<Constraint<Url>>, String> {
    if protocols.is_empty() {
        return Ok(None);
    }
    if protocols.iter().any(|p| p.trim_end_matches(':').is_empty()) {
        return Err("protocols can't be empty strings".to_string());
    }

    let allowed: Vec<String> = protocols.iter().map(|p| normalize_protocol(p)).collect();
    let message = format!("protocol must be {}", disjunction(&allowed));
    let description = message.clone();
    Ok(Some(Constraint::extrinsic(description, move |url: &Url| {
        if allowed.contains(&format!("{}:", url.scheme())) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })))
}

impl DeclarationKind for UrlKind {
    type Value = Url;

    fn schema(&self, constraints: Vec<Constraint<Url>>) -> Result<Schema<Url>, String> {
        let mut all: Vec<Constraint<Url>> =
            protocol_constraint(&self.protocols)?.into_iter().collect();
        all.extend(constraints);

        let base = self.base.clone();
        Ok(Schema::scalar(
            "URL",
            |v: &Url| v.to_string(),
            move |raw: &str| match &base {
                Some(base) => base
                    .join(raw)
                    .map_err(|_| format!("must be a URL or a URL relative to {}", base)),
                None => Url::parse(raw).map_err(|_| "must be a URL".to_string()),
            },
            all,
        ))
    }

    fn examples(&self) -> Vec<Example<Url>> {
        let mut examples = Vec::new();
        let absolute = [
            ("https://example.org/", "an HTTPS URL"),
            ("http://localhost:8080/health", "an HTTP URL with a port"),
            ("postgres://db.example.org:5432/app", "a database URL"),
        ];
        for (raw, label) in absolute {
            if let Ok(url) = Url::parse(raw) {
                examples.push(Example::new(url, label));
            }
        }
        if let Some(base) = &self.base {
            if let Ok(relative) = base.join("status") {
                examples.push(Example::with_spelling(relative, "status", "relative to the base"));
            }
        }
        examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_url() {
        let env = Environment::with_source(
            MockEnv::new()
                .with_env("API", "https://api.example.org/v1")
                .with_env("BAD", "not a url"),
        );
        let api = url(&env, "API", "api").declare().unwrap();
        let bad = url(&env, "BAD", "bad").declare().unwrap();
        env.mark_initialized();

        assert_eq!(api.value().unwrap().host_str(), Some("api.example.org"));
        assert_eq!(
            bad.value().unwrap_err().to_string(),
            "value of BAD (\"not a url\") is invalid: must be a URL"
        );
    }

    #[test]
    fn test_relative_to_base() {
        let base = Url::parse("https://example.org/api/").unwrap();
        let env = Environment::with_source(MockEnv::new().with_env("ENDPOINT", "users"));
        let endpoint = url(&env, "ENDPOINT", "endpoint")
            .base(base)
            .declare()
            .unwrap();
        env.mark_initialized();
        assert_eq!(
            endpoint.value().unwrap().as_str(),
            "https://example.org/api/users"
        );
    }

    #[test]
    fn test_protocols() {
        let env = Environment::with_source(
            MockEnv::new().with_env("HOOK", "ftp://files.example.org/"),
        );
        let hook = url(&env, "HOOK", "webhook")
            .protocols(["https", "http:"])
            .declare()
            .unwrap();
        env.mark_initialized();
        assert_eq!(
            hook.value().unwrap_err().to_string(),
            "value of HOOK (\"ftp://files.example.org/\") is invalid: protocol must be https: or http:"
        );
    }

    #[test]
    fn test_generated_examples_respect_protocols() {
        let kind = UrlKind {
            base: None,
            protocols: vec!["https".to_string()],
        };
        let schema = kind.schema(vec![]).unwrap();
        let examples = crate::example::filter_examples(&schema, kind.examples());
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].value.as_str(), "https://example.org/");
    }
}
