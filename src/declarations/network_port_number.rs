use super::check_bounds;
use crate::constraint::{range_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

/// Options for a TCP/UDP port number declaration.
#[derive(Debug, Clone, Default)]
pub struct NetworkPortNumberKind {
    min: Option<u16>,
    max: Option<u16>,
}

/// Declare a port number between 1 and 65535.
pub fn network_port_number(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<NetworkPortNumberKind> {
    DeclarationBuilder::new(env, name, description, NetworkPortNumberKind::default())
}

impl DeclarationBuilder<NetworkPortNumberKind> {
    /// Lowest accepted port, inclusive.
    pub fn min(mut self, min: u16) -> Self {
        self.kind.min = Some(min);
        self
    }

    /// Highest accepted port, inclusive.
    pub fn max(mut self, max: u16) -> Self {
        self.kind.max = Some(max);
        self
    }
}

pub(crate) fn parse_port(raw: &str) -> Result<u16, String> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err("must be an unsigned integer".to_string());
    }
    match raw.parse::<u32>() {
        Ok(port @ 1..=65535) => Ok(port as u16),
        _ => Err("must be between 1 and 65535".to_string()),
    }
}

/// Rejects port 0 in defaults and examples, which never go through `parse_port`.
pub(crate) fn nonzero_port() -> Constraint<u16> {
    Constraint::intrinsic(|port: &u16| {
        if *port == 0 {
            Err("must be between 1 and 65535".to_string())
        } else {
            Ok(())
        }
    })
}

impl DeclarationKind for NetworkPortNumberKind {
    type Value = u16;

    fn schema(&self, constraints: Vec<Constraint<u16>>) -> Result<Schema<u16>, String> {
        check_bounds(self.min.as_ref(), self.max.as_ref())?;

        let mut all = vec![nonzero_port()];
        all.extend(range_constraint(self.min, self.max, |v| v.to_string()));
        all.extend(constraints);
        Ok(Schema::scalar(
            "port number",
            |v: &u16| v.to_string(),
            parse_port,
            all,
        ))
    }

    fn examples(&self) -> Vec<Example<u16>> {
        let mut examples = Vec::new();
        if let Some(min) = self.min {
            examples.push(Example::new(min, "the minimum"));
        }
        if let Some(max) = self.max {
            examples.push(Example::new(max, "the maximum"));
        }
        examples.extend([
            Example::new(443, "HTTPS"),
            Example::new(8080, "an unprivileged port"),
            Example::new(5432, "PostgreSQL"),
        ]);
        examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("1"), Ok(1));
        assert_eq!(parse_port("65535"), Ok(65535));
        assert_eq!(parse_port("0080"), Ok(80));
    }

    #[test]
    fn test_parse_port_rejects() {
        for raw in ["-1", "+80", "0x50", "8.0", "http"] {
            assert_eq!(parse_port(raw), Err("must be an unsigned integer".to_string()), "{raw}");
        }
        for raw in ["0", "65536", "99999999999"] {
            assert_eq!(parse_port(raw), Err("must be between 1 and 65535".to_string()), "{raw}");
        }
    }

    #[test]
    fn test_port_range() {
        let env = Environment::with_source(MockEnv::new().with_env("PORT", "80"));
        let port = network_port_number(&env, "PORT", "listen port")
            .min(1024)
            .declare()
            .unwrap();
        env.mark_initialized();
        assert_eq!(
            port.value().unwrap_err().to_string(),
            "value of PORT (\"80\") is invalid: must be >= 1024"
        );
    }

    #[test]
    fn test_zero_default_rejected() {
        let env = Environment::with_source(MockEnv::new());
        let err = network_port_number(&env, "PORT", "listen port")
            .default(0u16)
            .declare()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for PORT is invalid: default value \"0\" is invalid: must be between 1 and 65535"
        );
    }
}
