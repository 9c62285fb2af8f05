use base64::{engine::general_purpose, Engine as _};

use super::MAX_EXAMPLE_LENGTH;
use crate::constraint::{length_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

/// How binary values are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// Standard base64 with padding
    #[default]
    Base64,
    /// URL-safe base64 without padding
    Base64Url,
}

impl BinaryEncoding {
    fn encode(self, bytes: &[u8]) -> String {
        match self {
            BinaryEncoding::Base64 => general_purpose::STANDARD.encode(bytes),
            BinaryEncoding::Base64Url => general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    fn decode(self, raw: &str) -> Result<Vec<u8>, String> {
        match self {
            BinaryEncoding::Base64 => general_purpose::STANDARD
                .decode(raw)
                .map_err(|_| "must be base64 encoded".to_string()),
            BinaryEncoding::Base64Url => general_purpose::URL_SAFE_NO_PAD
                .decode(raw)
                .map_err(|_| "must be base64url encoded".to_string()),
        }
    }

    fn name(self) -> &'static str {
        match self {
            BinaryEncoding::Base64 => "base64",
            BinaryEncoding::Base64Url => "base64url",
        }
    }
}

/// Options for a `Vec<u8>` declaration.
#[derive(Debug, Clone, Default)]
pub struct BinaryKind {
    encoding: BinaryEncoding,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

/// Declare binary data, base64 encoded unless `encoding` says otherwise.
pub fn binary(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<BinaryKind> {
    DeclarationBuilder::new(env, name, description, BinaryKind::default())
}

impl DeclarationBuilder<BinaryKind> {
    /// Set the encoding.
    pub fn encoding(mut self, encoding: BinaryEncoding) -> Self {
        self.kind.encoding = encoding;
        self
    }

    /// Bound the decoded length in bytes. Either bound may be omitted.
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.kind.min_length = min;
        self.kind.max_length = max;
        self
    }
}

impl DeclarationKind for BinaryKind {
    type Value = Vec<u8>;

    fn schema(&self, constraints: Vec<Constraint<Vec<u8>>>) -> Result<Schema<Vec<u8>>, String> {
        super::check_bounds(self.min_length.as_ref(), self.max_length.as_ref())?;

        let mut all: Vec<Constraint<Vec<u8>>> =
            length_constraint(self.min_length, self.max_length, |v: &Vec<u8>| v.len())
                .into_iter()
                .collect();
        all.extend(constraints);

        let encoding = self.encoding;
        Ok(Schema::scalar(
            encoding.name(),
            move |v: &Vec<u8>| encoding.encode(v),
            move |raw: &str| encoding.decode(raw),
            all,
        ))
    }

    fn examples(&self) -> Vec<Example<Vec<u8>>> {
        let length = self.min_length.unwrap_or(16).max(1);
        let mut examples = Vec::new();
        if length <= MAX_EXAMPLE_LENGTH {
            examples.push(Example::new(
                (0..length).map(|i| (i * 37 % 256) as u8).collect(),
                format!("{} bytes", length),
            ));
        }
        if let Some(max) = self
            .max_length
            .filter(|max| *max > length && *max <= MAX_EXAMPLE_LENGTH)
        {
            examples.push(Example::new(vec![0xff; max], format!("{} bytes", max)));
        }
        examples.push(Example::new(b"hello".to_vec(), "text"));
        examples
    }
}
