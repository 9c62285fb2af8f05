//! Pretty printing for validation results.
//!
//! The default `initialize()` handler renders every variable, valid or not, so
//! that a failed startup shows the whole environment at once.
//!
//! # Output Format
//!
//! ```text
//! Environment variable errors (2):
//!
//!   ✗ WEIGHT   <integer>       value of WEIGHT ("0") is invalid: must be >= 1
//!       weight of the thing
//!   ✓ DEBUG    y | n           y
//!       enable debug output
//!   ✗ API_KEY  <string>        API_KEY is undefined and does not have a default value
//!       key for the upstream API
//! ```

use std::fmt::Write;

use crate::error::{VariableError, SENSITIVE_PLACEHOLDER};
use crate::maybe::Maybe;
use crate::validate::VariableResult;

/// Options for rendering a summary.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Enable colored output (auto-detected by default).
    pub color: ColorOption,
    /// Redact sensitive values.
    pub redact_sensitive: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            color: ColorOption::Auto,
            redact_sensitive: true,
        }
    }
}

impl SummaryOptions {
    /// Create options with colors disabled.
    pub fn no_color() -> Self {
        Self {
            color: ColorOption::Never,
            ..Default::default()
        }
    }

    /// Set the color option.
    pub fn with_color(mut self, color: ColorOption) -> Self {
        self.color = color;
        self
    }

    /// Set whether to redact sensitive values.
    pub fn with_redaction(mut self, redact: bool) -> Self {
        self.redact_sensitive = redact;
        self
    }
}

/// Color output option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOption {
    /// Auto-detect from `NO_COLOR` and whether stderr is a terminal.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// ANSI color codes for terminal output.
struct Colors {
    error: &'static str,
    ok: &'static str,
    name: &'static str,
    value: &'static str,
    dim: &'static str,
    reset: &'static str,
}

impl Colors {
    fn enabled() -> Self {
        Self {
            error: "\x1b[1;31m", // bold red
            ok: "\x1b[32m",      // green
            name: "\x1b[1;37m",  // bold white
            value: "\x1b[33m",   // yellow
            dim: "\x1b[2m",
            reset: "\x1b[0m",
        }
    }

    fn disabled() -> Self {
        Self {
            error: "",
            ok: "",
            name: "",
            value: "",
            dim: "",
            reset: "",
        }
    }
}

fn should_use_color(color_option: ColorOption) -> bool {
    match color_option {
        ColorOption::Always => true,
        ColorOption::Never => false,
        ColorOption::Auto => {
            use std::io::IsTerminal;
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    }
}

struct SummaryPrinter<'a> {
    options: &'a SummaryOptions,
    colors: Colors,
}

impl<'a> SummaryPrinter<'a> {
    fn new(options: &'a SummaryOptions) -> Self {
        let colors = if should_use_color(options.color) {
            Colors::enabled()
        } else {
            Colors::disabled()
        };
        Self { options, colors }
    }

    fn print(&self, results: &[VariableResult], out: &mut String) {
        let c = &self.colors;
        let invalid = results.iter().filter(|r| r.result.is_err()).count();
        let name_width = results
            .iter()
            .map(|r| r.variable.name().chars().count())
            .max()
            .unwrap_or(0);
        let expected: Vec<String> = results.iter().map(|r| r.variable.expected()).collect();
        let expected_width = expected.iter().map(|e| e.chars().count()).max().unwrap_or(0);

        if invalid > 0 {
            writeln!(
                out,
                "{}Environment variable errors ({}):{}\n",
                c.error, invalid, c.reset
            )
            .ok();
        } else {
            writeln!(out, "{}Environment variables:{}\n", c.ok, c.reset).ok();
        }

        for (result, expected) in results.iter().zip(&expected) {
            let (mark, status) = match &result.result {
                Ok(_) => (
                    format!("{}✓{}", c.ok, c.reset),
                    format!("{}{}{}", c.value, self.value_text(result), c.reset),
                ),
                Err(e) => (
                    format!("{}✗{}", c.error, c.reset),
                    format!("{}{}{}", c.error, self.error_text(e), c.reset),
                ),
            };
            writeln!(
                out,
                "  {} {}{:name_width$}{}  {:expected_width$}  {}",
                mark,
                c.name,
                result.variable.name(),
                c.reset,
                expected,
                status,
            )
            .ok();
            writeln!(out, "      {}{}{}", c.dim, result.variable.description(), c.reset).ok();
        }
    }

    fn value_text(&self, result: &VariableResult) -> String {
        if !self.options.redact_sensitive {
            if let Ok(Maybe::Defined(value)) = &result.result {
                return value.clone();
            }
        }
        match result.display_value() {
            Some(value) => value.to_string(),
            None => "not set".to_string(),
        }
    }

    fn error_text(&self, error: &VariableError) -> String {
        if self.options.redact_sensitive {
            return error.to_string();
        }
        match error {
            VariableError::Value(e) => format!(
                "value of {} ({:?}) is invalid: {}",
                e.name,
                e.unredacted_value(),
                e.cause
            ),
            other => other.to_string(),
        }
    }
}

/// Render a summary of every variable to a string.
///
/// Sensitive values are replaced with `<sensitive value>` unless
/// `redact_sensitive` is off.
pub fn render_summary(results: &[VariableResult], options: &SummaryOptions) -> String {
    let mut out = String::new();
    SummaryPrinter::new(options).print(results, &mut out);
    out
}

/// Whether `text` shows a sensitive value in redacted form.
pub fn is_redacted(text: &str) -> bool {
    text.contains(SENSITIVE_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{integer, string};
    use crate::env::MockEnv;
    use crate::environment::Environment;

    fn results(vars: &[(&str, &str)]) -> Vec<VariableResult> {
        let env = Environment::with_source(MockEnv::new().with_envs(vars.iter().copied()));
        integer(&env, "WEIGHT", "weight of the thing")
            .min(1)
            .declare()
            .unwrap();
        string(&env, "API_KEY", "key for the upstream API")
            .sensitive()
            .declare()
            .unwrap();
        string(&env, "REGION", "deployment region")
            .declare_optional()
            .unwrap();
        env.mark_initialized();
        env.validate().unwrap().results
    }

    #[test]
    fn test_summary_header_counts_invalid() {
        let output = render_summary(&results(&[("WEIGHT", "0")]), &SummaryOptions::no_color());
        assert!(output.starts_with("Environment variable errors (2):"));
    }

    #[test]
    fn test_summary_lists_every_variable_in_order() {
        let output = render_summary(
            &results(&[("WEIGHT", "3"), ("API_KEY", "k")]),
            &SummaryOptions::no_color(),
        );
        let weight = output.find("WEIGHT").unwrap();
        let key = output.find("API_KEY").unwrap();
        let region = output.find("REGION").unwrap();
        assert!(weight < key && key < region);
        assert!(output.contains("deployment region"));
        assert!(output.contains("not set"));
        assert!(output.starts_with("Environment variables:"));
    }

    #[test]
    fn test_summary_shows_errors() {
        let output = render_summary(&results(&[("WEIGHT", "0")]), &SummaryOptions::no_color());
        assert!(output.contains("✗ WEIGHT"));
        assert!(output.contains("value of WEIGHT (\"0\") is invalid: must be >= 1"));
        assert!(output.contains("API_KEY is undefined and does not have a default value"));
    }

    #[test]
    fn test_summary_redacts_sensitive_values() {
        let output = render_summary(
            &results(&[("WEIGHT", "3"), ("API_KEY", "hunter2")]),
            &SummaryOptions::no_color(),
        );
        assert!(is_redacted(&output));
        assert!(!output.contains("hunter2"));
    }

    #[test]
    fn test_summary_without_redaction() {
        let options = SummaryOptions::no_color().with_redaction(false);
        let output = render_summary(&results(&[("WEIGHT", "3"), ("API_KEY", "hunter2")]), &options);
        assert!(output.contains("hunter2"));
        assert!(!is_redacted(&output));
    }

    #[test]
    fn test_color_option_always() {
        let options = SummaryOptions::default().with_color(ColorOption::Always);
        let output = render_summary(&results(&[]), &options);
        assert!(output.contains("\x1b["));
    }

    #[test]
    fn test_color_option_never() {
        let output = render_summary(&results(&[]), &SummaryOptions::no_color());
        assert!(!output.contains("\x1b["));
    }
}
