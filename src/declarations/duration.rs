use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::check_bounds;
use crate::constraint::{range_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    let n = r"(\d+(?:[.,]\d+)?)";
    Regex::new(&format!(
        r"^P(?:{n}W|(?:{n}D)?(?:T(?:{n}H)?(?:{n}M)?(?:{n}S)?)?)$"
    ))
    .unwrap()
});

const NANOS_PER_SECOND: u128 = 1_000_000_000;
// Nanoseconds per unit, in capture group order: W, D, H, M, S
const UNITS: [u128; 5] = [
    7 * 24 * 3600 * NANOS_PER_SECOND,
    24 * 3600 * NANOS_PER_SECOND,
    3600 * NANOS_PER_SECOND,
    60 * NANOS_PER_SECOND,
    NANOS_PER_SECOND,
];

/// Options for a `Duration` declaration.
#[derive(Debug, Clone, Default)]
pub struct DurationKind {
    min: Option<Duration>,
    max: Option<Duration>,
}

/// Declare an ISO 8601 duration such as `PT30S` or `P1DT12H`.
///
/// Years and months are rejected because their length varies.
pub fn duration(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<DurationKind> {
    DeclarationBuilder::new(env, name, description, DurationKind::default())
}

impl DeclarationBuilder<DurationKind> {
    /// Shortest accepted duration, inclusive.
    pub fn min(mut self, min: Duration) -> Self {
        self.kind.min = Some(min);
        self
    }

    /// Longest accepted duration, inclusive.
    pub fn max(mut self, max: Duration) -> Self {
        self.kind.max = Some(max);
        self
    }
}

/// Exact nanoseconds in `text` units of `unit` nanoseconds each.
fn component_nanos(text: &str, unit: u128) -> Option<u128> {
    let (whole, fraction) = match text.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if fraction.len() > 18 {
        return None;
    }

    let whole: u128 = whole.parse().ok()?;
    let mut nanos = whole.checked_mul(unit)?;
    if !fraction.is_empty() {
        let numerator: u128 = fraction.parse().ok()?;
        let denominator = 10u128.pow(fraction.len() as u32);
        nanos = nanos.checked_add(numerator.checked_mul(unit)? / denominator)?;
    }
    Some(nanos)
}

/// Parse an ISO 8601 duration made of weeks, days, hours, minutes, and
/// seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let invalid = || "must be an ISO 8601 duration".to_string();

    let captures = ISO_DURATION.captures(raw).ok_or_else(invalid)?;
    if raw.ends_with('T') || captures.iter().skip(1).all(|c| c.is_none()) {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    for (index, unit) in UNITS.iter().enumerate() {
        if let Some(text) = captures.get(index + 1) {
            let nanos = component_nanos(text.as_str(), *unit).ok_or_else(invalid)?;
            total = total.checked_add(nanos).ok_or_else(invalid)?;
        }
    }

    let secs = u64::try_from(total / NANOS_PER_SECOND).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SECOND) as u32))
}

/// Format a duration canonically as `PT{h}H{m}M{s}S`, omitting zero parts.
pub fn format_duration(value: &Duration) -> String {
    let secs = value.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    let nanos = value.subsec_nanos();

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push_str(&format!("{}.{}S", seconds, fraction.trim_end_matches('0')));
    } else if seconds > 0 || out.len() == 2 {
        out.push_str(&format!("{}S", seconds));
    }
    out
}

impl DeclarationKind for DurationKind {
    type Value = Duration;

    fn schema(&self, constraints: Vec<Constraint<Duration>>) -> Result<Schema<Duration>, String> {
        check_bounds(self.min.as_ref(), self.max.as_ref())?;

        let mut all: Vec<Constraint<Duration>> =
            range_constraint(self.min, self.max, format_duration).into_iter().collect();
        all.extend(constraints);
        Ok(Schema::scalar("duration", format_duration, parse_duration, all))
    }

    fn examples(&self) -> Vec<Example<Duration>> {
        let mut examples = Vec::new();
        if let Some(min) = self.min {
            examples.push(Example::new(min, "the minimum"));
        }
        if let Some(max) = self.max {
            examples.push(Example::new(max, "the maximum"));
        }
        examples.extend([
            Example::new(Duration::from_secs(30), "30 seconds"),
            Example::with_spelling(Duration::from_secs(5400), "PT90M", "90 minutes"),
            Example::with_spelling(Duration::from_secs(86_400), "P1D", "a day"),
            Example::new(Duration::from_millis(1500), "fractional seconds"),
        ]);
        examples
    }
}
