//! crates/rpt_core/src/metric.rs
//! Metric tiles: numeric coercion, period-over-period change, display formatting.
//!
//! Rules:
//! - Text inputs keep only `[0-9.]`; no `.` left → integer, otherwise float.
//! - Integer vs float survives into the display value (`12` vs `12.0`).
//! - `before == 0` with `now != before` yields an infinite change, never an error.
//! - Labels round half-to-even and read `"<Dir> <n>% on last <period>"`.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Comparison period used when none is given.
pub const DEFAULT_PERIOD: &str = "year";

// ----------------------------- Numbers -----------------------------

/// A coerced metric value. The integer/float split is observable in output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(x) => x,
        }
    }

    fn ordering(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            // Both sides are finite after coercion.
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Number {
    /// Floats always show a fractional part or an exponent, integers never do.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write_float(f, x),
        }
    }
}

/// Shortest round-trip digits. Decimal exponents below -4 or from 16 up
/// switch to `<mantissa>e<sign><two or more digits>`, e.g. `1e-05`, `1.5e+16`.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let sci = format!("{x:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        // inf / NaN
        return write!(f, "{x}");
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if x != 0.0 && (exp < -4 || exp >= 16) {
        let sign = if exp < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exp.unsigned_abs());
    }
    let plain = x.to_string();
    if plain.contains('.') {
        f.write_str(&plain)
    } else {
        write!(f, "{plain}.0")
    }
}

/// Raw metric input: a native number or a formatted string such as `"£1,234.50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricInput {
    /// Coerce into a [`Number`].
    ///
    /// Native numbers are taken as-is (non-finite floats are rejected); text is
    /// stripped to `[0-9.]` and parsed as an integer unless a `.` remains.
    pub fn coerce(&self) -> Result<Number, CoreError> {
        match self {
            MetricInput::Int(i) => Ok(Number::Int(*i)),
            MetricInput::Float(x) if x.is_finite() => Ok(Number::Float(*x)),
            MetricInput::Float(x) => Err(CoreError::InvalidMetricValue { input: x.to_string() }),
            MetricInput::Text(s) => coerce_text(s),
        }
    }
}

fn coerce_text(raw: &str) -> Result<Number, CoreError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let invalid = || CoreError::InvalidMetricValue { input: raw.to_string() };

    if cleaned.contains('.') {
        cleaned.parse::<f64>().map(Number::Float).map_err(|_| invalid())
    } else {
        cleaned.parse::<i64>().map(Number::Int).map_err(|_| invalid())
    }
}

impl From<i64> for MetricInput {
    fn from(v: i64) -> Self { MetricInput::Int(v) }
}
impl From<i32> for MetricInput {
    fn from(v: i32) -> Self { MetricInput::Int(i64::from(v)) }
}
impl From<u32> for MetricInput {
    fn from(v: u32) -> Self { MetricInput::Int(i64::from(v)) }
}
impl From<f64> for MetricInput {
    fn from(v: f64) -> Self { MetricInput::Float(v) }
}
impl From<&str> for MetricInput {
    fn from(v: &str) -> Self { MetricInput::Text(v.to_string()) }
}
impl From<String> for MetricInput {
    fn from(v: String) -> Self { MetricInput::Text(v) }
}

// ----------------------------- Comparison -----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Flat => "flat",
        }
    }

    /// Capitalized form used at the start of a label.
    pub fn capitalized(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Flat => "Flat",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage change of `now` against `before`, plus its direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Unrounded percentage; `f64::INFINITY` when `before` is zero.
    pub change: f64,
    pub direction: Direction,
}

impl Comparison {
    /// Change rounded half-to-even, or `inf` for the zero-baseline sentinel.
    pub fn rounded_change(&self) -> String {
        if self.change.is_infinite() {
            return "inf".to_string();
        }
        let r = self.change.round_ties_even();
        // normalise -0
        let r = if r == 0.0 { 0.0 } else { r };
        format!("{r:.0}")
    }

    pub fn label(&self, period: &str) -> String {
        format!(
            "{} {}% on last {}",
            self.direction.capitalized(),
            self.rounded_change(),
            period
        )
    }
}

/// Compare two coerced values.
pub fn compare(now: Number, before: Number) -> Comparison {
    let direction = match now.ordering(before) {
        Ordering::Equal => {
            return Comparison { change: 0.0, direction: Direction::Flat };
        }
        Ordering::Greater => Direction::Up,
        Ordering::Less => Direction::Down,
    };

    let (a, b) = (now.as_f64(), before.as_f64());
    let change = if b == 0.0 {
        f64::INFINITY
    } else {
        (a - b).abs() / b * 100.0
    };
    Comparison { change, direction }
}

// ----------------------------- Formatting -----------------------------

/// Apply prefix or suffix to a value. A prefix wins; the suffix is then ignored.
pub fn format_value(value: Number, prefix: Option<&str>, suffix: Option<&str>) -> String {
    match (prefix, suffix) {
        (Some(p), _) => format!("{p}{value}"),
        (None, Some(s)) => format!("{value}{s}"),
        (None, None) => value.to_string(),
    }
}

// ----------------------------- Tiles -----------------------------

/// Display record embedded in a page's `page_metrics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTile {
    #[serde(rename = "metric_title")]
    pub title: String,
    #[serde(rename = "metric_value")]
    pub display_value: String,
    #[serde(rename = "metric_label")]
    pub label: Option<String>,
}

/// Everything needed to compute one tile. Also the shape accepted in report definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSpec {
    pub title: String,
    pub now: MetricInput,
    #[serde(default)]
    pub before: Option<MetricInput>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Comparison period word; defaults to [`DEFAULT_PERIOD`].
    #[serde(default)]
    pub period: Option<String>,
}

impl MetricSpec {
    pub fn new(title: impl Into<String>, now: impl Into<MetricInput>) -> Self {
        Self {
            title: title.into(),
            now: now.into(),
            before: None,
            prefix: None,
            suffix: None,
            period: None,
        }
    }

    pub fn before(mut self, before: impl Into<MetricInput>) -> Self {
        self.before = Some(before.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn compute(&self) -> Result<MetricTile, CoreError> {
        let now = self.now.coerce()?;
        let label = match &self.before {
            Some(before) => {
                let before = before.coerce()?;
                let period = self.period.as_deref().unwrap_or(DEFAULT_PERIOD);
                Some(compare(now, before).label(period))
            }
            None => None,
        };

        Ok(MetricTile {
            title: self.title.clone(),
            display_value: format_value(now, self.prefix.as_deref(), self.suffix.as_deref()),
            label,
        })
    }
}

/// Compute a tile comparing against last year.
pub fn compute_tile(
    title: impl Into<String>,
    value_now: impl Into<MetricInput>,
    value_before: Option<MetricInput>,
    prefix: Option<&str>,
    suffix: Option<&str>,
) -> Result<MetricTile, CoreError> {
    MetricSpec {
        title: title.into(),
        now: value_now.into(),
        before: value_before,
        prefix: prefix.map(str::to_string),
        suffix: suffix.map(str::to_string),
        period: None,
    }
    .compute()
}
