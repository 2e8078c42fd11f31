//! Control capabilities
//!
//! The widget never touches a rendering host directly. A host hands it objects
//! implementing these traits; [`PairedControl`] and [`TextElement`] are the
//! headless implementations used by the CLI, the C ABI and the tests.

use serde::{Deserialize, Serialize};

/// Which half of a paired control an event or write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Numeric,
    Slider,
}

/// A logical value backed by one or more input elements
pub trait ValueControl {
    /// Current value as entered by the user
    fn get(&self) -> String;

    /// Write `value` into `repr` and keep the paired representation in sync.
    fn set_from(&mut self, repr: Representation, value: &str);
}

/// The trial side: a value that also carries an upper bound
pub trait TrialControl: ValueControl {
    /// Write `value` to every representation.
    fn set(&mut self, value: u32);

    /// Set the maximum attribute on every representation.
    fn set_max(&mut self, max: u32);
}

/// Text element that displays the current bound
pub trait BoundLabel {
    fn set_label(&mut self, text: &str);
}

/// Single input element: string value plus optional bounds attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputElement {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl InputElement {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            min: Some("1".to_string()),
            max: None,
        }
    }
}

/// Numeric entry and slider sharing one logical value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedControl {
    pub numeric: InputElement,
    pub slider: InputElement,
}

impl PairedControl {
    pub fn new(value: i64) -> Self {
        let value = value.to_string();
        Self {
            numeric: InputElement::with_value(value.clone()),
            slider: InputElement::with_value(value),
        }
    }

    pub fn element(&self, repr: Representation) -> &InputElement {
        match repr {
            Representation::Numeric => &self.numeric,
            Representation::Slider => &self.slider,
        }
    }

    /// Upper bound shown on the numeric entry, if one has been set
    pub fn max(&self) -> Option<&str> {
        self.numeric.max.as_deref()
    }
}

impl ValueControl for PairedControl {
    fn get(&self) -> String {
        self.numeric.value.clone()
    }

    fn set_from(&mut self, _repr: Representation, value: &str) {
        // Both halves mirror the last write, whichever side it came from.
        self.numeric.value = value.to_string();
        self.slider.value = value.to_string();
    }
}

impl TrialControl for PairedControl {
    fn set(&mut self, value: u32) {
        self.set_from(Representation::Numeric, &value.to_string());
    }

    fn set_max(&mut self, max: u32) {
        let max = max.to_string();
        self.numeric.max = Some(max.clone());
        self.slider.max = Some(max);
    }
}

/// Text-only output element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
}

impl BoundLabel for TextElement {
    fn set_label(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

/// Parse a control value the way the page reads integers out of inputs:
/// leading whitespace, an optional sign, then the leading run of digits.
/// Anything after the digits (a fraction, an exponent) is ignored and values
/// beyond `i64` saturate. `None` only when no digit leads the text.
pub fn parse_control_value(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_control_mirrors_slider_writes() {
        let mut control = PairedControl::new(2);
        control.set_from(Representation::Slider, "5");
        assert_eq!(control.numeric.value, "5");
        assert_eq!(control.slider.value, "5");
        assert_eq!(control.get(), "5");
    }

    #[test]
    fn test_trial_control_sets_both_bounds() {
        let mut control = PairedControl::new(1);
        control.set_max(4);
        assert_eq!(control.numeric.max.as_deref(), Some("4"));
        assert_eq!(control.slider.max.as_deref(), Some("4"));

        control.set(3);
        assert_eq!(control.element(Representation::Slider).value, "3");
    }

    #[test]
    fn test_parse_control_value() {
        assert_eq!(parse_control_value("6"), Some(6));
        assert_eq!(parse_control_value(" 14 "), Some(14));
        assert_eq!(parse_control_value("-2"), Some(-2));
        assert_eq!(parse_control_value("six"), None);
        assert_eq!(parse_control_value(""), None);
        assert_eq!(parse_control_value("-"), None);
        assert_eq!(parse_control_value(".5"), None);
    }

    #[test]
    fn test_parse_control_value_reads_leading_integer() {
        assert_eq!(parse_control_value("4.5"), Some(4));
        assert_eq!(parse_control_value("6e0"), Some(6));
        assert_eq!(parse_control_value("+3"), Some(3));
        assert_eq!(parse_control_value("12abc"), Some(12));
        assert_eq!(parse_control_value("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_control_value("-99999999999999999999"), Some(-i64::MAX));
    }
}
