//! Value formatting
//!
//! Turns sampled [`WatchValue`]s into display strings. Output never depends
//! on the host locale: decimal point is always `.`, group separator `,`.
//!
//! Supported specifiers for numbers and vectors (vectors apply the
//! specifier per component):
//!
//! | spec   | meaning                                   | example (`1234.5`) |
//! |--------|-------------------------------------------|--------------------|
//! | `F[n]` | fixed point, n decimals (default 2)       | `F1` → `1234.5`    |
//! | `N[n]` | fixed point with grouping                 | `N2` → `1,234.50`  |
//! | `P[n]` | percent (×100)                            | `P0` → `123450 %`  |
//! | `E[n]` | scientific, n mantissa decimals (def. 6)  | `E2` → `1.23E+003` |
//! | `D[n]` | integers only, zero padded                | `D5` on 42 → `00042` |
//! | `X[n]` | integers only, hex (`x` for lowercase)    | `X4` on 255 → `00FF` |
//! | `G[n]` | general (default form)                    |                    |
//! | `0.0#` | custom pattern of `0`, `#`, `,`, `.`      | `#,0.00` → `1,234.50` |
//!
//! Unknown or inapplicable specifiers fall back to the default form.
//!
//! Midpoints round half to even on the stored binary value, the same as
//! `format!`: `2.5` with `#` renders `2`, `3.5` renders `4`.

use std::fmt::Write;

use crate::types::WatchValue;

/// Shown for null values and references to destroyed objects
pub const NULL_TEXT: &str = "null";

/// Shown for values that have no string form
pub const NO_STRING_FORM: &str = "<no string form>";

/// Format a sampled value for display
pub fn format_value(value: &WatchValue, format: &str) -> String {
    let spec = format.trim();
    match value {
        WatchValue::Null => NULL_TEXT.to_string(),
        WatchValue::Object(object) => object.name().unwrap_or_else(|| NULL_TEXT.to_string()),
        WatchValue::Text(text) => text.clone(),
        WatchValue::Bool(b) => b.to_string(),
        WatchValue::Int(v) => format_number(Number::Int(*v), spec),
        WatchValue::UInt(v) => format_number(Number::UInt(*v), spec),
        WatchValue::F32(v) => format_number(Number::F32(*v), spec),
        WatchValue::F64(v) => format_number(Number::F64(*v), spec),
        WatchValue::Vec2(v) => format_components(&[v.x, v.y], spec),
        WatchValue::Vec3(v) => format_components(&[v.x, v.y, v.z], spec),
        WatchValue::Display(text) => text.clone(),
        WatchValue::Opaque => NO_STRING_FORM.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::UInt(v) => v as f64,
            Number::F32(v) => v as f64,
            Number::F64(v) => v,
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, Number::Int(_) | Number::UInt(_))
    }

    fn default_form(self) -> String {
        match self {
            Number::Int(v) => v.to_string(),
            Number::UInt(v) => v.to_string(),
            Number::F32(v) => v.to_string(),
            Number::F64(v) => v.to_string(),
        }
    }
}

/// Parsed format specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spec {
    Fixed(usize),
    Grouped(usize),
    Percent(usize),
    Exponent { upper: bool, digits: usize },
    Decimal(usize),
    Hex { upper: bool, width: usize },
    General,
    Pattern { min: usize, max: usize, grouping: bool },
}

/// Largest precision accepted from a specifier
const MAX_PRECISION: usize = 99;

impl Spec {
    fn parse(spec: &str) -> Option<Spec> {
        let first = spec.chars().next()?;
        if matches!(first, '0' | '#' | '.' | ',') {
            return Self::parse_pattern(spec);
        }

        let rest = &spec[first.len_utf8()..];
        let precision = if rest.is_empty() {
            None
        } else {
            let n: usize = rest.parse().ok()?;
            if n > MAX_PRECISION {
                return None;
            }
            Some(n)
        };

        let spec = match first {
            'F' | 'f' => Spec::Fixed(precision.unwrap_or(2)),
            'N' | 'n' => Spec::Grouped(precision.unwrap_or(2)),
            'P' | 'p' => Spec::Percent(precision.unwrap_or(2)),
            'E' | 'e' => Spec::Exponent {
                upper: first == 'E',
                digits: precision.unwrap_or(6),
            },
            'D' | 'd' => Spec::Decimal(precision.unwrap_or(0)),
            'X' | 'x' => Spec::Hex {
                upper: first == 'X',
                width: precision.unwrap_or(0),
            },
            'G' | 'g' => Spec::General,
            _ => return None,
        };
        Some(spec)
    }

    fn parse_pattern(spec: &str) -> Option<Spec> {
        if !spec.chars().all(|c| matches!(c, '0' | '#' | '.' | ',')) {
            return None;
        }
        let (int_part, frac_part) = match spec.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (spec, ""),
        };
        if frac_part.contains('.') {
            return None;
        }
        let min = frac_part.chars().filter(|&c| c == '0').count();
        let max = frac_part.chars().filter(|&c| c == '0' || c == '#').count();
        Some(Spec::Pattern {
            min,
            max,
            grouping: int_part.contains(','),
        })
    }

    fn apply(self, number: Number) -> Option<String> {
        let text = match self {
            Spec::Fixed(decimals) => fixed(number, decimals)?,
            Spec::Grouped(decimals) => group_thousands(&fixed(number, decimals)?),
            Spec::Percent(decimals) => {
                let scaled = number.as_f64() * 100.0;
                if !scaled.is_finite() {
                    return None;
                }
                format!("{scaled:.decimals$} %")
            }
            Spec::Exponent { upper, digits } => exponent(number.as_f64(), upper, digits)?,
            Spec::Decimal(width) => match number {
                Number::Int(v) if v < 0 => format!("-{:0width$}", v.unsigned_abs()),
                Number::Int(v) => format!("{v:0width$}"),
                Number::UInt(v) => format!("{v:0width$}"),
                _ => return None,
            },
            Spec::Hex { upper, width } => match (number, upper) {
                (Number::Int(v), true) => format!("{v:0width$X}"),
                (Number::Int(v), false) => format!("{v:0width$x}"),
                (Number::UInt(v), true) => format!("{v:0width$X}"),
                (Number::UInt(v), false) => format!("{v:0width$x}"),
                _ => return None,
            },
            Spec::General => number.default_form(),
            Spec::Pattern { min, max, grouping } => {
                let mut text = fixed(number, max)?;
                trim_fraction(&mut text, min);
                if grouping {
                    text = group_thousands(&text);
                }
                text
            }
        };
        Some(text)
    }
}

/// Fixed-point rendering; integers keep full precision
fn fixed(number: Number, decimals: usize) -> Option<String> {
    if number.is_integer() {
        let mut text = number.default_form();
        if decimals > 0 {
            text.push('.');
            text.extend(std::iter::repeat_n('0', decimals));
        }
        return Some(text);
    }
    let v = number.as_f64();
    if !v.is_finite() {
        return None;
    }
    Some(format!("{v:.decimals$}"))
}

/// Scientific notation with a signed, three-digit exponent
fn exponent(v: f64, upper: bool, digits: usize) -> Option<String> {
    if !v.is_finite() {
        return None;
    }
    let raw = format!("{v:.digits$e}");
    let (mantissa, exp) = raw.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    let marker = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    let mut out = String::with_capacity(mantissa.len() + 5);
    let _ = write!(out, "{mantissa}{marker}{sign}{:03}", exp.unsigned_abs());
    Some(out)
}

/// Drop optional trailing fraction digits, keeping at least `min`
fn trim_fraction(text: &mut String, min: usize) {
    let Some(dot) = text.find('.') else {
        return;
    };
    let keep = dot + 1 + min;
    while text.len() > keep && text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
}

/// Insert `,` every three digits of the integer part
fn group_thousands(text: &str) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match digits.find('.') {
        Some(dot) => digits.split_at(dot),
        None => (digits, ""),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push_str(frac_part);
    out
}

fn format_number(number: Number, spec: &str) -> String {
    if spec.is_empty() {
        return number.default_form();
    }
    Spec::parse(spec)
        .and_then(|s| s.apply(number))
        .unwrap_or_else(|| number.default_form())
}

fn format_components(components: &[f32], spec: &str) -> String {
    let mut out = String::from("(");
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format_number(Number::F32(*c), spec));
    }
    out.push(')');
    out
}
