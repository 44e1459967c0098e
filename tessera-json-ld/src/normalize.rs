//! RFC 8785 canonical JSON serialization
//!
//! Produces a deterministic rendering of arbitrary JSON: object keys
//! sorted by UTF-16 code units, numbers in their shortest canonical
//! form, no insignificant whitespace. Used for the lexical form of
//! rdf:JSON literals and anywhere a stable hash input is needed.

use serde_json::Value as JsonValue;

/// Canonicalize a JSON value per RFC 8785
pub fn canonical_json(data: &JsonValue) -> String {
    let mut out = String::new();
    write_value(&mut out, data);
    out
}

fn write_value(out: &mut String, data: &JsonValue) {
    match data {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(true) => out.push_str("true"),
        JsonValue::Bool(false) => out.push_str("false"),
        JsonValue::Number(n) => write_number(out, n),
        JsonValue::String(s) => write_string(out, s),
        JsonValue::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        JsonValue::Object(map) => {
            let mut pairs: Vec<(&String, &JsonValue)> = map.iter().collect();
            // RFC 8785 sorts keys by UTF-16 code units, not bytes.
            pairs.sort_by(|a, b| utf16_cmp(a.0, b.0));

            out.push('{');
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, value);
            }
            out.push('}');
        }
    }
}

fn utf16_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c < '\u{0020}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_number(out: &mut String, n: &serde_json::Number) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        out.push_str(&canonical_float(f));
    } else {
        out.push_str(&n.to_string());
    }
}

/// Shortest canonical rendering of an f64 per RFC 8785 / ECMAScript
fn canonical_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if f.fract() == 0.0 && f.abs() < 1e15 {
        return (f as i64).to_string();
    }

    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        return exponential(f);
    }

    let s = format!("{}", f);
    if s.contains('.') && !s.contains('e') && !s.contains('E') {
        let trimmed = s.trim_end_matches('0');
        return trimmed.trim_end_matches('.').to_string();
    }
    s
}

fn exponential(f: f64) -> String {
    let rendered = format!("{:e}", f);
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let mantissa = if mantissa.contains('.') {
        let trimmed = mantissa.trim_end_matches('0');
        trimmed.trim_end_matches('.')
    } else {
        mantissa
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent >= 0 {
        format!("{}e+{}", mantissa, exponent)
    } else {
        format!("{}e{}", mantissa, exponent)
    }
}
