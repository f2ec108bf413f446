//! The subset of C `printf` that lowered prints rely on.
//!
//! Supports `%%`, the flags `- 0 + #` and space, width, precision, the length modifiers
//! `h hh l ll`, and the conversions `d i u x X f p s c`.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Result, SimError};

/// One runtime printf argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Integers are passed sign- or zero-extended to 64 bits already.
    Int(i64),
    /// A float together with its IEEE bits at the declared width, used by `%x`.
    Float { value: f64, bits: u64 },
    Ptr(u64),
    Str(String),
}

impl Arg {
    fn kind(&self) -> &'static str {
        match self {
            Arg::Int(_) => "integer",
            Arg::Float { .. } => "float",
            Arg::Ptr(_) => "pointer",
            Arg::Str(_) => "string",
        }
    }
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
    wide: bool,
    conversion: char,
}

pub fn render(format: &str, args: &[Arg]) -> Result<String> {
    let mut out = String::with_capacity(format.len() + args.len() * 4);
    let mut chars = format.chars().peekable();
    let mut next = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let spec = parse_spec(&mut chars, format)?;
        let arg = args.get(next).ok_or_else(|| SimError::MissingArgument {
            format: format.to_string(),
            given: args.len(),
        })?;
        next += 1;
        out.push_str(&convert(&spec, arg)?);
    }

    if next < args.len() {
        return Err(SimError::UnusedArguments {
            format: format.to_string(),
            unused: args.len() - next,
        });
    }
    Ok(out)
}

fn bad_format(format: &str, reason: impl Into<String>) -> SimError {
    SimError::BadFormat {
        format: format.to_string(),
        reason: reason.into(),
    }
}

fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        value = Some(value.unwrap_or(0) * 10 + digit as usize);
    }
    value
}

fn parse_spec(chars: &mut Peekable<Chars<'_>>, format: &str) -> Result<Spec> {
    let mut spec = Spec::default();

    while let Some(&c) = chars.peek() {
        match c {
            '-' => spec.left = true,
            '0' => spec.zero = true,
            '+' => spec.plus = true,
            ' ' => spec.space = true,
            '#' => spec.alternate = true,
            _ => break,
        }
        chars.next();
    }

    spec.width = parse_number(chars);

    if chars.peek() == Some(&'.') {
        chars.next();
        spec.precision = Some(parse_number(chars).unwrap_or(0));
    }

    let mut length = String::new();
    while let Some(&c) = chars.peek() {
        if c != 'h' && c != 'l' {
            break;
        }
        length.push(c);
        chars.next();
    }
    match length.as_str() {
        "" | "h" | "hh" => {}
        "l" | "ll" => spec.wide = true,
        other => return Err(bad_format(format, format!("bad length modifier '{}'", other))),
    }

    spec.conversion = match chars.next() {
        Some(c @ ('d' | 'i' | 'u' | 'x' | 'X' | 'f' | 'p' | 's' | 'c')) => c,
        Some(c) => return Err(bad_format(format, format!("unknown conversion '{}'", c))),
        None => return Err(bad_format(format, "format ends inside a conversion")),
    };
    Ok(spec)
}

fn mismatch(spec: &Spec, arg: &Arg) -> SimError {
    SimError::ArgumentMismatch {
        conversion: spec.conversion,
        found: arg.kind(),
    }
}

fn unsigned_bits(spec: &Spec, value: i64) -> u64 {
    if spec.wide {
        value as u64
    } else {
        u64::from(value as u32)
    }
}

fn with_precision(digits: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

fn convert(spec: &Spec, arg: &Arg) -> Result<String> {
    let zero_ok = spec.precision.is_none();
    let text = match (spec.conversion, arg) {
        ('d' | 'i', Arg::Int(v)) => {
            let v = if spec.wide { *v } else { i64::from(*v as i32) };
            let sign = sign_of(spec, v < 0);
            let digits = with_precision(v.unsigned_abs().to_string(), spec.precision);
            pad(spec, sign, &digits, zero_ok)
        }
        ('u', Arg::Int(v)) => {
            let digits = with_precision(unsigned_bits(spec, *v).to_string(), spec.precision);
            pad(spec, "", &digits, zero_ok)
        }
        ('x' | 'X', Arg::Int(_) | Arg::Float { .. }) => {
            let raw = match arg {
                Arg::Int(v) => unsigned_bits(spec, *v),
                Arg::Float { bits, .. } if spec.wide => *bits,
                Arg::Float { bits, .. } => u64::from(*bits as u32),
                _ => return Err(mismatch(spec, arg)),
            };
            let mut digits = with_precision(format!("{:x}", raw), spec.precision);
            if spec.conversion == 'X' {
                digits = digits.to_uppercase();
            }
            let prefix = match (spec.alternate && raw != 0, spec.conversion) {
                (true, 'X') => "0X",
                (true, _) => "0x",
                _ => "",
            };
            pad(spec, prefix, &digits, zero_ok)
        }
        ('f', Arg::Float { value, .. }) => {
            if value.is_nan() {
                pad(spec, "", "nan", false)
            } else if value.is_infinite() {
                pad(spec, sign_of(spec, *value < 0.0), "inf", false)
            } else {
                let digits = format!("{:.*}", spec.precision.unwrap_or(6), value.abs());
                pad(spec, sign_of(spec, value.is_sign_negative()), &digits, true)
            }
        }
        ('p', Arg::Ptr(v)) => pad(spec, "", &format!("0x{:x}", v), false),
        ('s', Arg::Str(s)) => {
            let shown: String = match spec.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s.clone(),
            };
            pad(spec, "", &shown, false)
        }
        ('c', Arg::Int(v)) => pad(spec, "", &char::from(*v as u8).to_string(), false),
        _ => return Err(mismatch(spec, arg)),
    };
    Ok(text)
}

fn sign_of(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn pad(spec: &Spec, sign: &str, body: &str, zero_ok: bool) -> String {
    let len = sign.chars().count() + body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return format!("{}{}", sign, body);
    }
    let fill = width - len;
    if spec.left {
        format!("{}{}{}", sign, body, " ".repeat(fill))
    } else if spec.zero && zero_ok {
        format!("{}{}{}", sign, "0".repeat(fill), body)
    } else {
        format!("{}{}{}", " ".repeat(fill), sign, body)
    }
}
