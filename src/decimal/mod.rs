//! Fixed-point decimal formatting for [`U256`] values (e.g. wei amounts
//! displayed in ether).

pub mod u256;

use crate::error::{Error, Result};
use alloc::string::String;
pub use u256::U256;

/// How to handle the digit truncated off when `decimals > max_decimals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    /// Drop the tail unconditionally.
    Truncate,
    /// Round half up (`>= 5` rounds up).
    Up,
    /// Round half down (`> 5` rounds up, `<= 5` truncates).
    Down,
    /// Never round up.
    Floor,
    /// Always round up if anything was truncated.
    Ceiling,
}

/// Formatting parameters for [`format_decimal`].
#[derive(Debug, Clone, Copy)]
pub struct DecimalFormat {
    /// The value's fixed-point scale (e.g. 18 for wei-to-ether).
    pub decimals: u32,
    /// Never trim the fractional part shorter than this.
    pub min_decimals: u32,
    /// Never show more fractional digits than this.
    pub max_decimals: u32,
    /// Digit-group size for the integer part (0 disables grouping; a
    /// nonzero value less than 3 is raised to 3).
    pub groups: u32,
    pub round: RoundMode,
    pub decimal_char: char,
    pub group_char: char,
}

impl Default for DecimalFormat {
    fn default() -> Self {
        DecimalFormat {
            decimals: 18,
            min_decimals: 0,
            max_decimals: 18,
            groups: 0,
            round: RoundMode::Truncate,
            decimal_char: '.',
            group_char: ',',
        }
    }
}

/// Formats `value` (scaled by `10^fmt.decimals`) as a decimal string.
///
/// Rounding is applied to the digit(s) truncated by `max_decimals` before
/// trailing-zero trimming; when nothing was truncated, trailing zeros are
/// trimmed down to `min_decimals`. Grouping separators are inserted into
/// the integer part only; the decimal point is elided entirely when the
/// final decimal count is zero.
pub fn format_decimal(value: &U256, fmt: &DecimalFormat) -> Result<String> {
    if value.bit_count() > 256 {
        return Err(Error::Overflow);
    }

    let mut fmt = *fmt;
    if fmt.groups != 0 && fmt.groups < 3 {
        fmt.groups = 3;
    }
    if fmt.max_decimals > fmt.decimals {
        fmt.max_decimals = fmt.decimals;
    }
    if fmt.min_decimals > fmt.decimals {
        fmt.min_decimals = fmt.decimals;
    }
    if fmt.max_decimals < fmt.min_decimals {
        fmt.max_decimals = fmt.min_decimals;
    }

    let mut rounded = *value;
    let mut decimals = fmt.decimals;
    let mut truncate = fmt.decimals - fmt.max_decimals;
    let mut was_rounded = false;
    let mut last_remainder = 0u32;

    while truncate > 0 {
        let (q, r) = rounded.divmod_u32(10);
        rounded = q;
        if r != 0 {
            was_rounded = true;
        }
        last_remainder = r;
        decimals -= 1;
        truncate -= 1;
    }

    if was_rounded {
        match fmt.round {
            RoundMode::Truncate | RoundMode::Floor => {}
            RoundMode::Up => {
                if last_remainder >= 5 {
                    rounded = rounded.add_u32(1);
                }
            }
            RoundMode::Down => {
                if last_remainder > 5 {
                    rounded = rounded.add_u32(1);
                }
            }
            RoundMode::Ceiling => rounded = rounded.add_u32(1),
        }
    } else {
        while decimals > fmt.min_decimals {
            let (q, r) = rounded.divmod_u32(10);
            if r != 0 {
                break;
            }
            decimals -= 1;
            rounded = q;
        }
    }

    let digits = rounded.to_decimal_string();
    let needed = decimals as usize + 1;
    let mut padded = String::with_capacity(needed);
    if digits.len() < needed {
        for _ in 0..(needed - digits.len()) {
            padded.push('0');
        }
    }
    padded.push_str(&digits);

    let split_at = padded.len() - decimals as usize;
    let (int_part, frac_part) = padded.split_at(split_at);

    let trimmed_int = {
        let t = int_part.trim_start_matches('0');
        if t.is_empty() {
            "0"
        } else {
            t
        }
    };

    let mut out = String::new();
    if fmt.groups == 0 {
        out.push_str(trimmed_int);
    } else {
        let group = fmt.groups as usize;
        let len = trimmed_int.len();
        let first_group_len = if len % group == 0 { group } else { len % group };
        out.push_str(&trimmed_int[..first_group_len]);
        let mut pos = first_group_len;
        while pos < len {
            out.push(fmt.group_char);
            out.push_str(&trimmed_int[pos..pos + group]);
            pos += group;
        }
    }

    if decimals > 0 {
        out.push(fmt.decimal_char);
        out.push_str(frac_part);
    }

    Ok(out)
}

/// Parses a decimal string back into a `U256` scaled by `10^decimals`.
///
/// Not present in the source (`ffx_decimal_parseValue` is declared but
/// never implemented there); this is the inverse of [`format_decimal`]'s
/// canonical output, needed to round-trip it. Grouping separators (`,` and
/// `_`) in the integer part are accepted and ignored; a fractional part
/// longer than `decimals` digits is rejected rather than silently
/// truncated.
pub fn parse_decimal(text: &str, decimals: u32) -> Result<U256> {
    let mut split = text.splitn(2, '.');
    let int_str = split.next().unwrap_or("");
    let frac_str = split.next().unwrap_or("");

    if int_str.is_empty() && frac_str.is_empty() {
        return Err(Error::BadData);
    }

    let mut value = U256::ZERO;
    for c in int_str.chars() {
        if c == ',' || c == '_' {
            continue;
        }
        let d = c.to_digit(10).ok_or(Error::BadData)?;
        value = value.mul_u32(10)?;
        value = value.add_u32(d);
    }

    let mut frac_digits = 0u32;
    for c in frac_str.chars() {
        if frac_digits >= decimals {
            return Err(Error::Overflow);
        }
        let d = c.to_digit(10).ok_or(Error::BadData)?;
        value = value.mul_u32(10)?;
        value = value.add_u32(d);
        frac_digits += 1;
    }

    while frac_digits < decimals {
        value = value.mul_u32(10)?;
        frac_digits += 1;
    }

    Ok(value)
}
