// the collection of utility functions for bracket checking and number/message formatting

/// Maximal nesting depth of round brackets.
///
/// # Errors
/// If a closing bracket has no partner or an opening bracket is never closed.
pub fn bracket_depth(s: &str) -> Result<usize, String> {
    let mut depth: usize = 0;
    let mut max_depth: usize = 0;
    for (position, c) in s.chars().enumerate() {
        match c {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => {
                if depth == 0 {
                    return Err(format!(
                        "unbalanced parentheses: ')' at position {} has no opening bracket",
                        position
                    ));
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(format!("unbalanced parentheses: {} bracket(s) never closed", depth));
    }
    Ok(max_depth)
}

/// Number of operator tokens in `s`, counting `**` once.
pub fn operator_count(s: &str) -> usize {
    let mut count = 0;
    let mut previous = ' ';
    for c in s.chars() {
        match c {
            '+' | '-' | '/' | '^' => count += 1,
            '*' if previous != '*' => count += 1,
            _ => {}
        }
        previous = c;
    }
    count
}

fn trim_fraction_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Formats a number with `digits` significant digits the way C's `%g` does:
/// fixed notation for moderate exponents, scientific otherwise, trailing zeros removed.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction_zeros(&format!("{:.*}", decimals, value))
    }
}

/// First line of `message`, cut to at most `max_chars` characters.
pub fn first_line_truncated(message: &str, max_chars: usize) -> String {
    message
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(max_chars)
        .collect()
}

/// `message` cut to at most `max_chars` characters.
pub fn truncate_chars(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}
