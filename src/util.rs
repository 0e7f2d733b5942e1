// Locale-aware number handling.
//
// All the "dirty" cell/number handling is centralized here so the rest of
// the code can assume clean, typed values. Source cells use Brazilian
// formatting: `.` groups thousands, `,` is the decimal separator, and money
// cells may carry an `R$` prefix.
use num_format::{Locale, ToFormattedString};

/// Outcome of parsing a raw cell into a number.
///
/// The pipeline never fails on a bad cell; it substitutes a default. The
/// two variants let callers (and tests) tell a real parsed value apart from
/// a substituted one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Parsed(f64),
    Defaulted,
}

impl Numeric {
    pub fn or_zero(&self) -> f64 {
        match self {
            Numeric::Parsed(v) => *v,
            Numeric::Defaulted => 0.0,
        }
    }

    pub fn was_defaulted(&self) -> bool {
        matches!(self, Numeric::Defaulted)
    }
}

/// Parse a raw cell value into a `Numeric`.
///
/// - Empty/missing cells default.
/// - `R$` markers and whitespace are stripped after uppercasing.
/// - If a comma is present it is the decimal separator and periods are
///   thousands separators: `"1.234,56"` parses as `1234.56`.
/// - Anything that still fails to parse defaults. No error escapes.
pub fn parse_numeric(raw: &str) -> Numeric {
    let s: String = raw
        .to_uppercase()
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if s.is_empty() {
        return Numeric::Defaulted;
    }
    let s = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Numeric::Parsed(v),
        _ => Numeric::Defaulted,
    }
}

/// Format a float with pt-BR digit grouping and a fixed number of decimals,
/// e.g. `1234567.89` -> `1.234.567,89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::pt);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push(',');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push(',');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Shorthand for money strings in reports and the dashboard.
pub fn format_brl(n: f64) -> String {
    format!("R$ {}", format_number(n, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::pt)
}

/// Display name for a month number (1-12). Unknown numbers echo the digits.
pub fn month_name(m: u32) -> String {
    match m {
        1 => "JANEIRO",
        2 => "FEVEREIRO",
        3 => "MARÇO",
        4 => "ABRIL",
        5 => "MAIO",
        6 => "JUNHO",
        7 => "JULHO",
        8 => "AGOSTO",
        9 => "SETEMBRO",
        10 => "OUTUBRO",
        11 => "NOVEMBRO",
        12 => "DEZEMBRO",
        _ => return m.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_brazilian_grouping() {
        assert_eq!(parse_numeric("1.234,56"), Numeric::Parsed(1234.56));
        assert_eq!(parse_numeric("1.200.300,75"), Numeric::Parsed(1200300.75));
        assert_eq!(parse_numeric("45,00"), Numeric::Parsed(45.0));
    }

    #[test]
    fn strips_currency_and_whitespace() {
        assert_eq!(parse_numeric("R$ 45,00"), Numeric::Parsed(45.0));
        assert_eq!(parse_numeric("  r$ 1.000,10 "), Numeric::Parsed(1000.10));
    }

    #[test]
    fn plain_floats_pass_through() {
        // Numeric cells arrive stringified with a period decimal.
        assert_eq!(parse_numeric("10.5"), Numeric::Parsed(10.5));
        assert_eq!(parse_numeric("2"), Numeric::Parsed(2.0));
    }

    #[test]
    fn failures_default_and_are_flagged() {
        assert!(parse_numeric("abc").was_defaulted());
        assert!(parse_numeric("").was_defaulted());
        assert!(parse_numeric("   ").was_defaulted());
        assert_eq!(parse_numeric("abc").or_zero(), 0.0);
    }

    #[test]
    fn parsed_values_are_not_flagged() {
        assert!(!parse_numeric("10,50").was_defaulted());
    }

    #[test]
    fn formats_pt_br() {
        assert_eq!(format_number(1234567.89, 2), "1.234.567,89");
        assert_eq!(format_number(0.0, 2), "0,00");
        assert_eq!(format_number(-45.5, 2), "-45,50");
        assert_eq!(format_brl(45.0), "R$ 45,00");
    }

    #[test]
    fn month_names_cover_year() {
        assert_eq!(month_name(1), "JANEIRO");
        assert_eq!(month_name(12), "DEZEMBRO");
        assert_eq!(month_name(13), "13");
    }
}
