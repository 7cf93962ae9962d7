//! Brazilian Real formatting: `1234.5` becomes `R$ 1.234,50`.

const ZERO: &str = "R$ 0,00";

pub fn format_brl(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let rendered = format!("{:.2}", v);
            let (sign, digits) = match rendered.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", rendered.as_str()),
            };
            let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
            format!("R$ {}{},{}", sign, group_thousands(int_part), frac_part)
        }
        _ => ZERO.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl_examples() {
        assert_eq!(format_brl(None), "R$ 0,00");
        assert_eq!(format_brl(Some(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(Some(0.0)), "R$ 0,00");
        assert_eq!(format_brl(Some(-5.0)), "R$ -5,00");
        assert_eq!(format_brl(Some(-1234.5)), "R$ -1.234,50");
        assert_eq!(format_brl(Some(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_brl(Some(999.999)), "R$ 1.000,00");
    }

    #[test]
    fn test_format_brl_non_finite() {
        assert_eq!(format_brl(Some(f64::NAN)), "R$ 0,00");
        assert_eq!(format_brl(Some(f64::INFINITY)), "R$ 0,00");
    }
}
