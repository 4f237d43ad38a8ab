use bigdecimal::{BigDecimal, Zero};

/// 金额比较容差 ε = 0.01 (含边界)
pub fn tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

pub fn within_tolerance(a: &BigDecimal, b: &BigDecimal) -> bool {
    (a - b).abs() <= tolerance()
}

/// 两个金额都存在 (> 0) 且在容差内相等
pub fn values_match(a: &BigDecimal, b: &BigDecimal) -> bool {
    *a > BigDecimal::zero() && *b > BigDecimal::zero() && within_tolerance(a, b)
}

/// round(a - b, 2)
pub fn difference(invoice_value: &BigDecimal, slip_value: &BigDecimal) -> BigDecimal {
    (invoice_value - slip_value).round(2)
}

/// 格式化为 "R$ 1234.50"
pub fn format_brl(value: &BigDecimal) -> String {
    format!("R$ {}", value.round(2).with_scale(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        assert!(within_tolerance(&dec("100.00"), &dec("100.01")));
        assert!(!within_tolerance(&dec("100.00"), &dec("100.02")));
    }

    #[test]
    fn test_zero_values_never_match() {
        assert!(!values_match(&dec("0"), &dec("0")));
        assert!(values_match(&dec("630"), &dec("630.00")));
    }

    #[test]
    fn test_difference_and_format() {
        assert_eq!(difference(&dec("9290.71"), &dec("9290.71")), dec("0"));
        assert_eq!(difference(&dec("500"), &dec("0")), dec("500.00"));
        assert_eq!(format_brl(&dec("630")), "R$ 630.00");
    }
}
