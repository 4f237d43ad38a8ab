use once_cell::sync::Lazy;
use regex::Regex;

/// 编号前缀 (NFSE/NOTA/NFE/NF) 及其后的分隔符, 长前缀优先
static PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:NFSE|NOTA|NFE|NF)[\s\-:.#º°]*").expect("prefix pattern")
});

/// `<4位年份><分隔符><数字>`
static YEAR_SEPARATED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}[./-]([0-9]+)$").expect("year-separated pattern")
});

const YEAR_RANGE: std::ops::RangeInclusive<u32> = 2020..=2030;

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// 去除前导零, 全零时返回 "0"
fn strip_zeros(s: &str) -> String {
    let stripped = s.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

fn strip_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    match PREFIX_REGEX.find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => trimmed,
    }
}

fn year_separated_suffix(s: &str) -> Option<&str> {
    YEAR_SEPARATED_REGEX
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// 将不同格式的编号规范化为可比较的形式
///
/// "NF 2025/119", "202500000000119" 与 "119" 都规范化为 "119"。
pub fn normalize(raw: &str) -> String {
    let rest = strip_prefix(raw);

    if let Some(digits) = year_separated_suffix(rest) {
        return strip_zeros(digits);
    }

    if is_all_digits(rest) {
        if rest.len() > 8 {
            let stripped = strip_zeros(rest);
            if stripped.len() > 4 {
                let plausible_year = stripped[..4]
                    .parse::<u32>()
                    .map(|y| YEAR_RANGE.contains(&y))
                    .unwrap_or(false);
                if plausible_year {
                    return strip_zeros(&stripped[4..]);
                }
            }
            return stripped;
        }
        return strip_zeros(rest);
    }

    rest.to_string()
}

/// 两个规范化编号是否指向同一单据 (相等, 去零后相等, 或互为后缀)
pub fn equivalent(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let za = a.trim_start_matches('0');
    let zb = b.trim_start_matches('0');
    if za == zb {
        return true;
    }

    (!zb.is_empty() && za.ends_with(zb)) || (!za.is_empty() && zb.ends_with(za))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_year_formats() {
        assert_eq!(normalize("202500000000119"), "119");
        assert_eq!(normalize("2025/119"), "119");
        assert_eq!(normalize("2025.119"), "119");
        assert_eq!(normalize("2025-00119"), "119");
        assert_eq!(normalize("119"), "119");
    }

    #[test]
    fn test_normalize_prefixes() {
        assert_eq!(normalize("NF 000123"), "123");
        assert_eq!(normalize("nfse-2024/77"), "77");
        assert_eq!(normalize("NFe: 456"), "456");
        assert_eq!(normalize("Nota 0042"), "42");
    }

    #[test]
    fn test_normalize_long_digits_without_year() {
        // 1999 不是合理年份, 只去除前导零
        assert_eq!(normalize("0001999123456"), "1999123456");
        assert_eq!(normalize("123456789"), "123456789");
    }

    #[test]
    fn test_normalize_year_separator_requires_digits() {
        assert_eq!(normalize("NF#2025-0042"), "42");
        assert_eq!(normalize("2025/ab"), "2025/ab");
        assert_eq!(normalize("25/119"), "25/119");
    }

    #[test]
    fn test_normalize_leaves_mixed_text() {
        assert_eq!(normalize("A-77/B"), "A-77/B");
        assert_eq!(normalize("0000"), "0");
    }

    #[test]
    fn test_equivalent() {
        assert!(equivalent("119", "00119"));
        assert!(equivalent("119", "202500000000119"));
        assert!(equivalent("119", "119"));
        assert!(!equivalent("", "119"));
        assert!(!equivalent("119", ""));
        assert!(!equivalent("119", "122"));
    }
}
