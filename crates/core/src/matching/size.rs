/// Parse a tracker size string such as `"1.46 GB"` or `"700 MB"` into
/// gigabytes.
///
/// Non-breaking spaces count as spaces. Only `GB` and `MB` (any case) are
/// understood; anything else, including a missing unit or a non-numeric
/// value, yields `None`.
pub fn parse_size(text: &str) -> Option<f64> {
    let normalized = text.replace('\u{a0}', " ");
    let mut parts = normalized.split_whitespace();
    let (value, unit) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let value: f64 = value.parse().ok().filter(|v: &f64| v.is_finite())?;
    if unit.eq_ignore_ascii_case("GB") {
        Some(value)
    } else if unit.eq_ignore_ascii_case("MB") {
        Some(value / 1024.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gigabytes() {
        assert_eq!(parse_size("1.46 GB"), Some(1.46));
        assert_eq!(parse_size("20 gb"), Some(20.0));
    }

    #[test]
    fn test_parse_megabytes() {
        assert_eq!(parse_size("700 MB"), Some(700.0 / 1024.0));
        assert_eq!(parse_size("512 Mb"), Some(0.5));
    }

    #[test]
    fn test_parse_non_breaking_space() {
        assert_eq!(parse_size("4.5\u{a0}GB"), Some(4.5));
        assert_eq!(parse_size("  4.5 GB\u{a0}"), Some(4.5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("GB"), None);
        assert_eq!(parse_size("4.5"), None);
        assert_eq!(parse_size("4.5 TB"), None);
        assert_eq!(parse_size("four GB"), None);
        assert_eq!(parse_size("4.5 GB extra"), None);
        assert_eq!(parse_size("inf GB"), None);
        assert_eq!(parse_size("NaN MB"), None);
    }
}
