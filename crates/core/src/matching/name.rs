use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Separators that may appear, disappear or change between a catalog title
/// and a release name.
const TITLE_SEPARATORS: [char; 4] = ['.', ':', '-', '—'];
const OPTIONAL_SEPARATOR: &str = r"[:.\-—]?";

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("No title, original title or year to match against")]
    EmptyTitle,

    #[error("Failed to compile title pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Case-insensitive predicate over release names for one film.
///
/// Holds one pattern per present condition (localized title, original title,
/// year). A name matches when every pattern matches somewhere in it, in any
/// order.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    conditions: Vec<Regex>,
}

impl NameMatcher {
    pub fn new(
        local_name: &str,
        orig_name: Option<&str>,
        year: Option<i32>,
    ) -> Result<Self, MatchError> {
        let mut patterns = Vec::with_capacity(3);

        let local = local_title_pattern(local_name);
        if !local.is_empty() {
            patterns.push(local);
        }
        if let Some(orig) = orig_name.map(str::trim).filter(|s| !s.is_empty()) {
            patterns.push(whole_word(orig));
        }
        if let Some(year) = year.filter(|y| *y != 0) {
            patterns.push(whole_word(&year.to_string()));
        }

        if patterns.is_empty() {
            return Err(MatchError::EmptyTitle);
        }

        let conditions = patterns
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { conditions })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.conditions.iter().all(|re| re.is_match(text))
    }
}

/// Shorthand for [`NameMatcher::new`].
pub fn build_matcher(
    local_name: &str,
    orig_name: Option<&str>,
    year: Option<i32>,
) -> Result<NameMatcher, MatchError> {
    NameMatcher::new(local_name, orig_name, year)
}

/// Tokens joined by flexible whitespace, with each separator optional.
fn local_title_pattern(name: &str) -> String {
    let mut parts = Vec::new();
    let mut token = String::new();

    let flush = |token: &mut String, parts: &mut Vec<String>| {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            parts.push(whole_word(trimmed));
        }
        token.clear();
    };

    for c in name.chars() {
        if TITLE_SEPARATORS.contains(&c) {
            flush(&mut token, &mut parts);
            parts.push(OPTIONAL_SEPARATOR.to_string());
        } else {
            token.push(c);
        }
    }
    flush(&mut token, &mut parts);

    if parts.iter().all(|p| p == OPTIONAL_SEPARATOR) {
        return String::new();
    }
    parts.join(r"\s*")
}

/// Literal text, anchored at word boundaries on the edges that are word
/// characters. An edge like `!` or `)` has no boundary to anchor to.
fn whole_word(literal: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let starts = literal.chars().next().is_some_and(is_word);
    let ends = literal.chars().last().is_some_and(is_word);

    format!(
        "{}{}{}",
        if starts { r"\b" } else { "" },
        regex::escape(literal),
        if ends { r"\b" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_are_optional() {
        let m = build_matcher("Film: Two", None, None).unwrap();
        assert!(m.is_match("Film - Two 2024"));
        assert!(m.is_match("Film Two Something Else"));
        assert!(m.is_match("Film.Two"));
        assert!(m.is_match("film — two"));
    }

    #[test]
    fn test_word_boundaries_reject_substrings() {
        let m = build_matcher("Film: Two", None, None).unwrap();
        assert!(!m.is_match("Filmovich Two"));
        assert!(!m.is_match("Film Twofold"));
    }

    #[test]
    fn test_cyrillic_case_insensitive() {
        let m = build_matcher("Мастер и Маргарита", None, None).unwrap();
        assert!(m.is_match("МАСТЕР И МАРГАРИТА (2024) WEB-DL"));
        assert!(!m.is_match("Мастерская и Маргарита"));
    }

    #[test]
    fn test_orig_name_and_year_are_independent_conditions() {
        let m = build_matcher("Альфа", Some("Alpha Original"), Some(2024)).unwrap();
        assert!(m.is_match("Альфа / Alpha Original (2024) WEB-DL"));
        assert!(m.is_match("2024 Alpha Original Альфа"));
        assert!(!m.is_match("Альфа / Alpha Original (2023)"));
        assert!(!m.is_match("Альфа (2024)"));
        assert!(!m.is_match("Alpha Original 2024"));
    }

    #[test]
    fn test_year_is_whole_word() {
        let m = build_matcher("Alpha", None, Some(2024)).unwrap();
        assert!(!m.is_match("Alpha 120245"));
        assert!(m.is_match("Alpha [2024]"));
    }

    #[test]
    fn test_zero_year_and_blank_orig_are_ignored() {
        let m = build_matcher("Alpha", Some("   "), Some(0)).unwrap();
        assert!(m.is_match("Alpha WEB-DL"));
    }

    #[test]
    fn test_punctuated_edges() {
        let m = build_matcher("Help!", None, None).unwrap();
        assert!(m.is_match("Help! 1965 BDRip"));

        let m = build_matcher("Alpha", Some("M*A*S*H"), None).unwrap();
        assert!(m.is_match("Alpha / M*A*S*H"));
    }

    #[test]
    fn test_empty_title_is_an_error() {
        assert!(matches!(
            build_matcher("", None, None),
            Err(MatchError::EmptyTitle)
        ));
        assert!(matches!(
            build_matcher(" - : ", Some(""), Some(0)),
            Err(MatchError::EmptyTitle)
        ));
    }

    #[test]
    fn test_orig_name_alone_is_enough() {
        let m = build_matcher("", Some("Alpha"), None).unwrap();
        assert!(m.is_match("Alpha 2024"));
        assert!(!m.is_match("Beta 2024"));
    }
}
