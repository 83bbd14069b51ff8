//! Drops resume header tokens up to the first section marker

pub const DEFAULT_SECTION_KEYWORD: &str = "objective";

#[derive(Debug, Clone)]
pub struct SectionTrimmer {
    keyword: String,
}

impl Default for SectionTrimmer {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_KEYWORD)
    }
}

impl SectionTrimmer {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Everything strictly after the first occurrence of the keyword, or the
    /// whole sequence when the keyword is absent.
    pub fn trim<'a>(&self, tokens: &'a [String]) -> &'a [String] {
        trim_after_keyword(tokens, &self.keyword)
    }
}

pub fn trim_after_keyword<'a>(tokens: &'a [String], keyword: &str) -> &'a [String] {
    match tokens.iter().position(|t| t.eq_ignore_ascii_case(keyword)) {
        Some(index) => &tokens[index + 1..],
        None => tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_trims_after_first_occurrence() {
        let seq = tokens(&["john", "doe", "objective", "build", "objective", "systems"]);
        let trimmed = SectionTrimmer::default().trim(&seq);
        assert_eq!(trimmed, &seq[3..]);
    }

    #[test]
    fn test_missing_keyword_returns_input() {
        let seq = tokens(&["john", "doe", "rust"]);
        assert_eq!(SectionTrimmer::default().trim(&seq), seq.as_slice());
    }

    #[test]
    fn test_case_insensitive_match() {
        let seq = tokens(&["Header", "OBJECTIVE", "rust"]);
        assert_eq!(SectionTrimmer::new("Objective").trim(&seq), &seq[2..]);
    }

    #[test]
    fn test_keyword_as_last_token() {
        let seq = tokens(&["header", "objective"]);
        assert!(SectionTrimmer::default().trim(&seq).is_empty());
    }

    #[test]
    fn test_result_is_always_suffix() {
        let inputs = [
            tokens(&[]),
            tokens(&["objective"]),
            tokens(&["a", "b", "c"]),
            tokens(&["a", "objective", "b", "objective"]),
        ];

        for seq in &inputs {
            let trimmed = trim_after_keyword(seq, "objective");
            assert!(seq.ends_with(trimmed));
        }
    }
}
