use crate::config::RuleConfig;
use crate::error::Result;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Why a page did or did not match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Verdict {
    /// A bonus phrase appeared on its own
    Phrase { phrase: String },
    /// The generic keyword and a canonical amount both appeared
    KeywordAmount { keyword: String, amount: String },
    NoMatch,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        !matches!(self, Verdict::NoMatch)
    }
}

/// Two-tier content rule: a direct phrase, or a keyword paired with an amount
///
/// The keyword and amount may appear anywhere in the text; no proximity
/// between them is required.
#[derive(Debug, Clone)]
pub struct MatchRule {
    phrase: Regex,
    keyword: Regex,
    amount: AmountPattern,
}

impl MatchRule {
    /// Compile a rule from phrase patterns, a keyword pattern and canonical amounts
    ///
    /// Phrases and the keyword are regex fragments matched case-insensitively
    /// on word boundaries.
    pub fn new<S: AsRef<str>>(phrases: &[S], keyword: &str, amounts: &[S]) -> Result<Self> {
        let alternatives = phrases
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            phrase: case_insensitive(&format!(r"\b(?:{})\b", alternatives))?,
            keyword: case_insensitive(&format!(r"\b(?:{})\b", keyword))?,
            amount: AmountPattern::new(amounts)?,
        })
    }

    pub fn from_config(rules: &RuleConfig) -> Result<Self> {
        Self::new(&rules.phrases, &rules.keyword, &rules.amounts)
    }

    /// Decide whether `text` matches, and by which rule
    pub fn evaluate(&self, text: &str) -> Verdict {
        if let Some(m) = self.phrase.find(text) {
            return Verdict::Phrase {
                phrase: m.as_str().to_string(),
            };
        }

        let Some(keyword) = self.keyword.find(text) else {
            return Verdict::NoMatch;
        };
        match self.amount.find(text) {
            Some(amount) => Verdict::KeywordAmount {
                keyword: keyword.as_str().to_string(),
                amount: amount.to_string(),
            },
            None => Verdict::NoMatch,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.evaluate(text).is_match()
    }
}

/// Locale-tolerant pattern for a set of monetary amounts
///
/// For "2000" this accepts `2000`, `2,000`, `2.000` and `2 000`, each with an
/// optional `€`/`EUR` marker before or after. An amount never matches inside
/// a longer run of digits, so `12000` and `20005` do not count as `2000`.
#[derive(Debug, Clone)]
pub struct AmountPattern {
    regex: Regex,
}

impl AmountPattern {
    pub fn new<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let alternatives = values
            .iter()
            .map(|v| amount_alternative(v.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        // The regex crate has no lookaround, so the digit guard consumes one
        // non-digit (or an anchor) on each side and the amount is captured.
        let pattern = format!(r"(?:^|\D)(?P<amount>{})(?:\D|$)", alternatives);
        Ok(Self {
            regex: case_insensitive(&pattern)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// First amount found in `text`, including any currency marker
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.name("amount"))
            .map(|m| m.as_str())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Pattern for one canonical amount with its separator and currency variants
fn amount_alternative(value: &str) -> String {
    let body = if value.len() > 3 && value.is_char_boundary(value.len() - 3) {
        let (head, tail) = value.split_at(value.len() - 3);
        format!(
            r"(?:{}|{}[.,\s]?{})",
            regex::escape(value),
            regex::escape(head),
            regex::escape(tail)
        )
    } else {
        regex::escape(value)
    };

    format!(r"(?:(?:€|eur)\s*)?{}(?:\s*(?:€|eur))?", body)
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rule() -> MatchRule {
        MatchRule::from_config(&RuleConfig::default()).unwrap()
    }

    #[test]
    fn test_amount_variants_match() {
        let amounts = AmountPattern::new(&["1000", "1500", "2000", "2500", "3000"]).unwrap();
        for text in [
            "2000",
            "2,000",
            "2.000",
            "2 000",
            "€2000",
            "€ 2.000",
            "2000 EUR",
            "2000eur",
            "EUR 2,000",
            "up to 2.000 € after probation",
            "(1500)",
        ] {
            assert!(amounts.is_match(text), "expected a match in {:?}", text);
        }
    }

    #[test]
    fn test_amount_digit_guard() {
        let amounts = AmountPattern::new(&["1000", "1500", "2000", "2500", "3000"]).unwrap();
        for text in ["12000", "20005", "120001", "2,0000", "32.000", "150"] {
            assert!(!amounts.is_match(text), "unexpected match in {:?}", text);
        }
    }

    #[test]
    fn test_amount_find_reports_marker() {
        let amounts = AmountPattern::new(&["2000"]).unwrap();
        assert_eq!(amounts.find("a bonus of EUR 2.000 paid"), Some("EUR 2.000"));
        assert_eq!(amounts.find("2000"), Some("2000"));
        assert_eq!(amounts.find("12000"), None);
    }

    #[test]
    fn test_short_amounts_have_no_separator_variant() {
        let amounts = AmountPattern::new(&["500"]).unwrap();
        assert!(amounts.is_match("€500"));
        assert!(!amounts.is_match("5,00"));
        assert!(!amounts.is_match("1500"));
    }

    #[test]
    fn test_phrase_rule_ignores_amount() {
        let rule = default_rule();
        for text in [
            "Signing Bonus available",
            "SIGN-ON BONUS",
            "a sign on bonus for new hires",
            "our signon bonus",
        ] {
            assert!(
                matches!(rule.evaluate(text), Verdict::Phrase { .. }),
                "expected phrase verdict for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_keyword_amount_rule() {
        let rule = default_rule();
        assert_eq!(
            rule.evaluate("bonus payment of 1000"),
            Verdict::KeywordAmount {
                keyword: "bonus".to_string(),
                amount: "1000".to_string(),
            }
        );
        assert!(rule.matches("€2.500 welcome BONUS"));
    }

    #[test]
    fn test_no_match_cases() {
        let rule = default_rule();
        assert_eq!(rule.evaluate("bonuses"), Verdict::NoMatch);
        assert_eq!(rule.evaluate("bonuses of 2000"), Verdict::NoMatch);
        assert_eq!(rule.evaluate("a bonus is paid yearly"), Verdict::NoMatch);
        assert_eq!(rule.evaluate("salary 2000 EUR"), Verdict::NoMatch);
        assert_eq!(rule.evaluate("bonus of 12000"), Verdict::NoMatch);
        assert_eq!(rule.evaluate(""), Verdict::NoMatch);
    }

    #[test]
    fn test_custom_phrases() {
        let rule = MatchRule::new(&["welcome bonus"], "prämie", &["750"]).unwrap();
        assert!(rule.matches("Welcome Bonus!"));
        assert!(rule.matches("Prämie von 750 €"));
        assert!(!rule.matches("signing bonus"));
    }
}
