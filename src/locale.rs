use crate::error::{Result, WatchError};
use url::Url;

/// Rewrites URLs so the page renders in a fixed locale
#[derive(Debug, Clone)]
pub struct LocaleNormalizer {
    key: String,
    locale: String,
}

impl LocaleNormalizer {
    /// `key` is the query parameter that selects the locale, e.g. `setlang`
    pub fn new(key: &str, locale: &str) -> Self {
        Self {
            key: key.to_string(),
            locale: locale.to_string(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Force the locale parameter on `url`, keeping every other query key
    ///
    /// Repeated keys are grouped in first-seen order and the locale key is
    /// overwritten in place (or appended when absent), so the result is
    /// stable under repeated normalization.
    pub fn normalize(&self, url: &str) -> Result<String> {
        let mut parsed = Url::parse(url).map_err(|source| WatchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut params: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in parsed.query_pairs() {
            match params.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value.into_owned()),
                None => params.push((key.into_owned(), vec![value.into_owned()])),
            }
        }

        match params.iter_mut().find(|(k, _)| *k == self.key) {
            Some((_, values)) => *values = vec![self.locale.clone()],
            None => params.push((self.key.clone(), vec![self.locale.clone()])),
        }

        parsed.query_pairs_mut().clear().extend_pairs(
            params
                .iter()
                .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str()))),
        );

        Ok(parsed.to_string())
    }
}

/// Free-function form of [`LocaleNormalizer::normalize`] using `setlang`
pub fn normalize(url: &str, locale: &str) -> Result<String> {
    LocaleNormalizer::new("setlang", locale).normalize(url)
}
