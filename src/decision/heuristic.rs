use crate::constants::keywords;

use super::Decision;

/// Case-insensitive keyword matcher. Bullish words are checked first.
#[derive(Clone, Debug)]
pub struct KeywordHeuristic {
    bullish: Vec<String>,
    bearish: Vec<String>,
}

impl Default for KeywordHeuristic {
    fn default() -> Self {
        Self::new(keywords::BULLISH, keywords::BEARISH)
    }
}

impl KeywordHeuristic {
    pub fn new<B, S>(bullish: B, bearish: S) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            bullish: normalize(bullish),
            bearish: normalize(bearish),
        }
    }

    pub fn decide(&self, news: &str) -> Decision {
        let news = news.to_lowercase();
        if self.bullish.iter().any(|k| news.contains(k.as_str())) {
            Decision::Buy
        } else if self.bearish.iter().any(|k| news.contains(k.as_str())) {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}

fn normalize<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
