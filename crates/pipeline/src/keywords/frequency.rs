//! Deterministic term-frequency ranking.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::{KeywordError, KeywordRanker};

/// Runs of Han characters, or runs of other word characters.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Han}{2,}|[\w&&\P{Han}]{2,}").expect("token pattern is valid")
});

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "的", "是", "在", "有", "和", "与", "或", "等", "可", "应", "需", "能", "会", "为", "而",
        "但", "因", "如", "及", "其", "这", "那", "此", "本", "该", "各", "某", "多", "少", "大",
        "小", "高", "低", "新", "老", "男", "女", "幼", "急", "慢", "我们", "以及", "或者", "可以",
        "因此", "但是", "如果", "这些", "那些", "一般", "进行", "可能", "需要", "其中", "通常",
        "the", "and", "with", "for", "are", "from", "that", "this", "was", "were", "not", "but",
    ]
    .into_iter()
    .collect()
});

/// Ranks tokens seen more than once by descending count; ties keep the
/// order of first appearance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyRanker;

impl FrequencyRanker {
    pub fn new() -> Self {
        Self
    }

    pub fn frequency_rank(&self, text: &str, max: usize) -> Vec<String> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, token) in TOKEN.find_iter(text).map(|m| m.as_str()).enumerate() {
            if STOP_WORDS.contains(token.to_lowercase().as_str()) {
                continue;
            }
            counts.entry(token).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .filter(|(_, (count, _))| *count > 1)
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(max)
            .map(|(token, _, _)| token.to_string())
            .collect()
    }
}

impl KeywordRanker for FrequencyRanker {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn rank(&self, text: &str, max: usize) -> Result<Vec<String>, KeywordError> {
        Ok(self.frequency_rank(text, max))
    }
}
