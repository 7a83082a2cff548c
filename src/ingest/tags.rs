//! Category tag extraction with Hangul-aware keyword matching.
//!
//! Keywords come from the five category dictionaries in [`TagDictionary`].
//! Multi-syllable keywords match as plain substrings. Single-syllable
//! keywords (벼, 소, 콩, ...) are ambiguous fragments of longer words, so they
//! only match at syllable boundaries: the preceding character must not be a
//! Hangul syllable, and the following character must either end the word or be
//! one grammatical particle (which is consumed but not part of the match).
//! Matching is purely textual.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Deserialize;

use crate::advisory::TagSets;

/// Particles that may trail a single-syllable keyword: topic/subject/object/
/// possessive/conjunctive/locative markers.
const PARTICLES: [char; 13] = [
    '은', '는', '이', '가', '을', '를', '의', '와', '과', '도', '로', '에', '서',
];

fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Keyword lists per tag category. Read-only after startup; loaded from the
/// `[tags]` config section or these defaults, which mirror the vocabulary of
/// the weekly bulletins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TagDictionary {
    pub crop: Vec<String>,
    pub task: Vec<String>,
    pub env: Vec<String>,
    pub pest: Vec<String>,
    pub admin: Vec<String>,
}

impl Default for TagDictionary {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| (*w).to_string()).collect()
        }
        Self {
            crop: owned(&[
                "벼", "보리", "밀", "콩", "옥수수", "감자", "고구마", "고추", "배추", "무",
                "마늘", "양파", "오이", "토마토", "딸기", "수박", "복숭아", "사과", "배",
                "포도", "감", "인삼", "오미자", "깨", "소", "돼지", "닭", "꿀벌",
            ]),
            task: owned(&[
                "파종", "육묘", "정식", "이앙", "물관리", "비료", "제초", "전정", "적과",
                "방제", "수확", "건조", "저장", "종자신청", "방역", "농기계점검", "요약",
            ]),
            env: owned(&[
                "기상전망", "태풍", "장마", "가뭄", "폭염", "동해", "냉해", "집중호우",
                "일조량", "저수율", "시설하우스", "화재예방", "월동관리",
            ]),
            pest: owned(&[
                "탄저병", "도열병", "흰가루병", "과수화상병", "진딧물", "응애", "총채벌레",
                "멸구", "구제역", "AI", "ASF",
            ]),
            admin: owned(&["PLS", "비료", "보급종", "재해보험", "시범사업", "농약"]),
        }
    }
}

/// One category's compiled matcher: an alternation over the multi-syllable
/// keywords plus a boundary-checked scan for the single-syllable ones.
struct CategoryMatcher {
    multi: Option<Regex>,
    single: Vec<char>,
}

impl CategoryMatcher {
    fn compile(keywords: &[String]) -> Self {
        let mut single = Vec::new();
        let mut multi = Vec::new();
        for keyword in keywords {
            let mut chars = keyword.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => single.push(c),
                (Some(_), Some(_)) => multi.push(regex::escape(keyword)),
                _ => {}
            }
        }
        // Longest alternative first so a prefix does not shadow a longer keyword.
        multi.sort_by(|a, b| b.len().cmp(&a.len()));
        let multi = if multi.is_empty() {
            None
        } else {
            Some(Regex::new(&multi.join("|")).expect("escaped keywords form a valid pattern"))
        };
        Self { multi, single }
    }

    fn matches(&self, text: &str) -> Vec<String> {
        let mut found = BTreeSet::new();

        if let Some(re) = &self.multi {
            for m in re.find_iter(text) {
                found.insert(m.as_str().to_string());
            }
        }

        if !self.single.is_empty() {
            let chars: Vec<char> = text.chars().collect();
            for (i, &c) in chars.iter().enumerate() {
                if !self.single.contains(&c) {
                    continue;
                }
                if i > 0 && is_hangul_syllable(chars[i - 1]) {
                    continue;
                }
                // One optional particle is consumed; whatever follows must not
                // be another syllable.
                let mut next = i + 1;
                if next < chars.len() && PARTICLES.contains(&chars[next]) {
                    next += 1;
                }
                if next < chars.len() && is_hangul_syllable(chars[next]) {
                    continue;
                }
                found.insert(c.to_string());
            }
        }

        // BTreeSet gives dedup plus lexicographic order
        found.into_iter().collect()
    }
}

/// All five category matchers, compiled once from a dictionary. Build once,
/// query many.
pub struct TagMatcher {
    crop: CategoryMatcher,
    task: CategoryMatcher,
    env: CategoryMatcher,
    pest: CategoryMatcher,
    admin: CategoryMatcher,
}

impl TagMatcher {
    pub fn new(dictionary: &TagDictionary) -> Self {
        Self {
            crop: CategoryMatcher::compile(&dictionary.crop),
            task: CategoryMatcher::compile(&dictionary.task),
            env: CategoryMatcher::compile(&dictionary.env),
            pest: CategoryMatcher::compile(&dictionary.pest),
            admin: CategoryMatcher::compile(&dictionary.admin),
        }
    }

    /// Extract every category's matched keywords from a text window.
    pub fn extract(&self, text: &str) -> TagSets {
        TagSets {
            crop: self.crop.matches(text),
            task: self.task.matches(text),
            env: self.env.matches(text),
            pest: self.pest.matches(text),
            admin: self.admin.matches(text),
        }
    }
}
