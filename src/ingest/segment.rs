//! Document segmentation.
//!
//! Splits a raw bulletin into dated sections. A section starts at a line of
//! the form `# [YYYY-MM...`; whatever precedes the first such line is a
//! preamble that carries no date and is dropped. Table-of-contents sections
//! and sections without a parseable date are skipped, not errors — the source
//! documents are free-form exports and malformed sections are expected.

use regex::Regex;

/// A dated section cut out of the source document. Header and body are kept
/// raw; normalization happens later and only for the embedding input.
#[derive(Debug, Clone)]
pub struct RawSection {
    pub header: String,
    pub body: String,
    pub year: i32,
    pub month: u32,
}

/// Result of segmenting one document.
#[derive(Debug, Default)]
pub struct Segmented {
    pub sections: Vec<RawSection>,
    /// Chunks dropped as preamble, table of contents, or malformed.
    pub skipped: usize,
}

pub struct Segmenter {
    header_re: Regex,
    date_re: Regex,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            header_re: Regex::new(r"(?m)^#[ \t]*\[").expect("valid pattern"),
            date_re: Regex::new(r"\[(\d{4})-(\d{2})").expect("valid pattern"),
        }
    }

    /// Split a document into dated sections.
    pub fn segment(&self, document: &str) -> Segmented {
        let mut starts: Vec<usize> = self
            .header_re
            .find_iter(document)
            .map(|m| m.start())
            .collect();
        if starts.first() != Some(&0) {
            starts.insert(0, 0);
        }
        starts.push(document.len());

        let mut out = Segmented::default();
        for window in starts.windows(2) {
            let chunk = &document[window[0]..window[1]];
            if chunk.trim().is_empty() {
                continue;
            }
            match self.parse_section(chunk) {
                Some(section) => out.sections.push(section),
                None => out.skipped += 1,
            }
        }

        tracing::debug!(
            sections = out.sections.len(),
            skipped = out.skipped,
            "document segmented"
        );
        out
    }

    /// Parse one chunk into a section, or `None` if it should be skipped.
    fn parse_section(&self, chunk: &str) -> Option<RawSection> {
        let chunk = chunk.trim();
        let (header, body) = chunk.split_once('\n').unwrap_or((chunk, ""));

        let header = header.trim_end();
        let header = if header.starts_with('#') {
            header.to_string()
        } else {
            format!("# {header}")
        };

        // Table of contents carries the date pattern but is not a record.
        if header.contains("목차") || header.contains("목 차") {
            return None;
        }

        let caps = self.date_re.captures(&header)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        if !(1..=12).contains(&month) {
            tracing::warn!(year, month, "month out of range, skipping section");
            return None;
        }

        Some(RawSection {
            header,
            body: body.to_string(),
            year,
            month,
        })
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
서문입니다. 날짜가 없는 안내문.

# [목차]
- 5월
- 6월

# [2024-05-3주차] 벼 이앙 시기
못자리 관리와 이앙 준비 요령.
물 관리에 유의.

# [2024-06-1주차] 고추 탄저병 방제
고추 탄저병 방제 적기.
";

    #[test]
    fn splits_dated_sections_and_drops_preamble_and_toc() {
        let segmented = Segmenter::new().segment(DOC);
        assert_eq!(segmented.sections.len(), 2);
        // preamble + 목차
        assert_eq!(segmented.skipped, 2);

        let first = &segmented.sections[0];
        assert_eq!(first.year, 2024);
        assert_eq!(first.month, 5);
        assert_eq!(first.header, "# [2024-05-3주차] 벼 이앙 시기");
        assert!(first.body.contains("못자리"));
        assert!(first.body.contains("물 관리"));

        let second = &segmented.sections[1];
        assert_eq!((second.year, second.month), (2024, 6));
        assert!(second.header.contains("탄저병"));
    }

    #[test]
    fn document_starting_with_header_has_no_preamble() {
        let doc = "# [2023-11-2주차] 마늘 월동 준비\n본문.";
        let segmented = Segmenter::new().segment(doc);
        assert_eq!(segmented.sections.len(), 1);
        assert_eq!(segmented.skipped, 0);
    }

    #[test]
    fn undated_section_is_skipped() {
        let doc = "# [부록] 연락처 안내\n내용\n\n# [2024-01-1주차] 월동 관리\n본문";
        let segmented = Segmenter::new().segment(doc);
        assert_eq!(segmented.sections.len(), 1);
        assert_eq!(segmented.sections[0].month, 1);
        assert_eq!(segmented.skipped, 1);
    }

    #[test]
    fn out_of_range_month_is_skipped() {
        let doc = "# [2024-13-1주차] 잘못된 달\n본문\n\n# [2024-00] 영월\n본문";
        let segmented = Segmenter::new().segment(doc);
        assert!(segmented.sections.is_empty());
        assert_eq!(segmented.skipped, 2);
    }

    #[test]
    fn spaced_toc_marker_is_skipped() {
        let doc = "# [2024년 목 차]\n- 항목\n\n# [2024-03-1주차] 봄감자\n본문";
        let segmented = Segmenter::new().segment(doc);
        assert_eq!(segmented.sections.len(), 1);
    }

    #[test]
    fn header_only_section_has_empty_body() {
        let doc = "# [2024-07-2주차] 장마 대비";
        let segmented = Segmenter::new().segment(doc);
        assert_eq!(segmented.sections.len(), 1);
        assert_eq!(segmented.sections[0].body, "");
    }

    #[test]
    fn segmentation_is_deterministic() {
        let a = Segmenter::new().segment(DOC);
        let b = Segmenter::new().segment(DOC);
        let headers_a: Vec<&str> = a.sections.iter().map(|s| s.header.as_str()).collect();
        let headers_b: Vec<&str> = b.sections.iter().map(|s| s.header.as_str()).collect();
        assert_eq!(headers_a, headers_b);
    }
}
