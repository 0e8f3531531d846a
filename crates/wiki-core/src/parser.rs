//! ATX heading scanner.
//!
//! Finds every `#`-style heading in a markdown document and computes the byte
//! range of the section it introduces. A section ends at the next heading of
//! the same or a shallower level; deeper headings nest inside it. The scan is
//! a single forward pass with two anchored searches per heading and keeps no
//! stack.
//!
//! Only heading lines are recognised. Code fences, setext headings and HTML
//! blocks are not interpreted, so a `# ` line inside a fenced block counts as
//! a heading like any other.

use crate::{DocumentId, HeadingSection};
use once_cell::sync::Lazy;
use regex::Regex;

/// Deepest heading level with its own termination pattern.
pub const MAX_HEADING_LEVEL: usize = 6;

#[allow(clippy::expect_used)]
static HEADING_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#+ ").expect("valid heading regex"));

// SECTION_END[n - 1] matches a heading of level 1..=n at a line start.
#[allow(clippy::expect_used)]
static SECTION_END: Lazy<Vec<Regex>> = Lazy::new(|| {
    (1..=MAX_HEADING_LEVEL)
        .map(|level| {
            Regex::new(&format!("(?m)^#{{1,{level}}} ")).expect("valid section regex")
        })
        .collect()
});

/// Scan `text` for headings and return their sections in document order.
///
/// Offsets are byte offsets into `text`. Heading text runs from just past the
/// marker and its space up to the next line break; a trailing `\r` is not
/// part of it. Empty headings (`# ` followed by a newline) produce an empty
/// text and are still returned.
///
/// ```rust
/// use wiki_core::{DocumentId, scan_headings};
///
/// let id: DocumentId = "a/foo".parse()?;
/// let text = "# Intro\nHello world\n## Details\nMore.\n";
/// let sections = scan_headings(&id, text);
///
/// assert_eq!(sections.len(), 2);
/// assert_eq!(sections[0].text, "Intro");
/// assert_eq!((sections[0].start, sections[0].end), (0, text.len()));
/// assert_eq!(sections[1].text, "Details");
/// # Ok::<(), wiki_core::Error>(())
/// ```
#[must_use]
pub fn scan_headings(document: &DocumentId, text: &str) -> Vec<HeadingSection> {
    let mut sections = Vec::new();
    let mut cursor = 0;

    while let Some(found) = HEADING_START.find_at(text, cursor) {
        let start = found.start();
        // The match is the `#` run plus exactly one space.
        let marker_end = found.end() - 1;
        let level = (marker_end - start).min(MAX_HEADING_LEVEL);

        let text_start = found.end();
        let text_end = text[text_start..]
            .find('\n')
            .map_or(text.len(), |offset| text_start + offset);
        let raw = &text[text_start..text_end];
        let heading = raw.strip_suffix('\r').unwrap_or(raw);

        let end = SECTION_END[level - 1]
            .find_at(text, marker_end)
            .map_or(text.len(), |m| m.start());

        sections.push(HeadingSection {
            document: document.clone(),
            level,
            start,
            end,
            text: heading.to_string(),
        });

        cursor = marker_end;
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc() -> DocumentId {
        DocumentId::new("a", "foo").expect("valid id")
    }

    fn summary(text: &str) -> Vec<(String, usize, usize, usize)> {
        scan_headings(&doc(), text)
            .into_iter()
            .map(|s| (s.text, s.level, s.start, s.end))
            .collect()
    }

    #[test]
    fn test_no_headings() {
        assert!(scan_headings(&doc(), "").is_empty());
        assert!(scan_headings(&doc(), "just text\nmore text\n").is_empty());
        // Not at a line start, or missing the space
        assert!(scan_headings(&doc(), "see #1 and # not\n#nospace\n").is_empty());
    }

    #[test]
    fn test_deeper_heading_does_not_close_section() {
        let text = "# Intro\nHello world\n## Details\nMore.\n";
        let details_start = text.find("## Details").expect("present");
        assert_eq!(
            summary(text),
            vec![
                ("Intro".to_string(), 1, 0, text.len()),
                ("Details".to_string(), 2, details_start, text.len()),
            ]
        );
    }

    #[test]
    fn test_same_and_shallower_levels_close_section() {
        let text = "## A\na\n### A1\nx\n## B\nb\n# Top\nt\n";
        let b = text.find("## B").expect("present");
        let top = text.find("# Top").expect("present");
        let a1 = text.find("### A1").expect("present");

        assert_eq!(
            summary(text),
            vec![
                ("A".to_string(), 2, 0, b),
                ("A1".to_string(), 3, a1, b),
                ("B".to_string(), 2, b, top),
                ("Top".to_string(), 1, top, text.len()),
            ]
        );
    }

    #[test]
    fn test_heading_at_end_of_document() {
        let text = "body\n# End";
        let sections = scan_headings(&doc(), text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "End");
        assert_eq!(sections[0].start, 5);
        assert_eq!(sections[0].end, text.len());
    }

    #[test]
    fn test_empty_heading_text_is_kept() {
        let text = "# \nbody\n";
        let sections = scan_headings(&doc(), text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "");
        assert_eq!(sections[0].end, text.len());
    }

    #[test]
    fn test_heading_text_whitespace_preserved() {
        let sections = scan_headings(&doc(), "#  Padded Title  \n");
        assert_eq!(sections[0].text, " Padded Title  ");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "# One\r\nbody\r\n# Two\r\n";
        let sections = scan_headings(&doc(), text);
        assert_eq!(sections[0].text, "One");
        assert_eq!(sections[1].text, "Two");
        assert_eq!(sections[0].end, text.find("# Two").expect("present"));
    }

    #[test]
    fn test_levels_beyond_six_clamp() {
        let text = "######## Deep\nx\n###### Six\ny\n";
        let six = text.find("###### Six").expect("present");
        let sections = scan_headings(&doc(), text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, 6);
        assert_eq!(sections[0].end, six);
        assert_eq!(sections[1].level, 6);
    }

    #[test]
    fn test_multibyte_offsets_slice_cleanly() {
        let text = "# Café\nnaïve ☕\n# Über\nß\n";
        for section in scan_headings(&doc(), text) {
            assert!(text.is_char_boundary(section.start));
            assert!(text.is_char_boundary(section.end));
            assert!(text[section.start..section.end].starts_with('#'));
        }
    }

    // Straightforward line-by-line reference for the termination rule.
    fn reference_sections(text: &str) -> Vec<(usize, usize, usize)> {
        let mut lines = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let hashes = line.bytes().take_while(|b| *b == b'#').count();
            if hashes > 0 && line.as_bytes().get(hashes) == Some(&b' ') {
                lines.push((offset, hashes));
            }
            offset += line.len();
        }

        lines
            .iter()
            .enumerate()
            .map(|(i, &(start, hashes))| {
                let level = hashes.min(MAX_HEADING_LEVEL);
                let end = lines[i + 1..]
                    .iter()
                    .find(|&&(_, h)| h <= level)
                    .map_or(text.len(), |&(s, _)| s);
                (start, level, end)
            })
            .collect()
    }

    fn markdown_line() -> impl Strategy<Value = String> {
        prop_oneof![
            (1usize..=8, "[a-zA-Z ]{0,12}").prop_map(|(n, t)| format!("{} {t}", "#".repeat(n))),
            "[a-z #]{0,20}",
            Just(String::new()),
        ]
    }

    proptest! {
        #[test]
        fn test_matches_reference_termination(lines in prop::collection::vec(markdown_line(), 0..30)) {
            let text = lines.join("\n");
            let got: Vec<_> = scan_headings(&doc(), &text)
                .into_iter()
                .map(|s| (s.start, s.level, s.end))
                .collect();
            prop_assert_eq!(got, reference_sections(&text));
        }

        #[test]
        fn test_plain_text_has_no_sections(text in "[a-zA-Z0-9 .,\n]{0,400}") {
            prop_assert!(scan_headings(&doc(), &text).is_empty());
        }

        #[test]
        fn test_ranges_are_valid(lines in prop::collection::vec(markdown_line(), 0..30)) {
            let text = lines.join("\n");
            for section in scan_headings(&doc(), &text) {
                prop_assert!(section.start <= section.end);
                prop_assert!(section.end <= text.len());
                prop_assert!((1..=MAX_HEADING_LEVEL).contains(&section.level));
            }
        }
    }
}
