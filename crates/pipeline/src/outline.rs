//! Outline recovery.
//!
//! Sanitizing a span erases the `\section{...}` markers inside it, so the
//! tree is built by recursive descent over borrowed raw slices: find the
//! markers of one level, slice each node's body, carve the children out of
//! that body, and only then sanitize what is left as the node's own text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sanitize::sanitize;
use crate::types::{DocumentNode, HierarchyLevel};

/// Marker head up to the opening brace of the title: optional star, an
/// optional short title, and whitespace anywhere between them
/// (`\section*  [short] {`). The title itself is read by [`closing_brace`]
/// so it may nest braces to any depth.
fn marker_pattern(command: &str) -> Regex {
    Regex::new(&format!(r"\\{command}\*?\s*(?:\[[^\]]*\]\s*)?\{{"))
        .expect("outline marker pattern is valid")
}

static CHAPTER_MARKER: Lazy<Regex> = Lazy::new(|| marker_pattern(HierarchyLevel::Chapter.marker()));
static SECTION_MARKER: Lazy<Regex> = Lazy::new(|| marker_pattern(HierarchyLevel::Section.marker()));
static SUBSECTION_MARKER: Lazy<Regex> =
    Lazy::new(|| marker_pattern(HierarchyLevel::Subsection.marker()));

fn marker_regex(level: HierarchyLevel) -> &'static Regex {
    match level {
        HierarchyLevel::Chapter => &CHAPTER_MARKER,
        HierarchyLevel::Section => &SECTION_MARKER,
        HierarchyLevel::Subsection => &SUBSECTION_MARKER,
    }
}

struct Marker<'a> {
    start: usize,
    end: usize,
    title: &'a str,
}

/// Recover the chapter → section → subsection tree of `document`.
///
/// Returns an empty outline when the document has no chapter marker; the
/// caller decides whether that is worth reporting. Text before the first
/// chapter marker (the preamble) belongs to no node.
pub fn extract_outline<'a>(document: &'a str, file_name: &str) -> Vec<DocumentNode<'a>> {
    let (_preamble, chapters) = carve(document, HierarchyLevel::Chapter);

    tracing::debug!(
        file = file_name,
        chapters = chapters.len(),
        nodes = chapters.iter().map(DocumentNode::node_count).sum::<usize>(),
        "Extracted outline"
    );

    chapters
}

/// Split `span` at the markers of `level`.
///
/// Returns the text preceding the first marker (the enclosing node's own
/// text) and one node per marker, in document order.
fn carve<'a>(span: &'a str, level: HierarchyLevel) -> (&'a str, Vec<DocumentNode<'a>>) {
    let markers = find_markers(span, level);

    let leading = &span[..markers.first().map_or(span.len(), |m| m.start)];

    let nodes = markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let body_end = markers.get(i + 1).map_or(span.len(), |next| next.start);
            build_node(marker.title, &span[marker.end..body_end], level)
        })
        .collect();

    (leading, nodes)
}

fn find_markers(span: &str, level: HierarchyLevel) -> Vec<Marker<'_>> {
    let mut markers: Vec<Marker<'_>> = Vec::new();

    for head in marker_regex(level).find_iter(span) {
        // A head inside the previous title is part of that title
        if markers.last().is_some_and(|last| head.start() < last.end) {
            continue;
        }
        let Some(close) = closing_brace(span, head.end()) else {
            continue;
        };
        let title = &span[head.end()..close];
        if title.trim().is_empty() {
            continue;
        }
        markers.push(Marker {
            start: head.start(),
            end: close + 1,
            title,
        });
    }

    markers
}

/// Byte offset of the `}` closing a group whose content starts at `from`.
///
/// Escaped braces (`\{`, `\}`) do not count. Returns `None` when the group
/// never closes.
fn closing_brace(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut chars = text[from..].char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset);
                }
            }
            _ => {}
        }
    }

    None
}

fn build_node<'a>(title: &str, body: &'a str, level: HierarchyLevel) -> DocumentNode<'a> {
    let (raw_span, children) = match level.child() {
        Some(child_level) => carve(body, child_level),
        None => (body, Vec::new()),
    };

    DocumentNode {
        title: sanitize(title),
        level,
        raw_span,
        sanitized_text: sanitize(raw_span),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r"\documentclass{book}
\begin{document}
\chapter{呼吸系统疾病}
本章介绍呼吸系统常见疾病。
\section{急性上呼吸道感染}
急性上呼吸道感染简称上感。
\subsection{临床表现}
以鼻咽部症状为主。\textbf{发热}常见。
\subsection{治疗}
以对症治疗为主。
\section{肺炎}
肺炎是指终末气道的炎症。
\chapter*{心力衰竭}
\section[短标题]{诊断与鉴别诊断}
根据症状和体征诊断。
\end{document}";

    #[test]
    fn test_outline_shape_matches_markers() {
        let outline = extract_outline(DOC, "doc.tex");
        assert_eq!(outline.len(), 2);

        let first = &outline[0];
        assert_eq!(first.title, "呼吸系统疾病");
        assert_eq!(first.level, HierarchyLevel::Chapter);
        assert_eq!(first.children.len(), 2);
        assert_eq!(first.children[0].title, "急性上呼吸道感染");
        assert_eq!(first.children[0].children.len(), 2);
        assert_eq!(first.children[0].children[1].title, "治疗");
        assert_eq!(
            first.children[0].children[1].level,
            HierarchyLevel::Subsection
        );
        assert!(first.children[1].children.is_empty());
        assert_eq!(first.node_count(), 5);
        assert_eq!(first.depth(), 3);

        let second = &outline[1];
        assert_eq!(second.title, "心力衰竭");
        assert_eq!(second.children.len(), 1);
        assert_eq!(second.children[0].title, "诊断与鉴别诊断");
    }

    #[test]
    fn test_own_text_excludes_descendants() {
        let outline = extract_outline(DOC, "doc.tex");
        let chapter = &outline[0];
        assert_eq!(chapter.sanitized_text, "本章介绍呼吸系统常见疾病。");

        let section = &chapter.children[0];
        assert_eq!(section.sanitized_text, "急性上呼吸道感染简称上感。");
        assert!(!section.sanitized_text.contains("鼻咽部"));

        let subsection = &section.children[0];
        assert_eq!(subsection.sanitized_text, "以鼻咽部症状为主。发热常见。");
    }

    #[test]
    fn test_raw_span_is_unsanitized() {
        let outline = extract_outline(DOC, "doc.tex");
        let subsection = &outline[0].children[0].children[0];
        assert!(subsection.raw_span.contains(r"\textbf{发热}"));
        // The last chapter's span runs to the end of the document
        assert!(outline[1].children[0].raw_span.contains(r"\end{document}"));
    }

    #[test]
    fn test_no_chapters_yields_empty_outline() {
        let doc = r"\section{孤立小节}没有章标记的文档。";
        assert!(extract_outline(doc, "loose.tex").is_empty());
        assert!(extract_outline("", "empty.tex").is_empty());
    }

    #[test]
    fn test_subsection_marker_is_not_a_section() {
        let doc = r"\chapter{章}\subsection{小节}正文";
        let outline = extract_outline(doc, "doc.tex");
        assert_eq!(outline.len(), 1);
        assert!(outline[0].children.is_empty());
        // Without an enclosing section the subsection stays in the chapter text
        assert_eq!(outline[0].sanitized_text, "小节正文");
    }

    #[test]
    fn test_title_with_nested_markup() {
        let doc = r"\chapter{\textbf{急性阑尾炎}}正文";
        let outline = extract_outline(doc, "doc.tex");
        assert_eq!(outline[0].title, "急性阑尾炎");
        assert_eq!(outline[0].sanitized_text, "正文");
    }

    #[test]
    fn test_deeply_nested_and_spaced_markers() {
        let doc = r"\chapter{呼吸系统疾病}本章正文内容。
\section{\textbf{\emph{诊断}}}诊断段落。
\section {治疗}治疗段落。
\subsection* [短] {药物}用药段落。";
        let outline = extract_outline(doc, "doc.tex");
        assert_eq!(outline.len(), 1);

        let chapter = &outline[0];
        assert_eq!(chapter.sanitized_text, "本章正文内容。");
        let titles: Vec<&str> = chapter.children.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["诊断", "治疗"]);
        assert_eq!(chapter.children[0].sanitized_text, "诊断段落。");
        assert_eq!(chapter.children[1].sanitized_text, "治疗段落。");
        assert_eq!(chapter.children[1].children[0].title, "药物");
        assert_eq!(chapter.depth(), 3);
    }

    #[test]
    fn test_unclosed_title_is_not_a_marker() {
        let doc = r"\chapter{章}正文。\section{未闭合 正文";
        let outline = extract_outline(doc, "doc.tex");
        assert_eq!(outline.len(), 1);
        assert!(outline[0].children.is_empty());
    }

    #[test]
    fn test_escaped_brace_inside_title() {
        let doc = r"\chapter{集合\}符号}正文";
        let outline = extract_outline(doc, "doc.tex");
        assert_eq!(outline[0].raw_span, "正文");
    }
}
