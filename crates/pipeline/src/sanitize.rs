//! Markup stripping.
//!
//! Turns a span of LaTeX-style markup into plain prose by applying an
//! ordered list of destructive rewrites. The order matters: block
//! environments go first so their internals never leak as stray text, and
//! unescaping runs after command stripping so escaped symbols are not
//! mistaken for commands.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Environments removed together with their content.
const BLOCK_ENVIRONMENTS: [&str; 6] = [
    "figure",
    "table",
    "tabular",
    "tabularx",
    "longtable",
    "wrapfigure",
];

static BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    BLOCK_ENVIRONMENTS
        .iter()
        .map(|env| {
            Regex::new(&format!(
                r"(?s)\\begin\{{{env}\*?\}}.*?\\end\{{{env}\*?\}}"
            ))
            .expect("block environment pattern is valid")
        })
        .collect()
});

static INCLUDE_GRAPHICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\includegraphics\*?(?:\[[^\]]*\])?\{[^}]*\}")
        .expect("includegraphics pattern is valid")
});

static REFERENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:ref|eqref|pageref|autoref|label|cite[a-zA-Z]*)\*?(?:\[[^\]]*\])?\{[^}]*\}")
        .expect("reference pattern is valid")
});

static NUMERIC_CITATIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d+(?:\s*[,，\-–]\s*\d+)*\]").expect("citation pattern is valid")
});

static IDENTIFIER_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[A-Za-z0-9_\-]+\}").expect("identifier pattern is valid"));

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\\(?:\[[^\]]*\])?").expect("line break pattern is valid"));

static ESCAPED_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[{}]").expect("escaped brace pattern is valid"));

static TWO_ARG_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\([A-Za-z]+)\*?(?:\[[^\]]*\])?\{([^{}]*)\}\{([^{}]*)\}")
        .expect("two-argument command pattern is valid")
});

static ONE_ARG_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\([A-Za-z]+)\*?(?:\[[^\]]*\])?\{([^{}]*)\}")
        .expect("one-argument command pattern is valid")
});

static BARE_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([A-Za-z]+)\*?").expect("bare command pattern is valid"));

static ESCAPES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(textasciitilde|textbackslash|[%$#_~^&])|&").expect("escape pattern is valid")
});

/// Strip markup from `text`, returning single-spaced plain prose.
///
/// Never fails; a rule whose pattern is absent is a no-op. Re-sanitizing
/// the output is a no-op, except where an unescaped `\textbackslash` lands
/// directly in front of another escape or command name.
pub fn sanitize(text: &str) -> String {
    let text = remove_blocks(text);
    let text = remove_references(&text);
    let text = IDENTIFIER_BRACES.replace_all(&text, "");
    let text = unwrap_commands(&text);
    let text = unescape(&text);
    collapse_whitespace(&text)
}

/// Rule 1: figures, tables and graphics, content included.
fn remove_blocks(text: &str) -> String {
    let mut out = INCLUDE_GRAPHICS.replace_all(text, "").into_owned();
    for block in BLOCKS.iter() {
        out = block.replace_all(&out, "").into_owned();
    }
    out
}

/// Rule 2: cross references, citations and `[n]` markers.
fn remove_references(text: &str) -> String {
    let text = REFERENCES.replace_all(text, "");
    NUMERIC_CITATIONS.replace_all(&text, "").into_owned()
}

/// Rule 4: commands are transparent wrappers, keep their arguments.
///
/// Nested wrappers are peeled innermost first until none remain.
fn unwrap_commands(text: &str) -> String {
    let out = LINE_BREAK.replace_all(text, " ");
    // Escaped braces go with the grouping braces below
    let mut out = ESCAPED_BRACES.replace_all(&out, "").into_owned();

    loop {
        let next = TWO_ARG_COMMAND
            .replace_all(&out, |caps: &Captures| {
                if is_escape_word(&caps[1]) {
                    caps[0].to_string()
                } else {
                    format!("{} {}", &caps[2], &caps[3])
                }
            })
            .into_owned();
        let next = ONE_ARG_COMMAND
            .replace_all(&next, |caps: &Captures| {
                if is_escape_word(&caps[1]) {
                    format!("\\{}", &caps[1])
                } else {
                    caps[2].to_string()
                }
            })
            .into_owned();
        if next == out {
            break;
        }
        out = next;
    }

    let out = BARE_COMMAND.replace_all(&out, |caps: &Captures| {
        if is_escape_word(&caps[1]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    // Leftover grouping braces such as `{\bf ...}`
    out.chars().filter(|c| *c != '{' && *c != '}').collect()
}

/// Rule 5: escaped literal symbols.
fn unescape(text: &str) -> String {
    ESCAPES
        .replace_all(text, |caps: &Captures| match caps.get(1).map(|m| m.as_str()) {
            Some("textasciitilde") => "~".to_string(),
            Some("textbackslash") => "\\".to_string(),
            Some("&") | None => " ".to_string(),
            Some(symbol) => symbol.to_string(),
        })
        .into_owned()
}

/// Rule 6.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_escape_word(name: &str) -> bool {
    matches!(name, "textasciitilde" | "textbackslash")
}
