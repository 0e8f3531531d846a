//! Markdown to HTML rendering.
//!
//! Thin adapter over pulldown-cmark. The header engine never looks at the
//! HTML; it only hands over cross-linked markdown.
//!
//! Two passes sit between the parser and the HTML writer: fenced code is
//! highlighted with syntect into classed spans styled by [`CODE_THEME`], and
//! `$...$` / `$$...$$` math is converted to MathML.

use html_escape::{encode_double_quoted_attribute, encode_text};
use latex2mathml::{DisplayStyle, latex_to_mathml};
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::warn;

/// Title used when neither a forced title nor a level-one heading exists.
pub const FALLBACK_TITLE: &str = "No Title :(";

#[allow(clippy::expect_used)]
static TITLE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*)\]\(.*\)").expect("valid title link regex"));

const ALERT_COLORS: [(&str, &str); 5] = [
    ("note", "#1f6feb"),
    ("tip", "#3fb950"),
    ("important", "#a371f7"),
    ("warning", "#d29922"),
    ("caution", "#f85149"),
];

/// Syntect theme whose CSS is embedded in every page.
pub const CODE_THEME: &str = "base16-ocean.dark";

const CODE_CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

const BASE_STYLE: &str = r#"
math:not([display="block"]), .math-inline { font-size: 20px; }
math[display="block"], .math-display { font-size: 24px; }
p { font-size: 18px; }
pre { width: max-content; padding: 10px; }
a { color: white; }
body { background-color: #111; color: white; font-family: sans-serif; }
nav a, a[href^="/edit/"], a[href^="/confirm_delete/"] { text-decoration: none; margin-right: 10px; }
textarea { width: 100%; min-height: 60vh; background-color: #222; color: white; }
input, button { background-color: #222; color: white; }
"#;

static STYLE: Lazy<String> = Lazy::new(|| {
    let mut css = String::new();
    for (name, color) in ALERT_COLORS {
        css.push_str(&format!(
            ".markdown-alert-{name} {{ border-left: 2px solid {color}; padding-left: 10px; }}\n"
        ));
    }
    css.push_str(&code_theme_css());
    css.push_str(BASE_STYLE.trim());
    css
});

fn code_theme_css() -> String {
    let themes = ThemeSet::load_defaults();
    let Some(theme) = themes.themes.get(CODE_THEME) else {
        warn!("Highlight theme {CODE_THEME} is not bundled");
        return String::new();
    };
    match css_for_theme_with_class_style(theme, CODE_CLASS_STYLE) {
        Ok(css) => css,
        Err(e) => {
            warn!("Failed to build CSS for highlight theme {CODE_THEME}: {e}");
            String::new()
        },
    }
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
        | Options::ENABLE_GFM
}

/// Render markdown to an HTML fragment.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let mut events = Vec::new();
    // Language and collected text of the fenced block being read.
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code = Some((code_language(&kind), String::new()));
            },
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, text)) = code.take() {
                    let block = highlight_code(&text, language.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                }
            },
            Event::Text(text) => match code.as_mut() {
                Some((_, buf)) => buf.push_str(&text),
                None => events.push(Event::Text(text)),
            },
            Event::InlineMath(tex) => {
                events.push(Event::InlineHtml(CowStr::from(math_html(&tex, false))));
            },
            Event::DisplayMath(tex) => {
                events.push(Event::InlineHtml(CowStr::from(math_html(&tex, true))));
            },
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn code_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

/// Highlight one code block. Unknown languages fall back to plain text.
fn highlight_code(code: &str, language: Option<&str>) -> String {
    let syntax = language
        .and_then(|token| SYNTAXES.find_syntax_by_token(token))
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
    let class = language.map_or_else(String::new, |token| {
        format!(" class=\"language-{}\"", encode_double_quoted_attribute(token))
    });

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, CODE_CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            warn!("Highlighting failed, rendering code as plain text: {e}");
            return code_block(&class, &encode_text(code));
        }
    }
    code_block(&class, &generator.finalize())
}

fn code_block(class: &str, inner: &str) -> String {
    format!("<pre class=\"hl-code\"><code{class}>{inner}</code></pre>\n")
}

/// MathML for a TeX fragment. Unparseable TeX is shown escaped.
fn math_html(tex: &str, display: bool) -> String {
    let style = if display {
        DisplayStyle::Block
    } else {
        DisplayStyle::Inline
    };
    match latex_to_mathml(tex, style) {
        Ok(mathml) => mathml,
        Err(e) => {
            warn!("Failed to convert math {tex:?}: {e}");
            let class = if display { "math-display" } else { "math-inline" };
            format!("<span class=\"math {class}\">{}</span>", encode_text(tex))
        },
    }
}

/// Title of a document: its first line when that line is a level-one
/// heading, with a markdown link reduced to its label.
#[must_use]
pub fn document_title(markdown: &str) -> Option<String> {
    let line = markdown.lines().next()?.strip_prefix("# ")?;
    let title = TITLE_LINK
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map_or(line, |label| label.as_str());
    Some(title.to_string())
}

/// Wrap an HTML fragment into a complete page.
#[must_use]
pub fn page(title: &str, body_html: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head>\
         <meta charset=\"UTF-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
         <title>{}</title><style>\n{}\n</style></head>\
         <body>{body_html}</body></html>",
        encode_text(title),
        STYLE.as_str(),
    )
}

/// Page title for `markdown`: `forced_title` if given, else
/// [`document_title`], else [`FALLBACK_TITLE`].
#[must_use]
pub fn page_title(markdown: &str, forced_title: Option<&str>) -> String {
    forced_title
        .map(str::to_string)
        .or_else(|| document_title(markdown))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Render markdown to a complete page titled by [`page_title`].
#[must_use]
pub fn to_html(markdown: &str, forced_title: Option<&str>) -> String {
    page(&page_title(markdown, forced_title), &markdown_to_html(markdown))
}
