//! Fragment to Markdown rendering.
//!
//! ATX headings, `*` bullets, fenced code blocks tagged by a pluggable
//! [`LanguageInference`]. Text is emitted verbatim (no Markdown escaping);
//! whitespace outside code blocks is collapsed the way a browser would.

use ego_tree::NodeRef;

use crate::dom::{find_descendant, heading_level, subtree_text, DomNode, Fragment, MarkupNode};

/// Class suffixes after `highlight-` that carry no language information.
const GENERIC_HIGHLIGHTS: &[&str] = &["default", "text"];

/// Decides the info string of a fenced code block.
pub trait LanguageInference: Send + Sync {
    /// `code` is the `<code>` element of a `<pre>` block, or the `<pre>`
    /// itself when it has no `<code>` child.
    fn infer(&self, code: NodeRef<'_, DomNode>) -> Option<String>;
}

/// Default inference, first hit wins:
/// 1. text starting with the `>>>` prompt is `python`;
/// 2. an ancestor class `highlight-<lang>`, unless `<lang>` is generic;
/// 3. the element's own `language-<lang>` class.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassHintInference;

impl LanguageInference for ClassHintInference {
    fn infer(&self, code: NodeRef<'_, DomNode>) -> Option<String> {
        if subtree_text(code).trim_start().starts_with(">>>") {
            return Some("python".to_string());
        }

        for ancestor in code.ancestors() {
            let Some(el) = ancestor.value().as_element() else {
                continue;
            };
            let hinted = el
                .classes()
                .into_iter()
                .filter_map(|class| class.strip_prefix("highlight-"))
                .map(str::trim)
                .find(|lang| !lang.is_empty() && !GENERIC_HIGHLIGHTS.contains(lang));
            if let Some(lang) = hinted {
                return Some(lang.to_string());
            }
        }

        code.value()
            .as_element()?
            .classes()
            .into_iter()
            .filter_map(|class| class.strip_prefix("language-"))
            .map(str::trim)
            .find(|lang| !lang.is_empty())
            .map(str::to_string)
    }
}

pub struct MarkdownRenderer {
    language: Box<dyn LanguageInference>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_language_inference(ClassHintInference)
    }

    pub fn with_language_inference(language: impl LanguageInference + 'static) -> Self {
        Self {
            language: Box::new(language),
        }
    }

    pub fn render(&self, fragment: &Fragment) -> String {
        let mut w = Writer::new(0);
        self.visit_node(fragment.root(), &mut w);
        normalize_output(&w.out)
    }

    fn visit_node(&self, node: NodeRef<'_, DomNode>, w: &mut Writer) {
        match node.value() {
            DomNode::Text(text) => w.push_text(text),
            DomNode::Element(el) => self.visit_element(node, el.name(), w),
        }
    }

    fn visit_children(&self, node: NodeRef<'_, DomNode>, w: &mut Writer) {
        for child in node.children() {
            self.visit_node(child, w);
        }
    }

    fn visit_element(&self, node: NodeRef<'_, DomNode>, tag: &str, w: &mut Writer) {
        if let Some(level) = heading_level(tag) {
            self.render_heading(node, level, w);
            return;
        }
        match tag {
            "ul" | "ol" => self.render_list(node, tag == "ol", w),
            "pre" => self.render_code_block(node, w),
            "code" | "kbd" | "samp" => render_inline_code(node, w),
            "a" => self.render_link(node, w),
            "img" => render_image(node, w),
            "strong" | "b" => self.render_emphasis(node, "**", w),
            "em" | "i" => self.render_emphasis(node, "*", w),
            "del" | "s" | "strike" => self.render_emphasis(node, "~~", w),
            "blockquote" => self.render_blockquote(node, w),
            "table" => self.render_table(node, w),
            "br" => w.push_raw("  \n"),
            "hr" => {
                w.ensure_blank_line();
                w.push_raw("---");
                w.ensure_blank_line();
            }
            "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav"
            | "aside" | "figure" | "figcaption" | "address" | "details" | "summary" | "dl"
            | "dt" | "dd" | "li" | "form" | "fieldset" | "body" | "html" => {
                w.ensure_blank_line();
                self.visit_children(node, w);
                w.ensure_blank_line();
            }
            "script" | "style" | "noscript" | "template" | "iframe" | "head" | "title"
            | "svg" | "canvas" | "object" | "embed" => {
                // not content
            }
            _ => self.visit_children(node, w),
        }
    }

    /// Render children into a fresh writer and return the trimmed result.
    fn render_inline(&self, node: NodeRef<'_, DomNode>, list_depth: usize) -> String {
        let mut inner = Writer::new(list_depth);
        self.visit_children(node, &mut inner);
        inner.out.trim().to_string()
    }

    fn render_heading(&self, node: NodeRef<'_, DomNode>, level: u8, w: &mut Writer) {
        let text = collapse_lines(&self.render_inline(node, w.list_depth));
        if text.is_empty() {
            return;
        }
        w.ensure_blank_line();
        w.push_raw(&"#".repeat(usize::from(level)));
        w.push_raw(" ");
        w.push_raw(&text);
        w.ensure_blank_line();
    }

    fn render_list(&self, list: NodeRef<'_, DomNode>, ordered: bool, w: &mut Writer) {
        let nested = w.list_depth > 0;
        if nested {
            w.ensure_newline();
        } else {
            w.ensure_blank_line();
        }

        let start: usize = list
            .value()
            .as_element()
            .and_then(|el| el.attr("start"))
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);

        let items = list.children().filter(|c| c.value().is_tag("li"));
        for (index, item) in items.enumerate() {
            let marker = if ordered {
                format!("{}. ", start.saturating_add(index))
            } else {
                "* ".to_string()
            };
            let indent = " ".repeat(marker.len());
            let body = self.render_inline(item, w.list_depth + 1);

            w.push_raw(marker.trim_end());
            for (line_no, line) in body.lines().enumerate() {
                if line_no == 0 {
                    w.push_raw(" ");
                    w.push_raw(line);
                } else {
                    w.push_raw("\n");
                    if !line.is_empty() {
                        w.push_raw(&indent);
                        w.push_raw(line);
                    }
                }
            }
            w.push_raw("\n");
        }

        if !nested {
            w.ensure_blank_line();
        }
    }

    fn render_code_block(&self, pre: NodeRef<'_, DomNode>, w: &mut Writer) {
        let code = find_descendant(pre, |n: &DomNode| n.is_tag("code")).unwrap_or(pre);
        let language = self.language.infer(code).unwrap_or_default();

        let raw = subtree_text(pre);
        let body = raw.strip_prefix('\n').unwrap_or(&raw).trim_end_matches(['\n', ' ', '\t']);
        let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);

        w.ensure_blank_line();
        w.push_raw(&fence);
        w.push_raw(&language);
        w.push_raw("\n");
        w.push_raw(body);
        w.push_raw("\n");
        w.push_raw(&fence);
        w.ensure_blank_line();
    }

    fn render_link(&self, node: NodeRef<'_, DomNode>, w: &mut Writer) {
        let text = collapse_lines(&self.render_inline(node, w.list_depth));
        if text.is_empty() {
            return;
        }
        let Some(el) = node.value().as_element() else {
            return;
        };
        let (leading, trailing) = edge_whitespace(node);
        if leading {
            w.push_text(" ");
        }
        match el.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
            Some(href) => {
                w.push_raw("[");
                w.push_raw(&text);
                w.push_raw("](");
                w.push_raw(&href.replace(' ', "%20"));
                if let Some(title) = el.attr("title").filter(|t| !t.trim().is_empty()) {
                    w.push_raw(" \"");
                    w.push_raw(&title.replace('"', "\\\""));
                    w.push_raw("\"");
                }
                w.push_raw(")");
            }
            None => w.push_raw(&text),
        }
        if trailing {
            w.push_text(" ");
        }
    }

    fn render_emphasis(&self, node: NodeRef<'_, DomNode>, marker: &str, w: &mut Writer) {
        let text = self.render_inline(node, w.list_depth);
        if text.is_empty() {
            return;
        }
        let (leading, trailing) = edge_whitespace(node);
        if leading {
            w.push_text(" ");
        }
        w.push_raw(marker);
        w.push_raw(&text);
        w.push_raw(marker);
        if trailing {
            w.push_text(" ");
        }
    }

    fn render_blockquote(&self, node: NodeRef<'_, DomNode>, w: &mut Writer) {
        let body = self.render_inline(node, 0);
        if body.is_empty() {
            return;
        }
        w.ensure_blank_line();
        for (line_no, line) in body.lines().enumerate() {
            if line_no > 0 {
                w.push_raw("\n");
            }
            if line.is_empty() {
                w.push_raw(">");
            } else {
                w.push_raw("> ");
                w.push_raw(line);
            }
        }
        w.ensure_blank_line();
    }

    fn render_table(&self, table: NodeRef<'_, DomNode>, w: &mut Writer) {
        let rows: Vec<Vec<String>> = table
            .descendants()
            .filter(|n| n.value().is_tag("tr"))
            .map(|tr| {
                tr.children()
                    .filter(|c| c.value().is_tag("td") || c.value().is_tag("th"))
                    .map(|cell| {
                        collapse_lines(&self.render_inline(cell, 0)).replace('|', "\\|")
                    })
                    .collect()
            })
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        w.ensure_blank_line();
        for (row_no, row) in rows.iter().enumerate() {
            let mut cells = row.clone();
            cells.resize(columns, String::new());
            w.push_raw("| ");
            w.push_raw(&cells.join(" | "));
            w.push_raw(" |\n");
            if row_no == 0 {
                w.push_raw("|");
                w.push_raw(&" --- |".repeat(columns));
                w.push_raw("\n");
            }
        }
        w.ensure_blank_line();
    }
}

fn render_inline_code(node: NodeRef<'_, DomNode>, w: &mut Writer) {
    let text = subtree_text(node);
    let text = collapse_lines(&text);
    if text.is_empty() {
        return;
    }
    let ticks = "`".repeat(longest_backtick_run(&text) + 1);
    let pad = if text.starts_with('`') || text.ends_with('`') {
        " "
    } else {
        ""
    };
    w.push_raw(&ticks);
    w.push_raw(pad);
    w.push_raw(&text);
    w.push_raw(pad);
    w.push_raw(&ticks);
}

fn render_image(node: NodeRef<'_, DomNode>, w: &mut Writer) {
    let Some(el) = node.value().as_element() else {
        return;
    };
    let Some(src) = el.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
        return;
    };
    let alt = collapse_lines(el.attr("alt").unwrap_or_default());
    w.push_raw("![");
    w.push_raw(&alt);
    w.push_raw("](");
    w.push_raw(&src.replace(' ', "%20"));
    w.push_raw(")");
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Whether the text under `node` starts and ends with whitespace. Inline
/// markers go inside that whitespace, never around it.
fn edge_whitespace(node: NodeRef<'_, DomNode>) -> (bool, bool) {
    let text = subtree_text(node);
    (
        text.starts_with(char::is_whitespace),
        text.ends_with(char::is_whitespace),
    )
}

/// Length of the backtick run opening `line`, when it is long enough to be
/// a code fence.
fn fence_len(line: &str) -> Option<usize> {
    let run = line.trim_start().chars().take_while(|c| *c == '`').count();
    (run >= 3).then_some(run)
}

fn collapse_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse blank-line runs and strip trailing spaces outside code fences
/// (hard breaks excepted), then trim the whole document.
fn normalize_output(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut open_fence: Option<usize> = None;
    let mut blank_run = 0;
    for line in raw.lines() {
        let fence = fence_len(line);
        if let Some(open) = open_fence {
            lines.push(line);
            let closes = fence.is_some_and(|len| len >= open)
                && line.trim().chars().all(|c| c == '`');
            if closes {
                open_fence = None;
            }
            continue;
        }
        if let Some(len) = fence {
            open_fence = Some(len);
            blank_run = 0;
            lines.push(line.trim_end());
            continue;
        }
        let kept = if line.ends_with("  ") && !line.trim().is_empty() {
            line
        } else {
            line.trim_end()
        };
        if kept.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(kept);
    }
    let joined = lines.join("\n");
    let trimmed = joined.trim_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Output buffer with whitespace collapsing and block separation.
struct Writer {
    out: String,
    list_depth: usize,
}

impl Writer {
    fn new(list_depth: usize) -> Self {
        Self {
            out: String::new(),
            list_depth,
        }
    }

    fn last_char(&self) -> Option<char> {
        self.out.chars().next_back()
    }

    /// Append document text: whitespace collapsed, and the characters that
    /// would otherwise turn into emphasis or a heading escaped.
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char(), None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.out.push(' ');
                continue;
            }
            let line_start = matches!(self.last_char(), None | Some('\n'));
            if ch == '*' || ch == '_' || (ch == '#' && line_start) {
                self.out.push('\\');
            }
            self.out.push(ch);
        }
    }

    fn push_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn ensure_newline(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() || self.out.ends_with('\n') {
            return;
        }
        self.out.push('\n');
    }

    fn ensure_blank_line(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let kept = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(kept);
    }
}
