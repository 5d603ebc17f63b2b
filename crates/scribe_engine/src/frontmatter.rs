const DELIMITER: &str = "---";

/// The fixed metadata block prefixed to every Markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrontMatter {
    pub title: String,
    pub source_url: String,
    pub description: String,
    pub scraped_at: String,
}

impl FrontMatter {
    /// Render the block, including the blank line that separates it from
    /// the body. Field order is fixed; every value is double-quoted.
    pub fn render(&self) -> String {
        format!(
            "{DELIMITER}\ntitle: {title}\nsource_url: {source_url}\ndescription: {description}\nscraped_at: {scraped_at}\n{DELIMITER}\n\n",
            title = quote(&self.title),
            source_url = quote(&self.source_url),
            description = quote(&self.description),
            scraped_at = quote(&self.scraped_at),
        )
    }
}

/// Prefix `body` with the rendered front matter.
pub fn build_markdown_document(front_matter: &FrontMatter, body: &str) -> String {
    let mut doc = front_matter.render();
    doc.push_str(body);
    doc
}

/// Split a document into its front matter and body. Returns `None` when the
/// document does not start with a closed front-matter block.
pub fn parse_front_matter(markdown: &str) -> Option<(FrontMatter, &str)> {
    let rest = markdown.strip_prefix("---\n")?;
    let mut meta = FrontMatter::default();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let line = line.trim_end_matches('\n');
        if line == DELIMITER {
            let body = &rest[offset..];
            let body = body.strip_prefix('\n').unwrap_or(body);
            return Some((meta, body));
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim() {
            "title" => meta.title = value,
            "source_url" => meta.source_url = value,
            "description" => meta.description = value,
            "scraped_at" => meta.scraped_at = value,
            _ => {}
        }
    }
    None
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrontMatter {
        FrontMatter {
            title: "Guide (Section: Install)".to_string(),
            source_url: "https://example.com/guide#install".to_string(),
            description: "".to_string(),
            scraped_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn block_has_exact_shape() {
        assert_eq!(
            sample().render(),
            "---\ntitle: \"Guide (Section: Install)\"\nsource_url: \"https://example.com/guide#install\"\ndescription: \"\"\nscraped_at: \"2024-01-01T00:00:00Z\"\n---\n\n"
        );
    }

    #[test]
    fn round_trips_awkward_values() {
        let meta = FrontMatter {
            title: "Say \"hi\": a\\b\nnext".to_string(),
            description: "colons: everywhere --- even here".to_string(),
            ..sample()
        };
        let doc = build_markdown_document(&meta, "# Body\n\n---\n\nmore");
        let (parsed, body) = parse_front_matter(&doc).unwrap();
        assert_eq!(parsed, meta);
        assert_eq!(body, "# Body\n\n---\n\nmore");
    }

    #[test]
    fn empty_body_round_trips() {
        let doc = build_markdown_document(&sample(), "");
        let (parsed, body) = parse_front_matter(&doc).unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(body, "");
    }

    #[test]
    fn unterminated_block_is_rejected() {
        assert!(parse_front_matter("---\ntitle: \"x\"\nbody\n").is_none());
        assert!(parse_front_matter("no front matter").is_none());
    }
}
