//! Minimal Markdown builder.

/// Appends Markdown blocks to an in-memory buffer.
#[derive(Debug, Default)]
pub struct MarkdownWriter {
    out: String,
}

impl MarkdownWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn h1(&mut self, title: &str) -> &mut Self {
        self.heading(1, title)
    }

    pub fn h2(&mut self, title: &str) -> &mut Self {
        self.heading(2, title)
    }

    pub fn h3(&mut self, title: &str) -> &mut Self {
        self.heading(3, title)
    }

    fn heading(&mut self, depth: usize, title: &str) -> &mut Self {
        self.out.push_str(&"#".repeat(depth));
        self.out.push(' ');
        self.out.push_str(title);
        self.out.push_str("\n\n");
        self
    }

    pub fn quote(&mut self, text: &str) -> &mut Self {
        self.out.push_str("> ");
        self.line(text)
    }

    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> &mut Self {
        self.table_row(headers.iter().copied());
        self.table_row(headers.iter().map(|_| "--"));
        for row in rows {
            self.table_row(row.iter().map(String::as_str));
        }
        self.newline()
    }

    fn table_row<'a>(&mut self, cells: impl Iterator<Item = &'a str>) {
        self.out.push('|');
        for cell in cells {
            self.out.push(' ');
            self.out.push_str(cell);
            self.out.push_str(" |");
        }
        self.out.push('\n');
    }

    pub fn list<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        for item in items {
            self.out.push_str("- ");
            self.line(item.as_ref());
        }
        self
    }

    pub fn code_fence(&mut self) -> &mut Self {
        self.line("```")
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self.out.push('\n');
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// HTML comment, hidden when rendered.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.out.push_str("<!---");
        self.out.push_str(text);
        self.line("--->")
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Inline code span.
pub fn code(text: &str) -> String {
    format!("`{}`", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_are_followed_by_blank_line() {
        let mut md = MarkdownWriter::new();
        md.h1("Title").h3("Sub");
        assert_eq!(md.finish(), "# Title\n\n### Sub\n\n");
    }

    #[test]
    fn table_renders_header_separator_and_rows() {
        let mut md = MarkdownWriter::new();
        md.table(
            &["Resource URI", "Kind"],
            &[vec![code("image:v1"), "docker".to_string()]],
        );
        assert_eq!(
            md.finish(),
            "| Resource URI | Kind |\n| -- | -- |\n| `image:v1` | docker |\n\n"
        );
    }

    #[test]
    fn comment_is_hidden_markup() {
        let mut md = MarkdownWriter::new();
        md.comment("marker");
        assert_eq!(md.finish(), "<!---marker--->\n");
    }

    #[test]
    fn list_and_fence() {
        let mut md = MarkdownWriter::new();
        md.list(&["a", "b"]).code_fence().line("x").code_fence();
        assert_eq!(md.finish(), "- a\n- b\n```\nx\n```\n");
    }
}
