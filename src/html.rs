//! HTML document sink: the artifact writer the crate ships with.
//!
//! Rendering a binary word-processor format is out of scope; the standard
//! artifact is a self-contained HTML file whose stylesheet reproduces the
//! classic technical-spec look — blue underlined 14pt section headings,
//! bold 12pt sub-headings, Courier 10pt code blocks, grid-bordered tables.
//! All content passes through [`html_escape`] so source snippets containing
//! `<`, `>`, or `&` render verbatim.

use crate::sink::{DocumentSink, Span};
use html_escape::encode_text;
use std::convert::Infallible;

const STYLE: &str = r#"body { font-family: Calibri, Arial, sans-serif; font-size: 11pt; margin: 2em auto; max-width: 50em; }
h1 { font-size: 16pt; }
h2 { color: #0000ff; text-decoration: underline; font-size: 14pt; font-weight: bold; margin-bottom: 0.3em; }
h3 { font-size: 12pt; font-weight: bold; margin-bottom: 0.2em; }
p { margin: 0.4em 0; }
pre { font-family: "Courier New", monospace; font-size: 10pt; background: #f5f5f5; padding: 0.6em; overflow-x: auto; }
table { border-collapse: collapse; margin: 0.6em 0; }
th, td { border: 1px solid #444; padding: 2px 10px; text-align: left; }
th { background: #eee; }"#;

/// A [`DocumentSink`] that accumulates a styled, self-contained HTML page.
///
/// Build it (optionally with a custom document title), let the parser drive
/// it, then call [`finish`](Self::finish) for the complete page. Writing to
/// an in-memory buffer cannot fail, so `Error = Infallible`.
#[derive(Debug, Clone)]
pub struct HtmlSink {
    title: String,
    body: String,
}

impl HtmlSink {
    /// Sink with the default document title.
    pub fn new() -> Self {
        Self::with_title("TECHNICAL SPECIFICATION")
    }

    /// Sink with a caller-chosen document title (the `<h1>` and `<title>`).
    pub fn with_title(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: String::new(),
        }
    }

    /// Close the document and return the full HTML page.
    pub fn finish(self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n\
             <body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
            title = encode_text(&self.title),
            body = self.body,
        )
    }
}

impl Default for HtmlSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink for HtmlSink {
    type Error = Infallible;

    fn heading(&mut self, text: &str) -> Result<(), Self::Error> {
        self.body
            .push_str(&format!("<h2>{}</h2>\n", encode_text(text)));
        Ok(())
    }

    fn subheading(&mut self, text: &str) -> Result<(), Self::Error> {
        self.body
            .push_str(&format!("<h3>{}</h3>\n", encode_text(text)));
        Ok(())
    }

    fn paragraph(&mut self, spans: &[Span]) -> Result<(), Self::Error> {
        self.body.push_str("<p>");
        for span in spans {
            if span.bold {
                self.body
                    .push_str(&format!("<strong>{}</strong>", encode_text(&span.text)));
            } else {
                self.body.push_str(&encode_text(&span.text));
            }
        }
        self.body.push_str("</p>\n");
        Ok(())
    }

    fn code_block(&mut self, lines: &[String]) -> Result<(), Self::Error> {
        self.body.push_str("<pre><code>");
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.body.push('\n');
            }
            self.body.push_str(&encode_text(line));
        }
        self.body.push_str("</code></pre>\n");
        Ok(())
    }

    fn table(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<(), Self::Error> {
        self.body.push_str("<table>\n<thead>\n<tr>");
        for h in headers {
            self.body.push_str(&format!("<th>{}</th>", encode_text(h)));
        }
        self.body.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in rows {
            self.body.push_str("<tr>");
            for cell in row {
                self.body
                    .push_str(&format!("<td>{}</td>", encode_text(cell)));
            }
            self.body.push_str("</tr>\n");
        }
        self.body.push_str("</tbody>\n</table>\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_wraps_a_complete_page() {
        let sink = HtmlSink::with_title("My Spec");
        let html = sink.finish();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Spec</title>"));
        assert!(html.contains("<h1>My Spec</h1>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn content_is_escaped() {
        let mut sink = HtmlSink::new();
        sink.code_block(&["if a < b && c > d {".to_string()]).unwrap();
        let html = sink.finish();
        assert!(html.contains("a &lt; b &amp;&amp; c &gt; d"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn bold_spans_render_as_strong() {
        let mut sink = HtmlSink::new();
        sink.paragraph(&[Span::plain("a "), Span::bold("b"), Span::plain(" c")])
            .unwrap();
        let html = sink.finish();
        assert!(html.contains("<p>a <strong>b</strong> c</p>"));
    }

    #[test]
    fn table_renders_header_and_data_cells() {
        let mut sink = HtmlSink::new();
        sink.table(
            &["Name".to_string(), "Type".to_string()],
            &[vec!["id".to_string(), "int".to_string()]],
        )
        .unwrap();
        let html = sink.finish();
        assert!(html.contains("<th>Name</th><th>Type</th>"));
        assert!(html.contains("<td>id</td><td>int</td>"));
    }

    #[test]
    fn code_lines_join_with_newlines() {
        let mut sink = HtmlSink::new();
        sink.code_block(&["line1".to_string(), "line2".to_string()])
            .unwrap();
        let html = sink.finish();
        assert!(html.contains("<pre><code>line1\nline2</code></pre>"));
    }
}
