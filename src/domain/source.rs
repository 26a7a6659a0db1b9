// A parsed source file together with the positional data needed to splice
// new text into it without disturbing the untouched bytes.

use proc_macro2::LineColumn;
use std::path::PathBuf;

/// Source text, its syntax tree and a map from span positions to byte offsets.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub text: String,
    pub tree: syn::File,
    pub map: SourceMap,
}

impl LoadedSource {
    /// Parse `text`; parse failures are reported against `path`.
    pub fn parse(path: impl Into<PathBuf>, text: String) -> Result<Self, syn::Error> {
        let tree = syn::parse_file(&text)?;
        let map = SourceMap::new(&text);
        Ok(Self {
            path: path.into(),
            text,
            tree,
            map,
        })
    }
}

/// Line table for one file.
///
/// proc-macro2 reports 1-based lines and 0-based columns counted in chars;
/// syn strips a leading BOM before tokenizing, so columns on the first line
/// are shifted by its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    line_starts: Vec<usize>,
    bom_len: usize,
    len: usize,
}

impl SourceMap {
    pub fn new(text: &str) -> Self {
        let bom_len = if text.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            line_starts,
            bom_len,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of a span position, or `None` when it falls outside the text.
    pub fn offset(&self, text: &str, pos: LineColumn) -> Option<usize> {
        let line = self.line_text(text, pos.line)?;
        let mut start = self.line_starts[pos.line - 1];
        let mut line = line;
        if pos.line == 1 && self.bom_len > 0 {
            start += self.bom_len;
            line = &line[self.bom_len..];
        }
        if pos.column == line.chars().count() {
            return Some(start + line.len());
        }
        line.char_indices().nth(pos.column).map(|(i, _)| start + i)
    }

    /// Leading whitespace of a 1-based line.
    pub fn indent_of<'t>(&self, text: &'t str, line: usize) -> &'t str {
        let Some(content) = self.line_text(text, line) else {
            return "";
        };
        let content = content.trim_start_matches('\u{feff}');
        let trimmed = content.trim_start_matches([' ', '\t']);
        &content[..content.len() - trimmed.len()]
    }

    /// Text of a 1-based line without its line terminator.
    fn line_text<'t>(&self, text: &'t str, line: usize) -> Option<&'t str> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        let content = text.get(start..end)?;
        Some(content.strip_suffix('\r').unwrap_or(content))
    }
}
