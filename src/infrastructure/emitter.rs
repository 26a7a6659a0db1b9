//! Source Emitter
//!
//! Splices pretty-printed insertions into the original text. Bytes outside
//! the insertion points are copied verbatim, so comments and formatting in
//! the rest of the file survive a rewrite.

use crate::domain::error::{InstrumentError, InstrumentResult};
use crate::domain::mutator::{Insertion, Mutation};
use crate::domain::source::LoadedSource;
use crate::ports::SourceEmitter;
use proc_macro2::LineColumn;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const INDENT: &str = "    ";

/// Writes instrumented text over the file it was loaded from.
pub struct FsSourceEmitter;

impl SourceEmitter for FsSourceEmitter {
    fn emit(&self, source: &LoadedSource, mutation: &Mutation) -> InstrumentResult<()> {
        let content = render(source, mutation)?;
        replace_file(&source.path, &content).map_err(|e| InstrumentError::Write {
            path: source.path.clone(),
            source: e,
        })
    }
}

/// Write `content` to a sibling temp file and rename it over `path`, so a
/// failed write leaves the original untouched.
fn replace_file(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Apply `mutation` to the original text of `source`.
///
/// An empty mutation reproduces the text byte for byte.
pub fn render(source: &LoadedSource, mutation: &Mutation) -> InstrumentResult<String> {
    let mut splices = mutation
        .insertions
        .iter()
        .map(|insertion| splice_for(source, insertion))
        .collect::<InstrumentResult<Vec<(usize, String)>>>()?;

    // Back to front keeps earlier offsets valid; equal offsets keep their order.
    splices.sort_by_key(|(offset, _)| *offset);
    let mut out = source.text.clone();
    for (offset, text) in splices.into_iter().rev() {
        out.insert_str(offset, &text);
    }
    Ok(out)
}

fn splice_for(source: &LoadedSource, insertion: &Insertion) -> InstrumentResult<(usize, String)> {
    let text = &source.text;
    let map = &source.map;
    let eol = line_ending(text);
    match insertion {
        Insertion::BodyPrologue {
            item,
            anchor,
            close,
            first_stmt,
            stmt,
        } => {
            let offset = past_trailing_comment(text, locate(source, *anchor)?);
            let item_indent = map.indent_of(text, item.line);
            let stmt_text = render_stmt(stmt).replace('\n', eol);
            let spliced = match first_stmt {
                Some(first) if first.line > anchor.line => {
                    format!("{}{}{}", eol, map.indent_of(text, first.line), stmt_text)
                }
                Some(_) => format!("{}{}{}{}", eol, item_indent, INDENT, stmt_text),
                None if close.line == anchor.line => format!(
                    "{}{}{}{}{}{}",
                    eol, item_indent, INDENT, stmt_text, eol, item_indent
                ),
                None => format!("{}{}{}{}", eol, item_indent, INDENT, stmt_text),
            };
            Ok((offset, spliced))
        }
        Insertion::Import { after, item } => {
            let offset = past_trailing_comment(text, locate(source, *after)?);
            let indent = map.indent_of(text, after.line);
            let rendered = render_items(vec![syn::Item::Use(item.clone())]);
            Ok((offset, format!("{}{}{}", eol, indent, rendered.trim_end())))
        }
        Insertion::TrailingItem { item } => {
            let rendered = render_items(vec![item.clone()]).replace('\n', eol);
            let lead = if text.is_empty() || text.ends_with('\n') {
                eol.to_string()
            } else {
                eol.repeat(2)
            };
            Ok((text.len(), format!("{}{}", lead, rendered)))
        }
    }
}

/// Line terminator used by the file, so spliced lines match their neighbours.
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Move an insertion point past the rest of its line when that rest is only
/// whitespace or a line comment, so the comment stays with its original code.
fn past_trailing_comment(text: &str, offset: usize) -> usize {
    let rest = text[offset..].split('\n').next().unwrap_or("");
    let rest = rest.strip_suffix('\r').unwrap_or(rest);
    let trimmed = rest.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        offset + rest.len()
    } else {
        offset
    }
}

fn locate(source: &LoadedSource, pos: LineColumn) -> InstrumentResult<usize> {
    source
        .map
        .offset(&source.text, pos)
        .ok_or(InstrumentError::UnmappedPosition {
            line: pos.line,
            column: pos.column,
        })
}

fn render_items(items: Vec<syn::Item>) -> String {
    prettyplease::unparse(&syn::File {
        shebang: None,
        attrs: vec![],
        items,
    })
}

/// Pretty-print a single statement without surrounding indentation.
///
/// prettyplease only formats whole files, so the statement is printed inside
/// a throwaway function and the body lines are cut back out.
fn render_stmt(stmt: &syn::Stmt) -> String {
    let wrapper: syn::Item = syn::parse_quote! {
        fn __tracewrap() {
            #stmt
        }
    };
    let printed = render_items(vec![wrapper]);
    let lines: Vec<&str> = printed.lines().collect();
    let body = lines
        .get(1..lines.len().saturating_sub(1))
        .unwrap_or_default();
    body.iter()
        .map(|line| line.strip_prefix(INDENT).unwrap_or(*line))
        .collect::<Vec<_>>()
        .join("\n")
}
