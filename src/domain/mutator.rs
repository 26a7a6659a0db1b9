//! The instrumentation engine.
//!
//! [`instrument`] is a pure function over a parsed file: it mutates the tree
//! in memory and returns the list of insertions the emitter has to splice into
//! the original text. Positions are captured from the unmodified tree before
//! anything moves.

use super::config::InstrumentConfig;
use super::error::{InstrumentError, InstrumentResult};
use super::guard;
use super::template::MarkerTemplate;
use proc_macro2::LineColumn;
use syn::spanned::Spanned;
use syn::{AttrStyle, File, Item, ItemFn, ItemUse, Stmt};

/// One piece of new syntax and where it goes in the original text.
#[derive(Debug, Clone)]
pub enum Insertion {
    /// Statement placed right after the opening brace of a function body
    BodyPrologue {
        /// Start of the `fn` keyword, used for indentation
        item: LineColumn,
        /// End of the body's opening brace, or of its last inner attribute
        anchor: LineColumn,
        /// Start of the body's closing brace
        close: LineColumn,
        /// Start of the first existing statement, if any
        first_stmt: Option<LineColumn>,
        stmt: Stmt,
    },
    /// `use` item placed after the end of an existing one
    Import { after: LineColumn, item: ItemUse },
    /// Item appended at the end of the file
    TrailingItem { item: Item },
}

/// Insertions produced by one successful run.
#[derive(Debug, Clone, Default)]
pub struct Mutation {
    pub insertions: Vec<Insertion>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Instrumented(Mutation),
    AlreadyInstrumented,
}

impl Outcome {
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Instrumented(_))
    }
}

/// Instrument `tree` according to `config`.
///
/// Preconditions are all checked before the tree is touched, so an error
/// leaves it exactly as parsed.
pub fn instrument(tree: &mut File, config: &InstrumentConfig) -> InstrumentResult<Outcome> {
    if guard::is_instrumented(tree, &config.marker) {
        return Ok(Outcome::AlreadyInstrumented);
    }

    let template =
        MarkerTemplate::new(config).map_err(|e| InstrumentError::InvalidConfig(format!("{:#}", e)))?;

    let not_found = || InstrumentError::TargetNotFound {
        function: config.target_function.clone(),
    };
    find_target(tree, &config.target_function).ok_or_else(not_found)?;
    let (import_end, import_after) =
        import_block_end(tree).ok_or_else(|| InstrumentError::MissingImports {
            path: config.target_file.clone(),
        })?;

    let mut mutation = Mutation::default();
    let target = find_target_mut(tree, &config.target_function).ok_or_else(not_found)?;
    mutation
        .insertions
        .push(patch_function_body(target, &template));
    mutation
        .insertions
        .push(augment_imports(tree, import_end, import_after, &template));
    mutation.insertions.push(append_marker(tree, &template));

    Ok(Outcome::Instrumented(mutation))
}

/// First top-level function named `name`.
fn find_target<'a>(tree: &'a File, name: &str) -> Option<&'a ItemFn> {
    tree.items.iter().find_map(|item| match item {
        Item::Fn(func) if func.sig.ident == name => Some(func),
        _ => None,
    })
}

fn find_target_mut<'a>(tree: &'a mut File, name: &str) -> Option<&'a mut ItemFn> {
    tree.items.iter_mut().find_map(|item| match item {
        Item::Fn(func) if func.sig.ident == name => Some(func),
        _ => None,
    })
}

/// Index and end position of the last `use` item in the first run of
/// consecutive `use` items.
fn import_block_end(tree: &File) -> Option<(usize, LineColumn)> {
    let first = tree.items.iter().position(|item| matches!(item, Item::Use(_)))?;
    tree.items[first..]
        .iter()
        .enumerate()
        .map_while(|(i, item)| match item {
            Item::Use(u) => Some((first + i, u.semi_token.spans[0].end())),
            _ => None,
        })
        .last()
}

/// Inner attributes (`#![..]`, `//!`) must stay ahead of every statement, so
/// the prologue goes after the last of them.
fn prologue_anchor(func: &ItemFn) -> LineColumn {
    func.attrs
        .iter()
        .rev()
        .find(|attr| matches!(attr.style, AttrStyle::Inner(_)))
        .map(|attr| attr.span().end())
        .unwrap_or_else(|| func.block.brace_token.span.open().end())
}

fn patch_function_body(func: &mut ItemFn, template: &MarkerTemplate) -> Insertion {
    let stmt = template.deferred_call();
    let insertion = Insertion::BodyPrologue {
        item: func.sig.fn_token.span.start(),
        anchor: prologue_anchor(func),
        close: func.block.brace_token.span.close().start(),
        first_stmt: func.block.stmts.first().map(|s| s.span().start()),
        stmt: stmt.clone(),
    };
    func.block.stmts.insert(0, stmt);
    insertion
}

/// Append the timing import after the import block.
///
/// An identical `use` already in the file is not detected; the result then
/// carries a duplicate import.
fn augment_imports(
    tree: &mut File,
    block_end: usize,
    after: LineColumn,
    template: &MarkerTemplate,
) -> Insertion {
    let item = template.timing_import();
    tree.items.insert(block_end + 1, Item::Use(item.clone()));
    Insertion::Import { after, item }
}

fn append_marker(tree: &mut File, template: &MarkerTemplate) -> Insertion {
    let item = template.marker_function();
    tree.items.push(item.clone());
    Insertion::TrailingItem { item }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn config() -> InstrumentConfig {
        InstrumentConfig::default()
    }

    fn fibonacci() -> File {
        syn::parse_file(
            "use std::fmt;\n\nfn fibonacci(n: u64) -> u64 {\n    if n <= 1 {\n        return n;\n    }\n    fibonacci(n - 1) + fibonacci(n - 2)\n}\n",
        )
        .unwrap()
    }

    fn body_len(tree: &File, name: &str) -> usize {
        tree.items
            .iter()
            .find_map(|item| match item {
                Item::Fn(f) if f.sig.ident == name => Some(f.block.stmts.len()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn inserts_exactly_one_statement() {
        let mut tree = fibonacci();
        let before = body_len(&tree, "fibonacci");
        let outcome = instrument(&mut tree, &config()).unwrap();
        assert!(outcome.changed());
        assert_eq!(body_len(&tree, "fibonacci"), before + 1);

        let template = MarkerTemplate::new(&config()).unwrap();
        let Item::Fn(func) = &tree.items[2] else {
            panic!("fibonacci moved");
        };
        assert!(template.is_deferred_call(&func.block.stmts[0]));
    }

    #[test]
    fn appends_marker_and_import() {
        let mut tree = fibonacci();
        let Outcome::Instrumented(mutation) = instrument(&mut tree, &config()).unwrap() else {
            panic!("expected instrumentation");
        };
        assert_eq!(mutation.insertions.len(), 3);
        assert_eq!(guard::marker_count(&tree, "trace_fibonacci"), 1);
        assert!(matches!(tree.items.last(), Some(Item::Fn(f)) if f.sig.ident == "trace_fibonacci"));

        let expected: Item = parse_quote! { use std::time::Instant; };
        assert_eq!(tree.items[1], expected);
    }

    #[test]
    fn second_pass_is_absorbed() {
        let mut tree = fibonacci();
        instrument(&mut tree, &config()).unwrap();
        let snapshot = tree.clone();
        let outcome = instrument(&mut tree, &config()).unwrap();
        assert!(matches!(outcome, Outcome::AlreadyInstrumented));
        assert_eq!(tree, snapshot);
        assert_eq!(guard::marker_count(&tree, "trace_fibonacci"), 1);
    }

    #[test]
    fn missing_target_leaves_tree_untouched() {
        let mut tree: File = parse_quote! {
            use std::fmt;
            fn other() {}
        };
        let snapshot = tree.clone();
        let err = instrument(&mut tree, &config()).unwrap_err();
        assert!(matches!(err, InstrumentError::TargetNotFound { ref function } if function == "fibonacci"));
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn missing_imports_is_reported_before_mutating() {
        let mut tree: File = parse_quote! {
            fn fibonacci(n: u64) -> u64 { n }
        };
        let snapshot = tree.clone();
        let err = instrument(&mut tree, &config()).unwrap_err();
        assert!(matches!(err, InstrumentError::MissingImports { .. }));
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn import_goes_after_first_block_only() {
        let mut tree: File = parse_quote! {
            use std::fmt;
            use std::io;
            fn fibonacci(n: u64) -> u64 { n }
            use std::env;
        };
        instrument(&mut tree, &config()).unwrap();
        let expected: Item = parse_quote! { use std::time::Instant; };
        assert_eq!(tree.items[2], expected);
        assert!(matches!(&tree.items[4], Item::Use(_)));
    }

    #[test]
    fn existing_timing_import_is_duplicated() {
        // Known gap: the import is appended without looking for an identical one.
        let mut tree: File = parse_quote! {
            use std::time::Instant;
            fn fibonacci(n: u64) -> u64 { n }
        };
        instrument(&mut tree, &config()).unwrap();
        let timing: Item = parse_quote! { use std::time::Instant; };
        let count = tree.items.iter().filter(|item| **item == timing).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn prologue_follows_inner_attributes() {
        let mut tree = syn::parse_file(
            "use std::fmt;\nfn fibonacci(n: u64) -> u64 {\n    #![allow(unused_variables)]\n    n\n}\n",
        )
        .unwrap();
        let Outcome::Instrumented(mutation) = instrument(&mut tree, &config()).unwrap() else {
            panic!("expected instrumentation");
        };
        let Some(Insertion::BodyPrologue { anchor, .. }) = mutation.insertions.first() else {
            panic!("prologue comes first");
        };
        assert_eq!((anchor.line, anchor.column), (3, 31));
    }

    #[test]
    fn invalid_marker_is_a_config_error() {
        let mut tree = fibonacci();
        let config = InstrumentConfig {
            marker: "not valid".into(),
            ..config()
        };
        let err = instrument(&mut tree, &config).unwrap_err();
        assert!(matches!(err, InstrumentError::InvalidConfig(_)));
    }
}
