// Idempotency check: a file that already defines the marker function has been
// instrumented and must not be touched again.

use syn::{File, Item};

/// Top-level function items named `marker`.
fn marker_functions<'a>(tree: &'a File, marker: &'a str) -> impl Iterator<Item = &'a syn::ItemFn> + 'a {
    tree.items.iter().filter_map(move |item| match item {
        Item::Fn(func) if func.sig.ident == marker => Some(func),
        _ => None,
    })
}

pub fn is_instrumented(tree: &File, marker: &str) -> bool {
    marker_functions(tree, marker).next().is_some()
}

/// Number of marker definitions; at most one in any file this tool wrote.
pub fn marker_count(tree: &File, marker: &str) -> usize {
    marker_functions(tree, marker).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_marker_at_top_level_only() {
        let tree: File = syn::parse_quote! {
            fn fibonacci() {}
            mod nested {
                fn trace_fibonacci() {}
            }
        };
        assert!(!is_instrumented(&tree, "trace_fibonacci"));
        assert_eq!(marker_count(&tree, "trace_fibonacci"), 0);

        let tree: File = syn::parse_quote! {
            fn fibonacci() {}
            fn trace_fibonacci() -> impl Drop { todo!() }
        };
        assert!(is_instrumented(&tree, "trace_fibonacci"));
        assert_eq!(marker_count(&tree, "trace_fibonacci"), 1);
    }

    #[test]
    fn ignores_non_function_items_with_marker_name() {
        let tree: File = syn::parse_quote! {
            struct trace_fibonacci;
            static TRACE: u8 = 0;
        };
        assert!(!is_instrumented(&tree, "trace_fibonacci"));
    }
}
