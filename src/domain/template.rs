//! Syntax templates for the timing instrumentation.
//!
//! The shape of every synthesized node is written once here as a
//! `parse_quote!` template. Printing happens elsewhere, so these nodes can be
//! inspected structurally in tests.

use super::config::InstrumentConfig;
use anyhow::Result;
use quote::format_ident;
use syn::{parse_quote, Expr, Ident, Item, ItemUse, LitStr, Pat, Path, Stmt};

/// Everything the templates need, resolved from an [`InstrumentConfig`].
#[derive(Debug, Clone)]
pub struct MarkerTemplate {
    marker: Ident,
    target: String,
    timing: Path,
}

impl MarkerTemplate {
    pub fn new(config: &InstrumentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            marker: format_ident!("{}", config.marker),
            target: config.target_function.clone(),
            timing: config.timing_path()?,
        })
    }

    /// Name of the local that keeps the guard alive until the function exits.
    fn guard_binding(&self) -> Ident {
        format_ident!("_{}", self.marker)
    }

    /// `let _<marker> = <marker>();`
    ///
    /// The marker runs eagerly and its guard is dropped on every exit path.
    pub fn deferred_call(&self) -> Stmt {
        let marker = &self.marker;
        let binding = self.guard_binding();
        parse_quote! {
            let #binding = #marker();
        }
    }

    /// The marker function itself.
    pub fn marker_function(&self) -> Item {
        let marker = &self.marker;
        let clock = self.clock();
        let message = LitStr::new(
            &format!("Function {} took: {{:?}}", self.target),
            proc_macro2::Span::call_site(),
        );
        parse_quote! {
            fn #marker() -> impl Drop {
                struct Deferred<F: FnMut()>(F);
                impl<F: FnMut()> Drop for Deferred<F> {
                    fn drop(&mut self) {
                        (self.0)()
                    }
                }
                let start = #clock::now();
                Deferred(move || {
                    let duration = start.elapsed();
                    println!(#message, duration);
                })
            }
        }
    }

    /// `use <timing dependency>;`
    pub fn timing_import(&self) -> ItemUse {
        let timing = &self.timing;
        parse_quote! {
            use #timing;
        }
    }

    /// Last segment of the timing path, the name brought into scope by the import.
    fn clock(&self) -> Ident {
        match self.timing.segments.last() {
            Some(segment) => segment.ident.clone(),
            None => format_ident!("Instant"),
        }
    }

    /// Whether `stmt` is the deferred marker call produced by [`Self::deferred_call`].
    pub fn is_deferred_call(&self, stmt: &Stmt) -> bool {
        let Stmt::Local(local) = stmt else {
            return false;
        };
        let Pat::Ident(binding) = &local.pat else {
            return false;
        };
        if binding.ident != self.guard_binding() {
            return false;
        }
        let Some(init) = &local.init else {
            return false;
        };
        match init.expr.as_ref() {
            Expr::Call(call) if call.args.is_empty() => {
                matches!(call.func.as_ref(), Expr::Path(p) if p.path.is_ident(&self.marker))
            }
            _ => false,
        }
    }
}
