//! Wrapper source generation
//!
//! Turns the declaration table into one C source unit:
//! - [`preamble`]: the feature-gated runtime scaffolding
//! - [`wrapper`]: one interception wrapper per function prototype
//! - [`formatters`]: per-type formatter/checker resolution
//! - [`makefile`]: optional sample makefile
//!
//! Output is deterministic: wrappers are emitted in lexicographic name
//! order and nothing else in the output depends on iteration order.

pub mod formatters;
pub mod makefile;
pub mod preamble;
pub mod wrapper;

use crate::config::Config;
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::Error;
use crate::parser::decl::Declarations;

/// Everything the emitters need to know about one generation run.
#[derive(Debug)]
pub struct GenContext<'a> {
    /// Header name as it should appear in `#include <...>`.
    pub header: String,
    /// Library the wrappers `dlopen` and forward to.
    pub libname: String,
    /// Sanitized symbol prefix for every generated identifier and switch.
    pub prefix: String,
    /// Program name stamped into the generated-file banner.
    pub progname: String,
    pub config: &'a Config,
}

impl GenContext<'_> {
    /// Expand the placeholders configuration values may carry.
    pub fn expand(&self, value: &str) -> String {
        value
            .replace("%(prefix)s", &self.prefix)
            .replace("%(libname)s", &self.libname)
            .replace("%(header)s", &self.header)
    }
}

/// Derive the default symbol prefix from a library name: strip a leading
/// `lib`, truncate at the first `.`, prepend `_log_`.
pub fn prefix_from_libname(libname: &str) -> String {
    let stem = libname.strip_prefix("lib").unwrap_or(libname);
    let stem = stem.split('.').next().unwrap_or(stem);
    format!("_log_{}", stem)
}

/// Restrict a prefix to identifier characters.
pub fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Generate the complete wrapper source for one declaration table.
pub fn generate(
    decls: &Declarations,
    ctx: &GenContext,
    diags: &mut Diagnostics,
) -> Result<String, Error> {
    let ignore = ctx.config.get_regexp("global", "ignore-functions-regexp")?;

    let mut out = String::new();
    preamble::emit(&mut out, ctx);

    let mut names: Vec<&String> = decls.functions.keys().collect();
    names.sort();
    for name in names {
        if let Some(re) = &ignore {
            // anchored at the start of the name
            if re.find(name).is_some_and(|m| m.start() == 0) {
                diags.report(Diagnostic::IgnoredFunction { name: name.clone() });
                continue;
            }
        }
        wrapper::emit(&mut out, &decls.functions[name], ctx, diags);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_from_libname() {
        assert_eq!(prefix_from_libname("libfoo.so.1"), "_log_foo");
        assert_eq!(prefix_from_libname("libm.so"), "_log_m");
        assert_eq!(prefix_from_libname("plugin.so"), "_log_plugin");
        assert_eq!(prefix_from_libname("bare"), "_log_bare");
    }

    #[test]
    fn test_sanitize_prefix() {
        assert_eq!(sanitize_prefix("_log_foo-bar.2"), "_log_foo_bar_2");
        assert_eq!(sanitize_prefix("_log_ok_9"), "_log_ok_9");
    }
}
