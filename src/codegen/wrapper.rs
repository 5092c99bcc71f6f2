//! Per-function wrapper emission
//!
//! Emits one C function definition that shadows the real symbol: it
//! resolves the symbol through `GET_SYM` (double-checked, cached), logs an
//! enter record with every parameter, forwards the call (or a configured
//! override), logs an exit record with the parameters again plus the return
//! value and its checker verdict, and returns the result. The caller's
//! errno is saved up front and restored around every logging call, since
//! the formatters may themselves touch it.

use std::fmt::Write;

use crate::diag::{Diagnostic, Diagnostics};
use crate::parser::decl::FunctionDecl;

use super::formatters::{resolve_checker, resolve_formatter};
use super::GenContext;

/// Emit the wrapper for one function, or a diagnostic when the prototype is
/// variadic (a variadic call cannot be forwarded).
pub fn emit(out: &mut String, func: &FunctionDecl, ctx: &GenContext, diags: &mut Diagnostics) {
    if func.is_variadic() {
        diags.report(Diagnostic::VariadicFunction {
            name: func.name.clone(),
        });
        return;
    }

    let mut func = func.clone();
    func.assign_param_names(&format!("{}_p", ctx.prefix));

    let section = format!("func-{}", func.name);
    let ret_default = ctx.config.get(&section, "return-default").unwrap_or_else(|| {
        if func.ret_type.contains('*') {
            "NULL".to_string()
        } else {
            "0".to_string()
        }
    });

    let p = &ctx.prefix;
    let name = &func.name;
    let ret_type = &func.ret_type;
    let internal = format!("{}_f_{}", p, name);
    let ret_name = format!("{}_ret", p);
    let params_decl = func.params_decl();
    let params_names = func.params_names();
    let is_void = ret_type == "void";

    let _ = write!(
        out,
        "\n{ret_type} {name}({params_decl})\n\
         {{\n    \
         {ret_type} (*{internal})({params_decl}) = NULL;\n    \
         int {p}_bkp_errno = errno;\n"
    );
    if is_void {
        let _ = writeln!(out, "    {p}_GET_SYM({internal}, \"{name}\");");
    } else {
        let _ = write!(
            out,
            "    {ret_type} {ret_name} = {ret_default};\n    \
             {p}_GET_SYM({internal}, \"{name}\", {ret_name});\n"
        );
    }

    let _ = writeln!(out, "\n    {p}_log_enter_start(\"{name}\");");
    emit_log_params(out, &func, ctx);
    let _ = writeln!(out, "    {p}_log_enter_end(\"{name}\");");

    let _ = write!(out, "\n    errno = {p}_bkp_errno;\n    ");
    if !is_void {
        let _ = write!(out, "{ret_name} = ");
    }
    match ctx.config.get(&section, "override") {
        Some(override_fn) if params_names.is_empty() => {
            let _ = writeln!(out, "{override_fn}({internal});");
        }
        Some(override_fn) => {
            let _ = writeln!(out, "{override_fn}({internal}, {params_names});");
        }
        None => {
            let _ = writeln!(out, "{internal}({params_names});");
        }
    }
    let _ = writeln!(out, "    {p}_bkp_errno = errno;");

    let _ = writeln!(out, "\n    {p}_log_exit_start(\"{name}\");");
    emit_log_params(out, &func, ctx);
    if !is_void {
        let formatter = resolve_formatter(ctx, name, "return", ret_type);
        let _ = writeln!(out, "    {p}_log_exit_return();");
        let _ = writeln!(out, "    errno = {p}_bkp_errno;");
        let _ = writeln!(
            out,
            "    {formatter}({p}_log_fp, \"{ret_type}\", NULL, {ret_name});"
        );
        if let Some(checker) = resolve_checker(ctx, name, ret_type) {
            let _ = writeln!(out, "    errno = {p}_bkp_errno;");
            let _ = writeln!(
                out,
                "    {checker}({p}_log_fp, \"{ret_type}\", {ret_name});"
            );
        }
    }
    let _ = writeln!(out, "    {p}_log_exit_end(\"{name}\");");

    if !is_void {
        let _ = write!(
            out,
            "\n    errno = {p}_bkp_errno;\n    return {ret_name};\n"
        );
    }
    let _ = writeln!(out, "}}");
}

/// Log every parameter of one enter/exit record, restoring the caller's
/// errno before each formatter call.
fn emit_log_params(out: &mut String, func: &FunctionDecl, ctx: &GenContext) {
    if func.parameters.is_empty() || func.parameters[0].ctype() == "void" {
        return;
    }
    let p = &ctx.prefix;
    let _ = writeln!(out, "    {p}_log_params_begin();");
    let count = func.parameters.len();
    for (i, param) in func.parameters.iter().enumerate() {
        let ctype = param.ctype();
        let name = param.name().unwrap_or_default();
        let formatter = resolve_formatter(ctx, &func.name, name, ctype);
        let _ = writeln!(out, "    errno = {p}_bkp_errno;");
        let _ = writeln!(
            out,
            "    {formatter}({p}_log_fp, \"{ctype}\", \"{name}\", {name});"
        );
        if i + 1 < count {
            let _ = writeln!(out, "    {p}_log_param_continue();");
        }
    }
    let _ = writeln!(out, "    {p}_log_params_end();");
}
