//! Formatter and checker resolution
//!
//! Maps a C type and its call-site role (parameter or return value) to the
//! logging formatter the wrapper calls, and a return type to an optional
//! post-call checker.
//!
//! Resolution order for formatters:
//! 1. a `func-<name>` per-parameter / per-return formatter override wins;
//! 2. otherwise, when the value is marked safe (globally, or per
//!    parameter/return), a `type-formatters` entry wins, and a pointer type
//!    with a built-in formatter (`char *` as string) is promoted;
//! 3. otherwise the built-in table keyed by the hyphenated type name;
//! 4. pointer types and `va_list` default to the generic pointer formatter,
//!    anything else unknown to the 64-bit signed formatter.
//!
//! Checkers are independent: a `func-<name>` `return-checker` beats a
//! `return-checkers` per-type entry; neither means no check is emitted.

use super::GenContext;

/// Built-in formatter suffixes keyed by hyphenated C type name. The full
/// routine name is `<prefix>_<suffix>`, emitted by the preamble.
const BUILTIN_FORMATTERS: &[(&str, &str)] = &[
    ("int", "log_fmt_int"),
    ("signed-int", "log_fmt_int"),
    ("unsigned-int", "log_fmt_uint"),
    ("unsigned", "log_fmt_uint"),
    ("int32_t", "log_fmt_int"),
    ("uint32_t", "log_fmt_uint"),
    ("char", "log_fmt_char"),
    ("signed-char", "log_fmt_char"),
    ("unsigned-char", "log_fmt_uchar"),
    ("int8_t", "log_fmt_char"),
    ("uint8_t", "log_fmt_uchar"),
    ("short", "log_fmt_short"),
    ("signed-short", "log_fmt_short"),
    ("unsigned-short", "log_fmt_ushort"),
    ("signed-short-int", "log_fmt_short"),
    ("unsigned-short-int", "log_fmt_ushort"),
    ("int16_t", "log_fmt_short"),
    ("uint16_t", "log_fmt_ushort"),
    ("long", "log_fmt_long"),
    ("signed-long", "log_fmt_long"),
    ("unsigned-long", "log_fmt_ulong"),
    ("signed-long-int", "log_fmt_long"),
    ("unsigned-long-int", "log_fmt_ulong"),
    ("long-long", "log_fmt_long_long"),
    ("signed-long-long", "log_fmt_long_long"),
    ("unsigned-long-long", "log_fmt_ulong_long"),
    ("signed-long-long-int", "log_fmt_long_long"),
    ("unsigned-long-long-int", "log_fmt_ulong_long"),
    ("int64_t", "log_fmt_long_long"),
    ("uint64_t", "log_fmt_ulong_long"),
    ("bool", "log_fmt_bool"),
    ("Bool", "log_fmt_bool"),
    ("_Bool", "log_fmt_bool"),
    ("BOOL", "log_fmt_bool"),
    ("double", "log_fmt_double"),
    ("float", "log_fmt_double"),
    ("char-*", "log_fmt_string"),
    ("const-char-*", "log_fmt_string"),
    ("const-*-char-*", "log_fmt_string"),
    ("void-*", "log_fmt_pointer"),
];

fn builtin(type_key: &str) -> Option<&'static str> {
    BUILTIN_FORMATTERS
        .iter()
        .find(|(key, _)| *key == type_key)
        .map(|(_, suffix)| *suffix)
}

/// Resolve the formatter for one value. `param` is the parameter name, or
/// `"return"` for the return value.
pub fn resolve_formatter(ctx: &GenContext, func: &str, param: &str, ctype: &str) -> String {
    let type_key = ctype.replace(' ', "-");

    let mut formatter = if ctype.contains('*') || ctype == "va_list" {
        format!("{}_log_fmt_pointer", ctx.prefix)
    } else if let Some(suffix) = builtin(&type_key) {
        format!("{}_{}", ctx.prefix, suffix)
    } else {
        format!("{}_log_fmt_long_long", ctx.prefix)
    };

    let cfg = ctx.config;
    let mut safe = cfg
        .get_bool("global", "assume-safe-formatters")
        .unwrap_or(false);
    let custom = cfg
        .get("type-formatters", &type_key)
        .map(|v| ctx.expand(&v));

    let section = format!("func-{}", func);
    let item = if param == "return" {
        "return".to_string()
    } else {
        format!("parameter-{}", param)
    };
    if let Some(b) = cfg.get_bool(&section, &format!("{}-safe", item)) {
        safe = b;
    }
    if let Some(explicit) = cfg
        .get(&section, &format!("{}-formatter", item))
        .map(|v| ctx.expand(&v))
    {
        return explicit;
    }
    if safe {
        if let Some(custom) = custom {
            return custom;
        }
        if type_key.contains('*') {
            if let Some(suffix) = builtin(&type_key) {
                formatter = format!("{}_{}", ctx.prefix, suffix);
            }
        }
    }
    formatter
}

/// Resolve the return-value checker for one function, if any is configured.
pub fn resolve_checker(ctx: &GenContext, func: &str, ctype: &str) -> Option<String> {
    let type_key = ctype.replace(' ', "-");
    let by_type = ctx
        .config
        .get("return-checkers", &type_key)
        .map(|v| ctx.expand(&v));
    let by_func = ctx
        .config
        .get(&format!("func-{}", func), "return-checker")
        .map(|v| ctx.expand(&v));
    by_func.or(by_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx(config: Config) -> GenContext<'static> {
        GenContext {
            header: "demo.h".into(),
            libname: "libdemo.so".into(),
            prefix: "_log_demo".into(),
            progname: "logwrap".into(),
            config: Box::leak(Box::new(config)),
        }
    }

    #[test]
    fn test_builtin_integer_widths() {
        let ctx = ctx(Config::empty());
        assert_eq!(
            resolve_formatter(&ctx, "f", "a", "int"),
            "_log_demo_log_fmt_int"
        );
        assert_eq!(
            resolve_formatter(&ctx, "f", "a", "unsigned short"),
            "_log_demo_log_fmt_ushort"
        );
        assert_eq!(
            resolve_formatter(&ctx, "f", "a", "uint64_t"),
            "_log_demo_log_fmt_ulong_long"
        );
    }

    #[test]
    fn test_unknown_type_defaults_to_long_long() {
        let ctx = ctx(Config::empty());
        assert_eq!(
            resolve_formatter(&ctx, "f", "a", "wchar_t"),
            "_log_demo_log_fmt_long_long"
        );
    }

    #[test]
    fn test_pointer_and_va_list_default_to_pointer() {
        let ctx = ctx(Config::empty());
        // even `char *`, which has a built-in, stays a raw pointer unless
        // marked safe
        assert_eq!(
            resolve_formatter(&ctx, "f", "s", "char *"),
            "_log_demo_log_fmt_pointer"
        );
        assert_eq!(
            resolve_formatter(&ctx, "f", "ap", "va_list"),
            "_log_demo_log_fmt_pointer"
        );
    }

    #[test]
    fn test_safe_promotes_string_formatter() {
        let cfg =
            Config::from_json(r#"{"global": {"assume-safe-formatters": true}}"#).unwrap();
        let ctx = ctx(cfg);
        assert_eq!(
            resolve_formatter(&ctx, "f", "s", "const char *"),
            "_log_demo_log_fmt_string"
        );
    }

    #[test]
    fn test_per_parameter_safe_flag() {
        let cfg = Config::from_json(
            r#"{"func-open_file": {"parameter-path-safe": true}}"#,
        )
        .unwrap();
        let ctx = ctx(cfg);
        assert_eq!(
            resolve_formatter(&ctx, "open_file", "path", "const char *"),
            "_log_demo_log_fmt_string"
        );
        // other functions unaffected
        assert_eq!(
            resolve_formatter(&ctx, "other", "path", "const char *"),
            "_log_demo_log_fmt_pointer"
        );
    }

    #[test]
    fn test_explicit_formatter_wins_over_everything() {
        let cfg = Config::from_json(
            r#"{
                "global": {"assume-safe-formatters": true},
                "type-formatters": {"int": "custom_int_fmt"},
                "func-f": {"parameter-a-formatter": "%(prefix)s_mine"}
            }"#,
        )
        .unwrap();
        let ctx = ctx(cfg);
        assert_eq!(resolve_formatter(&ctx, "f", "a", "int"), "_log_demo_mine");
    }

    #[test]
    fn test_safe_custom_type_formatter() {
        let cfg = Config::from_json(
            r#"{
                "global": {"assume-safe-formatters": true},
                "type-formatters": {"my_handle_t": "fmt_handle"}
            }"#,
        )
        .unwrap();
        let ctx = ctx(cfg);
        assert_eq!(
            resolve_formatter(&ctx, "f", "h", "my_handle_t"),
            "fmt_handle"
        );
    }

    #[test]
    fn test_checker_resolution_order() {
        let cfg = Config::from_json(
            r#"{
                "return-checkers": {"int": "%(prefix)s_log_checker_zero"},
                "func-must_work": {"return-checker": "%(prefix)s_log_checker_non_zero"}
            }"#,
        )
        .unwrap();
        let ctx = ctx(cfg);
        assert_eq!(
            resolve_checker(&ctx, "plain", "int").as_deref(),
            Some("_log_demo_log_checker_zero")
        );
        assert_eq!(
            resolve_checker(&ctx, "must_work", "int").as_deref(),
            Some("_log_demo_log_checker_non_zero")
        );
        assert_eq!(resolve_checker(&ctx, "plain", "void *"), None);
    }
}
