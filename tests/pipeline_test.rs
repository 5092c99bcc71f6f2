// End-to-end tests for the header parsing pipeline

use logwrap::diag::{Diagnostic, Diagnostics};
use logwrap::parser::decl::{Declarations, Parameter, StructMember};
use logwrap::parser::parse_header;

fn parse(source: &str) -> (Declarations, Diagnostics) {
    let mut diags = Diagnostics::new();
    let decls = parse_header(source, None, &mut diags).expect("parse failed");
    (decls, diags)
}

#[test]
fn test_realistic_header() {
    let source = r#"
#ifndef DEMO_H
#define DEMO_H

#include <stddef.h>

/* version marker */
#define DEMO_VERSION 3

enum demo_state {
    DEMO_IDLE,
    DEMO_RUNNING = 1,
    DEMO_DONE = (1 << 4)
};

typedef struct {
    int width;
    int height;
} demo_size;

typedef void (*demo_notify)(int code, void *data);

struct demo_ops {
    void (*start)(struct demo_ops *self);
    int id;
    char *label, *alt;
};

extern int demo_errors;

int demo_open(const char *path, int flags);    // open a session
void demo_close(void);
char *demo_describe(demo_size *size);
static int demo_private(int x);
void demo_log(const char *fmt, ...);

#endif
"#;

    let (decls, diags) = parse(source);

    let e = &decls.enums["demo_state"];
    assert_eq!(e.members.len(), 3);
    assert_eq!(e.members[1], ("DEMO_RUNNING".to_string(), Some("1".to_string())));

    let t = &decls.typedefs["demo_size"];
    assert_eq!(t.reference, "struct <anonymous-inside>demo_size");
    assert_eq!(decls.structs["<anonymous-inside>demo_size"].members.len(), 2);

    let cb = &decls.typedefs["demo_notify"];
    assert_eq!(cb.reference, "void");
    assert_eq!(
        cb.params.as_deref(),
        Some(&["int code".to_string(), "void * data".to_string()][..])
    );

    let ops = &decls.structs["demo_ops"];
    assert!(matches!(&ops.members[0], StructMember::FnPtr { name, .. } if name == "start"));
    assert_eq!(ops.members[1].name(), "id");

    assert_eq!(decls.globals["demo_errors"].ctype, "int");

    let open = &decls.functions["demo_open"];
    assert_eq!(open.ret_type, "int");
    assert_eq!(open.parameters.len(), 2);
    assert_eq!(open.parameters[0].ctype(), "const char *");

    assert_eq!(decls.functions["demo_close"].parameters, vec![Parameter::Bare("void".into())]);
    assert_eq!(decls.functions["demo_describe"].ret_type, "char *");

    // static dropped entirely, variadic recorded but flagged later by codegen
    assert!(!decls.functions.contains_key("demo_private"));
    assert!(decls.functions["demo_log"].is_variadic());

    // nothing in this header is unrecognized
    assert!(!diags.any(|d| matches!(d, Diagnostic::UnrecognizedNode { .. })));
}

#[test]
fn test_declaration_count_survives_formatting() {
    // one declaration per statement regardless of line breaks and comments
    let compact = "int a(void); int b(void); int c(void);";
    let spread = "int a(\n    void\n); /* x */\nint b(void)\n;\nint c(void);";
    let (d1, _) = parse(compact);
    let (d2, _) = parse(spread);
    assert_eq!(d1.functions.len(), 3);
    assert_eq!(d2.functions.len(), 3);
}

#[test]
fn test_nested_anonymous_struct_chain() {
    let (decls, _) = parse("struct outer { struct { int deep; } inner; };");
    let outer = &decls.structs["outer"];
    assert_eq!(outer.members.len(), 1);
    assert_eq!(outer.members[0].name(), "inner");
    assert_eq!(outer.members[0].ctype(), "struct <anonymous-inside>outer");
    assert!(decls.structs.contains_key("<anonymous-inside>outer"));
}

#[test]
fn test_struct_forward_then_definition_merge() {
    let (decls, _) = parse("struct widget;\nstruct widget { int kind; };");
    assert_eq!(decls.structs["widget"].members.len(), 1);
}

#[test]
fn test_function_pointer_parameter_with_unnamed_slot() {
    let (decls, _) = parse("void on_event(void (*)(int), int prio);");
    let f = &decls.functions["on_event"];
    assert_eq!(
        f.parameters[0],
        Parameter::FnPtr {
            ctype: "void".into(),
            name: None,
            params: vec!["int".into()],
        }
    );
}

#[test]
fn test_malformed_close_bracket_is_fatal() {
    let mut diags = Diagnostics::new();
    assert!(parse_header("int x; ) ;", None, &mut diags).is_err());
}

#[test]
fn test_unbalanced_open_is_fatal() {
    let mut diags = Diagnostics::new();
    assert!(parse_header("struct nope { int x;", None, &mut diags).is_err());
}
