//! C header declaration parser
//!
//! This module recovers a structural model of a header's declarations:
//! - [`lexer`]: tokenization (header text → flat token stream)
//! - [`tree`]: bracket-structured grouping (tokens → node arena)
//! - [`interpret`]: classification (nodes → declaration entities)
//! - [`decl`]: the declaration entities and their five-table map
//!
//! # Not a C parser
//!
//! The input is assumed preprocessor-normalized: directives are stripped,
//! not expanded, types are not resolved across files, and no semantic
//! validation happens. Constructs the classifier does not recognize are
//! reported and skipped, never fatal; only a structurally unbalanced token
//! stream aborts the run.

pub mod decl;
pub mod interpret;
pub mod lexer;
pub mod tree;

use regex::Regex;

use crate::diag::Diagnostics;
use decl::Declarations;
use interpret::DeclInterpreter;
use tree::{TreeBuilder, TreeError};

/// Run the full pipeline over one header: tokenize, build the tree, and
/// classify every completed node, in source order.
pub fn parse_header(
    source: &str,
    ignore_tokens: Option<&Regex>,
    diags: &mut Diagnostics,
) -> Result<Declarations, TreeError> {
    let tokens = lexer::tokenize(source, ignore_tokens);
    let mut builder = TreeBuilder::new();
    let mut interp = DeclInterpreter::new();
    let mut decls = Declarations::new();

    for token in &tokens {
        if let Some(done) = builder.offer(token)? {
            interp.interpret(builder.arena_mut(), &mut decls, diags, done);
        }
    }
    builder.finish()?;

    Ok(decls)
}

#[cfg(test)]
mod tests {
    use super::decl::{Parameter, StructMember};
    use super::*;

    fn parse(source: &str) -> (Declarations, Diagnostics) {
        let mut diags = Diagnostics::new();
        let decls = parse_header(source, None, &mut diags).expect("parse failed");
        (decls, diags)
    }

    #[test]
    fn test_function_prototype() {
        let (decls, _) = parse("int add(int a, int b);");
        let f = &decls.functions["add"];
        assert_eq!(f.ret_type, "int");
        assert_eq!(
            f.parameters,
            vec![
                Parameter::Named {
                    ctype: "int".into(),
                    name: "a".into()
                },
                Parameter::Named {
                    ctype: "int".into(),
                    name: "b".into()
                },
            ]
        );
    }

    #[test]
    fn test_pointer_return_and_unnamed_parameter() {
        let (decls, _) = parse("char *strdup(const char *);");
        let f = &decls.functions["strdup"];
        assert_eq!(f.ret_type, "char *");
        assert_eq!(f.parameters, vec![Parameter::Bare("const char *".into())]);
    }

    #[test]
    fn test_void_parameter_list() {
        let (decls, _) = parse("void init(void);");
        let f = &decls.functions["init"];
        assert_eq!(f.parameters, vec![Parameter::Bare("void".into())]);
    }

    #[test]
    fn test_variadic_parameter_recorded() {
        let (decls, _) = parse("void log_msg(const char *fmt, ...);");
        let f = &decls.functions["log_msg"];
        assert!(f.is_variadic());
    }

    #[test]
    fn test_function_pointer_parameter() {
        let (decls, _) = parse("void run(void (*cb)(int code), int x);");
        let f = &decls.functions["run"];
        assert_eq!(
            f.parameters,
            vec![
                Parameter::FnPtr {
                    ctype: "void".into(),
                    name: Some("cb".into()),
                    params: vec!["int code".into()],
                },
                Parameter::Named {
                    ctype: "int".into(),
                    name: "x".into()
                },
            ]
        );
    }

    #[test]
    fn test_enum_with_values() {
        let (decls, _) = parse("enum color { RED, GREEN = 2, BLUE = (1 << 3) };");
        let e = &decls.enums["color"];
        assert_eq!(e.members.len(), 3);
        assert_eq!(e.members[0], ("RED".to_string(), None));
        assert_eq!(e.members[1], ("GREEN".to_string(), Some("2".to_string())));
        assert_eq!(e.members[2].0, "BLUE");
        let value = e.members[2].1.as_deref().unwrap();
        assert!(value.contains("1 << 3"), "value was {:?}", value);
    }

    #[test]
    fn test_enum_forward_then_definition() {
        let (decls, _) = parse("enum state;\nenum state { ON, OFF };");
        assert_eq!(decls.enums["state"].members.len(), 2);
    }

    #[test]
    fn test_struct_members() {
        let (decls, _) = parse("struct point { int x; int y; };");
        let s = &decls.structs["point"];
        assert_eq!(
            s.members,
            vec![
                StructMember::Field {
                    ctype: "int".into(),
                    name: "x".into()
                },
                StructMember::Field {
                    ctype: "int".into(),
                    name: "y".into()
                },
            ]
        );
    }

    #[test]
    fn test_struct_function_pointer_member() {
        let (decls, _) = parse("struct ops { void (*exec)(int flags); int id; };");
        let s = &decls.structs["ops"];
        assert_eq!(
            s.members[0],
            StructMember::FnPtr {
                ctype: "void".into(),
                name: "exec".into(),
                params: vec!["int flags".into()],
            }
        );
        assert_eq!(
            s.members[1],
            StructMember::Field {
                ctype: "int".into(),
                name: "id".into()
            }
        );
    }

    #[test]
    fn test_struct_multi_declarator_inherits_base_type() {
        // The inherited type is the previous member's type with stars
        // removed; `int *a, b;` therefore gives `b` the base type `int`.
        let (decls, _) = parse("struct v { int *a, b; };");
        let s = &decls.structs["v"];
        assert_eq!(s.members[0].ctype(), "int *");
        assert_eq!(s.members[0].name(), "a");
        assert_eq!(s.members[1].name(), "b");
        assert!(s.members[1].ctype().starts_with("int"));
        assert!(!s.members[1].ctype().contains('*'));
    }

    #[test]
    fn test_typedef_direct_alias() {
        let (decls, _) = parse("typedef unsigned long size_type;");
        let t = &decls.typedefs["size_type"];
        assert_eq!(t.reference, "unsigned long");
        assert!(t.params.is_none());
    }

    #[test]
    fn test_typedef_function_pointer() {
        let (decls, _) = parse("typedef void (*callback)(int a, int b);");
        let t = &decls.typedefs["callback"];
        assert_eq!(t.reference, "void");
        assert_eq!(
            t.params.as_deref(),
            Some(&["int a".to_string(), "int b".to_string()][..])
        );
    }

    #[test]
    fn test_typedef_anonymous_struct() {
        let (decls, _) = parse("typedef struct { int x; int y; } Point;");
        let t = &decls.typedefs["Point"];
        assert_eq!(t.reference, "struct <anonymous-inside>Point");
        let s = &decls.structs["<anonymous-inside>Point"];
        assert_eq!(s.members.len(), 2);
        assert_eq!(s.members[0].ctype(), "int");
        assert_eq!(s.members[1].ctype(), "int");
    }

    #[test]
    fn test_typedef_named_struct() {
        let (decls, _) = parse("typedef struct list_node { int v; } ListNode;");
        assert_eq!(decls.typedefs["ListNode"].reference, "struct list_node");
        assert!(decls.structs.contains_key("list_node"));
    }

    #[test]
    fn test_typedef_anonymous_enum() {
        let (decls, _) = parse("typedef enum { OK, FAIL } result_t;");
        let t = &decls.typedefs["result_t"];
        assert_eq!(t.reference, "enum <anonymous-inside>result_t");
        assert_eq!(decls.enums["<anonymous-inside>result_t"].members.len(), 2);
    }

    #[test]
    fn test_typedef_forward_reported() {
        let (decls, diags) = parse("typedef opaque_t;");
        assert!(decls.typedefs.is_empty());
        assert!(diags.any(|d| matches!(
            d,
            crate::diag::Diagnostic::TypedefForward { .. }
        )));
    }

    #[test]
    fn test_extern_variable() {
        let (decls, _) = parse("extern int global_count;\nextern const char *version;");
        assert_eq!(decls.globals["global_count"].ctype, "int");
        assert_eq!(decls.globals["version"].ctype, "const char *");
    }

    #[test]
    fn test_extern_c_block_ignored() {
        let (decls, diags) = parse("extern \"C\" { int inside(void); }");
        assert!(decls.functions.contains_key("inside"));
        assert!(!diags.any(|d| matches!(
            d,
            crate::diag::Diagnostic::UnrecognizedNode { .. }
        )));
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let (decls, _) = parse("int twice(int a);\nint twice(int a, int b);");
        assert_eq!(decls.functions["twice"].parameters.len(), 2);
    }

    #[test]
    fn test_unrecognized_is_reported_not_fatal() {
        let (decls, diags) = parse("what even is this;\nint fine(void);");
        assert!(decls.functions.contains_key("fine"));
        assert!(!diags.is_empty());
    }
}
