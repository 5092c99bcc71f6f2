//! Declaration classification
//!
//! Walks each completed tree node and turns it into one of the five
//! declaration kinds, resolving pointer syntax, anonymous aggregates,
//! function-pointer members and forward declarations along the way.
//! Classification is shape-driven and first-match-wins; shapes that match
//! nothing are reported as diagnostics and dropped.
//!
//! # Two-phase typedefs
//!
//! `typedef struct { ... } Name;` arrives as two nodes: the bracketed
//! `typedef struct { ... }` (whose declarator is still unknown) and the
//! trailing `Name` leaf. The interpreter is an explicit two-state machine:
//! classifying the first node parks it as [`TypedefState::Awaiting`], and the
//! next classified node either completes it (splicing its name into the
//! typedef, classifying the inner aggregate, then the typedef itself) or
//! discards it. The state is consumed on every call, so a pending typedef
//! never outlives its immediate successor.

use crate::diag::{Diagnostic, Diagnostics};

use super::decl::{
    Classified, Declarations, EnumDecl, FunctionDecl, Parameter, StructDecl, StructMember,
    TypedefDecl, VariableDecl,
};
use super::tree::{Child, NodeArena, NodeId};

/// Lookback state for two-phase typedef resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedefState {
    Complete,
    /// A `typedef <aggregate> { ... }` waiting for its declarator node.
    Awaiting(NodeId),
}

/// Classifies completed tree nodes into declaration entities.
#[derive(Debug)]
pub struct DeclInterpreter {
    state: TypedefState,
}

impl DeclInterpreter {
    pub fn new() -> Self {
        Self {
            state: TypedefState::Complete,
        }
    }

    /// Classify one completed node, updating `decls` and reporting skipped
    /// shapes into `diags`. Returns what was classified, or `None` for
    /// structurally uninteresting nodes (extern "C" blocks, callback
    /// parameters, bodies of outer declarations).
    pub fn interpret(
        &mut self,
        arena: &mut NodeArena,
        decls: &mut Declarations,
        diags: &mut Diagnostics,
        node: NodeId,
    ) -> Option<Classified> {
        let prev = std::mem::replace(&mut self.state, TypedefState::Complete);
        self.interpret_with(arena, decls, diags, node, prev)
    }

    fn interpret_with(
        &mut self,
        arena: &mut NodeArena,
        decls: &mut Declarations,
        diags: &mut Diagnostics,
        node: NodeId,
        prev: TypedefState,
    ) -> Option<Classified> {
        let keyword = arena[node].parts.first().cloned();
        match keyword.as_deref() {
            Some("enum") => self.interpret_enum(arena, node, decls),
            Some("struct") => self.interpret_struct(arena, node, decls, diags),
            Some("typedef") => self.interpret_typedef(arena, node, decls, diags),
            _ => self.interpret_other(arena, node, decls, diags, prev),
        }
    }

    fn interpret_enum(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        decls: &mut Declarations,
    ) -> Option<Classified> {
        let name = match arena[node].parts.get(1) {
            Some(n) => n.clone(),
            None => anonymous_name(arena, node),
        };
        if arena[node].children.is_empty() {
            // Forward reference: keep any existing definition.
            decls
                .enums
                .entry(name.clone())
                .or_insert_with(|| EnumDecl::new(name.clone()));
            return Some(Classified::Enum(name));
        }

        let mut decl = EnumDecl::new(name.clone());
        let children = arena[node].children.clone();
        for child in &children {
            match child {
                // Parenthesized value expression: `A = (1 << 2)`.
                Child::Node(v) => {
                    let member = arena[*v].parts.first().cloned().unwrap_or_default();
                    let value = arena.flatten(*v, false);
                    decl.members.push((member, Some(value)));
                }
                Child::Group(g) if g.len() > 2 => {
                    decl.members.push((g[0].clone(), Some(g[2..].join(" "))));
                }
                Child::Group(g) => {
                    decl.members.push((g[0].clone(), None));
                }
            }
        }
        decls.enums.insert(name.clone(), decl);
        Some(Classified::Enum(name))
    }

    fn interpret_struct(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        decls: &mut Declarations,
        diags: &mut Diagnostics,
    ) -> Option<Classified> {
        let name = match arena[node].parts.get(1) {
            Some(n) => n.clone(),
            None => anonymous_name(arena, node),
        };
        if arena[node].children.is_empty() {
            decls
                .structs
                .entry(name.clone())
                .or_insert_with(|| StructDecl::new(name.clone()));
            return Some(Classified::Struct(name));
        }

        let mut decl = StructDecl::new(name.clone());
        // decl_name of a just-classified unnamed aggregate member, consumed
        // by the sibling that names an instance of it.
        let mut last_member: Option<String> = None;
        let children = arena[node].children.clone();
        for child in &children {
            match child {
                Child::Node(v) => {
                    let v = *v;
                    let vparts = arena[v].parts.clone();
                    let has_children = !arena[v].children.is_empty();
                    let is_aggregate = matches!(
                        vparts.first().map(String::as_str),
                        Some("struct") | Some("enum")
                    );

                    if is_aggregate && vparts.len() <= 2 {
                        last_member = self
                            .interpret_with(arena, decls, diags, v, TypedefState::Complete)
                            .map(|c| c.decl_name(decls));
                    } else if vparts.len() >= 2 && !has_children {
                        // `type name;`
                        let raw_type = vparts[..vparts.len() - 1].join(" ");
                        let raw_name = &vparts[vparts.len() - 1];
                        let (ctype, mname) = pointer_fix(&raw_type, raw_name);
                        if !ctype.is_empty() && !ctype.starts_with('*') {
                            decl.members.push(StructMember::Field { ctype, name: mname });
                        } else if let Some(agg) = &last_member {
                            let full = if ctype.is_empty() {
                                agg.clone()
                            } else {
                                format!("{} {}", agg, ctype)
                            };
                            decl.members.push(StructMember::Field { ctype: full, name: mname });
                        } else if let Some(prev) = decl.members.last() {
                            // multi-declarator statement: inherit the
                            // previous member's base type, stars dropped
                            let base = prev.ctype().replace('*', "").trim().to_string();
                            decl.members.push(StructMember::Field {
                                ctype: format!("{}{}", base, ctype),
                                name: mname,
                            });
                        } else {
                            diags.report(Diagnostic::UnsupportedMember {
                                strukt: name.clone(),
                                member: arena.flatten(v, true),
                            });
                        }
                        last_member = None;
                    } else if let Some(agg) = last_member.take() {
                        // `struct { ... } instance;`
                        let raw_name = vparts.first().cloned().unwrap_or_default();
                        let (ctype, mname) = pointer_fix(&agg, &raw_name);
                        decl.members.push(StructMember::Field { ctype, name: mname });
                    } else if vparts.len() == 1 && !has_children && !decl.members.is_empty() {
                        // `int a, b;` — the `b` leaf
                        let base = decl
                            .members
                            .last()
                            .map(|m| m.ctype().replace('*', "").trim().to_string())
                            .unwrap_or_default();
                        decl.members.push(StructMember::Field {
                            ctype: base,
                            name: vparts[0].clone(),
                        });
                        last_member = None;
                    } else if !vparts.is_empty()
                        && matches!(arena[v].children.first(), Some(Child::Group(g))
                            if g.first().map(String::as_str) == Some("*"))
                    {
                        // function pointer member: `ret (*name)(params);`
                        let ctype = vparts.join(" ");
                        let inner = arena[v].children.clone();
                        let mname = match inner.first() {
                            Some(Child::Group(g)) => g[1..].concat(),
                            _ => String::new(),
                        };
                        let params = convert_param_children(arena, &inner[1..]);
                        decl.members.push(StructMember::FnPtr {
                            ctype,
                            name: mname,
                            params,
                        });
                        last_member = None;
                    } else {
                        diags.report(Diagnostic::UnsupportedMember {
                            strukt: name.clone(),
                            member: arena.flatten(v, true),
                        });
                    }
                }
                Child::Group(g) => {
                    // comma-separated declarator
                    let raw_name = &g[g.len() - 1];
                    let raw_type = g[..g.len() - 1].join(" ");
                    let (ctype, mname) = pointer_fix(&raw_type, raw_name);
                    if !ctype.is_empty() && !ctype.starts_with('*') {
                        decl.members.push(StructMember::Field { ctype, name: mname });
                        // last_member deliberately survives a plain member
                        // in a comma list
                        continue;
                    } else if let Some(agg) = &last_member {
                        // `struct { ... } a, b;`
                        let full = if ctype.is_empty() {
                            agg.clone()
                        } else {
                            format!("{} {}", agg, ctype)
                        };
                        decl.members.push(StructMember::Field { ctype: full, name: mname });
                        last_member = None;
                    } else if let Some(prev) = decl.members.last() {
                        // `unsigned long *a, **b;`
                        let base = prev.ctype().replace('*', "").trim().to_string();
                        decl.members.push(StructMember::Field {
                            ctype: format!("{}{}", base, g[..g.len() - 1].join(" ")),
                            name: mname,
                        });
                        last_member = None;
                    } else {
                        diags.report(Diagnostic::UnsupportedMember {
                            strukt: name.clone(),
                            member: g.join(" "),
                        });
                    }
                }
            }
        }
        decls.structs.insert(name.clone(), decl);
        Some(Classified::Struct(name))
    }

    fn interpret_typedef(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        decls: &mut Declarations,
        diags: &mut Diagnostics,
    ) -> Option<Classified> {
        let parts = arena[node].parts.clone();
        if parts.len() < 3 && arena[node].children.is_empty() {
            diags.report(Diagnostic::TypedefForward {
                detail: parts.join(" "),
            });
            return None;
        }

        if arena[node].children.is_empty() {
            // direct alias: `typedef A B;`
            let raw_name = &parts[parts.len() - 1];
            let raw_ref = parts[1..parts.len() - 1].join(" ");
            let (reference, name) = pointer_fix(&raw_ref, raw_name);
            let decl = TypedefDecl {
                name: name.clone(),
                reference,
                params: None,
            };
            decls.typedefs.insert(name.clone(), decl);
            return Some(Classified::Typedef(name));
        }

        if let Some(Child::Group(g)) = arena[node].children.first() {
            if g.first().map(String::as_str) == Some("*") {
                // function-pointer typedef: `typedef ret (*name)(params);`
                let name: String = g[1..].concat();
                let ctype = parts[1..].join(" ");
                let children = arena[node].children.clone();
                let params = convert_param_children(arena, &children[1..]);
                let decl = TypedefDecl {
                    name: name.clone(),
                    reference: ctype,
                    params: Some(params),
                };
                decls.typedefs.insert(name.clone(), decl);
                return Some(Classified::Typedef(name));
            }
        }

        // `typedef struct { ... }` — the declarator arrives with the next
        // node; park this one.
        self.state = TypedefState::Awaiting(node);
        None
    }

    /// Functions, extern globals, typedef continuations, and everything the
    /// leading-keyword rules did not claim.
    fn interpret_other(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        decls: &mut Declarations,
        diags: &mut Diagnostics,
        prev: TypedefState,
    ) -> Option<Classified> {
        if let TypedefState::Awaiting(pending) = prev {
            let fnptr_shaped = matches!(arena[node].children.first(), Some(Child::Group(g))
                if g.first().map(String::as_str) == Some("*"));
            if !fnptr_shaped {
                return self.merge_pending_typedef(arena, decls, diags, pending, node);
            }
        }

        let parts = arena[node].parts.clone();
        if !parts.is_empty() && !arena[node].children.is_empty() {
            // value expressions inside enum bodies reach here as nodes
            if parts.iter().any(|p| p == "=") {
                return None;
            }
            // `extern "C" { ... }` and similar linkage blocks
            if parts[0] == "extern"
                && parts.get(1).map(|p| p.starts_with('"')).unwrap_or(false)
            {
                return None;
            }
            // nothing inside a struct/enum/typedef body is a prototype
            let mut walk = Some(node);
            while let Some(t) = walk {
                let parent = arena[t].parent;
                if let Some(par) = parent {
                    if matches!(
                        arena[par].parts.first().map(String::as_str),
                        Some("struct") | Some("enum") | Some("typedef")
                    ) {
                        return None;
                    }
                }
                walk = parent;
            }
            // `(* name)` with a parent is a callback parameter of the outer
            // declaration; the outer pass picks it up
            if arena[node].parent.is_some()
                && matches!(arena[node].children.first(), Some(Child::Group(g))
                    if g.first().map(String::as_str) == Some("*"))
            {
                return None;
            }

            let raw_name = &parts[parts.len() - 1];
            let raw_type = parts[..parts.len() - 1].join(" ");
            let (ret_type, name) = pointer_fix(&raw_type, raw_name);
            let mut func = FunctionDecl::new(name.clone(), ret_type);
            let children = arena[node].children.clone();
            for child in &children {
                match child {
                    Child::Node(v) => {
                        let v = *v;
                        let inner = arena[v].children.clone();
                        if let Some(Child::Group(g)) = inner.first() {
                            if g.first().map(String::as_str) == Some("*") {
                                // function-pointer parameter
                                let ctype = arena[v].parts.join(" ");
                                let pname = if g.len() == 1 {
                                    None
                                } else {
                                    Some(g[1..].concat())
                                };
                                let params = convert_param_children(arena, &inner[1..]);
                                func.parameters.push(Parameter::FnPtr {
                                    ctype,
                                    name: pname,
                                    params,
                                });
                            }
                        }
                    }
                    Child::Group(g) => {
                        if g.len() == 1 {
                            // `void`, `...`, or a bare type
                            func.parameters.push(Parameter::Bare(g[0].clone()));
                        } else {
                            let raw_name = &g[g.len() - 1];
                            let raw_type = g[..g.len() - 1].join(" ");
                            let (ctype, pname) = pointer_fix(&raw_type, raw_name);
                            if pname.is_empty() {
                                func.parameters.push(Parameter::Bare(ctype));
                            } else {
                                func.parameters.push(Parameter::Named { ctype, name: pname });
                            }
                        }
                    }
                }
            }
            decls.functions.insert(func.name.clone(), func);
            return Some(Classified::Function(name));
        }

        if parts.first().map(String::as_str) == Some("extern") {
            let raw_name = &parts[parts.len() - 1];
            let raw_type = parts
                .get(1..parts.len() - 1)
                .map(|s| s.join(" "))
                .unwrap_or_default();
            let (ctype, name) = pointer_fix(&raw_type, raw_name);
            let decl = VariableDecl {
                name: name.clone(),
                ctype,
            };
            decls.globals.insert(name.clone(), decl);
            return Some(Classified::Variable(name));
        }

        diags.report(Diagnostic::UnrecognizedNode {
            detail: arena.flatten(node, true),
        });
        None
    }

    /// Complete a parked `typedef <aggregate> { ... }` with the declarator
    /// node that followed it.
    fn merge_pending_typedef(
        &mut self,
        arena: &mut NodeArena,
        decls: &mut Declarations,
        diags: &mut Diagnostics,
        pending: NodeId,
        node: NodeId,
    ) -> Option<Classified> {
        let inner_parts: Vec<String> = arena[pending].parts[1..].to_vec();
        let inner_children = std::mem::take(&mut arena[pending].children);

        let node_parts = arena[node].parts.clone();
        let mut name = node_parts.last().cloned().unwrap_or_default();
        let mut declarator: Vec<String> =
            node_parts[..node_parts.len().saturating_sub(1)].to_vec();
        while name.starts_with('*') {
            declarator.push("*".to_string());
            name.remove(0);
        }
        declarator.push(name);

        // The typedef node takes its final declarator before the inner
        // aggregate is classified: anonymous-name synthesis walks up to it.
        let mut parts = vec!["typedef".to_string()];
        parts.extend(declarator.iter().cloned());
        arena[pending].parts = parts;

        let inner = arena.alloc(Some(pending), inner_parts);
        arena[inner].children = inner_children;
        let classified =
            self.interpret_with(arena, decls, diags, inner, TypedefState::Complete);
        let Some(classified) = classified else {
            diags.report(Diagnostic::TypedefUnresolved {
                detail: arena.flatten(pending, true),
            });
            return None;
        };

        let mut parts = vec!["typedef".to_string(), classified.decl_name(decls)];
        parts.extend(declarator);
        arena[pending].parts = parts;
        self.interpret_with(arena, decls, diags, pending, TypedefState::Complete)
    }
}

impl Default for DeclInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Move leading `*`s from a declarator name onto its type:
/// `("int", "**x")` → `("int **", "x")`. Idempotent on already-normalized
/// pairs.
pub fn pointer_fix(ctype: &str, name: &str) -> (String, String) {
    let mut ctype = ctype.to_string();
    let mut name = name;
    let mut first = true;
    while let Some(rest) = name.strip_prefix('*') {
        if first {
            ctype.push(' ');
            first = false;
        }
        ctype.push('*');
        name = rest;
    }
    (ctype, name.to_string())
}

/// Render a function-pointer node back to C parameter text:
/// `ret (*name)(args)`.
fn convert_func_params(arena: &NodeArena, id: NodeId) -> String {
    let head = match arena[id].children.first() {
        Some(Child::Group(g)) => g.concat(),
        _ => String::new(),
    };
    let rest = arena[id].children.get(1..).unwrap_or(&[]);
    let params = convert_param_children(arena, rest);
    format!(
        "{} ({})({})",
        arena[id].parts.join(" "),
        head,
        params.join(", ")
    )
}

fn convert_param_children(arena: &NodeArena, children: &[Child]) -> Vec<String> {
    children
        .iter()
        .map(|c| match c {
            Child::Node(id) => convert_func_params(arena, *id),
            Child::Group(g) => g.join(" "),
        })
        .collect()
}

/// Synthesize a name for an anonymous aggregate from its ancestor chain:
/// one `<anonymous-inside>` per unnamed level, then the nearest named
/// ancestor's trailing part.
fn anonymous_name(arena: &NodeArena, node: NodeId) -> String {
    let mut name = String::new();
    let mut walk = Some(node);
    while let Some(id) = walk {
        if arena[id].parts.len() != 1 {
            break;
        }
        name.push_str("<anonymous-inside>");
        walk = arena[id].parent;
    }
    if let Some(id) = walk {
        if let Some(last) = arena[id].parts.last() {
            name.push_str(last);
        }
    }
    name
}
