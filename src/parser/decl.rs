//! Declaration entities recovered from a header
//!
//! These are the outputs of the declaration interpreter: plain data, created
//! once and read by the code generator. Types are carried as normalized C
//! type strings (`"const char *"`), not as a resolved type graph — the
//! generator only ever needs to print them back and look them up in the
//! formatter table.

use std::fmt;

use rustc_hash::FxHashMap;

/// `enum name { A, B = expr };`
#[derive(Debug, Clone, Default)]
pub struct EnumDecl {
    pub name: String,
    /// Member name and optional value expression, in source order.
    pub members: Vec<(String, Option<String>)>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn decl_name(&self) -> String {
        format!("enum {}", self.name)
    }
}

impl fmt::Display for EnumDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self
            .members
            .iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{} = {}", name, v),
                None => name.clone(),
            })
            .collect();
        write!(f, "enum {} {{{}}};", self.name, members.join(", "))
    }
}

/// One struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructMember {
    Field {
        ctype: String,
        name: String,
    },
    /// `ret (*name)(params);`
    FnPtr {
        ctype: String,
        name: String,
        params: Vec<String>,
    },
}

impl StructMember {
    pub fn ctype(&self) -> &str {
        match self {
            StructMember::Field { ctype, .. } | StructMember::FnPtr { ctype, .. } => ctype,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StructMember::Field { name, .. } | StructMember::FnPtr { name, .. } => name,
        }
    }
}

/// `struct name { ... };` — anonymous structs carry a synthesized name.
#[derive(Debug, Clone, Default)]
pub struct StructDecl {
    pub name: String,
    pub members: Vec<StructMember>,
}

impl StructDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn decl_name(&self) -> String {
        format!("struct {}", self.name)
    }
}

impl fmt::Display for StructDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self
            .members
            .iter()
            .map(|m| match m {
                StructMember::Field { ctype, name } => format!("{} {};", ctype, name),
                StructMember::FnPtr { ctype, name, params } => {
                    format!("{} (*{})({});", ctype, name, params.join(", "))
                }
            })
            .collect();
        write!(f, "struct {} {{{}}};", self.name, members.join(" "))
    }
}

/// `typedef reference name;` or `typedef ret (*name)(params);`
#[derive(Debug, Clone)]
pub struct TypedefDecl {
    pub name: String,
    pub reference: String,
    pub params: Option<Vec<String>>,
}

impl fmt::Display for TypedefDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(params) => write!(
                f,
                "typedef {} (*{})({});",
                self.reference,
                self.name,
                params.join(", ")
            ),
            None => write!(f, "typedef {} {};", self.reference, self.name),
        }
    }
}

/// One function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// Type with no name: `void`, `...`, or an unnamed parameter.
    Bare(String),
    Named {
        ctype: String,
        name: String,
    },
    /// `ret (*name)(params)`; the name may be absent until
    /// [`FunctionDecl::assign_param_names`] runs.
    FnPtr {
        ctype: String,
        name: Option<String>,
        params: Vec<String>,
    },
}

impl Parameter {
    pub fn ctype(&self) -> &str {
        match self {
            Parameter::Bare(ctype) => ctype,
            Parameter::Named { ctype, .. } => ctype,
            Parameter::FnPtr { ctype, .. } => ctype,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Parameter::Bare(_) => None,
            Parameter::Named { name, .. } => Some(name),
            Parameter::FnPtr { name, .. } => name.as_deref(),
        }
    }
}

/// A function prototype eligible for wrapping.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub ret_type: String,
    pub parameters: Vec<Parameter>,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, ret_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ret_type: ret_type.into(),
            parameters: Vec::new(),
        }
    }

    /// True when the prototype ends in `...` — such calls cannot be
    /// forwarded and no wrapper is generated.
    pub fn is_variadic(&self) -> bool {
        self.parameters
            .last()
            .map(|p| p.ctype() == "...")
            .unwrap_or(false)
    }

    /// Give every unnamed parameter a synthetic `<prefix>_par<index>` name
    /// so it can be forwarded by name. `void` stays unnamed.
    pub fn assign_param_names(&mut self, prefix: &str) {
        for (i, param) in self.parameters.iter_mut().enumerate() {
            let synthetic = format!("{}_par{}", prefix, i);
            match param {
                Parameter::Bare(ctype) if ctype.as_str() != "void" => {
                    let ctype = std::mem::take(ctype);
                    *param = Parameter::Named {
                        ctype,
                        name: synthetic,
                    };
                }
                Parameter::FnPtr { name, .. } if name.is_none() => {
                    *name = Some(synthetic);
                }
                _ => {}
            }
        }
    }

    /// Render the parameter list as it appears in a declaration.
    pub fn params_decl(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| match p {
                Parameter::Bare(ctype) => ctype.clone(),
                Parameter::Named { ctype, name } => format!("{} {}", ctype, name),
                Parameter::FnPtr { ctype, name, params } => format!(
                    "{} (*{})({})",
                    ctype,
                    name.as_deref().unwrap_or(""),
                    params.join(", ")
                ),
            })
            .collect();
        params.join(", ")
    }

    /// Render the comma-separated argument names for forwarding a call.
    /// Empty for `(void)` and for an empty parameter list. Parameters must
    /// already be named.
    pub fn params_names(&self) -> String {
        if self.parameters.is_empty() || self.parameters[0].ctype() == "void" {
            return String::new();
        }
        let names: Vec<&str> = self
            .parameters
            .iter()
            .map(|p| p.name().unwrap_or_default())
            .collect();
        names.join(", ")
    }
}

impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}({});", self.ret_type, self.name, self.params_decl())
    }
}

/// Top-level `extern` variable.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub ctype: String,
}

impl fmt::Display for VariableDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {};", self.ctype, self.name)
    }
}

/// The declaration table: five name-keyed maps produced by one run.
/// Redeclaration replaces the prior entry within its kind.
#[derive(Debug, Default)]
pub struct Declarations {
    pub enums: FxHashMap<String, EnumDecl>,
    pub structs: FxHashMap<String, StructDecl>,
    pub typedefs: FxHashMap<String, TypedefDecl>,
    pub functions: FxHashMap<String, FunctionDecl>,
    pub globals: FxHashMap<String, VariableDecl>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.enums.len()
            + self.structs.len()
            + self.typedefs.len()
            + self.functions.len()
            + self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What one classification produced; carries enough to name the declaration
/// when a typedef wraps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Enum(String),
    Struct(String),
    Typedef(String),
    Function(String),
    Variable(String),
}

impl Classified {
    /// The text used to reference this declaration as a type.
    pub fn decl_name(&self, decls: &Declarations) -> String {
        match self {
            Classified::Enum(name) => format!("enum {}", name),
            Classified::Struct(name) => format!("struct {}", name),
            Classified::Typedef(name) | Classified::Variable(name) => name.clone(),
            Classified::Function(name) => decls
                .functions
                .get(name)
                .map(|f| f.to_string())
                .unwrap_or_else(|| name.clone()),
        }
    }
}
