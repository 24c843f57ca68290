//! olangc-gen - Native code generation.
//!
//! Walks the resolved AST and emits GNU-assembler AT&T-syntax text for
//! the selected target. The generator reads the AST and the scope tree
//! and writes nothing back; it assumes resolution is complete and treats
//! violations of that contract as compiler bugs (assertions), while
//! constructs the backend genuinely does not support surface as
//! [`CodegenError`]s.

pub mod aarch64;
pub mod x86_64;

use olangc_par::TranslationUnit;
use olangc_sem::ScopeTree;
use thiserror::Error;

/// Target architecture selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Arch {
    #[default]
    X86_64,
    Aarch64,
}

impl Arch {
    pub fn from_name(name: &str) -> Option<Arch> {
        match name {
            "x86_64" => Some(Arch::X86_64),
            "aarch64" => Some(Arch::Aarch64),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("program has no 'main' function")]
    MissingMain,
    #[error("call to '{callee}' passes {count} arguments; at most 6 are supported")]
    TooManyArgs { callee: String, count: usize },
    #[error("function '{name}' takes {count} parameters; at most 6 are supported")]
    TooManyParams { name: String, count: usize },
    #[error("{0}")]
    Unsupported(&'static str),
}

/// Emit the assembly text for a whole translation unit.
pub fn emit(
    unit: &TranslationUnit,
    scopes: &ScopeTree,
    arch: Arch,
) -> Result<String, CodegenError> {
    match arch {
        Arch::X86_64 => x86_64::emit_program(unit, scopes),
        Arch::Aarch64 => aarch64::emit_program(unit, scopes),
    }
}
