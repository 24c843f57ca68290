//! aarch64-linux backend.
//!
//! A deliberately minimal target: it lowers `fn main(): u32 { return N }`
//! and nothing more. Anything richer reports [`CodegenError::Unsupported`]
//! rather than emitting wrong code. Linux on aarch64 uses syscall 93 for
//! exit, the syscall number in `w8`, and `svc #0` to trap; integer
//! arguments travel in `x0..x5`.

use olangc_par::{Expr, Stmt, TranslationUnit};
use olangc_sem::ScopeTree;

use crate::CodegenError;

const SYS_EXIT: u32 = 93;

pub fn emit_program(unit: &TranslationUnit, _tree: &ScopeTree) -> Result<String, CodegenError> {
    let main = unit
        .decls
        .iter()
        .find(|f| f.name.as_str() == "main")
        .ok_or(CodegenError::MissingMain)?;

    if unit.decls.len() != 1 {
        return Err(CodegenError::Unsupported(
            "the aarch64 backend supports a single 'main' function",
        ));
    }
    if !main.params.is_empty() {
        return Err(CodegenError::Unsupported(
            "the aarch64 backend does not support parameters",
        ));
    }

    let exit_code = match &main.body.stmts[..] {
        [Stmt::Return(ret)] => match &ret.expr {
            Expr::Literal(lit) => lit.value,
            _ => {
                return Err(CodegenError::Unsupported(
                    "the aarch64 backend only lowers 'return <number>'",
                ))
            }
        },
        _ => {
            return Err(CodegenError::Unsupported(
                "the aarch64 backend only lowers 'return <number>'",
            ))
        }
    };

    let mut out = String::new();
    out.push_str(".text\n.globl _start\n\n_start:\n");
    out.push_str("    bl main\n");
    out.push_str(&format!("    mov w8, #{SYS_EXIT}\n"));
    out.push_str("    svc #0\n");
    out.push_str("main:\n");
    out.push_str(&format!("    mov x0, #{exit_code}\n"));
    out.push_str("    ret\n");

    Ok(out)
}
