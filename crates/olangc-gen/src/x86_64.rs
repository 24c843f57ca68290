//! x86_64-linux backend.
//!
//! Expressions are lowered to a stack machine over registers: the RHS of
//! a binary operation is evaluated and pushed, the LHS is evaluated into
//! `%rax`, the RHS is popped into `%rcx`, and the operation tail is
//! applied. The emitter tracks the byte width of the value currently in
//! the accumulator and selects sub-registers accordingly: the width of a
//! binary operation is `max(width(lhs), width(rhs))`, except shifts,
//! which keep the LHS width.
//!
//! Stack frames: locals and parameters get slots at negative offsets
//! from `%rbp`. Slot allocation bumps forward through the frame and is
//! reset at block exit, so sibling blocks share the tail of the frame.
//! The reserved frame size is `8 + local_size(fn scope)` where
//! `local_size` is the symbol-size sum of a scope plus the maximum over
//! its children.
//!
//! Conditions are truthy when equal to 1 (`cmp $1` + `jnz`), matching
//! the 0/1 results the comparison and logical lowerings produce. `&&`
//! and `||` short-circuit through fresh `.L<n>` labels instead of the
//! push/pop scheme.

use std::cmp::max;

use olangc_par::{
    BinOp, Block, CallExpr, ElseBranch, Expr, FnDef, IfStmt, RefExpr, Stmt, TranslationUnit, Type,
    UnOp, VarAssign, VarDef, WhileStmt,
};
use olangc_sem::ScopeTree;
use olangc_util::SymbolId;
use rustc_hash::FxHashMap;

use crate::CodegenError;

const SYS_EXIT: u32 = 60;

/// SYSV integer argument registers, in order.
const ARG_REGS: [Reg; 6] = [Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

/// The registers the generator names, with sub-register selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rdi,
    Rsi,
    R8,
    R9,
}

impl Reg {
    /// The register name for a value of `bytes` width.
    fn sized(self, bytes: usize) -> &'static str {
        match self {
            Reg::Rax => match bytes {
                1 => "%al",
                2 => "%ax",
                4 => "%eax",
                _ => "%rax",
            },
            Reg::Rcx => match bytes {
                1 => "%cl",
                2 => "%cx",
                4 => "%ecx",
                _ => "%rcx",
            },
            Reg::Rdx => match bytes {
                1 => "%dl",
                2 => "%dx",
                4 => "%edx",
                _ => "%rdx",
            },
            Reg::Rdi => match bytes {
                1 => "%dil",
                2 => "%di",
                4 => "%edi",
                _ => "%rdi",
            },
            Reg::Rsi => match bytes {
                1 => "%sil",
                2 => "%si",
                4 => "%esi",
                _ => "%rsi",
            },
            Reg::R8 => match bytes {
                1 => "%r8b",
                2 => "%r8w",
                4 => "%r8d",
                _ => "%r8",
            },
            Reg::R9 => match bytes {
                1 => "%r9b",
                2 => "%r9w",
                4 => "%r9d",
                _ => "%r9",
            },
        }
    }
}

/// Emit the whole unit. `main` must exist; every function is emitted in
/// declaration order under a global label equal to its name.
pub fn emit_program(unit: &TranslationUnit, tree: &ScopeTree) -> Result<String, CodegenError> {
    if !unit.decls.iter().any(|f| f.name.as_str() == "main") {
        return Err(CodegenError::MissingMain);
    }

    let mut codegen = Codegen {
        tree,
        out: String::new(),
        offsets: FxHashMap::default(),
        base_offset: 0,
        label_index: 0,
    };

    codegen.emit_start_entrypoint();
    for f in &unit.decls {
        codegen.emit_function(f)?;
    }

    Ok(codegen.out)
}

struct Codegen<'a> {
    tree: &'a ScopeTree,
    out: String,
    /// Stack offset assigned to each symbol during emission, so
    /// references, assignments and address-of re-emit the same slot.
    offsets: FxHashMap<SymbolId, usize>,
    /// Next free frame offset; saved/restored around blocks.
    base_offset: usize,
    /// Per-unit label counter; labels are `.L<n>` starting at 1.
    label_index: usize,
}

impl<'a> Codegen<'a> {
    fn ins(&mut self, text: impl AsRef<str>) {
        self.out.push_str("    ");
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn label(&mut self, index: usize) {
        self.out.push_str(&format!(".L{index}:\n"));
    }

    fn next_label(&mut self) -> usize {
        self.label_index += 1;
        self.label_index
    }

    fn emit_start_entrypoint(&mut self) {
        self.out.push_str(".text\n.globl _start\n\n_start:\n");
        self.ins("call main");
        self.ins("mov %eax, %edi");
        self.ins(format!("mov ${SYS_EXIT}, %eax"));
        self.ins("syscall");
    }

    fn emit_function(&mut self, f: &FnDef) -> Result<(), CodegenError> {
        let fn_scope = f
            .scope
            .unwrap_or_else(|| unreachable!("function '{}' not resolved", f.name));

        if f.params.len() > ARG_REGS.len() {
            return Err(CodegenError::TooManyParams {
                name: f.name.as_str().to_owned(),
                count: f.params.len(),
            });
        }

        self.base_offset = 8;
        self.out.push_str(&format!("{}:\n", f.name));
        self.ins("push %rbp");
        self.ins("mov %rsp, %rbp");

        let frame_size = 8 + self.local_size(fn_scope);
        self.ins(format!("sub ${frame_size}, %rsp"));

        for (i, param) in f.params.iter().enumerate() {
            let symbol = self
                .tree
                .lookup_local(fn_scope, param.name)
                .unwrap_or_else(|| unreachable!("parameter '{}' not bound", param.name));
            let size = self.tree.symbol(symbol).ty.size_in_bytes();
            let offset = self.alloc_slot(symbol, size);
            self.ins(format!("mov {}, -{offset}(%rbp)", ARG_REGS[i].sized(size)));
        }

        self.emit_block(&f.body)
    }

    /// Symbol-size sum of `scope` plus the maximum over its children;
    /// sibling scopes reuse the same frame bytes.
    fn local_size(&self, scope: olangc_util::ScopeId) -> usize {
        let own: usize = self
            .tree
            .local_symbols(scope)
            .map(|symbol| self.tree.symbol(symbol).ty.size_in_bytes())
            .sum();
        let deepest_child = self
            .tree
            .children(scope)
            .iter()
            .map(|&child| self.local_size(child))
            .max()
            .unwrap_or(0);
        own + deepest_child
    }

    /// Reserve the next `size` frame bytes for `symbol`. The returned
    /// offset is the slot's low byte, so a store of `size` bytes at
    /// `-offset(%rbp)` stays inside the reserved frame.
    fn alloc_slot(&mut self, symbol: SymbolId, size: usize) -> usize {
        self.base_offset += size;
        let offset = self.base_offset;
        self.offsets.insert(symbol, offset);
        offset
    }

    fn emit_block(&mut self, block: &Block) -> Result<(), CodegenError> {
        let saved_offset = self.base_offset;
        for stmt in &block.stmts {
            self.emit_stmt(stmt)?;
        }
        self.base_offset = saved_offset;
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Return(ret) => {
                self.emit_expr(&ret.expr)?;
                self.ins("mov %rbp, %rsp");
                self.ins("pop %rbp");
                self.ins("ret");
                Ok(())
            }
            Stmt::VarDef(def) => self.emit_var_def(def),
            Stmt::Assign(assign) => self.emit_assign(assign),
            Stmt::If(if_stmt) => self.emit_if(if_stmt),
            Stmt::While(while_stmt) => self.emit_while(while_stmt),
            Stmt::Expr(expr) => {
                self.emit_expr(expr)?;
                Ok(())
            }
        }
    }

    fn emit_var_def(&mut self, def: &VarDef) -> Result<(), CodegenError> {
        let scope = def
            .scope
            .unwrap_or_else(|| unreachable!("variable '{}' not resolved", def.name));
        let symbol = self
            .tree
            .lookup_local(scope, def.name)
            .unwrap_or_else(|| unreachable!("variable '{}' not bound", def.name));

        self.emit_expr(&def.init)?;

        let size = self.tree.symbol(symbol).ty.size_in_bytes();
        let offset = self.alloc_slot(symbol, size);
        self.ins(format!("mov {}, -{offset}(%rbp)", Reg::Rax.sized(size)));
        Ok(())
    }

    fn emit_assign(&mut self, assign: &VarAssign) -> Result<(), CodegenError> {
        let symbol = self.ref_symbol(&assign.target);
        let offset = self.slot_offset(symbol);
        let size = self.tree.symbol(symbol).ty.size_in_bytes();

        self.emit_expr(&assign.value)?;
        self.ins(format!("mov {}, -{offset}(%rbp)", Reg::Rax.sized(size)));
        Ok(())
    }

    fn emit_if(&mut self, if_stmt: &IfStmt) -> Result<(), CodegenError> {
        let end_if_label = self.next_label();
        let end_else_label = self.next_label();

        self.emit_expr(&if_stmt.cond)?;
        self.ins("cmp $1, %rax");
        self.ins(format!("jnz .L{end_if_label}"));

        self.emit_block(&if_stmt.then_block)?;
        self.ins(format!("jmp .L{end_else_label}"));
        self.label(end_if_label);

        match &if_stmt.else_branch {
            Some(ElseBranch::ElseIf(nested)) => self.emit_if(nested)?,
            Some(ElseBranch::Else(block)) => self.emit_block(block)?,
            None => {}
        }

        self.label(end_else_label);
        Ok(())
    }

    fn emit_while(&mut self, while_stmt: &WhileStmt) -> Result<(), CodegenError> {
        let begin_label = self.next_label();
        let end_label = self.next_label();

        self.label(begin_label);
        self.emit_expr(&while_stmt.cond)?;
        self.ins("cmp $1, %rax");
        self.ins(format!("jnz .L{end_label}"));

        self.emit_block(&while_stmt.body)?;
        self.ins(format!("jmp .L{begin_label}"));
        self.label(end_label);
        Ok(())
    }

    /// Evaluate an expression into the accumulator and return the byte
    /// width of the produced value. Higher accumulator bytes are
    /// undefined.
    fn emit_expr(&mut self, expr: &Expr) -> Result<usize, CodegenError> {
        match expr {
            Expr::Literal(lit) => {
                self.ins(format!("mov ${}, %eax", lit.value));
                Ok(4)
            }
            Expr::Ref(r) => {
                let symbol = self.ref_symbol(r);
                let offset = self.slot_offset(symbol);
                let size = self.tree.symbol(symbol).ty.size_in_bytes();
                self.ins(format!("mov -{offset}(%rbp), {}", Reg::Rax.sized(size)));
                Ok(size)
            }
            Expr::Call(call) => self.emit_call(call),
            Expr::Unary(unary) => self.emit_unary(unary.op, &unary.operand),
            Expr::Binary(bin) => match bin.op {
                BinOp::And => self.emit_logical_and(&bin.lhs, &bin.rhs),
                BinOp::Or => self.emit_logical_or(&bin.lhs, &bin.rhs),
                _ => self.emit_binary(bin.op, &bin.lhs, &bin.rhs),
            },
        }
    }

    /// The push/pop scheme shared by every non-short-circuit operator:
    /// RHS first into the stack, LHS into the accumulator, RHS popped
    /// into `%rcx`, then the operation tail.
    fn emit_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<usize, CodegenError> {
        let rhs_size = self.emit_expr(rhs)?;
        self.ins("push %rax");
        let lhs_size = self.emit_expr(lhs)?;
        self.ins("pop %rcx");

        let size = max(lhs_size, rhs_size);
        let acc = Reg::Rax.sized(size);
        let scratch = Reg::Rcx.sized(size);

        match op {
            BinOp::Add => self.ins(format!("add {scratch}, {acc}")),
            BinOp::Sub => self.ins(format!("sub {scratch}, {acc}")),
            BinOp::Mul => self.ins(format!("mul {scratch}")),
            BinOp::Div => {
                self.ins("xor %rdx, %rdx");
                self.ins(format!("div {scratch}"));
            }
            BinOp::Rem => {
                self.ins("xor %rdx, %rdx");
                self.ins(format!("div {scratch}"));
                self.ins(format!("mov {}, {acc}", Reg::Rdx.sized(size)));
            }
            BinOp::BitAnd => self.ins(format!("and {scratch}, {acc}")),
            BinOp::BitOr => self.ins(format!("or {scratch}, {acc}")),
            BinOp::BitXor => self.ins(format!("xor {scratch}, {acc}")),
            BinOp::Shl => {
                let acc = Reg::Rax.sized(lhs_size);
                self.ins(format!("shl %cl, {acc}"));
                return Ok(lhs_size);
            }
            BinOp::Shr => {
                let acc = Reg::Rax.sized(lhs_size);
                self.ins(format!("shr %cl, {acc}"));
                return Ok(lhs_size);
            }
            BinOp::Eq => return Ok(self.emit_comparison("sete", size)),
            BinOp::Ne => return Ok(self.emit_comparison("setne", size)),
            BinOp::Lt => return Ok(self.emit_comparison("setl", size)),
            BinOp::Le => return Ok(self.emit_comparison("setle", size)),
            BinOp::Gt => return Ok(self.emit_comparison("setg", size)),
            BinOp::Ge => return Ok(self.emit_comparison("setge", size)),
            BinOp::And | BinOp::Or => unreachable!("short-circuit ops bypass the push/pop scheme"),
        }

        Ok(size)
    }

    fn emit_comparison(&mut self, set: &str, size: usize) -> usize {
        let acc = Reg::Rax.sized(size);
        let scratch = Reg::Rcx.sized(size);
        self.ins(format!("cmp {scratch}, {acc}"));
        self.ins(format!("{set} %al"));
        // movzb needs a wider destination than %al itself.
        self.ins(format!("movzb %al, {}", Reg::Rax.sized(max(size, 4))));
        size
    }

    /// `&&` evaluates the RHS only when the LHS is non-zero; the result
    /// is 0 or 1.
    fn emit_logical_and(&mut self, lhs: &Expr, rhs: &Expr) -> Result<usize, CodegenError> {
        let exit_label = self.next_label();

        self.emit_expr(lhs)?;
        self.ins("cmp $0, %rax");
        self.ins(format!("je .L{exit_label}"));

        self.emit_expr(rhs)?;
        self.ins("cmp $0, %rax");
        self.ins(format!("je .L{exit_label}"));
        self.ins("mov $1, %rax");
        self.label(exit_label);

        Ok(1)
    }

    /// `||` evaluates the RHS only when the LHS is zero; the result is
    /// 0 or 1.
    fn emit_logical_or(&mut self, lhs: &Expr, rhs: &Expr) -> Result<usize, CodegenError> {
        let true_label = self.next_label();
        let false_label = self.next_label();

        self.emit_expr(lhs)?;
        self.ins("cmp $0, %rax");
        self.ins(format!("jne .L{true_label}"));

        self.emit_expr(rhs)?;
        self.ins("cmp $0, %rax");
        self.ins(format!("je .L{false_label}"));

        self.label(true_label);
        self.ins("mov $1, %rax");
        self.label(false_label);

        Ok(1)
    }

    fn emit_unary(&mut self, op: UnOp, operand: &Expr) -> Result<usize, CodegenError> {
        match op {
            UnOp::Plus => self.emit_expr(operand),
            UnOp::Neg => {
                let size = self.emit_expr(operand)?;
                self.ins(format!("neg {}", Reg::Rax.sized(size)));
                Ok(size)
            }
            UnOp::BitNot => {
                let size = self.emit_expr(operand)?;
                self.ins(format!("not {}", Reg::Rax.sized(size)));
                Ok(size)
            }
            UnOp::Not => {
                let size = self.emit_expr(operand)?;
                self.ins(format!("cmp $0, {}", Reg::Rax.sized(size)));
                self.ins("sete %al");
                self.ins("movzb %al, %eax");
                Ok(1)
            }
            UnOp::AddrOf => {
                let Expr::Ref(r) = operand else {
                    return Err(CodegenError::Unsupported(
                        "address-of requires a variable operand",
                    ));
                };
                let symbol = self.ref_symbol(r);
                let offset = self.slot_offset(symbol);
                self.ins(format!("lea -{offset}(%rbp), %rax"));
                Ok(8)
            }
            UnOp::Deref => {
                let size = self.pointee_size(operand);
                self.emit_expr(operand)?;
                self.ins(format!("mov (%rax), {}", Reg::Rax.sized(size)));
                Ok(size)
            }
        }
    }

    /// Width of the value a dereference loads. Known exactly when the
    /// operand is a pointer-typed variable; other pointer expressions
    /// load a full word.
    fn pointee_size(&self, operand: &Expr) -> usize {
        if let Expr::Ref(r) = operand {
            let symbol = self.ref_symbol(r);
            if let Type::Ptr { pointee } = &self.tree.symbol(symbol).ty {
                return pointee.size_in_bytes();
            }
        }
        8
    }

    fn emit_call(&mut self, call: &CallExpr) -> Result<usize, CodegenError> {
        if call.args.len() > ARG_REGS.len() {
            return Err(CodegenError::TooManyArgs {
                callee: call.callee.as_str().to_owned(),
                count: call.args.len(),
            });
        }

        // Arguments go through the stack so an argument containing a
        // call cannot clobber registers already loaded.
        for arg in &call.args {
            self.emit_expr(arg)?;
            self.ins("push %rax");
        }
        for i in (0..call.args.len()).rev() {
            self.ins(format!("pop {}", ARG_REGS[i].sized(8)));
        }

        self.ins(format!("call {}", call.callee));

        let scope = call
            .scope
            .unwrap_or_else(|| unreachable!("call to '{}' not resolved", call.callee));
        let symbol = self
            .tree
            .lookup(scope, call.callee)
            .unwrap_or_else(|| unreachable!("no symbol for function '{}'", call.callee));
        Ok(self.tree.symbol(symbol).ty.size_in_bytes())
    }

    fn ref_symbol(&self, r: &RefExpr) -> SymbolId {
        let scope = r
            .scope
            .unwrap_or_else(|| unreachable!("reference '{}' not resolved", r.name));
        self.tree
            .lookup(scope, r.name)
            .unwrap_or_else(|| unreachable!("no symbol for '{}'", r.name))
    }

    fn slot_offset(&self, symbol: SymbolId) -> usize {
        *self
            .offsets
            .get(&symbol)
            .unwrap_or_else(|| unreachable!("symbol has no stack slot"))
    }
}
