//! AST pretty printing.
//!
//! Two renderings:
//!
//! - [`dump`]: the `--dump-ast` tree view. The AST is first converted to
//!   a uniform name-plus-children node tree allocated in a scratch
//!   [`Arena`] sized by a prepass, then rendered with `|-`/`` `- ``
//!   connectors.
//! - [`to_source`]: reprints the program as olang source, fully
//!   parenthesizing expressions so that re-parsing the output yields a
//!   structurally identical tree.

use std::fmt::Write;

use olangc_util::Arena;

use crate::ast::{
    Block, ElseBranch, Expr, FnDef, IfStmt, Stmt, TranslationUnit, VarAssign,
};

struct PrintNode<'a> {
    name: &'a str,
    children: Vec<&'a PrintNode<'a>>,
}

fn alloc<'a, T>(arena: &'a Arena, value: T) -> &'a T {
    match arena.alloc(value) {
        Some(slot) => slot,
        None => unreachable!("print arena sized by prepass"),
    }
}

fn alloc_name<'a>(arena: &'a Arena, name: String) -> &'a str {
    match arena.alloc_str(&name) {
        Some(name) => name,
        None => unreachable!("print arena sized by prepass"),
    }
}

/// Render the `--dump-ast` tree for a translation unit.
pub fn dump(unit: &TranslationUnit) -> String {
    let arena = Arena::with_capacity(arena_budget(unit));
    let root = build_unit(&arena, unit);

    let mut out = String::new();
    let mut prefix = 0u64;
    render(root, &mut out, &mut prefix, 0, true);
    out
}

// ---------------------------------------------------------------------
// Arena sizing
// ---------------------------------------------------------------------

/// Upper bound on the print tree's arena consumption: one node plus one
/// formatted label per AST node, labels bounded by a fixed part and the
/// identifier/type text they embed.
fn arena_budget(unit: &TranslationUnit) -> usize {
    const PER_NODE: usize = 96 + std::mem::size_of::<PrintNode<'static>>();
    let (nodes, text) = unit
        .decls
        .iter()
        .fold((1usize, 0usize), |(n, t), f| {
            let (fn_nodes, fn_text) = weigh_fn(f);
            (n + fn_nodes, t + fn_text)
        });
    nodes * (PER_NODE + 8) + 2 * text + 1024
}

fn weigh_fn(f: &FnDef) -> (usize, usize) {
    let nodes = 1 + f.params.len();
    let mut text = f.name.as_str().len() + f.return_type.to_string().len();
    for p in &f.params {
        text += p.name.as_str().len() + p.ty.to_string().len();
    }
    let (n, t) = weigh_block(&f.body);
    (nodes + n, text + t)
}

fn weigh_block(block: &Block) -> (usize, usize) {
    block.stmts.iter().fold((1, 0), |(n, t), stmt| {
        let (sn, st) = weigh_stmt(stmt);
        (n + sn, t + st)
    })
}

fn weigh_stmt(stmt: &Stmt) -> (usize, usize) {
    match stmt {
        Stmt::VarDef(def) => {
            let (n, t) = weigh_expr(&def.init);
            (
                n + 1,
                t + def.name.as_str().len() + def.ty.to_string().len(),
            )
        }
        Stmt::Assign(assign) => {
            let (n, t) = weigh_expr(&assign.value);
            (n + 2, t + assign.target.name.as_str().len())
        }
        Stmt::Return(ret) => {
            let (n, t) = weigh_expr(&ret.expr);
            (n + 1, t)
        }
        Stmt::If(if_stmt) => weigh_if(if_stmt),
        Stmt::While(while_stmt) => {
            let (cn, ct) = weigh_expr(&while_stmt.cond);
            let (bn, bt) = weigh_block(&while_stmt.body);
            (cn + bn + 1, ct + bt)
        }
        Stmt::Expr(expr) => weigh_expr(expr),
    }
}

fn weigh_if(if_stmt: &IfStmt) -> (usize, usize) {
    let (cn, ct) = weigh_expr(&if_stmt.cond);
    let (tn, tt) = weigh_block(&if_stmt.then_block);
    let (en, et) = match &if_stmt.else_branch {
        Some(ElseBranch::ElseIf(nested)) => weigh_if(nested),
        Some(ElseBranch::Else(block)) => weigh_block(block),
        None => (0, 0),
    };
    (cn + tn + en + 1, ct + tt + et)
}

fn weigh_expr(expr: &Expr) -> (usize, usize) {
    match expr {
        Expr::Literal(_) => (1, 16),
        Expr::Ref(r) => (1, r.name.as_str().len()),
        Expr::Call(call) => call.args.iter().fold(
            (1, call.callee.as_str().len()),
            |(n, t), arg| {
                let (an, at) = weigh_expr(arg);
                (n + an, t + at)
            },
        ),
        Expr::Binary(bin) => {
            let (ln, lt) = weigh_expr(&bin.lhs);
            let (rn, rt) = weigh_expr(&bin.rhs);
            (ln + rn + 1, lt + rt)
        }
        Expr::Unary(unary) => {
            let (n, t) = weigh_expr(&unary.operand);
            (n + 1, t)
        }
    }
}

// ---------------------------------------------------------------------
// Print tree construction
// ---------------------------------------------------------------------

fn build_unit<'a>(arena: &'a Arena, unit: &TranslationUnit) -> &'a PrintNode<'a> {
    let children = unit.decls.iter().map(|f| build_fn(arena, f)).collect();
    alloc(
        arena,
        PrintNode {
            name: "Translation_Unit",
            children,
        },
    )
}

fn build_fn<'a>(arena: &'a Arena, f: &FnDef) -> &'a PrintNode<'a> {
    let mut children: Vec<&PrintNode> = f
        .params
        .iter()
        .map(|p| {
            alloc(
                arena,
                PrintNode {
                    name: alloc_name(
                        arena,
                        format!("Param_Definition <name:{}> <type:{}>", p.name, p.ty),
                    ),
                    children: Vec::new(),
                },
            )
        })
        .collect();
    children.push(build_block(arena, &f.body));

    alloc(
        arena,
        PrintNode {
            name: alloc_name(
                arena,
                format!(
                    "Function_Definition <name:{}> <return:{}>",
                    f.name, f.return_type
                ),
            ),
            children,
        },
    )
}

fn build_block<'a>(arena: &'a Arena, block: &Block) -> &'a PrintNode<'a> {
    let children = block.stmts.iter().map(|s| build_stmt(arena, s)).collect();
    alloc(
        arena,
        PrintNode {
            name: "Block",
            children,
        },
    )
}

fn build_stmt<'a>(arena: &'a Arena, stmt: &Stmt) -> &'a PrintNode<'a> {
    match stmt {
        Stmt::VarDef(def) => alloc(
            arena,
            PrintNode {
                name: alloc_name(
                    arena,
                    format!("Var_Definition <name:{}> <kind:{}>", def.name, def.ty),
                ),
                children: vec![build_expr(arena, &def.init)],
            },
        ),
        Stmt::Assign(assign) => build_assign(arena, assign),
        Stmt::Return(ret) => alloc(
            arena,
            PrintNode {
                name: "Return_Statement",
                children: vec![build_expr(arena, &ret.expr)],
            },
        ),
        Stmt::If(if_stmt) => build_if(arena, if_stmt),
        Stmt::While(while_stmt) => alloc(
            arena,
            PrintNode {
                name: "While_Statement",
                children: vec![
                    build_expr(arena, &while_stmt.cond),
                    build_block(arena, &while_stmt.body),
                ],
            },
        ),
        Stmt::Expr(expr) => build_expr(arena, expr),
    }
}

fn build_assign<'a>(arena: &'a Arena, assign: &VarAssign) -> &'a PrintNode<'a> {
    let target = alloc(
        arena,
        PrintNode {
            name: alloc_name(arena, format!("Reference <name:{}>", assign.target.name)),
            children: Vec::new(),
        },
    );
    alloc(
        arena,
        PrintNode {
            name: "Var_Assignment",
            children: vec![target, build_expr(arena, &assign.value)],
        },
    )
}

fn build_if<'a>(arena: &'a Arena, if_stmt: &IfStmt) -> &'a PrintNode<'a> {
    let mut children = vec![
        build_expr(arena, &if_stmt.cond),
        build_block(arena, &if_stmt.then_block),
    ];
    match &if_stmt.else_branch {
        Some(ElseBranch::ElseIf(nested)) => children.push(build_if(arena, nested)),
        Some(ElseBranch::Else(block)) => children.push(build_block(arena, block)),
        None => {}
    }
    alloc(
        arena,
        PrintNode {
            name: "If_Statement",
            children,
        },
    )
}

fn build_expr<'a>(arena: &'a Arena, expr: &Expr) -> &'a PrintNode<'a> {
    match expr {
        Expr::Literal(lit) => alloc(
            arena,
            PrintNode {
                name: alloc_name(arena, format!("Literal <kind:u32> <value:{}>", lit.value)),
                children: Vec::new(),
            },
        ),
        Expr::Ref(r) => alloc(
            arena,
            PrintNode {
                name: alloc_name(arena, format!("Reference <name:{}>", r.name)),
                children: Vec::new(),
            },
        ),
        Expr::Call(call) => alloc(
            arena,
            PrintNode {
                name: alloc_name(arena, format!("Function_Call <name:{}>", call.callee)),
                children: call.args.iter().map(|a| build_expr(arena, a)).collect(),
            },
        ),
        Expr::Binary(bin) => alloc(
            arena,
            PrintNode {
                name: alloc_name(arena, format!("Binary_Operation ({})", bin.op.as_str())),
                children: vec![build_expr(arena, &bin.lhs), build_expr(arena, &bin.rhs)],
            },
        ),
        Expr::Unary(unary) => alloc(
            arena,
            PrintNode {
                name: alloc_name(arena, format!("Unary_Operation ({})", unary.op.as_str())),
                children: vec![build_expr(arena, &unary.operand)],
            },
        ),
    }
}

// ---------------------------------------------------------------------
// Tree rendering
// ---------------------------------------------------------------------

fn render(node: &PrintNode<'_>, out: &mut String, prefix: &mut u64, level: usize, last: bool) {
    assert!(level < 64);
    render_indent(out, *prefix, level, last);

    if !node.children.is_empty() {
        *prefix |= 1 << level;
    }
    if last && level > 0 {
        *prefix ^= 1 << (level - 1);
    }

    out.push_str(node.name);
    out.push('\n');

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        render(child, out, prefix, level + 1, i + 1 == count);
    }
}

fn render_indent(out: &mut String, prefix: u64, level: usize, last: bool) {
    for i in 0..level {
        if prefix & (1 << i) == 0 {
            out.push_str("  ");
        } else if i + 1 != level {
            out.push_str("| ");
        } else if last {
            out.push_str("`-");
        } else {
            out.push_str("|-");
        }
    }
}

// ---------------------------------------------------------------------
// Source reprinting
// ---------------------------------------------------------------------

/// Reprint a translation unit as olang source. Binary and unary
/// expressions are parenthesized, so the operator structure survives a
/// round trip through the parser unchanged.
pub fn to_source(unit: &TranslationUnit) -> String {
    let mut out = String::new();
    for (i, f) in unit.decls.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_fn(&mut out, f);
    }
    out
}

fn write_fn(out: &mut String, f: &FnDef) {
    let _ = write!(out, "fn {}(", f.name);
    for (i, p) in f.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}: {}", p.name, p.ty);
    }
    let _ = writeln!(out, "): {} {{", f.return_type);
    write_block_body(out, &f.body, 1);
    out.push_str("}\n");
}

fn write_block_body(out: &mut String, block: &Block, indent: usize) {
    for stmt in &block.stmts {
        for _ in 0..indent {
            out.push_str("    ");
        }
        write_stmt(out, stmt, indent);
        out.push('\n');
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    match stmt {
        Stmt::VarDef(def) => {
            let _ = write!(out, "var {}: {} = ", def.name, def.ty);
            write_expr(out, &def.init);
        }
        Stmt::Assign(assign) => {
            let _ = write!(out, "{} = ", assign.target.name);
            write_expr(out, &assign.value);
        }
        Stmt::Return(ret) => {
            out.push_str("return ");
            write_expr(out, &ret.expr);
        }
        Stmt::If(if_stmt) => write_if(out, if_stmt, indent),
        Stmt::While(while_stmt) => {
            out.push_str("while ");
            write_expr(out, &while_stmt.cond);
            out.push_str(" {\n");
            write_block_body(out, &while_stmt.body, indent + 1);
            write_closing(out, indent);
        }
        Stmt::Expr(expr) => write_expr(out, expr),
    }
}

fn write_if(out: &mut String, if_stmt: &IfStmt, indent: usize) {
    out.push_str("if ");
    write_expr(out, &if_stmt.cond);
    out.push_str(" {\n");
    write_block_body(out, &if_stmt.then_block, indent + 1);
    write_closing(out, indent);

    match &if_stmt.else_branch {
        Some(ElseBranch::ElseIf(nested)) => {
            out.push_str(" else ");
            write_if(out, nested, indent);
        }
        Some(ElseBranch::Else(block)) => {
            out.push_str(" else {\n");
            write_block_body(out, block, indent + 1);
            write_closing(out, indent);
        }
        None => {}
    }
}

fn write_closing(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
    out.push('}');
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Literal(lit) => {
            let _ = write!(out, "{}", lit.value);
        }
        Expr::Ref(r) => out.push_str(r.name.as_str()),
        Expr::Call(call) => {
            let _ = write!(out, "{}(", call.callee);
            for (i, arg) in call.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
        Expr::Binary(bin) => {
            out.push('(');
            write_expr(out, &bin.lhs);
            let _ = write!(out, " {} ", bin.op.as_str());
            write_expr(out, &bin.rhs);
            out.push(')');
        }
        Expr::Unary(unary) => {
            out.push_str(unary.op.as_str());
            out.push('(');
            write_expr(out, &unary.operand);
            out.push(')');
        }
    }
}
