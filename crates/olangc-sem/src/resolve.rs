//! The resolver walk.
//!
//! Function symbols are inserted into the root scope before any body is
//! visited, so forward references between functions and direct recursion
//! resolve without declarations. Within a function, the parameter scope
//! is pushed first and every block pushes a child scope of its own.
//!
//! Types are resolved in place: `Type::Unknown` nodes are rewritten to
//! primitives (pointers recurse), so nothing downstream ever sees a bare
//! type name. Undefined names, unknown type names and redefinitions are
//! reported as semantic errors; the walk continues so codegen is only
//! entered when the handler is clean.

use olangc_par::{
    Block, CallExpr, ElseBranch, Expr, IfStmt, PrimKind, RefExpr, Stmt, TranslationUnit, Type,
};
use olangc_util::{Handler, ScopeId, Span};

use crate::scope::ScopeTree;

/// Resolve a translation unit, returning the populated scope tree.
pub fn resolve(unit: &mut TranslationUnit, handler: &Handler) -> ScopeTree {
    let mut resolver = Resolver {
        tree: ScopeTree::new(),
        handler,
    };
    resolver.run(unit);
    resolver.tree
}

struct Resolver<'a> {
    tree: ScopeTree,
    handler: &'a Handler,
}

impl<'a> Resolver<'a> {
    fn run(&mut self, unit: &mut TranslationUnit) {
        let root = self.tree.root();

        // Declarations first: a function symbol's type is its return
        // type, which must itself resolve before insertion.
        for f in &mut unit.decls {
            self.resolve_type(&mut f.return_type, f.span);
            if self.tree.lookup_local(root, f.name).is_some() {
                self.handler.semantic_error(
                    format!("redefinition of function '{}'", f.name),
                    f.span,
                );
                continue;
            }
            self.tree.insert(root, f.name, f.return_type.clone());
        }

        for f in &mut unit.decls {
            let fn_scope = self.tree.push_scope(root);
            f.scope = Some(fn_scope);

            for param in &mut f.params {
                self.resolve_type(&mut param.ty, param.span);
                if self.tree.lookup_local(fn_scope, param.name).is_some() {
                    self.handler.semantic_error(
                        format!("duplicate parameter '{}'", param.name),
                        param.span,
                    );
                }
                self.tree.insert(fn_scope, param.name, param.ty.clone());
            }

            self.resolve_block(&mut f.body, fn_scope);
        }
    }

    fn resolve_block(&mut self, block: &mut Block, parent: ScopeId) {
        let scope = self.tree.push_scope(parent);
        for stmt in &mut block.stmts {
            self.resolve_stmt(stmt, scope);
        }
    }

    fn resolve_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId) {
        match stmt {
            Stmt::VarDef(def) => {
                // The initializer is resolved against the state before
                // the definition, so `var x: u32 = x` is undefined.
                self.resolve_expr(&mut def.init, scope);
                self.resolve_type(&mut def.ty, def.span);
                if self.tree.lookup_local(scope, def.name).is_some() {
                    self.handler
                        .semantic_error(format!("redefinition of '{}'", def.name), def.span);
                }
                self.tree.insert(scope, def.name, def.ty.clone());
                def.scope = Some(scope);
            }
            Stmt::Assign(assign) => {
                self.resolve_ref(&mut assign.target, scope);
                self.resolve_expr(&mut assign.value, scope);
            }
            Stmt::Return(ret) => self.resolve_expr(&mut ret.expr, scope),
            Stmt::If(if_stmt) => self.resolve_if(if_stmt, scope),
            Stmt::While(while_stmt) => {
                self.resolve_expr(&mut while_stmt.cond, scope);
                self.resolve_block(&mut while_stmt.body, scope);
            }
            Stmt::Expr(expr) => self.resolve_expr(expr, scope),
        }
    }

    fn resolve_if(&mut self, if_stmt: &mut IfStmt, scope: ScopeId) {
        self.resolve_expr(&mut if_stmt.cond, scope);
        self.resolve_block(&mut if_stmt.then_block, scope);
        match &mut if_stmt.else_branch {
            Some(ElseBranch::ElseIf(nested)) => self.resolve_if(nested, scope),
            Some(ElseBranch::Else(block)) => self.resolve_block(block, scope),
            None => {}
        }
    }

    fn resolve_expr(&mut self, expr: &mut Expr, scope: ScopeId) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Ref(r) => self.resolve_ref(r, scope),
            Expr::Call(call) => self.resolve_call(call, scope),
            Expr::Binary(bin) => {
                self.resolve_expr(&mut bin.lhs, scope);
                self.resolve_expr(&mut bin.rhs, scope);
            }
            Expr::Unary(unary) => self.resolve_expr(&mut unary.operand, scope),
        }
    }

    fn resolve_ref(&mut self, r: &mut RefExpr, scope: ScopeId) {
        r.scope = Some(scope);
        if self.tree.lookup(scope, r.name).is_none() {
            self.handler
                .semantic_error(format!("undefined name '{}'", r.name), r.span);
        }
    }

    fn resolve_call(&mut self, call: &mut CallExpr, scope: ScopeId) {
        call.scope = Some(scope);
        if self.tree.lookup(scope, call.callee).is_none() {
            self.handler.semantic_error(
                format!("call to undefined function '{}'", call.callee),
                call.span,
            );
        }
        for arg in &mut call.args {
            self.resolve_expr(arg, scope);
        }
    }

    fn resolve_type(&mut self, ty: &mut Type, span: Span) {
        match ty {
            Type::Unknown { name } => match PrimKind::from_name(name.as_str()) {
                Some(kind) => *ty = Type::Primitive { kind },
                None => {
                    self.handler
                        .semantic_error(format!("unknown type '{name}'"), span);
                }
            },
            Type::Ptr { pointee } => self.resolve_type(pointee, span),
            Type::Primitive { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olangc_par::Parser;

    fn parse_and_resolve(source: &str) -> (TranslationUnit, ScopeTree, Handler) {
        let handler = Handler::new();
        let mut unit = {
            let parse_handler = Handler::new();
            let unit = Parser::parse(source, &parse_handler);
            assert!(!parse_handler.has_errors(), "{:?}", parse_handler.diagnostics());
            unit.unwrap()
        };
        let tree = resolve(&mut unit, &handler);
        (unit, tree, handler)
    }

    fn assert_expr_resolved(expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Ref(r) => assert!(r.scope.is_some(), "unresolved ref {:?}", r.name),
            Expr::Call(call) => {
                assert!(call.scope.is_some(), "unresolved call {:?}", call.callee);
                call.args.iter().for_each(assert_expr_resolved);
            }
            Expr::Binary(bin) => {
                assert_expr_resolved(&bin.lhs);
                assert_expr_resolved(&bin.rhs);
            }
            Expr::Unary(unary) => assert_expr_resolved(&unary.operand),
        }
    }

    fn assert_block_resolved(block: &Block) {
        for stmt in &block.stmts {
            match stmt {
                Stmt::VarDef(def) => {
                    assert!(def.scope.is_some());
                    assert!(def.ty.is_resolved());
                    assert_expr_resolved(&def.init);
                }
                Stmt::Assign(assign) => {
                    assert!(assign.target.scope.is_some());
                    assert_expr_resolved(&assign.value);
                }
                Stmt::Return(ret) => assert_expr_resolved(&ret.expr),
                Stmt::If(if_stmt) => assert_if_resolved(if_stmt),
                Stmt::While(while_stmt) => {
                    assert_expr_resolved(&while_stmt.cond);
                    assert_block_resolved(&while_stmt.body);
                }
                Stmt::Expr(expr) => assert_expr_resolved(expr),
            }
        }
    }

    fn assert_if_resolved(if_stmt: &IfStmt) {
        assert_expr_resolved(&if_stmt.cond);
        assert_block_resolved(&if_stmt.then_block);
        match &if_stmt.else_branch {
            Some(ElseBranch::ElseIf(nested)) => assert_if_resolved(nested),
            Some(ElseBranch::Else(block)) => assert_block_resolved(block),
            None => {}
        }
    }

    #[test]
    fn every_node_gets_a_scope() {
        let (unit, _, handler) = parse_and_resolve(
            "fn fact(n: u32): u32 {\n\
             if n == 0 {\n\
             return 1\n\
             } else {\n\
             return n * fact(n - 1)\n\
             }\n\
             }\n\
             fn main(): u32 {\n\
             var r: u32 = fact(5)\n\
             r = r + 0\n\
             return r\n\
             }\n",
        );
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        for f in &unit.decls {
            assert!(f.scope.is_some());
            assert!(f.return_type.is_resolved());
            for p in &f.params {
                assert!(p.ty.is_resolved());
            }
            assert_block_resolved(&f.body);
        }
    }

    #[test]
    fn forward_reference_between_functions() {
        let (_, _, handler) =
            parse_and_resolve("fn main(): u32 { return later() }\nfn later(): u32 { return 0 }");
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn direct_recursion() {
        let (_, _, handler) =
            parse_and_resolve("fn loop(n: u32): u32 { return loop(n) }\nfn main(): u32 { return 0 }");
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn parameters_are_visible_in_nested_blocks() {
        let (_, _, handler) = parse_and_resolve(
            "fn f(n: u32): u32 {\nif 1 == 1 {\nwhile n < 3 {\nreturn n\n}\n}\nreturn 0\n}",
        );
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn pointer_types_resolve_through() {
        let (unit, _, handler) = parse_and_resolve("fn f(p: u32*): u32 { return *p }");
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        let ty = &unit.decls[0].params[0].ty;
        assert!(matches!(ty, Type::Ptr { pointee }
            if matches!(&**pointee, Type::Primitive { kind: PrimKind::U32 })));
    }

    #[test]
    fn sibling_blocks_get_sibling_scopes() {
        let (unit, tree, handler) = parse_and_resolve(
            "fn f(): u32 {\nif 1 {\nvar a: u32 = 1\n} else {\nvar b: u32 = 2\n}\nreturn 0\n}",
        );
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        let fn_scope = unit.decls[0].scope.unwrap();
        // fn scope -> body scope -> two sibling branch scopes.
        let body = tree.children(fn_scope)[0];
        assert_eq!(tree.children(body).len(), 2);
    }

    #[test]
    fn undefined_name_is_reported() {
        let (_, _, handler) = parse_and_resolve("fn main(): u32 { return missing }");
        assert!(handler.has_errors());
        let message = &handler.diagnostics()[0].message;
        assert!(message.contains("undefined name 'missing'"), "{message}");
    }

    #[test]
    fn undefined_function_is_reported() {
        let (_, _, handler) = parse_and_resolve("fn main(): u32 { return nothing(1) }");
        assert!(handler.has_errors());
        let message = &handler.diagnostics()[0].message;
        assert!(message.contains("undefined function 'nothing'"), "{message}");
    }

    #[test]
    fn unknown_type_is_reported() {
        let (_, _, handler) = parse_and_resolve("fn main(): u32 {\nvar x: widget = 1\nreturn 0\n}");
        assert!(handler.has_errors());
        let message = &handler.diagnostics()[0].message;
        assert!(message.contains("unknown type 'widget'"), "{message}");
    }

    #[test]
    fn function_redefinition_is_reported() {
        let (_, _, handler) =
            parse_and_resolve("fn f(): u32 { return 0 }\nfn f(): u32 { return 1 }");
        assert!(handler.has_errors());
        assert!(handler.diagnostics()[0]
            .message
            .contains("redefinition of function 'f'"));
    }

    #[test]
    fn variable_in_own_initializer_is_undefined() {
        let (_, _, handler) = parse_and_resolve("fn main(): u32 {\nvar x: u32 = x\nreturn 0\n}");
        assert!(handler.has_errors());
        assert!(handler.diagnostics()[0].message.contains("undefined name 'x'"));
    }

    #[test]
    fn shadowing_in_nested_block_is_allowed() {
        let (_, _, handler) = parse_and_resolve(
            "fn main(): u32 {\nvar x: u32 = 1\nif 1 {\nvar x: u32 = 2\nx = 3\n}\nreturn x\n}",
        );
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }
}
