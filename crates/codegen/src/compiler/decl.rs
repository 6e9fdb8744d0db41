//! Declaration emission: globals, stack slots and functions.
//!
//! Whether a variable becomes a module-level global or an `alloca` in the
//! current function depends only on the depth of the scope stack at the
//! point of declaration.

use crate::backend::Backend;
use crate::compiler::const_eval::ConstEvaluator;
use crate::compiler::context::{CodegenContext, FunctionState};
use crate::compiler::expr::ExprEmitter;
use crate::compiler::stmt::StmtEmitter;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Constant, FuncId, IrType, Linkage, Signature, Value};
use crate::symbol::{ScopeKind, StorageHandle};
use glint_ast::error::ErrorCode;
use glint_ast::{Decl, DeclId, FnDecl, VarDecl};
use log::debug;

pub struct DeclEmitter;

impl DeclEmitter {
    /// Emit any declaration in the current scope.
    pub fn emit<B: Backend>(ctx: &mut CodegenContext<'_, B>, id: DeclId) -> CodegenResult<()> {
        let ast = ctx.ast;
        match ast.decl(id) {
            Decl::Var(_) => Self::emit_var_decl(ctx, id).map(drop),
            Decl::Fn(_) => Self::emit_fn_decl(ctx, id).map(drop),
        }
    }

    /// Emit a variable as a global (module scope) or a stack slot (any
    /// nested scope) and bind it in the innermost scope.
    pub fn emit_var_decl<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        id: DeclId,
    ) -> CodegenResult<StorageHandle> {
        ctx.mark_decl_emitted(id)?;
        let ast = ctx.ast;
        let decl = ast
            .decl(id)
            .as_var()
            .ok_or_else(|| CodegenError::internal(format!("{} is not a variable", id)))?;
        ctx.scopes.ensure_undeclared(decl.ident.as_str(), decl.ident.span)?;
        let ty = Self::var_type(ctx, decl)?;

        if ctx.scopes.is_global_scope() {
            Self::emit_global(ctx, id, decl, ty)
        } else {
            Self::emit_local(ctx, id, decl, ty)
        }
    }

    fn emit_global<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        id: DeclId,
        decl: &VarDecl,
        ty: IrType,
    ) -> CodegenResult<StorageHandle> {
        let name = decl.ident.as_str();
        let folded = match &decl.init {
            None => Ok(Constant::null(ty)),
            Some(init) => match ConstEvaluator::fold(ctx, init) {
                Some(c) if c.ty() == ty => Ok(c),
                Some(c) => Err(CodegenError::TypeMismatch {
                    expected: ty,
                    found: c.ty(),
                    span: init.span,
                }),
                None => Err(CodegenError::NonConstantGlobalInitializer {
                    name: name.to_string(),
                    span: init.span,
                }),
            },
        };
        // The global is created even when the initializer is rejected so
        // that later references still resolve.
        let (initializer, failure) = match folded {
            Ok(c) => (c, None),
            Err(err) => (Constant::null(ty), Some(err)),
        };

        let global =
            ctx.backend
                .create_global(name, ty, decl.is_const(), Linkage::External, initializer);
        let storage = StorageHandle::Global(global);
        ctx.scopes.declare(name, id, storage, ty, decl.ident.span)?;
        debug!("global `{}`: {} = {}", name, ty, initializer);

        match failure {
            Some(err) => Err(err),
            None => Ok(storage),
        }
    }

    fn emit_local<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        id: DeclId,
        decl: &VarDecl,
        ty: IrType,
    ) -> CodegenResult<StorageHandle> {
        let name = decl.ident.as_str();
        let func = ctx.current_function()?.func;
        let slot = ctx.backend.create_alloca(ty, name)?;
        let init = match &decl.init {
            Some(init) => ExprEmitter::emit_as(ctx, init, ty),
            None => Ok(Value::Const(Constant::null(ty))),
        };
        // A rejected initializer still leaves a bound, zeroed slot behind.
        let (value, failure) = match init {
            Ok(value) => (value, None),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => (Value::Const(Constant::null(ty)), Some(err)),
        };
        ctx.backend.create_store(value, slot)?;

        let storage = StorageHandle::Slot { func, ptr: slot };
        ctx.scopes.declare(name, id, storage, ty, decl.ident.span)?;
        match failure {
            Some(err) => Err(err),
            None => Ok(storage),
        }
    }

    /// The declared type, or the initializer's type for a declaration
    /// written with a qualifier only.
    fn var_type<B: Backend>(ctx: &CodegenContext<'_, B>, decl: &VarDecl) -> CodegenResult<IrType> {
        match (decl.ty, &decl.init) {
            (Some(ty), _) => Ok(ctx.backend.convert_type(ty)),
            (None, Some(init)) => match ExprEmitter::infer_type(ctx, init)? {
                IrType::Void => Err(CodegenError::MissingType {
                    name: decl.ident.name.clone(),
                    span: decl.span,
                }),
                ty => Ok(ty),
            },
            (None, None) => Err(CodegenError::MissingType {
                name: decl.ident.name.clone(),
                span: decl.span,
            }),
        }
    }

    /// Declare a function, bind it in the current scope and, for a
    /// definition, emit its body.
    pub fn emit_fn_decl<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        id: DeclId,
    ) -> CodegenResult<FuncId> {
        ctx.mark_decl_emitted(id)?;
        let ast = ctx.ast;
        let decl = ast
            .decl(id)
            .as_fn()
            .ok_or_else(|| CodegenError::internal(format!("{} is not a function", id)))?;
        let name = decl.ident.as_str();

        let signature = Self::signature(ctx, decl)?;
        // Only a declaration in the same scope can be completed or conflict;
        // anywhere else the name starts a new function that shadows the outer one.
        let func = match ctx.scopes.local_function(name, decl.ident.span)? {
            Some(func) => {
                let existing = ctx.backend.function_signature(func);
                if existing != &signature {
                    return Err(CodegenError::ConflictingFunctionDeclaration {
                        name: name.to_string(),
                        previous: existing.to_string(),
                        found: signature.to_string(),
                        span: decl.span,
                    });
                }
                if !decl.is_prototype() && ctx.backend.has_body(func) {
                    return Err(CodegenError::FunctionRedefinition {
                        name: name.to_string(),
                        span: decl.ident.span,
                    });
                }
                func
            }
            None => ctx.backend.declare_function(name, signature.clone()),
        };

        ctx.scopes.redeclare_function(
            name,
            id,
            StorageHandle::Function(func),
            signature.ret,
            decl.ident.span,
        )?;

        if decl.is_prototype() {
            debug!("declared function `{}`: {}", name, signature);
            return Ok(func);
        }
        debug!("defining function `{}`: {}", name, signature);
        Self::emit_fn_body(ctx, id, decl, func, signature.ret)?;
        Ok(func)
    }

    fn signature<B: Backend>(
        ctx: &CodegenContext<'_, B>,
        decl: &FnDecl,
    ) -> CodegenResult<Signature> {
        let mut params = Vec::with_capacity(decl.formals.len());
        for &formal in &decl.formals {
            let var = ctx.ast.decl(formal).as_var().ok_or_else(|| {
                CodegenError::internal(format!("formal {} is not a variable", formal))
            })?;
            let ty = var.ty.ok_or_else(|| CodegenError::MissingType {
                name: var.ident.name.clone(),
                span: var.span,
            })?;
            params.push(ctx.backend.convert_type(ty));
        }
        Ok(Signature::new(ctx.backend.convert_type(decl.return_type), params))
    }

    /// Emit the body of a function definition into a fresh `entry` block.
    ///
    /// The insertion point, jump targets and current function are saved
    /// before and restored after, whatever the outcome.
    fn emit_fn_body<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        id: DeclId,
        decl: &FnDecl,
        func: FuncId,
        return_ty: IrType,
    ) -> CodegenResult<()> {
        let body = decl.body.ok_or_else(|| {
            CodegenError::internal(format!("function `{}` has no body bound", decl.ident))
        })?;

        let ast = ctx.ast;
        for (index, &formal) in decl.formals.iter().enumerate() {
            ctx.backend.set_param_name(func, index, ast.decl(formal).name());
        }

        let saved_insert_point = ctx.backend.insert_point();
        let saved_targets = ctx.targets.take();
        let saved_function = ctx.function.replace(FunctionState {
            func,
            decl: id,
            return_ty,
        });

        let entry = ctx.backend.create_basic_block(func, "entry");
        ctx.backend.position_at_end(func, entry);

        let result = ctx.with_scope(ScopeKind::Function, |ctx| {
            let params = ctx.backend.function_signature(func).params.clone();
            for (index, (&formal, ty)) in decl.formals.iter().zip(params).enumerate() {
                let bound = Self::emit_formal(ctx, formal, index, ty);
                ctx.recover(bound)?;
            }
            StmtEmitter::emit_function_body(ctx, body)?;
            Self::close_function(ctx, decl, func, return_ty)
        });

        ctx.function = saved_function;
        ctx.targets = saved_targets;
        match saved_insert_point {
            Some(ip) => ctx.backend.position_at_end(ip.func, ip.block),
            None => ctx.backend.clear_insert_point(),
        }
        result
    }

    /// Spill an incoming argument into a named stack slot.
    fn emit_formal<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        formal: DeclId,
        index: usize,
        ty: IrType,
    ) -> CodegenResult<()> {
        ctx.mark_decl_emitted(formal)?;
        let ast = ctx.ast;
        let decl = ast.decl(formal);
        let name = decl.name();
        ctx.scopes.ensure_undeclared(name, decl.ident().span)?;

        let func = ctx.current_function()?.func;
        let slot = ctx.backend.create_alloca(ty, name)?;
        ctx.backend.create_store(Value::Arg(index as u32), slot)?;
        let storage = StorageHandle::Slot { func, ptr: slot };
        ctx.scopes.declare(name, formal, storage, ty, decl.ident().span)?;
        Ok(())
    }

    /// Terminate whatever the body left open.
    ///
    /// Falling off the end of a reachable block returns (zero for non-void
    /// functions, with a warning); blocks nothing can reach get
    /// `unreachable`.
    fn close_function<B: Backend>(
        ctx: &mut CodegenContext<'_, B>,
        decl: &FnDecl,
        func: FuncId,
        return_ty: IrType,
    ) -> CodegenResult<()> {
        if let Some(ip) = ctx.backend.insert_point()
            && !ctx.backend.is_terminated()
        {
            // The entry block is always first and always reachable.
            let entry = ip.block.0 == 0;
            if entry || ctx.backend.has_predecessors(func, ip.block) {
                if return_ty == IrType::Void {
                    ctx.backend.create_ret(None)?;
                } else {
                    ctx.warn(
                        ErrorCode::W3102,
                        format!(
                            "control reaches the end of non-void function `{}`",
                            decl.ident
                        ),
                        decl.ident.span,
                    );
                    ctx.backend
                        .create_ret(Some(Value::Const(Constant::null(return_ty))))?;
                }
            }
        }

        for block in ctx.backend.open_blocks(func) {
            ctx.backend.position_at_end(func, block);
            ctx.backend.create_unreachable()?;
        }
        Ok(())
    }
}
