//! The IR construction interface the emitters talk to.
//!
//! Emitters never touch [`ir::Module`](crate::ir::Module) directly; every
//! global, function, block and instruction is created through a [`Backend`].
//! [`IrBuilder`](crate::ir::builder::IrBuilder) is the in-tree implementation.

use crate::error::CodegenResult;
use crate::ir::{
    BinOp, BlockId, CmpPred, Constant, FuncId, GlobalId, IrType, Linkage, Signature, UnOp, Value,
};
use glint_ast::Type;
use std::fmt::Debug;

/// Position where new instructions are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPoint {
    pub func: FuncId,
    pub block: BlockId,
}

/// IR construction backend.
///
/// Instruction constructors append at the current insertion point and fail
/// with an internal error when there is none or when the block is already
/// terminated.
pub trait Backend: Debug {
    /// Map a source type to its IR type.
    fn convert_type(&self, ty: Type) -> IrType;

    // ===== Module level =====

    /// Add a module-level global.
    fn create_global(
        &mut self,
        name: &str,
        ty: IrType,
        is_constant: bool,
        linkage: Linkage,
        initializer: Constant,
    ) -> GlobalId;

    /// The initializer of a global declared constant, `None` for mutable globals.
    fn global_initializer(&self, global: GlobalId) -> Option<Constant>;

    /// Add a function without a body.
    ///
    /// Every call creates a new function. The symbol name is uniqued against
    /// the globals and functions already in the module.
    fn declare_function(&mut self, name: &str, signature: Signature) -> FuncId;

    fn function_signature(&self, func: FuncId) -> &Signature;

    /// Whether any block has been added to `func`.
    fn has_body(&self, func: FuncId) -> bool;

    /// Name the `index`th incoming argument of `func`.
    fn set_param_name(&mut self, func: FuncId, index: usize, name: &str);

    // ===== Blocks and insertion point =====

    /// Append a new block to `func`. The label is uniqued within the function.
    fn create_basic_block(&mut self, func: FuncId, label: &str) -> BlockId;

    fn insert_point(&self) -> Option<InsertPoint>;

    fn position_at_end(&mut self, func: FuncId, block: BlockId);

    fn clear_insert_point(&mut self);

    /// Whether the block at the insertion point already has a terminator.
    fn is_terminated(&self) -> bool;

    /// Blocks of `func` still missing a terminator, in creation order.
    fn open_blocks(&self, func: FuncId) -> Vec<BlockId>;

    /// Whether any terminator of `func` branches to `block`.
    fn has_predecessors(&self, func: FuncId, block: BlockId) -> bool;

    // ===== Instructions =====

    fn create_alloca(&mut self, ty: IrType, name: &str) -> CodegenResult<Value>;

    fn create_store(&mut self, value: Value, ptr: Value) -> CodegenResult<()>;

    fn create_load(&mut self, ty: IrType, ptr: Value, name: &str) -> CodegenResult<Value>;

    fn create_binary(&mut self, op: BinOp, ty: IrType, lhs: Value, rhs: Value)
    -> CodegenResult<Value>;

    fn create_compare(&mut self, pred: CmpPred, lhs: Value, rhs: Value) -> CodegenResult<Value>;

    fn create_unary(&mut self, op: UnOp, ty: IrType, operand: Value) -> CodegenResult<Value>;

    fn create_call(&mut self, callee: FuncId, args: Vec<Value>) -> CodegenResult<Value>;

    fn create_phi(&mut self, ty: IrType, incoming: Vec<(Value, BlockId)>) -> CodegenResult<Value>;

    // ===== Terminators =====

    fn create_br(&mut self, target: BlockId) -> CodegenResult<()>;

    fn create_cond_br(
        &mut self,
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) -> CodegenResult<()>;

    fn create_ret(&mut self, value: Option<Value>) -> CodegenResult<()>;

    fn create_unreachable(&mut self) -> CodegenResult<()>;
}
