//! IR builder
//!
//! Appends instructions at an insertion point inside a [`Module`]. Block
//! labels and value names are unique per function; global and function
//! symbols are unique per module.

use super::{
    BasicBlock, BinOp, BlockId, CmpPred, Constant, FuncId, Function, Global, GlobalId, InstKind,
    Instruction, IrType, Linkage, Module, Signature, Terminator, UnOp, Value,
};
use crate::backend::{Backend, InsertPoint};
use crate::error::{CodegenError, CodegenResult};
use glint_ast::Type;
use log::trace;
use std::collections::HashMap;

/// Builder over an owned [`Module`].
#[derive(Debug)]
pub struct IrBuilder {
    module: Module,
    insert_point: Option<InsertPoint>,
    /// Per-function name table shared by block labels and value names
    names: HashMap<FuncId, NameTable>,
    /// Module symbols shared by globals and functions
    symbols: NameTable,
}

/// Base names handed out so far, with the last suffix used for each.
type NameTable = HashMap<String, u32>;

/// Return `base`, or `base.N` for the first free `N` once `base` is taken.
fn unique_name(used: &mut NameTable, base: &str) -> String {
    let Some(&last) = used.get(base) else {
        used.insert(base.to_string(), 0);
        return base.to_string();
    };
    let mut count = last;
    loop {
        count += 1;
        let candidate = format!("{}.{}", base, count);
        // A suffixed name can itself be a base name requested earlier.
        if !used.contains_key(&candidate) {
            used.insert(base.to_string(), count);
            used.insert(candidate.clone(), 0);
            return candidate;
        }
    }
}

impl IrBuilder {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module: Module::new(module_name.into()),
            insert_point: None,
            names: HashMap::new(),
            symbols: NameTable::new(),
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Finish building and take the module.
    pub fn into_module(self) -> Module {
        self.module
    }

    fn local_name(&mut self, func: FuncId, base: &str) -> String {
        unique_name(self.names.entry(func).or_default(), base)
    }

    fn current(&self) -> CodegenResult<InsertPoint> {
        self.insert_point
            .ok_or_else(|| CodegenError::internal("no insertion point set"))
    }

    fn current_block_mut(&mut self) -> CodegenResult<&mut BasicBlock> {
        let ip = self.current()?;
        let block = &mut self.module.functions[ip.func.0 as usize].blocks[ip.block.0 as usize];
        if block.is_terminated() {
            return Err(CodegenError::internal(format!(
                "block `{}` is already terminated",
                block.label
            )));
        }
        Ok(block)
    }

    fn push(&mut self, ty: IrType, name: Option<&str>, kind: InstKind) -> CodegenResult<Value> {
        let ip = self.current()?;
        // Check the block before consuming a name or an id.
        self.current_block_mut()?;
        let name = name.map(|n| self.local_name(ip.func, n));
        let func = &mut self.module.functions[ip.func.0 as usize];
        let id = func.next_inst_id();
        func.blocks[ip.block.0 as usize].instructions.push(Instruction { id, name, ty, kind });
        Ok(Value::Inst(id))
    }

    fn terminate(&mut self, terminator: Terminator) -> CodegenResult<()> {
        let block = self.current_block_mut()?;
        trace!("terminating `{}` with {:?}", block.label, terminator);
        block.terminator = Some(terminator);
        Ok(())
    }
}

impl Backend for IrBuilder {
    fn convert_type(&self, ty: Type) -> IrType {
        match ty {
            Type::Void => IrType::Void,
            Type::Bool => IrType::I1,
            Type::Int | Type::Uint => IrType::I32,
            Type::Float => IrType::F32,
        }
    }

    fn create_global(
        &mut self,
        name: &str,
        ty: IrType,
        is_constant: bool,
        linkage: Linkage,
        initializer: Constant,
    ) -> GlobalId {
        let id = GlobalId(self.module.globals.len() as u32);
        let name = unique_name(&mut self.symbols, name);
        self.module.globals.push(Global {
            name,
            ty,
            is_constant,
            linkage,
            initializer,
        });
        id
    }

    fn global_initializer(&self, global: GlobalId) -> Option<Constant> {
        let global = self.module.global(global);
        global.is_constant.then_some(global.initializer)
    }

    fn declare_function(&mut self, name: &str, signature: Signature) -> FuncId {
        let id = FuncId(self.module.functions.len() as u32);
        let name = unique_name(&mut self.symbols, name);
        trace!("declare function `{}`", name);
        self.module.functions.push(Function::new(name, signature));
        id
    }

    fn function_signature(&self, func: FuncId) -> &Signature {
        &self.module.function(func).signature
    }

    fn has_body(&self, func: FuncId) -> bool {
        !self.module.function(func).is_declaration()
    }

    fn set_param_name(&mut self, func: FuncId, index: usize, name: &str) {
        let name = self.local_name(func, name);
        self.module.functions[func.0 as usize].param_names[index] = name;
    }

    fn create_basic_block(&mut self, func: FuncId, label: &str) -> BlockId {
        let label = self.local_name(func, label);
        let function = &mut self.module.functions[func.0 as usize];
        let id = BlockId(function.blocks.len() as u32);
        trace!("new block `{}` in `{}`", label, function.name);
        function.blocks.push(BasicBlock::new(id, label));
        id
    }

    fn insert_point(&self) -> Option<InsertPoint> {
        self.insert_point
    }

    fn position_at_end(&mut self, func: FuncId, block: BlockId) {
        self.insert_point = Some(InsertPoint { func, block });
    }

    fn clear_insert_point(&mut self) {
        self.insert_point = None;
    }

    fn is_terminated(&self) -> bool {
        self.insert_point.is_some_and(|ip| {
            self.module.function(ip.func).block(ip.block).is_terminated()
        })
    }

    fn open_blocks(&self, func: FuncId) -> Vec<BlockId> {
        self.module
            .function(func)
            .blocks
            .iter()
            .filter(|b| !b.is_terminated())
            .map(|b| b.id)
            .collect()
    }

    fn has_predecessors(&self, func: FuncId, block: BlockId) -> bool {
        self.module
            .function(func)
            .blocks
            .iter()
            .any(|b| b.successors().contains(&block))
    }

    fn create_alloca(&mut self, ty: IrType, name: &str) -> CodegenResult<Value> {
        self.push(IrType::Ptr, Some(name), InstKind::Alloca { allocated: ty })
    }

    fn create_store(&mut self, value: Value, ptr: Value) -> CodegenResult<()> {
        self.push(IrType::Void, None, InstKind::Store { value, ptr })?;
        Ok(())
    }

    fn create_load(&mut self, ty: IrType, ptr: Value, name: &str) -> CodegenResult<Value> {
        self.push(ty, Some(name), InstKind::Load { ptr })
    }

    fn create_binary(
        &mut self,
        op: BinOp,
        ty: IrType,
        lhs: Value,
        rhs: Value,
    ) -> CodegenResult<Value> {
        self.push(ty, None, InstKind::Binary { op, lhs, rhs })
    }

    fn create_compare(&mut self, pred: CmpPred, lhs: Value, rhs: Value) -> CodegenResult<Value> {
        self.push(IrType::I1, None, InstKind::Compare { pred, lhs, rhs })
    }

    fn create_unary(&mut self, op: UnOp, ty: IrType, operand: Value) -> CodegenResult<Value> {
        self.push(ty, None, InstKind::Unary { op, operand })
    }

    fn create_call(&mut self, callee: FuncId, args: Vec<Value>) -> CodegenResult<Value> {
        let ret = self.module.function(callee).signature.ret;
        self.push(ret, None, InstKind::Call { callee, args })
    }

    fn create_phi(&mut self, ty: IrType, incoming: Vec<(Value, BlockId)>) -> CodegenResult<Value> {
        self.push(ty, None, InstKind::Phi { incoming })
    }

    fn create_br(&mut self, target: BlockId) -> CodegenResult<()> {
        self.terminate(Terminator::Br { target })
    }

    fn create_cond_br(
        &mut self,
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) -> CodegenResult<()> {
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        })
    }

    fn create_ret(&mut self, value: Option<Value>) -> CodegenResult<()> {
        self.terminate(Terminator::Ret(value))
    }

    fn create_unreachable(&mut self) -> CodegenResult<()> {
        self.terminate(Terminator::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with_function() -> (IrBuilder, FuncId) {
        let mut builder = IrBuilder::new("test");
        let func = builder.declare_function("f", Signature::new(IrType::Void, vec![]));
        (builder, func)
    }

    #[test]
    fn test_block_labels_are_uniqued() {
        let (mut builder, func) = builder_with_function();
        let a = builder.create_basic_block(func, "if.then");
        let b = builder.create_basic_block(func, "if.then");
        let c = builder.create_basic_block(func, "if.then");

        let function = builder.module().function(func);
        assert_eq!(function.block(a).label, "if.then");
        assert_eq!(function.block(b).label, "if.then.1");
        assert_eq!(function.block(c).label, "if.then.2");
    }

    #[test]
    fn test_instruction_without_insert_point_is_internal_error() {
        let mut builder = IrBuilder::new("test");
        let err = builder.create_alloca(IrType::I32, "x").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_append_after_terminator_is_rejected() {
        let (mut builder, func) = builder_with_function();
        let entry = builder.create_basic_block(func, "entry");
        builder.position_at_end(func, entry);
        builder.create_ret(None).unwrap();

        assert!(builder.is_terminated());
        assert!(builder.create_br(entry).is_err());
        assert!(builder.create_alloca(IrType::I32, "x").is_err());
        assert!(builder.module().function(func).block(entry).instructions.is_empty());
    }

    #[test]
    fn test_module_symbols_are_uniqued() {
        let mut builder = IrBuilder::new("test");
        let sig = Signature::new(IrType::I32, vec![IrType::I32]);
        let g = builder.create_global("h", IrType::I32, false, Linkage::External, Constant::Int(0));
        let first = builder.declare_function("h", sig.clone());
        let second = builder.declare_function("h", Signature::new(IrType::Void, vec![]));

        assert_ne!(first, second);
        assert_eq!(builder.module().global(g).name, "h");
        assert_eq!(builder.module().function(first).name, "h.1");
        assert_eq!(builder.module().function(second).name, "h.2");
        assert_eq!(builder.function_signature(first), &sig);
        assert!(!builder.has_body(first));
    }

    #[test]
    fn test_constant_global_exposes_initializer() {
        let mut builder = IrBuilder::new("test");
        let c = builder.create_global("c", IrType::I32, true, Linkage::External, Constant::Int(3));
        let g = builder.create_global("g", IrType::I32, false, Linkage::External, Constant::Int(4));

        assert_eq!(builder.global_initializer(c), Some(Constant::Int(3)));
        assert_eq!(builder.global_initializer(g), None);
    }
}
