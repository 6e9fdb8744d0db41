//! Structural IR verification.
//!
//! Checks the invariants the emitters promise for every defined function:
//! each block ends in exactly one terminator, branch and phi targets name
//! existing blocks, operands refer to instructions of the same function,
//! returns agree with the signature, and calls pass the declared number of
//! arguments.

use super::*;
use crate::error::{CodegenError, CodegenResult};
use std::collections::HashSet;

/// Verify every function of `module`, reporting the first violation.
pub fn verify_module(module: &Module) -> CodegenResult<()> {
    for func in &module.functions {
        verify_function(module, func)?;
    }
    Ok(())
}

/// Verify a single function. Declarations trivially pass.
pub fn verify_function(module: &Module, func: &Function) -> CodegenResult<()> {
    if func.is_declaration() {
        return Ok(());
    }
    let fail = |message: String| CodegenError::Verification {
        function: func.name.clone(),
        message,
    };

    let defined: HashSet<InstId> = func
        .blocks
        .iter()
        .flat_map(|b| b.instructions.iter().map(|i| i.id))
        .collect();
    let block_exists = |id: BlockId| (id.0 as usize) < func.blocks.len();

    let check_value = |value: Value, block: &BasicBlock| -> CodegenResult<()> {
        match value {
            Value::Inst(id) if !defined.contains(&id) => Err(fail(format!(
                "block `{}` uses undefined value %{}",
                block.label, id.0
            ))),
            Value::Arg(index) if index as usize >= func.signature.params.len() => Err(fail(
                format!("block `{}` uses missing argument {}", block.label, index),
            )),
            Value::Global(id) if id.0 as usize >= module.globals.len() => Err(fail(format!(
                "block `{}` uses unknown global {}",
                block.label, id.0
            ))),
            _ => Ok(()),
        }
    };

    for block in &func.blocks {
        for inst in &block.instructions {
            match &inst.kind {
                InstKind::Alloca { .. } => {}
                InstKind::Load { ptr } => check_value(*ptr, block)?,
                InstKind::Store { value, ptr } => {
                    check_value(*value, block)?;
                    check_value(*ptr, block)?;
                }
                InstKind::Binary { lhs, rhs, .. } | InstKind::Compare { lhs, rhs, .. } => {
                    check_value(*lhs, block)?;
                    check_value(*rhs, block)?;
                }
                InstKind::Unary { operand, .. } => check_value(*operand, block)?,
                InstKind::Call { callee, args } => {
                    let Some(target) = module.functions.get(callee.0 as usize) else {
                        return Err(fail(format!("call to unknown function {}", callee.0)));
                    };
                    if target.signature.params.len() != args.len() {
                        return Err(fail(format!(
                            "call to `{}` passes {} argument(s), expected {}",
                            target.name,
                            args.len(),
                            target.signature.params.len()
                        )));
                    }
                    for arg in args {
                        check_value(*arg, block)?;
                    }
                }
                InstKind::Phi { incoming } => {
                    for (value, pred) in incoming {
                        check_value(*value, block)?;
                        if !block_exists(*pred) {
                            return Err(fail(format!(
                                "phi in `{}` names missing block {}",
                                block.label, pred.0
                            )));
                        }
                    }
                }
            }
        }

        let Some(terminator) = &block.terminator else {
            return Err(fail(format!("block `{}` has no terminator", block.label)));
        };
        for succ in block.successors() {
            if !block_exists(succ) {
                return Err(fail(format!(
                    "block `{}` branches to missing block {}",
                    block.label, succ.0
                )));
            }
        }
        match terminator {
            Terminator::Ret(None) if func.signature.ret != IrType::Void => {
                return Err(fail(format!(
                    "block `{}` returns void from a {} function",
                    block.label, func.signature.ret
                )));
            }
            Terminator::Ret(Some(_)) if func.signature.ret == IrType::Void => {
                return Err(fail(format!(
                    "block `{}` returns a value from a void function",
                    block.label
                )));
            }
            Terminator::Ret(Some(value)) | Terminator::CondBr { cond: value, .. } => {
                check_value(*value, block)?
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::ir::builder::IrBuilder;

    #[test]
    fn test_open_block_fails_verification() {
        let mut builder = IrBuilder::new("m");
        let f = builder.declare_function("f", Signature::new(IrType::Void, vec![]));
        let entry = builder.create_basic_block(f, "entry");
        builder.create_basic_block(f, "dangling");
        builder.position_at_end(f, entry);
        builder.create_ret(None).unwrap();

        let err = verify_module(builder.module()).unwrap_err();
        assert!(err.to_string().contains("`dangling` has no terminator"));
    }

    #[test]
    fn test_void_return_from_int_function_fails() {
        let mut builder = IrBuilder::new("m");
        let f = builder.declare_function("f", Signature::new(IrType::I32, vec![]));
        let entry = builder.create_basic_block(f, "entry");
        builder.position_at_end(f, entry);
        builder.create_ret(None).unwrap();

        assert!(verify_module(builder.module()).is_err());
    }

    #[test]
    fn test_well_formed_branches_pass() {
        let mut builder = IrBuilder::new("m");
        let f = builder.declare_function("f", Signature::new(IrType::Void, vec![IrType::I1]));
        let entry = builder.create_basic_block(f, "entry");
        let then = builder.create_basic_block(f, "then");
        let done = builder.create_basic_block(f, "done");
        builder.position_at_end(f, entry);
        builder.create_cond_br(Value::Arg(0), then, done).unwrap();
        builder.position_at_end(f, then);
        builder.create_br(done).unwrap();
        builder.position_at_end(f, done);
        builder.create_ret(None).unwrap();

        assert!(verify_module(builder.module()).is_ok());
    }
}
