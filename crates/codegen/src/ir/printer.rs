//! Textual IR rendering for debugging and tests

use super::*;
use std::fmt;

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            Constant::Float(v) => write!(f, "{}", v),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Zero(IrType::Ptr) => f.write_str("null"),
            Constant::Zero(_) => f.write_str("zeroinitializer"),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;

        for global in &self.globals {
            let linkage = match global.linkage {
                Linkage::External => "",
                Linkage::Internal => "internal ",
            };
            let kind = if global.is_constant { "constant" } else { "global" };
            writeln!(
                f,
                "@{} = {}{} {} {}",
                global.name, linkage, kind, global.ty, global.initializer
            )?;
        }

        for func in &self.functions {
            writeln!(f)?;
            FunctionPrinter { module: self, func }.fmt(f)?;
        }
        Ok(())
    }
}

struct FunctionPrinter<'a> {
    module: &'a Module,
    func: &'a Function,
}

impl FunctionPrinter<'_> {
    fn value(&self, value: Value) -> String {
        match value {
            Value::Const(c) => c.to_string(),
            Value::Inst(id) => match self.func.instruction(id).and_then(|i| i.name.as_deref()) {
                Some(name) => format!("%{}", name),
                None => format!("%{}", id.0),
            },
            Value::Arg(index) => match self.func.param_names.get(index as usize) {
                Some(name) => format!("%{}", name),
                None => format!("%arg{}", index),
            },
            Value::Global(id) => format!("@{}", self.module.global(id).name),
        }
    }

    fn type_of(&self, value: Value) -> IrType {
        match value {
            Value::Const(c) => c.ty(),
            Value::Inst(id) => self.func.instruction(id).map_or(IrType::Void, |i| i.ty),
            Value::Arg(index) => self
                .func
                .signature
                .params
                .get(index as usize)
                .copied()
                .unwrap_or(IrType::Void),
            Value::Global(_) => IrType::Ptr,
        }
    }

    fn typed(&self, value: Value) -> String {
        format!("{} {}", self.type_of(value), self.value(value))
    }

    fn label(&self, block: BlockId) -> String {
        match self.func.blocks.get(block.0 as usize) {
            Some(b) => format!("label %{}", b.label),
            None => format!("label %<invalid {}>", block.0),
        }
    }

    fn instruction(&self, inst: &Instruction) -> String {
        let body = match &inst.kind {
            InstKind::Alloca { allocated } => format!("alloca {}", allocated),
            InstKind::Load { ptr } => format!("load {}, {}", inst.ty, self.typed(*ptr)),
            InstKind::Store { value, ptr } => {
                format!("store {}, {}", self.typed(*value), self.typed(*ptr))
            }
            InstKind::Binary { op, lhs, rhs } => {
                let float = inst.ty == IrType::F32;
                let mnemonic = match (op, float) {
                    (BinOp::Add, false) => "add",
                    (BinOp::Add, true) => "fadd",
                    (BinOp::Sub, false) => "sub",
                    (BinOp::Sub, true) => "fsub",
                    (BinOp::Mul, false) => "mul",
                    (BinOp::Mul, true) => "fmul",
                    (BinOp::Div, false) => "sdiv",
                    (BinOp::Div, true) => "fdiv",
                    (BinOp::Rem, false) => "srem",
                    (BinOp::Rem, true) => "frem",
                    (BinOp::And, _) => "and",
                    (BinOp::Or, _) => "or",
                };
                format!("{} {} {}, {}", mnemonic, inst.ty, self.value(*lhs), self.value(*rhs))
            }
            InstKind::Compare { pred, lhs, rhs } => {
                let operand_ty = self.type_of(*lhs);
                let (mnemonic, pred) = if operand_ty == IrType::F32 {
                    let pred = match pred {
                        CmpPred::Eq => "oeq",
                        CmpPred::Ne => "une",
                        CmpPred::Lt => "olt",
                        CmpPred::Le => "ole",
                        CmpPred::Gt => "ogt",
                        CmpPred::Ge => "oge",
                    };
                    ("fcmp", pred)
                } else {
                    let pred = match pred {
                        CmpPred::Eq => "eq",
                        CmpPred::Ne => "ne",
                        CmpPred::Lt => "slt",
                        CmpPred::Le => "sle",
                        CmpPred::Gt => "sgt",
                        CmpPred::Ge => "sge",
                    };
                    ("icmp", pred)
                };
                format!(
                    "{} {} {} {}, {}",
                    mnemonic,
                    pred,
                    operand_ty,
                    self.value(*lhs),
                    self.value(*rhs)
                )
            }
            InstKind::Unary { op, operand } => match (op, inst.ty) {
                (UnOp::Neg, IrType::F32) => format!("fneg float {}", self.value(*operand)),
                (UnOp::Neg, ty) => format!("sub {} 0, {}", ty, self.value(*operand)),
                (UnOp::Not, ty) => format!("xor {} {}, true", ty, self.value(*operand)),
            },
            InstKind::Call { callee, args } => {
                let args = args.iter().map(|a| self.typed(*a)).collect::<Vec<_>>();
                format!(
                    "call {} @{}({})",
                    inst.ty,
                    self.module.function(*callee).name,
                    args.join(", ")
                )
            }
            InstKind::Phi { incoming } => {
                let arms = incoming
                    .iter()
                    .map(|(value, block)| {
                        let label = self
                            .func
                            .blocks
                            .get(block.0 as usize)
                            .map_or("<invalid>", |b| b.label.as_str());
                        format!("[ {}, %{} ]", self.value(*value), label)
                    })
                    .collect::<Vec<_>>();
                format!("phi {} {}", inst.ty, arms.join(", "))
            }
        };

        if inst.ty == IrType::Void {
            body
        } else {
            format!("{} = {}", self.value(Value::Inst(inst.id)), body)
        }
    }

    fn terminator(&self, terminator: &Terminator) -> String {
        match terminator {
            Terminator::Br { target } => format!("br {}", self.label(*target)),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => format!(
                "br {}, {}, {}",
                self.typed(*cond),
                self.label(*then_block),
                self.label(*else_block)
            ),
            Terminator::Ret(Some(value)) => format!("ret {}", self.typed(*value)),
            Terminator::Ret(None) => "ret void".to_string(),
            Terminator::Unreachable => "unreachable".to_string(),
        }
    }
}

impl fmt::Display for FunctionPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = &self.func.signature;
        let keyword = if self.func.is_declaration() { "declare" } else { "define" };
        write!(f, "{} {} @{}(", keyword, sig.ret, self.func.name)?;
        for (i, ty) in sig.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} %{}", ty, self.func.param_names[i])?;
        }
        write!(f, ")")?;

        if self.func.is_declaration() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for (i, block) in self.func.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            for inst in &block.instructions {
                writeln!(f, "  {}", self.instruction(inst))?;
            }
            match &block.terminator {
                Some(term) => writeln!(f, "  {}", self.terminator(term))?,
                None => writeln!(f, "  ; missing terminator")?,
            }
        }
        writeln!(f, "}}")
    }
}
