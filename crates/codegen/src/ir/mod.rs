//! LLVM-style intermediate representation.
//!
//! A [`Module`] holds globals and functions; a [`Function`] holds basic
//! blocks; every block is a straight-line list of [`Instruction`]s closed by
//! exactly one [`Terminator`]. The IR is populated through
//! [`builder::IrBuilder`] and is serializable so a driver can persist it.

pub mod builder;
pub mod printer;
pub mod verify;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a global variable in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

/// Index of a function in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FuncId(pub u32);

/// Index of a basic block in its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Function-local number of an instruction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// IR type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    Void,
    /// Boolean
    I1,
    /// 32-bit integer
    I32,
    /// 32-bit float
    F32,
    /// Address of a stack slot or global
    Ptr,
}

impl IrType {
    pub fn is_integer(self) -> bool {
        matches!(self, IrType::I1 | IrType::I32)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, IrType::I32 | IrType::F32)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrType::Void => "void",
            IrType::I1 => "i1",
            IrType::I32 => "i32",
            IrType::F32 => "float",
            IrType::Ptr => "ptr",
        };
        f.write_str(name)
    }
}

/// Compile-time constant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// The all-zero value of a type (`zeroinitializer`)
    Zero(IrType),
}

impl Constant {
    /// The zero/default value of `ty`.
    pub fn null(ty: IrType) -> Self {
        match ty {
            IrType::I1 => Constant::Bool(false),
            IrType::I32 => Constant::Int(0),
            IrType::F32 => Constant::Float(0.0),
            other => Constant::Zero(other),
        }
    }

    pub fn ty(self) -> IrType {
        match self {
            Constant::Int(_) => IrType::I32,
            Constant::Float(_) => IrType::F32,
            Constant::Bool(_) => IrType::I1,
            Constant::Zero(ty) => ty,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Constant::Int(v) => Some(v),
            Constant::Bool(b) => Some(b as i64),
            Constant::Zero(IrType::I32 | IrType::I1) => Some(0),
            _ => None,
        }
    }
}

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Const(Constant),
    /// Result of an instruction in the current function
    Inst(InstId),
    /// Incoming function argument
    Arg(u32),
    /// Address of a module-level global
    Global(GlobalId),
}

impl Value {
    pub fn as_const(self) -> Option<Constant> {
        match self {
            Value::Const(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Constant> for Value {
    fn from(c: Constant) -> Self {
        Value::Const(c)
    }
}

/// A compiled module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Module-level globals, in declaration order
    pub globals: Vec<Global>,
    /// Functions, in first-declaration order
    pub functions: Vec<Function>,
}

/// Symbol visibility of a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    External,
    Internal,
}

/// A module-level global variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub name: String,
    pub ty: IrType,
    pub is_constant: bool,
    pub linkage: Linkage,
    pub initializer: Constant,
}

/// A function signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub ret: IrType,
    pub params: Vec<IrType>,
}

impl Signature {
    pub fn new(ret: IrType, params: Vec<IrType>) -> Self {
        Self { ret, params }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.ret)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// A function declaration or definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub signature: Signature,
    /// Names bound to the incoming argument slots
    pub param_names: Vec<String>,
    /// Basic blocks; empty for a declaration
    pub blocks: Vec<BasicBlock>,
    next_inst: u32,
}

impl Function {
    pub fn new(name: String, signature: Signature) -> Self {
        let param_names = (0..signature.params.len()).map(|i| format!("arg{}", i)).collect();
        Self {
            name,
            signature,
            param_names,
            blocks: Vec::new(),
            next_inst: 0,
        }
    }

    /// A function without blocks is only declared.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }

    /// Find a block by its label.
    pub fn block_by_label(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// Find an instruction anywhere in the function.
    pub fn instruction(&self, id: InstId) -> Option<&Instruction> {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .find(|inst| inst.id == id)
    }

    fn next_inst_id(&mut self) -> InstId {
        let id = InstId(self.next_inst);
        self.next_inst += 1;
        id
    }
}

/// A basic block (straight-line code with no branches except at the end)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Block label, unique within the function
    pub label: String,
    pub instructions: Vec<Instruction>,
    /// Block terminator; `None` while the block is still open
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    pub fn new(id: BlockId, label: String) -> Self {
        Self {
            id,
            label,
            instructions: Vec::new(),
            terminator: None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }

    /// Successor blocks named by the terminator.
    pub fn successors(&self) -> Vec<BlockId> {
        match &self.terminator {
            Some(Terminator::Br { target }) => vec![*target],
            Some(Terminator::CondBr {
                then_block,
                else_block,
                ..
            }) => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

/// An instruction with its result number and optional source name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstId,
    pub name: Option<String>,
    /// Result type; `Void` for instructions without a result
    pub ty: IrType,
    pub kind: InstKind,
}

/// Arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
}

/// Comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpPred {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

/// Instruction kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstKind {
    /// Reserve a stack slot of `allocated` type
    Alloca { allocated: IrType },
    Load { ptr: Value },
    Store { value: Value, ptr: Value },
    Binary { op: BinOp, lhs: Value, rhs: Value },
    Compare { pred: CmpPred, lhs: Value, rhs: Value },
    Unary { op: UnOp, operand: Value },
    Call { callee: FuncId, args: Vec<Value> },
    Phi { incoming: Vec<(Value, BlockId)> },
}

/// Block terminator (control flow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Terminator {
    /// Unconditional branch
    Br { target: BlockId },
    /// Conditional branch on an `i1`
    CondBr {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Return from function
    Ret(Option<Value>),
    /// Control never reaches the end of this block
    Unreachable,
}

impl Module {
    /// Create a new empty module
    pub fn new(name: String) -> Self {
        Self {
            name,
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.0 as usize]
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub fn get_global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_constants() {
        assert_eq!(Constant::null(IrType::I32), Constant::Int(0));
        assert_eq!(Constant::null(IrType::F32), Constant::Float(0.0));
        assert_eq!(Constant::null(IrType::I1), Constant::Bool(false));
        assert_eq!(Constant::null(IrType::Ptr), Constant::Zero(IrType::Ptr));
    }

    #[test]
    fn test_function_without_blocks_is_declaration() {
        let func = Function::new(
            "f".to_string(),
            Signature::new(IrType::I32, vec![IrType::I32, IrType::F32]),
        );
        assert!(func.is_declaration());
        assert_eq!(func.param_names, vec!["arg0", "arg1"]);
        assert_eq!(func.signature.to_string(), "i32 (i32, float)");
    }
}
