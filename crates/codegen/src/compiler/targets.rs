//! Break/continue target tracking

use crate::error::{CodegenError, CodegenResult};
use crate::ir::BlockId;
use smallvec::SmallVec;

/// Which construct pushed a jump target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// `while` or `for`: accepts both `break` and `continue`
    Loop,
    /// `switch`: accepts `break` only
    Switch,
}

/// Blocks a `break` or `continue` inside a construct jumps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
    pub kind: TargetKind,
    pub break_block: BlockId,
    pub continue_block: Option<BlockId>,
}

impl JumpTarget {
    pub fn loop_target(break_block: BlockId, continue_block: BlockId) -> Self {
        Self {
            kind: TargetKind::Loop,
            break_block,
            continue_block: Some(continue_block),
        }
    }

    pub fn switch_target(break_block: BlockId) -> Self {
        Self {
            kind: TargetKind::Switch,
            break_block,
            continue_block: None,
        }
    }
}

/// Stack of enclosing loops and switches, innermost last.
#[derive(Debug, Clone, Default)]
pub struct TargetStack {
    targets: SmallVec<[JumpTarget; 8]>,
}

impl TargetStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: JumpTarget) {
        self.targets.push(target);
    }

    pub fn pop(&mut self) -> CodegenResult<JumpTarget> {
        self.targets
            .pop()
            .ok_or_else(|| CodegenError::internal("jump target stack underflow"))
    }

    /// Where `break` goes: the innermost loop or switch.
    pub fn break_target(&self) -> Option<BlockId> {
        self.targets.last().map(|t| t.break_block)
    }

    /// Where `continue` goes: the innermost loop, skipping switches.
    pub fn continue_target(&self) -> Option<BlockId> {
        self.targets.iter().rev().find_map(|t| t.continue_block)
    }

    pub fn depth(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Detach the whole stack, leaving it empty (entering a nested function).
    pub fn take(&mut self) -> TargetStack {
        std::mem::take(self)
    }
}
