use hashbrown::HashMap;

use super::error::CodegenError;
use crate::ir::{Instruction, Opcode, Program};

/// Every variable owns one fixed 8-byte slot below the frame pointer.
pub const VAR_SLOT_SIZE: i32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSlot {
    pub index: usize,
    pub ty: String,
}

/// Stack-frame layout for one emission block (the top level or a function
/// body). Slot indices follow `var` declaration order and start at 1, so a
/// variable lives at `[rbp - index * 8]`.
#[derive(Debug, Default)]
pub struct FrameLayout {
    slots: HashMap<String, VariableSlot>,
}

impl FrameLayout {
    pub fn build(program: &Program) -> Self {
        let mut slots = HashMap::new();
        let mut next_index = 0;

        for instr in program {
            if let Instruction::Binary(Opcode::Var, name, ty) = instr {
                next_index += 1;
                slots.insert(name.clone(), VariableSlot { index: next_index, ty: ty.clone() });
            }
        }

        Self { slots }
    }

    /// Signed offset from rbp for the named variable.
    pub fn offset(&self, name: &str) -> Result<i32, CodegenError> {
        self.slots
            .get(name)
            .map(|slot| -(slot.index as i32 * VAR_SLOT_SIZE))
            .ok_or_else(|| CodegenError::UnknownVariable { name: name.to_string() })
    }

    pub fn slot(&self, name: &str) -> Option<&VariableSlot> {
        self.slots.get(name)
    }

    pub fn allocated_bytes(&self) -> i32 {
        self.slots.len() as i32 * VAR_SLOT_SIZE
    }
}
