// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// components.rs
//
// This file contains the hardware structures of the out-of-order engine:
//   - Reservation stations with tagged operand slots
//   - The circular reorder buffer (ROB) enforcing in-order commit
//   - The register alias table used for renaming
//   - The per-instruction status log of pipeline event timestamps

use crate::reference_simulator::instructions::Instruction;
use crate::reference_simulator::registers::NUM_REGISTERS;
use serde::Serialize;

/// Index of a reorder buffer slot. Tags are compared by value on the CDB.
pub type RobTag = usize;

/// The functional unit pool an instruction issues to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionalUnitType {
    AddSub,
    MulDiv,
    LoadStore,
}

impl FunctionalUnitType {
    pub const ALL: [FunctionalUnitType; 3] = [
        FunctionalUnitType::AddSub,
        FunctionalUnitType::MulDiv,
        FunctionalUnitType::LoadStore,
    ];

    pub fn for_instruction(instruction: &Instruction) -> Self {
        match instruction {
            Instruction::Add { .. } | Instruction::Sub { .. } => FunctionalUnitType::AddSub,
            Instruction::Mul { .. } | Instruction::Div { .. } => FunctionalUnitType::MulDiv,
            Instruction::Lw { .. } | Instruction::Sw { .. } => FunctionalUnitType::LoadStore,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FunctionalUnitType::AddSub => "ADD/SUB",
            FunctionalUnitType::MulDiv => "MUL/DIV",
            FunctionalUnitType::LoadStore => "LOAD/STORE",
        }
    }
}

/// A reservation station operand slot: either a concrete value or the ROB
/// tag of the in-flight instruction that will produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Ready(i64),
    Waiting(RobTag),
}

impl Operand {
    pub fn is_ready(&self) -> bool {
        matches!(self, Operand::Ready(_))
    }

    /// The captured value. Only meaningful once the slot is ready; a
    /// still-waiting slot reads as 0.
    pub fn value(&self) -> i64 {
        match *self {
            Operand::Ready(value) => value,
            Operand::Waiting(_) => 0,
        }
    }

    /// Apply a CDB broadcast to this slot. Returns true when the slot was
    /// waiting on exactly this tag and just resolved.
    pub fn capture(&mut self, tag: RobTag, value: i64) -> bool {
        if *self == Operand::Waiting(tag) {
            *self = Operand::Ready(value);
            true
        } else {
            false
        }
    }
}

/// Reservation station entry. An unused operand slot (the second slot of a
/// load) is `None`; stores use the first slot for the base address operand
/// and the second for the data to store.
#[derive(Debug, Clone)]
pub struct ReservationStation {
    pub id: usize,
    pub busy: bool,
    pub instruction: Option<Instruction>,
    pub j: Option<Operand>,
    pub k: Option<Operand>,
    pub dest: Option<RobTag>,
    pub address: Option<i64>,
    pub instruction_index: usize,
    pub remaining_cycles: usize,
}

impl ReservationStation {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            busy: false,
            instruction: None,
            j: None,
            k: None,
            dest: None,
            address: None,
            instruction_index: 0,
            remaining_cycles: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &mut self,
        instruction: Instruction,
        j: Option<Operand>,
        k: Option<Operand>,
        dest: RobTag,
        address: Option<i64>,
        instruction_index: usize,
        latency: usize,
    ) {
        self.busy = true;
        self.instruction = Some(instruction);
        self.j = j;
        self.k = k;
        self.dest = Some(dest);
        self.address = address;
        self.instruction_index = instruction_index;
        self.remaining_cycles = latency;
    }

    /// Both operand slots resolved (an unused slot counts as resolved).
    pub fn operands_ready(&self) -> bool {
        self.j.map_or(true, |op| op.is_ready()) && self.k.map_or(true, |op| op.is_ready())
    }

    pub fn reset(&mut self) {
        self.busy = false;
        self.instruction = None;
        self.j = None;
        self.k = None;
        self.dest = None;
        self.address = None;
        self.instruction_index = 0;
        self.remaining_cycles = 0;
    }
}

/// What a reorder buffer entry updates at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobEntryKind {
    Arithmetic,
    Load,
    Store,
}

/// Reorder buffer entry. `busy` holds from issue to commit; `ready` flips
/// at write-result. Stores carry the effective address instead of a
/// destination register.
#[derive(Debug, Clone)]
pub struct ReorderBufferEntry {
    pub busy: bool,
    pub ready: bool,
    pub kind: RobEntryKind,
    pub dest_reg: Option<u8>,
    pub address: Option<i64>,
    pub value: i64,
    pub instruction_index: usize,
}

impl ReorderBufferEntry {
    fn new() -> Self {
        Self {
            busy: false,
            ready: false,
            kind: RobEntryKind::Arithmetic,
            dest_reg: None,
            address: None,
            value: 0,
            instruction_index: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Fixed-size circular reorder buffer. Busy entries form a contiguous range
/// from `head` to `tail` modulo capacity.
#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    pub entries: Vec<ReorderBufferEntry>,
    pub head: usize,
    pub tail: usize,
}

impl ReorderBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Reorder buffer depth must be positive");
        Self {
            entries: vec![ReorderBufferEntry::new(); capacity],
            head: 0,
            tail: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Full when the slot at `tail` is still occupied.
    pub fn is_full(&self) -> bool {
        self.entries[self.tail].busy
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| !entry.busy)
    }

    pub fn busy_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.busy).count()
    }

    /// Claim the slot at `tail` for a newly issued instruction and return
    /// its tag. The caller must have checked `is_full` first.
    pub fn allocate(
        &mut self,
        kind: RobEntryKind,
        dest_reg: Option<u8>,
        instruction_index: usize,
    ) -> RobTag {
        debug_assert!(!self.is_full());
        let tag = self.tail;
        let entry = &mut self.entries[tag];
        entry.busy = true;
        entry.ready = false;
        entry.kind = kind;
        entry.dest_reg = dest_reg;
        entry.address = None;
        entry.value = 0;
        entry.instruction_index = instruction_index;
        self.tail = (self.tail + 1) % self.capacity();
        tag
    }

    pub fn get(&self, tag: RobTag) -> &ReorderBufferEntry {
        &self.entries[tag]
    }

    pub fn get_mut(&mut self, tag: RobTag) -> &mut ReorderBufferEntry {
        &mut self.entries[tag]
    }

    pub fn head_entry(&self) -> &ReorderBufferEntry {
        &self.entries[self.head]
    }

    /// Free the head entry and advance the head pointer.
    pub fn retire_head(&mut self) {
        self.entries[self.head].reset();
        self.head = (self.head + 1) % self.capacity();
    }
}

/// Log row recording the cycle of each pipeline event for one instruction.
/// Each field is written exactly once, in non-decreasing cycle order.
#[derive(Debug, Clone, Serialize)]
pub struct InstructionStatus {
    pub instruction: Instruction,
    pub issue: Option<usize>,
    pub exec_complete: Option<usize>,
    pub write_result: Option<usize>,
    pub commit: Option<usize>,
}

impl InstructionStatus {
    pub fn new(instruction: Instruction) -> Self {
        Self {
            instruction,
            issue: None,
            exec_complete: None,
            write_result: None,
            commit: None,
        }
    }
}

/// Register alias table mapping an architectural register to the ROB slot
/// of its newest in-flight writer. Issue overwrites the mapping
/// unconditionally; commit clears it only when it still points at the
/// committing slot.
#[derive(Debug, Clone)]
pub struct RegisterAliasTable {
    pub mapping: Vec<Option<RobTag>>,
}

impl Default for RegisterAliasTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAliasTable {
    pub fn new() -> Self {
        Self {
            mapping: vec![None; NUM_REGISTERS],
        }
    }

    pub fn get(&self, reg: u8) -> Option<RobTag> {
        self.mapping.get(reg as usize).copied().flatten()
    }

    pub fn set(&mut self, reg: u8, tag: RobTag) {
        if let Some(slot) = self.mapping.get_mut(reg as usize) {
            *slot = Some(tag);
        }
    }

    pub fn clear(&mut self, reg: u8) {
        if let Some(slot) = self.mapping.get_mut(reg as usize) {
            *slot = None;
        }
    }
}
