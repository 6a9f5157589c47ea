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

// instructions.rs
//
// This file contains the instruction definitions for the simulator.
// It defines the Instruction enum covering the supported integer subset
// (ADD, SUB, MUL, DIV, LW, SW) and the execute method used by the
// sequential reference interpreter.

use super::memory::Memory;
use super::registers::Registers;
use log::warn;
use serde::Serialize;
use std::fmt;

/// A decoded instruction. Register operands are indices into the 32-entry
/// register file; memory offsets are signed decimal immediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Instruction {
    Add { rd: u8, rs1: u8, rs2: u8 },
    Sub { rd: u8, rs1: u8, rs2: u8 },
    Mul { rd: u8, rs1: u8, rs2: u8 },
    Div { rd: u8, rs1: u8, rs2: u8 },
    Lw { rd: u8, base: u8, offset: i64 },
    Sw { src: u8, base: u8, offset: i64 },
}

impl Instruction {
    /// The architectural register written by this instruction, if any.
    /// Stores write memory, not a register.
    pub fn destination_register(&self) -> Option<u8> {
        match *self {
            Instruction::Add { rd, .. }
            | Instruction::Sub { rd, .. }
            | Instruction::Mul { rd, .. }
            | Instruction::Div { rd, .. }
            | Instruction::Lw { rd, .. } => Some(rd),
            Instruction::Sw { .. } => None,
        }
    }

    /// The signed immediate added to the base register for memory operations.
    pub fn memory_offset(&self) -> Option<i64> {
        match *self {
            Instruction::Lw { offset, .. } | Instruction::Sw { offset, .. } => Some(offset),
            _ => None,
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Instruction::Sw { .. })
    }

    /// Every register named by this instruction, sources and destination alike.
    pub fn referenced_registers(&self) -> Vec<u8> {
        match *self {
            Instruction::Add { rd, rs1, rs2 }
            | Instruction::Sub { rd, rs1, rs2 }
            | Instruction::Mul { rd, rs1, rs2 }
            | Instruction::Div { rd, rs1, rs2 } => vec![rd, rs1, rs2],
            Instruction::Lw { rd, base, .. } => vec![rd, base],
            Instruction::Sw { src, base, .. } => vec![src, base],
        }
    }

    /// Execute this instruction against architectural state, in program
    /// order. This is the behavioral reference the out-of-order engine must
    /// agree with on final state.
    pub fn execute(&self, registers: &mut Registers, memory: &mut Memory) {
        match *self {
            Instruction::Add { rd, rs1, rs2 } => {
                let result = registers.read(rs1).wrapping_add(registers.read(rs2));
                registers.write(rd, result);
            },
            Instruction::Sub { rd, rs1, rs2 } => {
                let result = registers.read(rs1).wrapping_sub(registers.read(rs2));
                registers.write(rd, result);
            },
            Instruction::Mul { rd, rs1, rs2 } => {
                let result = registers.read(rs1).wrapping_mul(registers.read(rs2));
                registers.write(rd, result);
            },
            Instruction::Div { rd, rs1, rs2 } => {
                let divisor = registers.read(rs2);
                let result = if divisor == 0 {
                    warn!("division by zero in {}; result forced to 0", self);
                    0
                } else {
                    registers.read(rs1).wrapping_div(divisor)
                };
                registers.write(rd, result);
            },
            Instruction::Lw { rd, base, offset } => {
                let address = offset.wrapping_add(registers.read(base));
                registers.write(rd, memory.read_word(address));
            },
            Instruction::Sw { src, base, offset } => {
                let address = offset.wrapping_add(registers.read(base));
                memory.write_word(address, registers.read(src));
            },
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Add { rd, rs1, rs2 } => write!(f, "ADD R{} R{} R{}", rd, rs1, rs2),
            Instruction::Sub { rd, rs1, rs2 } => write!(f, "SUB R{} R{} R{}", rd, rs1, rs2),
            Instruction::Mul { rd, rs1, rs2 } => write!(f, "MUL R{} R{} R{}", rd, rs1, rs2),
            Instruction::Div { rd, rs1, rs2 } => write!(f, "DIV R{} R{} R{}", rd, rs1, rs2),
            Instruction::Lw { rd, base, offset } => write!(f, "LW R{} R{} {}", rd, base, offset),
            Instruction::Sw { src, base, offset } => write!(f, "SW R{} R{} {}", src, base, offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_register_covers_every_op() {
        let add = Instruction::Add { rd: 6, rs1: 0, rs2: 1 };
        let lw = Instruction::Lw { rd: 6, base: 0, offset: 100 };
        let sw = Instruction::Sw { src: 6, base: 4, offset: 201 };

        assert_eq!(add.destination_register(), Some(6));
        assert_eq!(lw.destination_register(), Some(6));
        assert_eq!(sw.destination_register(), None);
    }

    #[test]
    fn display_matches_program_text() {
        let sw = Instruction::Sw { src: 6, base: 4, offset: 201 };
        assert_eq!(sw.to_string(), "SW R6 R4 201");
    }
}
