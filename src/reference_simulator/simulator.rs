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

// simulator.rs
//
// This file contains the sequential reference interpreter. It executes the
// program strictly in program order against the same register file and
// memory model the out-of-order engine uses, so the two can be compared on
// final architectural state.

use super::instructions::Instruction;
use super::memory::Memory;
use super::registers::Registers;
use log::debug;

pub struct Simulator {
    pub registers: Registers,
    pub memory: Memory,
    pub program: Vec<Instruction>,
    pub pc: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(),
            program: Vec::new(),
            pc: 0,
        }
    }

    pub fn load_program(&mut self, program: Vec<Instruction>) {
        self.program = program;
        self.pc = 0;
    }

    pub fn set_register(&mut self, reg: u8, value: i64) {
        self.registers.write(reg, value);
    }

    pub fn set_memory(&mut self, address: i64, value: i64) {
        self.memory.write_word(address, value);
    }

    /// Execute the next instruction. Returns false once the program is done.
    pub fn step(&mut self) -> bool {
        let Some(instruction) = self.program.get(self.pc).copied() else {
            return false;
        };
        debug!("[{}] {}", self.pc, instruction);
        instruction.execute(&mut self.registers, &mut self.memory);
        self.pc += 1;
        true
    }

    pub fn run(&mut self) {
        while self.step() {}
    }
}
