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

// registers.rs
//
// This file contains the architectural register file: 32 general-purpose
// integer registers named R0..R31. Unlike MIPS there is no hardwired zero
// register; R0 is an ordinary register and may hold any value.

pub const NUM_REGISTERS: usize = 32;

#[derive(Debug, Clone)]
pub struct Registers {
    pub data: Vec<i64>,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            data: vec![0; NUM_REGISTERS],
        }
    }

    pub fn read(&self, reg: u8) -> i64 {
        if (reg as usize) < self.data.len() {
            self.data[reg as usize]
        } else {
            0 // Return 0 for out-of-bounds reads
        }
    }

    pub fn write(&mut self, reg: u8, value: i64) {
        if (reg as usize) < self.data.len() {
            self.data[reg as usize] = value;
        }
        // Ignore out-of-bounds writes
    }
}
