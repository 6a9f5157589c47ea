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

// memory.rs
//
// This file contains the sparse data memory for the simulator. Memory is a
// partial map from a signed word address to an integer value; cells that
// were never written read as 0. Effective addresses come from
// immediate-plus-base computation and may be any signed value.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Memory {
    pub cells: HashMap<i64, i64>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    pub fn read_word(&self, address: i64) -> i64 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    pub fn write_word(&mut self, address: i64, value: i64) {
        self.cells.insert(address, value);
    }

    /// Cells holding a non-zero value, sorted by numeric address. Used by
    /// the final report.
    pub fn nonzero_cells(&self) -> Vec<(i64, i64)> {
        let mut cells: Vec<(i64, i64)> = self
            .cells
            .iter()
            .filter(|(_, &value)| value != 0)
            .map(|(&address, &value)| (address, value))
            .collect();
        cells.sort_by_key(|&(address, _)| address);
        cells
    }
}
