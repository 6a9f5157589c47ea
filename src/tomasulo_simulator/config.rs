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

// config.rs
//
// This file contains the configuration struct for the out-of-order engine:
// reservation station counts per functional unit pool, reorder buffer
// depth, and per-operation latencies.

use crate::reference_simulator::instructions::Instruction;

/// Configuration for the Tomasulo engine.
#[derive(Debug, Clone)]
pub struct TomasuloConfig {
    /// Number of ADD/SUB reservation stations
    pub num_add_stations: usize,
    /// Number of MUL/DIV reservation stations
    pub num_mul_stations: usize,
    /// Number of LOAD/STORE reservation stations
    pub num_load_store_stations: usize,
    /// Reorder buffer depth
    pub rob_size: usize,
    /// Execution latencies in cycles
    pub add_sub_latency: usize,
    pub mul_latency: usize,
    pub div_latency: usize,
    pub load_store_latency: usize,
}

impl Default for TomasuloConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TomasuloConfig {
    /// The reference configuration: 3 ADD/SUB stations, 2 MUL/DIV stations,
    /// 3 LOAD/STORE stations, and a 6-entry reorder buffer.
    pub fn new() -> Self {
        Self {
            num_add_stations: 3,
            num_mul_stations: 2,
            num_load_store_stations: 3,
            rob_size: 6,
            add_sub_latency: 2,
            mul_latency: 10,
            div_latency: 40,
            load_store_latency: 2,
        }
    }

    pub fn with_add_stations(mut self, num: usize) -> Self {
        assert!(num > 0, "Station count must be positive");
        self.num_add_stations = num;
        self
    }

    pub fn with_mul_stations(mut self, num: usize) -> Self {
        assert!(num > 0, "Station count must be positive");
        self.num_mul_stations = num;
        self
    }

    pub fn with_load_store_stations(mut self, num: usize) -> Self {
        assert!(num > 0, "Station count must be positive");
        self.num_load_store_stations = num;
        self
    }

    pub fn with_rob_size(mut self, size: usize) -> Self {
        assert!(size > 0, "Reorder buffer depth must be positive");
        self.rob_size = size;
        self
    }

    pub fn with_latencies(
        mut self,
        add_sub: usize,
        mul: usize,
        div: usize,
        load_store: usize,
    ) -> Self {
        assert!(
            add_sub > 0 && mul > 0 && div > 0 && load_store > 0,
            "Latencies must be positive"
        );
        self.add_sub_latency = add_sub;
        self.mul_latency = mul;
        self.div_latency = div;
        self.load_store_latency = load_store;
        self
    }

    /// The execution latency of an instruction under this configuration.
    pub fn latency_for(&self, instruction: &Instruction) -> usize {
        match instruction {
            Instruction::Add { .. } | Instruction::Sub { .. } => self.add_sub_latency,
            Instruction::Mul { .. } => self.mul_latency,
            Instruction::Div { .. } => self.div_latency,
            Instruction::Lw { .. } | Instruction::Sw { .. } => self.load_store_latency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_configuration() {
        let config = TomasuloConfig::new();
        assert_eq!(config.num_add_stations, 3);
        assert_eq!(config.num_mul_stations, 2);
        assert_eq!(config.num_load_store_stations, 3);
        assert_eq!(config.rob_size, 6);
    }

    #[test]
    fn canonical_latencies() {
        let config = TomasuloConfig::new();
        let div = Instruction::Div { rd: 6, rs1: 1, rs2: 2 };
        let lw = Instruction::Lw { rd: 6, base: 0, offset: 100 };
        assert_eq!(config.latency_for(&div), 40);
        assert_eq!(config.latency_for(&lw), 2);
    }

    #[test]
    #[should_panic(expected = "Reorder buffer depth must be positive")]
    fn zero_rob_depth_is_rejected() {
        let _ = TomasuloConfig::new().with_rob_size(0);
    }
}
