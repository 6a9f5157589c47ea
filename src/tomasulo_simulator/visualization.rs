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

// visualization.rs
//
// This file renders the observable simulator state: per-cycle tables for
// the station pools, the reorder buffer, and the renamed registers, plus
// the final report (instruction timeline, final register values, final
// non-zero memory cells). Text rendering is a pure serializer over the
// state at the end of a cycle; the JSON form goes through serde.

use super::components::{FunctionalUnitType, Operand, ReservationStation};
use super::simulator::Simulator;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;

pub struct StateRenderer {
    pub colorize: bool,
}

impl Default for StateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRenderer {
    pub fn new() -> Self {
        Self { colorize: true }
    }

    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    fn flag(&self, set: bool) -> String {
        match (set, self.colorize) {
            (true, true) => "Yes".yellow().to_string(),
            (false, true) => "No".green().to_string(),
            (true, false) => "Yes".to_string(),
            (false, false) => "No".to_string(),
        }
    }

    fn operand(slot: Option<Operand>) -> String {
        match slot {
            Some(Operand::Ready(value)) => value.to_string(),
            Some(Operand::Waiting(tag)) => format!("ROB{}", tag),
            None => "-".to_string(),
        }
    }

    fn render_station_pool(&self, label: &str, stations: &[ReservationStation]) -> String {
        let mut out = String::new();
        out.push_str(&format!("Reservation Stations {}:\n", label));
        out.push_str("Id    Busy  Op                J         K         Dest    Addr    Cycles\n");
        for rs in stations {
            let op = rs
                .instruction
                .map_or("-".to_string(), |instr| instr.to_string());
            let dest = rs.dest.map_or("-".to_string(), |tag| format!("ROB{}", tag));
            let addr = rs.address.map_or("-".to_string(), |a| a.to_string());
            out.push_str(&format!(
                "{:<5} {:<5} {:<17} {:<9} {:<9} {:<7} {:<7} {}\n",
                rs.id,
                self.flag(rs.busy),
                op,
                Self::operand(rs.j),
                Self::operand(rs.k),
                dest,
                addr,
                rs.remaining_cycles,
            ));
        }
        out
    }

    /// Station, ROB, and register tables for the state at the end of a cycle.
    pub fn render_cycle(&self, simulator: &Simulator) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Cycle {} ===\n", simulator.cycle));

        for unit in FunctionalUnitType::ALL {
            out.push_str(&self.render_station_pool(unit.label(), simulator.pool(unit)));
            out.push('\n');
        }

        out.push_str("Reorder Buffer:\n");
        out.push_str("Slot  Busy  Ready  Dest    Value\n");
        for (slot, entry) in simulator.rob.entries.iter().enumerate() {
            let dest = match (entry.dest_reg, entry.address) {
                (Some(reg), _) => format!("R{}", reg),
                (None, Some(address)) => format!("Mem[{}]", address),
                (None, None) => "-".to_string(),
            };
            let marker = if entry.busy && slot == simulator.rob.head {
                "  <- HEAD"
            } else {
                ""
            };
            out.push_str(&format!(
                "{:<5} {:<5} {:<6} {:<7} {}{}\n",
                slot,
                self.flag(entry.busy),
                self.flag(entry.ready),
                dest,
                entry.value,
                marker,
            ));
        }
        out.push('\n');

        out.push_str("Registers:\n");
        out.push_str("Reg   Value      Pending\n");
        for reg in referenced_registers(simulator) {
            let pending = simulator
                .register_alias_table
                .get(reg)
                .map_or("-".to_string(), |tag| format!("ROB{}", tag));
            out.push_str(&format!(
                "R{:<4} {:<10} {}\n",
                reg,
                simulator.registers.read(reg),
                pending,
            ));
        }
        out
    }

    /// The end-of-run report: timeline, registers the program touched, and
    /// non-zero memory cells in address order.
    pub fn render_final(&self, simulator: &Simulator) -> String {
        let mut out = String::new();
        out.push_str("=== Final Results ===\n\n");

        out.push_str("Instruction Timeline:\n");
        out.push_str(&format!(
            "{:<20} {:>6} {:>6} {:>6} {:>7}\n",
            "Instruction", "Issue", "Exec", "Write", "Commit"
        ));
        for status in &simulator.status_log {
            out.push_str(&format!(
                "{:<20} {:>6} {:>6} {:>6} {:>7}\n",
                status.instruction.to_string(),
                cell(status.issue),
                cell(status.exec_complete),
                cell(status.write_result),
                cell(status.commit),
            ));
        }

        out.push_str("\nFinal Register Values:\n");
        for reg in referenced_registers(simulator) {
            out.push_str(&format!("R{} = {}\n", reg, simulator.registers.read(reg)));
        }

        out.push_str("\nFinal Memory Values (non-zero cells):\n");
        for (address, value) in simulator.memory.nonzero_cells() {
            out.push_str(&format!("Memory[{}] = {}\n", address, value));
        }

        out
    }
}

fn cell(event: Option<usize>) -> String {
    event.map_or("-".to_string(), |cycle| cycle.to_string())
}

/// Registers named anywhere in the program, in ascending order.
fn referenced_registers(simulator: &Simulator) -> Vec<u8> {
    let mut registers = BTreeSet::new();
    for status in &simulator.status_log {
        registers.extend(status.instruction.referenced_registers());
    }
    for instruction in &simulator.instruction_queue {
        registers.extend(instruction.referenced_registers());
    }
    registers.into_iter().collect()
}

/// Machine-readable form of the final report.
#[derive(Debug, Serialize)]
pub struct FinalReport {
    pub cycles: usize,
    pub instructions_committed: usize,
    pub timeline: Vec<TimelineRow>,
    pub registers: Vec<RegisterCell>,
    pub memory: Vec<MemoryCell>,
}

#[derive(Debug, Serialize)]
pub struct TimelineRow {
    pub instruction: String,
    pub issue: Option<usize>,
    pub exec_complete: Option<usize>,
    pub write_result: Option<usize>,
    pub commit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RegisterCell {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct MemoryCell {
    pub address: i64,
    pub value: i64,
}

impl FinalReport {
    pub fn from_simulator(simulator: &Simulator) -> Self {
        Self {
            cycles: simulator.cycle,
            instructions_committed: simulator.instructions_committed,
            timeline: simulator
                .status_log
                .iter()
                .map(|status| TimelineRow {
                    instruction: status.instruction.to_string(),
                    issue: status.issue,
                    exec_complete: status.exec_complete,
                    write_result: status.write_result,
                    commit: status.commit,
                })
                .collect(),
            registers: referenced_registers(simulator)
                .into_iter()
                .map(|reg| RegisterCell {
                    name: format!("R{}", reg),
                    value: simulator.registers.read(reg),
                })
                .collect(),
            memory: simulator
                .memory
                .nonzero_cells()
                .into_iter()
                .map(|(address, value)| MemoryCell { address, value })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_simulator::instructions::Instruction;
    use crate::tomasulo_simulator::config::TomasuloConfig;

    fn finished_simulator() -> Simulator {
        let mut simulator = Simulator::new(TomasuloConfig::new());
        simulator.set_register(0, 5);
        simulator.set_register(1, 3);
        simulator.load_program(vec![Instruction::Add { rd: 6, rs1: 0, rs2: 1 }]);
        simulator.run();
        simulator
    }

    #[test]
    fn final_report_lists_referenced_registers() {
        let simulator = finished_simulator();
        let text = StateRenderer::new().with_colorize(false).render_final(&simulator);
        assert!(text.contains("ADD R6 R0 R1"));
        assert!(text.contains("R6 = 8"));
    }

    #[test]
    fn json_report_round_trips_through_serde() {
        let simulator = finished_simulator();
        let json = FinalReport::from_simulator(&simulator).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["cycles"], 5);
        assert_eq!(parsed["timeline"][0]["commit"], 5);
    }
}
