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
// This file contains the cycle driver of the out-of-order engine. Each
// cycle runs four phases in a fixed order:
//
//   1. Commit        retire the ROB head if ready
//   2. Write-Result  finished stations write the ROB and broadcast on the CDB
//   3. Execute       ready stations count down their latency
//   4. Issue         the next queued instruction claims a station and a ROB slot
//
// Commit runs first so a freed ROB slot can be reclaimed by Issue in the
// same cycle; Write-Result runs before Execute so a station that reaches
// zero remaining cycles in cycle N writes its result in cycle N+1.

use super::components::{
    FunctionalUnitType, InstructionStatus, Operand, RegisterAliasTable, ReorderBuffer,
    ReservationStation, RobEntryKind, RobTag,
};
use super::config::TomasuloConfig;
use crate::reference_simulator::instructions::Instruction;
use crate::reference_simulator::memory::Memory;
use crate::reference_simulator::registers::Registers;
use log::{debug, warn};
use std::collections::VecDeque;
use std::fmt;

pub struct Simulator {
    pub config: TomasuloConfig,
    pub add_stations: Vec<ReservationStation>,
    pub mul_stations: Vec<ReservationStation>,
    pub load_store_stations: Vec<ReservationStation>,
    pub rob: ReorderBuffer,
    pub register_alias_table: RegisterAliasTable,
    pub registers: Registers,
    pub memory: Memory,
    pub instruction_queue: VecDeque<Instruction>,
    pub status_log: Vec<InstructionStatus>,
    pub cycle: usize,
    pub max_cycles: Option<usize>,
    pub instructions_issued: usize,
    pub instructions_committed: usize,
}

impl Simulator {
    pub fn new(config: TomasuloConfig) -> Self {
        let make_pool = |count: usize| (0..count).map(ReservationStation::new).collect();
        Self {
            add_stations: make_pool(config.num_add_stations),
            mul_stations: make_pool(config.num_mul_stations),
            load_store_stations: make_pool(config.num_load_store_stations),
            rob: ReorderBuffer::new(config.rob_size),
            register_alias_table: RegisterAliasTable::new(),
            registers: Registers::new(),
            memory: Memory::new(),
            instruction_queue: VecDeque::new(),
            status_log: Vec::new(),
            cycle: 0,
            max_cycles: None,
            instructions_issued: 0,
            instructions_committed: 0,
            config,
        }
    }

    pub fn load_program<I: IntoIterator<Item = Instruction>>(&mut self, program: I) {
        self.instruction_queue.extend(program);
    }

    pub fn set_register(&mut self, reg: u8, value: i64) {
        self.registers.write(reg, value);
    }

    pub fn set_memory(&mut self, address: i64, value: i64) {
        self.memory.write_word(address, value);
    }

    pub fn set_max_cycles(&mut self, max_cycles: usize) {
        self.max_cycles = Some(max_cycles);
    }

    /// Advance the simulation by one cycle.
    pub fn step(&mut self) {
        self.cycle += 1;
        self.commit();
        self.write_results();
        self.execute();
        self.issue();
    }

    /// Run until the pipeline drains (or the optional cycle cap is hit).
    pub fn run(&mut self) {
        while !self.is_complete() {
            if self.cap_reached() {
                break;
            }
            self.step();
        }
    }

    /// True once the optional cycle cap has been hit, with the diagnostic
    /// emitted. Callers driving `step()` themselves check this the same way
    /// `run` does.
    pub fn cap_reached(&self) -> bool {
        match self.max_cycles {
            Some(cap) if self.cycle >= cap => {
                warn!("cycle cap {} reached before the pipeline drained", cap);
                true
            },
            _ => false,
        }
    }

    /// Complete when the input queue is drained, every station is idle, and
    /// the reorder buffer is empty.
    pub fn is_complete(&self) -> bool {
        self.instruction_queue.is_empty()
            && self.all_stations().all(|rs| !rs.busy)
            && self.rob.is_empty()
    }

    pub fn all_stations(&self) -> impl Iterator<Item = &ReservationStation> {
        self.add_stations
            .iter()
            .chain(self.mul_stations.iter())
            .chain(self.load_store_stations.iter())
    }

    pub fn pool(&self, unit: FunctionalUnitType) -> &[ReservationStation] {
        match unit {
            FunctionalUnitType::AddSub => &self.add_stations,
            FunctionalUnitType::MulDiv => &self.mul_stations,
            FunctionalUnitType::LoadStore => &self.load_store_stations,
        }
    }

    fn pool_mut(&mut self, unit: FunctionalUnitType) -> &mut [ReservationStation] {
        match unit {
            FunctionalUnitType::AddSub => &mut self.add_stations,
            FunctionalUnitType::MulDiv => &mut self.mul_stations,
            FunctionalUnitType::LoadStore => &mut self.load_store_stations,
        }
    }

    /// Phase 1: retire the ROB head entry if it has written its result.
    /// At most one instruction retires per cycle. A register write is
    /// suppressed when a younger instruction has re-renamed the register;
    /// the younger writer's commit will install the final value.
    fn commit(&mut self) {
        let head = self.rob.head;
        let entry = self.rob.head_entry();
        if !entry.busy || !entry.ready {
            return;
        }
        let (kind, dest_reg, address, value, instruction_index) = (
            entry.kind,
            entry.dest_reg,
            entry.address,
            entry.value,
            entry.instruction_index,
        );

        match kind {
            RobEntryKind::Arithmetic | RobEntryKind::Load => {
                if let Some(rd) = dest_reg {
                    if self.register_alias_table.get(rd) == Some(head) {
                        self.registers.write(rd, value);
                        self.register_alias_table.clear(rd);
                    }
                }
            },
            RobEntryKind::Store => {
                self.memory.write_word(address.unwrap_or(0), value);
            },
        }

        self.status_log[instruction_index].commit = Some(self.cycle);
        self.rob.retire_head();
        self.instructions_committed += 1;
        debug!(
            "cycle {}: commit ROB[{}] {}",
            self.cycle, head, self.status_log[instruction_index].instruction
        );
    }

    /// Phase 2: every station that has finished executing computes its
    /// result, writes it into its ROB entry, and (except for stores)
    /// broadcasts it on the common data bus. The station is freed in the
    /// same cycle.
    fn write_results(&mut self) {
        for unit in FunctionalUnitType::ALL {
            for idx in 0..self.pool(unit).len() {
                let (instruction, j, k, dest, address, instruction_index) = {
                    let rs = &self.pool(unit)[idx];
                    if !rs.busy || rs.remaining_cycles != 0 {
                        continue;
                    }
                    let Some(instruction) = rs.instruction else {
                        continue;
                    };
                    let Some(dest) = rs.dest else {
                        continue;
                    };
                    (
                        instruction,
                        rs.j.map_or(0, |op| op.value()),
                        rs.k.map_or(0, |op| op.value()),
                        dest,
                        rs.address,
                        rs.instruction_index,
                    )
                };

                let value = self.compute_result(&instruction, j, k, address);

                let entry = self.rob.get_mut(dest);
                entry.value = value;
                entry.ready = true;
                if instruction.is_store() && entry.address.is_none() {
                    entry.address = address;
                }

                self.status_log[instruction_index].write_result = Some(self.cycle);
                self.pool_mut(unit)[idx].reset();

                // Stores produce no register value; nothing waits on them.
                if !instruction.is_store() {
                    self.broadcast(dest, value);
                }
                debug!(
                    "cycle {}: write-result ROB[{}] {} = {}",
                    self.cycle, dest, instruction, value
                );
            }
        }
    }

    fn compute_result(&self, instruction: &Instruction, j: i64, k: i64, address: Option<i64>) -> i64 {
        match instruction {
            Instruction::Add { .. } => j.wrapping_add(k),
            Instruction::Sub { .. } => j.wrapping_sub(k),
            Instruction::Mul { .. } => j.wrapping_mul(k),
            Instruction::Div { .. } => {
                if k == 0 {
                    warn!("division by zero in {}; result forced to 0", instruction);
                    0
                } else {
                    j.wrapping_div(k)
                }
            },
            Instruction::Lw { .. } => self.memory.read_word(address.unwrap_or(0)),
            // The store data rides in the ROB entry until commit.
            Instruction::Sw { .. } => k,
        }
    }

    /// CDB broadcast: resolve every operand slot waiting on `tag`. When the
    /// base of a memory-op station resolves, its effective address becomes
    /// known; a store also records the address in its ROB entry so commit
    /// knows which cell to write.
    fn broadcast(&mut self, tag: RobTag, value: i64) {
        let stations = self
            .add_stations
            .iter_mut()
            .chain(self.mul_stations.iter_mut())
            .chain(self.load_store_stations.iter_mut());
        for rs in stations {
            if !rs.busy {
                continue;
            }
            if let Some(op) = rs.j.as_mut() {
                if op.capture(tag, value) && rs.address.is_none() {
                    if let Some(instruction) = rs.instruction {
                        if let Some(offset) = instruction.memory_offset() {
                            let address = offset.wrapping_add(value);
                            rs.address = Some(address);
                            if instruction.is_store() {
                                if let Some(dest) = rs.dest {
                                    self.rob.get_mut(dest).address = Some(address);
                                }
                            }
                        }
                    }
                }
            }
            if let Some(op) = rs.k.as_mut() {
                op.capture(tag, value);
            }
        }
    }

    /// Phase 3: every busy station with all operands resolved counts down
    /// one cycle. Reaching zero records the exec-complete timestamp; the
    /// result is written in the next cycle's Write-Result phase.
    fn execute(&mut self) {
        let cycle = self.cycle;
        let stations = self
            .add_stations
            .iter_mut()
            .chain(self.mul_stations.iter_mut())
            .chain(self.load_store_stations.iter_mut());
        for rs in stations {
            if !rs.busy || !rs.operands_ready() || rs.remaining_cycles == 0 {
                continue;
            }
            // A memory op's effective address is computed at issue or on the
            // CDB capture that resolved its base, so it is known by the time
            // the station is ready to execute.
            if let Some(instruction) = rs.instruction {
                debug_assert!(instruction.memory_offset().is_none() || rs.address.is_some());
            }
            rs.remaining_cycles -= 1;
            if rs.remaining_cycles == 0 {
                self.status_log[rs.instruction_index].exec_complete = Some(cycle);
            }
        }
    }

    /// Phase 4: issue the instruction at the head of the queue, if a
    /// station in the matching pool and the ROB slot at `tail` are both
    /// free. Structural hazards stall issue; they are not errors.
    fn issue(&mut self) {
        let Some(&instruction) = self.instruction_queue.front() else {
            return;
        };
        if self.rob.is_full() {
            return;
        }
        let unit = FunctionalUnitType::for_instruction(&instruction);
        let Some(station_idx) = self.pool(unit).iter().position(|rs| !rs.busy) else {
            return;
        };

        self.instruction_queue.pop_front();
        let instruction_index = self.status_log.len();
        let mut status = InstructionStatus::new(instruction);
        status.issue = Some(self.cycle);
        self.status_log.push(status);

        let kind = match instruction {
            Instruction::Lw { .. } => RobEntryKind::Load,
            Instruction::Sw { .. } => RobEntryKind::Store,
            _ => RobEntryKind::Arithmetic,
        };
        let tag = self
            .rob
            .allocate(kind, instruction.destination_register(), instruction_index);

        // Operand capture. Reading happens before the destination rename so
        // an instruction that reads and writes the same register sees its
        // previous producer.
        let (j, k, address) = match instruction {
            Instruction::Add { rs1, rs2, .. }
            | Instruction::Sub { rs1, rs2, .. }
            | Instruction::Mul { rs1, rs2, .. }
            | Instruction::Div { rs1, rs2, .. } => (
                Some(self.read_operand(rs1)),
                Some(self.read_operand(rs2)),
                None,
            ),
            Instruction::Lw { base, offset, .. } => {
                let j = self.read_operand(base);
                let address = match j {
                    Operand::Ready(base_value) => Some(offset.wrapping_add(base_value)),
                    Operand::Waiting(_) => None,
                };
                (Some(j), None, address)
            },
            Instruction::Sw { src, base, offset } => {
                let j = self.read_operand(base);
                let address = match j {
                    Operand::Ready(base_value) => Some(offset.wrapping_add(base_value)),
                    Operand::Waiting(_) => None,
                };
                (Some(j), Some(self.read_operand(src)), address)
            },
        };
        if instruction.is_store() {
            self.rob.get_mut(tag).address = address;
        }
        if let Some(rd) = instruction.destination_register() {
            self.register_alias_table.set(rd, tag);
        }

        let latency = self.config.latency_for(&instruction);
        self.pool_mut(unit)[station_idx].issue(
            instruction,
            j,
            k,
            tag,
            address,
            instruction_index,
            latency,
        );
        self.instructions_issued += 1;
        debug!(
            "cycle {}: issue {} to {}[{}] as ROB[{}]",
            self.cycle,
            instruction,
            unit.label(),
            station_idx,
            tag
        );
    }

    /// Read a source register for operand capture. A register with no
    /// pending writer supplies its architectural value; a pending writer
    /// that already wrote its result is bypassed from the ROB; otherwise
    /// the slot waits on the writer's tag.
    fn read_operand(&self, reg: u8) -> Operand {
        match self.register_alias_table.get(reg) {
            Some(tag) => {
                let entry = self.rob.get(tag);
                if entry.ready {
                    Operand::Ready(entry.value)
                } else {
                    Operand::Waiting(tag)
                }
            },
            None => Operand::Ready(self.registers.read(reg)),
        }
    }

    /// Summary counters for the completed (or capped) simulation.
    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            cycles: self.cycle,
            instructions_issued: self.instructions_issued,
            instructions_committed: self.instructions_committed,
            ipc: if self.cycle > 0 {
                self.instructions_committed as f32 / self.cycle as f32
            } else {
                0.0
            },
            rob_occupancy: self.rob.busy_count(),
            stations_busy: self.all_stations().filter(|rs| rs.busy).count(),
        }
    }
}

/// Performance counters reported after a run.
pub struct SimulationStats {
    pub cycles: usize,
    pub instructions_issued: usize,
    pub instructions_committed: usize,
    pub ipc: f32,
    pub rob_occupancy: usize,
    pub stations_busy: usize,
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Statistics:")?;
        writeln!(f, "  Cycles: {}", self.cycles)?;
        writeln!(f, "  Instructions Issued: {}", self.instructions_issued)?;
        writeln!(f, "  Instructions Committed: {}", self.instructions_committed)?;
        write!(f, "  Instructions Per Cycle (IPC): {:.2}", self.ipc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator_with(program: &[Instruction]) -> Simulator {
        let mut simulator = Simulator::new(TomasuloConfig::new());
        simulator.load_program(program.to_vec());
        simulator
    }

    #[test]
    fn single_add_timeline() {
        let mut simulator = simulator_with(&[Instruction::Add { rd: 6, rs1: 0, rs2: 1 }]);
        simulator.set_register(0, 5);
        simulator.set_register(1, 3);
        simulator.run();

        let status = &simulator.status_log[0];
        assert_eq!(status.issue, Some(1));
        assert_eq!(status.exec_complete, Some(3));
        assert_eq!(status.write_result, Some(4));
        assert_eq!(status.commit, Some(5));
        assert_eq!(simulator.registers.read(6), 8);
        assert_eq!(simulator.cycle, 5);
    }

    #[test]
    fn issue_stalls_when_rob_is_full() {
        let config = TomasuloConfig::new().with_rob_size(1);
        let mut simulator = Simulator::new(config);
        simulator.load_program(vec![
            Instruction::Add { rd: 6, rs1: 0, rs2: 1 },
            Instruction::Add { rd: 7, rs1: 0, rs2: 1 },
        ]);
        simulator.step(); // cycle 1: first instruction issues
        simulator.step(); // cycle 2: ROB full, second must wait
        assert_eq!(simulator.status_log.len(), 1);
        simulator.run();
        assert_eq!(simulator.status_log[1].issue, Some(5)); // issued as the first commits
    }

    #[test]
    fn termination_oracle_requires_drained_state() {
        let mut simulator = simulator_with(&[Instruction::Add { rd: 6, rs1: 0, rs2: 1 }]);
        assert!(!simulator.is_complete());
        simulator.run();
        assert!(simulator.is_complete());
        assert!(simulator.instruction_queue.is_empty());
        assert!(simulator.rob.is_empty());
    }

    #[test]
    fn cycle_cap_stops_a_run() {
        let mut simulator = simulator_with(&[Instruction::Div { rd: 6, rs1: 1, rs2: 2 }]);
        simulator.set_max_cycles(10);
        simulator.run();
        assert_eq!(simulator.cycle, 10);
        assert!(!simulator.is_complete());
    }
}
