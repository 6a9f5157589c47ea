// tests/edge_cases.rs
use tomasulo_rust::reference_simulator::instructions::Instruction;
use tomasulo_rust::{TomasuloConfig, TomasuloSimulator};

/// Boundary behavior: structural stalls, division by zero, WAW renaming,
/// and stores whose base register is still in flight.

fn run_with_config(config: TomasuloConfig, program: Vec<Instruction>) -> TomasuloSimulator {
    let mut simulator = TomasuloSimulator::new(config);
    for (reg, value) in [(0, 5), (1, 3), (2, 2), (3, 3), (4, 2), (5, 5)] {
        simulator.set_register(reg, value);
    }
    simulator.set_memory(105, 10);
    simulator.load_program(program);
    simulator.run();
    simulator
}

#[test]
fn test_full_rob_stalls_issue() {
    // Three independent adds against a 2-entry ROB: the third cannot issue
    // until the first commits and frees its slot in cycle 5.
    let config = TomasuloConfig::new().with_rob_size(2);
    let simulator = run_with_config(
        config,
        vec![
            Instruction::Add { rd: 6, rs1: 0, rs2: 1 },
            Instruction::Add { rd: 7, rs1: 0, rs2: 2 },
            Instruction::Add { rd: 8, rs1: 1, rs2: 2 },
        ],
    );

    let issues: Vec<usize> = simulator
        .status_log
        .iter()
        .map(|status| status.issue.unwrap())
        .collect();
    assert_eq!(issues, vec![1, 2, 5]);
    assert_eq!(simulator.registers.read(6), 8);
    assert_eq!(simulator.registers.read(7), 7);
    assert_eq!(simulator.registers.read(8), 5);
}

#[test]
fn test_full_station_pool_stalls_issue() {
    // A single ADD/SUB station: the second add waits for the station to be
    // freed at the first one's write-result in cycle 4.
    let config = TomasuloConfig::new().with_add_stations(1);
    let simulator = run_with_config(
        config,
        vec![
            Instruction::Add { rd: 6, rs1: 0, rs2: 1 },
            Instruction::Add { rd: 7, rs1: 0, rs2: 2 },
        ],
    );

    assert_eq!(simulator.status_log[0].issue, Some(1));
    assert_eq!(simulator.status_log[1].issue, Some(4));
    assert_eq!(simulator.status_log[1].exec_complete, Some(6));
    assert_eq!(simulator.registers.read(7), 7);
}

#[test]
fn test_division_by_zero_yields_zero_and_retires() {
    // R9 was never initialized and reads as 0.
    let simulator = run_with_config(
        TomasuloConfig::new(),
        vec![Instruction::Div { rd: 6, rs1: 1, rs2: 9 }],
    );

    assert_eq!(simulator.registers.read(6), 0);
    assert!(simulator.status_log[0].commit.is_some(), "the DIV must still retire");
    assert!(simulator.is_complete());
}

#[test]
fn test_waw_rename_suppresses_older_register_write() {
    // The ADD re-renames R6 while the MUL is still executing. The MUL
    // commits first (program order) but must not clobber the register; the
    // ADD's value is the architectural result.
    let simulator = run_with_config(
        TomasuloConfig::new(),
        vec![
            Instruction::Mul { rd: 6, rs1: 0, rs2: 1 },
            Instruction::Add { rd: 6, rs1: 1, rs2: 2 },
        ],
    );

    assert_eq!(simulator.status_log[0].commit, Some(13));
    assert_eq!(simulator.status_log[1].commit, Some(14));
    assert_eq!(
        simulator.registers.read(6),
        5,
        "the younger writer's value must survive"
    );
}

#[test]
fn test_waw_chain_of_three_writers() {
    let simulator = run_with_config(
        TomasuloConfig::new(),
        vec![
            Instruction::Mul { rd: 6, rs1: 0, rs2: 1 },
            Instruction::Add { rd: 6, rs1: 1, rs2: 2 },
            Instruction::Sub { rd: 6, rs1: 0, rs2: 1 },
        ],
    );

    assert_eq!(simulator.registers.read(6), 2, "R6 should hold 5-3");
}

#[test]
fn test_store_with_pending_base_register() {
    // The store's base register is itself the target of an in-flight load.
    // Its effective address resolves on the load's CDB broadcast, not at
    // issue.
    let simulator = run_with_config(
        TomasuloConfig::new(),
        vec![
            Instruction::Lw { rd: 4, base: 0, offset: 100 },
            Instruction::Sw { src: 1, base: 4, offset: 0 },
        ],
    );

    // The load brings in memory[105] = 10; the store then writes R1=3 to
    // address 0+10.
    assert_eq!(simulator.status_log[0].write_result, Some(4));
    assert_eq!(simulator.status_log[1].exec_complete, Some(5));
    assert_eq!(simulator.memory.read_word(10), 3);
}

#[test]
fn test_load_from_untouched_address_reads_zero() {
    let simulator = run_with_config(
        TomasuloConfig::new(),
        vec![Instruction::Lw { rd: 6, base: 0, offset: 7000 }],
    );
    assert_eq!(simulator.registers.read(6), 0);
}

#[test]
fn test_instruction_reading_its_own_destination() {
    // ADD R6 R6 R1 must read the pre-rename value of R6.
    let mut simulator = TomasuloSimulator::new(TomasuloConfig::new());
    simulator.set_register(6, 10);
    simulator.set_register(1, 3);
    simulator.load_program(vec![Instruction::Add { rd: 6, rs1: 6, rs2: 1 }]);
    simulator.run();
    assert_eq!(simulator.registers.read(6), 13);
}

#[test]
fn test_negative_effective_address() {
    let mut simulator = TomasuloSimulator::new(TomasuloConfig::new());
    simulator.set_register(0, 5);
    simulator.set_register(1, 42);
    simulator.load_program(vec![Instruction::Sw { src: 1, base: 0, offset: -8 }]);
    simulator.run();
    assert_eq!(simulator.memory.read_word(-3), 42);
}
