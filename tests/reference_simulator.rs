// tests/reference_simulator.rs
use tomasulo_rust::utils::parser::parse_program;
use tomasulo_rust::ReferenceSimulator;

fn setup_simulator(program_text: &str) -> ReferenceSimulator {
    let mut simulator = ReferenceSimulator::new();
    for (reg, value) in [(0, 5), (1, 3), (2, 2), (3, 3), (4, 2), (5, 5)] {
        simulator.set_register(reg, value);
    }
    simulator.set_memory(105, 10);
    simulator.load_program(parse_program(program_text));
    simulator
}

#[test]
fn test_arithmetic_chain() {
    let mut simulator = setup_simulator("ADD R6 R0 R1\nSUB R7 R6 R2\nMUL R8 R7 R2");
    simulator.run();

    assert_eq!(simulator.registers.read(6), 8);
    assert_eq!(simulator.registers.read(7), 6);
    assert_eq!(simulator.registers.read(8), 12);
}

#[test]
fn test_division_truncates_and_tolerates_zero() {
    let mut simulator = setup_simulator("DIV R6 R1 R2\nDIV R7 R1 R9");
    simulator.run();

    assert_eq!(simulator.registers.read(6), 1, "3/2 truncates to 1");
    assert_eq!(simulator.registers.read(7), 0, "division by zero yields 0");
}

#[test]
fn test_load_and_store_effective_addresses() {
    let mut simulator = setup_simulator("LW R6 R0 100\nSW R6 R4 201");
    simulator.run();

    assert_eq!(simulator.registers.read(6), 10);
    assert_eq!(simulator.memory.read_word(203), 10);
}

#[test]
fn test_later_writer_wins() {
    let mut simulator = setup_simulator("MUL R6 R0 R1\nADD R6 R1 R2");
    simulator.run();

    assert_eq!(simulator.registers.read(6), 5);
}
