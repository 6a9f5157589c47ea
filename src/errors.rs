use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SimulatorError {
    // Program text errors
    UnknownOpcode(String),
    InvalidRegister(String),
    InvalidImmediate(String),
    MalformedInstruction(String),

    // Initial-state installation errors
    InvalidAssignment(String),

    // System errors
    IoError(std::io::Error),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::UnknownOpcode(op) => {
                write!(f, "Unknown instruction opcode: {}", op)
            },
            SimulatorError::InvalidRegister(name) => {
                write!(f, "Invalid register name: {} (expected R0..R31)", name)
            },
            SimulatorError::InvalidImmediate(imm) => {
                write!(f, "Invalid immediate value: {}", imm)
            },
            SimulatorError::MalformedInstruction(line) => {
                write!(f, "Malformed instruction: {}", line)
            },
            SimulatorError::InvalidAssignment(assignment) => {
                write!(f, "Invalid assignment (expected KEY=VALUE): {}", assignment)
            },
            SimulatorError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for SimulatorError {}

impl From<std::io::Error> for SimulatorError {
    fn from(error: std::io::Error) -> Self {
        SimulatorError::IoError(error)
    }
}
