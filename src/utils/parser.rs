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

// parser.rs
//
// This file contains the line-oriented parser for instruction text. Each
// line holds one instruction with whitespace-separated tokens; blank lines
// and lines starting with '#' are ignored. Lines that fail to parse are
// reported and skipped rather than aborting the whole program.

use crate::errors::SimulatorError;
use crate::reference_simulator::instructions::Instruction;
use crate::reference_simulator::registers::NUM_REGISTERS;
use log::warn;
use std::fs;
use std::path::Path;

/// Load a program from a file. Opening the file is the only fatal error;
/// individual bad lines are diagnosed and skipped.
pub fn load_program_file(path: &Path) -> Result<Vec<Instruction>, SimulatorError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_program(&text))
}

/// Parse a whole program, skipping comment lines, blank lines, and lines
/// that do not parse.
pub fn parse_program(text: &str) -> Vec<Instruction> {
    let mut program = Vec::new();
    for line in text.lines() {
        match parse_line(line) {
            Ok(Some(instruction)) => program.push(instruction),
            Ok(None) => {},
            Err(err) => warn!("skipping line {:?}: {}", line.trim(), err),
        }
    }
    program
}

/// Parse a single line. Returns Ok(None) for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Instruction>, SimulatorError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let opcode = tokens[0].to_uppercase();

    let instruction = match opcode.as_str() {
        "ADD" | "SUB" | "MUL" | "DIV" => {
            let [rd, rs1, rs2] = expect_operands::<3>(trimmed, &tokens)?;
            let rd = parse_register(rd)?;
            let rs1 = parse_register(rs1)?;
            let rs2 = parse_register(rs2)?;
            match opcode.as_str() {
                "ADD" => Instruction::Add { rd, rs1, rs2 },
                "SUB" => Instruction::Sub { rd, rs1, rs2 },
                "MUL" => Instruction::Mul { rd, rs1, rs2 },
                _ => Instruction::Div { rd, rs1, rs2 },
            }
        },
        "LW" => {
            let [rd, base, imm] = expect_operands::<3>(trimmed, &tokens)?;
            Instruction::Lw {
                rd: parse_register(rd)?,
                base: parse_register(base)?,
                offset: parse_immediate(imm)?,
            }
        },
        "SW" => {
            let [src, base, imm] = expect_operands::<3>(trimmed, &tokens)?;
            Instruction::Sw {
                src: parse_register(src)?,
                base: parse_register(base)?,
                offset: parse_immediate(imm)?,
            }
        },
        _ => return Err(SimulatorError::UnknownOpcode(opcode)),
    };

    Ok(Some(instruction))
}

/// Parse a register token of the form R0..R31.
pub fn parse_register(token: &str) -> Result<u8, SimulatorError> {
    let number = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(|| SimulatorError::InvalidRegister(token.to_string()))?;
    let index: usize = number
        .parse()
        .map_err(|_| SimulatorError::InvalidRegister(token.to_string()))?;
    if index >= NUM_REGISTERS {
        return Err(SimulatorError::InvalidRegister(token.to_string()));
    }
    Ok(index as u8)
}

/// Parse a signed decimal immediate.
pub fn parse_immediate(token: &str) -> Result<i64, SimulatorError> {
    token
        .parse()
        .map_err(|_| SimulatorError::InvalidImmediate(token.to_string()))
}

fn expect_operands<'a, const N: usize>(
    line: &str,
    tokens: &[&'a str],
) -> Result<[&'a str; N], SimulatorError> {
    if tokens.len() != N + 1 {
        return Err(SimulatorError::MalformedInstruction(line.to_string()));
    }
    let mut operands = [""; N];
    operands.copy_from_slice(&tokens[1..]);
    Ok(operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_arithmetic_forms() {
        let program = parse_program("ADD R6 R0 R1\nSUB R7 R6 R2\n");
        assert_eq!(
            program,
            vec![
                Instruction::Add { rd: 6, rs1: 0, rs2: 1 },
                Instruction::Sub { rd: 7, rs1: 6, rs2: 2 },
            ]
        );
    }

    #[test]
    fn parses_memory_forms_with_signed_immediates() {
        let program = parse_program("LW R6 R0 100\nSW R6 R4 -8\n");
        assert_eq!(
            program,
            vec![
                Instruction::Lw { rd: 6, base: 0, offset: 100 },
                Instruction::Sw { src: 6, base: 4, offset: -8 },
            ]
        );
    }

    #[test]
    fn skips_comments_blanks_and_bad_lines() {
        let text = "# setup\n\nADD R6 R0 R1\nNOP R1 R2 R3\nADD R6\nADD R99 R0 R1\n";
        let program = parse_program(text);
        assert_eq!(program, vec![Instruction::Add { rd: 6, rs1: 0, rs2: 1 }]);
    }

    #[test]
    fn rejects_bad_register_tokens() {
        assert!(parse_register("R32").is_err());
        assert!(parse_register("X5").is_err());
        assert!(parse_register("R").is_err());
        assert_eq!(parse_register("r31").unwrap(), 31);
    }
}
