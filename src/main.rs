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

// main.rs
//
// This file contains the command-line entry point. It loads an instruction
// file, installs the initial architectural state, runs either the
// out-of-order Tomasulo simulator or the sequential reference interpreter,
// and prints the observable results.

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;
use tomasulo_rust::errors::SimulatorError;
use tomasulo_rust::reference_simulator::instructions::Instruction;
use tomasulo_rust::tomasulo_simulator::visualization::{FinalReport, StateRenderer};
use tomasulo_rust::utils::parser;
use tomasulo_rust::{ReferenceSimulator, TomasuloConfig, TomasuloSimulator};

#[derive(Parser)]
#[command(name = "tomasulo_rust")]
#[command(about = "A Tomasulo out-of-order execution simulator with a reorder buffer")]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the out-of-order Tomasulo simulator
    Tomasulo {
        /// Input instruction file
        #[arg(short, long)]
        input: PathBuf,

        /// Number of ADD/SUB reservation stations
        #[arg(long, default_value_t = 3)]
        add_stations: usize,

        /// Number of MUL/DIV reservation stations
        #[arg(long, default_value_t = 2)]
        mul_stations: usize,

        /// Number of LOAD/STORE reservation stations
        #[arg(long, default_value_t = 3)]
        load_store_stations: usize,

        /// Reorder buffer depth
        #[arg(long, default_value_t = 6)]
        rob_size: usize,

        /// Initial register value, e.g. R0=5 (repeatable)
        #[arg(long = "reg", value_name = "REG=VALUE")]
        registers: Vec<String>,

        /// Initial memory cell, e.g. 105=10 (repeatable)
        #[arg(long = "mem", value_name = "ADDR=VALUE")]
        memory: Vec<String>,

        /// Print the pipeline state tables after every cycle
        #[arg(short, long)]
        trace: bool,

        /// Output format for the final report
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Stop after this many cycles even if the pipeline has not drained
        #[arg(long)]
        max_cycles: Option<usize>,

        /// Disable colored table output
        #[arg(long)]
        no_color: bool,
    },
    /// Run the sequential reference interpreter
    Sequential {
        /// Input instruction file
        #[arg(short, long)]
        input: PathBuf,

        /// Initial register value, e.g. R0=5 (repeatable)
        #[arg(long = "reg", value_name = "REG=VALUE")]
        registers: Vec<String>,

        /// Initial memory cell, e.g. 105=10 (repeatable)
        #[arg(long = "mem", value_name = "ADDR=VALUE")]
        memory: Vec<String>,
    },
}

fn split_assignment(assignment: &str) -> Result<(&str, &str), SimulatorError> {
    assignment.split_once('=')
        .ok_or_else(|| SimulatorError::InvalidAssignment(assignment.to_string()))
}

fn parse_register_assignment(assignment: &str) -> Result<(u8, i64), SimulatorError> {
    let (reg, value) = split_assignment(assignment)?;
    let value = value
        .parse()
        .map_err(|_| SimulatorError::InvalidAssignment(assignment.to_string()))?;
    Ok((parser::parse_register(reg)?, value))
}

fn parse_memory_assignment(assignment: &str) -> Result<(i64, i64), SimulatorError> {
    let (address, value) = split_assignment(assignment)?;
    let address = address
        .parse()
        .map_err(|_| SimulatorError::InvalidAssignment(assignment.to_string()))?;
    let value = value
        .parse()
        .map_err(|_| SimulatorError::InvalidAssignment(assignment.to_string()))?;
    Ok((address, value))
}

// Helper to abort with exit code 1 on any setup failure
fn setup_or_exit<T>(result: Result<T, SimulatorError>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error {}: {}", what, err);
            process::exit(1);
        },
    }
}

fn load_program_or_exit(input: &PathBuf) -> Vec<Instruction> {
    match parser::load_program_file(input) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("Error opening file {}: {}", input.display(), err);
            process::exit(1);
        },
    }
}

fn run_tomasulo(
    program: Vec<Instruction>,
    config: TomasuloConfig,
    registers: &[String],
    memory: &[String],
    trace: bool,
    format: ReportFormat,
    max_cycles: Option<usize>,
    colorize: bool,
) {
    let mut simulator = TomasuloSimulator::new(config);
    for assignment in registers {
        let (reg, value) = setup_or_exit(parse_register_assignment(assignment), "parsing --reg");
        simulator.set_register(reg, value);
    }
    for assignment in memory {
        let (address, value) = setup_or_exit(parse_memory_assignment(assignment), "parsing --mem");
        simulator.set_memory(address, value);
    }
    if let Some(cap) = max_cycles {
        simulator.set_max_cycles(cap);
    }
    simulator.load_program(program);

    let renderer = StateRenderer::new().with_colorize(colorize);
    if trace {
        while !simulator.is_complete() {
            if simulator.cap_reached() {
                break;
            }
            simulator.step();
            println!("{}", renderer.render_cycle(&simulator));
        }
    } else {
        simulator.run();
    }

    match format {
        ReportFormat::Text => {
            println!("{}", renderer.render_final(&simulator));
            println!("{}", simulator.stats());
        },
        ReportFormat::Json => match FinalReport::from_simulator(&simulator).to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Error serializing report: {}", err);
                process::exit(1);
            },
        },
    }
}

fn run_sequential(program: Vec<Instruction>, registers: &[String], memory: &[String]) {
    let mut simulator = ReferenceSimulator::new();
    for assignment in registers {
        let (reg, value) = setup_or_exit(parse_register_assignment(assignment), "parsing --reg");
        simulator.set_register(reg, value);
    }
    for assignment in memory {
        let (address, value) = setup_or_exit(parse_memory_assignment(assignment), "parsing --mem");
        simulator.set_memory(address, value);
    }

    let referenced: BTreeSet<u8> = program
        .iter()
        .flat_map(|instruction| instruction.referenced_registers())
        .collect();

    simulator.load_program(program);
    simulator.run();

    println!("Final Register Values:");
    for reg in referenced {
        println!("R{} = {}", reg, simulator.registers.read(reg));
    }
    println!("\nFinal Memory Values (non-zero cells):");
    for (address, value) in simulator.memory.nonzero_cells() {
        println!("Memory[{}] = {}", address, value);
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .init();

    match cli.command {
        Commands::Tomasulo {
            input,
            add_stations,
            mul_stations,
            load_store_stations,
            rob_size,
            registers,
            memory,
            trace,
            format,
            max_cycles,
            no_color,
        } => {
            let program = load_program_or_exit(&input);
            let config = TomasuloConfig::new()
                .with_add_stations(add_stations)
                .with_mul_stations(mul_stations)
                .with_load_store_stations(load_store_stations)
                .with_rob_size(rob_size);
            run_tomasulo(
                program,
                config,
                &registers,
                &memory,
                trace,
                format,
                max_cycles,
                !no_color,
            );
        },
        Commands::Sequential {
            input,
            registers,
            memory,
        } => {
            let program = load_program_or_exit(&input);
            run_sequential(program, &registers, &memory);
        },
    }
}
