//! Command line frontend of the rotor machine simulator.
//!
//! The processing subcommands read a machine state followed by a 0xFF
//! separator and the payload from stdin, print the machine output and,
//! with `--state-progression`, append 0xFF and the new state. The
//! `makestate` subcommand builds states from machine names, key=value
//! configuration pairs or the randomizer.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{error, info};

use rotorsim_rs::error::SimulatorError;
use rotorsim_rs::machine::{MachineKind, RotorMachine};
use rotorsim_rs::state::Document;
use rotorsim_rs::utils::group_text;
use rotorsim_rs::{config, randomize};

/// Exit code for machine level errors.
const EXIT_MACHINE_ERROR: u8 = 42;
/// Exit code for state and header format errors.
const EXIT_FORMAT_ERROR: u8 = 43;
/// Exit code for transport and I/O errors.
const EXIT_TRANSPORT_ERROR: u8 = 44;

/// Command line arguments of the simulator.
#[derive(Parser)]
#[command(name = "rotorsim_rs")]
#[command(about = "A simulator for historical rotor cipher machines")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypts the payload following the state on stdin
    Encrypt {
        /// Output group size (0 = no grouping)
        #[arg(short = 'g', long, default_value_t = 0)]
        grouping: usize,

        /// Rotor positions to set before processing
        #[arg(short = 'p', long)]
        positions: Option<String>,

        /// Append the resulting machine state to the output
        #[arg(long)]
        state_progression: bool,
    },

    /// Decrypts the payload following the state on stdin
    Decrypt {
        /// Rotor positions to set before processing
        #[arg(short = 'p', long)]
        positions: Option<String>,

        /// Append the resulting machine state to the output
        #[arg(long)]
        state_progression: bool,
    },

    /// Steps the machine and prints the visualised rotor positions
    Step {
        #[arg(long, default_value_t = 1)]
        num_iterations: usize,

        #[arg(long)]
        state_progression: bool,
    },

    /// Setup steps one SIGABA control rotor
    Sigabasetup {
        /// Control rotor to step (1-5)
        #[arg(long)]
        rotor_num: usize,

        #[arg(long, default_value_t = 1)]
        num_iterations: usize,

        #[arg(long)]
        state_progression: bool,
    },

    /// Prints the current rotor positions
    Getpos,

    /// Prints the machine configuration as key=value lines
    Getconfig,

    /// Prints the machine permutations produced while stepping
    Perm {
        #[arg(long, default_value_t = 0)]
        num_iterations: usize,
    },

    /// Builds a machine state and writes it to stdout
    Makestate {
        /// Machine name (Services, M3, M4, Railway, Tirpitz, Abwehr, KD,
        /// Typex, SIGABA, KL7, Nema, SG39)
        #[arg(short, long)]
        machine: String,

        /// Randomize the state instead of using defaults
        #[arg(long)]
        random: bool,

        /// Randomizer parameter token
        #[arg(long, default_value = "")]
        randparm: String,

        /// Rotor positions to set on the new state
        #[arg(short = 'p', long, default_value = "")]
        positions: String,

        /// Configuration overrides as key=value pairs
        #[arg(value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
}

/// Splits the stdin payload at the 0xFF terminator into state and input
/// data.
fn split_transport(raw: &[u8]) -> Result<(String, String), SimulatorError> {
    let (state_bytes, data_bytes) = match raw.iter().position(|&b| b == 0xFF) {
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, &raw[raw.len()..]),
    };

    let state = String::from_utf8(state_bytes.to_vec())
        .map_err(|_| SimulatorError::TransportError("state is not valid UTF-8".to_string()))?;
    let data = String::from_utf8(data_bytes.to_vec())
        .map_err(|_| SimulatorError::TransportError("payload is not valid UTF-8".to_string()))?;

    Ok((state, data))
}

fn read_machine_and_payload() -> Result<(RotorMachine, String), SimulatorError> {
    let mut raw = Vec::new();
    std::io::stdin().read_to_end(&mut raw)?;

    let (state, data) = split_transport(&raw)?;

    if state.trim().is_empty() {
        return Err(SimulatorError::MachineNotReady(
            "no machine state on stdin".to_string(),
        ));
    }

    let machine = RotorMachine::from_state_text(&state)?;

    Ok((machine, data.trim().to_string()))
}

fn write_output(text: &str, machine: &RotorMachine, with_state: bool) -> Result<(), SimulatorError> {
    let mut stdout = std::io::stdout();

    stdout.write_all(text.as_bytes())?;
    stdout.write_all(b"\n")?;

    if with_state {
        stdout.write_all(&[0xFF])?;
        stdout.write_all(machine.save().render().as_bytes())?;
    }

    Ok(())
}

fn run_process_command(command: &Commands) -> Result<(), SimulatorError> {
    let (mut machine, payload) = read_machine_and_payload()?;

    match command {
        Commands::Encrypt {
            grouping,
            positions,
            state_progression,
        } => {
            if let Some(positions) = positions {
                machine.set_positions(positions)?;
            }

            let ciphertext = machine.encrypt(&payload.to_lowercase())?;
            let output = if *grouping > 0 {
                group_text(&ciphertext, false, *grouping, 10)
            } else {
                ciphertext
            };

            write_output(&output, &machine, *state_progression)
        }
        Commands::Decrypt {
            positions,
            state_progression,
        } => {
            if let Some(positions) = positions {
                machine.set_positions(positions)?;
            }

            let plaintext = machine.decrypt(&payload.to_lowercase())?;
            write_output(&plaintext, &machine, *state_progression)
        }
        Commands::Step {
            num_iterations,
            state_progression,
        } => {
            let positions = machine.step(*num_iterations);
            write_output(&positions.join("\n"), &machine, *state_progression)
        }
        Commands::Sigabasetup {
            rotor_num,
            num_iterations,
            state_progression,
        } => {
            let positions = machine.sigaba_setup(*rotor_num, *num_iterations)?;
            write_output(&positions.join("\n"), &machine, *state_progression)
        }
        Commands::Getpos => write_output(&machine.get_positions(), &machine, false),
        Commands::Getconfig => {
            let cfg = machine.get_config()?;
            let mut lines = vec![format!("machine={}", machine.get_description())];
            for (key, value) in cfg {
                lines.push(format!("{}={}", key, value));
            }
            write_output(&lines.join("\n"), &machine, false)
        }
        Commands::Perm { num_iterations } => {
            let perms = machine.get_permutations(*num_iterations);
            let lines: Vec<String> = perms
                .iter()
                .map(|perm| {
                    let rendered: Vec<String> = perm.iter().map(|v| v.to_string()).collect();
                    format!("[{}]", rendered.join(", "))
                })
                .collect();
            write_output(&lines.join("\n"), &machine, false)
        }
        Commands::Makestate { .. } => unreachable!("handled separately"),
    }
}

fn parse_overrides(overrides: &[String]) -> Result<BTreeMap<String, String>, SimulatorError> {
    let mut config = BTreeMap::new();

    for entry in overrides {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            SimulatorError::TransportError(format!("override '{}' is not key=value", entry))
        })?;
        config.insert(key.to_string(), value.to_string());
    }

    Ok(config)
}

fn run_makestate(
    machine_name: &str,
    random: bool,
    randparm: &str,
    positions: &str,
    overrides: &[String],
) -> Result<(), SimulatorError> {
    let kind = MachineKind::from_name(machine_name)?;

    let doc = if random || !randparm.is_empty() {
        randomize::randomize(kind, randparm)?
    } else {
        let config = parse_overrides(overrides)?;
        config::make_state(kind, &config, positions)?
    };

    // positions override also applies to randomized states
    let doc = if !positions.is_empty() {
        let mut machine = RotorMachine::from_state(&doc)?;
        machine.set_positions(positions)?;
        machine.save()
    } else {
        doc
    };

    info!("created {} state", kind.canonical_name());
    std::io::stdout().write_all(doc.render().as_bytes())?;

    Ok(())
}

fn exit_code_for(err: &SimulatorError) -> u8 {
    match err {
        SimulatorError::StateFormat(_)
        | SimulatorError::StateInvariantViolation(_)
        | SimulatorError::RotorSetFormat(_)
        | SimulatorError::HeaderFormat(_)
        | SimulatorError::InvalidPermutation(_) => EXIT_FORMAT_ERROR,
        SimulatorError::IOError(_) | SimulatorError::TransportError(_) => EXIT_TRANSPORT_ERROR,
        _ => EXIT_MACHINE_ERROR,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = Env::default().filter_or("RUST_LOG", if cli.verbose { "debug" } else { "warn" });
    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let result = match &cli.command {
        Commands::Makestate {
            machine,
            random,
            randparm,
            positions,
            overrides,
        } => run_makestate(machine, *random, randparm, positions, overrides),
        other => run_process_command(other),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("rotorsim_rs: {}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}
