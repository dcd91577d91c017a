//! Stepping gears: the machine specific rules that advance the rotor
//! stack once per character and expose the resulting stack permutation.
//!
//! The gear is the only polymorphic object in the simulator. It is a
//! tagged enum over the supported machine families; every variant owns
//! its rotor slots and addresses neighbours by index.

mod enigma;
mod kl7;
mod nema;
mod sg39;
mod sigaba;
mod typex;

pub use enigma::{EnigmaStepper, EnigmaStepping};
pub use kl7::Kl7Stepper;
pub use nema::NemaStepper;
pub use sg39::{Sg39Stepper, SG39_WHEEL_ALPHAS};
pub use sigaba::SigabaStepper;
pub use typex::TypexStepper;

use crate::error::{Result, SimulatorError};
use crate::rotor::Rotor;

/// A named rotor slot inside a stepping gear.
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: &'static str,
    pub rotor: Rotor,
}

impl Slot {
    pub fn new(name: &'static str, rotor: Rotor) -> Self {
        Slot { name, rotor }
    }
}

/// The stepping gear of a rotor machine.
#[derive(Debug, Clone)]
pub enum Stepper {
    Enigma(EnigmaStepper),
    Typex(TypexStepper),
    Sigaba(SigabaStepper),
    Kl7(Kl7Stepper),
    Nema(NemaStepper),
    Sg39(Sg39Stepper),
}

impl Stepper {
    /// Advances the rotor stack by one tick. Must be called exactly once
    /// per input character, before the character is enciphered.
    pub fn step_once(&mut self) {
        match self {
            Stepper::Enigma(s) => s.step_once(),
            Stepper::Typex(s) => s.step_once(),
            Stepper::Sigaba(s) => s.step_once(),
            Stepper::Kl7(s) => s.step_once(),
            Stepper::Nema(s) => s.step_once(),
            Stepper::Sg39(s) => s.step_once(),
        }
    }

    /// Returns the 26 element permutation currently produced by the rotor
    /// stack including its fixed entry and reflector permutations, but
    /// excluding the plug board, which the machine applies around it.
    pub fn stack_permutation(&self) -> Vec<usize> {
        match self {
            Stepper::Enigma(s) => s.stack_permutation(),
            Stepper::Typex(s) => s.stack_permutation(),
            Stepper::Sigaba(s) => s.stack_permutation(),
            Stepper::Kl7(s) => s.stack_permutation(),
            Stepper::Nema(s) => s.stack_permutation(),
            Stepper::Sg39(s) => s.stack_permutation(),
        }
    }

    /// Reads the window letters of all visible slots in display order.
    pub fn get_positions(&self) -> String {
        match self {
            Stepper::Enigma(s) => s.get_positions(),
            Stepper::Typex(s) => s.get_positions(),
            Stepper::Sigaba(s) => s.get_positions(),
            Stepper::Kl7(s) => s.get_positions(),
            Stepper::Nema(s) => s.get_positions(),
            Stepper::Sg39(s) => s.get_positions(),
        }
    }

    /// Sets the window letters of all visible slots in display order.
    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        match self {
            Stepper::Enigma(s) => s.set_positions(positions),
            Stepper::Typex(s) => s.set_positions(positions),
            Stepper::Sigaba(s) => s.set_positions(positions),
            Stepper::Kl7(s) => s.set_positions(positions),
            Stepper::Nema(s) => s.set_positions(positions),
            Stepper::Sg39(s) => s.set_positions(positions),
        }
    }

    /// All slots of the gear in serialisation order.
    pub fn slots(&self) -> Vec<&Slot> {
        match self {
            Stepper::Enigma(s) => s.slots(),
            Stepper::Typex(s) => s.slots(),
            Stepper::Sigaba(s) => s.slots(),
            Stepper::Kl7(s) => s.slots(),
            Stepper::Nema(s) => s.slots(),
            Stepper::Sg39(s) => s.slots(),
        }
    }

    /// Performs SIGABA setup stepping; fails on every other machine.
    pub fn sigaba_setup(&mut self, rotor_num: usize) -> Result<()> {
        match self {
            Stepper::Sigaba(s) => s.setup_step(rotor_num),
            _ => Err(SimulatorError::UnsupportedProcedure(
                "setup stepping requires a SIGABA".to_string(),
            )),
        }
    }
}

/// Helper shared by the reflecting machines: runs each input through the
/// given forward slots, the reflector and back through the slots in
/// reverse, producing the full stack permutation.
pub(crate) fn reflecting_stack(forward: &[&Rotor], reflector: &Rotor) -> Vec<usize> {
    (0..26)
        .map(|c| {
            let mut v = c;
            for rotor in forward {
                v = rotor.apply(v);
            }
            v = reflector.apply(v);
            for rotor in forward.iter().rev() {
                v = rotor.apply_inverse(v);
            }
            v
        })
        .collect()
}

/// Helper for reading window letters of selected slots.
pub(crate) fn read_positions(slots: &[Slot], display: &[usize]) -> String {
    display
        .iter()
        .map(|&i| slots[i].rotor.window_char())
        .collect()
}

/// Helper for writing window letters of selected slots.
pub(crate) fn write_positions(slots: &mut [Slot], display: &[usize], positions: &str) -> Result<()> {
    let chars: Vec<char> = positions.chars().collect();

    if chars.len() != display.len() {
        return Err(SimulatorError::StateInvariantViolation(format!(
            "expected {} position letters, got {}",
            display.len(),
            chars.len()
        )));
    }

    for (&slot_idx, &c) in display.iter().zip(chars.iter()) {
        slots[slot_idx].rotor.set_window_char(c)?;
    }

    Ok(())
}
