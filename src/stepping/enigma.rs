//! Stepping gear of the Enigma family: Services, M3, M4, Railway,
//! Tirpitz, KD (pawl driven with the double-stepping anomaly) and the
//! Abwehr Enigma (cog wheel odometer with a moving reflector).

use log::trace;

use crate::error::Result;
use crate::rotor::Rotor;
use crate::stepping::{read_positions, reflecting_stack, write_positions, Slot};

/// Mechanical drive of an Enigma variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnigmaStepping {
    /// Pawls and ratchets; the middle rotor double-steps.
    Pawl,
    /// Cog wheels; carries ripple through all wheels including the
    /// reflector, no anomaly.
    Cog,
}

/// The gear shared by all Enigma variants.
///
/// Slots are stored in signal order: an optional static entry wheel,
/// fast, middle, slow, an optional static Greek wheel and the reflector.
/// The display shows the rotors right to left; whether the reflector is
/// part of the display depends on the variant (the steckered machines
/// hide it, the unsteckered ones show and allow setting it).
#[derive(Debug, Clone)]
pub struct EnigmaStepper {
    slots: Vec<Slot>,
    stepping: EnigmaStepping,
    fast: usize,
    middle: usize,
    slow: usize,
    reflector: usize,
    display: Vec<usize>,
}

impl EnigmaStepper {
    /// Builds the gear from slots in signal order.
    ///
    /// # Arguments
    /// * `slots` - All slots in signal order, reflector last
    /// * `has_entry_wheel` - True if slot 0 is a static entry wheel
    /// * `show_reflector` - True if the reflector appears in the rotor
    ///   position display
    /// * `stepping` - Pawl or cog drive
    pub fn new(
        slots: Vec<Slot>,
        has_entry_wheel: bool,
        show_reflector: bool,
        stepping: EnigmaStepping,
    ) -> Self {
        let base = usize::from(has_entry_wheel);
        let reflector = slots.len() - 1;

        // display order: reflector (if shown), then slow to fast,
        // including a Greek wheel sitting between slow and reflector
        let mut display = Vec::new();
        if show_reflector {
            display.push(reflector);
        }
        for idx in (base..reflector).rev() {
            display.push(idx);
        }

        EnigmaStepper {
            slots,
            stepping,
            fast: base,
            middle: base + 1,
            slow: base + 2,
            reflector,
            display,
        }
    }

    pub fn step_once(&mut self) {
        match self.stepping {
            EnigmaStepping::Pawl => self.step_pawl(),
            EnigmaStepping::Cog => self.step_cog(),
        }

        trace!("enigma positions now {}", self.get_positions());
    }

    /// Lever and pawl drive: the fast rotor always moves, the middle
    /// rotor moves on the fast rotor's notch or on its own notch, in the
    /// latter case dragging the slow rotor along.
    fn step_pawl(&mut self) {
        if self.slots[self.middle].rotor.is_at_notch() {
            self.slots[self.middle].rotor.step();
            self.slots[self.slow].rotor.step();
        } else if self.slots[self.fast].rotor.is_at_notch() {
            self.slots[self.middle].rotor.step();
        }

        self.slots[self.fast].rotor.step();
    }

    /// Cog wheel drive of the Abwehr Enigma: a true odometer whose carry
    /// reaches the reflector.
    fn step_cog(&mut self) {
        let carry_middle = self.slots[self.fast].rotor.is_at_notch();
        let carry_slow = carry_middle && self.slots[self.middle].rotor.is_at_notch();
        let carry_ukw = carry_slow && self.slots[self.slow].rotor.is_at_notch();

        self.slots[self.fast].rotor.step();
        if carry_middle {
            self.slots[self.middle].rotor.step();
        }
        if carry_slow {
            self.slots[self.slow].rotor.step();
        }
        if carry_ukw {
            self.slots[self.reflector].rotor.step();
        }
    }

    pub fn stack_permutation(&self) -> Vec<usize> {
        let forward: Vec<&Rotor> = self.slots[..self.reflector]
            .iter()
            .map(|s| &s.rotor)
            .collect();

        reflecting_stack(&forward, &self.slots[self.reflector].rotor)
    }

    pub fn get_positions(&self) -> String {
        read_positions(&self.slots, &self.display)
    }

    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        write_positions(&mut self.slots, &self.display, positions)
    }

    pub fn slots(&self) -> Vec<&Slot> {
        self.slots.iter().collect()
    }

    pub fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.iter_mut().collect()
    }
}
