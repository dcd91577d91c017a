//! Stepping gear of the SIGABA (ECM Mark II): three interacting rotor
//! banks in which the control bank decides, filtered through the index
//! bank, which cipher rotors advance.

use log::trace;

use crate::error::{Result, SimulatorError};
use crate::rotor::Rotor;
use crate::stepping::Slot;

/// Compression of the 26 control bank outputs onto the ten index bank
/// contacts: b→1, c→2, d/e→3, f/g/h→4, i/j/k→5, l-o→6, p-t→7, u-x→8,
/// y/z/a→9.
const INDEX_COMPRESSION: [usize; 26] = [
    9, 1, 2, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7, 7, 8, 8, 8, 8, 9, 9,
];

/// The four control bank inputs energised on every tick.
const CONTROL_INPUTS: [usize; 4] = [5, 6, 7, 8]; // f, g, h, i

/// Zeroize position of the large rotors; the control odometer carries at
/// this letter.
const LETTER_O: char = 'o';

/// Slots in serialisation order: five index rotors, five control rotors,
/// five cipher rotors. The position display shows them in the same
/// order.
#[derive(Debug, Clone)]
pub struct SigabaStepper {
    slots: Vec<Slot>,
    csp2900: bool,
}

const INDEX_BASE: usize = 0;
const CONTROL_BASE: usize = 5;
const CIPHER_BASE: usize = 10;

impl SigabaStepper {
    pub fn new(slots: Vec<Slot>, csp2900: bool) -> Self {
        SigabaStepper { slots, csp2900 }
    }

    pub fn is_csp2900(&self) -> bool {
        self.csp2900
    }

    fn control(&self, i: usize) -> &Rotor {
        &self.slots[CONTROL_BASE + i].rotor
    }

    /// The control bank odometer: the middle control rotor moves every
    /// tick, its right neighbour carries at the letter o, the left
    /// neighbour carries when both are at o. Control rotors 1 and 5
    /// never move.
    fn step_control_bank(&mut self) {
        let fast_at_o = self.control(2).window_char() == LETTER_O;
        let medium_at_o = self.control(3).window_char() == LETTER_O;

        self.slots[CONTROL_BASE + 2].rotor.step();
        if fast_at_o {
            self.slots[CONTROL_BASE + 3].rotor.step();
            if medium_at_o {
                self.slots[CONTROL_BASE + 1].rotor.step();
            }
        }
    }

    /// Evaluates the stepping network: four live inputs pass through the
    /// control bank, collapse onto the index bank and the index outputs
    /// select the cipher step magnets pairwise.
    fn cipher_magnets(&self) -> [bool; 5] {
        let mut energised = [false; 5];

        for &input in &CONTROL_INPUTS {
            let mut v = input;
            for i in (0..5).rev() {
                v = self.control(i).apply(v);
            }

            let mut w = INDEX_COMPRESSION[v];
            for i in 0..5 {
                w = self.slots[INDEX_BASE + i].rotor.apply(w);
            }

            energised[w / 2] = true;
        }

        let mut magnets = energised;

        if self.csp2900 {
            // the CSP 2900 drive cage works the other way round on the
            // second and fourth magnet
            magnets[1] = !energised[1];
            magnets[3] = !energised[3];
        }

        if magnets.iter().all(|&m| !m) {
            // the drive cage always moves at least one cipher rotor
            magnets[2] = true;
        }

        magnets
    }

    fn step_cipher_bank(&mut self, magnets: [bool; 5]) {
        for (i, &on) in magnets.iter().enumerate() {
            if on {
                self.slots[CIPHER_BASE + i].rotor.step();
            }
        }
    }

    pub fn step_once(&mut self) {
        self.step_control_bank();
        let magnets = self.cipher_magnets();
        trace!("sigaba magnets {:?}", magnets);
        self.step_cipher_bank(magnets);
    }

    /// Manually advances one control rotor (1-5, left to right) without
    /// enciphering; the cipher bank is driven as on a normal tick. Used
    /// by the operator to derive a message key.
    pub fn setup_step(&mut self, rotor_num: usize) -> Result<()> {
        if !(1..=5).contains(&rotor_num) {
            return Err(SimulatorError::UnsupportedProcedure(format!(
                "setup stepping knows control rotors 1-5, not {}",
                rotor_num
            )));
        }

        self.slots[CONTROL_BASE + rotor_num - 1].rotor.step();
        let magnets = self.cipher_magnets();
        self.step_cipher_bank(magnets);

        Ok(())
    }

    /// The SIGABA is not an involution: encryption passes the cipher bank
    /// left to right, decryption is the inverse of this permutation.
    pub fn stack_permutation(&self) -> Vec<usize> {
        (0..26)
            .map(|c| {
                let mut v = c;
                for i in 0..5 {
                    v = self.slots[CIPHER_BASE + i].rotor.apply(v);
                }
                v
            })
            .collect()
    }

    pub fn get_positions(&self) -> String {
        self.slots.iter().map(|s| s.rotor.window_char()).collect()
    }

    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        let chars: Vec<char> = positions.chars().collect();

        if chars.len() != self.slots.len() {
            return Err(SimulatorError::StateInvariantViolation(format!(
                "expected {} position letters, got {}",
                self.slots.len(),
                chars.len()
            )));
        }

        for (slot, &c) in self.slots.iter_mut().zip(chars.iter()) {
            slot.rotor.set_window_char(c)?;
        }

        Ok(())
    }

    pub fn slots(&self) -> Vec<&Slot> {
        self.slots.iter().collect()
    }

    pub fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.iter_mut().collect()
    }
}
