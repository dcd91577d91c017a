//! Stepping gear of the TSEC/KL-7: eight 36-contact rotors of which the
//! fourth never moves, with selectable notch rings and re-entry wiring
//! that folds the 36 contact stack onto the 26 letter alphabet.

use crate::error::Result;
use crate::stepping::Slot;

/// Letter contacts of the 36 contact stack; contacts 26-35 are the
/// re-entry loop.
const LETTER_CONTACTS: usize = 26;

/// Slots in display order, left to right; slot 4 carries the wide ring
/// and never steps.
#[derive(Debug, Clone)]
pub struct Kl7Stepper {
    slots: Vec<Slot>,
}

impl Kl7Stepper {
    pub fn new(slots: Vec<Slot>) -> Self {
        Kl7Stepper { slots }
    }

    fn moving_slots() -> [usize; 7] {
        [0, 1, 2, 4, 5, 6, 7]
    }

    /// One tick: the rightmost moving rotor always advances; every other
    /// moving rotor advances when the notch ring of the moving rotor to
    /// its right shows an active cell. All ring states are sampled before
    /// anything moves.
    pub fn step_once(&mut self) {
        let moving = Self::moving_slots();
        let mut advances = [false; 7];

        for (i, &slot) in moving.iter().enumerate() {
            if slot == 7 {
                advances[i] = true;
            } else {
                let right_neighbour = moving[i + 1];
                advances[i] = self.slots[right_neighbour].rotor.is_at_notch();
            }
        }

        for (i, &slot) in moving.iter().enumerate() {
            if advances[i] {
                self.slots[slot].rotor.step();
            }
        }
    }

    fn feed(&self, contact: usize) -> usize {
        let mut v = contact;
        for slot in self.slots.iter().rev() {
            v = slot.rotor.apply(v);
        }
        v
    }

    /// The 26 letter permutation of the stack: a signal entering on a
    /// letter contact that leaves on a re-entry contact is fed through
    /// the stack again until it exits on a letter contact. The first
    /// return of a bijection to a subset is again a bijection, so this
    /// always terminates within 36 passes.
    pub fn stack_permutation(&self) -> Vec<usize> {
        (0..LETTER_CONTACTS)
            .map(|c| {
                let mut v = self.feed(c);
                let mut passes = 1;

                while v >= LETTER_CONTACTS && passes < 36 {
                    v = self.feed(v);
                    passes += 1;
                }

                v % LETTER_CONTACTS
            })
            .collect()
    }

    pub fn get_positions(&self) -> String {
        self.slots.iter().map(|s| s.rotor.window_char()).collect()
    }

    /// Accepts either all eight positions or the seven positions of the
    /// moving rotors; message keys only align the moving rotors, the
    /// stationary rotor keeps its basic alignment.
    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        let chars: Vec<char> = positions.chars().collect();

        match chars.len() {
            8 => {
                for (slot, &c) in self.slots.iter_mut().zip(chars.iter()) {
                    slot.rotor.set_window_char(c)?;
                }
                Ok(())
            }
            7 => {
                for (&slot_idx, &c) in Self::moving_slots().iter().zip(chars.iter()) {
                    self.slots[slot_idx].rotor.set_window_char(c)?;
                }
                Ok(())
            }
            other => Err(crate::error::SimulatorError::StateInvariantViolation(
                format!("expected 7 or 8 position letters, got {}", other),
            )),
        }
    }

    pub fn slots(&self) -> Vec<&Slot> {
        self.slots.iter().collect()
    }

    pub fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.iter_mut().collect()
    }
}
