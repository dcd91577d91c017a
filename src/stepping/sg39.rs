//! Stepping gear of the Schlüsselgerät 39: three rotors driven by pin
//! wheels of pairwise coprime lengths, with rotor notch rings that feed
//! back into the neighbouring pin wheels.

use crate::error::Result;
use crate::stepping::Slot;

/// Window alphabets of the pin wheels; their lengths 21, 23 and 25 are
/// pairwise coprime.
pub const SG39_WHEEL_ALPHAS: [&str; 3] = [
    "abcdefghijklmnopqrstu",
    "abcdefghijklmnopqrstuvw",
    "abcdefghijklmnopqrstuvwxy",
];

/// Slots in serialisation order: the four rotors in signal order (fast
/// first), the reflector, then the three pin wheels. The display shows
/// the static rotor first, the fast rotor fourth, then the pin wheels
/// from the longest down to the shortest.
#[derive(Debug, Clone)]
pub struct Sg39Stepper {
    slots: Vec<Slot>,
}

const ROTOR1: usize = 0; // fast, driven by wheel 1
const ROTOR2: usize = 1;
const ROTOR3: usize = 2;
const ROTOR4: usize = 3; // static
const UKW: usize = 4;
const WHEEL1: usize = 5;
const WHEEL2: usize = 6;
const WHEEL3: usize = 7;

impl Sg39Stepper {
    pub fn new(slots: Vec<Slot>) -> Self {
        Sg39Stepper { slots }
    }

    /// One tick. Every pin wheel advances once; an active notch ring on a
    /// rotor gives the pin wheel of the next rotor one extra advance. A
    /// rotor then steps when its pin wheel shows an active pin.
    pub fn step_once(&mut self) {
        let extra = [
            self.slots[ROTOR1].rotor.is_at_notch(),
            self.slots[ROTOR2].rotor.is_at_notch(),
            self.slots[ROTOR3].rotor.is_at_notch(),
        ];

        self.slots[WHEEL1].rotor.step();
        self.slots[WHEEL2].rotor.step();
        self.slots[WHEEL3].rotor.step();

        // rotor 1 feeds wheel 2, rotor 2 feeds wheel 3, rotor 3 feeds
        // wheel 1
        if extra[0] {
            self.slots[WHEEL2].rotor.step();
        }
        if extra[1] {
            self.slots[WHEEL3].rotor.step();
        }
        if extra[2] {
            self.slots[WHEEL1].rotor.step();
        }

        for (wheel, rotor) in [(WHEEL1, ROTOR1), (WHEEL2, ROTOR2), (WHEEL3, ROTOR3)] {
            if self.slots[wheel].rotor.is_at_notch() {
                self.slots[rotor].rotor.step();
            }
        }
    }

    pub fn stack_permutation(&self) -> Vec<usize> {
        (0..26)
            .map(|c| {
                let mut v = c;
                for i in [ROTOR1, ROTOR2, ROTOR3, ROTOR4] {
                    v = self.slots[i].rotor.apply(v);
                }
                v = self.slots[UKW].rotor.apply(v);
                for i in [ROTOR4, ROTOR3, ROTOR2, ROTOR1] {
                    v = self.slots[i].rotor.apply_inverse(v);
                }
                v
            })
            .collect()
    }

    fn display() -> [usize; 7] {
        [ROTOR4, ROTOR3, ROTOR2, ROTOR1, WHEEL3, WHEEL2, WHEEL1]
    }

    pub fn get_positions(&self) -> String {
        Self::display()
            .iter()
            .map(|&i| self.slots[i].rotor.window_char())
            .collect()
    }

    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        let chars: Vec<char> = positions.chars().collect();
        let display = Self::display();

        if chars.len() != display.len() {
            return Err(crate::error::SimulatorError::StateInvariantViolation(
                format!("expected {} position letters, got {}", display.len(), chars.len()),
            ));
        }

        for (&slot, &c) in display.iter().zip(chars.iter()) {
            self.slots[slot].rotor.set_window_char(c)?;
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
