//! Stepping gear of the British Typex: five wheel slots of which the two
//! leftmost are stators, a static entry wheel and a settable reflector.

use crate::error::Result;
use crate::rotor::Rotor;
use crate::stepping::{read_positions, reflecting_stack, write_positions, Slot};

/// Slots in signal order: entry wheel, fast, middle, slow, the two
/// stators and the reflector. The display runs left to right from
/// stator 1 down to the fast wheel.
#[derive(Debug, Clone)]
pub struct TypexStepper {
    slots: Vec<Slot>,
    display: Vec<usize>,
}

const FAST: usize = 1;
const MIDDLE: usize = 2;
const SLOW: usize = 3;
const STATOR2: usize = 4;
const STATOR1: usize = 5;
const REFLECTOR: usize = 6;

impl TypexStepper {
    pub fn new(slots: Vec<Slot>) -> Self {
        TypexStepper {
            slots,
            display: vec![STATOR1, STATOR2, SLOW, MIDDLE, FAST],
        }
    }

    /// Plain odometer over the three moving wheels; the stators and the
    /// reflector never move.
    pub fn step_once(&mut self) {
        let carry_middle = self.slots[FAST].rotor.is_at_notch();
        let carry_slow = carry_middle && self.slots[MIDDLE].rotor.is_at_notch();

        self.slots[FAST].rotor.step();
        if carry_middle {
            self.slots[MIDDLE].rotor.step();
        }
        if carry_slow {
            self.slots[SLOW].rotor.step();
        }
    }

    pub fn stack_permutation(&self) -> Vec<usize> {
        let forward: Vec<&Rotor> = self.slots[..REFLECTOR].iter().map(|s| &s.rotor).collect();

        reflecting_stack(&forward, &self.slots[REFLECTOR].rotor)
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
