//! Stepping gear of the Swiss Nema: contact wheels and drive wheels in
//! alternating pairs, a moving reflector and the red drive wheel on the
//! right that advances every tick.

use crate::error::Result;
use crate::rotor::Rotor;
use crate::stepping::{read_positions, reflecting_stack, write_positions, Slot};

/// Slots in display order: reflector, then four drive wheel / contact
/// wheel pairs, then the red wheel. The static entry wheel is carried as
/// a hidden eleventh slot.
#[derive(Debug, Clone)]
pub struct NemaStepper {
    slots: Vec<Slot>,
}

const UKW: usize = 0;
const DRIVE1: usize = 1;
const ROTOR1: usize = 2;
const DRIVE2: usize = 3;
const ROTOR2: usize = 4;
const DRIVE3: usize = 5;
const ROTOR3: usize = 6;
const DRIVE4: usize = 7;
const ROTOR4: usize = 8;
const RED: usize = 9;
const ETW: usize = 10;

impl NemaStepper {
    pub fn new(slots: Vec<Slot>) -> Self {
        NemaStepper { slots }
    }

    /// One tick. The red wheel always advances; each drive wheel /
    /// contact wheel pair advances when the cam of the drive wheel to its
    /// right is active, the reflector when the cam of its own drive wheel
    /// is active. All cams are sampled before anything moves.
    pub fn step_once(&mut self) {
        let cam_red = self.slots[RED].rotor.is_at_notch();
        let cam4 = self.slots[DRIVE4].rotor.is_at_notch();
        let cam3 = self.slots[DRIVE3].rotor.is_at_notch();
        let cam2 = self.slots[DRIVE2].rotor.is_at_notch();
        let cam1 = self.slots[DRIVE1].rotor.is_at_notch();

        self.slots[RED].rotor.step();

        if cam_red {
            self.slots[DRIVE4].rotor.step();
            self.slots[ROTOR4].rotor.step();
        }
        if cam4 {
            self.slots[DRIVE3].rotor.step();
            self.slots[ROTOR3].rotor.step();
        }
        if cam3 {
            self.slots[DRIVE2].rotor.step();
            self.slots[ROTOR2].rotor.step();
        }
        if cam2 {
            self.slots[DRIVE1].rotor.step();
            self.slots[ROTOR1].rotor.step();
        }
        if cam1 {
            self.slots[UKW].rotor.step();
        }
    }

    pub fn stack_permutation(&self) -> Vec<usize> {
        let forward: Vec<&Rotor> = [ETW, ROTOR4, ROTOR3, ROTOR2, ROTOR1]
            .iter()
            .map(|&i| &self.slots[i].rotor)
            .collect();

        reflecting_stack(&forward, &self.slots[UKW].rotor)
    }

    fn display() -> [usize; 10] {
        [
            UKW, DRIVE1, ROTOR1, DRIVE2, ROTOR2, DRIVE3, ROTOR3, DRIVE4, ROTOR4, RED,
        ]
    }

    pub fn get_positions(&self) -> String {
        read_positions(&self.slots, &Self::display())
    }

    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        write_positions(&mut self.slots, &Self::display(), positions)
    }

    pub fn slots(&self) -> Vec<&Slot> {
        self.slots.iter().collect()
    }

    pub fn slots_mut(&mut self) -> Vec<&mut Slot> {
        self.slots.iter_mut().collect()
    }
}
