//! Rotor instances: a wiring permutation combined with a notch ring, a
//! ring offset, a displacement and an insertion orientation.
//!
//! The rotor knows nothing about its neighbours; all stepping decisions
//! are made by the stepping gears in [`crate::stepping`], which address
//! their rotors by slot index.

use log::trace;

use crate::error::{Result, SimulatorError};
use crate::permutation::{neg, symbol_index, Permutation};

/// A rotor mounted in a machine slot.
///
/// The wiring stored here is the *effective* wiring: for a wheel that is
/// inserted the other way round the reverse permutation has already been
/// applied, so `apply`/`apply_inverse` never need to care.
#[derive(Debug, Clone)]
pub struct Rotor {
    rid: u32,
    ring_id: u32,
    perm: Vec<usize>,
    inv_perm: Vec<usize>,
    ring_data: Vec<u8>,
    ring_offset: usize,
    window_offset: usize,
    displacement: usize,
    inserted_reverse: bool,
    alphabet: String,
}

impl Rotor {
    /// Creates a rotor from its effective wiring and mounted notch ring.
    ///
    /// # Arguments
    /// * `rid` - Id of the wiring in the active rotor set
    /// * `ring_id` - Id of the mounted notch ring
    /// * `perm` - Effective wiring permutation
    /// * `ring_data` - Notch ring cells, one 0/1 value per contact
    /// * `alphabet` - Window lettering of the rotor
    pub fn new(
        rid: u32,
        ring_id: u32,
        perm: Vec<usize>,
        ring_data: Vec<u8>,
        alphabet: &str,
    ) -> Result<Self> {
        let checked = Permutation::from_int_vector(alphabet, perm)?;

        if ring_data.len() != checked.len() {
            return Err(SimulatorError::StateInvariantViolation(format!(
                "ring data has {} cells for a {} contact rotor",
                ring_data.len(),
                checked.len()
            )));
        }

        let inv_perm = checked.to_inverse().to_int_vector();

        Ok(Rotor {
            rid,
            ring_id,
            perm: checked.to_int_vector(),
            inv_perm,
            ring_data,
            ring_offset: 0,
            window_offset: 0,
            displacement: 0,
            inserted_reverse: false,
            alphabet: alphabet.to_string(),
        })
    }

    /// Marks the rotor as physically reversed. The wiring passed to
    /// [`Rotor::new`] is expected to be the reverse permutation already;
    /// the flag only changes the window lettering and is reported back
    /// when the state is saved.
    pub fn mark_reversed(mut self) -> Self {
        self.inserted_reverse = true;
        self
    }

    /// Number of contacts.
    pub fn size(&self) -> usize {
        self.perm.len()
    }

    pub fn rid(&self) -> u32 {
        self.rid
    }

    pub fn ring_id(&self) -> u32 {
        self.ring_id
    }

    pub fn is_inserted_reverse(&self) -> bool {
        self.inserted_reverse
    }

    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    pub fn ring_data(&self) -> &[u8] {
        &self.ring_data
    }

    /// Replaces the mounted ring data, e.g. for the configurable SG39 pin
    /// rings.
    pub fn set_ring_data(&mut self, ring_id: u32, ring_data: Vec<u8>) -> Result<()> {
        if ring_data.len() != self.size() {
            return Err(SimulatorError::StateInvariantViolation(format!(
                "ring data has {} cells for a {} contact rotor",
                ring_data.len(),
                self.size()
            )));
        }

        self.ring_id = ring_id;
        self.ring_data = ring_data;
        Ok(())
    }

    pub fn displacement(&self) -> usize {
        self.displacement
    }

    pub fn set_displacement(&mut self, displacement: usize) {
        self.displacement = displacement % self.size();
    }

    pub fn ring_offset(&self) -> usize {
        self.ring_offset
    }

    /// Sets the rotation of the notch ring relative to the wiring. Unless
    /// a separate window offset has been set, the letter ring follows.
    pub fn set_ring_offset(&mut self, offset: usize) {
        let followed = self.window_offset == self.ring_offset;
        self.ring_offset = offset % self.size();
        if followed {
            self.window_offset = self.ring_offset;
        }
    }

    pub fn window_offset(&self) -> usize {
        self.window_offset
    }

    /// Sets the rotation of the letter ring independently of the notch
    /// ring (KL7 alphabet rings).
    pub fn set_window_offset(&mut self, offset: usize) {
        self.window_offset = offset % self.size();
    }

    /// Advances the rotor by one position.
    pub fn step(&mut self) {
        self.displacement = (self.displacement + 1) % self.size();
        trace!("rotor {} stepped to {}", self.rid, self.displacement);
    }

    /// The ring cell currently under the stepping pawl.
    fn ring_pos(&self) -> usize {
        (self.displacement + self.ring_offset) % self.size()
    }

    /// True if the mounted notch ring is active at the pawl position.
    pub fn is_at_notch(&self) -> bool {
        self.ring_data[self.ring_pos()] == 1
    }

    /// The letter visible in the machine window. A reversed wheel shows
    /// the mirrored lettering.
    pub fn window_char(&self) -> char {
        let pos = (self.displacement + self.window_offset) % self.size();
        let shown = if self.inserted_reverse {
            neg(pos, self.size())
        } else {
            pos
        };

        self.alphabet.chars().nth(shown).unwrap_or('?')
    }

    /// Turns the rotor so that the given letter shows in the window.
    pub fn set_window_char(&mut self, symbol: char) -> Result<()> {
        let value = symbol_index(&self.alphabet, symbol)
            .map_err(|_| SimulatorError::UnknownSymbol(symbol))?;
        let pos = if self.inserted_reverse {
            neg(value, self.size())
        } else {
            value
        };

        self.displacement = (pos + self.size() - self.window_offset) % self.size();
        Ok(())
    }

    /// Applies the effective permutation at the current displacement.
    pub fn apply(&self, value: usize) -> usize {
        let n = self.size();
        (self.perm[(value + self.displacement) % n] + n - self.displacement) % n
    }

    /// Applies the inverse of the effective permutation at the current
    /// displacement.
    pub fn apply_inverse(&self, value: usize) -> usize {
        let n = self.size();
        (self.inv_perm[(value + self.displacement) % n] + n - self.displacement) % n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::Permutation;
    use crate::rotordata;
    use crate::utils::STD_ALPHA;

    fn walze_i() -> Rotor {
        let set = rotordata::enigma_rotor_set();
        let entry = set.lookup(rotordata::WALZE_I).unwrap();
        Rotor::new(
            rotordata::WALZE_I,
            rotordata::WALZE_I,
            entry.permutation.clone(),
            entry.ring_data.clone(),
            STD_ALPHA,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_at_zero() {
        let rotor = walze_i();
        // wiring ekmfl...: a maps to e
        assert_eq!(rotor.apply(0), 4);
        assert_eq!(rotor.apply_inverse(4), 0);
    }

    #[test]
    fn test_apply_with_displacement() {
        let mut rotor = walze_i();
        rotor.set_displacement(1);
        // shifted by one: input a enters contact b, wired to k, leaves at j
        assert_eq!(rotor.apply(0), 9);
    }

    #[test]
    fn test_window_and_ring_offset() {
        let mut rotor = walze_i();
        rotor.set_ring_offset(1);
        rotor.set_window_char('a').unwrap();
        assert_eq!(rotor.displacement(), 25);
        assert_eq!(rotor.window_char(), 'a');
    }

    #[test]
    fn test_notch_follows_ring() {
        let mut rotor = walze_i();
        // notch of Walze I sits at window letter q
        rotor.set_window_char('q').unwrap();
        assert!(rotor.is_at_notch());

        rotor.set_ring_offset(5);
        rotor.set_window_char('q').unwrap();
        assert!(rotor.is_at_notch());

        rotor.set_window_char('r').unwrap();
        assert!(!rotor.is_at_notch());
    }

    #[test]
    fn test_reverse_insertion_roundtrip() {
        let set = rotordata::enigma_rotor_set();
        let entry = set.lookup(rotordata::WALZE_I).unwrap();
        let reversed = Permutation::from_int_vector(STD_ALPHA, entry.permutation.clone())
            .unwrap()
            .to_reverse();
        let rotor = Rotor::new(
            rotordata::WALZE_I,
            rotordata::WALZE_I,
            reversed.to_int_vector(),
            entry.ring_data.clone(),
            STD_ALPHA,
        )
        .unwrap()
        .mark_reversed();

        for i in 0..26 {
            assert_eq!(rotor.apply_inverse(rotor.apply(i)), i);
        }
    }

    #[test]
    fn test_reversed_window_lettering() {
        let mut rotor = walze_i().mark_reversed();
        rotor.set_window_char('m').unwrap();
        assert_eq!(rotor.window_char(), 'm');
        assert_eq!(rotor.displacement(), 14);
    }
}
