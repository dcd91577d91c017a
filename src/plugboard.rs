//! Steckerbrett implementation: the plug board involution of the
//! steckered machines and the Enigma Uhr attachment that turns it into a
//! dial dependent, non involutory permutation.

use log::trace;

use crate::error::{Result, SimulatorError};
use crate::permutation::Permutation;
use crate::utils::STD_ALPHA;

/// Number of plug pairs the Uhr accepts.
const UHR_PAIR_COUNT: usize = 10;

/// Dial positions of the Uhr.
pub const UHR_DIAL_POSITIONS: usize = 40;

/// Wiring of the Uhr scrambler disc: contact i connects to contact
/// `UHR_WIRING[i]`. Contacts 0 mod 4 carry the thick pins of the a
/// plugs, 2 mod 4 the thick pins of the b plugs, 1 and 3 mod 4 the
/// matching thin return pins; the disc always connects a side to b
/// side, whatever the dial shows.
const UHR_WIRING: [usize; 40] = [
    26, 11, 24, 21, 2, 31, 0, 25, 30, 39, 28, 13, 22, 35, 20, 37, 6, 23, 4, 33, 34, 19, 32, 9,
    18, 7, 16, 17, 10, 3, 8, 1, 38, 27, 36, 29, 14, 15, 12, 5,
];

/// The b sockets sit around the disc in scrambled order
/// (b2 b5 b8 b10 b7 b4 b1 b3 b6 b9); entry s names the plug pair whose
/// b plug occupies disc slot s.
const UHR_B_SOCKETS: [usize; 10] = [1, 4, 7, 9, 6, 3, 0, 2, 5, 8];

/// The thin return wires of the a plugs, by disc slot, laid out so that
/// dial 00 reproduces the straight plug board.
const UHR_A_THIN: [usize; 10] = [2, 0, 1, 8, 3, 6, 5, 4, 9, 7];

/// The plug board sitting between keyboard/lamps and the rotor stack.
#[derive(Debug, Clone)]
pub struct Plugboard {
    entry: Vec<usize>,
    inverse: Vec<usize>,
    uses_uhr: bool,
    uhr_cabling: Option<String>,
    uhr_dial_pos: usize,
}

impl Plugboard {
    /// Ein Steckerbrett ohne gesteckte Verbindungen.
    pub fn identity() -> Self {
        let entry: Vec<usize> = (0..26).collect();
        Plugboard {
            inverse: entry.clone(),
            entry,
            uses_uhr: false,
            uhr_cabling: None,
            uhr_dial_pos: 0,
        }
    }

    /// Creates a plug board from a cabling string of letter pairs, e.g.
    /// `adcnetflgijvkzpuqywx`.
    pub fn from_cabling(cabling: &str) -> Result<Self> {
        let perm = Permutation::involution_from_pairs(STD_ALPHA, cabling)?;

        Ok(Plugboard {
            entry: perm.to_int_vector(),
            inverse: perm.to_int_vector(),
            uses_uhr: false,
            uhr_cabling: None,
            uhr_dial_pos: 0,
        })
    }

    /// Creates a plug board whose ten plug pairs are routed through the
    /// Uhr at the given dial position. At dial 0 the board behaves like a
    /// straight Steckerbrett; at every other position the resulting
    /// permutation is no longer an involution.
    pub fn with_uhr(cabling: &str, dial_pos: usize) -> Result<Self> {
        let chars: Vec<char> = cabling.chars().collect();

        if chars.len() != 2 * UHR_PAIR_COUNT {
            return Err(SimulatorError::InvalidPermutation(format!(
                "the Uhr needs exactly {} plug pairs",
                UHR_PAIR_COUNT
            )));
        }

        // validated for duplicates by building the plain involution
        Permutation::involution_from_pairs(STD_ALPHA, cabling)?;

        let dial_pos = dial_pos % UHR_DIAL_POSITIONS;

        let mut x_side = [0usize; UHR_PAIR_COUNT];
        let mut y_side = [0usize; UHR_PAIR_COUNT];
        for (i, pair) in chars.chunks(2).enumerate() {
            x_side[i] = crate::permutation::symbol_index(STD_ALPHA, pair[0])?;
            y_side[i] = crate::permutation::symbol_index(STD_ALPHA, pair[1])?;
        }

        let mut entry: Vec<usize> = (0..26).collect();

        // keyboard current entering an a plug leaves the disc on the
        // thick pin of a b plug
        for i in 0..UHR_PAIR_COUNT {
            let disc_in = (4 * i + dial_pos) % UHR_DIAL_POSITIONS;
            let contact =
                (UHR_WIRING[disc_in] + UHR_DIAL_POSITIONS - dial_pos) % UHR_DIAL_POSITIONS;
            entry[x_side[i]] = y_side[UHR_B_SOCKETS[(contact - 2) / 4]];
        }

        // keyboard current entering a b plug returns over the thin wire
        // of an a plug
        for slot in 0..UHR_PAIR_COUNT {
            let disc_in = (4 * slot + 1 + dial_pos) % UHR_DIAL_POSITIONS;
            let contact =
                (UHR_WIRING[disc_in] + UHR_DIAL_POSITIONS - dial_pos) % UHR_DIAL_POSITIONS;
            entry[y_side[UHR_B_SOCKETS[slot]]] = x_side[UHR_A_THIN[(contact - 3) / 4]];
        }

        let perm = Permutation::from_int_vector(STD_ALPHA, entry)?;
        trace!("uhr permutation at dial {}: {}", dial_pos, perm.to_symbol_string());

        Ok(Plugboard {
            inverse: perm.to_inverse().to_int_vector(),
            entry: perm.to_int_vector(),
            uses_uhr: true,
            uhr_cabling: Some(cabling.to_string()),
            uhr_dial_pos: dial_pos,
        })
    }

    /// Restores a plug board from a stored entry permutation.
    pub fn from_state(
        entry: Vec<usize>,
        uses_uhr: bool,
        uhr_cabling: Option<String>,
        uhr_dial_pos: usize,
    ) -> Result<Self> {
        let perm = Permutation::from_int_vector(STD_ALPHA, entry)?;

        if !uses_uhr && !perm.is_involution() {
            return Err(SimulatorError::StateInvariantViolation(
                "plug board cabling without Uhr must be an involution".to_string(),
            ));
        }

        Ok(Plugboard {
            inverse: perm.to_inverse().to_int_vector(),
            entry: perm.to_int_vector(),
            uses_uhr,
            uhr_cabling,
            uhr_dial_pos,
        })
    }

    /// Keyboard direction.
    pub fn forward(&self, value: usize) -> usize {
        self.entry[value]
    }

    /// Lamp direction: the same wires traversed the other way.
    pub fn backward(&self, value: usize) -> usize {
        self.inverse[value]
    }

    pub fn entry_permutation(&self) -> &[usize] {
        &self.entry
    }

    pub fn uses_uhr(&self) -> bool {
        self.uses_uhr
    }

    pub fn uhr_cabling(&self) -> Option<&str> {
        self.uhr_cabling.as_deref()
    }

    pub fn uhr_dial_pos(&self) -> usize {
        self.uhr_dial_pos
    }

    /// The cabling as letter pairs, reconstructed from the involution for
    /// boards without Uhr.
    pub fn cabling_string(&self) -> String {
        if let Some(cabling) = &self.uhr_cabling {
            return cabling.clone();
        }

        let mut seen = [false; 26];
        let mut out = String::new();

        for (i, &v) in self.entry.iter().enumerate() {
            if i != v && !seen[i] && !seen[v] {
                seen[i] = true;
                seen[v] = true;
                out.push((b'a' + i as u8) as char);
                out.push((b'a' + v as u8) as char);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_board_is_involution() {
        let board = Plugboard::from_cabling("atbldfgjhmnwopqyrzvx").unwrap();

        for i in 0..26 {
            assert_eq!(board.backward(board.forward(i)), i);
            assert_eq!(board.forward(board.forward(i)), i);
        }

        assert_eq!(board.cabling_string(), "atbldfgjhmnwopqyrzvx");
    }

    #[test]
    fn test_uhr_dial_zero_is_straight() {
        let cabling = "adcnetflgijvkzpuqywx";
        let with_uhr = Plugboard::with_uhr(cabling, 0).unwrap();
        let plain = Plugboard::from_cabling(cabling).unwrap();

        assert_eq!(with_uhr.entry_permutation(), plain.entry_permutation());
    }

    #[test]
    fn test_uhr_dial_27_not_involutory() {
        let board = Plugboard::with_uhr("adcnetflgijvkzpuqywx", 27).unwrap();

        let involutory = (0..26).all(|i| board.forward(board.forward(i)) == i);
        assert!(!involutory);

        // still a bijection with a working return path
        for i in 0..26 {
            assert_eq!(board.backward(board.forward(i)), i);
        }
    }

    #[test]
    fn test_uhr_needs_ten_pairs() {
        assert!(Plugboard::with_uhr("abcd", 5).is_err());
    }
}
