//! Permutation algebra over a configurable alphabet.
//!
//! All wirings in the simulator (rotors, reflectors, plug boards, entry
//! wheels) are permutations of 0..n where n is the length of the alphabet
//! the component works with: 26 for most machines, 36 for the KL7 rotor
//! stack, 10 for the SIGABA index rotors and 21/23/25 for the SG39 pin
//! wheels.

use crate::error::{Result, SimulatorError};

/// A bijection of 0..n together with the alphabet used for symbolic I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: String,
    values: Vec<usize>,
}

impl Permutation {
    /// Creates the identity permutation over the given alphabet.
    pub fn identity(alphabet: &str) -> Self {
        Permutation {
            alphabet: alphabet.to_string(),
            values: (0..alphabet.chars().count()).collect(),
        }
    }

    /// Creates a permutation from an integer vector.
    ///
    /// # Arguments
    /// * `alphabet` - The alphabet used to map indices to symbols
    /// * `values` - The permutation values; every value in 0..n must appear
    ///   exactly once
    pub fn from_int_vector(alphabet: &str, values: Vec<usize>) -> Result<Self> {
        let n = alphabet.chars().count();

        if values.len() != n {
            return Err(SimulatorError::InvalidPermutation(format!(
                "expected {} entries, got {}",
                n,
                values.len()
            )));
        }

        let mut seen = vec![false; n];
        for &v in &values {
            if v >= n || seen[v] {
                return Err(SimulatorError::InvalidPermutation(format!(
                    "value {} out of range or duplicated",
                    v
                )));
            }
            seen[v] = true;
        }

        Ok(Permutation {
            alphabet: alphabet.to_string(),
            values,
        })
    }

    /// Creates a permutation from a string of symbols. Position i of the
    /// string holds the symbol that i is mapped to.
    pub fn from_string(alphabet: &str, spec: &str) -> Result<Self> {
        let mut values = Vec::with_capacity(spec.chars().count());

        for c in spec.chars() {
            values.push(symbol_index(alphabet, c)?);
        }

        Permutation::from_int_vector(alphabet, values)
    }

    /// Creates an involution from a sequence of symbol pairs, e.g. the
    /// Steckerbrett cabling `atbldfgjhmnwopqyrzvx`. Symbols that appear in
    /// no pair stay fixed.
    pub fn involution_from_pairs(alphabet: &str, letter_pairs: &str) -> Result<Self> {
        let chars: Vec<char> = letter_pairs.chars().collect();

        if chars.len() % 2 != 0 {
            return Err(SimulatorError::InvalidPermutation(
                "involution needs an even number of symbols".to_string(),
            ));
        }

        let n = alphabet.chars().count();
        let mut values: Vec<usize> = (0..n).collect();
        let mut plugged = vec![false; n];

        for pair in chars.chunks(2) {
            let first = symbol_index(alphabet, pair[0])?;
            let second = symbol_index(alphabet, pair[1])?;

            if first == second || plugged[first] || plugged[second] {
                return Err(SimulatorError::InvalidPermutation(format!(
                    "symbol '{}' or '{}' plugged twice",
                    pair[0], pair[1]
                )));
            }

            values[first] = second;
            values[second] = first;
            plugged[first] = true;
            plugged[second] = true;
        }

        Ok(Permutation {
            alphabet: alphabet.to_string(),
            values,
        })
    }

    /// Returns the number of elements of the permutation.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for the zero length permutation, which cannot occur in a valid
    /// machine but keeps clippy honest.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the alphabet the permutation maps through.
    pub fn alphabet(&self) -> &str {
        &self.alphabet
    }

    /// Applies the permutation to a single index.
    pub fn apply(&self, value: usize) -> usize {
        self.values[value % self.values.len()]
    }

    /// Returns the underlying integer vector.
    pub fn to_int_vector(&self) -> Vec<usize> {
        self.values.clone()
    }

    /// Returns the permutation as a string of symbols.
    pub fn to_symbol_string(&self) -> String {
        let alpha: Vec<char> = self.alphabet.chars().collect();
        self.values.iter().map(|&v| alpha[v]).collect()
    }

    /// Returns the inverse permutation.
    pub fn to_inverse(&self) -> Permutation {
        let mut values = vec![0; self.values.len()];

        for (i, &v) in self.values.iter().enumerate() {
            values[v] = i;
        }

        Permutation {
            alphabet: self.alphabet.clone(),
            values,
        }
    }

    /// Returns the reverse permutation: the wiring that results from
    /// physically inserting a wheel with this wiring the other way round,
    /// `reverse(p)[i] = -inverse(p)[-i] (mod n)`.
    pub fn to_reverse(&self) -> Permutation {
        let inverse = self.to_inverse();
        let n = self.values.len();
        let mut values = vec![0; n];

        for (i, item) in values.iter_mut().enumerate() {
            *item = neg(inverse.values[neg(i, n)], n);
        }

        Permutation {
            alphabet: self.alphabet.clone(),
            values,
        }
    }

    /// Returns the composition `other ∘ self`, i.e. the permutation that
    /// applies `self` first and `other` second.
    pub fn compose(&self, other: &Permutation) -> Permutation {
        let values = self.values.iter().map(|&v| other.values[v]).collect();

        Permutation {
            alphabet: self.alphabet.clone(),
            values,
        }
    }

    /// True if the permutation maps every pair of symbols symmetrically.
    pub fn is_involution(&self) -> bool {
        self.values
            .iter()
            .enumerate()
            .all(|(i, &v)| self.values[v] == i)
    }

    /// True if no symbol is mapped to itself.
    pub fn has_no_fixpoint(&self) -> bool {
        self.values.iter().enumerate().all(|(i, &v)| i != v)
    }

    /// Maps a symbol of the alphabet to its numeric value.
    pub fn from_val(&self, symbol: char) -> Result<usize> {
        symbol_index(&self.alphabet, symbol)
    }

    /// Maps a numeric value to its symbol.
    pub fn to_val(&self, value: usize) -> char {
        self.alphabet
            .chars()
            .nth(value % self.values.len())
            .unwrap_or('?')
    }
}

/// Returns the additive inverse of `value` modulo `n`.
pub fn neg(value: usize, n: usize) -> usize {
    (n - (value % n)) % n
}

/// Looks a symbol up in an alphabet.
pub fn symbol_index(alphabet: &str, symbol: char) -> Result<usize> {
    alphabet
        .chars()
        .position(|c| c == symbol)
        .ok_or(SimulatorError::AlphabetMismatch(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::STD_ALPHA;

    #[test]
    fn test_identity_roundtrip() {
        let p = Permutation::identity(STD_ALPHA);
        assert_eq!(p.len(), 26);
        assert_eq!(p.apply(7), 7);
        assert!(p.is_involution());
    }

    #[test]
    fn test_inverse_of_inverse() {
        let p = Permutation::from_string(STD_ALPHA, "ekmflgdqvzntowyhxuspaibrcj").unwrap();
        assert_eq!(p.to_inverse().to_inverse(), p);
        assert_eq!(p.compose(&p.to_inverse()), Permutation::identity(STD_ALPHA));
    }

    #[test]
    fn test_reverse_of_reverse() {
        let p = Permutation::from_string(STD_ALPHA, "bdfhjlcprtxvznyeiwgakmusqo").unwrap();
        assert_eq!(p.to_reverse().to_reverse(), p);
    }

    #[test]
    fn test_involution_from_pairs() {
        let p = Permutation::involution_from_pairs(STD_ALPHA, "atbldfgjhmnwopqyrzvx").unwrap();
        assert!(p.is_involution());
        assert_eq!(p.apply(0), 19);
        assert_eq!(p.apply(19), 0);
        // unplugged symbols stay fixed
        assert_eq!(p.apply(4), 4);
    }

    #[test]
    fn test_invalid_permutation_rejected() {
        assert!(Permutation::from_int_vector(STD_ALPHA, vec![0; 26]).is_err());
        assert!(Permutation::from_string(STD_ALPHA, "aa").is_err());
        assert!(Permutation::involution_from_pairs(STD_ALPHA, "aa").is_err());
        assert!(Permutation::involution_from_pairs(STD_ALPHA, "abac").is_err());
    }

    #[test]
    fn test_alphabet_mismatch() {
        let result = Permutation::involution_from_pairs(STD_ALPHA, "a1");
        assert_eq!(result, Err(SimulatorError::AlphabetMismatch('1')));
    }

    #[test]
    fn test_neg() {
        assert_eq!(neg(0, 26), 0);
        assert_eq!(neg(1, 26), 25);
        assert_eq!(neg(14, 26), 12);
    }
}
