//! State randomisation: generates random but valid machine states
//! subject to per machine parameter tokens, the way key sheet generation
//! does it.

use std::collections::BTreeMap;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config;
use crate::error::{Result, SimulatorError};
use crate::machine::MachineKind;
use crate::rotorset::UKWD_GAF_ALPHA;
use crate::state::Document;
use crate::stepping::SG39_WHEEL_ALPHAS;
use crate::utils::STD_ALPHA;

/// A source of random symbol strings and permutations over a fixed
/// alphabet.
pub struct RotorRandom {
    alphabet: Vec<char>,
}

impl RotorRandom {
    pub fn new(alphabet: &str) -> Self {
        RotorRandom {
            alphabet: alphabet.chars().collect(),
        }
    }

    /// Returns a random string of the given length.
    pub fn get_rand_string(&self, size: usize) -> String {
        let mut rng = rand::rng();
        let size = size.max(1);

        (0..size)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }

    /// Returns a random permutation of 0..n where n is the alphabet
    /// length.
    pub fn get_rand_permutation(&self) -> Vec<usize> {
        let mut rng = rand::rng();
        let mut values: Vec<usize> = (0..self.alphabet.len()).collect();
        values.shuffle(&mut rng);
        values
    }
}

/// The randomizer parameter tokens a machine type accepts, not counting
/// the implicit default token.
pub fn randomizer_params(kind: MachineKind) -> Vec<&'static str> {
    match kind {
        MachineKind::Services => vec!["basic", "ukwdonly", "fancy"],
        MachineKind::KD => vec!["ukwdonly"],
        MachineKind::Sg39 => vec!["one", "two", "three", "special", "enigmam4"],
        MachineKind::Sigaba => vec!["csp889", "csp2900"],
        MachineKind::Nema => vec!["war", "training"],
        _ => vec![],
    }
}

/// Produces a random state for the machine type subject to the given
/// parameter token. The empty token and `egal` select the default
/// randomisation of the machine.
pub fn randomize(kind: MachineKind, token: &str) -> Result<Document> {
    let normalized = match token {
        "" | "egal" => None,
        other => Some(other),
    };

    if let Some(t) = normalized {
        if !randomizer_params(kind).contains(&t) {
            return Err(SimulatorError::UnsupportedProcedure(format!(
                "machine {} knows no randomizer parameter '{}'",
                kind.canonical_name(),
                t
            )));
        }
    }

    debug!(
        "randomizing {} with parameter '{}'",
        kind.canonical_name(),
        token
    );

    let (cfg, positions) = match kind {
        MachineKind::Services | MachineKind::M3 => randomize_services(kind, normalized),
        MachineKind::M4 => randomize_m4(),
        MachineKind::Railway | MachineKind::Tirpitz | MachineKind::Abwehr | MachineKind::KD => {
            randomize_unsteckered(kind, normalized)
        }
        MachineKind::Typex => randomize_typex(),
        MachineKind::Sigaba => randomize_sigaba(normalized),
        MachineKind::Kl7 => randomize_kl7(),
        MachineKind::Nema => randomize_nema(normalized),
        MachineKind::Sg39 => randomize_sg39(normalized),
    };

    config::make_state(kind, &cfg, &positions)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn to_map(entries: Vec<(&str, String)>) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn rand_letters(count: usize) -> String {
    RotorRandom::new(STD_ALPHA).get_rand_string(count)
}

/// Draws `count` distinct wheel digits out of 1..=pool.
fn rand_wheel_order(count: usize, pool: usize) -> String {
    let mut rng = rand::rng();
    let mut digits: Vec<usize> = (1..=pool).collect();
    digits.shuffle(&mut rng);

    digits[..count]
        .iter()
        .map(|d| char::from_digit(*d as u32, 10).unwrap_or('1'))
        .collect()
}

/// A random plug board cabling of `pairs` letter pairs.
fn rand_cabling(pairs: usize) -> String {
    let perm = RotorRandom::new(STD_ALPHA).get_rand_permutation();

    perm[..2 * pairs]
        .iter()
        .map(|&v| (b'a' + v as u8) as char)
        .collect()
}

/// A random UKW D wiring: twelve pairs over the 24 free contacts in
/// German Air Force notation.
fn rand_ukwd_pairs() -> String {
    let mut rng = rand::rng();
    let mut free: Vec<char> = UKWD_GAF_ALPHA.chars().filter(|&c| c != 'j' && c != 'y').collect();
    free.shuffle(&mut rng);
    free.into_iter().collect()
}

/// A random reflector involution over all 26 letters, as 13 pairs.
fn rand_reflector_pairs() -> String {
    let perm = RotorRandom::new(STD_ALPHA).get_rand_permutation();
    perm.iter().map(|&v| (b'a' + v as u8) as char).collect()
}

fn rand_pins(alphabet: &str) -> String {
    let mut rng = rand::rng();
    alphabet
        .chars()
        .filter(|_| rng.random_range(0..2) == 1)
        .collect()
}

// ---------------------------------------------------------------------------
// Per machine randomizers
// ---------------------------------------------------------------------------

fn randomize_services(
    kind: MachineKind,
    token: Option<&str>,
) -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();
    let defaults = config::default_config(kind);

    match token {
        Some("ukwdonly") => {
            let mut cfg = defaults.config;
            let mut rotors = cfg.get("rotors").cloned().unwrap_or_default();
            rotors.replace_range(0..1, "3");
            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("ukwdperm".to_string(), rand_ukwd_pairs());
            (cfg, defaults.positions)
        }
        Some("fancy") => {
            let dial = rng.random_range(0..crate::plugboard::UHR_DIAL_POSITIONS);
            let cfg = to_map(vec![
                ("rotors", format!("3{}", rand_wheel_order(3, 5))),
                ("rings", rand_letters(3)),
                ("plugs", format!("{}:{}", dial, rand_cabling(10))),
                ("usesuhr", "true".to_string()),
                ("ukwdperm", rand_ukwd_pairs()),
            ]);
            (cfg, rand_letters(3))
        }
        // "basic" and the default
        _ => {
            let pool = if kind == MachineKind::M3 { 8 } else { 5 };
            let ukw = if rng.random_range(0..2) == 0 { "1" } else { "2" };
            let cfg = to_map(vec![
                ("rotors", format!("{}{}", ukw, rand_wheel_order(3, pool))),
                ("rings", rand_letters(3)),
                ("plugs", rand_cabling(10)),
                ("usesuhr", "false".to_string()),
            ]);
            (cfg, rand_letters(3))
        }
    }
}

fn randomize_m4() -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();
    let greek = if rng.random_range(0..2) == 0 { "1" } else { "2" };

    let cfg = to_map(vec![
        ("rotors", format!("1{}{}", greek, rand_wheel_order(3, 8))),
        ("rings", rand_letters(4)),
        ("plugs", rand_cabling(10)),
    ]);

    (cfg, rand_letters(4))
}

fn randomize_unsteckered(
    kind: MachineKind,
    token: Option<&str>,
) -> (BTreeMap<String, String>, String) {
    if token == Some("ukwdonly") {
        // only the reflector wiring changes, everything else stays on
        // the sheet defaults
        let defaults = config::default_config(kind);
        let mut cfg = defaults.config;
        cfg.insert("ukwdperm".to_string(), rand_ukwd_pairs());
        return (cfg, defaults.positions);
    }

    let pool = match kind {
        MachineKind::Tirpitz => 8,
        MachineKind::KD => 6,
        _ => 3,
    };
    let ring_count = if kind == MachineKind::KD { 3 } else { 4 };

    let mut entries = vec![
        ("rotors", rand_wheel_order(3, pool)),
        ("rings", rand_letters(ring_count)),
    ];

    if kind == MachineKind::KD {
        entries.push(("ukwdperm", rand_ukwd_pairs()));
    }

    (to_map(entries), rand_letters(ring_count))
}

fn randomize_typex() -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();
    let mut wheels: Vec<char> = ('a'..='g').collect();
    wheels.shuffle(&mut rng);

    let rotors: String = wheels[..5]
        .iter()
        .flat_map(|&w| {
            let orientation = if rng.random_range(0..2) == 0 { 'N' } else { 'R' };
            [w, orientation]
        })
        .collect();

    let cfg = to_map(vec![
        ("rotorset", "defaultset".to_string()),
        ("rotors", rotors),
        ("rings", rand_letters(5)),
        ("plugs", String::new()),
        ("reflector", rand_reflector_pairs()),
    ]);

    (cfg, rand_letters(5))
}

fn randomize_sigaba(token: Option<&str>) -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();
    let mut large: Vec<u32> = (0..10).collect();
    large.shuffle(&mut rng);
    let mut index: Vec<u32> = (0..5).collect();
    index.shuffle(&mut rng);

    let mut bank = |rotors: &[u32]| -> String {
        rotors
            .iter()
            .flat_map(|&r| {
                let orientation = if rng.random_range(0..2) == 0 { 'N' } else { 'R' };
                [
                    char::from_digit(r, 10).unwrap_or('0'),
                    orientation,
                ]
            })
            .collect()
    };

    let cipher = bank(&large[..5]);
    let control = bank(&large[5..]);
    let index_bank = bank(&index);

    let csp2900 = token == Some("csp2900");

    let cfg = to_map(vec![
        ("cipher", cipher),
        ("control", control),
        ("index", index_bank),
        ("csp2900", if csp2900 { "true" } else { "false" }.to_string()),
    ]);

    let positions = format!(
        "{}{}",
        RotorRandom::new(crate::rotordata::SIGABA_INDEX_ALPHA).get_rand_string(5),
        rand_letters(10)
    );

    (cfg, positions)
}

fn randomize_kl7() -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();
    let mut rotors: Vec<char> = ('a'..='m').collect();
    rotors.shuffle(&mut rng);

    let alpharings: Vec<String> = (0..8)
        .map(|_| (rng.random_range(0..36) + 1).to_string())
        .collect();

    let mut notch_rings: Vec<usize> = (1..=11).collect();
    notch_rings.shuffle(&mut rng);
    let notchselect: Vec<String> = notch_rings[..7].iter().map(|v| v.to_string()).collect();

    let cfg = to_map(vec![
        ("rotors", rotors[..8].iter().collect::<String>()),
        ("alpharings", alpharings.join(" ")),
        ("notchselect", notchselect.join(" ")),
        ("notchrings", rand_letters(7)),
    ]);

    (cfg, rand_letters(8))
}

fn randomize_nema(token: Option<&str>) -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();
    let mut rotors: Vec<char> = ('a'..='f').collect();
    rotors.shuffle(&mut rng);

    // the war and training machines shipped different drive wheel pools
    let mut pool: Vec<u32> = match token {
        Some("training") => vec![16, 19, 20, 21, 22, 23],
        _ => vec![12, 13, 14, 15, 17, 18],
    };
    pool.shuffle(&mut rng);

    let ringselect: Vec<String> = pool[..4].iter().map(|v| v.to_string()).collect();
    let warmachine = token != Some("training");

    let cfg = to_map(vec![
        ("rotors", rotors[..4].iter().collect::<String>()),
        ("ringselect", ringselect.join(" ")),
        ("warmachine", if warmachine { "true" } else { "false" }.to_string()),
    ]);

    (cfg, rand_letters(10))
}

fn rand_sg39_positions() -> String {
    let mut positions = rand_letters(4);
    for i in (0..3).rev() {
        positions.push_str(&RotorRandom::new(SG39_WHEEL_ALPHAS[i]).get_rand_string(1));
    }
    positions
}

fn randomize_sg39(token: Option<&str>) -> (BTreeMap<String, String>, String) {
    let mut rng = rand::rng();

    let mut entries = vec![
        ("rotorset", "defaultset".to_string()),
        ("rotors", rand_wheel_order(4, 9)),
        ("rings", rand_letters(4)),
        ("reflector", rand_reflector_pairs()),
        ("plugs", rand_reflector_pairs()),
    ];

    match token {
        Some(count @ ("one" | "two" | "three")) => {
            let wheels = match count {
                "one" => 1,
                "two" => 2,
                _ => 3,
            };
            for i in 0..3 {
                let pins = if i < wheels {
                    rand_pins(SG39_WHEEL_ALPHAS[i])
                } else {
                    String::new()
                };
                entries.push((["pinswheel1", "pinswheel2", "pinswheel3"][i], pins));
            }
            for key in ["pinsrotor1", "pinsrotor2", "pinsrotor3"] {
                entries.push((key, String::new()));
            }
        }
        Some("special") => {
            // regular pin patterns, no rotor rings
            for (i, key) in ["pinswheel1", "pinswheel2", "pinswheel3"].iter().enumerate() {
                let stride = rng.random_range(2..5);
                let pins: String = SG39_WHEEL_ALPHAS[i]
                    .chars()
                    .enumerate()
                    .filter(|(pos, _)| pos % stride == 0)
                    .map(|(_, c)| c)
                    .collect();
                entries.push((key, pins));
            }
            for key in ["pinsrotor1", "pinsrotor2", "pinsrotor3"] {
                entries.push((key, String::new()));
            }
        }
        Some("enigmam4") => {
            // odometer-like movement: wheel 1 fully pinned, the others
            // empty, no rotor rings, a ten pair plug board
            entries.push(("pinswheel1", SG39_WHEEL_ALPHAS[0].to_string()));
            entries.push(("pinswheel2", String::new()));
            entries.push(("pinswheel3", String::new()));
            for key in ["pinsrotor1", "pinsrotor2", "pinsrotor3"] {
                entries.push((key, String::new()));
            }
            entries.retain(|(k, _)| *k != "plugs");
            entries.push(("plugs", rand_cabling(10)));
        }
        _ => {
            for (i, key) in ["pinswheel1", "pinswheel2", "pinswheel3"].iter().enumerate() {
                entries.push((key, rand_pins(SG39_WHEEL_ALPHAS[i])));
            }
            for key in ["pinsrotor1", "pinsrotor2", "pinsrotor3"] {
                entries.push((key, rand_pins(STD_ALPHA)));
            }
        }
    }

    (to_map(entries), rand_sg39_positions())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_string_alphabet() {
        let source = RotorRandom::new("abc");
        let value = source.get_rand_string(50);
        assert_eq!(value.chars().count(), 50);
        assert!(value.chars().all(|c| "abc".contains(c)));
    }

    #[test]
    fn test_rand_permutation_is_bijection() {
        let source = RotorRandom::new(STD_ALPHA);
        let perm = source.get_rand_permutation();
        let mut seen = vec![false; 26];
        for v in perm {
            assert!(!seen[v]);
            seen[v] = true;
        }
    }

    #[test]
    fn test_unknown_token_rejected() {
        let result = randomize(MachineKind::M4, "fancy");
        assert!(matches!(
            result,
            Err(SimulatorError::UnsupportedProcedure(_))
        ));
    }

    #[test]
    fn test_ukwd_pairs_avoid_fixed_contacts() {
        for _ in 0..10 {
            let pairs = rand_ukwd_pairs();
            assert_eq!(pairs.chars().count(), 24);
            assert!(!pairs.contains('j'));
            assert!(!pairs.contains('y'));
        }
    }
}
