//! Translation between flat configuration dictionaries and machine
//! states.
//!
//! A configuration dictionary is a string-to-string map with per machine
//! keys (`rotors`, `rings`, `plugs`, `reflector`, ...). `make_state`
//! builds a full state document from such a map, `get_config` reports
//! the dictionary of a live machine, and `default_config` supplies the
//! canned default of every machine type.

use std::collections::BTreeMap;

use crate::error::{Result, SimulatorError};
use crate::machine::{MachineKind, RotorMachine};
use crate::permutation::{symbol_index, Permutation};
use crate::plugboard::Plugboard;
use crate::rotordata;
use crate::rotorset::{ukw_d_perm, RotorSet};
use crate::state::Document;
use crate::stepping::{Stepper, SG39_WHEEL_ALPHAS};
use crate::utils::{letter_to_index, STD_ALPHA};

/// A machine configuration: the flat dictionary plus the rotor position
/// string that goes with it.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub config: BTreeMap<String, String>,
    pub positions: String,
}

impl MachineConfig {
    fn new(entries: &[(&str, &str)], positions: &str) -> Self {
        MachineConfig {
            config: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            positions: positions.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        self.config
            .get(key)
            .map(|v| v.as_str())
            .ok_or_else(|| SimulatorError::StateFormat(format!("missing config key '{}'", key)))
    }
}

/// The default configuration of a machine type, mirroring the canned
/// defaults of the original key sheets.
pub fn default_config(kind: MachineKind) -> MachineConfig {
    match kind {
        MachineKind::Services => MachineConfig::new(
            &[
                ("plugs", "adcnetflgijvkzpuqywx"),
                ("rings", "pzh"),
                ("rotors", "1143"),
                ("ukwdperm", "azbpcxdqetfogshvirknlmuw"),
                ("usesuhr", "false"),
            ],
            "rtz",
        ),
        MachineKind::M3 => MachineConfig::new(
            &[
                ("plugs", "adcnetflgijvkzpuqywx"),
                ("rings", "pzh"),
                ("rotors", "1143"),
                ("ukwdperm", "azbpcxdqetfogshvirknlmuw"),
            ],
            "rtz",
        ),
        MachineKind::M4 => MachineConfig::new(
            &[
                ("plugs", "atbldfgjhmnwopqyrzvx"),
                ("rings", "aaav"),
                ("rotors", "11241"),
            ],
            "vjna",
        ),
        MachineKind::Railway => MachineConfig::new(
            &[("rotors", "123"), ("rings", "aaaa")],
            "aaaa",
        ),
        MachineKind::Tirpitz => MachineConfig::new(
            &[("rotors", "785"), ("rings", "kqrb")],
            "acfm",
        ),
        MachineKind::Abwehr => MachineConfig::new(
            &[("rotors", "321"), ("rings", "aaaa")],
            "aaaa",
        ),
        MachineKind::KD => MachineConfig::new(
            &[
                ("rotors", "265"),
                ("rings", "qrb"),
                ("ukwdperm", "avboctdmezfngxhqiskrlupw"),
            ],
            "cfm",
        ),
        MachineKind::Typex => MachineConfig::new(
            &[
                ("rotorset", "defaultset"),
                ("plugs", ""),
                ("rings", "aaaaa"),
                ("rotors", "aNbNcRdNeN"),
                ("reflector", "arbycudheqfsglixjpknmotwvz"),
            ],
            "aaaaa",
        ),
        MachineKind::Sigaba => MachineConfig::new(
            &[
                ("cipher", "0N1N2R3N4N"),
                ("control", "5N6N7R8N9N"),
                ("index", "0N1N2R3N4N"),
                ("csp2900", "false"),
            ],
            "00000oomoooomoo",
        ),
        MachineKind::Kl7 => MachineConfig::new(
            &[
                ("rotors", "abcldefg"),
                ("alpharings", "27 1 1 17 1 1 1 1"),
                ("notchselect", "1 2 3 4 5 6 7"),
                ("notchrings", "kaaaaaa"),
            ],
            "faamaaaa",
        ),
        MachineKind::Nema => MachineConfig::new(
            &[
                ("rotors", "abcd"),
                ("ringselect", "12 13 14 15"),
                ("warmachine", "true"),
            ],
            "mqqpzqsoev",
        ),
        MachineKind::Sg39 => MachineConfig::new(
            &[
                ("rotorset", "defaultset"),
                ("rotors", "3415"),
                ("rings", "aaaa"),
                ("reflector", rotordata::SG39_DEFAULT_UKW_PAIRS),
                ("plugs", "ldtrmihoncpwjkbyevsaxgfzuq"),
                ("pinswheel1", ""),
                ("pinswheel2", "abcdefghijklmnopqrstuvw"),
                ("pinswheel3", "cfilorux"),
                ("pinsrotor1", ""),
                ("pinsrotor2", ""),
                ("pinsrotor3", "aeimquy"),
            ],
            "frqdaph",
        ),
    }
}

/// Builds the default state of a machine type.
pub fn make_default_state(kind: MachineKind) -> Result<Document> {
    let defaults = default_config(kind);
    make_state(kind, &defaults.config, &defaults.positions)
}

/// Builds a machine state from a configuration dictionary and a rotor
/// position string. An empty position string selects the default
/// positions of the machine type.
pub fn make_state(
    kind: MachineKind,
    config: &BTreeMap<String, String>,
    positions: &str,
) -> Result<Document> {
    let mut merged = default_config(kind);
    for (k, v) in config {
        merged.config.insert(k.clone(), v.clone());
    }
    if !positions.is_empty() {
        merged.positions = positions.to_string();
    }

    let doc = match kind {
        MachineKind::Services | MachineKind::M3 => build_services(kind, &merged)?,
        MachineKind::M4 => build_m4(&merged)?,
        MachineKind::Railway | MachineKind::Tirpitz | MachineKind::Abwehr | MachineKind::KD => {
            build_unsteckered(kind, &merged)?
        }
        MachineKind::Typex => build_typex(&merged)?,
        MachineKind::Sigaba => build_sigaba(&merged)?,
        MachineKind::Kl7 => build_kl7(&merged)?,
        MachineKind::Nema => build_nema(&merged)?,
        MachineKind::Sg39 => build_sg39(&merged)?,
    };

    // route the document through the machine so the requested window
    // positions land in the slot displacements
    let mut machine = RotorMachine::from_state(&doc)?;
    machine.set_positions(&merged.positions)?;

    Ok(machine.save())
}

// ---------------------------------------------------------------------------
// Builder plumbing
// ---------------------------------------------------------------------------

struct SlotSpec {
    name: &'static str,
    rid: u32,
    ring_id: u32,
    ring_offset: usize,
    window_offset: Option<usize>,
    reversed: bool,
    inverted: bool,
    perm_override: Option<Vec<usize>>,
    ring_override: Option<Vec<u8>>,
}

impl SlotSpec {
    fn new(name: &'static str, rid: u32) -> Self {
        SlotSpec {
            name,
            rid,
            ring_id: rid,
            ring_offset: 0,
            window_offset: None,
            reversed: false,
            inverted: false,
            perm_override: None,
            ring_override: None,
        }
    }

    fn ring(mut self, ring_id: u32) -> Self {
        self.ring_id = ring_id;
        self
    }

    fn offset(mut self, ring_offset: usize) -> Self {
        self.ring_offset = ring_offset;
        self
    }

    fn window(mut self, window_offset: usize) -> Self {
        self.window_offset = Some(window_offset);
        self
    }

    fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    fn wired(mut self, perm: Vec<usize>) -> Self {
        self.perm_override = Some(perm);
        self
    }

    fn pins(mut self, ring: Vec<u8>) -> Self {
        self.ring_override = Some(ring);
        self
    }
}

fn render_state(
    kind: MachineKind,
    set: &RotorSet,
    slots: &[SlotSpec],
    extra: impl FnOnce(&mut Document),
) -> Result<Document> {
    let mut doc = Document::new();

    doc.set("machine", "name", kind.state_name());
    doc.set("machine", "rotorsetname", set.name());

    if kind.is_enigma() {
        doc.set("machine", "machinetype", kind.canonical_name());
        doc.set_int_list(
            "machine",
            "ukwdwiring",
            &set.lookup(rotordata::UKW_D)?.permutation,
        );
    }

    for spec in slots {
        let section = format!("rotor_{}", spec.name);
        let alphabet = kind.slot_alphabet(spec.name);

        let base_perm = match &spec.perm_override {
            Some(perm) => perm.clone(),
            None => set.lookup(spec.rid)?.permutation.clone(),
        };
        let ring_data = match &spec.ring_override {
            Some(ring) => ring.clone(),
            None => set.lookup(spec.ring_id)?.ring_data.clone(),
        };

        let mut wiring = Permutation::from_int_vector(alphabet, base_perm)?;
        if spec.reversed {
            wiring = wiring.to_reverse();
        }
        if spec.inverted {
            wiring = wiring.to_inverse();
        }

        let ring: Vec<usize> = ring_data.iter().map(|&v| v as usize).collect();

        doc.set_int_list(&section, "permutation", &wiring.to_int_vector());
        doc.set_int_list(&section, "ringdata", &ring);
        doc.set_int(&section, "rid", spec.rid as usize);
        doc.set_int(&section, "ringid", spec.ring_id as usize);
        doc.set_bool(&section, "insertinverse", spec.reversed);
        doc.set_int(&section, "ringoffset", spec.ring_offset);
        doc.set_int(&section, "rotordisplacement", 0);

        if kind == MachineKind::Kl7 {
            doc.set_int(
                &section,
                "alpharingoffset",
                spec.window_offset.unwrap_or(spec.ring_offset),
            );
        }
    }

    extra(&mut doc);

    Ok(doc)
}

fn ring_letters(raw: &str, expected: usize) -> Result<Vec<usize>> {
    let values: Vec<usize> = raw.chars().filter_map(letter_to_index).collect();

    if values.len() != expected {
        return Err(SimulatorError::StateFormat(format!(
            "expected {} ring letters, got '{}'",
            expected, raw
        )));
    }

    Ok(values)
}

fn rotor_digits(raw: &str, expected: usize) -> Result<Vec<u32>> {
    let values: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

    if values.len() != expected {
        return Err(SimulatorError::StateFormat(format!(
            "expected {} rotor digits, got '{}'",
            expected, raw
        )));
    }

    Ok(values)
}

fn wheel_digits(raw: &str, expected: usize, min: u32, max: u32) -> Result<Vec<u32>> {
    let values = rotor_digits(raw, expected)?;

    if values.iter().any(|&v| v < min || v > max) {
        return Err(SimulatorError::StateFormat(format!(
            "rotor digits in '{}' must lie between {} and {}",
            raw, min, max
        )));
    }

    Ok(values)
}

fn plugboard_section(doc: &mut Document, board: &Plugboard) {
    doc.set_int_list("plugboard", "entry", board.entry_permutation());
    doc.set_bool("plugboard", "usesuhr", board.uses_uhr());
    if board.uses_uhr() {
        if let Some(cabling) = board.uhr_cabling() {
            doc.set("plugboard", "uhrcabling", cabling);
        }
        doc.set_int("plugboard", "uhrdialpos", board.uhr_dial_pos());
    }
}

/// Parses a plugs value; an Uhr dial position may be prefixed as
/// `27:pairs`.
fn parse_plugs(raw: &str, uses_uhr: bool) -> Result<Plugboard> {
    let (dial, cabling) = match raw.split_once(':') {
        Some((dial, rest)) => {
            let dial: usize = dial.parse().map_err(|_| {
                SimulatorError::StateFormat(format!("bad Uhr dial position in '{}'", raw))
            })?;
            (dial, rest)
        }
        None => (0, raw),
    };

    if uses_uhr {
        Plugboard::with_uhr(cabling, dial)
    } else if cabling.is_empty() {
        Ok(Plugboard::identity())
    } else {
        Plugboard::from_cabling(cabling)
    }
}

// ---------------------------------------------------------------------------
// Enigma family builders
// ---------------------------------------------------------------------------

fn services_reflector(digit: u32) -> Result<u32> {
    match digit {
        1 => Ok(rotordata::UKW_B),
        2 => Ok(rotordata::UKW_C),
        3 => Ok(rotordata::UKW_D),
        4 => Ok(rotordata::UKW_A),
        other => Err(SimulatorError::StateFormat(format!(
            "unknown reflector digit {}",
            other
        ))),
    }
}

fn build_services(kind: MachineKind, cfg: &MachineConfig) -> Result<Document> {
    let mut set = rotordata::enigma_rotor_set();

    if let Ok(pairs) = cfg.get("ukwdperm") {
        set.change_perm(rotordata::UKW_D, ukw_d_perm(pairs)?)?;
    }

    let digits = rotor_digits(cfg.get("rotors")?, 4)?;
    wheel_digits(&cfg.get("rotors")?[1..], 3, 1, 8)?;
    let rings = ring_letters(cfg.get("rings")?, 3)?;
    let ukw = services_reflector(digits[0])?;

    let slots = vec![
        SlotSpec::new("fast", rotordata::WALZE_I + digits[3] - 1).offset(rings[2]),
        SlotSpec::new("middle", rotordata::WALZE_I + digits[2] - 1).offset(rings[1]),
        SlotSpec::new("slow", rotordata::WALZE_I + digits[1] - 1).offset(rings[0]),
        SlotSpec::new("umkehrwalze", ukw),
    ];

    let uses_uhr = kind == MachineKind::Services && cfg.get("usesuhr")? == "true";
    let board = parse_plugs(cfg.get("plugs")?, uses_uhr)?;

    render_state(kind, &set, &slots, |doc| {
        plugboard_section(doc, &board);
    })
}

fn build_m4(cfg: &MachineConfig) -> Result<Document> {
    let set = rotordata::enigma_rotor_set();

    let digits = rotor_digits(cfg.get("rotors")?, 5)?;
    wheel_digits(&cfg.get("rotors")?[2..], 3, 1, 8)?;
    let rings = ring_letters(cfg.get("rings")?, 4)?;

    let ukw = match digits[0] {
        1 => rotordata::UKW_B_DN,
        2 => rotordata::UKW_C_DN,
        other => {
            return Err(SimulatorError::StateFormat(format!(
                "unknown thin reflector digit {}",
                other
            )))
        }
    };
    let greek = match digits[1] {
        1 => rotordata::WALZE_BETA,
        2 => rotordata::WALZE_GAMMA,
        other => {
            return Err(SimulatorError::StateFormat(format!(
                "unknown greek wheel digit {}",
                other
            )))
        }
    };

    let slots = vec![
        SlotSpec::new("fast", rotordata::WALZE_I + digits[4] - 1).offset(rings[3]),
        SlotSpec::new("middle", rotordata::WALZE_I + digits[3] - 1).offset(rings[2]),
        SlotSpec::new("slow", rotordata::WALZE_I + digits[2] - 1).offset(rings[1]),
        SlotSpec::new("griechenwalze", greek).offset(rings[0]),
        SlotSpec::new("umkehrwalze", ukw),
    ];

    let board = parse_plugs(cfg.get("plugs")?, false)?;

    render_state(MachineKind::M4, &set, &slots, |doc| {
        plugboard_section(doc, &board);
    })
}

fn build_unsteckered(kind: MachineKind, cfg: &MachineConfig) -> Result<Document> {
    let mut set = rotordata::enigma_rotor_set();

    let (first_rotor, etw, ukw) = match kind {
        MachineKind::Railway => (rotordata::WALZE_RB_I, rotordata::WALZE_RB_ETW, rotordata::UKW_RB),
        MachineKind::Tirpitz => (rotordata::WALZE_T_I, rotordata::WALZE_T_ETW, rotordata::UKW_T),
        MachineKind::Abwehr => (rotordata::WALZE_ABW_I, rotordata::WALZE_ABW_ETW, rotordata::UKW_ABW),
        MachineKind::KD => (rotordata::WALZE_KD_I, rotordata::WALZE_KD_ETW, rotordata::UKW_D),
        _ => unreachable!("not an unsteckered Enigma"),
    };

    if kind == MachineKind::KD {
        set.change_perm(rotordata::UKW_D, ukw_d_perm(cfg.get("ukwdperm")?)?)?;
    }

    let max_digit = match kind {
        MachineKind::Tirpitz => 8,
        MachineKind::KD => 6,
        _ => 3,
    };
    let digits = wheel_digits(cfg.get("rotors")?, 3, 1, max_digit)?;

    // the KD reflector neither rotates nor carries a ring
    let rings = if kind == MachineKind::KD {
        let mut rings = ring_letters(cfg.get("rings")?, 3)?;
        rings.insert(0, 0);
        rings
    } else {
        ring_letters(cfg.get("rings")?, 4)?
    };

    let slots = vec![
        SlotSpec::new("eintrittswalze", etw).inverted(),
        SlotSpec::new("fast", first_rotor + digits[2] - 1).offset(rings[3]),
        SlotSpec::new("middle", first_rotor + digits[1] - 1).offset(rings[2]),
        SlotSpec::new("slow", first_rotor + digits[0] - 1).offset(rings[1]),
        SlotSpec::new("umkehrwalze", ukw).offset(rings[0]),
    ];

    render_state(kind, &set, &slots, |_| {})
}

// ---------------------------------------------------------------------------
// Typex
// ---------------------------------------------------------------------------

fn build_typex(cfg: &MachineConfig) -> Result<Document> {
    let set_name = cfg.get("rotorset")?;
    let (set, first_wheel, ukw) = match set_name {
        "Y269" => (
            rotordata::typex_y269_rotor_set(),
            rotordata::TYPEX_Y_269_A,
            rotordata::TYPEX_Y_269_UKW,
        ),
        _ => (
            rotordata::enigma_rotor_set(),
            rotordata::TYPEX_SP_02390_A,
            rotordata::TYPEX_SP_02390_UKW,
        ),
    };

    let spec: Vec<char> = cfg.get("rotors")?.chars().collect();
    if spec.len() != 10 {
        return Err(SimulatorError::StateFormat(
            "typex rotors need five letter/orientation pairs".to_string(),
        ));
    }

    let rings = ring_letters(cfg.get("rings")?, 5)?;

    // display order stator1, stator2, slow, middle, fast
    let mut wheels = Vec::new();
    for pair in spec.chunks(2) {
        let idx = letter_to_index(pair[0]).ok_or(SimulatorError::UnknownSymbol(pair[0]))?;
        let reversed = pair[1] == 'R' || pair[1] == 'r';
        wheels.push((first_wheel + idx as u32, reversed));
    }

    let reflector = Permutation::involution_from_pairs(STD_ALPHA, cfg.get("reflector")?)?;

    let slots = vec![
        SlotSpec::new("eintrittswalze", rotordata::TYPEX_ETW).inverted(),
        SlotSpec::new("fast", wheels[4].0)
            .reversed(wheels[4].1)
            .offset(rings[4]),
        SlotSpec::new("middle", wheels[3].0)
            .reversed(wheels[3].1)
            .offset(rings[3]),
        SlotSpec::new("slow", wheels[2].0)
            .reversed(wheels[2].1)
            .offset(rings[2]),
        SlotSpec::new("stator2", wheels[1].0)
            .reversed(wheels[1].1)
            .offset(rings[1]),
        SlotSpec::new("stator1", wheels[0].0)
            .reversed(wheels[0].1)
            .offset(rings[0]),
        SlotSpec::new("umkehrwalze", ukw).wired(reflector.to_int_vector()),
    ];

    let board = parse_plugs(cfg.get("plugs")?, false)?;

    render_state(MachineKind::Typex, &set, &slots, |doc| {
        plugboard_section(doc, &board);
    })
}

// ---------------------------------------------------------------------------
// SIGABA
// ---------------------------------------------------------------------------

fn sigaba_bank(raw: &str, bank: &str, index_bank: bool) -> Result<Vec<(u32, bool)>> {
    let chars: Vec<char> = raw.chars().collect();

    if chars.len() != 10 {
        return Err(SimulatorError::StateFormat(format!(
            "sigaba {} bank needs five digit/orientation pairs",
            bank
        )));
    }

    let mut rotors = Vec::new();
    for pair in chars.chunks(2) {
        let digit = pair[0].to_digit(10).ok_or_else(|| {
            SimulatorError::StateFormat(format!("bad rotor digit '{}' in {} bank", pair[0], bank))
        })? as u32;
        let reversed = pair[1] == 'R' || pair[1] == 'r';
        let rid = if index_bank {
            rotordata::SIGABA_INDEX_0 + digit
        } else {
            digit
        };
        rotors.push((rid, reversed));
    }

    Ok(rotors)
}

fn build_sigaba(cfg: &MachineConfig) -> Result<Document> {
    let set = rotordata::sigaba_rotor_set();

    let index = sigaba_bank(cfg.get("index")?, "index", true)?;
    let control = sigaba_bank(cfg.get("control")?, "control", false)?;
    let cipher = sigaba_bank(cfg.get("cipher")?, "cipher", false)?;
    let csp2900 = cfg.get("csp2900")? == "true";

    let names = MachineKind::Sigaba.slot_names();
    let mut slots = Vec::new();

    for (i, &(rid, reversed)) in index.iter().enumerate() {
        slots.push(SlotSpec::new(names[i], rid).reversed(reversed));
    }
    for (i, &(rid, reversed)) in control.iter().enumerate() {
        slots.push(SlotSpec::new(names[5 + i], rid).reversed(reversed));
    }
    for (i, &(rid, reversed)) in cipher.iter().enumerate() {
        slots.push(SlotSpec::new(names[10 + i], rid).reversed(reversed));
    }

    render_state(MachineKind::Sigaba, &set, &slots, |doc| {
        doc.set_bool("machine", "csp2900", csp2900);
    })
}

// ---------------------------------------------------------------------------
// KL7
// ---------------------------------------------------------------------------

fn build_kl7(cfg: &MachineConfig) -> Result<Document> {
    let set = rotordata::kl7_rotor_set();

    let rotors: Vec<usize> = cfg
        .get("rotors")?
        .chars()
        .filter_map(letter_to_index)
        .collect();
    if rotors.len() != 8 || rotors.iter().any(|&r| r > 12) {
        return Err(SimulatorError::StateFormat(
            "kl7 rotors must name eight rotors a-m".to_string(),
        ));
    }

    let alpharings: Vec<usize> = cfg
        .get("alpharings")?
        .split_whitespace()
        .filter_map(|v| v.parse::<usize>().ok())
        .collect();
    if alpharings.len() != 8 || alpharings.iter().any(|&v| v == 0 || v > 36) {
        return Err(SimulatorError::StateFormat(
            "kl7 needs eight alphabet ring positions 1-36".to_string(),
        ));
    }

    let notchselect: Vec<usize> = cfg
        .get("notchselect")?
        .split_whitespace()
        .filter_map(|v| v.parse::<usize>().ok())
        .collect();
    if notchselect.len() != 7 || notchselect.iter().any(|&v| v == 0 || v > 11) {
        return Err(SimulatorError::StateFormat(
            "kl7 needs seven notch ring numbers 1-11".to_string(),
        ));
    }

    let notchrings: Vec<usize> = cfg
        .get("notchrings")?
        .chars()
        .filter_map(letter_to_index)
        .collect();
    if notchrings.len() != 7 {
        return Err(SimulatorError::StateFormat(
            "kl7 needs seven notch ring offsets".to_string(),
        ));
    }

    let names = MachineKind::Kl7.slot_names();
    let mut slots = Vec::new();
    let mut moving = 0usize;

    for (i, &rotor) in rotors.iter().enumerate() {
        let window_offset = alpharings[i] - 1;
        let spec = if i == 3 {
            // the stationary slot carries the wide ring
            SlotSpec::new(names[i], rotor as u32)
                .ring(rotordata::KL7_RING_WIDE)
                .window(window_offset)
        } else {
            let ring_id = rotordata::KL7_RING_1 + notchselect[moving] as u32 - 1;
            let offset = notchrings[moving];
            moving += 1;
            SlotSpec::new(names[i], rotor as u32)
                .ring(ring_id)
                .offset(offset)
                .window(window_offset)
        };
        slots.push(spec);
    }

    render_state(MachineKind::Kl7, &set, &slots, |_| {})
}

// ---------------------------------------------------------------------------
// Nema
// ---------------------------------------------------------------------------

fn build_nema(cfg: &MachineConfig) -> Result<Document> {
    let set = rotordata::nema_rotor_set();

    let rotors: Vec<usize> = cfg
        .get("rotors")?
        .chars()
        .filter_map(letter_to_index)
        .collect();
    if rotors.len() != 4 || rotors.iter().any(|&r| r > 5) {
        return Err(SimulatorError::StateFormat(
            "nema rotors must name four contact wheels a-f".to_string(),
        ));
    }

    let rings: Vec<u32> = cfg
        .get("ringselect")?
        .split_whitespace()
        .filter_map(|v| v.parse::<u32>().ok())
        .collect();
    if rings.len() != 4 || rings.iter().any(|&r| !(12..=23).contains(&r)) {
        return Err(SimulatorError::StateFormat(
            "nema needs four drive wheel rings 12-23".to_string(),
        ));
    }

    let warmachine = cfg.get("warmachine")? == "true";

    let ring_id = |n: u32| rotordata::NEMA_DRIVE_WHEEL_12 + n - 12;

    let slots = vec![
        SlotSpec::new("umkehrwalze", rotordata::NEMA_UKW),
        SlotSpec::new("drivewheel1", ring_id(rings[0])).ring(ring_id(rings[0])),
        SlotSpec::new("contact1", rotors[0] as u32),
        SlotSpec::new("drivewheel2", ring_id(rings[1])).ring(ring_id(rings[1])),
        SlotSpec::new("contact2", rotors[1] as u32),
        SlotSpec::new("drivewheel3", ring_id(rings[2])).ring(ring_id(rings[2])),
        SlotSpec::new("contact3", rotors[2] as u32),
        SlotSpec::new("drivewheel4", ring_id(rings[3])).ring(ring_id(rings[3])),
        SlotSpec::new("contact4", rotors[3] as u32),
        SlotSpec::new("redwheel", rotordata::NEMA_DRIVE_WHEEL_1),
        SlotSpec::new("eintrittswalze", rotordata::NEMA_ETW).inverted(),
    ];

    render_state(MachineKind::Nema, &set, &slots, |doc| {
        doc.set_bool("machine", "warmachine", warmachine);
    })
}

// ---------------------------------------------------------------------------
// SG39
// ---------------------------------------------------------------------------

fn pins_to_ring(pins: &str, alphabet: &str) -> Result<Vec<u8>> {
    let mut ring = vec![0u8; alphabet.chars().count()];

    for c in pins.chars() {
        let idx = symbol_index(alphabet, c)?;
        ring[idx] = 1;
    }

    Ok(ring)
}

fn build_sg39(cfg: &MachineConfig) -> Result<Document> {
    let set = rotordata::sg39_rotor_set();

    let digits = wheel_digits(cfg.get("rotors")?, 4, 0, 9)?;
    let rings = ring_letters(cfg.get("rings")?, 4)?;

    let reflector = Permutation::involution_from_pairs(STD_ALPHA, cfg.get("reflector")?)?;
    let board = parse_plugs(cfg.get("plugs")?, false)?;

    // display order is rotor 4 (static) down to rotor 1
    let rotor_pins = [
        pins_to_ring(cfg.get("pinsrotor1")?, STD_ALPHA)?,
        pins_to_ring(cfg.get("pinsrotor2")?, STD_ALPHA)?,
        pins_to_ring(cfg.get("pinsrotor3")?, STD_ALPHA)?,
    ];
    let wheel_pins = [
        pins_to_ring(cfg.get("pinswheel1")?, SG39_WHEEL_ALPHAS[0])?,
        pins_to_ring(cfg.get("pinswheel2")?, SG39_WHEEL_ALPHAS[1])?,
        pins_to_ring(cfg.get("pinswheel3")?, SG39_WHEEL_ALPHAS[2])?,
    ];

    let slots = vec![
        SlotSpec::new("rotor1", digits[3])
            .offset(rings[3])
            .pins(rotor_pins[0].clone()),
        SlotSpec::new("rotor2", digits[2])
            .offset(rings[2])
            .pins(rotor_pins[1].clone()),
        SlotSpec::new("rotor3", digits[1])
            .offset(rings[1])
            .pins(rotor_pins[2].clone()),
        SlotSpec::new("rotor4", digits[0]).offset(rings[0]),
        SlotSpec::new("umkehrwalze", rotordata::ID_SG39_UKW).wired(reflector.to_int_vector()),
        SlotSpec::new("pinwheel1", 0)
            .wired((0..21).collect())
            .pins(wheel_pins[0].clone()),
        SlotSpec::new("pinwheel2", 0)
            .wired((0..23).collect())
            .pins(wheel_pins[1].clone()),
        SlotSpec::new("pinwheel3", 0)
            .wired((0..25).collect())
            .pins(wheel_pins[2].clone()),
    ];

    render_state(MachineKind::Sg39, &set, &slots, |doc| {
        plugboard_section(doc, &board);
    })
}

// ---------------------------------------------------------------------------
// Reporting a live machine
// ---------------------------------------------------------------------------

fn slot_rotor(machine: &RotorMachine, name: &str) -> Result<crate::rotor::Rotor> {
    machine
        .stepper()
        .slots()
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.rotor.clone())
        .ok_or_else(|| {
            SimulatorError::StateInvariantViolation(format!("machine has no slot '{}'", name))
        })
}

fn slot_rid(machine: &RotorMachine, name: &str) -> u32 {
    machine
        .stepper()
        .slots()
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.rotor.rid())
        .unwrap_or(0)
}

fn slot_field(machine: &RotorMachine, name: &str, f: impl Fn(&crate::rotor::Rotor) -> usize) -> usize {
    machine
        .stepper()
        .slots()
        .iter()
        .find(|s| s.name == name)
        .map(|s| f(&s.rotor))
        .unwrap_or(0)
}

fn ring_letter(machine: &RotorMachine, slot: &str) -> char {
    let offset = slot_field(machine, slot, |r| r.ring_offset());
    (b'a' + offset as u8) as char
}

fn pins_string(ring: &[u8], alphabet: &str) -> String {
    let alpha: Vec<char> = alphabet.chars().collect();
    ring.iter()
        .enumerate()
        .filter(|(_, &v)| v == 1)
        .map(|(i, _)| alpha[i])
        .collect()
}

fn involution_pairs(perm: &[usize]) -> String {
    let mut seen = [false; 26];
    let mut out = String::new();

    for (i, &v) in perm.iter().enumerate() {
        if i != v && !seen[i] && !seen[v] {
            seen[i] = true;
            seen[v] = true;
            out.push((b'a' + i as u8) as char);
            out.push((b'a' + v as u8) as char);
        }
    }

    out
}

/// Converts a stored UKW D permutation back into German Air Force pair
/// notation.
fn ukwd_pairs(perm: &[usize]) -> String {
    let gaf: Vec<char> = crate::rotorset::UKWD_GAF_ALPHA.chars().collect();
    let mut pairs: Vec<(char, char)> = Vec::new();
    let mut seen = [false; 26];

    for (i, &v) in perm.iter().enumerate() {
        if i == v || seen[i] || seen[v] {
            continue;
        }
        seen[i] = true;
        seen[v] = true;

        let mut a = gaf[i];
        let mut b = gaf[v];
        if (a, b) == ('j', 'y') || (a, b) == ('y', 'j') {
            continue;
        }
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        pairs.push((a, b));
    }

    pairs.sort();
    pairs.iter().flat_map(|&(a, b)| [a, b]).collect()
}

/// Reports the flat configuration dictionary of a live machine.
pub fn get_config(machine: &RotorMachine) -> Result<BTreeMap<String, String>> {
    let mut cfg = BTreeMap::new();
    let kind = machine.kind();

    match kind {
        MachineKind::Services | MachineKind::M3 | MachineKind::M4 => {
            let ukw_digit = match slot_rid(machine, "umkehrwalze") {
                rid if rid == rotordata::UKW_B || rid == rotordata::UKW_B_DN => '1',
                rid if rid == rotordata::UKW_C || rid == rotordata::UKW_C_DN => '2',
                rid if rid == rotordata::UKW_D => '3',
                _ => '4',
            };

            let mut rotors = String::new();
            rotors.push(ukw_digit);
            let mut rings = String::new();

            if kind == MachineKind::M4 {
                let greek = if slot_rid(machine, "griechenwalze") == rotordata::WALZE_BETA {
                    '1'
                } else {
                    '2'
                };
                rotors.push(greek);
                rings.push(ring_letter(machine, "griechenwalze"));
            }

            for slot in ["slow", "middle", "fast"] {
                rotors.push(
                    char::from_digit(slot_rid(machine, slot) - rotordata::WALZE_I + 1, 10)
                        .unwrap_or('1'),
                );
                rings.push(ring_letter(machine, slot));
            }

            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("rings".to_string(), rings);

            if let Some(board) = machine.plugboard() {
                cfg.insert("plugs".to_string(), board.cabling_string());
                if kind == MachineKind::Services {
                    cfg.insert(
                        "usesuhr".to_string(),
                        if board.uses_uhr() { "true" } else { "false" }.to_string(),
                    );
                    if board.uses_uhr() {
                        cfg.insert(
                            "uhrdialpos".to_string(),
                            board.uhr_dial_pos().to_string(),
                        );
                    }
                }
            }

            if let Some(wiring) = machine.ukwd_wiring() {
                cfg.insert("ukwdperm".to_string(), ukwd_pairs(wiring));
            }
        }
        MachineKind::Railway | MachineKind::Tirpitz | MachineKind::Abwehr | MachineKind::KD => {
            let first_rotor = match kind {
                MachineKind::Railway => rotordata::WALZE_RB_I,
                MachineKind::Tirpitz => rotordata::WALZE_T_I,
                MachineKind::Abwehr => rotordata::WALZE_ABW_I,
                _ => rotordata::WALZE_KD_I,
            };

            let mut rotors = String::new();
            let mut rings = String::new();
            if kind != MachineKind::KD {
                rings.push(ring_letter(machine, "umkehrwalze"));
            }

            for slot in ["slow", "middle", "fast"] {
                rotors.push(
                    char::from_digit(slot_rid(machine, slot) - first_rotor + 1, 10).unwrap_or('1'),
                );
                rings.push(ring_letter(machine, slot));
            }

            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("rings".to_string(), rings);

            if let Some(wiring) = machine.ukwd_wiring() {
                cfg.insert("ukwdperm".to_string(), ukwd_pairs(wiring));
            }
        }
        MachineKind::Typex => {
            let first_wheel = if machine.rotor_set_name() == "Y269" {
                rotordata::TYPEX_Y_269_A
            } else {
                rotordata::TYPEX_SP_02390_A
            };

            let mut rotors = String::new();
            let mut rings = String::new();
            for slot in ["stator1", "stator2", "slow", "middle", "fast"] {
                let rotor = slot_rotor(machine, slot)?;
                rotors.push((b'a' + (rotor.rid() - first_wheel) as u8) as char);
                rotors.push(if rotor.is_inserted_reverse() { 'R' } else { 'N' });
                rings.push(ring_letter(machine, slot));
            }

            cfg.insert("rotorset".to_string(), machine.rotor_set_name().to_string());
            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("rings".to_string(), rings);
            cfg.insert(
                "reflector".to_string(),
                involution_pairs(slot_rotor(machine, "umkehrwalze")?.permutation()),
            );
            if let Some(board) = machine.plugboard() {
                cfg.insert("plugs".to_string(), board.cabling_string());
            }
        }
        MachineKind::Sigaba => {
            let bank = |prefix: &str, index_bank: bool| -> Result<String> {
                let mut out = String::new();
                for i in 0..5 {
                    let name = format!("{}_{}", prefix, i);
                    let rotor = slot_rotor(machine, &name)?;
                    let digit = if index_bank {
                        rotor.rid() - rotordata::SIGABA_INDEX_0
                    } else {
                        rotor.rid()
                    };
                    out.push(char::from_digit(digit, 10).unwrap_or('0'));
                    out.push(if rotor.is_inserted_reverse() { 'R' } else { 'N' });
                }
                Ok(out)
            };

            cfg.insert("cipher".to_string(), bank("cipher", false)?);
            cfg.insert("control".to_string(), bank("control", false)?);
            cfg.insert("index".to_string(), bank("index", true)?);
            let csp2900 = matches!(machine.stepper(), Stepper::Sigaba(s) if s.is_csp2900());
            cfg.insert(
                "csp2900".to_string(),
                if csp2900 { "true" } else { "false" }.to_string(),
            );
        }
        MachineKind::Kl7 => {
            let mut rotors = String::new();
            let mut alpharings = Vec::new();
            let mut notchselect = Vec::new();
            let mut notchrings = String::new();

            for (i, slot) in machine.stepper().slots().iter().enumerate() {
                rotors.push((b'a' + slot.rotor.rid() as u8) as char);
                alpharings.push((slot.rotor.window_offset() + 1).to_string());

                if i != 3 {
                    notchselect
                        .push((slot.rotor.ring_id() - rotordata::KL7_RING_1 + 1).to_string());
                    notchrings.push((b'a' + slot.rotor.ring_offset() as u8) as char);
                }
            }

            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("alpharings".to_string(), alpharings.join(" "));
            cfg.insert("notchselect".to_string(), notchselect.join(" "));
            cfg.insert("notchrings".to_string(), notchrings);
        }
        MachineKind::Nema => {
            let mut rotors = String::new();
            for slot in ["contact1", "contact2", "contact3", "contact4"] {
                rotors.push((b'a' + slot_rid(machine, slot) as u8) as char);
            }

            let mut ringselect = Vec::new();
            for slot in ["drivewheel1", "drivewheel2", "drivewheel3", "drivewheel4"] {
                let rid = slot_rid(machine, slot);
                ringselect.push((rid - rotordata::NEMA_DRIVE_WHEEL_12 + 12).to_string());
            }

            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("ringselect".to_string(), ringselect.join(" "));
            cfg.insert(
                "warmachine".to_string(),
                if machine.is_warmachine() { "true" } else { "false" }.to_string(),
            );
        }
        MachineKind::Sg39 => {
            let mut rotors = String::new();
            let mut rings = String::new();
            for slot in ["rotor4", "rotor3", "rotor2", "rotor1"] {
                rotors.push(char::from_digit(slot_rid(machine, slot), 10).unwrap_or('0'));
                rings.push(ring_letter(machine, slot));
            }

            cfg.insert("rotorset".to_string(), machine.rotor_set_name().to_string());
            cfg.insert("rotors".to_string(), rotors);
            cfg.insert("rings".to_string(), rings);

            cfg.insert(
                "reflector".to_string(),
                involution_pairs(slot_rotor(machine, "umkehrwalze")?.permutation()),
            );
            if let Some(board) = machine.plugboard() {
                cfg.insert("plugs".to_string(), board.cabling_string());
            }

            for (i, slot) in ["rotor1", "rotor2", "rotor3"].iter().enumerate() {
                let rotor = slot_rotor(machine, slot)?;
                cfg.insert(
                    format!("pinsrotor{}", i + 1),
                    pins_string(rotor.ring_data(), STD_ALPHA),
                );
            }
            for i in 0..3 {
                let rotor = slot_rotor(machine, &format!("pinwheel{}", i + 1))?;
                cfg.insert(
                    format!("pinswheel{}", i + 1),
                    pins_string(rotor.ring_data(), SG39_WHEEL_ALPHAS[i]),
                );
            }
        }
    }

    Ok(cfg)
}
