//! The rotor machine: binds a stepping gear to its fixed I/O
//! permutations and provides the en-/decryption, position and state
//! operations.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::error::{Result, SimulatorError};
use crate::permutation::Permutation;
use crate::plugboard::Plugboard;
use crate::rotor::Rotor;
use crate::rotordata;
use crate::rotorset::RotorSet;
use crate::state::Document;
use crate::stepping::{
    EnigmaStepper, EnigmaStepping, Kl7Stepper, NemaStepper, Sg39Stepper, SigabaStepper, Slot,
    Stepper, TypexStepper,
};
use crate::utils::STD_ALPHA;

// ---------------------------------------------------------------------------
// Machine inventory
// ---------------------------------------------------------------------------

/// All machine types the simulator knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineKind {
    Services,
    M3,
    M4,
    Railway,
    Tirpitz,
    Abwehr,
    KD,
    Typex,
    Sigaba,
    Kl7,
    Nema,
    Sg39,
}

impl MachineKind {
    /// The canonical machine name used on the command line and in the
    /// configuration interface.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            MachineKind::Services => "Services",
            MachineKind::M3 => "M3",
            MachineKind::M4 => "M4",
            MachineKind::Railway => "Railway",
            MachineKind::Tirpitz => "Tirpitz",
            MachineKind::Abwehr => "Abwehr",
            MachineKind::KD => "KD",
            MachineKind::Typex => "Typex",
            MachineKind::Sigaba => "SIGABA",
            MachineKind::Kl7 => "KL7",
            MachineKind::Nema => "Nema",
            MachineKind::Sg39 => "SG39",
        }
    }

    /// The value of the `name` key in the `[machine]` section.
    pub fn state_name(&self) -> &'static str {
        match self {
            MachineKind::Services | MachineKind::M3 => "Enigma",
            MachineKind::M4 => "M4Enigma",
            MachineKind::Railway => "RailwayEnigma",
            MachineKind::Tirpitz => "TirpitzEnigma",
            MachineKind::Abwehr => "AbwehrEnigma",
            MachineKind::KD => "KDEnigma",
            MachineKind::Typex => "Typex",
            MachineKind::Sigaba => "SIGABA",
            MachineKind::Kl7 => "KL7",
            MachineKind::Nema => "Nema",
            MachineKind::Sg39 => "SG39",
        }
    }

    /// Parses the canonical machine name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Services" => Ok(MachineKind::Services),
            "M3" => Ok(MachineKind::M3),
            "M4" => Ok(MachineKind::M4),
            "Railway" => Ok(MachineKind::Railway),
            "Tirpitz" => Ok(MachineKind::Tirpitz),
            "Abwehr" => Ok(MachineKind::Abwehr),
            "KD" => Ok(MachineKind::KD),
            "Typex" => Ok(MachineKind::Typex),
            "SIGABA" => Ok(MachineKind::Sigaba),
            "KL7" => Ok(MachineKind::Kl7),
            "Nema" => Ok(MachineKind::Nema),
            "SG39" => Ok(MachineKind::Sg39),
            other => Err(SimulatorError::UnsupportedProcedure(format!(
                "unknown machine '{}'",
                other
            ))),
        }
    }

    /// True for the Enigma family members (including the unsteckered
    /// variants, excluding the Typex).
    pub fn is_enigma(&self) -> bool {
        matches!(
            self,
            MachineKind::Services
                | MachineKind::M3
                | MachineKind::M4
                | MachineKind::Railway
                | MachineKind::Tirpitz
                | MachineKind::Abwehr
                | MachineKind::KD
        )
    }

    /// Slot names of the machine in serialisation order.
    pub fn slot_names(&self) -> &'static [&'static str] {
        match self {
            MachineKind::Services | MachineKind::M3 => {
                &["fast", "middle", "slow", "umkehrwalze"]
            }
            MachineKind::M4 => &["fast", "middle", "slow", "griechenwalze", "umkehrwalze"],
            MachineKind::Railway | MachineKind::Tirpitz | MachineKind::Abwehr | MachineKind::KD => {
                &["eintrittswalze", "fast", "middle", "slow", "umkehrwalze"]
            }
            MachineKind::Typex => &[
                "eintrittswalze",
                "fast",
                "middle",
                "slow",
                "stator2",
                "stator1",
                "umkehrwalze",
            ],
            MachineKind::Sigaba => &[
                "index_0", "index_1", "index_2", "index_3", "index_4", "control_0", "control_1",
                "control_2", "control_3", "control_4", "cipher_0", "cipher_1", "cipher_2",
                "cipher_3", "cipher_4",
            ],
            MachineKind::Kl7 => &[
                "kl7_1", "kl7_2", "kl7_3", "kl7_4", "kl7_5", "kl7_6", "kl7_7", "kl7_8",
            ],
            MachineKind::Nema => &[
                "umkehrwalze",
                "drivewheel1",
                "contact1",
                "drivewheel2",
                "contact2",
                "drivewheel3",
                "contact3",
                "drivewheel4",
                "contact4",
                "redwheel",
                "eintrittswalze",
            ],
            MachineKind::Sg39 => &[
                "rotor1",
                "rotor2",
                "rotor3",
                "rotor4",
                "umkehrwalze",
                "pinwheel1",
                "pinwheel2",
                "pinwheel3",
            ],
        }
    }

    /// Window alphabet of a slot.
    pub fn slot_alphabet(&self, slot_name: &str) -> &'static str {
        match self {
            MachineKind::Kl7 => rotordata::KL7_ALPHA,
            MachineKind::Sigaba if slot_name.starts_with("index_") => {
                rotordata::SIGABA_INDEX_ALPHA
            }
            MachineKind::Sg39 => match slot_name {
                "pinwheel1" => crate::stepping::SG39_WHEEL_ALPHAS[0],
                "pinwheel2" => crate::stepping::SG39_WHEEL_ALPHAS[1],
                "pinwheel3" => crate::stepping::SG39_WHEEL_ALPHAS[2],
                _ => STD_ALPHA,
            },
            _ => STD_ALPHA,
        }
    }

    /// The embedded rotor set of the machine family, selected by name.
    pub fn rotor_set(&self, set_name: &str) -> Result<RotorSet> {
        match (self, set_name) {
            (MachineKind::Typex, "Y269") => Ok(rotordata::typex_y269_rotor_set()),
            (MachineKind::Sigaba, _) => Ok(rotordata::sigaba_rotor_set()),
            (MachineKind::Kl7, _) => Ok(rotordata::kl7_rotor_set()),
            (MachineKind::Nema, _) => Ok(rotordata::nema_rotor_set()),
            (MachineKind::Sg39, _) => Ok(rotordata::sg39_rotor_set()),
            (_, "defaultset") => Ok(rotordata::enigma_rotor_set()),
            (_, other) => Err(SimulatorError::RotorSetFormat(format!(
                "machine {} has no rotor set '{}'",
                self.canonical_name(),
                other
            ))),
        }
    }

    /// Names of the rotor sets the machine can run with.
    pub fn rotor_set_names(&self) -> Vec<String> {
        match self {
            MachineKind::Typex => vec!["defaultset".to_string(), "Y269".to_string()],
            _ => vec!["defaultset".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Shifted input/output alphabets
// ---------------------------------------------------------------------------

/// Letter mode alphabet of the Typex; `>` and `<` are the figure and
/// letter shift keys, blank sits on the x contact.
pub const TYPEX_LETTERS: &str = "abcdefghijklmnopqrstu<w y>";
/// Figure mode alphabet of the Typex.
pub const TYPEX_FIGURES: &str = "-'vz3%x\u{a3}8*().,9014/57<2 6>";
/// Letter mode alphabet of the KL7; `>` sits on the j key, blank on z.
pub const KL7_LETTERS: &str = "abcdefghi>klmnopqrstuvwxy ";
/// Figure mode alphabet of the KL7.
pub const KL7_FIGURES: &str = "abcd3fgh8>klmn9014s57<2x6 ";
/// Encryption input alphabet of the SIGABA: z is reserved for blank.
pub const SIGABA_INPUT: &str = "abcdefghijklmnopqrstuvwxy ";

/// How the machine maps symbols to rotor contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IoMode {
    /// Plain a-z in and out.
    Plain,
    /// a-y plus blank on the z contact (SIGABA).
    Sigaba,
    /// Letter/figure shifted alphabets (Typex, KL7).
    Shifted {
        letters: &'static str,
        figures: &'static str,
    },
}

impl IoMode {
    fn for_kind(kind: MachineKind) -> IoMode {
        match kind {
            MachineKind::Typex => IoMode::Shifted {
                letters: TYPEX_LETTERS,
                figures: TYPEX_FIGURES,
            },
            MachineKind::Kl7 => IoMode::Shifted {
                letters: KL7_LETTERS,
                figures: KL7_FIGURES,
            },
            MachineKind::Sigaba => IoMode::Sigaba,
            _ => IoMode::Plain,
        }
    }
}

// ---------------------------------------------------------------------------
// The machine
// ---------------------------------------------------------------------------

/// A complete rotor machine built from a state document.
#[derive(Debug, Clone)]
pub struct RotorMachine {
    kind: MachineKind,
    stepper: Stepper,
    plugboard: Option<Plugboard>,
    rotor_set_name: String,
    ukwd_wiring: Option<Vec<usize>>,
    warmachine: bool,
    io: IoMode,
    figures_mode: bool,
}

impl RotorMachine {
    /// Restores a machine from a serialised state. Parsing happens first
    /// and completely; the machine is only constructed from fully
    /// validated data.
    pub fn from_state_text(text: &str) -> Result<Self> {
        Self::from_state(&Document::parse(text)?)
    }

    /// Restores a machine from a parsed state document.
    pub fn from_state(doc: &Document) -> Result<Self> {
        let name = doc.require("machine", "name")?;
        let rotor_set_name = doc.require("machine", "rotorsetname")?;

        let kind = match name.as_str() {
            "Enigma" => match doc.require("machine", "machinetype")?.as_str() {
                "M3" => MachineKind::M3,
                _ => MachineKind::Services,
            },
            "M4Enigma" => MachineKind::M4,
            "RailwayEnigma" => MachineKind::Railway,
            "TirpitzEnigma" => MachineKind::Tirpitz,
            "AbwehrEnigma" => MachineKind::Abwehr,
            "KDEnigma" => MachineKind::KD,
            "Typex" => MachineKind::Typex,
            "SIGABA" => MachineKind::Sigaba,
            "KL7" => MachineKind::Kl7,
            "Nema" => MachineKind::Nema,
            "SG39" => MachineKind::Sg39,
            other => {
                return Err(SimulatorError::StateFormat(format!(
                    "unknown machine name '{}'",
                    other
                )))
            }
        };

        let mut slots = Vec::new();
        for &slot_name in kind.slot_names() {
            slots.push(Self::load_slot(doc, kind, slot_name)?);
        }

        let plugboard = if doc.has_section("plugboard") {
            let entry = doc.require_int_list("plugboard", "entry")?;
            let uses_uhr = doc.require_bool("plugboard", "usesuhr")?;
            let cabling = doc.get("plugboard", "uhrcabling");
            let dial = if uses_uhr {
                doc.require_int("plugboard", "uhrdialpos")?
            } else {
                0
            };
            Some(Plugboard::from_state(entry, uses_uhr, cabling, dial)?)
        } else {
            None
        };

        let ukwd_wiring = match doc.get("machine", "ukwdwiring") {
            Some(_) => Some(doc.require_int_list("machine", "ukwdwiring")?),
            None => None,
        };

        let stepper = match kind {
            MachineKind::Services | MachineKind::M3 => Stepper::Enigma(EnigmaStepper::new(
                slots,
                false,
                false,
                EnigmaStepping::Pawl,
            )),
            MachineKind::M4 => Stepper::Enigma(EnigmaStepper::new(
                slots,
                false,
                false,
                EnigmaStepping::Pawl,
            )),
            MachineKind::Railway | MachineKind::Tirpitz => Stepper::Enigma(EnigmaStepper::new(
                slots,
                true,
                true,
                EnigmaStepping::Pawl,
            )),
            // the rewirable UKW D of the KD Enigma does not rotate and
            // has no position window
            MachineKind::KD => Stepper::Enigma(EnigmaStepper::new(
                slots,
                true,
                false,
                EnigmaStepping::Pawl,
            )),
            MachineKind::Abwehr => Stepper::Enigma(EnigmaStepper::new(
                slots,
                true,
                true,
                EnigmaStepping::Cog,
            )),
            MachineKind::Typex => Stepper::Typex(TypexStepper::new(slots)),
            MachineKind::Sigaba => {
                let csp2900 = doc
                    .get("machine", "csp2900")
                    .map(|_| doc.require_bool("machine", "csp2900"))
                    .transpose()?
                    .unwrap_or(false);
                Stepper::Sigaba(SigabaStepper::new(slots, csp2900))
            }
            MachineKind::Kl7 => Stepper::Kl7(Kl7Stepper::new(slots)),
            MachineKind::Nema => Stepper::Nema(NemaStepper::new(slots)),
            MachineKind::Sg39 => Stepper::Sg39(Sg39Stepper::new(slots)),
        };

        let warmachine = doc
            .get("machine", "warmachine")
            .map(|_| doc.require_bool("machine", "warmachine"))
            .transpose()?
            .unwrap_or(false);

        debug!("restored {} machine from state", kind.canonical_name());

        Ok(RotorMachine {
            kind,
            stepper,
            plugboard,
            rotor_set_name,
            ukwd_wiring,
            warmachine,
            io: IoMode::for_kind(kind),
            figures_mode: false,
        })
    }

    fn load_slot(doc: &Document, kind: MachineKind, slot_name: &'static str) -> Result<Slot> {
        let section = format!("rotor_{}", slot_name);

        if !doc.has_section(&section) {
            return Err(SimulatorError::StateFormat(format!(
                "missing section [{}]",
                section
            )));
        }

        let perm = doc.require_int_list(&section, "permutation")?;
        let ring: Vec<u8> = doc
            .require_int_list(&section, "ringdata")?
            .iter()
            .map(|&v| if v != 0 { 1 } else { 0 })
            .collect();
        let rid = doc.require_int(&section, "rid")? as u32;
        let ring_id = doc.require_int(&section, "ringid")? as u32;
        let reversed = doc.require_bool(&section, "insertinverse")?;
        let ring_offset = doc.require_int(&section, "ringoffset")?;
        let displacement = doc.require_int(&section, "rotordisplacement")?;

        let alphabet = kind.slot_alphabet(slot_name);

        if perm.len() != alphabet.chars().count() {
            return Err(SimulatorError::StateInvariantViolation(format!(
                "slot {} expects {} contacts, state carries {}",
                slot_name,
                alphabet.chars().count(),
                perm.len()
            )));
        }

        let mut rotor = Rotor::new(rid, ring_id, perm, ring, alphabet)?;
        if reversed {
            rotor = rotor.mark_reversed();
        }
        rotor.set_ring_offset(ring_offset);

        if kind == MachineKind::Kl7 {
            let window = doc.require_int(&section, "alpharingoffset")?;
            rotor.set_window_offset(window);
        }

        rotor.set_displacement(displacement);

        Ok(Slot::new(slot_name, rotor))
    }

    /// Serialises the machine into a state document. The round trip
    /// through [`RotorMachine::from_state`] restores an identical
    /// machine.
    pub fn save(&self) -> Document {
        let mut doc = Document::new();

        doc.set("machine", "name", self.kind.state_name());
        doc.set("machine", "rotorsetname", &self.rotor_set_name);

        if self.kind.is_enigma() {
            doc.set("machine", "machinetype", self.kind.canonical_name());
            if let Some(wiring) = &self.ukwd_wiring {
                doc.set_int_list("machine", "ukwdwiring", wiring);
            }
        }

        if let Stepper::Sigaba(s) = &self.stepper {
            doc.set_bool("machine", "csp2900", s.is_csp2900());
        }

        if self.kind == MachineKind::Nema {
            doc.set_bool("machine", "warmachine", self.warmachine);
        }

        for slot in self.stepper.slots() {
            let section = format!("rotor_{}", slot.name);
            let ring: Vec<usize> = slot.rotor.ring_data().iter().map(|&v| v as usize).collect();

            doc.set_int_list(&section, "permutation", slot.rotor.permutation());
            doc.set_int_list(&section, "ringdata", &ring);
            doc.set_int(&section, "rid", slot.rotor.rid() as usize);
            doc.set_int(&section, "ringid", slot.rotor.ring_id() as usize);
            doc.set_bool(&section, "insertinverse", slot.rotor.is_inserted_reverse());
            doc.set_int(&section, "ringoffset", slot.rotor.ring_offset());
            doc.set_int(&section, "rotordisplacement", slot.rotor.displacement());

            if self.kind == MachineKind::Kl7 {
                doc.set_int(&section, "alpharingoffset", slot.rotor.window_offset());
            }
        }

        if let Some(board) = &self.plugboard {
            doc.set_int_list("plugboard", "entry", board.entry_permutation());
            doc.set_bool("plugboard", "usesuhr", board.uses_uhr());
            if board.uses_uhr() {
                if let Some(cabling) = board.uhr_cabling() {
                    doc.set("plugboard", "uhrcabling", cabling);
                }
                doc.set_int("plugboard", "uhrdialpos", board.uhr_dial_pos());
            }
        }

        doc
    }

    /// Replaces the machine state; all-or-nothing.
    pub fn set_state(&mut self, doc: &Document) -> Result<()> {
        *self = RotorMachine::from_state(doc)?;
        Ok(())
    }

    pub fn kind(&self) -> MachineKind {
        self.kind
    }

    /// The machine type description shown to users.
    pub fn get_description(&self) -> &'static str {
        self.kind.canonical_name()
    }

    pub fn rotor_set_name(&self) -> &str {
        &self.rotor_set_name
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    pub fn plugboard(&self) -> Option<&Plugboard> {
        self.plugboard.as_ref()
    }

    pub fn ukwd_wiring(&self) -> Option<&[usize]> {
        self.ukwd_wiring.as_deref()
    }

    pub fn is_warmachine(&self) -> bool {
        self.warmachine
    }

    /// Names of the rotor sets available to this machine.
    pub fn get_rotor_set_names(&self) -> Vec<String> {
        self.kind.rotor_set_names()
    }

    /// Loads a serialised rotor set and rewires every mounted rotor whose
    /// id appears in it. Positions, ring offsets and orientations are
    /// kept.
    pub fn set_rotor_set_state(&mut self, ini_text: &str) -> Result<()> {
        let kind = self.kind;
        let mut overlay = kind.rotor_set(&self.rotor_set_name)?;
        overlay.load_ini(ini_text)?;

        for slot in match &mut self.stepper {
            Stepper::Enigma(s) => s.slots_mut(),
            Stepper::Typex(s) => s.slots_mut(),
            Stepper::Sigaba(s) => s.slots_mut(),
            Stepper::Kl7(s) => s.slots_mut(),
            Stepper::Nema(s) => s.slots_mut(),
            Stepper::Sg39(s) => s.slots_mut(),
        } {
            let rid = slot.rotor.rid();
            if let Ok(entry) = overlay.lookup(rid) {
                if entry.permutation.len() != slot.rotor.size() {
                    return Err(SimulatorError::RotorSetFormat(format!(
                        "rotor {} has wrong contact count for slot {}",
                        rid, slot.name
                    )));
                }

                let alphabet = kind.slot_alphabet(slot.name);
                let mut wiring =
                    Permutation::from_int_vector(alphabet, entry.permutation.clone())?;
                if slot.rotor.is_inserted_reverse() {
                    wiring = wiring.to_reverse();
                }
                // entry wheels are mounted with their wiring inverted
                if slot.name == "eintrittswalze" {
                    wiring = wiring.to_inverse();
                }

                let mut fresh = Rotor::new(
                    rid,
                    slot.rotor.ring_id(),
                    wiring.to_int_vector(),
                    slot.rotor.ring_data().to_vec(),
                    alphabet,
                )?;
                if slot.rotor.is_inserted_reverse() {
                    fresh = fresh.mark_reversed();
                }
                fresh.set_ring_offset(slot.rotor.ring_offset());
                fresh.set_window_offset(slot.rotor.window_offset());
                fresh.set_displacement(slot.rotor.displacement());
                slot.rotor = fresh;
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------
    // Positions and stepping
    // -----------------------------------------------------------------

    pub fn get_positions(&self) -> String {
        self.stepper.get_positions()
    }

    pub fn set_positions(&mut self, positions: &str) -> Result<()> {
        self.stepper.set_positions(positions)
    }

    /// Steps the machine `count` times and returns the visualised rotor
    /// positions after each step.
    pub fn step(&mut self, count: usize) -> Vec<String> {
        let mut result = Vec::with_capacity(count);

        for _ in 0..count {
            self.stepper.step_once();
            result.push(self.get_positions());
        }

        result
    }

    /// Performs SIGABA setup stepping of one control rotor and returns
    /// the positions reached after each step.
    pub fn sigaba_setup(&mut self, rotor_num: usize, count: usize) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(count);

        for _ in 0..count {
            self.stepper.sigaba_setup(rotor_num)?;
            result.push(self.get_positions());
        }

        Ok(result)
    }

    /// Resets a shifting machine into letter mode; a no-op everywhere
    /// else. Idempotent.
    pub fn go_to_letter_state(&mut self) {
        self.figures_mode = false;
    }

    // -----------------------------------------------------------------
    // En-/decryption
    // -----------------------------------------------------------------

    fn current_input_alphabet(&self) -> &'static str {
        match self.io {
            IoMode::Plain => STD_ALPHA,
            IoMode::Sigaba => SIGABA_INPUT,
            IoMode::Shifted { letters, figures } => {
                if self.figures_mode {
                    figures
                } else {
                    letters
                }
            }
        }
    }

    /// The full machine permutation at the current rotor positions: the
    /// plug board, the rotor stack and the return path through the plug
    /// board.
    pub fn current_permutation(&self) -> Vec<usize> {
        let stack = self.stepper.stack_permutation();

        match &self.plugboard {
            None => stack,
            Some(board) => (0..26)
                .map(|c| board.backward(stack[board.forward(c)]))
                .collect(),
        }
    }

    /// Steps the machine `count` times and returns the machine
    /// permutation after each step; with `count == 0` the current
    /// permutation is returned without stepping.
    pub fn get_permutations(&mut self, count: usize) -> Vec<Vec<usize>> {
        if count == 0 {
            return vec![self.current_permutation()];
        }

        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            self.stepper.step_once();
            result.push(self.current_permutation());
        }

        result
    }

    /// Encrypts a single symbol: step, permute, map. The input symbol is
    /// validated before the gear moves, so a failed call leaves the
    /// machine untouched.
    pub fn encrypt_char(&mut self, symbol: char) -> Result<char> {
        let alphabet = self.current_input_alphabet();
        let value = crate::permutation::symbol_index(alphabet, symbol)
            .map_err(|_| SimulatorError::UnknownSymbol(symbol))?;

        self.stepper.step_once();
        let out = self.current_permutation()[value];

        if let IoMode::Shifted { .. } = self.io {
            if symbol == '>' {
                self.figures_mode = true;
            } else if symbol == '<' {
                self.figures_mode = false;
            }
        }

        Ok((b'a' + out as u8) as char)
    }

    /// Decrypts a single ciphertext letter. Shift symbols flip the mode
    /// and produce no output.
    pub fn decrypt_char(&mut self, symbol: char) -> Result<Option<char>> {
        let value = crate::utils::letter_to_index(symbol)
            .ok_or(SimulatorError::UnknownSymbol(symbol))?;

        self.stepper.step_once();

        let perm = self.current_permutation();
        let mut inverse = vec![0usize; 26];
        for (i, &v) in perm.iter().enumerate() {
            inverse[v] = i;
        }
        let out = inverse[value];

        match self.io {
            IoMode::Plain => Ok(Some((b'a' + out as u8) as char)),
            IoMode::Sigaba => Ok(SIGABA_INPUT.chars().nth(out)),
            IoMode::Shifted { letters, figures } => {
                let alphabet = if self.figures_mode { figures } else { letters };
                let plain = alphabet.chars().nth(out).unwrap_or('?');

                match plain {
                    '>' => {
                        self.figures_mode = true;
                        Ok(None)
                    }
                    '<' => {
                        self.figures_mode = false;
                        Ok(None)
                    }
                    other => Ok(Some(other)),
                }
            }
        }
    }

    /// Encrypts a whole string.
    pub fn encrypt(&mut self, text: &str) -> Result<String> {
        info!("encrypting {} characters on {}", text.chars().count(), self.get_description());
        let mut result = String::new();

        for c in text.chars() {
            result.push(self.encrypt_char(c)?);
        }

        Ok(result)
    }

    /// Decrypts a whole string.
    pub fn decrypt(&mut self, text: &str) -> Result<String> {
        info!("decrypting {} characters on {}", text.chars().count(), self.get_description());
        let mut result = String::new();

        for c in text.chars() {
            if let Some(plain) = self.decrypt_char(c)? {
                result.push(plain);
            }
        }

        Ok(result)
    }

    /// Reports the machine configuration as a flat dictionary.
    pub fn get_config(&self) -> Result<BTreeMap<String, String>> {
        crate::config::get_config(self)
    }

    /// The randomizer parameter tokens this machine accepts.
    pub fn get_randomizer_params(&self) -> Vec<&'static str> {
        crate::randomize::randomizer_params(self.kind)
    }

    /// Randomizes the machine state subject to the given parameter token.
    pub fn randomize_state(&mut self, token: &str) -> Result<()> {
        let doc = crate::randomize::randomize(self.kind, token)?;
        self.set_state(&doc)
    }
}
