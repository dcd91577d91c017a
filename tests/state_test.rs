//! Integration tests of the state codec: lossless round trips, strict
//! parsing and all-or-nothing state replacement.

use rstest::rstest;

use rotorsim_rs::config;
use rotorsim_rs::error::SimulatorError;
use rotorsim_rs::machine::{MachineKind, RotorMachine};
use rotorsim_rs::state::Document;

#[rstest]
#[case::services(MachineKind::Services)]
#[case::m3(MachineKind::M3)]
#[case::m4(MachineKind::M4)]
#[case::railway(MachineKind::Railway)]
#[case::tirpitz(MachineKind::Tirpitz)]
#[case::abwehr(MachineKind::Abwehr)]
#[case::kd(MachineKind::KD)]
#[case::typex(MachineKind::Typex)]
#[case::sigaba(MachineKind::Sigaba)]
#[case::kl7(MachineKind::Kl7)]
#[case::nema(MachineKind::Nema)]
#[case::sg39(MachineKind::Sg39)]
fn test_state_parse_serialise_identity(#[case] kind: MachineKind) {
    let state = config::make_default_state(kind).unwrap();
    let rendered = state.render();

    let parsed = Document::parse(&rendered).unwrap();
    assert_eq!(parsed, state);
    assert_eq!(parsed.render(), rendered);

    // a machine loaded from the round-tripped text serialises the same
    let machine = RotorMachine::from_state_text(&rendered).unwrap();
    assert_eq!(machine.save(), state);
}

#[test]
fn test_state_sections_present() {
    let state = config::make_default_state(MachineKind::M4).unwrap();

    assert_eq!(state.get("machine", "name").unwrap(), "M4Enigma");
    assert_eq!(state.get("machine", "machinetype").unwrap(), "M4");
    assert_eq!(state.get("machine", "rotorsetname").unwrap(), "defaultset");
    assert!(state.has_section("rotor_fast"));
    assert!(state.has_section("rotor_griechenwalze"));
    assert!(state.has_section("plugboard"));
    assert_eq!(state.get("plugboard", "usesuhr").unwrap(), "false");
}

#[test]
fn test_slot_section_carries_redundant_wiring() {
    let state = config::make_default_state(MachineKind::M4).unwrap();

    // the fast slot holds Walze I with ring v and window a
    assert_eq!(state.require_int("rotor_fast", "rid").unwrap(), 0);
    assert_eq!(state.require_int("rotor_fast", "ringoffset").unwrap(), 21);
    assert_eq!(
        state.require_int("rotor_fast", "rotordisplacement").unwrap(),
        5
    );
    assert_eq!(
        state.require_int_list("rotor_fast", "permutation").unwrap().len(),
        26
    );
}

#[test]
fn test_section_order_tolerated() {
    let state = config::make_default_state(MachineKind::Services).unwrap();
    let rendered = state.render();

    // move the last section to the front; parsing must not care
    let blocks: Vec<&str> = rendered.split("\n\n").filter(|b| !b.trim().is_empty()).collect();
    let mut reordered = blocks.clone();
    reordered.rotate_right(1);
    let shuffled = format!("{}\n", reordered.join("\n\n"));

    let machine = RotorMachine::from_state_text(&shuffled).unwrap();
    assert_eq!(machine.get_description(), "Services");
}

#[test]
fn test_missing_slot_rejected() {
    let state = config::make_default_state(MachineKind::Services).unwrap();
    let rendered = state.render();
    let broken = rendered.replace("[rotor_fast]", "[rotor_fastest]");

    let result = RotorMachine::from_state_text(&broken);
    assert!(matches!(result, Err(SimulatorError::StateFormat(_))));
}

#[test]
fn test_broken_permutation_rejected() {
    let state = config::make_default_state(MachineKind::Services).unwrap();
    let mut broken = state.clone();
    broken.set_int_list("rotor_fast", "permutation", &vec![0; 26]);

    let result = RotorMachine::from_state(&broken);
    assert!(matches!(
        result,
        Err(SimulatorError::InvalidPermutation(_))
    ));
}

#[test]
fn test_set_state_is_all_or_nothing() {
    let good = config::make_default_state(MachineKind::M4).unwrap();
    let mut machine = RotorMachine::from_state(&good).unwrap();

    let mut broken = good.clone();
    broken.set("rotor_fast", "rotordisplacement", "not a number");
    assert!(machine.set_state(&broken).is_err());

    // the machine still runs with its previous state
    assert_eq!(machine.decrypt("nczwvusx").unwrap(), "vonvonjl");
}

#[test]
fn test_plugboard_involution_enforced() {
    let state = config::make_default_state(MachineKind::M4).unwrap();
    let mut broken = state.clone();
    // a -> b but b -> c is no involution
    let mut perm: Vec<usize> = (0..26).collect();
    perm[0] = 1;
    perm[1] = 2;
    perm[2] = 0;
    broken.set_int_list("plugboard", "entry", &perm);

    let result = RotorMachine::from_state(&broken);
    assert!(matches!(
        result,
        Err(SimulatorError::StateInvariantViolation(_))
    ));
}

#[test]
fn test_rotor_set_file_roundtrip() {
    use rotorsim_rs::rotordata;

    let set = rotordata::typex_y269_rotor_set();
    let rendered = set.save_ini();

    // loading the Y269 wirings over the default set rewires the Typex
    let mut machine = RotorMachine::from_state(
        &config::make_default_state(MachineKind::Typex).unwrap(),
    )
    .unwrap();

    // the default Typex uses wheels a-e of the SP 02390 set whose ids do
    // not occur in the Y269 file, so nothing changes
    let before = machine.save();
    machine.set_rotor_set_state(&rendered).unwrap();
    assert_eq!(machine.save(), before);
}

#[test]
fn test_ukwd_wiring_stored_in_state() {
    let state = config::make_default_state(MachineKind::KD).unwrap();
    let wiring = state.require_int_list("machine", "ukwdwiring").unwrap();

    assert_eq!(wiring.len(), 26);
    for (i, &v) in wiring.iter().enumerate() {
        assert_ne!(i, v);
        assert_eq!(wiring[v], i);
    }
}
