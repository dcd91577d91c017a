//! Integration tests of the rotor machines: historical test messages,
//! stepping behaviour and encrypt/decrypt round trips for every machine
//! type.

use rstest::rstest;

use rotorsim_rs::config;
use rotorsim_rs::machine::{MachineKind, RotorMachine};

fn default_machine(kind: MachineKind) -> RotorMachine {
    let state = config::make_default_state(kind).expect("default state must build");
    RotorMachine::from_state(&state).expect("default state must load")
}

/// Plaintext that is legal input for every supported machine: no z
/// (SIGABA blank), no j (KL7 shift), no v/x (Typex shifts).
const COMMON_PLAIN: &str = "hallodiesisteintest";

// ---------------------------------------------------------------------------
// Historical test messages
// ---------------------------------------------------------------------------

#[test]
fn test_m4_schnellboot_message() {
    let mut machine = default_machine(MachineKind::M4);

    let decrypted = machine
        .decrypt(
            "nczwvusxpnyminhzxmqxsfwxwlkjahshnmcoccakuqpmkcsmhkseinjusblkiosxckubhmllxcsjusrrdvkohulxwccbgvliyxeoahxrhkkfvdrewez",
        )
        .unwrap();

    assert_eq!(
        decrypted,
        "vonvonjlooksjhffttteinseinsdreizwoyyqnnsneuninhaltxxbeiangriffunterwassergedruecktywabosxletztergegnerstandnulachtd"
    );
}

#[test]
fn test_m4_message_survives_state_roundtrip() {
    let machine = default_machine(MachineKind::M4);
    let rendered = machine.save().render();

    let mut restored = RotorMachine::from_state_text(&rendered).unwrap();
    let decrypted = restored.decrypt("nczwvusx").unwrap();

    assert_eq!(decrypted, "vonvonjl");
}

#[test]
fn test_tirpitz_rommel_message() {
    let mut machine = default_machine(MachineKind::Tirpitz);

    let decrypted = machine.decrypt("rhmbwnbzgmmnkperufvnyjfkyqg").unwrap();
    assert_eq!(decrypted, "anxrommelxspruchnummerxeins");

    // and again after a full state serialisation round trip
    let state = config::make_default_state(MachineKind::Tirpitz).unwrap();
    let mut restored = RotorMachine::from_state_text(&state.render()).unwrap();
    assert_eq!(
        restored.decrypt("rhmbwnbzgmmnkperufvnyjfkyqg").unwrap(),
        "anxrommelxspruchnummerxeins"
    );
}

#[test]
fn test_services_uhr_ukwd_message() {
    let mut config = std::collections::BTreeMap::new();
    config.insert("usesuhr".to_string(), "true".to_string());
    config.insert("plugs".to_string(), "27:adcnetflgijvkzpuqywx".to_string());

    let state = config::make_state(MachineKind::Services, &config, "rtz").unwrap();
    let mut machine = RotorMachine::from_state(&state).unwrap();

    let ciphertext = "ukpfhallqcdnbffcghudlqukrbpyiyrdlwyalykcvossffxsyjbhbghdxawukjadkelptyklgfxqahxmmfpioqnjsgaufoxzggomjfryhqpccdivyicgvyx";
    let plaintext = "dasoberkommandoderwehrmaqtgibtbekanntxaachenxaachenxistgerettetxdurqgebuendelteneinsatzderhilfskraeftekonntediebedrohun";

    assert_eq!(machine.decrypt(ciphertext).unwrap(), plaintext);

    // and again after a full state serialisation round trip
    let mut restored = RotorMachine::from_state_text(&state.render()).unwrap();
    assert_eq!(restored.decrypt(ciphertext).unwrap(), plaintext);
}

#[test]
fn test_csp889_setup_stepping_message() {
    let state = config::make_default_state(MachineKind::Sigaba).unwrap();

    let ciphertext = "hiscbulieudekwremsdicbpwarhujhhixjhvxgbxrzypzpbybzycheafdgnffobzvwuasynfuczcsgbzrxxnamortkgugtcddmbnqhzrc";
    let plaintext = "dies ist ein toller test fuer die sigaba punkt die amis haben damals glatt mit leerxeichen verschluesselt";

    let mut machine = RotorMachine::from_state(&state).unwrap();
    machine.sigaba_setup(1, 4).unwrap();
    machine.sigaba_setup(3, 2).unwrap();
    machine.sigaba_setup(5, 1).unwrap();
    assert_eq!(machine.decrypt(ciphertext).unwrap(), plaintext);

    // and again after a full state serialisation round trip
    let mut restored = RotorMachine::from_state_text(&state.render()).unwrap();
    restored.sigaba_setup(1, 4).unwrap();
    restored.sigaba_setup(3, 2).unwrap();
    restored.sigaba_setup(5, 1).unwrap();
    assert_eq!(restored.decrypt(ciphertext).unwrap(), plaintext);
}

#[test]
fn test_kl7_message() {
    let state = config::make_default_state(MachineKind::Kl7).unwrap();

    let ciphertext = "lpzocrfybrjmwhzrtsiygtxhuodgyyiuogpamxkfcjpplqkhss";
    let plaintext = "hallo dies ist wieder ein test vvv 1234567890 aaa";

    let mut machine = RotorMachine::from_state(&state).unwrap();
    machine.step(1);
    assert_eq!(machine.decrypt(ciphertext).unwrap(), plaintext);

    // and again after a full state serialisation round trip
    let mut restored = RotorMachine::from_state_text(&state.render()).unwrap();
    restored.step(1);
    assert_eq!(restored.decrypt(ciphertext).unwrap(), plaintext);
}

#[test]
fn test_sg39_all_a_message() {
    let state = config::make_default_state(MachineKind::Sg39).unwrap();

    let ciphertext = "obkdldrmiqlwiyggqohqlwchogmdskbeiqwrsrhensjkfuegeshbdnjhhkwixefpnmlvophbttzlfvtllmhgdsbrisfeetckcttjqbhzurxowizvtpdtuyqyfdkqjeryoopvqpijowmbvkizjipo";
    let plaintext = "a".repeat(150);

    let mut machine = RotorMachine::from_state(&state).unwrap();
    assert_eq!(machine.decrypt(ciphertext).unwrap(), plaintext);

    // and again after a full state serialisation round trip
    let mut restored = RotorMachine::from_state_text(&state.render()).unwrap();
    assert_eq!(restored.decrypt(ciphertext).unwrap(), plaintext);
}

#[test]
fn test_enigma_i_first_letters() {
    // Walzenlage I II III, UKW B, rings aaa, positions aaa, no plugs
    let mut config = std::collections::BTreeMap::new();
    config.insert("rotors".to_string(), "1123".to_string());
    config.insert("rings".to_string(), "aaa".to_string());
    config.insert("plugs".to_string(), "".to_string());

    let state = config::make_state(MachineKind::Services, &config, "aaa").unwrap();
    let mut machine = RotorMachine::from_state(&state).unwrap();

    assert_eq!(machine.encrypt("aaaaa").unwrap(), "bdzgo");
}

// ---------------------------------------------------------------------------
// Stepping behaviour
// ---------------------------------------------------------------------------

#[test]
fn test_enigma_double_stepping() {
    let mut config = std::collections::BTreeMap::new();
    config.insert("rotors".to_string(), "1123".to_string());
    config.insert("rings".to_string(), "aaa".to_string());
    config.insert("plugs".to_string(), "".to_string());

    let state = config::make_state(MachineKind::Services, &config, "adu").unwrap();
    let mut machine = RotorMachine::from_state(&state).unwrap();

    // the middle rotor steps on the tick after reaching its own notch,
    // dragging the slow rotor along
    assert_eq!(machine.step(4), vec!["adv", "aew", "bfx", "bfy"]);
}

#[test]
fn test_enigma_reflector_property() {
    let mut machine = default_machine(MachineKind::M4);
    let plain: String = "abcdefghijklmnopqrstuvwxyz".repeat(4);
    let cipher = machine.encrypt(&plain).unwrap();

    for (p, c) in plain.chars().zip(cipher.chars()) {
        assert_ne!(p, c, "no letter may encrypt to itself on an Enigma");
    }
}

#[test]
fn test_sigaba_cipher_rotor_always_steps() {
    let mut machine = default_machine(MachineKind::Sigaba);

    for _ in 0..100 {
        let before: String = machine.get_positions().chars().skip(10).collect();
        machine.encrypt("a").unwrap();
        let after: String = machine.get_positions().chars().skip(10).collect();

        assert_ne!(before, after, "at least one cipher rotor must move");
    }
}

#[test]
fn test_sigaba_setup_stepping_moves_chosen_rotor() {
    let mut machine = default_machine(MachineKind::Sigaba);

    let before = machine.get_positions();
    machine.sigaba_setup(1, 4).unwrap();
    machine.sigaba_setup(3, 2).unwrap();
    machine.sigaba_setup(5, 1).unwrap();
    let after = machine.get_positions();

    // the index bank never moves
    assert_eq!(before[..5], after[..5]);
    // the selected control rotors did
    assert_ne!(before[5..10], after[5..10]);
}

#[test]
fn test_sigaba_setup_rejected_on_other_machines() {
    let mut machine = default_machine(MachineKind::M4);
    assert!(machine.sigaba_setup(1, 1).is_err());
}

#[test]
fn test_sg39_pin_wheel_periods() {
    let mut machine = default_machine(MachineKind::Sg39);

    // wheels two and three receive no feedback from the default rotor
    // rings, so they cycle with their native periods of 23 and 25
    let start = machine.get_positions();
    let wheel3 = start.chars().nth(4).unwrap();
    let wheel2 = start.chars().nth(5).unwrap();

    machine.step(23 * 25);
    let end = machine.get_positions();

    assert_eq!(end.chars().nth(4).unwrap(), wheel3);
    assert_eq!(end.chars().nth(5).unwrap(), wheel2);
}

#[test]
fn test_kl7_positions_settable_with_seven_letters() {
    let mut machine = default_machine(MachineKind::Kl7);

    machine.set_positions("bcdefgh").unwrap();
    let positions = machine.get_positions();

    // the stationary fourth rotor keeps its basic alignment
    assert_eq!(&positions[..3], "bcd");
    assert_eq!(&positions[4..], "efgh");
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

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
fn test_encrypt_decrypt_roundtrip(#[case] kind: MachineKind) {
    let state = config::make_default_state(kind).unwrap();

    let mut machine = RotorMachine::from_state(&state).unwrap();
    let cipher = machine.encrypt(COMMON_PLAIN).unwrap();

    machine.set_state(&state).unwrap();
    let plain = machine.decrypt(&cipher).unwrap();

    assert_eq!(plain, COMMON_PLAIN);
}

#[rstest]
#[case::services(MachineKind::Services)]
#[case::m4(MachineKind::M4)]
#[case::tirpitz(MachineKind::Tirpitz)]
#[case::typex(MachineKind::Typex)]
#[case::sigaba(MachineKind::Sigaba)]
#[case::kl7(MachineKind::Kl7)]
#[case::nema(MachineKind::Nema)]
#[case::sg39(MachineKind::Sg39)]
fn test_state_roundtrip_preserves_behaviour(#[case] kind: MachineKind) {
    let state = config::make_default_state(kind).unwrap();

    let mut original = RotorMachine::from_state(&state).unwrap();
    let mut restored = RotorMachine::from_state_text(&original.save().render()).unwrap();

    assert_eq!(
        original.encrypt(COMMON_PLAIN).unwrap(),
        restored.encrypt(COMMON_PLAIN).unwrap()
    );
    assert_eq!(original.get_positions(), restored.get_positions());
}

#[test]
fn test_uhr_machine_is_not_involutory_but_reciprocal() {
    let mut config = std::collections::BTreeMap::new();
    config.insert("usesuhr".to_string(), "true".to_string());
    config.insert("plugs".to_string(), "27:adcnetflgijvkzpuqywx".to_string());

    let state = config::make_state(MachineKind::Services, &config, "rtz").unwrap();

    let mut machine = RotorMachine::from_state(&state).unwrap();
    let cipher = machine.encrypt(COMMON_PLAIN).unwrap();

    machine.set_state(&state).unwrap();
    assert_eq!(machine.decrypt(&cipher).unwrap(), COMMON_PLAIN);
}

#[test]
fn test_typex_shifted_characters_roundtrip() {
    let state = config::make_default_state(MachineKind::Typex).unwrap();
    let mut machine = RotorMachine::from_state(&state).unwrap();

    // encoder output: figures are bracketed by shift symbols
    let cipher = machine.encrypt("abc >123< de").unwrap();
    assert!(cipher.chars().all(|c| c.is_ascii_lowercase()));

    machine.set_state(&state).unwrap();
    machine.go_to_letter_state();
    let plain = machine.decrypt(&cipher).unwrap();

    // the shift symbols are consumed silently on decryption
    assert_eq!(plain, "abc 123 de");
}

#[test]
fn test_kl7_presteps_before_both_directions() {
    let state = config::make_default_state(MachineKind::Kl7).unwrap();

    let mut machine = RotorMachine::from_state(&state).unwrap();
    machine.step(1);
    let cipher = machine.encrypt(COMMON_PLAIN).unwrap();

    machine.set_state(&state).unwrap();
    machine.step(1);
    let plain = machine.decrypt(&cipher).unwrap();

    assert_eq!(plain, COMMON_PLAIN);
}

#[test]
fn test_sigaba_space_handling() {
    let state = config::make_default_state(MachineKind::Sigaba).unwrap();
    let mut machine = RotorMachine::from_state(&state).unwrap();

    let cipher = machine.encrypt("dies ist ein test").unwrap();
    assert!(cipher.chars().all(|c| c.is_ascii_lowercase()));

    machine.set_state(&state).unwrap();
    assert_eq!(machine.decrypt(&cipher).unwrap(), "dies ist ein test");

    // z is reserved for the blank and rejected on encryption
    assert!(machine.encrypt("z").is_err());
}

#[test]
fn test_unknown_symbol_does_not_step_the_machine() {
    let mut machine = default_machine(MachineKind::M4);

    let before = machine.get_positions();
    assert!(machine.encrypt_char('9').is_err());
    assert_eq!(machine.get_positions(), before);
}

// ---------------------------------------------------------------------------
// Randomisation
// ---------------------------------------------------------------------------

#[rstest]
#[case::services(MachineKind::Services, "")]
#[case::services_basic(MachineKind::Services, "basic")]
#[case::services_ukwd(MachineKind::Services, "ukwdonly")]
#[case::services_fancy(MachineKind::Services, "fancy")]
#[case::m3(MachineKind::M3, "")]
#[case::m4(MachineKind::M4, "")]
#[case::railway(MachineKind::Railway, "")]
#[case::tirpitz(MachineKind::Tirpitz, "")]
#[case::abwehr(MachineKind::Abwehr, "")]
#[case::kd(MachineKind::KD, "ukwdonly")]
#[case::typex(MachineKind::Typex, "")]
#[case::sigaba_889(MachineKind::Sigaba, "csp889")]
#[case::sigaba_2900(MachineKind::Sigaba, "csp2900")]
#[case::kl7(MachineKind::Kl7, "")]
#[case::nema_war(MachineKind::Nema, "war")]
#[case::nema_training(MachineKind::Nema, "training")]
#[case::sg39_one(MachineKind::Sg39, "one")]
#[case::sg39_two(MachineKind::Sg39, "two")]
#[case::sg39_three(MachineKind::Sg39, "three")]
#[case::sg39_special(MachineKind::Sg39, "special")]
#[case::sg39_enigmam4(MachineKind::Sg39, "enigmam4")]
fn test_randomized_states_work(#[case] kind: MachineKind, #[case] token: &str) {
    let mut machine = default_machine(kind);
    machine.randomize_state(token).unwrap();

    let state = machine.save();
    let cipher = machine.encrypt(COMMON_PLAIN).unwrap();

    machine.set_state(&state).unwrap();
    assert_eq!(machine.decrypt(&cipher).unwrap(), COMMON_PLAIN);
}

#[test]
fn test_randomizer_params_reported() {
    let machine = default_machine(MachineKind::Sg39);
    assert_eq!(
        machine.get_randomizer_params(),
        vec!["one", "two", "three", "special", "enigmam4"]
    );

    let m4 = default_machine(MachineKind::M4);
    assert!(m4.get_randomizer_params().is_empty());
}

#[test]
fn test_rotor_set_names() {
    assert_eq!(
        default_machine(MachineKind::Typex).get_rotor_set_names(),
        vec!["defaultset", "Y269"]
    );
    assert_eq!(
        default_machine(MachineKind::M4).get_rotor_set_names(),
        vec!["defaultset"]
    );
}

#[test]
fn test_get_config_reports_defaults() {
    let machine = default_machine(MachineKind::M4);
    let cfg = machine.get_config().unwrap();

    assert_eq!(cfg.get("rotors").unwrap(), "11241");
    assert_eq!(cfg.get("rings").unwrap(), "aaav");
    assert_eq!(cfg.get("plugs").unwrap(), "atbldfgjhmnwopqyrzvx");
}

#[test]
fn test_typex_y269_set() {
    let mut config = std::collections::BTreeMap::new();
    config.insert("rotorset".to_string(), "Y269".to_string());

    let state = config::make_state(MachineKind::Typex, &config, "aaaaa").unwrap();
    let mut machine = RotorMachine::from_state(&state).unwrap();
    assert_eq!(machine.rotor_set_name(), "Y269");

    let cipher = machine.encrypt(COMMON_PLAIN).unwrap();
    machine.set_state(&state).unwrap();
    assert_eq!(machine.decrypt(&cipher).unwrap(), COMMON_PLAIN);
}
