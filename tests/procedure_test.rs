//! End-to-end tests of the message procedures: transport encoding,
//! indicator derivation and message formatting composed over real
//! machines.

use rotorsim_rs::config;
use rotorsim_rs::error::SimulatorError;
use rotorsim_rs::machine::{MachineKind, RotorMachine};
use rotorsim_rs::procedure::MessageProcedureFactory;

fn machine(kind: MachineKind) -> RotorMachine {
    RotorMachine::from_state(&config::make_default_state(kind).unwrap()).unwrap()
}

#[test]
fn test_post1940_enigma_roundtrip() {
    let mut machine = machine(MachineKind::Services);
    let mut procedure = MessageProcedureFactory::post1940_enigma("nor abc tuv", 3).unwrap();

    let parts = procedure
        .encrypt(&mut machine, "diesisteintestfuerdasverfahren")
        .unwrap();
    assert_eq!(parts.len(), 1);
    assert!(parts[0].contains(" = "));

    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "diesisteintestfuerdasverfahren");
}

#[test]
fn test_post1940_m4_roundtrip() {
    let mut machine = machine(MachineKind::M4);
    let mut procedure = MessageProcedureFactory::post1940_enigma("nor", 4).unwrap();

    let parts = procedure.encrypt(&mut machine, "einlangertext").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "einlangertext");
}

#[test]
fn test_post1940_message_splitting() {
    let mut machine = machine(MachineKind::Services);
    let mut procedure = MessageProcedureFactory::post1940_enigma("nor", 3).unwrap();

    let plaintext = "a".repeat(300);
    let parts = procedure.encrypt(&mut machine, &plaintext).unwrap();
    assert_eq!(parts.len(), 2);

    let joined = format!("{}\n\n{}\n", parts[0], parts[1]);
    let plain = procedure.decrypt(&mut machine, &joined).unwrap();
    assert_eq!(plain, plaintext);
}

#[test]
fn test_pre1940_enigma_roundtrip() {
    let mut machine = machine(MachineKind::Services);
    let mut procedure = MessageProcedureFactory::pre1940_enigma("nor", "rtz", 3).unwrap();

    let parts = procedure.encrypt(&mut machine, "morgenfruehangriff").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "morgenfruehangriff");
}

#[test]
fn test_pre1940_detects_tampered_indicator() {
    let mut machine = machine(MachineKind::Services);
    let mut procedure = MessageProcedureFactory::pre1940_enigma("nor", "rtz", 3).unwrap();

    let parts = procedure.encrypt(&mut machine, "geheim").unwrap();

    // flip the second header group; the doubled message key check must fail
    let tampered = swap_second_header_group(&parts[0]);
    let result = procedure.decrypt(&mut machine, &tampered);
    assert!(matches!(result, Err(SimulatorError::IndicatorInvalid(_))));
}

/// Replaces the second indicator group of an Enigma header with AAA/BBB.
fn swap_second_header_group(part: &str) -> String {
    let mut lines: Vec<String> = part.lines().map(|l| l.to_string()).collect();
    let header = lines[0].clone();
    let fields: Vec<&str> = header.split(' ').collect();

    // header layout: ... = GRP1 GRP2 =
    let grp2 = fields[fields.len() - 2];
    let replacement = if grp2 == "AAA" { "BBB" } else { "AAA" };
    lines[0] = header.replace(grp2, replacement);

    lines.join("\n")
}

#[test]
fn test_generic_enigma_grundstellung() {
    let mut machine = machine(MachineKind::Services);
    let mut procedure = MessageProcedureFactory::generic_enigma("452TU", "rtz");

    let parts = procedure.encrypt(&mut machine, "besetzungdernormandie").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "besetzungdernormandie");
}

#[test]
fn test_generic_m4_grundstellung() {
    let mut machine = machine(MachineKind::M4);
    let mut procedure = MessageProcedureFactory::generic_m4("452TU", "vjna");

    let parts = procedure.encrypt(&mut machine, "konvoifahrtnachnorden").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "konvoifahrtnachnorden");
}

#[test]
fn test_generic_typex_roundtrip_with_figures() {
    let mut machine = machine(MachineKind::Typex);
    let mut procedure = MessageProcedureFactory::generic_typex("BRLTU", "aaaaa");

    let parts = procedure
        .encrypt(&mut machine, "supplies for 42 units")
        .unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "supplies for 42 units");
}

#[test]
fn test_generic_kl7_roundtrip() {
    let mut machine = machine(MachineKind::Kl7);
    let mut procedure = MessageProcedureFactory::generic_kl7("KLSYS", "faamaaaa");

    let parts = procedure
        .encrypt(&mut machine, "report 1234567890 end")
        .unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "report 1234567890 end");
}

#[test]
fn test_generic_nema_roundtrip() {
    let mut machine = machine(MachineKind::Nema);
    let mut procedure = MessageProcedureFactory::generic_nema("NEMAA", "mqqpzqsoev");

    let parts = procedure.encrypt(&mut machine, "verschlusssache").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "verschlusssache");
}

#[test]
fn test_generic_sg39_roundtrip() {
    let mut machine = machine(MachineKind::Sg39);
    let mut procedure = MessageProcedureFactory::generic_sg39("SG", "frqdaph");

    let parts = procedure.encrypt(&mut machine, "wetterberichtnordwest").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "wetterberichtnordwest");
}

#[test]
fn test_sigaba_basic_procedure() {
    let mut machine = machine(MachineKind::Sigaba);
    let mut procedure = MessageProcedureFactory::sigaba_basic("AMESA");

    let parts = procedure
        .encrypt(&mut machine, "dies ist ein toller test")
        .unwrap();
    assert!(parts[0].contains("AMESA"));

    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "dies ist ein toller test");
}

#[test]
fn test_sigaba_grundstellung_procedure() {
    let mut machine = machine(MachineKind::Sigaba);
    let mut procedure = MessageProcedureFactory::sigaba_grundstellung("AMESA", "abcde");

    let parts = procedure.encrypt(&mut machine, "attack at dawn").unwrap();
    let plain = procedure.decrypt(&mut machine, &parts[0]).unwrap();
    assert_eq!(plain, "attack at dawn");
}

#[test]
fn test_sigaba_inconsistent_frame_detected() {
    let mut machine = machine(MachineKind::Sigaba);
    let mut procedure = MessageProcedureFactory::sigaba_basic("AMESA");

    let parts = procedure.encrypt(&mut machine, "attack at dawn").unwrap();

    // damage the trailing external indicator group
    let tampered = format!("{}X", &parts[0][..parts[0].len() - 1]);
    let tampered = tampered.replacen("AMESA", "QQQQQ", 1);
    let result = procedure.decrypt(&mut machine, &tampered);
    assert!(result.is_err());
}
