//! The message procedure: a transport encoder, an indicator processor
//! and a formatter composed into the end-to-end rules for preparing,
//! encrypting and transmitting a message.

use log::{debug, info};

use crate::error::{Result, SimulatorError};
use crate::formatter::{
    EnigmaFormatter, Formatter, GenericFormatter, SigabaFormatter, MESSAGE_LENGTH,
};
use crate::indicator::{
    GrundstellungIndicatorProc, IndicatorProcessor, Post1940EnigmaIndicatorProc,
    Pre1940EnigmaIndicatorProc, Sg39IndicatorHelper, SigabaBasicIndicatorProcessor,
    SigabaGrundstellungIndicatorProcessor, SpecialCharIndicatorHelper, MESSAGE_KEY,
};
use crate::machine::RotorMachine;
use crate::transport::{
    ArmyEncoder, Kl7Encoder, SigabaEncoder, TransportEncoder, TypexEncoder,
};

/// Header and body of one received message part.
struct MsgPart {
    header: String,
    body: String,
}

/// Drives en- and decryptions with a rotor machine. Long messages are
/// split into parts of at most `msg_size` plaintext characters; each
/// part gets its own message key.
pub struct MessageProcedure {
    encoder: Box<dyn TransportEncoder>,
    indicator_proc: Box<dyn IndicatorProcessor>,
    formatter: Box<dyn Formatter>,
    msg_size: usize,
    step_before_proc: bool,
}

impl MessageProcedure {
    pub fn new(
        encoder: Box<dyn TransportEncoder>,
        indicator_proc: Box<dyn IndicatorProcessor>,
        formatter: Box<dyn Formatter>,
        msg_size: usize,
        step_before_proc: bool,
    ) -> Self {
        MessageProcedure {
            encoder,
            indicator_proc,
            formatter,
            msg_size,
            step_before_proc,
        }
    }

    pub fn set_msg_size(&mut self, msg_size: usize) {
        self.msg_size = msg_size;
    }

    /// Encrypts a plaintext; the result is one formatted message per
    /// part.
    pub fn encrypt(&mut self, machine: &mut RotorMachine, plaintext: &str) -> Result<Vec<String>> {
        self.indicator_proc.reset();
        self.formatter.reset();

        let raw = self.encoder.transform_plaintext_enc(plaintext)?;
        let raw_chars: Vec<char> = raw.chars().collect();

        let num_parts = raw_chars.len().div_ceil(self.msg_size).max(1);
        info!("encrypting message in {} part(s)", num_parts);

        machine.go_to_letter_state();

        let mut result = Vec::new();
        for (i, chunk) in raw_chars.chunks(self.msg_size.max(1)).enumerate() {
            let part: String = chunk.iter().collect();
            result.push(self.encrypt_part(machine, &part, i + 1, num_parts)?);
        }

        if result.is_empty() {
            result.push(self.encrypt_part(machine, "", 1, 1)?);
        }

        Ok(result)
    }

    fn encrypt_part(
        &mut self,
        machine: &mut RotorMachine,
        part_plaintext: &str,
        this_part: usize,
        num_parts: usize,
    ) -> Result<String> {
        let indicators = self
            .indicator_proc
            .create_indicators(machine, this_part, num_parts)?;

        let message_key = indicators.get(MESSAGE_KEY).ok_or_else(|| {
            SimulatorError::IndicatorInvalid("indicator processor produced no message key".to_string())
        })?;
        machine.set_positions(message_key)?;

        if self.step_before_proc {
            machine.step(1);
        }

        let ciphertext = machine.encrypt(part_plaintext)?;

        let body = self.formatter.format_body(&ciphertext, &indicators)?;
        let header = self
            .formatter
            .format_header(&body, &indicators, this_part, num_parts)?;

        Ok(format!("{}\n\n{}", header, body.text))
    }

    /// Splits a received transmission into parts: header and body are
    /// separated by blank lines, as are consecutive parts.
    fn parse_message_parts(&self, ciphertext: &str) -> Vec<MsgPart> {
        let mut parts = Vec::new();
        let mut look_for_header = true;
        let mut last_line_empty = true;
        let mut header = String::new();
        let mut body = String::new();

        for line in ciphertext.lines() {
            let line = line.trim();

            if !line.is_empty() {
                last_line_empty = false;
                if look_for_header {
                    header.push_str(line);
                } else {
                    body.push_str(line);
                    body.push('\n');
                }
                continue;
            }

            if !last_line_empty {
                if !look_for_header {
                    parts.push(MsgPart {
                        header: std::mem::take(&mut header),
                        body: std::mem::take(&mut body),
                    });
                }
                look_for_header = !look_for_header;
            }
            last_line_empty = true;
        }

        if !look_for_header {
            parts.push(MsgPart { header, body });
        }

        parts
    }

    /// Decrypts a full transmission, reassembling all parts.
    pub fn decrypt(&mut self, machine: &mut RotorMachine, ciphertext: &str) -> Result<String> {
        self.indicator_proc.reset();
        self.formatter.reset();

        let parts = self.parse_message_parts(ciphertext);

        if parts.is_empty() {
            return Err(SimulatorError::HeaderFormat(
                "transmission contains no message part".to_string(),
            ));
        }

        machine.go_to_letter_state();

        let mut plain = String::new();
        for part in &parts {
            plain.push_str(&self.decrypt_part(machine, part)?);
        }

        self.encoder.transform_plaintext_dec(&plain)
    }

    fn decrypt_part(&mut self, machine: &mut RotorMachine, part: &MsgPart) -> Result<String> {
        let parsed = self.formatter.parse_ciphertext_body(&part.body)?;
        let indicators = self
            .formatter
            .parse_ciphertext_header(parsed.indicators, &part.header)?;
        let indicators = self.indicator_proc.derive_message_key(machine, indicators)?;

        let message_key = indicators.get(MESSAGE_KEY).ok_or_else(|| {
            SimulatorError::IndicatorInvalid("no message key derived".to_string())
        })?;
        machine.set_positions(message_key)?;

        if self.step_before_proc {
            machine.step(1);
        }

        // strip the group padding using the plaintext length of the header
        let mut ciphertext = parsed.text;
        if let Some(length) = indicators.get(MESSAGE_LENGTH) {
            let length: usize = length.parse().map_err(|_| {
                SimulatorError::HeaderFormat("unparseable message length".to_string())
            })?;
            ciphertext = ciphertext.chars().take(length).collect();
        }

        debug!("decrypting part of {} characters", ciphertext.chars().count());
        machine.decrypt(&ciphertext)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Builds the message procedures of the supported machines and
/// historical rule sets. Procedures are values assembled from the three
/// collaborator interfaces, not subclasses.
pub struct MessageProcedureFactory;

impl MessageProcedureFactory {
    /// Splits a blank separated Kenngruppen list.
    fn parse_kenngruppen(system_indicator: &str) -> Vec<String> {
        system_indicator
            .split_whitespace()
            .map(|s| s.to_lowercase())
            .collect()
    }

    /// Post 1940 army/air force Enigma procedure.
    pub fn post1940_enigma(system_indicator: &str, num_rotors: usize) -> Result<MessageProcedure> {
        let indicator_proc =
            Post1940EnigmaIndicatorProc::new(Self::parse_kenngruppen(system_indicator), num_rotors)?;
        let mut formatter = EnigmaFormatter::new(num_rotors);
        formatter.set_limits(5, 10);

        Ok(MessageProcedure::new(
            Box::new(ArmyEncoder),
            Box::new(indicator_proc),
            Box::new(formatter),
            245,
            false,
        ))
    }

    /// Pre 1940 doubled-indicator Enigma procedure.
    pub fn pre1940_enigma(
        system_indicator: &str,
        grundstellung: &str,
        num_rotors: usize,
    ) -> Result<MessageProcedure> {
        let indicator_proc = Pre1940EnigmaIndicatorProc::new(
            Self::parse_kenngruppen(system_indicator),
            grundstellung,
            num_rotors,
        )?;
        let mut formatter = EnigmaFormatter::new(num_rotors);
        formatter.set_limits(5, 10);

        Ok(MessageProcedure::new(
            Box::new(ArmyEncoder),
            Box::new(indicator_proc),
            Box::new(formatter),
            245,
            false,
        ))
    }

    fn generic(
        system_indicator: &str,
        grundstellung: &str,
        indicator_size: usize,
        step_before: bool,
        encoder: Box<dyn TransportEncoder>,
        msg_size: usize,
    ) -> (MessageProcedure, GrundstellungIndicatorProc) {
        // assembled in two steps so callers can attach machine specific
        // hooks to the indicator processor before it is boxed
        let proc = GrundstellungIndicatorProc::new(grundstellung, indicator_size, step_before);
        let mut formatter = GenericFormatter::new(
            indicator_size,
            vec![crate::indicator::RAND_INDICATOR.to_string()],
        );
        formatter.set_system_indicator(system_indicator);
        formatter.set_limits(5, 10);

        (
            MessageProcedure::new(
                encoder,
                Box::new(NullIndicator),
                Box::new(formatter),
                msg_size,
                step_before,
            ),
            proc,
        )
    }

    fn with_indicator(
        mut pair: (MessageProcedure, GrundstellungIndicatorProc),
    ) -> MessageProcedure {
        pair.0.indicator_proc = Box::new(pair.1);
        pair.0
    }

    /// Grundstellung procedure for any machine with plain a-z input.
    pub fn generic_machine(
        system_indicator: &str,
        grundstellung: &str,
        indicator_size: usize,
    ) -> MessageProcedure {
        Self::with_indicator(Self::generic(
            system_indicator,
            grundstellung,
            indicator_size,
            false,
            Box::new(ArmyEncoder),
            500,
        ))
    }

    /// Grundstellung procedure for a three rotor Enigma.
    pub fn generic_enigma(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let mut procedure = Self::generic_machine(system_indicator, grundstellung, 3);
        procedure.set_msg_size(250);
        procedure
    }

    /// Grundstellung procedure for an M4 Enigma with four letter groups.
    pub fn generic_m4(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let (mut base, proc) = Self::generic(
            system_indicator,
            grundstellung,
            4,
            false,
            Box::new(ArmyEncoder),
            248,
        );
        base.formatter.set_limits(4, 8);
        base.indicator_proc = Box::new(proc);
        base
    }

    /// Grundstellung procedure for the Nema.
    pub fn generic_nema(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let mut procedure = Self::generic_machine(system_indicator, grundstellung, 10);
        procedure.set_msg_size(350);
        procedure
    }

    /// Grundstellung procedure for the Typex; x, z and v are reserved
    /// letters and may not appear in indicators.
    pub fn generic_typex(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let (mut base, mut proc) = Self::generic(
            system_indicator,
            grundstellung,
            5,
            false,
            Box::new(TypexEncoder::new()),
            500,
        );

        let verifier = SpecialCharIndicatorHelper::new("xzv");
        proc.set_verifier(Box::new(move |candidate| verifier.verify(candidate)));
        base.indicator_proc = Box::new(proc);
        base
    }

    /// Grundstellung procedure for the SG39: a ten letter indicator is
    /// boiled down to a seven letter rotor position by the skip scan.
    pub fn generic_sg39(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let (mut base, mut proc) = Self::generic(
            system_indicator,
            grundstellung,
            10,
            false,
            Box::new(ArmyEncoder),
            250,
        );

        proc.set_msg_key_tester(Box::new(|candidate| Sg39IndicatorHelper::test(candidate)));
        base.indicator_proc = Box::new(proc);
        base
    }

    /// Grundstellung procedure for the KL7: the machine steps once
    /// before any en- or decryption, and z/j may not appear in
    /// indicators.
    pub fn generic_kl7(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let (mut base, mut proc) = Self::generic(
            system_indicator,
            grundstellung,
            7,
            true,
            Box::new(Kl7Encoder::new()),
            750,
        );

        let verifier = SpecialCharIndicatorHelper::new("zj");
        proc.set_verifier(Box::new(move |candidate| verifier.verify(candidate)));
        base.indicator_proc = Box::new(proc);
        base
    }

    /// SIGABA procedure with the built-in setup stepping message key
    /// derivation.
    pub fn sigaba_basic(system_indicator: &str) -> MessageProcedure {
        let mut formatter = SigabaFormatter::new();
        formatter.set_external_indicator(system_indicator);
        formatter.set_limits(5, 10);

        MessageProcedure::new(
            Box::new(SigabaEncoder),
            Box::new(SigabaBasicIndicatorProcessor::new()),
            Box::new(formatter),
            1730,
            false,
        )
    }

    /// SIGABA procedure deriving the message key from a daily
    /// Grundstellung.
    pub fn sigaba_grundstellung(system_indicator: &str, grundstellung: &str) -> MessageProcedure {
        let mut formatter = SigabaFormatter::new();
        formatter.set_external_indicator(system_indicator);
        formatter.set_limits(5, 10);

        MessageProcedure::new(
            Box::new(SigabaEncoder),
            Box::new(SigabaGrundstellungIndicatorProcessor::new(grundstellung)),
            Box::new(formatter),
            1730,
            false,
        )
    }
}

/// Placeholder indicator processor used while a procedure is being
/// assembled; never reachable from a finished procedure.
struct NullIndicator;

impl IndicatorProcessor for NullIndicator {
    fn create_indicators(
        &mut self,
        _machine: &mut RotorMachine,
        _this_part: usize,
        _num_parts: usize,
    ) -> Result<crate::indicator::IndicatorMap> {
        Err(SimulatorError::UnsupportedProcedure(
            "procedure has no indicator processor".to_string(),
        ))
    }

    fn derive_message_key(
        &mut self,
        _machine: &mut RotorMachine,
        _parsed: crate::indicator::IndicatorMap,
    ) -> Result<crate::indicator::IndicatorMap> {
        Err(SimulatorError::UnsupportedProcedure(
            "procedure has no indicator processor".to_string(),
        ))
    }

    fn key_words(&self) -> Vec<String> {
        Vec::new()
    }

    fn reset(&mut self) {}
}
