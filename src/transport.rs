//! Transport encoders: transform the original plaintext into a string
//! the rotor machine can process, and back.

use log::debug;

use crate::error::{Result, SimulatorError};
use crate::randomize::RotorRandom;

/// A transport encoder prepares plaintext before encryption and reverses
/// the preparation after decryption.
pub trait TransportEncoder {
    /// Transforms a plaintext into its encoded form before encryption.
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String>;

    /// Transforms decrypted machine output back into readable plaintext.
    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Basic and army encoders
// ---------------------------------------------------------------------------

/// Restricts the input to the lower case letter alphabet.
pub struct BasicEncoder;

impl TransportEncoder for BasicEncoder {
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase())
            .collect())
    }

    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }
}

/// The encoder used by the german army: punctuation and umlauts are
/// rewritten into letter groups before encryption.
pub struct ArmyEncoder;

impl TransportEncoder for ArmyEncoder {
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String> {
        let text = plaintext
            .to_lowercase()
            .replace('.', "x")
            .replace(',', "zz")
            .replace("ch", "q")
            .replace('?', "fragez")
            .replace('ä', "ae")
            .replace('ö', "oe")
            .replace('ü', "ue")
            .replace('ß', "ss");

        Ok(text.chars().filter(|c| c.is_ascii_lowercase()).collect())
    }

    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String> {
        // the qu digraph has to survive the q -> ch replacement
        let text = plaintext
            .to_lowercase()
            .replace("zz", ", ")
            .replace("qu", "#")
            .replace('q', "ch")
            .replace('#', "qu")
            .replace("fragez", "?")
            .replace('x', "x ");

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// SIGABA
// ---------------------------------------------------------------------------

/// SIGABA transport encoder: z stands in for the blank, a plaintext z is
/// written as x.
pub struct SigabaEncoder;

impl TransportEncoder for SigabaEncoder {
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String> {
        let text = plaintext
            .to_lowercase()
            .replace('.', "x")
            .replace(',', "x")
            .replace('z', "x")
            .replace('?', " ques");

        Ok(text
            .chars()
            .filter(|&c| c.is_ascii_lowercase() && c != 'z' || c == ' ')
            .collect())
    }

    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_lowercase().replace(" ques", "?"))
    }
}

// ---------------------------------------------------------------------------
// Shifting machines
// ---------------------------------------------------------------------------

/// Encoder for machines with a letter and a figure alphabet: a character
/// that exists only in the figure alphabet is written as `>c<`, flipping
/// the machine into figure mode for that one character.
pub struct ShiftingEncoder {
    letter_alpha: &'static str,
    figure_alpha: &'static str,
}

impl ShiftingEncoder {
    pub fn new(letter_alpha: &'static str, figure_alpha: &'static str) -> Self {
        ShiftingEncoder {
            letter_alpha,
            figure_alpha,
        }
    }

    fn transform_special_characters(&self, plaintext: &str) -> String {
        plaintext
            .to_lowercase()
            .chars()
            .filter(|&c| c != '<' && c != '>')
            .collect::<String>()
            .replace('ä', "ae")
            .replace('ö', "oe")
            .replace('ü', "ue")
            .replace('ß', "ss")
    }

    fn transform_shifted_characters(&self, plaintext: &str) -> String {
        let mut result = String::new();

        for c in plaintext.chars() {
            if self.letter_alpha.contains(c) {
                result.push(c);
            } else if self.figure_alpha.contains(c) {
                result.push('>');
                result.push(c);
                result.push('<');
            }
        }

        result
    }

    fn encode(&self, plaintext: &str, fold: impl Fn(String) -> String) -> String {
        let text = fold(self.transform_special_characters(plaintext));
        let text: String = text
            .chars()
            .filter(|&c| self.letter_alpha.contains(c) || self.figure_alpha.contains(c))
            .collect();

        self.transform_shifted_characters(&text)
    }
}

/// Typex encoder: the Typex processes a sizeable set of special
/// characters through its figure shift.
pub struct TypexEncoder(ShiftingEncoder);

impl TypexEncoder {
    pub fn new() -> Self {
        TypexEncoder(ShiftingEncoder::new(
            crate::machine::TYPEX_LETTERS,
            crate::machine::TYPEX_FIGURES,
        ))
    }
}

impl Default for TypexEncoder {
    fn default() -> Self {
        TypexEncoder::new()
    }
}

impl TransportEncoder for TypexEncoder {
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String> {
        Ok(self.0.encode(plaintext, |text| text))
    }

    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }
}

/// KL7 encoder: j and v carry the shift function, so j is typed as i and
/// z as x.
pub struct Kl7Encoder(ShiftingEncoder);

impl Kl7Encoder {
    pub fn new() -> Self {
        Kl7Encoder(ShiftingEncoder::new(
            crate::machine::KL7_LETTERS,
            crate::machine::KL7_FIGURES,
        ))
    }
}

impl Default for Kl7Encoder {
    fn default() -> Self {
        Kl7Encoder::new()
    }
}

impl TransportEncoder for Kl7Encoder {
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String> {
        Ok(self
            .0
            .encode(plaintext, |text| text.replace('j', "i").replace('z', "x")))
    }

    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }
}

// ---------------------------------------------------------------------------
// Modern byte encoder
// ---------------------------------------------------------------------------

/// Characters that are transmitted as themselves.
const DIRECT_CHARS: &str = "etaoinsrhld";
/// Characters that announce an escaped byte.
const ESCAPE_CHARS: &str = "bcfgkmpquwy";

/// The Vigenere cipher over an arbitrary alphabet, used to armour the
/// output of the modern encoder.
pub struct Vigenere {
    alphabet: Vec<char>,
}

impl Vigenere {
    pub fn new(alphabet: &str) -> Self {
        Vigenere {
            alphabet: alphabet.chars().collect(),
        }
    }

    fn value(&self, c: char) -> Result<usize> {
        self.alphabet
            .iter()
            .position(|&a| a == c)
            .ok_or(SimulatorError::AlphabetMismatch(c))
    }

    fn process(
        &self,
        text: &str,
        password: &str,
        proc: impl Fn(usize, usize, usize) -> usize,
    ) -> Result<String> {
        let n = self.alphabet.len();
        let key: Vec<usize> = password
            .chars()
            .map(|c| self.value(c))
            .collect::<Result<_>>()?;

        let mut out = String::new();
        for (i, c) in text.chars().enumerate() {
            let v = self.value(c)?;
            out.push(self.alphabet[proc(v, key[i % key.len()], n)]);
        }

        Ok(out)
    }

    pub fn encrypt(&self, plaintext: &str, password: &str) -> Result<String> {
        self.process(plaintext, password, |v, k, n| (v + k) % n)
    }

    pub fn decrypt(&self, ciphertext: &str, password: &str) -> Result<String> {
        self.process(ciphertext, password, |v, k, n| (v + n - k) % n)
    }
}

/// A transport encoder that accepts arbitrary text: each byte
/// of the UTF-8 encoding becomes either a single frequent letter or an
/// escape letter followed by a base-22 digit. The encoded stream can be
/// armoured with a Vigenere key that travels at the head of the message,
/// hiding the skewed letter frequencies of the raw encoding.
pub struct ModernEncoder {
    pw_length: usize,
    use_vigenere: bool,
    all_characters: String,
}

impl ModernEncoder {
    pub fn new(pw_length: usize, use_vigenere: bool) -> Self {
        ModernEncoder {
            pw_length,
            use_vigenere,
            all_characters: format!("{}{}", DIRECT_CHARS, ESCAPE_CHARS),
        }
    }

    fn encode_bytes(&self, text: &str) -> Result<String> {
        let escape: Vec<char> = ESCAPE_CHARS.chars().collect();
        let all: Vec<char> = self.all_characters.chars().collect();
        let mut out = String::new();

        for c in text.chars() {
            if DIRECT_CHARS.contains(c) {
                out.push(c);
                continue;
            }

            let mut buf = [0u8; 4];
            for &byte in c.encode_utf8(&mut buf).as_bytes() {
                let group = (byte / 22) as usize;
                if group >= escape.len() {
                    return Err(SimulatorError::TransportError(format!(
                        "byte value {} outside the encodable range",
                        byte
                    )));
                }
                out.push(escape[group]);
                out.push(all[(byte % 22) as usize]);
            }
        }

        Ok(out)
    }

    fn decode_bytes(&self, text: &str) -> Result<String> {
        let mut chars = text.chars();
        let mut out = Vec::new();

        while let Some(c) = chars.next() {
            if DIRECT_CHARS.contains(c) {
                out.push(c as u8);
                continue;
            }

            let group = ESCAPE_CHARS
                .chars()
                .position(|e| e == c)
                .ok_or_else(|| {
                    SimulatorError::TransportError(format!(
                        "structure of encoded text invalid at '{}'",
                        c
                    ))
                })?;

            let low = chars.next().ok_or_else(|| {
                SimulatorError::TransportError("premature end of encoded text".to_string())
            })?;
            let low = self
                .all_characters
                .chars()
                .position(|a| a == low)
                .ok_or_else(|| {
                    SimulatorError::TransportError(format!(
                        "structure of encoded text invalid at '{}'",
                        low
                    ))
                })?;

            out.push((group * 22 + low) as u8);
        }

        String::from_utf8(out)
            .map_err(|_| SimulatorError::TransportError("encoded text is not valid UTF-8".to_string()))
    }
}

impl TransportEncoder for ModernEncoder {
    fn transform_plaintext_enc(&self, plaintext: &str) -> Result<String> {
        let encoded = self.encode_bytes(plaintext)?;

        if !self.use_vigenere {
            return Ok(encoded);
        }

        let password = RotorRandom::new(&self.all_characters).get_rand_string(self.pw_length);
        let vigenere = Vigenere::new(&self.all_characters);
        debug!("armouring encoded message with a {} letter key", self.pw_length);

        Ok(format!("{}{}", password, vigenere.encrypt(&encoded, &password)?))
    }

    fn transform_plaintext_dec(&self, plaintext: &str) -> Result<String> {
        if plaintext.chars().any(|c| !self.all_characters.contains(c)) {
            return Err(SimulatorError::TransportError(
                "some input characters are not in the encoder alphabet".to_string(),
            ));
        }

        let encoded = if self.use_vigenere {
            if plaintext.chars().count() < self.pw_length {
                return Err(SimulatorError::TransportError(
                    "input shorter than the key".to_string(),
                ));
            }

            let password: String = plaintext.chars().take(self.pw_length).collect();
            let body: String = plaintext.chars().skip(self.pw_length).collect();
            Vigenere::new(&self.all_characters).decrypt(&body, &password)?
        } else {
            plaintext.to_string()
        };

        self.decode_bytes(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_encoder_filters() {
        let encoder = BasicEncoder;
        assert_eq!(
            encoder.transform_plaintext_enc("Ab C1 d!").unwrap(),
            "abcd"
        );
        assert_eq!(encoder.transform_plaintext_dec("abcd").unwrap(), "abcd");
    }

    #[test]
    fn test_army_encoder_roundtrip_ordering() {
        let encoder = ArmyEncoder;
        let encoded = encoder.transform_plaintext_enc("Quelle bei Charkow.").unwrap();
        // ch collapses to q, qu survives as qu
        assert_eq!(encoded, "quellebeiqarkowx");

        let decoded = encoder.transform_plaintext_dec(&encoded).unwrap();
        assert_eq!(decoded, "quellebeicharkowx ");
    }

    #[test]
    fn test_army_umlauts() {
        let encoder = ArmyEncoder;
        assert_eq!(
            encoder.transform_plaintext_enc("Größe?").unwrap(),
            "groessefragez"
        );
    }

    #[test]
    fn test_sigaba_encoder() {
        let encoder = SigabaEncoder;
        assert_eq!(
            encoder.transform_plaintext_enc("Zanzibar, ok?").unwrap(),
            "xanxibarx ok ques"
        );
        assert_eq!(
            encoder.transform_plaintext_dec("ok ques").unwrap(),
            "ok?"
        );
    }

    #[test]
    fn test_kl7_encoder_folds() {
        let encoder = Kl7Encoder::new();
        let encoded = encoder.transform_plaintext_enc("jazz 7").unwrap();
        assert_eq!(encoded, "iaxx >7<");
    }

    #[test]
    fn test_typex_encoder_shifts_figures() {
        let encoder = TypexEncoder::new();
        let encoded = encoder.transform_plaintext_enc("ab 3").unwrap();
        assert_eq!(encoded, "ab >3<");
    }

    #[test]
    fn test_vigenere_roundtrip() {
        let vigenere = Vigenere::new("etaoinsrhldbcfgkmpquwy");
        let cipher = vigenere.encrypt("attack", "lead").unwrap();
        assert_eq!(vigenere.decrypt(&cipher, "lead").unwrap(), "attack");
    }

    #[test]
    fn test_modern_encoder_roundtrip() {
        let encoder = ModernEncoder::new(9, true);
        let text = "Angriff um 06:00, Planquadrat AC 4721 — über Funk!";
        let encoded = encoder.transform_plaintext_enc(text).unwrap();
        assert!(encoded.chars().all(|c| "etaoinsrhldbcfgkmpquwy".contains(c)));
        assert_eq!(encoder.transform_plaintext_dec(&encoded).unwrap(), text);
    }

    #[test]
    fn test_modern_encoder_without_vigenere() {
        let encoder = ModernEncoder::new(9, false);
        let encoded = encoder.transform_plaintext_enc("test").unwrap();
        assert_eq!(encoded, "test");
        assert_eq!(encoder.transform_plaintext_dec("test").unwrap(), "test");
    }
}
