//! Formatters: build and parse the transmitted form of a message part,
//! i.e. the header line and the grouped ciphertext body with embedded
//! indicator groups.

use chrono::{Datelike, Local, Timelike, Utc};

use crate::error::{Result, SimulatorError};
use crate::indicator::{
    IndicatorMap, EXTERNAL_INDICATOR, HEADER_GRP_1, HEADER_GRP_2, INTERNAL_INDICATOR, KENNGRUPPE,
};
use crate::utils::group_text;

/// Key under which a parsed SIGABA header reports the ciphertext length.
pub const MESSAGE_LENGTH: &str = "message_length";

/// A formatted message body together with its character and group
/// counts.
pub struct BodyStruct {
    pub text: String,
    pub num_chars: usize,
    pub num_groups: usize,
}

/// A parsed message body: the raw ciphertext and the indicator groups
/// that were embedded in the body.
pub struct ParsedBody {
    pub text: String,
    pub indicators: IndicatorMap,
}

/// A formatter knows where indicator groups live in a transmitted
/// message part; it does not know what they mean.
pub trait Formatter {
    /// Groups the ciphertext and embeds body-level indicator groups.
    fn format_body(&self, ciphertext: &str, indicators: &IndicatorMap) -> Result<BodyStruct>;

    /// Splits a received body into ciphertext and body-level indicators.
    fn parse_ciphertext_body(&self, body: &str) -> Result<ParsedBody>;

    /// Builds the header line of a message part.
    fn format_header(
        &self,
        body: &BodyStruct,
        indicators: &IndicatorMap,
        this_part: usize,
        num_parts: usize,
    ) -> Result<String>;

    /// Extracts the header-level indicator groups of a message part.
    fn parse_ciphertext_header(&self, indicators: IndicatorMap, header: &str)
        -> Result<IndicatorMap>;

    /// Changes group size and groups per line.
    fn set_limits(&mut self, group_size: usize, groups_per_line: usize);

    /// Resets per message state; idempotent.
    fn reset(&mut self) {}
}

fn count_groups(len: usize, group_size: usize) -> usize {
    len.div_ceil(group_size)
}

fn all_uppercase_letters(group: &str) -> bool {
    !group.is_empty() && group.chars().all(|c| c.is_ascii_uppercase())
}

// ---------------------------------------------------------------------------
// Enigma formatter
// ---------------------------------------------------------------------------

/// Formats Enigma messages according to the army rules:
///
/// ```text
/// 1932 = 1tl = 1tl = 99 = OBQ HFQ =
///
/// IYDSK RVMGJ NGENJ CZROS MWEPQ ...
/// ```
///
/// The padded Kenngruppe travels as the first group of the body.
pub struct EnigmaFormatter {
    header_group_size: usize,
    group_size: usize,
    groups_per_line: usize,
}

impl EnigmaFormatter {
    pub fn new(header_group_size: usize) -> Self {
        EnigmaFormatter {
            header_group_size,
            group_size: 5,
            groups_per_line: 5,
        }
    }
}

impl Formatter for EnigmaFormatter {
    fn format_body(&self, ciphertext: &str, indicators: &IndicatorMap) -> Result<BodyStruct> {
        let kenngruppe = indicators.get(KENNGRUPPE).ok_or_else(|| {
            SimulatorError::IndicatorInvalid("missing kenngruppe".to_string())
        })?;

        let full = format!("{}{}", kenngruppe, ciphertext);
        let num_chars = full.chars().count();

        Ok(BodyStruct {
            text: group_text(&full, true, self.group_size, self.groups_per_line),
            num_chars,
            num_groups: count_groups(num_chars, self.group_size),
        })
    }

    fn parse_ciphertext_body(&self, body: &str) -> Result<ParsedBody> {
        let stripped: String = body.chars().filter(|c| !c.is_whitespace()).collect();

        if stripped.chars().count() < 5 {
            return Err(SimulatorError::HeaderFormat(
                "ciphertext has to contain at least one group".to_string(),
            ));
        }

        let lowered: Vec<char> = stripped.to_lowercase().chars().collect();
        let mut indicators = IndicatorMap::new();
        indicators.insert(KENNGRUPPE.to_string(), lowered[..5].iter().collect());

        Ok(ParsedBody {
            text: lowered[5..].iter().collect(),
            indicators,
        })
    }

    fn format_header(
        &self,
        body: &BodyStruct,
        indicators: &IndicatorMap,
        this_part: usize,
        num_parts: usize,
    ) -> Result<String> {
        let grp1 = indicators.get(HEADER_GRP_1).ok_or_else(|| {
            SimulatorError::IndicatorInvalid("missing first header group".to_string())
        })?;
        let grp2 = indicators.get(HEADER_GRP_2).ok_or_else(|| {
            SimulatorError::IndicatorInvalid("missing second header group".to_string())
        })?;

        let teile = if num_parts <= 1 { "tl" } else { "tle" };
        let now = Local::now();

        Ok(format!(
            "{:02}{:02} = {}{} = {}tl = {} = {} {} =",
            now.hour(),
            now.minute(),
            num_parts,
            teile,
            this_part,
            body.num_chars,
            grp1.to_uppercase(),
            grp2.to_uppercase()
        ))
    }

    fn parse_ciphertext_header(
        &self,
        mut indicators: IndicatorMap,
        header: &str,
    ) -> Result<IndicatorMap> {
        let parts: Vec<&str> = header.trim().split(" = ").collect();

        if parts.len() != 5 {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        let time_ok = parts[0].len() == 4 && parts[0].chars().all(|c| c.is_ascii_digit());
        let total_ok = parts[1].ends_with("tl") || parts[1].ends_with("tle");
        let part_ok = parts[2].ends_with("tl");
        let len_ok = parts[3].chars().all(|c| c.is_ascii_digit());

        if !(time_ok && total_ok && part_ok && len_ok) {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        let groups_raw = parts[4]
            .strip_suffix('=')
            .ok_or_else(|| SimulatorError::HeaderFormat(header.to_string()))?;
        let groups: Vec<&str> = groups_raw.split_whitespace().collect();

        if groups.len() != 2
            || groups
                .iter()
                .any(|g| g.chars().count() != self.header_group_size || !all_uppercase_letters(g))
        {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        indicators.insert(HEADER_GRP_1.to_string(), groups[0].to_lowercase());
        indicators.insert(HEADER_GRP_2.to_string(), groups[1].to_lowercase());

        Ok(indicators)
    }

    fn set_limits(&mut self, group_size: usize, groups_per_line: usize) {
        self.group_size = group_size;
        self.groups_per_line = groups_per_line;
    }
}

// ---------------------------------------------------------------------------
// Generic formatter
// ---------------------------------------------------------------------------

/// Formats messages of any rotor machine:
///
/// ```text
/// AMESA = 1/1 = 19 = XTEI =
///
/// ZCBOA ZKQIP VGXPQ ...
/// ```
pub struct GenericFormatter {
    system_indicator: String,
    header_group_size: usize,
    key_words: Vec<String>,
    group_size: usize,
    groups_per_line: usize,
}

impl GenericFormatter {
    pub fn new(header_group_size: usize, key_words: Vec<String>) -> Self {
        GenericFormatter {
            system_indicator: "A0000".to_string(),
            header_group_size,
            key_words,
            group_size: 5,
            groups_per_line: 5,
        }
    }

    pub fn set_system_indicator(&mut self, system_indicator: &str) {
        self.system_indicator = system_indicator.to_string();
    }
}

impl Formatter for GenericFormatter {
    fn format_body(&self, ciphertext: &str, _indicators: &IndicatorMap) -> Result<BodyStruct> {
        let num_chars = ciphertext.chars().count();

        Ok(BodyStruct {
            text: group_text(ciphertext, true, self.group_size, self.groups_per_line),
            num_chars,
            num_groups: count_groups(num_chars, self.group_size),
        })
    }

    fn parse_ciphertext_body(&self, body: &str) -> Result<ParsedBody> {
        Ok(ParsedBody {
            text: body
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase(),
            indicators: IndicatorMap::new(),
        })
    }

    fn format_header(
        &self,
        body: &BodyStruct,
        indicators: &IndicatorMap,
        this_part: usize,
        num_parts: usize,
    ) -> Result<String> {
        let mut groups = Vec::new();
        for word in &self.key_words {
            let value = indicators.get(word).ok_or_else(|| {
                SimulatorError::IndicatorInvalid(format!("missing indicator group '{}'", word))
            })?;
            groups.push(value.to_uppercase());
        }

        Ok(format!(
            "{} = {}/{} = {} = {} =",
            self.system_indicator,
            this_part,
            num_parts,
            body.num_groups,
            groups.join(" ")
        ))
    }

    fn parse_ciphertext_header(
        &self,
        mut indicators: IndicatorMap,
        header: &str,
    ) -> Result<IndicatorMap> {
        let parts: Vec<&str> = header.trim().split(" = ").collect();

        if parts.len() != 4 {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        let part_counts: Vec<&str> = parts[1].split('/').collect();
        let counts_ok = part_counts.len() == 2
            && part_counts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        let groups_ok = parts[2].chars().all(|c| c.is_ascii_digit());

        if !(counts_ok && groups_ok) {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        let groups_raw = parts[3]
            .strip_suffix('=')
            .ok_or_else(|| SimulatorError::HeaderFormat(header.to_string()))?;
        let groups: Vec<&str> = groups_raw.split_whitespace().collect();

        if groups.len() != self.key_words.len()
            || groups
                .iter()
                .any(|g| g.chars().count() != self.header_group_size || !all_uppercase_letters(g))
        {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        for (word, group) in self.key_words.iter().zip(groups.iter()) {
            indicators.insert(word.clone(), group.to_lowercase());
        }

        Ok(indicators)
    }

    fn set_limits(&mut self, group_size: usize, groups_per_line: usize) {
        self.group_size = group_size;
        self.groups_per_line = groups_per_line;
    }
}

// ---------------------------------------------------------------------------
// SIGABA formatter
// ---------------------------------------------------------------------------

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Formats SIGABA messages:
///
/// ```text
/// 311825Z OCT 2017 - 1 OF 1 - 109
///
/// AMESA DWDAU ... DWDAU AMESA
/// ```
///
/// The external and internal indicators frame the body and are repeated
/// in inverted order at its end.
pub struct SigabaFormatter {
    external_indicator: String,
    group_size: usize,
    groups_per_line: usize,
}

impl SigabaFormatter {
    pub fn new() -> Self {
        SigabaFormatter {
            external_indicator: "AAAAA".to_string(),
            group_size: 5,
            groups_per_line: 5,
        }
    }

    pub fn set_external_indicator(&mut self, external_indicator: &str) {
        self.external_indicator = external_indicator.to_string();
    }
}

impl Default for SigabaFormatter {
    fn default() -> Self {
        SigabaFormatter::new()
    }
}

impl Formatter for SigabaFormatter {
    fn format_body(&self, ciphertext: &str, indicators: &IndicatorMap) -> Result<BodyStruct> {
        let internal = indicators.get(INTERNAL_INDICATOR).ok_or_else(|| {
            SimulatorError::IndicatorInvalid("missing internal indicator".to_string())
        })?;

        let num_chars = ciphertext.chars().count();
        let mut padded = ciphertext.to_string();
        while padded.chars().count() % self.group_size != 0 {
            padded.push('x');
        }

        let framed = format!(
            "{}{}{}{}{}",
            self.external_indicator.to_lowercase(),
            internal,
            padded,
            internal,
            self.external_indicator.to_lowercase()
        );
        let num_groups = count_groups(framed.chars().count(), self.group_size);

        Ok(BodyStruct {
            text: group_text(&framed, true, self.group_size, self.groups_per_line),
            num_chars,
            num_groups,
        })
    }

    fn parse_ciphertext_body(&self, body: &str) -> Result<ParsedBody> {
        let stripped: Vec<char> = body
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
            .chars()
            .collect();

        if stripped.len() < 20 {
            return Err(SimulatorError::HeaderFormat(
                "ciphertext has to contain at least four groups".to_string(),
            ));
        }

        let n = stripped.len();
        let ext_front: String = stripped[..5].iter().collect();
        let int_front: String = stripped[5..10].iter().collect();
        let int_back: String = stripped[n - 10..n - 5].iter().collect();
        let ext_back: String = stripped[n - 5..].iter().collect();

        if ext_front != ext_back || int_front != int_back {
            return Err(SimulatorError::IndicatorInconsistent);
        }

        let mut indicators = IndicatorMap::new();
        indicators.insert(EXTERNAL_INDICATOR.to_string(), ext_front);
        indicators.insert(INTERNAL_INDICATOR.to_string(), int_front);

        Ok(ParsedBody {
            text: stripped[10..n - 10].iter().collect(),
            indicators,
        })
    }

    fn format_header(
        &self,
        body: &BodyStruct,
        _indicators: &IndicatorMap,
        this_part: usize,
        num_parts: usize,
    ) -> Result<String> {
        let now = Utc::now();

        Ok(format!(
            "{:02}{:02}{:02}Z {} {} - {} OF {} - {}",
            now.day(),
            now.hour(),
            now.minute(),
            MONTHS[now.month0() as usize],
            now.year(),
            this_part,
            num_parts,
            body.num_chars
        ))
    }

    fn parse_ciphertext_header(
        &self,
        mut indicators: IndicatorMap,
        header: &str,
    ) -> Result<IndicatorMap> {
        let parts: Vec<&str> = header.trim().split(" - ").collect();

        if parts.len() != 3 {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        let date_fields: Vec<&str> = parts[0].split_whitespace().collect();
        let date_ok = date_fields.len() == 3
            && date_fields[0].len() == 7
            && date_fields[0].ends_with('Z')
            && date_fields[0][..6].chars().all(|c| c.is_ascii_digit())
            && MONTHS.contains(&date_fields[1])
            && date_fields[2].len() == 4
            && date_fields[2].chars().all(|c| c.is_ascii_digit());

        let length_ok = !parts[2].is_empty() && parts[2].chars().all(|c| c.is_ascii_digit());

        if !(date_ok && length_ok) {
            return Err(SimulatorError::HeaderFormat(header.to_string()));
        }

        indicators.insert(MESSAGE_LENGTH.to_string(), parts[2].to_string());

        Ok(indicators)
    }

    fn set_limits(&mut self, group_size: usize, groups_per_line: usize) {
        self.group_size = group_size;
        self.groups_per_line = groups_per_line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enigma_indicators() -> IndicatorMap {
        let mut map = IndicatorMap::new();
        map.insert(HEADER_GRP_1.to_string(), "rjf".to_string());
        map.insert(HEADER_GRP_2.to_string(), "gnz".to_string());
        map.insert(KENNGRUPPE.to_string(), "xxnor".to_string());
        map
    }

    #[test]
    fn test_enigma_body_carries_kenngruppe() {
        let formatter = EnigmaFormatter::new(3);
        let body = formatter
            .format_body("iydskrvmgj", &enigma_indicators())
            .unwrap();

        assert_eq!(body.num_chars, 15);
        assert_eq!(body.num_groups, 3);
        assert!(body.text.starts_with("XXNOR "));

        let parsed = formatter.parse_ciphertext_body(&body.text).unwrap();
        assert_eq!(parsed.indicators.get(KENNGRUPPE).unwrap(), "xxnor");
        assert_eq!(parsed.text, "iydskrvmgj");
    }

    #[test]
    fn test_enigma_header_roundtrip() {
        let formatter = EnigmaFormatter::new(3);
        let body = formatter
            .format_body("iydskrvmgj", &enigma_indicators())
            .unwrap();
        let header = formatter
            .format_header(&body, &enigma_indicators(), 1, 1)
            .unwrap();

        let parsed = formatter
            .parse_ciphertext_header(IndicatorMap::new(), &header)
            .unwrap();
        assert_eq!(parsed.get(HEADER_GRP_1).unwrap(), "rjf");
        assert_eq!(parsed.get(HEADER_GRP_2).unwrap(), "gnz");
    }

    #[test]
    fn test_enigma_header_rejects_garbage() {
        let formatter = EnigmaFormatter::new(3);
        let result = formatter.parse_ciphertext_header(IndicatorMap::new(), "hello world");
        assert!(matches!(result, Err(SimulatorError::HeaderFormat(_))));
    }

    #[test]
    fn test_generic_header_roundtrip() {
        let mut formatter =
            GenericFormatter::new(5, vec![crate::indicator::RAND_INDICATOR.to_string()]);
        formatter.set_system_indicator("AMESA");

        let mut indicators = IndicatorMap::new();
        indicators.insert(
            crate::indicator::RAND_INDICATOR.to_string(),
            "esftg".to_string(),
        );

        let body = formatter.format_body("zcboazkqip", &indicators).unwrap();
        let header = formatter.format_header(&body, &indicators, 4, 5).unwrap();
        assert_eq!(header, "AMESA = 4/5 = 2 = ESFTG =");

        let parsed = formatter
            .parse_ciphertext_header(IndicatorMap::new(), &header)
            .unwrap();
        assert_eq!(parsed.get(crate::indicator::RAND_INDICATOR).unwrap(), "esftg");
    }

    #[test]
    fn test_sigaba_body_frame() {
        let mut formatter = SigabaFormatter::new();
        formatter.set_external_indicator("AMESA");

        let mut indicators = IndicatorMap::new();
        indicators.insert(INTERNAL_INDICATOR.to_string(), "dwdau".to_string());

        let body = formatter.format_body("abcdefg", &indicators).unwrap();
        assert_eq!(body.num_chars, 7);

        let parsed = formatter.parse_ciphertext_body(&body.text).unwrap();
        assert_eq!(parsed.indicators.get(EXTERNAL_INDICATOR).unwrap(), "amesa");
        assert_eq!(parsed.indicators.get(INTERNAL_INDICATOR).unwrap(), "dwdau");
        assert_eq!(parsed.text, "abcdefgxxx");
    }

    #[test]
    fn test_sigaba_inconsistent_indicators() {
        let formatter = SigabaFormatter::new();
        let result =
            formatter.parse_ciphertext_body("AMESA DWDAU ABCDE FGHIJ DWDAU XXXXX");
        assert_eq!(result.err(), Some(SimulatorError::IndicatorInconsistent));
    }

    #[test]
    fn test_sigaba_header_parse() {
        let formatter = SigabaFormatter::new();
        let parsed = formatter
            .parse_ciphertext_header(IndicatorMap::new(), "311825Z OCT 2017 - 1 OF 1 - 109")
            .unwrap();
        assert_eq!(parsed.get(MESSAGE_LENGTH).unwrap(), "109");

        let bad = formatter.parse_ciphertext_header(IndicatorMap::new(), "not a header");
        assert!(matches!(bad, Err(SimulatorError::HeaderFormat(_))));
    }
}
