//! The textual key/value document that carries machine states and rotor
//! set files.
//!
//! The layout is line oriented UTF-8: bracketed section headers followed
//! by `key=value` lines. Parsing is strict about the tags it knows and
//! tolerant about section order; rendering keeps insertion order so that
//! a parsed and re-rendered document is byte identical.

use crate::error::{Result, SimulatorError};

/// One named section of key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Section {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// An ordered collection of sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Parses a document from text.
    ///
    /// # Returns
    /// * The parsed document, or `StateFormat` if a line is neither a
    ///   section header, a key/value pair, a comment nor blank.
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = Document::new();
        let mut current: Option<Section> = None;

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') || line.len() < 3 {
                    return Err(SimulatorError::StateFormat(format!(
                        "malformed section header in line {}",
                        lineno + 1
                    )));
                }

                if let Some(section) = current.take() {
                    doc.sections.push(section);
                }
                current = Some(Section::new(&line[1..line.len() - 1]));
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                SimulatorError::StateFormat(format!("missing '=' in line {}", lineno + 1))
            })?;

            match current.as_mut() {
                Some(section) => section.set(key.trim(), value.trim()),
                None => {
                    return Err(SimulatorError::StateFormat(format!(
                        "key/value pair before first section in line {}",
                        lineno + 1
                    )))
                }
            }
        }

        if let Some(section) = current.take() {
            doc.sections.push(section);
        }

        Ok(doc)
    }

    /// Renders the document back to text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");

            for (key, value) in &section.entries {
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push('\n');
            }

            out.push('\n');
        }

        out
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Returns the value of `key` in section `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.section(section)
            .and_then(|s| s.get(key))
            .map(|v| v.to_string())
    }

    /// Sets `key` in `section`, creating the section at the end of the
    /// document if necessary.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        if let Some(existing) = self.sections.iter_mut().find(|s| s.name == section) {
            existing.set(key, value);
            return;
        }

        let mut fresh = Section::new(section);
        fresh.set(key, value);
        self.sections.push(fresh);
    }

    pub fn set_int(&mut self, section: &str, key: &str, value: usize) {
        self.set(section, key, &value.to_string());
    }

    pub fn set_bool(&mut self, section: &str, key: &str, value: bool) {
        self.set(section, key, if value { "true" } else { "false" });
    }

    pub fn set_int_list(&mut self, section: &str, key: &str, values: &[usize]) {
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.set(section, key, &rendered.join(","));
    }

    /// Reads a required string value.
    pub fn require(&self, section: &str, key: &str) -> Result<String> {
        self.get(section, key).ok_or_else(|| {
            SimulatorError::StateFormat(format!("missing key '{}' in section [{}]", key, section))
        })
    }

    /// Reads a required integer value.
    pub fn require_int(&self, section: &str, key: &str) -> Result<usize> {
        let raw = self.require(section, key)?;
        raw.parse().map_err(|_| {
            SimulatorError::StateFormat(format!(
                "key '{}' in section [{}] is not an integer",
                key, section
            ))
        })
    }

    /// Reads a required boolean value (`true`/`false`).
    pub fn require_bool(&self, section: &str, key: &str) -> Result<bool> {
        match self.require(section, key)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(SimulatorError::StateFormat(format!(
                "key '{}' in section [{}] has non-boolean value '{}'",
                key, section, other
            ))),
        }
    }

    /// Reads a required integer list (comma separated, semicolons are
    /// tolerated).
    pub fn require_int_list(&self, section: &str, key: &str) -> Result<Vec<usize>> {
        let raw = self.require(section, key)?;

        crate::rotorset::split_int_list(&raw)
            .iter()
            .map(|v| {
                v.parse::<usize>().map_err(|_| {
                    SimulatorError::StateFormat(format!(
                        "key '{}' in section [{}] holds a malformed integer list",
                        key, section
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_roundtrip() {
        let text = "[machine]\nname=M4Enigma\nrotorsetname=defaultset\n\n[rotor_fast]\npermutation=0,1,2\nrid=0\n\n";
        let doc = Document::parse(text).unwrap();

        assert_eq!(doc.get("machine", "name").unwrap(), "M4Enigma");
        assert_eq!(doc.require_int_list("rotor_fast", "permutation").unwrap(), vec![0, 1, 2]);
        assert_eq!(doc.render(), text);

        let again = Document::parse(&doc.render()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_semicolon_lists_accepted() {
        let doc = Document::parse("[a]\nv=1;2;3;\n").unwrap();
        assert_eq!(doc.require_int_list("a", "v").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(Document::parse("keywithoutsection=1\n").is_err());
        assert!(Document::parse("[open\nk=v\n").is_err());
        assert!(Document::parse("[a]\nnovalue\n").is_err());
    }

    #[test]
    fn test_require_errors() {
        let doc = Document::parse("[a]\nv=x\n").unwrap();
        assert!(doc.require("a", "w").is_err());
        assert!(doc.require_int("a", "v").is_err());
        assert!(doc.require_bool("a", "v").is_err());
    }
}
