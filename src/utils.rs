//! Helper functions shared by the simulator components: alphabet
//! conversions and ciphertext grouping.

/// The standard lower case alphabet used by all 26-contact machines.
pub const STD_ALPHA: &str = "abcdefghijklmnopqrstuvwxyz";

/// Converts a letter (a-z, case insensitive) to an index (0-25).
///
/// # Arguments
/// * `letter` - The letter to convert
///
/// # Returns
/// * `Some(index)` - The corresponding index (0-25)
/// * `None` - If the character is not a letter
pub fn letter_to_index(letter: char) -> Option<usize> {
    if letter.is_ascii_alphabetic() {
        Some((letter.to_ascii_lowercase() as u8 - b'a') as usize)
    } else {
        None
    }
}

/// Converts an index (0-25) to a lower case letter.
pub fn index_to_letter(index: usize) -> Option<char> {
    if index < 26 {
        Some((b'a' + index as u8) as char)
    } else {
        None
    }
}

/// Keeps only the letters of a text, lower cased.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Groups a text into fixed size groups separated by blanks with a fixed
/// number of groups per line.
///
/// # Arguments
/// * `text` - The raw text to format
/// * `uppercase` - Whether the output is upper or lower case
/// * `group_size` - Number of characters per group
/// * `groups_per_line` - Number of groups per output line
pub fn group_text(text: &str, uppercase: bool, group_size: usize, groups_per_line: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_line = String::new();
    let mut groups_in_line = 0;
    let mut chars_in_group = 0;

    for c in text.chars() {
        let c = if uppercase {
            c.to_ascii_uppercase()
        } else {
            c.to_ascii_lowercase()
        };

        if chars_in_group == group_size {
            chars_in_group = 0;
            groups_in_line += 1;

            if groups_in_line == groups_per_line {
                lines.push(current_line.clone());
                current_line.clear();
                groups_in_line = 0;
            } else {
                current_line.push(' ');
            }
        }

        current_line.push(c);
        chars_in_group += 1;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_conversion() {
        assert_eq!(letter_to_index('a'), Some(0));
        assert_eq!(letter_to_index('Z'), Some(25));
        assert_eq!(letter_to_index('1'), None);
        assert_eq!(index_to_letter(25), Some('z'));
        assert_eq!(index_to_letter(26), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("Hallo, Welt! 123"), "hallowelt");
    }

    #[test]
    fn test_group_text() {
        assert_eq!(group_text("abcdefghij", true, 5, 10), "ABCDE FGHIJ");
        assert_eq!(group_text("abcdefghijkl", false, 4, 2), "abcd efgh\nijkl");
    }
}
