//! ISBN codec: separator stripping, check digit arithmetic and conversion
//! between the 10 and 13 digit forms. Nothing here touches I/O.
//!
//! ISBN-13 check digits use weights 1,3,1,3,... modulo 10. ISBN-10 check
//! digits use weights 10..=2 modulo 11, where the value 10 is written `X`.

use std::fmt;
use std::str::FromStr;

use crate::error::IsbnError;

pub const ISBN10_LEN: usize = 10;
pub const ISBN13_LEN: usize = 13;
/// Bookland prefix shared by every ISBN-13 that has an ISBN-10 equivalent.
pub const BOOKLAND_PREFIX: &str = "978";

/// Strip hyphens and whitespace, then check length and character set. A
/// trailing `x` on a 10-character value is upper-cased.
pub fn normalize(raw: &str) -> Result<String, IsbnError> {
    let stripped: String = raw
        .chars()
        .filter(|ch| *ch != '-' && !ch.is_whitespace())
        .collect();

    let len = stripped.chars().count();
    if len != ISBN10_LEN && len != ISBN13_LEN {
        return Err(IsbnError::InvalidFormat(format!(
            "'{}' has {len} characters, expected 10 or 13",
            raw.trim()
        )));
    }

    let mut normalized = String::with_capacity(len);
    for (index, ch) in stripped.chars().enumerate() {
        let last_of_isbn10 = len == ISBN10_LEN && index == ISBN10_LEN - 1;
        match ch {
            '0'..='9' => normalized.push(ch),
            'X' | 'x' if last_of_isbn10 => normalized.push('X'),
            other => {
                return Err(IsbnError::InvalidFormat(format!(
                    "unexpected character '{other}' in '{}'",
                    raw.trim()
                )))
            }
        }
    }

    Ok(normalized)
}

/// Check digit for the first twelve digits of an ISBN-13.
pub fn isbn13_check_digit(first12: &str) -> Result<char, IsbnError> {
    let digits = parse_digits(first12, ISBN13_LEN - 1)?;
    Ok(digit_char(isbn13_check_value(&digits)))
}

/// Check character for the first nine digits of an ISBN-10 (`0`-`9` or `X`).
pub fn isbn10_check_digit(first9: &str) -> Result<char, IsbnError> {
    let digits = parse_digits(first9, ISBN10_LEN - 1)?;
    let value = isbn10_check_value(&digits);
    Ok(if value == 10 { 'X' } else { digit_char(value) })
}

/// Prefix `978` to the first nine digits and append a fresh ISBN-13 check
/// digit. The input's own check character is dropped, not verified.
pub fn isbn10_to_isbn13(isbn10: &str) -> Result<String, IsbnError> {
    let actual = isbn10.chars().count();
    if actual != ISBN10_LEN {
        return Err(IsbnError::InvalidLength {
            expected: ISBN10_LEN,
            actual,
        });
    }

    let first9: String = isbn10.chars().take(ISBN10_LEN - 1).collect();
    let body = format!("{BOOKLAND_PREFIX}{first9}");
    let check = isbn13_check_digit(&body)?;
    Ok(format!("{body}{check}"))
}

/// Take digits 4 through 12 of a `978` ISBN-13 and append a fresh ISBN-10
/// check character. `979` and other prefixes fail with
/// [`IsbnError::InvalidPrefix`] instead of being truncated.
pub fn isbn13_to_isbn10(isbn13: &str) -> Result<String, IsbnError> {
    let actual = isbn13.chars().count();
    if actual != ISBN13_LEN {
        return Err(IsbnError::InvalidLength {
            expected: ISBN13_LEN,
            actual,
        });
    }
    parse_digits(isbn13, ISBN13_LEN)?;
    if !isbn13.starts_with(BOOKLAND_PREFIX) {
        return Err(IsbnError::InvalidPrefix(isbn13.to_string()));
    }

    let body = &isbn13[BOOKLAND_PREFIX.len()..ISBN13_LEN - 1];
    let check = isbn10_check_digit(body)?;
    Ok(format!("{body}{check}"))
}

/// Recompute the check character for the identifier's own length and compare
/// it with the supplied one (`x` and `X` are equivalent).
pub fn verify(identifier: &str) -> Result<(), IsbnError> {
    let len = identifier.chars().count();
    let body: String = identifier.chars().take(len.saturating_sub(1)).collect();
    let expected = match len {
        ISBN10_LEN => isbn10_check_digit(&body)?,
        ISBN13_LEN => isbn13_check_digit(&body)?,
        _ => {
            return Err(IsbnError::InvalidFormat(format!(
                "'{identifier}' has {len} characters, expected 10 or 13"
            )))
        }
    };

    let supplied = identifier
        .chars()
        .last()
        .map(|ch| ch.to_ascii_uppercase())
        .unwrap_or_default();
    if supplied == expected {
        Ok(())
    } else {
        Err(IsbnError::InvalidChecksum {
            isbn: identifier.to_string(),
            expected,
        })
    }
}

pub fn is_valid(identifier: &str) -> bool {
    verify(identifier).is_ok()
}

/// Normalize `raw` and convert it to the other form: ISBN-10 input yields an
/// ISBN-13 and ISBN-13 input yields an ISBN-10.
pub fn convert(raw: &str) -> Result<String, IsbnError> {
    let normalized = normalize(raw)?;
    if normalized.len() == ISBN10_LEN {
        isbn10_to_isbn13(&normalized)
    } else {
        isbn13_to_isbn10(&normalized)
    }
}

/// Canonical catalog identifier: thirteen ASCII digits, no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Isbn13(String);

impl Isbn13 {
    /// Accept either form with separators, converting ISBN-10 input.
    pub fn parse(raw: &str) -> Result<Self, IsbnError> {
        let normalized = normalize(raw)?;
        Self::from_normalized(&normalized)
    }

    /// Accept only the 13-digit form (separators allowed). Used when reading
    /// persisted rows, which must already be canonical.
    pub fn parse_canonical(raw: &str) -> Result<Self, IsbnError> {
        let normalized = normalize(raw)?;
        let actual = normalized.chars().count();
        if actual != ISBN13_LEN {
            return Err(IsbnError::InvalidLength {
                expected: ISBN13_LEN,
                actual,
            });
        }
        Self::from_normalized(&normalized)
    }

    /// Canonicalize an already normalized 10 or 13 character value.
    pub fn from_normalized(normalized: &str) -> Result<Self, IsbnError> {
        match normalized.chars().count() {
            ISBN10_LEN => Ok(Self(isbn10_to_isbn13(normalized)?)),
            ISBN13_LEN => {
                parse_digits(normalized, ISBN13_LEN)?;
                Ok(Self(normalized.to_string()))
            }
            actual => Err(IsbnError::InvalidLength {
                expected: ISBN13_LEN,
                actual,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `None` when the identifier has no ISBN-10 form.
    pub fn to_isbn10(&self) -> Option<String> {
        isbn13_to_isbn10(&self.0).ok()
    }

    pub fn has_valid_check_digit(&self) -> bool {
        is_valid(&self.0)
    }
}

impl fmt::Display for Isbn13 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Isbn13 {
    type Err = IsbnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Isbn13 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn parse_digits(value: &str, expected: usize) -> Result<Vec<u32>, IsbnError> {
    let actual = value.chars().count();
    if actual != expected {
        return Err(IsbnError::InvalidLength { expected, actual });
    }
    value
        .chars()
        .map(|ch| {
            ch.to_digit(10).ok_or_else(|| {
                IsbnError::InvalidFormat(format!("unexpected character '{ch}' in '{value}'"))
            })
        })
        .collect()
}

fn isbn13_check_value(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, digit)| digit * if index % 2 == 0 { 1 } else { 3 })
        .sum();
    (10 - sum % 10) % 10
}

fn isbn10_check_value(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, digit)| digit * (10 - index as u32))
        .sum();
    (11 - sum % 11) % 11
}

fn digit_char(value: u32) -> char {
    char::from_digit(value, 10).unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic spread of nine-digit bodies, including ones whose
    /// ISBN-10 check value is 10.
    fn sample_bodies() -> Vec<String> {
        (0..2_000u64)
            .map(|n| format!("{:09}", (n * 499_979 + 12_345) % 1_000_000_000))
            .chain(["080442957".to_string(), "043942089".to_string()])
            .collect()
    }

    #[test]
    fn normalize_strips_separators_and_uppercases_x() {
        assert_eq!(normalize("0-8044-2957-x").unwrap(), "080442957X");
        assert_eq!(normalize(" 978 0 306 40615 7 ").unwrap(), "9780306406157");
    }

    #[test]
    fn normalize_rejects_bad_lengths_and_characters() {
        assert!(matches!(normalize("12345"), Err(IsbnError::InvalidFormat(_))));
        assert!(matches!(normalize(""), Err(IsbnError::InvalidFormat(_))));
        assert!(matches!(
            normalize("97803064061X7"),
            Err(IsbnError::InvalidFormat(_))
        ));
        // X is only allowed as the final character of a 10-character value.
        assert!(matches!(
            normalize("978030640615X"),
            Err(IsbnError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize("X306406152"),
            Err(IsbnError::InvalidFormat(_))
        ));
    }

    #[test]
    fn known_conversion_vectors() {
        assert_eq!(isbn10_to_isbn13("0306406152").unwrap(), "9780306406157");
        assert_eq!(isbn13_to_isbn10("9780306406157").unwrap(), "0306406152");
        assert_eq!(isbn10_to_isbn13("080442957X").unwrap(), "9780804429573");
        assert_eq!(isbn13_to_isbn10("9780804429573").unwrap(), "080442957X");
    }

    #[test]
    fn isbn13_to_isbn10_recomputes_instead_of_verifying() {
        assert_eq!(isbn13_to_isbn10("9780306406153").unwrap(), "0306406152");
    }

    #[test]
    fn isbn10_to_isbn13_matches_independent_computation() {
        for body in sample_bodies() {
            let isbn10 = format!("{body}{}", isbn10_check_digit(&body).unwrap());
            let prefixed = format!("978{body}");
            let expected = format!("{prefixed}{}", isbn13_check_digit(&prefixed).unwrap());
            assert_eq!(isbn10_to_isbn13(&isbn10).unwrap(), expected);
        }
    }

    #[test]
    fn conversion_round_trips_valid_isbn10() {
        for body in sample_bodies() {
            let isbn10 = format!("{body}{}", isbn10_check_digit(&body).unwrap());
            let isbn13 = isbn10_to_isbn13(&isbn10).unwrap();
            assert!(is_valid(&isbn13), "{isbn13}");
            assert_eq!(isbn13_to_isbn10(&isbn13).unwrap(), isbn10);
        }
    }

    #[test]
    fn non_bookland_prefix_has_no_isbn10() {
        assert_eq!(
            isbn13_to_isbn10("9791098765438"),
            Err(IsbnError::InvalidPrefix("9791098765438".to_string()))
        );
        assert!(matches!(
            isbn13_to_isbn10("1234567890128"),
            Err(IsbnError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn conversions_enforce_length() {
        assert_eq!(
            isbn10_to_isbn13("030640615"),
            Err(IsbnError::InvalidLength {
                expected: 10,
                actual: 9
            })
        );
        assert_eq!(
            isbn13_to_isbn10("0306406152"),
            Err(IsbnError::InvalidLength {
                expected: 13,
                actual: 10
            })
        );
    }

    #[test]
    fn verify_accepts_valid_codes() {
        assert!(is_valid("0306406152"));
        assert!(is_valid("080442957X"));
        assert!(is_valid("080442957x"));
        assert!(is_valid("9780306406157"));
    }

    #[test]
    fn verify_rejects_a_wrong_final_character() {
        assert_eq!(
            verify("9780306406153"),
            Err(IsbnError::InvalidChecksum {
                isbn: "9780306406153".to_string(),
                expected: '7'
            })
        );
        assert!(!is_valid("0306406153"));
        assert!(!is_valid("030640615X"));
        assert!(!is_valid("0804429570"));
    }

    #[test]
    fn every_other_final_character_invalidates() {
        for candidate in "0123456789".chars().filter(|ch| *ch != '7') {
            assert!(!is_valid(&format!("978030640615{candidate}")));
        }
        for candidate in "0123456789X".chars().filter(|ch| *ch != '2') {
            assert!(!is_valid(&format!("030640615{candidate}")));
        }
    }

    #[test]
    fn convert_picks_direction_from_length() {
        assert_eq!(convert("0-306-40615-2").unwrap(), "9780306406157");
        assert_eq!(convert("978-0-306-40615-7").unwrap(), "0306406152");
        assert!(matches!(convert("12"), Err(IsbnError::InvalidFormat(_))));
    }

    #[test]
    fn isbn13_parse_canonicalizes_both_forms() {
        let from_ten: Isbn13 = "0-306-40615-2".parse().unwrap();
        let from_thirteen = Isbn13::parse("978-0306406157").unwrap();
        assert_eq!(from_ten, from_thirteen);
        assert_eq!(from_ten.as_str(), "9780306406157");
        assert_eq!(from_ten.to_isbn10().as_deref(), Some("0306406152"));
        assert!(from_ten.has_valid_check_digit());
        assert!(Isbn13::parse("9791098765438").unwrap().to_isbn10().is_none());
    }
}
