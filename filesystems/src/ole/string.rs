// OLE directory entry names
// UTF-16 names compared case-insensitively, shorter names first.

use containerfs_core::ContainerError;
use std::cmp::Ordering;
use std::fmt;

/// Size of the raw on-disk name field, terminator included.
pub const NAME_FIELD_BYTES: usize = 64;
/// Longest name in code units, terminator excluded.
pub const MAX_NAME_UNITS: usize = 31;

/// Characters that may not appear in a name: `/ \ : !`.
const ILLEGAL: [u16; 4] = [0x002F, 0x005C, 0x003A, 0x0021];

/// An immutable directory entry name of up to 31 UTF-16 code units. The
/// on-disk terminator is not retained in memory.
///
/// Names order by the OLE comparator: a shorter name sorts before any
/// longer one regardless of contents; equal-length names compare code
/// unit by code unit after ASCII uppercase folding. Equality is derived
/// from that ordering, so `"abc" == "ABC"`.
#[derive(Debug, Clone, Default)]
pub struct OleString {
    units: Vec<u16>,
}

impl OleString {
    /// Build a name from a UTF-16 view.
    pub fn from_utf16(src: &[u16]) -> Result<Self, ContainerError> {
        if src.len() * 2 > MAX_NAME_UNITS * 2 {
            return Err(ContainerError::Exceeds62Bytes);
        }
        if src.iter().any(|u| ILLEGAL.contains(u)) {
            return Err(ContainerError::ContainsIllegalCharacters);
        }
        Ok(Self {
            units: src.to_vec(),
        })
    }

    /// Build a name from one component of an external filesystem path.
    pub fn from_path_component(src: &str) -> Result<Self, ContainerError> {
        let units: Vec<u16> = src.encode_utf16().collect();
        Self::from_utf16(&units)
    }

    /// Build a name from the raw 64-byte on-disk field and its declared
    /// byte length (terminator included).
    pub fn from_raw(raw: &[u8; NAME_FIELD_BYTES], size_bytes: usize) -> Result<Self, ContainerError> {
        if size_bytes > NAME_FIELD_BYTES {
            return Err(ContainerError::Exceeds64Bytes);
        }
        if size_bytes % 2 != 0 {
            return Err(ContainerError::NotMultipleOf2);
        }
        if size_bytes == 0 {
            return Err(ContainerError::NotNullTerminated);
        }

        let mut units: Vec<u16> = raw[..size_bytes]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        if units.pop() != Some(0) {
            return Err(ContainerError::NotNullTerminated);
        }
        Self::from_utf16(&units)
    }

    /// Length in code units, terminator excluded.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    /// Declared on-disk byte length, terminator included.
    pub fn size_bytes(&self) -> u16 {
        (self.units.len() as u16 + 1) * 2
    }

    /// The OLE total order: length dominates, then folded code units.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.units
            .len()
            .cmp(&other.units.len())
            .then_with(|| {
                for (&a, &b) in self.units.iter().zip(other.units.iter()) {
                    match fold(a).cmp(&fold(b)) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                Ordering::Equal
            })
    }
}

/// ASCII uppercase folding; surrogates and non-ASCII pass through.
fn fold(unit: u16) -> u16 {
    if (0x0061..=0x007A).contains(&unit) {
        unit - 0x20
    } else {
        unit
    }
}

impl PartialEq for OleString {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for OleString {}

impl PartialOrd for OleString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for OleString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for OleString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf16_lossy(&self.units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> OleString {
        OleString::from_path_component(s).unwrap()
    }

    #[test]
    fn length_dominates_contents() {
        assert_eq!(name("AB").compare(&name("ABC")), Ordering::Less);
        assert_eq!(name("zz").compare(&name("AAA")), Ordering::Less);
        assert_eq!(name("ABC").compare(&name("AB")), Ordering::Greater);
    }

    #[test]
    fn equal_length_folds_ascii_case() {
        assert_eq!(name("abc").compare(&name("ABC")), Ordering::Equal);
        assert_eq!(name("abc"), name("ABC"));
        assert_eq!(name("abd").compare(&name("ABC")), Ordering::Greater);
    }

    #[test]
    fn non_ascii_units_pass_through_unfolded() {
        let lower = OleString::from_utf16(&[0x0430]).unwrap(); // Cyrillic а
        let upper = OleString::from_utf16(&[0x0410]).unwrap(); // Cyrillic А
        assert_ne!(lower, upper);
    }

    #[test]
    fn ordering_is_total() {
        let names = [name("b"), name("A"), name("aa"), name("AB"), name("ABC")];
        for a in &names {
            assert_eq!(a.compare(a), Ordering::Equal);
            for b in &names {
                assert_eq!(a.compare(b), b.compare(a).reverse());
            }
        }
    }

    #[test]
    fn illegal_characters_rejected() {
        for bad in ["a/b", "a\\b", "a:b", "a!b"] {
            assert_eq!(
                OleString::from_path_component(bad),
                Err(ContainerError::ContainsIllegalCharacters)
            );
        }
    }

    #[test]
    fn over_long_names_rejected() {
        let long: Vec<u16> = std::iter::repeat(0x0041).take(32).collect();
        assert_eq!(
            OleString::from_utf16(&long),
            Err(ContainerError::Exceeds62Bytes)
        );
        let fits: Vec<u16> = std::iter::repeat(0x0041).take(31).collect();
        assert!(OleString::from_utf16(&fits).is_ok());
    }

    #[test]
    fn raw_constructor_round_trips() {
        let mut raw = [0u8; NAME_FIELD_BYTES];
        let original = name("Root Entry");
        for (i, unit) in original.as_units().iter().enumerate() {
            raw[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let size = original.size_bytes() as usize;

        let cooked = OleString::from_raw(&raw, size).unwrap();
        assert_eq!(cooked, original);
        assert_eq!(cooked.size_bytes() as usize, size);
    }

    #[test]
    fn raw_constraint_errors() {
        let raw = [0u8; NAME_FIELD_BYTES];
        assert_eq!(
            OleString::from_raw(&raw, 66),
            Err(ContainerError::Exceeds64Bytes)
        );
        assert_eq!(
            OleString::from_raw(&raw, 33),
            Err(ContainerError::NotMultipleOf2)
        );
        assert_eq!(
            OleString::from_raw(&raw, 0),
            Err(ContainerError::NotNullTerminated)
        );

        let mut unterminated = [0u8; NAME_FIELD_BYTES];
        unterminated[0] = b'A';
        unterminated[2] = b'B'; // declared length covers "AB" with no terminator
        assert_eq!(
            OleString::from_raw(&unterminated, 4),
            Err(ContainerError::NotNullTerminated)
        );
    }

    #[test]
    fn raw_name_with_illegal_character_rejected() {
        let mut raw = [0u8; NAME_FIELD_BYTES];
        raw[0] = b'a';
        raw[2] = b'!';
        assert_eq!(
            OleString::from_raw(&raw, 6),
            Err(ContainerError::ContainsIllegalCharacters)
        );
    }
}
