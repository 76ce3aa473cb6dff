// Container paths: ordered name segments below the root storage.

use crate::ole::string::OleString;
use containerfs_core::ContainerError;
use std::fmt;
use std::path::{Component, Path};

/// A path inside a mounted container, one `OleString` per segment.
///
/// An empty path names nothing: it does not exist and has no size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OlePath {
    segments: Vec<OleString>,
}

impl OlePath {
    /// Build a path from an external filesystem path. Root and `.`
    /// components are dropped; everything else becomes a segment and must
    /// satisfy the name constraints.
    pub fn make<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let mut segments = Vec::new();
        for component in path.as_ref().components() {
            match component {
                Component::Normal(part) => {
                    segments.push(OleString::from_path_component(&part.to_string_lossy())?);
                }
                Component::ParentDir => {
                    segments.push(OleString::from_utf16(&[0x002E, 0x002E])?);
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        Ok(Self { segments })
    }

    pub fn push(&mut self, segment: OleString) {
        self.segments.push(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[OleString] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OleString> {
        self.segments.iter()
    }
}

impl FromIterator<OleString> for OlePath {
    fn from_iter<I: IntoIterator<Item = OleString>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for OlePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_segments() {
        let path = OlePath::make("Dir/Leaf").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[0], OleString::from_path_component("Dir").unwrap());
        assert_eq!(path.segments()[1], OleString::from_path_component("Leaf").unwrap());
    }

    #[test]
    fn normalizes_root_and_trailing_separators() {
        let plain = OlePath::make("Dir/Leaf").unwrap();
        assert_eq!(OlePath::make("/Dir/Leaf").unwrap(), plain);
        assert_eq!(OlePath::make("Dir/Leaf/").unwrap(), plain);
        assert_eq!(OlePath::make("./Dir//Leaf").unwrap(), plain);
    }

    #[test]
    fn round_trips_through_display() {
        let path = OlePath::make("Dir/Sub/Leaf.txt").unwrap();
        let rejoined = OlePath::make(path.to_string()).unwrap();
        assert_eq!(rejoined, path);
    }

    #[test]
    fn empty_paths_have_no_segments() {
        assert!(OlePath::make("").unwrap().is_empty());
        assert!(OlePath::make("/").unwrap().is_empty());
    }

    #[test]
    fn segment_constraints_propagate() {
        assert_eq!(
            OlePath::make("Dir/bad!name"),
            Err(ContainerError::ContainsIllegalCharacters)
        );
    }
}
