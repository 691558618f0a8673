use core::fmt;
use std::borrow::Cow;

use crate::{DocumentId, EpochKey, Error, FormatError, Result, id::parse::split_identifier};

/// The organisation prefix every identifier starts with.
///
/// A tag is 1 to 32 characters of ASCII uppercase letters and digits and
/// starts with a letter. It can never contain `-`, which keeps the identifier
/// layout unambiguous when parsing from the right.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct OrgTag(Cow<'static, str>);

impl OrgTag {
    /// The tag printed on every invoice: `SOSEXPAT`.
    pub const SOSEXPAT: Self = Self(Cow::Borrowed("SOSEXPAT"));

    /// Longest accepted tag.
    pub const MAX_LEN: usize = 32;

    /// Creates a tag after checking its alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrgTag`] if `tag` is empty, too long, starts
    /// with a digit, or contains anything but `A-Z` and `0-9`.
    ///
    /// # Example
    ///
    /// ```
    /// use gapless::OrgTag;
    ///
    /// assert!(OrgTag::new("DOC").is_ok());
    /// assert!(OrgTag::new("doc").is_err());
    /// assert!(OrgTag::new("SOS-EXPAT").is_err());
    /// ```
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Result<Self> {
        let tag = tag.into();
        if Self::is_valid_tag(&tag) {
            Ok(Self(tag))
        } else {
            Err(Error::InvalidOrgTag {
                tag: tag.into_owned(),
            })
        }
    }

    pub(crate) fn is_valid_tag(tag: &str) -> bool {
        let bytes = tag.as_bytes();
        match bytes.first() {
            Some(first) if first.is_ascii_uppercase() => {
                bytes.len() <= Self::MAX_LEN
                    && bytes
                        .iter()
                        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the identifier for `sequence` in `epoch` under this tag.
    pub fn document_id(&self, epoch: EpochKey, sequence: u32) -> Result<DocumentId> {
        DocumentId::new(self.clone(), epoch, sequence)
    }

    /// Returns `true` if `s` is exactly `TAG-YYYY-NNNNNN` for this tag.
    pub fn is_valid_format(&self, s: &str) -> bool {
        self.parse(s).is_ok()
    }

    /// Decomposes an identifier issued under this tag.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] describing the first mismatch. No partial
    /// result is ever produced.
    pub fn parse(&self, s: &str) -> Result<DocumentId, FormatError> {
        let (tag, epoch, sequence) = split_identifier(s)?;
        if tag != self.as_str() {
            return Err(FormatError::UnexpectedTag {
                expected: self.0.clone().into_owned(),
                found: tag.to_owned(),
            });
        }
        Ok(DocumentId::from_parts(self.clone(), epoch, sequence))
    }
}

impl Default for OrgTag {
    fn default() -> Self {
        Self::SOSEXPAT
    }
}

impl fmt::Display for OrgTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrgTag {
    type Error = Error;

    fn try_from(tag: String) -> Result<Self> {
        Self::new(tag)
    }
}

impl From<OrgTag> for String {
    fn from(tag: OrgTag) -> Self {
        tag.0.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_alphabet() {
        assert!(OrgTag::new("SOSEXPAT").is_ok());
        assert!(OrgTag::new("DOC2").is_ok());
        assert!(OrgTag::new(String::from("INV")).is_ok());

        for bad in ["", "2DOC", "Doc", "DO C", "DOC-1", "ÉTAT"] {
            assert_eq!(
                OrgTag::new(bad),
                Err(Error::InvalidOrgTag {
                    tag: bad.to_owned()
                }),
                "{bad:?} should be rejected"
            );
        }
        assert!(OrgTag::new("A".repeat(OrgTag::MAX_LEN)).is_ok());
        assert!(OrgTag::new("A".repeat(OrgTag::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn parse_requires_matching_tag() {
        let doc = OrgTag::new("DOC").unwrap();
        let id = doc.parse("DOC-2026-000042").unwrap();
        assert_eq!(id.sequence(), 42);
        assert_eq!(id.tag(), &doc);

        assert_eq!(
            doc.parse("SOSEXPAT-2026-000042"),
            Err(FormatError::UnexpectedTag {
                expected: "DOC".to_owned(),
                found: "SOSEXPAT".to_owned(),
            })
        );
        assert!(!OrgTag::SOSEXPAT.is_valid_format("DOC-2026-000042"));
    }
}
