use core::{fmt, str::FromStr};

use crate::{EpochKey, Error, FormatError, OrgTag, Result, id::parse::split_identifier};

/// Largest sequence number an epoch can issue (six decimal digits).
pub const MAX_SEQUENCE: u32 = 999_999;

/// An issued document identifier: `TAG-YYYY-NNNNNN`.
///
/// The identifier is derived from the counter record at issuance time and is
/// never stored by this crate. Callers use its string form as the primary key
/// of their own billing record.
///
/// # Example
///
/// ```
/// use gapless::{DocumentId, EpochKey, OrgTag};
///
/// let id = OrgTag::SOSEXPAT
///     .document_id(EpochKey::new(2026).unwrap(), 7)
///     .unwrap();
/// assert_eq!(id.to_string(), "SOSEXPAT-2026-000007");
///
/// let parsed: DocumentId = "SOSEXPAT-2026-000007".parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId {
    tag: OrgTag,
    epoch: EpochKey,
    sequence: u32,
}

impl DocumentId {
    /// Creates an identifier from its components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequenceExhausted`] if `sequence` does not fit in six
    /// digits.
    pub fn new(tag: OrgTag, epoch: EpochKey, sequence: u32) -> Result<Self> {
        if sequence > MAX_SEQUENCE {
            return Err(Error::SequenceExhausted { epoch });
        }
        Ok(Self::from_parts(tag, epoch, sequence))
    }

    pub(crate) fn from_parts(tag: OrgTag, epoch: EpochKey, sequence: u32) -> Self {
        debug_assert!(sequence <= MAX_SEQUENCE);
        Self {
            tag,
            epoch,
            sequence,
        }
    }

    pub fn tag(&self) -> &OrgTag {
        &self.tag
    }

    pub fn epoch(&self) -> EpochKey {
        self.epoch
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:06}", self.tag, self.epoch, self.sequence)
    }
}

/// Parses an identifier under whichever well-formed tag it carries.
///
/// Use [`OrgTag::parse`] to also pin the tag.
impl FromStr for DocumentId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, epoch, sequence) = split_identifier(s)?;
        let tag = OrgTag::new(tag.to_owned()).map_err(|_| FormatError::InvalidTag {
            tag: tag.to_owned(),
        })?;
        Ok(Self::from_parts(tag, epoch, sequence))
    }
}

impl PartialOrd for DocumentId {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by tag, then epoch, then sequence: the issuance order within one tag.
impl Ord for DocumentId {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (&self.tag, self.epoch, self.sequence).cmp(&(&other.tag, other.epoch, other.sequence))
    }
}
