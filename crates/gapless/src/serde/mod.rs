use ::serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::DocumentId;

/// Serializes as the `TAG-YYYY-NNNNNN` string, the form stored as the primary
/// key of billing records.
impl Serialize for DocumentId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

/// Deserializes from the `TAG-YYYY-NNNNNN` string under any well-formed tag.
///
/// Use [`as_sosexpat`] to additionally pin the tag.
impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(d)?.parse().map_err(de::Error::custom)
    }
}

/// For `#[serde(with = "gapless::as_sosexpat")]` fields that must carry a
/// `SOSEXPAT` identifier.
pub mod as_sosexpat {
    use super::{Deserialize, Deserializer, Serialize, Serializer, de};
    use crate::{DocumentId, OrgTag};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &DocumentId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.serialize(s)
    }

    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the string is
    /// not a `SOSEXPAT` identifier.
    pub fn deserialize<'de, D>(d: D) -> Result<DocumentId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        OrgTag::SOSEXPAT.parse(&s).map_err(de::Error::custom)
    }
}
