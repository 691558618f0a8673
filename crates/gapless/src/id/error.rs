/// Reasons an identifier string fails validation.
///
/// Byte offsets refer to the input string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("identifier too short: {len} bytes")]
    TooShort { len: usize },

    #[error("expected '-' at byte {index}")]
    MissingSeparator { index: usize },

    #[error("expected an ASCII digit at byte {index}, found {byte:#04x}")]
    InvalidDigit { index: usize, byte: u8 },

    #[error("malformed organisation tag {tag:?}")]
    InvalidTag { tag: String },

    #[error("expected organisation tag {expected:?}, found {found:?}")]
    UnexpectedTag { expected: String, found: String },

    #[error("year {year} is not a valid epoch")]
    EpochOutOfRange { year: u16 },
}
