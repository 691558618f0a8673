use crate::{EpochKey, FormatError, OrgTag};

const YEAR_DIGITS: usize = 4;
const SEQUENCE_DIGITS: usize = 6;
/// `-YYYY-NNNNNN`
const SUFFIX_LEN: usize = 1 + YEAR_DIGITS + 1 + SEQUENCE_DIGITS;

/// Returns `true` if `s` is exactly `SOSEXPAT-YYYY-NNNNNN`.
///
/// `YYYY` must also be a year an [`EpochKey`] can hold, so zero-padded years
/// below [`EpochKey::MIN`] such as `SOSEXPAT-0999-000001` are rejected even
/// though they have the right shape.
///
/// # Example
///
/// ```
/// use gapless::is_valid_format;
///
/// assert!(is_valid_format("SOSEXPAT-2026-000001"));
/// assert!(!is_valid_format("SOSEXPAT-2026-00001"));
/// assert!(!is_valid_format("sosexpat-2026-000001"));
/// assert!(!is_valid_format("SOSEXPAT2026-000001"));
/// assert!(!is_valid_format("SOSEXPAT-0999-000001"));
/// ```
pub fn is_valid_format(s: &str) -> bool {
    OrgTag::SOSEXPAT.is_valid_format(s)
}

/// Decomposes a `SOSEXPAT-YYYY-NNNNNN` identifier into epoch and sequence.
///
/// # Errors
///
/// Returns a [`FormatError`] for any string that [`is_valid_format`] rejects.
///
/// # Example
///
/// ```
/// use gapless::parse;
///
/// let (epoch, sequence) = parse("SOSEXPAT-2026-000042").unwrap();
/// assert_eq!((epoch.year(), sequence), (2026, 42));
/// assert!(parse("SOSEXPAT-2026-0000042").is_err());
/// ```
pub fn parse(s: &str) -> Result<(EpochKey, u32), FormatError> {
    let id = OrgTag::SOSEXPAT.parse(s)?;
    Ok((id.epoch(), id.sequence()))
}

/// Splits `TAG-YYYY-NNNNNN` from the right.
///
/// Only the layout of the numeric suffix and the tag alphabet are checked
/// here; matching the tag against an expected one is the caller's job.
pub(crate) fn split_identifier(s: &str) -> Result<(&str, EpochKey, u32), FormatError> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len <= SUFFIX_LEN {
        return Err(FormatError::TooShort { len });
    }

    let tag_end = len - SUFFIX_LEN;
    let year_start = tag_end + 1;
    let sequence_start = year_start + YEAR_DIGITS + 1;

    expect_separator(bytes, tag_end)?;
    let year = read_digits(bytes, year_start, YEAR_DIGITS)?;
    expect_separator(bytes, sequence_start - 1)?;
    let sequence = read_digits(bytes, sequence_start, SEQUENCE_DIGITS)?;

    // `tag_end` indexes an ASCII '-', so it is a char boundary.
    let tag = &s[..tag_end];
    if !OrgTag::is_valid_tag(tag) {
        return Err(FormatError::InvalidTag {
            tag: tag.to_owned(),
        });
    }

    let year = year as u16;
    let epoch = EpochKey::new(i32::from(year)).map_err(|_| FormatError::EpochOutOfRange { year })?;
    Ok((tag, epoch, sequence))
}

fn expect_separator(bytes: &[u8], index: usize) -> Result<(), FormatError> {
    if bytes[index] == b'-' {
        Ok(())
    } else {
        Err(FormatError::MissingSeparator { index })
    }
}

fn read_digits(bytes: &[u8], start: usize, count: usize) -> Result<u32, FormatError> {
    bytes[start..start + count]
        .iter()
        .enumerate()
        .try_fold(0_u32, |acc, (offset, &byte)| {
            if byte.is_ascii_digit() {
                Ok(acc * 10 + u32::from(byte - b'0'))
            } else {
                Err(FormatError::InvalidDigit {
                    index: start + offset,
                    byte,
                })
            }
        })
}
