//! Discriminant encoding for variants.
//!
//! A variant over `N` alternatives stores a single `usize` tag:
//!
//! - `0..N`: the variant is valid and holds the alternative at that position
//! - `N..N + InvalidReason::COUNT`: the variant is poisoned, and the offset
//!   `tag - N` is the [`InvalidReason`]
//!
//! Tags outside both ranges are never produced by this crate. When decoding
//! one anyway, it is read as [`InvalidReason::Unknown`].

use core::fmt;

/// Why a variant holds no value.
///
/// The discriminants are the offsets past the number of alternatives at which
/// each reason is stored in the tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// Copying a value into the variant panicked.
    CopyThrew = 0,
    /// Moving a value into the variant failed.
    MoveThrew = 1,
    /// The value was moved out of the variant.
    MovedFrom = 2,
    /// The state of the variant is unknown, for instance because a destructor
    /// panicked.
    Unknown = 3,
}

impl InvalidReason {
    /// The number of reasons, and so the number of tags reserved past the
    /// alternatives.
    pub const COUNT: usize = 4;

    /// All reasons, ordered by offset.
    pub const ALL: [Self; Self::COUNT] = [
        Self::CopyThrew,
        Self::MoveThrew,
        Self::MovedFrom,
        Self::Unknown,
    ];

    /// The offset of this reason past the last alternative.
    #[inline]
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// The reason stored at `offset` past the last alternative.
    ///
    /// Offsets of [`InvalidReason::COUNT`] or more decode as
    /// [`InvalidReason::Unknown`].
    #[inline]
    pub const fn from_offset(offset: usize) -> Self {
        match offset {
            0 => Self::CopyThrew,
            1 => Self::MoveThrew,
            2 => Self::MovedFrom,
            _ => Self::Unknown,
        }
    }

    /// A human-readable description of the reason.
    pub const fn description(self) -> &'static str {
        match self {
            Self::CopyThrew => "variant is invalid because a copy operation panicked",
            Self::MoveThrew => "variant is invalid because a move operation failed",
            Self::MovedFrom => "variant is invalid because its value was moved out",
            Self::Unknown => "variant is in an unknown invalid state",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The decoded form of a tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// The variant holds the alternative at this position.
    Valid(usize),
    /// The variant holds no value.
    Invalid(InvalidReason),
}

impl State {
    /// Decodes `tag` for a variant with `len` alternatives.
    #[inline]
    pub const fn from_tag(tag: usize, len: usize) -> Self {
        if tag < len {
            Self::Valid(tag)
        } else {
            Self::Invalid(InvalidReason::from_offset(tag - len))
        }
    }

    /// Encodes this state for a variant with `len` alternatives.
    #[inline]
    pub const fn to_tag(self, len: usize) -> usize {
        match self {
            Self::Valid(index) => index,
            Self::Invalid(reason) => len + reason.offset(),
        }
    }

    /// Returns `true` if the variant holds a value.
    #[inline]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the position of the held alternative, if any.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Valid(index) => Some(index),
            Self::Invalid(_) => None,
        }
    }

    /// Returns the poison reason, if any.
    #[inline]
    pub const fn invalid_reason(self) -> Option<InvalidReason> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_dense() {
        for (offset, reason) in InvalidReason::ALL.into_iter().enumerate() {
            assert_eq!(reason.offset(), offset);
            assert_eq!(InvalidReason::from_offset(offset), reason);
        }
        assert_eq!(
            InvalidReason::from_offset(InvalidReason::COUNT),
            InvalidReason::Unknown
        );
        assert_eq!(
            InvalidReason::from_offset(usize::MAX),
            InvalidReason::Unknown
        );
    }

    #[test]
    fn test_tag_layout() {
        // Three alternatives: tags 0..3 are valid, 3..7 are the reasons
        assert_eq!(State::from_tag(0, 3), State::Valid(0));
        assert_eq!(State::from_tag(2, 3), State::Valid(2));
        assert_eq!(
            State::from_tag(3, 3),
            State::Invalid(InvalidReason::CopyThrew)
        );
        assert_eq!(
            State::from_tag(5, 3),
            State::Invalid(InvalidReason::MovedFrom)
        );
        assert_eq!(
            State::from_tag(6, 3),
            State::Invalid(InvalidReason::Unknown)
        );
        assert_eq!(
            State::from_tag(40, 3),
            State::Invalid(InvalidReason::Unknown)
        );

        assert_eq!(State::Invalid(InvalidReason::MoveThrew).to_tag(3), 4);
        assert_eq!(State::Valid(1).to_tag(3), 1);
    }

    #[test]
    fn test_round_trip_every_tag() {
        let len = 2;
        for tag in 0..len + InvalidReason::COUNT {
            assert_eq!(State::from_tag(tag, len).to_tag(len), tag);
        }
    }

    #[test]
    fn test_accessors() {
        let valid = State::Valid(1);
        assert!(valid.is_valid());
        assert_eq!(valid.index(), Some(1));
        assert_eq!(valid.invalid_reason(), None);

        let invalid = State::Invalid(InvalidReason::CopyThrew);
        assert!(!invalid.is_valid());
        assert_eq!(invalid.index(), None);
        assert_eq!(invalid.invalid_reason(), Some(InvalidReason::CopyThrew));
    }

    #[test]
    fn test_descriptions_are_distinct() {
        for (i, a) in InvalidReason::ALL.into_iter().enumerate() {
            for b in &InvalidReason::ALL[i + 1..] {
                assert_ne!(a.description(), b.description());
            }
        }
        assert_eq!(
            InvalidReason::Unknown.description(),
            "variant is in an unknown invalid state"
        );
    }
}
