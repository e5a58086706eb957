//! Receiver status reply
//!
//! After the payload has been written, the receiver answers with one byte whose
//! low five bits flag link faults it observed. The flags are independent and any
//! combination may be set at once.
//!
//! ```text
//! bit:  7 6 5 | 4  3  2  1  0
//!       unused| FE PE NE UE OE
//! ```

use std::fmt;

/// A single receiver-side link fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFlag {
    /// Framing error (bit 4)
    Framing,
    /// Parity error (bit 3)
    Parity,
    /// Noise error (bit 2)
    Noise,
    /// Underrun error (bit 1)
    Underrun,
    /// Overrun error (bit 0)
    Overrun,
}

impl StatusFlag {
    /// All flags, in reporting order
    pub const ALL: [StatusFlag; 5] = [
        StatusFlag::Framing,
        StatusFlag::Parity,
        StatusFlag::Noise,
        StatusFlag::Underrun,
        StatusFlag::Overrun,
    ];

    /// Bit mask of this flag within the status byte
    pub const fn mask(self) -> u8 {
        match self {
            StatusFlag::Framing => 0x10,
            StatusFlag::Parity => 0x08,
            StatusFlag::Noise => 0x04,
            StatusFlag::Underrun => 0x02,
            StatusFlag::Overrun => 0x01,
        }
    }

    /// Short name used in console reports
    pub const fn abbreviation(self) -> &'static str {
        match self {
            StatusFlag::Framing => "FE",
            StatusFlag::Parity => "PE",
            StatusFlag::Noise => "NE",
            StatusFlag::Underrun => "UE",
            StatusFlag::Overrun => "OE",
        }
    }
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFlag::Framing => "framing error",
            StatusFlag::Parity => "parity error",
            StatusFlag::Noise => "noise error",
            StatusFlag::Underrun => "underrun error",
            StatusFlag::Overrun => "overrun error",
        };
        f.write_str(name)
    }
}

/// Set of [`StatusFlag`]s decoded from a status byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatusFlags(u8);

impl StatusFlags {
    /// Mask of the bits that carry flags
    pub const MASK: u8 = 0x1F;

    /// Decode a raw status byte. Bits above bit 4 are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// The flag bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no flag is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `flag` is set
    pub const fn contains(self, flag: StatusFlag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Number of flags set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Active flags in reporting order (FE, PE, NE, UE, OE)
    pub fn iter(self) -> impl Iterator<Item = StatusFlag> {
        StatusFlag::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    /// Five-slot summary with a `0` in place of every inactive flag,
    /// e.g. `FE, 0, 0, 0, OE`.
    pub fn summary(self) -> String {
        StatusFlag::ALL
            .iter()
            .map(|f| if self.contains(*f) { f.abbreviation() } else { "0" })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<StatusFlag> for StatusFlags {
    fn from_iter<I: IntoIterator<Item = StatusFlag>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |acc, f| acc | f.mask()))
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(StatusFlag::abbreviation).collect();
        f.write_str(&names.join(", "))
    }
}

/// The raw byte sent back by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReply(pub u8);

impl StatusReply {
    /// Decode the flags carried by this reply
    pub const fn flags(self) -> StatusFlags {
        StatusFlags::from_bits(self.0)
    }

    /// A reply is clean only when the whole byte is zero
    pub const fn is_clean(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_every_byte() {
        for b in 0..=u8::MAX {
            let flags = StatusReply(b).flags();
            for flag in StatusFlag::ALL {
                assert_eq!(flags.contains(flag), b & flag.mask() != 0, "byte {b:#04x}");
            }
            assert_eq!(flags.len(), (b & 0x1F).count_ones() as usize);
        }
    }

    #[test]
    fn test_zero_is_clean() {
        let reply = StatusReply(0x00);
        assert!(reply.is_clean());
        assert!(reply.flags().is_empty());
        assert_eq!(reply.flags().iter().count(), 0);
    }

    #[test]
    fn test_all_bits_set() {
        let flags = StatusReply(0xFF).flags();
        assert_eq!(flags.iter().collect::<Vec<_>>(), StatusFlag::ALL.to_vec());
        assert_eq!(flags.bits(), 0x1F);
    }

    #[test]
    fn test_decode_is_deterministic() {
        for b in [0x00, 0x11, 0x1F, 0xA5, 0xFF] {
            assert_eq!(StatusFlags::from_bits(b), StatusFlags::from_bits(b));
        }
    }

    #[test]
    fn test_framing_and_overrun() {
        let flags = StatusReply(0x11).flags();
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![StatusFlag::Framing, StatusFlag::Overrun]
        );
        assert_eq!(flags.summary(), "FE, 0, 0, 0, OE");
        assert_eq!(flags.to_string(), "FE, OE");
    }

    #[test]
    fn test_high_bits_only() {
        // Only unused bits set: the reply is not clean, but carries no flags
        let reply = StatusReply(0xE0);
        assert!(!reply.is_clean());
        assert!(reply.flags().is_empty());
        assert_eq!(reply.flags().summary(), "0, 0, 0, 0, 0");
    }

    #[test]
    fn test_collect_flags() {
        let flags: StatusFlags = [StatusFlag::Parity, StatusFlag::Underrun]
            .into_iter()
            .collect();
        assert_eq!(flags.bits(), 0x0A);
    }
}
