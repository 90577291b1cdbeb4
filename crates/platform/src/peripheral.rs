//! SPI clock/phase configuration shared by every backend family.

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Decode the conventional 0–3 mode number.
    ///
    /// Only the low two bits are significant (bit 1 = CPOL, bit 0 = CPHA).
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Mode0,
            1 => Self::Mode1,
            2 => Self::Mode2,
            _ => Self::Mode3,
        }
    }

    /// Conventional mode number (0–3).
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
            Self::Mode3 => 3,
        }
    }

    /// Clock idles high.
    #[must_use]
    pub const fn cpol(self) -> bool {
        matches!(self, Self::Mode2 | Self::Mode3)
    }

    /// Data is sampled on the trailing clock edge.
    #[must_use]
    pub const fn cpha(self) -> bool {
        matches!(self, Self::Mode1 | Self::Mode3)
    }
}
