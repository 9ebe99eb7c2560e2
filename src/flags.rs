//! Distribution configuration flags (`WSL_DISTRIBUTION_FLAGS`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Bit field describing how a distribution behaves
///
/// Values match `wslapi.h`. The native side may report bits this type has
/// no name for; they survive every conversion untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DistributionFlags(u32);

impl DistributionFlags {
    pub const NONE: Self = Self(0x0);
    /// Allow the distribution to launch Windows processes
    pub const ENABLE_INTEROP: Self = Self(0x1);
    /// Append the Windows `%PATH%` to `$PATH`
    pub const APPEND_NT_PATH: Self = Self(0x2);
    /// Mount Windows drives under `/mnt`
    pub const ENABLE_DRIVE_MOUNTING: Self = Self(0x4);

    /// Every documented bit
    pub const VALID: Self = Self(0x7);
    /// What a freshly registered distribution gets
    pub const DEFAULT: Self = Self(0x7);

    const NAMED: [(Self, &'static str); 3] = [
        (Self::ENABLE_INTEROP, "ENABLE_INTEROP"),
        (Self::APPEND_NT_PATH, "APPEND_NT_PATH"),
        (Self::ENABLE_DRIVE_MOUNTING, "ENABLE_DRIVE_MOUNTING"),
    ];

    /// Wrap a raw value, keeping undocumented bits
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw value passed to the native side
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Bits outside [`Self::VALID`]
    #[inline]
    pub const fn unknown(self) -> Self {
        Self(self.0 & !Self::VALID.0)
    }
}

impl From<u32> for DistributionFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl From<DistributionFlags> for u32 {
    fn from(flags: DistributionFlags) -> Self {
        flags.bits()
    }
}

impl BitOr for DistributionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DistributionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DistributionFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for DistributionFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for DistributionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "DistributionFlags(NONE)");
        }

        write!(f, "DistributionFlags(")?;
        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        let unknown = self.unknown();
        if !unknown.is_empty() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "0x{:x}", unknown.0)?;
        }
        write!(f, ")")
    }
}
