//! Type definitions for the WSL native ABI
//!
//! Mirrors the shapes used by `wslapi.h` so the same signatures compile on
//! every host, even though the real library only exists on Windows.

use core::ffi::c_void;

/// Win32 status code (`HRESULT`)
pub type HRESULT = i32;

/// Win32 boolean (`BOOL`), zero is false
pub type BOOL = i32;

/// Opaque kernel object handle (`HANDLE`)
pub type HANDLE = *mut c_void;

/// Pointer to a null-terminated UTF-16 string the callee only reads
pub type PCWSTR = *const u16;

/// Pointer to a null-terminated UTF-16 string owned by the native allocator
pub type PWSTR = *mut u16;

pub const TRUE: BOOL = 1;
pub const FALSE: BOOL = 0;

#[inline]
pub const fn to_bool(value: bool) -> BOOL {
    if value {
        TRUE
    } else {
        FALSE
    }
}

#[inline]
pub const fn from_bool(value: BOOL) -> bool {
    value != FALSE
}

/// Owned null-terminated UTF-16 buffer
///
/// Built by [`super::marshal::to_wide`]; the terminator is always the last
/// code unit and no other unit is zero.
#[derive(Clone, PartialEq, Eq)]
pub struct WideString {
    units: Vec<u16>,
}

impl WideString {
    /// Caller guarantees `units` ends in exactly one trailing NUL.
    pub(crate) fn from_units_with_nul(units: Vec<u16>) -> Self {
        debug_assert_eq!(units.last(), Some(&0));
        Self { units }
    }

    /// Pointer valid for as long as `self` is alive
    #[inline]
    pub fn as_ptr(&self) -> PCWSTR {
        self.units.as_ptr()
    }

    /// Code units without the terminator
    #[inline]
    pub fn as_units(&self) -> &[u16] {
        &self.units[..self.units.len() - 1]
    }

    /// Length in code units, excluding the terminator
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for WideString {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "WideString({:?})", String::from_utf16_lossy(self.as_units()))
    }
}
