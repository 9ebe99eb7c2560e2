//! Error types for the adapter
//!
//! Operations fail in exactly two ways: an argument could not be encoded for
//! the native side (no call was made), or the native call returned a failing
//! status. Backend construction and configuration have their own errors.

use crate::interop::library::SymbolError;
use crate::interop::types::HRESULT;
use std::fmt;

/// Native status code, opaque beyond its success/failure sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct HResult(pub HRESULT);

impl HResult {
    pub const S_OK: Self = Self(0);
    /// Invalid pointer
    pub const E_POINTER: Self = Self(0x8000_4003_u32 as i32);
    /// Unspecified failure
    pub const E_FAIL: Self = Self(0x8000_4005_u32 as i32);
    pub const E_INVALIDARG: Self = Self(0x8007_0057_u32 as i32);

    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// Bit pattern as the Windows SDK prints it
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }
}

impl From<HRESULT> for HResult {
    fn from(code: HRESULT) -> Self {
        Self(code)
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.as_u32())
    }
}

/// Why an argument could not be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingErrorKind {
    /// NUL code unit at this index would truncate the string natively
    InteriorNul { position: usize },
    /// Path is not representable as Unicode on this host
    NotUnicode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
    /// Which argument was rejected (e.g. "name", "command")
    pub argument: &'static str,
    pub kind: EncodingErrorKind,
}

impl EncodingError {
    pub fn interior_nul(argument: &'static str, position: usize) -> Self {
        Self {
            argument,
            kind: EncodingErrorKind::InteriorNul { position },
        }
    }

    pub fn not_unicode(argument: &'static str) -> Self {
        Self {
            argument,
            kind: EncodingErrorKind::NotUnicode,
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EncodingErrorKind::InteriorNul { position } => write!(
                f,
                "Cannot encode {}: interior NUL at code unit {}",
                self.argument, position
            ),
            EncodingErrorKind::NotUnicode => {
                write!(f, "Cannot encode {}: not valid Unicode", self.argument)
            }
        }
    }
}

impl std::error::Error for EncodingError {}

/// Error returned by every adapter operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WslError {
    /// Rejected before any native call was attempted
    Encoding(EncodingError),
    /// Native entry point reported failure
    NativeCall { function: &'static str, code: HResult },
}

impl WslError {
    pub fn native(function: &'static str, code: HResult) -> Self {
        Self::NativeCall { function, code }
    }

    /// Native status if the failure came from the native side
    pub fn code(&self) -> Option<HResult> {
        match self {
            Self::Encoding(_) => None,
            Self::NativeCall { code, .. } => Some(*code),
        }
    }

    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}

impl fmt::Display for WslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding(err) => write!(f, "{}", err),
            Self::NativeCall { function, code } => {
                write!(f, "{} failed with {}", function, code)
            }
        }
    }
}

impl std::error::Error for WslError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::NativeCall { .. } => None,
        }
    }
}

impl From<EncodingError> for WslError {
    fn from(err: EncodingError) -> Self {
        Self::Encoding(err)
    }
}

/// Failure to bring up a native backend
#[derive(Debug)]
pub enum LoadError {
    InvalidName,
    LoadFailed(String),
    Symbol { name: &'static str, source: SymbolError },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName => write!(f, "Invalid library name"),
            Self::LoadFailed(msg) => write!(f, "Failed to load library: {}", msg),
            Self::Symbol { name, source } => {
                write!(f, "Failed to resolve {}: {}", name, source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Symbol { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hresult_sign() {
        assert!(HResult::S_OK.is_success());
        assert!(HResult(1).is_success());
        assert!(HResult::E_FAIL.is_failure());
        assert!(!HResult::E_POINTER.is_success());
    }

    #[test]
    fn test_hresult_display() {
        assert_eq!(HResult::E_POINTER.to_string(), "0x80004003");
        assert_eq!(HResult::S_OK.to_string(), "0x00000000");
    }

    #[test]
    fn test_error_display() {
        let err = WslError::native("WslLaunch", HResult::E_INVALIDARG);
        assert_eq!(err.to_string(), "WslLaunch failed with 0x80070057");
        assert_eq!(err.code(), Some(HResult::E_INVALIDARG));

        let err: WslError = EncodingError::interior_nul("name", 3).into();
        assert!(err.is_encoding());
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "Cannot encode name: interior NUL at code unit 3");
    }
}
