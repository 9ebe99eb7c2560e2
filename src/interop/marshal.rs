//! Type marshaling - Rust strings ↔ native wide strings
//!
//! Design: encoding is checked up front so a bad argument never reaches the
//! native side. Decoding scans for the terminator with no length bound.

use super::types::{WideString, PCWSTR, PWSTR};
use crate::error::{EncodingError, HResult, WslError};
use crate::logging::{log_release, log_type_conversion};
use crate::native::NativeApi;
use std::path::Path;

/// Encode a string as null-terminated UTF-16
///
/// Fails if the string contains a NUL, which the native side would read as
/// the end of the string.
pub fn to_wide(argument: &'static str, value: &str) -> Result<WideString, EncodingError> {
    let mut units: Vec<u16> = Vec::with_capacity(value.len() + 1);
    for (position, unit) in value.encode_utf16().enumerate() {
        if unit == 0 {
            return Err(EncodingError::interior_nul(argument, position));
        }
        units.push(unit);
    }
    units.push(0);

    log_type_conversion("str", "PCWSTR");
    Ok(WideString::from_units_with_nul(units))
}

/// Encode a filesystem path as null-terminated UTF-16
///
/// On Windows the path's native wide form is used as-is, so any path the OS
/// accepts is representable. Elsewhere the path must be valid UTF-8.
pub fn path_to_wide(argument: &'static str, path: &Path) -> Result<WideString, EncodingError> {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;

        let mut units: Vec<u16> = Vec::new();
        for (position, unit) in path.as_os_str().encode_wide().enumerate() {
            if unit == 0 {
                return Err(EncodingError::interior_nul(argument, position));
            }
            units.push(unit);
        }
        units.push(0);

        log_type_conversion("Path", "PCWSTR");
        Ok(WideString::from_units_with_nul(units))
    }

    #[cfg(not(windows))]
    {
        let value = path
            .to_str()
            .ok_or_else(|| EncodingError::not_unicode(argument))?;
        to_wide(argument, value)
    }
}

/// Count code units before the terminator
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated run of `u16`.
#[inline]
pub unsafe fn wide_len(ptr: PCWSTR) -> usize {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    len
}

/// Decode a null-terminated wide string, lossily replacing bad surrogates
///
/// A null pointer decodes to the empty string.
///
/// # Safety
/// If non-null, `ptr` must point to a NUL-terminated run of `u16` that stays
/// valid for the duration of the call.
pub unsafe fn from_wide_ptr(ptr: PCWSTR) -> String {
    if ptr.is_null() {
        return String::new();
    }

    let units = core::slice::from_raw_parts(ptr, wide_len(ptr));
    String::from_utf16_lossy(units)
}

/// Decode and release a native array of native wide strings
///
/// `count` comes from the native call itself; nothing about the pointers
/// tells where the array ends. Each element is released through
/// [`NativeApi::free`] right after it is decoded, then the array itself is
/// released. Output order matches array order.
///
/// A null `base` with a non-zero `count` is reported as an `E_POINTER`
/// failure of `function` without touching memory.
///
/// # Safety
/// If non-null, `base` must point to `count` readable `PWSTR` slots, and each
/// non-null slot must satisfy [`from_wide_ptr`]. The array and every element
/// must have been allocated by the allocator behind `native.free`, and the
/// caller must not use any of them afterwards.
pub unsafe fn take_wide_string_array<N: NativeApi + ?Sized>(
    native: &N,
    function: &'static str,
    base: *mut PWSTR,
    count: u32,
) -> Result<Vec<String>, WslError> {
    if base.is_null() {
        if count == 0 {
            return Ok(Vec::new());
        }
        return Err(WslError::native(function, HResult::E_POINTER));
    }

    let count = count as usize;
    let mut strings = Vec::with_capacity(count);

    for i in 0..count {
        let element = *base.add(i);
        strings.push(from_wide_ptr(element));

        if !element.is_null() {
            native.free(element.cast());
            log_release(element as *const u8);
        }
    }

    native.free(base.cast());
    log_release(base as *const u8);

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodingErrorKind;

    #[test]
    fn test_to_wide_terminates() {
        let wide = to_wide("name", "Ubuntu").unwrap();
        assert_eq!(wide.len(), 6);
        assert_eq!(wide.as_units(), &"Ubuntu".encode_utf16().collect::<Vec<_>>()[..]);
        unsafe {
            assert_eq!(*wide.as_ptr().add(6), 0);
        }
    }

    #[test]
    fn test_to_wide_empty() {
        let wide = to_wide("name", "").unwrap();
        assert!(wide.is_empty());
        unsafe {
            assert_eq!(*wide.as_ptr(), 0);
        }
    }

    #[test]
    fn test_to_wide_rejects_nul() {
        let err = to_wide("command", "ls\0-la").unwrap_err();
        assert_eq!(err.argument, "command");
        assert_eq!(err.kind, EncodingErrorKind::InteriorNul { position: 2 });
    }

    #[test]
    fn test_to_wide_counts_code_units() {
        // U+1F600 is a surrogate pair, so the NUL sits at unit 3
        let err = to_wide("name", "\u{1F600}a\0").unwrap_err();
        assert_eq!(err.kind, EncodingErrorKind::InteriorNul { position: 3 });
    }

    #[test]
    fn test_from_wide_ptr_roundtrip() {
        let wide = to_wide("name", "Debian GNU/Linux \u{00E9}\u{1F427}").unwrap();
        let back = unsafe { from_wide_ptr(wide.as_ptr()) };
        assert_eq!(back, "Debian GNU/Linux \u{00E9}\u{1F427}");
    }

    #[test]
    fn test_from_wide_ptr_null() {
        assert_eq!(unsafe { from_wide_ptr(core::ptr::null()) }, "");
    }

    #[test]
    fn test_from_wide_ptr_lone_surrogate() {
        let units = [0x0041u16, 0xD800, 0x0042, 0];
        let decoded = unsafe { from_wide_ptr(units.as_ptr()) };
        assert_eq!(decoded, "A\u{FFFD}B");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_path_to_wide_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/tmp/\xFFrootfs.tar.gz"));
        let err = path_to_wide("archive path", path).unwrap_err();
        assert_eq!(err.kind, EncodingErrorKind::NotUnicode);
    }

    #[test]
    fn test_path_to_wide() {
        let wide = path_to_wide("archive path", Path::new("rootfs.tar.gz")).unwrap();
        assert_eq!(unsafe { from_wide_ptr(wide.as_ptr()) }, "rootfs.tar.gz");
    }
}
