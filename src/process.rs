//! Opaque handle types
//!
//! Handles pass through the adapter untouched. Neither type closes anything
//! on drop; ownership belongs to the caller.

use crate::interop::types::HANDLE;
use core::marker::PhantomData;

/// Process started by [`crate::Wsl::launch`]
///
/// The caller owns the underlying handle and is responsible for closing it.
/// Dropping a `ProcessHandle` leaks it.
#[derive(Debug, PartialEq, Eq)]
pub struct ProcessHandle {
    raw: HANDLE,
}

impl ProcessHandle {
    pub(crate) fn from_raw(raw: HANDLE) -> Self {
        Self { raw }
    }

    #[inline]
    pub fn as_raw(&self) -> HANDLE {
        self.raw
    }

    /// Give up the wrapper and take the raw handle
    #[inline]
    pub fn into_raw(self) -> HANDLE {
        self.raw
    }

    /// Move the handle into a closing `OwnedHandle`
    #[cfg(windows)]
    pub fn into_owned_handle(self) -> std::os::windows::io::OwnedHandle {
        use std::os::windows::io::FromRawHandle;

        // SAFETY: WslLaunch hands us exclusive ownership of a valid process handle
        unsafe { std::os::windows::io::OwnedHandle::from_raw_handle(self.into_raw()) }
    }
}

unsafe impl Send for ProcessHandle {}

/// Standard stream handle lent to a launched process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoHandle<'a> {
    raw: HANDLE,
    _borrow: PhantomData<&'a ()>,
}

impl<'a> IoHandle<'a> {
    /// No handle
    pub const fn null() -> Self {
        Self {
            raw: core::ptr::null_mut(),
            _borrow: PhantomData,
        }
    }

    /// Wrap a raw handle
    ///
    /// # Safety
    /// `raw` must stay valid for `'a`, or be null.
    pub const unsafe fn from_raw(raw: HANDLE) -> Self {
        Self {
            raw,
            _borrow: PhantomData,
        }
    }

    #[inline]
    pub fn as_raw(&self) -> HANDLE {
        self.raw
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}

impl Default for IoHandle<'_> {
    fn default() -> Self {
        Self::null()
    }
}

#[cfg(windows)]
impl<'a> From<std::os::windows::io::BorrowedHandle<'a>> for IoHandle<'a> {
    fn from(handle: std::os::windows::io::BorrowedHandle<'a>) -> Self {
        use std::os::windows::io::AsRawHandle;

        // SAFETY: the borrow keeps the handle open for 'a
        unsafe { Self::from_raw(handle.as_raw_handle()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_io_handle() {
        let handle = IoHandle::default();
        assert!(handle.is_null());
        assert_eq!(handle, IoHandle::null());
    }

    #[test]
    fn test_process_handle_passthrough() {
        let raw = 0x1234 as HANDLE;
        let process = ProcessHandle::from_raw(raw);
        assert_eq!(process.as_raw(), raw);
        assert_eq!(process.into_raw(), raw);
    }
}
