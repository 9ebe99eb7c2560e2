//! Dynamic library loading and symbol resolution
//!
//! Platform-agnostic wrapper around dlopen/LoadLibrary.

use crate::error::LoadError;
use core::ffi::c_void;
use core::ptr::NonNull;

#[cfg(unix)]
use std::ffi::CString;

/// Handle to dynamically loaded library
pub struct Library {
    handle: NonNull<c_void>,
    name: String,
}

impl Library {
    /// Load library by name or absolute path
    ///
    /// Bare names go through the platform's standard search order.
    pub fn load(name: &str) -> Result<Self, LoadError> {
        let handle = Self::load_impl(name)?;
        tracing::debug!(target: "native", library = name, "library loaded");
        Ok(Self {
            handle,
            name: name.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(unix)]
    fn load_impl(name: &str) -> Result<NonNull<c_void>, LoadError> {
        let cname = CString::new(name).map_err(|_| LoadError::InvalidName)?;

        unsafe {
            let handle = libc::dlopen(cname.as_ptr(), libc::RTLD_NOW);
            NonNull::new(handle).ok_or_else(|| {
                let err = libc::dlerror();
                let msg = if !err.is_null() {
                    std::ffi::CStr::from_ptr(err).to_string_lossy().into_owned()
                } else {
                    "Unknown error".into()
                };
                LoadError::LoadFailed(msg)
            })
        }
    }

    #[cfg(windows)]
    fn load_impl(name: &str) -> Result<NonNull<c_void>, LoadError> {
        use winapi::um::errhandlingapi::GetLastError;
        use winapi::um::libloaderapi::LoadLibraryW;

        let wide = super::marshal::to_wide("library", name).map_err(|_| LoadError::InvalidName)?;

        unsafe {
            let handle = LoadLibraryW(wide.as_ptr());
            NonNull::new(handle.cast::<c_void>()).ok_or_else(|| {
                let code = GetLastError();
                LoadError::LoadFailed(format!("{}: error code {}", name, code))
            })
        }
    }

    /// Get raw symbol address by name
    pub fn symbol(&self, name: &str) -> Result<NonNull<c_void>, SymbolError> {
        self.symbol_impl(name)
    }

    /// Resolve a symbol as a function pointer of type `F`
    ///
    /// # Safety
    /// `F` must be a function pointer type whose signature and calling
    /// convention match the exported symbol.
    pub unsafe fn function<F: Copy>(&self, name: &str) -> Result<F, SymbolError> {
        debug_assert_eq!(
            core::mem::size_of::<F>(),
            core::mem::size_of::<*const c_void>(),
            "function pointer type expected"
        );
        let ptr = self.symbol(name)?.as_ptr() as *const c_void;
        Ok(core::mem::transmute_copy::<*const c_void, F>(&ptr))
    }

    #[cfg(unix)]
    fn symbol_impl(&self, name: &str) -> Result<NonNull<c_void>, SymbolError> {
        let cname = CString::new(name).map_err(|_| SymbolError::InvalidName)?;

        unsafe {
            let ptr = libc::dlsym(self.handle.as_ptr(), cname.as_ptr());
            NonNull::new(ptr).ok_or(SymbolError::NotFound)
        }
    }

    #[cfg(windows)]
    fn symbol_impl(&self, name: &str) -> Result<NonNull<c_void>, SymbolError> {
        use std::ffi::CString;
        use winapi::um::libloaderapi::GetProcAddress;

        let cname = CString::new(name).map_err(|_| SymbolError::InvalidName)?;

        unsafe {
            let ptr = GetProcAddress(self.handle.as_ptr().cast(), cname.as_ptr());
            NonNull::new(ptr.cast::<c_void>()).ok_or(SymbolError::NotFound)
        }
    }
}

impl Drop for Library {
    #[cfg(unix)]
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        use winapi::um::libloaderapi::FreeLibrary;

        unsafe {
            FreeLibrary(self.handle.as_ptr().cast());
        }
    }
}

impl core::fmt::Debug for Library {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Library").field("name", &self.name).finish()
    }
}

unsafe impl Send for Library {}
unsafe impl Sync for Library {}

/// Symbol lookup errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    InvalidName,
    NotFound,
}

impl core::fmt::Display for SymbolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "Invalid symbol name"),
            Self::NotFound => write!(f, "Symbol not found"),
        }
    }
}

impl std::error::Error for SymbolError {}
