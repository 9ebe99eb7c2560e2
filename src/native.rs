//! Native seam - the raw WSL entry points
//!
//! [`NativeApi`] has the exact ABI shape of `wslapi.h` plus the COM task
//! allocator's release function. [`WslApi`] is the real backend; anything
//! else implementing the trait (such as an in-memory fake) can stand in for it.

use crate::config::LibraryConfig;
use crate::error::LoadError;
use crate::interop::library::Library;
use crate::interop::types::{BOOL, HANDLE, HRESULT, PCWSTR, PWSTR};
use core::ffi::c_void;

pub const WSL_CONFIGURE_DISTRIBUTION: &str = "WslConfigureDistribution";
pub const WSL_GET_DISTRIBUTION_CONFIGURATION: &str = "WslGetDistributionConfiguration";
pub const WSL_IS_DISTRIBUTION_REGISTERED: &str = "WslIsDistributionRegistered";
pub const WSL_LAUNCH: &str = "WslLaunch";
pub const WSL_LAUNCH_INTERACTIVE: &str = "WslLaunchInteractive";
pub const WSL_REGISTER_DISTRIBUTION: &str = "WslRegisterDistribution";
pub const WSL_UNREGISTER_DISTRIBUTION: &str = "WslUnregisterDistribution";

/// Raw native interface
///
/// # Safety
/// All methods take raw pointers with the same contracts as the documented
/// `wslapi.h` functions: strings are null-terminated UTF-16 that outlive the
/// call, and out-pointers are valid for writes. Memory handed back through
/// out-pointers must be releasable with [`NativeApi::free`].
pub trait NativeApi {
    unsafe fn configure_distribution(
        &self,
        name: PCWSTR,
        default_uid: u32,
        flags: u32,
    ) -> HRESULT;

    unsafe fn get_distribution_configuration(
        &self,
        name: PCWSTR,
        version: *mut u32,
        default_uid: *mut u32,
        flags: *mut u32,
        environment: *mut *mut PWSTR,
        environment_count: *mut u32,
    ) -> HRESULT;

    unsafe fn is_distribution_registered(&self, name: PCWSTR) -> BOOL;

    #[allow(clippy::too_many_arguments)]
    unsafe fn launch(
        &self,
        name: PCWSTR,
        command: PCWSTR,
        use_current_working_directory: BOOL,
        stdin: HANDLE,
        stdout: HANDLE,
        stderr: HANDLE,
        process: *mut HANDLE,
    ) -> HRESULT;

    unsafe fn launch_interactive(
        &self,
        name: PCWSTR,
        command: PCWSTR,
        use_current_working_directory: BOOL,
        exit_code: *mut u32,
    ) -> HRESULT;

    unsafe fn register_distribution(&self, name: PCWSTR, tar_gz_filename: PCWSTR) -> HRESULT;

    unsafe fn unregister_distribution(&self, name: PCWSTR) -> HRESULT;

    /// Release memory the native side allocated for an out-parameter
    unsafe fn free(&self, ptr: *mut c_void);
}

type ConfigureFn = unsafe extern "system" fn(PCWSTR, u32, u32) -> HRESULT;
type GetConfigurationFn = unsafe extern "system" fn(
    PCWSTR,
    *mut u32,
    *mut u32,
    *mut u32,
    *mut *mut PWSTR,
    *mut u32,
) -> HRESULT;
type IsRegisteredFn = unsafe extern "system" fn(PCWSTR) -> BOOL;
type LaunchFn =
    unsafe extern "system" fn(PCWSTR, PCWSTR, BOOL, HANDLE, HANDLE, HANDLE, *mut HANDLE) -> HRESULT;
type LaunchInteractiveFn = unsafe extern "system" fn(PCWSTR, PCWSTR, BOOL, *mut u32) -> HRESULT;
type RegisterFn = unsafe extern "system" fn(PCWSTR, PCWSTR) -> HRESULT;
type UnregisterFn = unsafe extern "system" fn(PCWSTR) -> HRESULT;

/// Entry points resolved from `wslapi.dll`
///
/// Every symbol is resolved once at load; a missing one fails the load.
pub struct WslApi {
    configure: ConfigureFn,
    get_configuration: GetConfigurationFn,
    is_registered: IsRegisteredFn,
    launch: LaunchFn,
    launch_interactive: LaunchInteractiveFn,
    register: RegisterFn,
    unregister: UnregisterFn,
    // Keeps the function pointers above valid
    library: Library,
}

impl WslApi {
    /// Load from the default location (`wslapi.dll` on the search path)
    pub fn load() -> Result<Self, LoadError> {
        Self::load_with(&LibraryConfig::default())
    }

    pub fn load_with(config: &LibraryConfig) -> Result<Self, LoadError> {
        let library = Library::load(&config.wslapi)?;

        unsafe {
            Ok(Self {
                configure: resolve(&library, WSL_CONFIGURE_DISTRIBUTION)?,
                get_configuration: resolve(&library, WSL_GET_DISTRIBUTION_CONFIGURATION)?,
                is_registered: resolve(&library, WSL_IS_DISTRIBUTION_REGISTERED)?,
                launch: resolve(&library, WSL_LAUNCH)?,
                launch_interactive: resolve(&library, WSL_LAUNCH_INTERACTIVE)?,
                register: resolve(&library, WSL_REGISTER_DISTRIBUTION)?,
                unregister: resolve(&library, WSL_UNREGISTER_DISTRIBUTION)?,
                library,
            })
        }
    }
}

unsafe fn resolve<F: Copy>(library: &Library, name: &'static str) -> Result<F, LoadError> {
    library
        .function::<F>(name)
        .map_err(|source| LoadError::Symbol { name, source })
}

impl core::fmt::Debug for WslApi {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WslApi").field("library", &self.library).finish()
    }
}

impl NativeApi for WslApi {
    unsafe fn configure_distribution(
        &self,
        name: PCWSTR,
        default_uid: u32,
        flags: u32,
    ) -> HRESULT {
        (self.configure)(name, default_uid, flags)
    }

    unsafe fn get_distribution_configuration(
        &self,
        name: PCWSTR,
        version: *mut u32,
        default_uid: *mut u32,
        flags: *mut u32,
        environment: *mut *mut PWSTR,
        environment_count: *mut u32,
    ) -> HRESULT {
        (self.get_configuration)(name, version, default_uid, flags, environment, environment_count)
    }

    unsafe fn is_distribution_registered(&self, name: PCWSTR) -> BOOL {
        (self.is_registered)(name)
    }

    unsafe fn launch(
        &self,
        name: PCWSTR,
        command: PCWSTR,
        use_current_working_directory: BOOL,
        stdin: HANDLE,
        stdout: HANDLE,
        stderr: HANDLE,
        process: *mut HANDLE,
    ) -> HRESULT {
        (self.launch)(name, command, use_current_working_directory, stdin, stdout, stderr, process)
    }

    unsafe fn launch_interactive(
        &self,
        name: PCWSTR,
        command: PCWSTR,
        use_current_working_directory: BOOL,
        exit_code: *mut u32,
    ) -> HRESULT {
        (self.launch_interactive)(name, command, use_current_working_directory, exit_code)
    }

    unsafe fn register_distribution(&self, name: PCWSTR, tar_gz_filename: PCWSTR) -> HRESULT {
        (self.register)(name, tar_gz_filename)
    }

    unsafe fn unregister_distribution(&self, name: PCWSTR) -> HRESULT {
        (self.unregister)(name)
    }

    #[cfg(windows)]
    unsafe fn free(&self, ptr: *mut c_void) {
        winapi::um::combaseapi::CoTaskMemFree(ptr.cast());
    }

    // The real API never loads here; match whatever allocator dlopen'd code uses
    #[cfg(not(windows))]
    unsafe fn free(&self, ptr: *mut c_void) {
        libc::free(ptr);
    }
}
