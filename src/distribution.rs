//! Distribution operations
//!
//! One method per WSL entry point. Each method encodes its arguments, makes
//! one native call, and converts the result.

use crate::config::AdapterConfig;
use crate::error::{HResult, LoadError, WslError};
use crate::flags::DistributionFlags;
use crate::interop::marshal::{path_to_wide, take_wide_string_array, to_wide};
use crate::interop::types::{from_bool, to_bool, HANDLE, HRESULT, PWSTR};
use crate::logging::{log_encoding_error, log_native_call, log_native_error, log_native_return};
use crate::native::{self, NativeApi, WslApi};
use crate::process::{IoHandle, ProcessHandle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug_span, warn};

/// Settings reported by `WslGetDistributionConfiguration`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfiguration {
    /// WSL version the distribution runs under
    pub version: u32,
    pub default_uid: u32,
    pub flags: DistributionFlags,
    /// `KEY=value` strings in native order
    pub environment: Vec<String>,
}

/// Typed front end over a [`NativeApi`] backend
#[derive(Debug)]
pub struct Wsl<N = WslApi> {
    native: N,
}

impl Wsl<WslApi> {
    /// Load `wslapi.dll` from the standard search path
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self::new(WslApi::load()?))
    }

    pub fn from_config(config: &AdapterConfig) -> Result<Self, LoadError> {
        Ok(Self::new(WslApi::load_with(&config.library)?))
    }
}

impl<N: NativeApi> Wsl<N> {
    pub fn new(native: N) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    /// Set the default user and behavior flags of a distribution
    pub fn configure_distribution(
        &self,
        name: &str,
        default_uid: u32,
        flags: DistributionFlags,
    ) -> Result<(), WslError> {
        let function = native::WSL_CONFIGURE_DISTRIBUTION;
        let _span = debug_span!("WslConfigureDistribution", name, default_uid, ?flags).entered();

        let wide_name = encode(function, to_wide("name", name))?;

        let code = call(function, || unsafe {
            self.native
                .configure_distribution(wide_name.as_ptr(), default_uid, flags.bits())
        });
        check(function, code)
    }

    /// Read back a distribution's configuration and default environment
    pub fn get_distribution_configuration(
        &self,
        name: &str,
    ) -> Result<DistributionConfiguration, WslError> {
        let function = native::WSL_GET_DISTRIBUTION_CONFIGURATION;
        let _span = debug_span!("WslGetDistributionConfiguration", name).entered();

        let wide_name = encode(function, to_wide("name", name))?;

        let mut version = 0u32;
        let mut default_uid = 0u32;
        let mut flags = 0u32;
        let mut environment: *mut PWSTR = core::ptr::null_mut();
        let mut environment_count = 0u32;

        let code = call(function, || unsafe {
            self.native.get_distribution_configuration(
                wide_name.as_ptr(),
                &mut version,
                &mut default_uid,
                &mut flags,
                &mut environment,
                &mut environment_count,
            )
        });
        check(function, code)?;

        // SAFETY: on success the native side hands over `environment_count`
        // CoTaskMem-allocated strings in a CoTaskMem-allocated array
        let environment = unsafe {
            take_wide_string_array(&self.native, function, environment, environment_count)
        }
        .map_err(|e| {
            log_native_error(function, &e);
            e
        })?;

        Ok(DistributionConfiguration {
            version,
            default_uid,
            flags: DistributionFlags::from_bits(flags),
            environment,
        })
    }

    /// Whether `name` is registered
    ///
    /// A name that cannot be encoded can never be registered, so it reports
    /// `false` instead of an error. Use
    /// [`try_is_distribution_registered`](Self::try_is_distribution_registered)
    /// to see the encoding failure.
    pub fn is_distribution_registered(&self, name: &str) -> bool {
        match self.try_is_distribution_registered(name) {
            Ok(registered) => registered,
            Err(err) => {
                warn!(target: "marshal", error = %err, "treating unencodable name as unregistered");
                false
            }
        }
    }

    /// Whether `name` is registered, reporting encoding failure as an error
    pub fn try_is_distribution_registered(&self, name: &str) -> Result<bool, WslError> {
        let function = native::WSL_IS_DISTRIBUTION_REGISTERED;
        let _span = debug_span!("WslIsDistributionRegistered", name).entered();

        let wide_name = encode(function, to_wide("name", name))?;

        log_native_call(function);
        let registered =
            from_bool(unsafe { self.native.is_distribution_registered(wide_name.as_ptr()) });
        tracing::trace!(target: "native", function, registered, "native return");
        Ok(registered)
    }

    /// Start a process in a distribution without waiting for it
    ///
    /// The stream handles are passed through as-is. The returned handle is
    /// owned by the caller.
    pub fn launch(
        &self,
        name: &str,
        command: &str,
        use_current_working_directory: bool,
        stdin: IoHandle<'_>,
        stdout: IoHandle<'_>,
        stderr: IoHandle<'_>,
    ) -> Result<ProcessHandle, WslError> {
        let function = native::WSL_LAUNCH;
        let _span =
            debug_span!("WslLaunch", name, command, use_current_working_directory).entered();

        let wide_name = encode(function, to_wide("name", name))?;
        let wide_command = encode(function, to_wide("command", command))?;

        let mut process: HANDLE = core::ptr::null_mut();
        let code = call(function, || unsafe {
            self.native.launch(
                wide_name.as_ptr(),
                wide_command.as_ptr(),
                to_bool(use_current_working_directory),
                stdin.as_raw(),
                stdout.as_raw(),
                stderr.as_raw(),
                &mut process,
            )
        });
        check(function, code)?;

        Ok(ProcessHandle::from_raw(process))
    }

    /// Run a process attached to the current console and wait for it
    ///
    /// Blocks the calling thread until the process exits and returns its
    /// exit code.
    pub fn launch_interactive(
        &self,
        name: &str,
        command: &str,
        use_current_working_directory: bool,
    ) -> Result<u32, WslError> {
        let function = native::WSL_LAUNCH_INTERACTIVE;
        let _span =
            debug_span!("WslLaunchInteractive", name, command, use_current_working_directory)
                .entered();

        let wide_name = encode(function, to_wide("name", name))?;
        let wide_command = encode(function, to_wide("command", command))?;

        let mut exit_code = 0u32;
        let code = call(function, || unsafe {
            self.native.launch_interactive(
                wide_name.as_ptr(),
                wide_command.as_ptr(),
                to_bool(use_current_working_directory),
                &mut exit_code,
            )
        });
        check(function, code)?;

        Ok(exit_code)
    }

    /// Register a new distribution from a root filesystem archive (`.tar.gz`)
    pub fn register_distribution(&self, name: &str, archive: &Path) -> Result<(), WslError> {
        let function = native::WSL_REGISTER_DISTRIBUTION;
        let _span =
            debug_span!("WslRegisterDistribution", name, archive = %archive.display()).entered();

        let wide_name = encode(function, to_wide("name", name))?;
        let wide_archive = encode(function, path_to_wide("archive path", archive))?;

        let code = call(function, || unsafe {
            self.native
                .register_distribution(wide_name.as_ptr(), wide_archive.as_ptr())
        });
        check(function, code)
    }

    pub fn unregister_distribution(&self, name: &str) -> Result<(), WslError> {
        let function = native::WSL_UNREGISTER_DISTRIBUTION;
        let _span = debug_span!("WslUnregisterDistribution", name).entered();

        let wide_name = encode(function, to_wide("name", name))?;

        let code = call(function, || unsafe {
            self.native.unregister_distribution(wide_name.as_ptr())
        });
        check(function, code)
    }
}

fn encode<T>(
    function: &'static str,
    result: Result<T, crate::error::EncodingError>,
) -> Result<T, WslError> {
    result.map_err(|err| {
        log_encoding_error(function, &err);
        WslError::Encoding(err)
    })
}

#[inline]
fn call(function: &'static str, f: impl FnOnce() -> HRESULT) -> HRESULT {
    log_native_call(function);
    let code = f();
    log_native_return(function, code);
    code
}

fn check(function: &'static str, code: HRESULT) -> Result<(), WslError> {
    let code = HResult(code);
    if code.is_success() {
        Ok(())
    } else {
        let err = WslError::native(function, code);
        log_native_error(function, &err);
        Err(err)
    }
}
