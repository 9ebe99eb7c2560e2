//! wsl-adapter - typed access to the Windows Subsystem for Linux API
//!
//! Wraps the seven `wslapi.dll` entry points. Each operation encodes its
//! arguments as null-terminated UTF-16, makes exactly one native call and
//! converts the result, releasing any memory the native side allocated.
//!
//! ```no_run
//! use wsl_adapter::{DistributionFlags, Wsl};
//!
//! let wsl = Wsl::load()?;
//! if wsl.is_distribution_registered("Ubuntu") {
//!     let config = wsl.get_distribution_configuration("Ubuntu")?;
//!     assert!(config.flags.contains(DistributionFlags::ENABLE_INTEROP));
//!     let exit_code = wsl.launch_interactive("Ubuntu", "uname -a", true)?;
//!     println!("exited with {}", exit_code);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod distribution;
pub mod error;
pub mod flags;
pub mod interop;
pub mod logging;
pub mod native;
pub mod process;

pub use config::{AdapterConfig, ConfigError, LibraryConfig, LoggingConfig};
pub use distribution::{DistributionConfiguration, Wsl};
pub use error::{EncodingError, EncodingErrorKind, HResult, LoadError, WslError};
pub use flags::DistributionFlags;
pub use logging::{
    init_dev_logging, init_logging, init_prod_logging, LogConfig, LogFormat, LogInitError,
    LogOutput,
};
pub use native::{NativeApi, WslApi};
pub use process::{IoHandle, ProcessHandle};
