//! Interoperability - the raw boundary with native code
//!
//! Architecture:
//! - `types.rs` - native ABI aliases and the owned `WideString`
//! - `marshal.rs` - Rust ↔ UTF-16 conversions and native array unmarshaling
//! - `library.rs` - dynamic library loading (dlopen/LoadLibrary)

pub mod library;
pub mod marshal;
pub mod types;

pub use library::{Library, SymbolError};
pub use marshal::{from_wide_ptr, path_to_wide, take_wide_string_array, to_wide, wide_len};
pub use types::{WideString, BOOL, HANDLE, HRESULT, PCWSTR, PWSTR};
