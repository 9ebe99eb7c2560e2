//! In-memory stand-in for `wslapi.dll`

#![allow(dead_code)]

use core::ffi::c_void;
use parking_lot::Mutex;
use std::collections::HashMap;
use wsl_adapter::interop::{from_wide_ptr, BOOL, HANDLE, HRESULT, PCWSTR, PWSTR};
use wsl_adapter::{DistributionFlags, NativeApi};

/// HRESULT_FROM_WIN32(ERROR_NOT_FOUND)
pub const E_NOT_FOUND: HRESULT = 0x8007_0490_u32 as i32;
/// HRESULT_FROM_WIN32(ERROR_ALREADY_EXISTS)
pub const E_ALREADY_EXISTS: HRESULT = 0x8007_00B7_u32 as i32;
/// HRESULT_FROM_WIN32(ERROR_FILE_NOT_FOUND)
pub const E_FILE_NOT_FOUND: HRESULT = 0x8007_0002_u32 as i32;

#[derive(Debug, Clone)]
pub struct Distro {
    pub version: u32,
    pub default_uid: u32,
    pub flags: u32,
    pub environment: Vec<String>,
    pub archive: String,
}

impl Distro {
    pub fn new(archive: &str) -> Self {
        Self {
            version: 2,
            default_uid: 0,
            flags: DistributionFlags::DEFAULT.bits(),
            environment: vec![
                "HOSTTYPE=x86_64".to_string(),
                "LANG=en_US.UTF-8".to_string(),
                "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin".to_string(),
                "TERM=xterm-256color".to_string(),
            ],
            archive: archive.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub name: String,
    pub command: String,
    pub use_cwd: bool,
    pub stdio: [usize; 3],
    pub process: usize,
}

#[derive(Clone, Copy)]
enum Block {
    String(usize),
    Array(usize),
}

#[derive(Default)]
struct State {
    distributions: HashMap<String, Distro>,
    calls: Vec<&'static str>,
    launched: Vec<Launched>,
    exit_codes: HashMap<String, u32>,
    live: HashMap<usize, Block>,
    freed: Vec<usize>,
    next_process: usize,
}

#[derive(Default)]
pub struct FakeWsl {
    state: Mutex<State>,
}

impl FakeWsl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distribution(self, name: &str, distro: Distro) -> Self {
        self.state.lock().distributions.insert(name.to_string(), distro);
        self
    }

    /// Exit code `launch_interactive` reports for `command`
    pub fn with_exit_code(self, command: &str, code: u32) -> Self {
        self.state.lock().exit_codes.insert(command.to_string(), code);
        self
    }

    pub fn distribution(&self, name: &str) -> Option<Distro> {
        self.state.lock().distributions.get(name).cloned()
    }

    /// Entry points invoked so far, in order (`free` not included)
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    pub fn launched(&self) -> Vec<Launched> {
        self.state.lock().launched.clone()
    }

    /// Native allocations not yet released
    pub fn live_allocations(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn freed(&self) -> Vec<usize> {
        self.state.lock().freed.clone()
    }

    fn record(&self, function: &'static str) {
        self.state.lock().calls.push(function);
    }
}

impl Drop for FakeWsl {
    fn drop(&mut self) {
        for (ptr, block) in self.state.get_mut().live.drain() {
            unsafe { release(ptr, block) };
        }
    }
}

unsafe fn release(ptr: usize, block: Block) {
    match block {
        Block::String(len) => drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
            ptr as *mut u16,
            len,
        ))),
        Block::Array(len) => drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
            ptr as *mut PWSTR,
            len,
        ))),
    }
}

impl NativeApi for FakeWsl {
    unsafe fn configure_distribution(
        &self,
        name: PCWSTR,
        default_uid: u32,
        flags: u32,
    ) -> HRESULT {
        self.record("WslConfigureDistribution");
        let name = from_wide_ptr(name);
        let mut state = self.state.lock();
        match state.distributions.get_mut(&name) {
            Some(distro) => {
                distro.default_uid = default_uid;
                distro.flags = flags;
                0
            }
            None => E_NOT_FOUND,
        }
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
        self.record("WslGetDistributionConfiguration");
        let name = from_wide_ptr(name);
        let mut state = self.state.lock();
        let distro = match state.distributions.get(&name) {
            Some(distro) => distro.clone(),
            None => return E_NOT_FOUND,
        };

        let mut elements: Vec<PWSTR> = Vec::with_capacity(distro.environment.len());
        for entry in &distro.environment {
            let units: Vec<u16> = entry.encode_utf16().chain(Some(0)).collect();
            let len = units.len();
            let ptr = Box::into_raw(units.into_boxed_slice()) as *mut u16;
            state.live.insert(ptr as usize, Block::String(len));
            elements.push(ptr);
        }
        let count = elements.len();
        let array = Box::into_raw(elements.into_boxed_slice()) as *mut PWSTR;
        state.live.insert(array as usize, Block::Array(count));

        *version = distro.version;
        *default_uid = distro.default_uid;
        *flags = distro.flags;
        *environment = array;
        *environment_count = count as u32;
        0
    }

    unsafe fn is_distribution_registered(&self, name: PCWSTR) -> BOOL {
        self.record("WslIsDistributionRegistered");
        let name = from_wide_ptr(name);
        self.state.lock().distributions.contains_key(&name) as BOOL
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
        self.record("WslLaunch");
        let name = from_wide_ptr(name);
        let command = from_wide_ptr(command);
        let mut state = self.state.lock();
        if !state.distributions.contains_key(&name) {
            return E_NOT_FOUND;
        }

        state.next_process += 4;
        let handle = 0x1000 + state.next_process;
        state.launched.push(Launched {
            name,
            command,
            use_cwd: use_current_working_directory != 0,
            stdio: [stdin as usize, stdout as usize, stderr as usize],
            process: handle,
        });
        *process = handle as HANDLE;
        0
    }

    unsafe fn launch_interactive(
        &self,
        name: PCWSTR,
        command: PCWSTR,
        use_current_working_directory: BOOL,
        exit_code: *mut u32,
    ) -> HRESULT {
        self.record("WslLaunchInteractive");
        let name = from_wide_ptr(name);
        let command = from_wide_ptr(command);
        let mut state = self.state.lock();
        if !state.distributions.contains_key(&name) {
            return E_NOT_FOUND;
        }

        let code = state.exit_codes.get(&command).copied().unwrap_or(0);
        state.launched.push(Launched {
            name,
            command,
            use_cwd: use_current_working_directory != 0,
            stdio: [0; 3],
            process: 0,
        });
        *exit_code = code;
        0
    }

    unsafe fn register_distribution(&self, name: PCWSTR, tar_gz_filename: PCWSTR) -> HRESULT {
        self.record("WslRegisterDistribution");
        let name = from_wide_ptr(name);
        let archive = from_wide_ptr(tar_gz_filename);
        let mut state = self.state.lock();
        if state.distributions.contains_key(&name) {
            return E_ALREADY_EXISTS;
        }
        if !archive.ends_with(".tar.gz") {
            return E_FILE_NOT_FOUND;
        }

        state.distributions.insert(name, Distro::new(&archive));
        0
    }

    unsafe fn unregister_distribution(&self, name: PCWSTR) -> HRESULT {
        self.record("WslUnregisterDistribution");
        let name = from_wide_ptr(name);
        match self.state.lock().distributions.remove(&name) {
            Some(_) => 0,
            None => E_NOT_FOUND,
        }
    }

    unsafe fn free(&self, ptr: *mut c_void) {
        let mut state = self.state.lock();
        state.freed.push(ptr as usize);
        if let Some(block) = state.live.remove(&(ptr as usize)) {
            release(ptr as usize, block);
        }
    }
}
