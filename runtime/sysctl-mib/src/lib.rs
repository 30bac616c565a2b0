//! sysctl-mib - name-addressed access to the BSD kernel parameter tree
//!
//! # Purpose
//! Read and write kernel variables by dotted symbolic name
//! (`"kern.hostname"`), hiding the numeric MIB addressing scheme, the magic
//! `{0,3}` name-translation call, and the two-pass probe/fetch buffer
//! protocol.
//!
//! # Architecture
//! Three layers, leaf first:
//! - `sysctl-platform`: one trait over the raw `sysctl(2)` call, with a real
//!   FFI backend on BSD targets and a simulated tree for tests
//! - `mib`: dotted name to numeric address vector, plus trailing selector
//!   arguments for parameterized variables
//! - `exchange` + `ops`: the probe/allocate/fetch/truncate protocol and the
//!   typed accessors layered on it
//!
//! Every call is independent and stateless: vectors are resolved fresh,
//! buffers live for one exchange, nothing is cached or shared. Concurrent
//! callers need no coordination from this layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! let ostype = sysctl_mib::get_string("kern.ostype")?; // "FreeBSD"
//! sysctl_mib::set_uint32("kern.ipc.soacceptqueue", 1024)?;
//! let temp = sysctl_mib::get_uint32_with_args("dev.cpu.temperature", &[0])?;
//! ```
//!
//! # Testing Strategy
//! - Unit tests: per-module, against `MockKernel`
//! - Integration tests: full public surface over a preloaded mock tree
//! - Host tests: N/A in CI (require a live BSD kernel)

mod exchange;
mod mib;
pub mod ops;

pub use sysctl_platform::{Errno, KernelInterface, CTL_MAXNAME};

#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub use sysctl_platform::HostKernel;

use thiserror::Error;

/// Error types for parameter access
#[derive(Debug, Error)]
pub enum SysctlError {
    /// A name or value contained an embedded NUL byte. Raised before any
    /// kernel call; sending it through would silently truncate the request.
    #[error("name or value contains an embedded NUL byte")]
    EmbeddedNul,

    /// The kernel call failed. The code is the OS's, verbatim and
    /// uninterpreted; retry/log/abort decisions belong to the caller.
    #[error("kernel call failed: {0}")]
    Kernel(Errno),

    /// A fixed-width integer read came back with the wrong byte count. The
    /// stored value is structurally incompatible, not merely absent.
    #[error("unexpected value width: expected {expected} bytes, kernel returned {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, SysctlError>;

/// Copy `bytes` with a single NUL appended, rejecting embedded NULs.
pub(crate) fn nul_terminated(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.contains(&0) {
        return Err(SysctlError::EmbeddedNul);
    }
    let mut buf = Vec::with_capacity(bytes.len() + 1);
    buf.extend_from_slice(bytes);
    buf.push(0);
    Ok(buf)
}

// Host-kernel convenience tier: the operations of `ops`, bound to the live
// kernel. Only present on the OS family exposing this call shape; other
// targets use the generic tier with their own backend.

/// Read a parameter as text from the live kernel. See [`ops::get_string`].
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_string(name: &str) -> Result<String> {
    ops::get_string(&HostKernel, name)
}

/// [`get_string`] with trailing selector arguments.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_string_with_args(name: &str, args: &[i32]) -> Result<String> {
    ops::get_string_with_args(&HostKernel, name, args)
}

/// Read a 4-byte parameter as `u32`. See [`ops::get_uint32`].
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_uint32(name: &str) -> Result<u32> {
    ops::get_uint32(&HostKernel, name)
}

/// [`get_uint32`] with trailing selector arguments.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_uint32_with_args(name: &str, args: &[i32]) -> Result<u32> {
    ops::get_uint32_with_args(&HostKernel, name, args)
}

/// Read an 8-byte parameter as `u64`. See [`ops::get_uint64`].
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_uint64(name: &str) -> Result<u64> {
    ops::get_uint64(&HostKernel, name)
}

/// [`get_uint64`] with trailing selector arguments.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_uint64_with_args(name: &str, args: &[i32]) -> Result<u64> {
    ops::get_uint64_with_args(&HostKernel, name, args)
}

/// Read a parameter's raw bytes. See [`ops::get_raw`].
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_raw(name: &str) -> Result<Vec<u8>> {
    ops::get_raw(&HostKernel, name)
}

/// [`get_raw`] with trailing selector arguments.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn get_raw_with_args(name: &str, args: &[i32]) -> Result<Vec<u8>> {
    ops::get_raw_with_args(&HostKernel, name, args)
}

/// Write a string parameter, NUL-terminated on the wire.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn set_string(name: &str, value: &str) -> Result<()> {
    ops::set_string(&HostKernel, name, value)
}

/// Write a 4-byte parameter from a native-endian `u32`.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn set_uint32(name: &str, value: u32) -> Result<()> {
    ops::set_uint32(&HostKernel, name, value)
}

/// Write an 8-byte parameter from a native-endian `u64`.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn set_uint64(name: &str, value: u64) -> Result<()> {
    ops::set_uint64(&HostKernel, name, value)
}

/// Write a parameter's bytes verbatim; no terminator is appended.
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub fn set_raw(name: &str, value: &[u8]) -> Result<()> {
    ops::set_raw(&HostKernel, name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_terminated_appends_exactly_one_byte() {
        let buf = nul_terminated(b"kern.ostype").unwrap();
        assert_eq!(buf, b"kern.ostype\0");
    }

    #[test]
    fn nul_terminated_rejects_embedded_terminator() {
        let err = nul_terminated(b"kern\0ostype").unwrap_err();
        assert!(matches!(err, SysctlError::EmbeddedNul));
    }

    #[test]
    fn nul_terminated_accepts_empty_input() {
        assert_eq!(nul_terminated(b"").unwrap(), b"\0");
    }
}
