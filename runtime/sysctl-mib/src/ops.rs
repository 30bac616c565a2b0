//! Backend-generic operations
//!
//! Every public accessor, parameterized over the kernel backend. The
//! crate-root free functions bind these to [`HostKernel`] on targets that
//! have one; tests and embedders with their own [`KernelInterface`]
//! implementation call in here directly.
//!
//! [`HostKernel`]: sysctl_platform::HostKernel
//! [`KernelInterface`]: sysctl_platform::KernelInterface

use sysctl_platform::KernelInterface;

use crate::exchange::{read_fixed, read_raw, write_raw};
use crate::mib::resolve;
use crate::{nul_terminated, Result};

/// Read a parameter as text, with one trailing NUL stripped if present.
pub fn get_string<K: KernelInterface>(kernel: &K, name: &str) -> Result<String> {
    get_string_with_args(kernel, name, &[])
}

/// [`get_string`] with trailing selector arguments.
pub fn get_string_with_args<K: KernelInterface>(
    kernel: &K,
    name: &str,
    args: &[i32],
) -> Result<String> {
    let raw = get_raw_with_args(kernel, name, args)?;
    let mut n = raw.len();
    // Throw away the terminating NUL, if the wire form carried one.
    if n > 0 && raw[n - 1] == 0 {
        n -= 1;
    }
    Ok(String::from_utf8_lossy(&raw[..n]).into_owned())
}

/// Read a 4-byte parameter as a native-endian `u32`.
pub fn get_uint32<K: KernelInterface>(kernel: &K, name: &str) -> Result<u32> {
    get_uint32_with_args(kernel, name, &[])
}

/// [`get_uint32`] with trailing selector arguments.
pub fn get_uint32_with_args<K: KernelInterface>(
    kernel: &K,
    name: &str,
    args: &[i32],
) -> Result<u32> {
    let mib = resolve(kernel, name, args)?;
    let raw = read_fixed(kernel, &mib, 4)?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw);
    Ok(u32::from_ne_bytes(bytes))
}

/// Read an 8-byte parameter as a native-endian `u64`.
pub fn get_uint64<K: KernelInterface>(kernel: &K, name: &str) -> Result<u64> {
    get_uint64_with_args(kernel, name, &[])
}

/// [`get_uint64`] with trailing selector arguments.
pub fn get_uint64_with_args<K: KernelInterface>(
    kernel: &K,
    name: &str,
    args: &[i32],
) -> Result<u64> {
    let mib = resolve(kernel, name, args)?;
    let raw = read_fixed(kernel, &mib, 8)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw);
    Ok(u64::from_ne_bytes(bytes))
}

/// Read a parameter's raw bytes. An empty vec is a legal value.
pub fn get_raw<K: KernelInterface>(kernel: &K, name: &str) -> Result<Vec<u8>> {
    get_raw_with_args(kernel, name, &[])
}

/// [`get_raw`] with trailing selector arguments.
pub fn get_raw_with_args<K: KernelInterface>(
    kernel: &K,
    name: &str,
    args: &[i32],
) -> Result<Vec<u8>> {
    let mib = resolve(kernel, name, args)?;
    read_raw(kernel, &mib)
}

/// Write a string parameter, NUL-terminated on the wire.
///
/// # Errors
/// `EmbeddedNul` before any kernel call if `value` contains a NUL byte.
pub fn set_string<K: KernelInterface>(kernel: &K, name: &str, value: &str) -> Result<()> {
    let wire = nul_terminated(value.as_bytes())?;
    let mib = resolve(kernel, name, &[])?;
    write_raw(kernel, &mib, &wire)
}

/// Write a 4-byte parameter from a native-endian `u32`.
pub fn set_uint32<K: KernelInterface>(kernel: &K, name: &str, value: u32) -> Result<()> {
    let mib = resolve(kernel, name, &[])?;
    write_raw(kernel, &mib, &value.to_ne_bytes())
}

/// Write an 8-byte parameter from a native-endian `u64`.
pub fn set_uint64<K: KernelInterface>(kernel: &K, name: &str, value: u64) -> Result<()> {
    let mib = resolve(kernel, name, &[])?;
    write_raw(kernel, &mib, &value.to_ne_bytes())
}

/// Write a parameter's bytes verbatim; no terminator is appended.
pub fn set_raw<K: KernelInterface>(kernel: &K, name: &str, value: &[u8]) -> Result<()> {
    let mib = resolve(kernel, name, &[])?;
    write_raw(kernel, &mib, value)
}
