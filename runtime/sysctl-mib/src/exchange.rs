//! Buffer exchange protocol - the two-call probe/fetch pattern
//!
//! Every variable-length read is a size probe followed by a sized fetch.
//! The probed size is a hint, not a guarantee: the sized fetch trusts only
//! the length the kernel reports back, which may be smaller. The window
//! between the two calls is inherently racy against concurrent writers of
//! the same parameter; that matches the underlying kernel contract and is
//! not papered over here.

use libc::c_int;
use sysctl_platform::KernelInterface;

use crate::{Result, SysctlError};

/// Variable-length read: probe, allocate exactly, fetch, truncate.
///
/// A probe answer of zero is a legal outcome (a parameter whose current
/// value is empty) and returns an empty buffer without a second call.
pub(crate) fn read_raw<K: KernelInterface>(kernel: &K, mib: &[c_int]) -> Result<Vec<u8>> {
    let mut needed = 0usize;
    kernel
        .sysctl(mib, None, Some(&mut needed), None)
        .map_err(SysctlError::Kernel)?;
    if needed == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; needed];
    let mut len = needed;
    kernel
        .sysctl(mib, Some(&mut buf), Some(&mut len), None)
        .map_err(SysctlError::Kernel)?;

    if len < needed {
        log::debug!("sysctl {mib:?}: probe said {needed} bytes, kernel returned {len}");
    }
    buf.truncate(len);
    Ok(buf)
}

/// Fixed-width read for the integer accessors: one call with the exact
/// expected width as capacity, failing on any other returned length.
pub(crate) fn read_fixed<K: KernelInterface>(
    kernel: &K,
    mib: &[c_int],
    width: usize,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; width];
    let mut len = width;
    kernel
        .sysctl(mib, Some(&mut buf), Some(&mut len), None)
        .map_err(SysctlError::Kernel)?;
    if len != width {
        return Err(SysctlError::ShapeMismatch {
            expected: width,
            actual: len,
        });
    }
    Ok(buf)
}

/// Single-call write of the caller's bytes, no terminator handling here.
pub(crate) fn write_raw<K: KernelInterface>(kernel: &K, mib: &[c_int], bytes: &[u8]) -> Result<()> {
    kernel
        .sysctl(mib, None, None, Some(bytes))
        .map_err(SysctlError::Kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysctl_platform::MockKernel;

    #[test]
    fn empty_value_reads_as_empty_not_error() {
        let kernel = MockKernel::new();
        kernel.register("kern.empty", &[7, 1], b"");
        let bytes = read_raw(&kernel, &[7, 1]).unwrap();
        assert!(bytes.is_empty());
        // Probe only; no second call for a zero-sized value.
        assert_eq!(kernel.calls(), 1);
    }

    #[test]
    fn shrunken_second_read_truncates_to_actual_length() {
        let kernel = MockKernel::new();
        kernel.register_padded("kern.hint", &[7, 2], b"actual", 10);
        let bytes = read_raw(&kernel, &[7, 2]).unwrap();
        assert_eq!(bytes, b"actual");
    }

    #[test]
    fn fixed_read_rejects_narrow_value() {
        let kernel = MockKernel::new();
        kernel.register("kern.short", &[7, 3], &[0xAB, 0xCD]);
        let err = read_fixed(&kernel, &[7, 3], 4).unwrap_err();
        assert!(matches!(
            err,
            SysctlError::ShapeMismatch {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn write_then_read_round_trips() {
        let kernel = MockKernel::new();
        kernel.register("kern.blob", &[7, 4], b"before");
        write_raw(&kernel, &[7, 4], b"after").unwrap();
        assert_eq!(read_raw(&kernel, &[7, 4]).unwrap(), b"after");
    }

    #[test]
    fn kernel_failure_surfaces_unchanged() {
        let kernel = MockKernel::new();
        let err = read_raw(&kernel, &[9, 9, 9]).unwrap_err();
        match err {
            SysctlError::Kernel(errno) => assert_eq!(errno.raw(), libc::ENOENT),
            other => panic!("expected kernel error, got {other:?}"),
        }
    }
}
