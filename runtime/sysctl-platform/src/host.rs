//! Host backend - real `sysctl(2)` FFI
//!
//! Thin adapter around `libc::sysctl`. Performs no interpretation of the
//! result beyond converting a negative return into the current errno.

use core::ptr;

use libc::{c_int, c_uint, c_void, size_t};
use static_assertions::assert_eq_size;

use crate::{Errno, KernelInterface};

// The in/out length cell is passed straight through as the kernel's size_t.
assert_eq_size!(usize, size_t);

// Placeholder handed to the kernel for a zero-length address vector, so the
// name pointer is always valid.
static ZERO_MIB: c_int = 0;

/// Real kernel backend. Zero-sized and stateless; every call stands alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostKernel;

impl KernelInterface for HostKernel {
    fn sysctl(
        &self,
        mib: &[c_int],
        old: Option<&mut [u8]>,
        old_len: Option<&mut usize>,
        new: Option<&[u8]>,
    ) -> Result<(), Errno> {
        let (name, name_len) = if mib.is_empty() {
            (&ZERO_MIB as *const c_int, 0)
        } else {
            (mib.as_ptr(), mib.len() as c_uint)
        };

        let old_ptr = match old {
            Some(buf) => {
                // The advertised capacity must never exceed the buffer; the
                // kernel writes up to *old_len bytes through this pointer.
                if let Some(len) = old_len.as_deref() {
                    debug_assert!(*len <= buf.len());
                }
                buf.as_mut_ptr() as *mut c_void
            }
            None => ptr::null_mut(),
        };
        let old_len_ptr = match old_len {
            Some(len) => len as *mut usize as *mut size_t,
            None => ptr::null_mut(),
        };
        let (new_ptr, new_len) = match new {
            Some(buf) => (buf.as_ptr() as *const c_void, buf.len() as size_t),
            None => (ptr::null(), 0),
        };

        #[cfg(target_os = "freebsd")]
        let rc = unsafe { libc::sysctl(name, name_len, old_ptr, old_len_ptr, new_ptr, new_len) };
        #[cfg(target_os = "macos")]
        let rc = unsafe {
            libc::sysctl(
                name as *mut c_int,
                name_len,
                old_ptr,
                old_len_ptr,
                new_ptr as *mut c_void,
                new_len,
            )
        };

        if rc < 0 {
            let errno = std::io::Error::last_os_error()
                .raw_os_error()
                .unwrap_or(libc::EIO);
            log::trace!("sysctl({mib:?}) failed: errno {errno}");
            return Err(Errno(errno));
        }
        Ok(())
    }
}
