//! # sysctl Platform Abstraction Layer
//!
//! This crate provides the single seam between the MIB access layer and the
//! operating system's `sysctl(2)` primitive, in two backends:
//! - **Host Mode**: real FFI into the BSD kernel (FreeBSD/macOS only)
//! - **Mock Mode**: in-process simulated parameter tree for unit tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sysctl_platform::{KernelInterface, HostKernel};
//!
//! let mut len = 0usize;
//! HostKernel.sysctl(&mib, None, Some(&mut len), None)?; // size probe
//! ```
//!
//! ## Build Modes
//!
//! ```bash
//! # Host (default - real kernel, BSD targets only)
//! cargo build
//!
//! # Mock (testing, any target)
//! cargo build --features mock
//! ```

use core::fmt;

use libc::c_int;

#[cfg(any(target_os = "freebsd", target_os = "macos"))]
mod host;
#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(any(target_os = "freebsd", target_os = "macos"))]
pub use host::HostKernel;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockKernel;

/// Maximum number of components in an address vector.
///
/// This is the BSD `CTL_MAXNAME` limit. The resolver's scratch buffer keeps
/// two extra components of slack beyond it; see [`NAME_SCRATCH_SLACK`].
pub const CTL_MAXNAME: usize = 24;

/// Extra address-vector components reserved (but never advertised to the
/// kernel) when translating a name. The kernel's own name2oid reserves the
/// same two words past the stated capacity; dropping the slack risks an
/// out-of-bounds kernel write into the scratch buffer.
pub const NAME_SCRATCH_SLACK: usize = 2;

/// Reserved address vector that repurposes the set path of `sysctl(2)` to
/// translate a dotted name into its numeric form.
pub const NAME2OID_MIB: [c_int; 2] = [0, 3];

/// Raw OS error code from a failed kernel call, surfaced uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Errno(pub c_int);

impl Errno {
    /// The raw error number as the kernel reported it.
    pub const fn raw(self) -> c_int {
        self.0
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "errno {}", self.0)
    }
}

/// Platform configuration and detection
pub mod config {
    /// Check if the real kernel backend is available on this target.
    pub const fn has_host_kernel() -> bool {
        cfg!(any(target_os = "freebsd", target_os = "macos"))
    }

    /// Check if the mock backend is compiled in.
    pub const fn has_mock_kernel() -> bool {
        cfg!(any(test, feature = "mock"))
    }
}

/// One invocation of the underlying `sysctl(2)` primitive.
///
/// The four parameters mirror the kernel call exactly:
/// - `mib` - numeric address vector (an empty vector is legal; backends
///   substitute a fixed zero placeholder so the kernel always sees a valid
///   pointer)
/// - `old` - output buffer, absent for a pure size probe or a pure set
/// - `old_len` - in/out length cell: on entry the capacity being advertised
///   to the kernel, on exit the byte count actually produced. It may be
///   present without `old` (size probe) and may advertise *less* than
///   `old.len()` (the name-translation scratch buffer does exactly that).
/// - `new` - input buffer for the set path, length taken from the slice
///
/// Implementations perform exactly one call, never retry, and never
/// interpret the error code.
pub trait KernelInterface {
    fn sysctl(
        &self,
        mib: &[c_int],
        old: Option<&mut [u8]>,
        old_len: Option<&mut usize>,
        new: Option<&[u8]>,
    ) -> Result<(), Errno>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_backend_compiled_for_tests() {
        assert!(config::has_mock_kernel());
    }

    #[test]
    fn name2oid_vector_shape() {
        // The translation request itself must fit the address-vector model.
        assert_eq!(NAME2OID_MIB.len(), 2);
        assert!(NAME2OID_MIB.len() <= CTL_MAXNAME);
    }

    #[test]
    fn errno_display_carries_raw_code() {
        let e = Errno(libc::ENOENT);
        assert_eq!(e.raw(), libc::ENOENT);
        assert!(format!("{e}").contains(&libc::ENOENT.to_string()));
    }
}
