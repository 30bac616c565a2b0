//! Address resolution - dotted name to numeric address vector
//!
//! Translation rides the set path of the kernel call itself: "setting" the
//! reserved `{0,3}` parameter with a name as the new value makes the kernel
//! answer with the numeric form in the old buffer.

use libc::c_int;
use static_assertions::const_assert_eq;
use sysctl_platform::{KernelInterface, CTL_MAXNAME, NAME2OID_MIB, NAME_SCRATCH_SLACK};

use crate::{nul_terminated, Result, SysctlError};

const INT_WIDTH: usize = core::mem::size_of::<c_int>();

// The resolver reassembles address components from raw bytes in 4-byte
// steps; a platform with a wider c_int would corrupt every vector.
const_assert_eq!(core::mem::size_of::<c_int>(), 4);

/// Translate `name` and append `args` as trailing selector components.
///
/// The scratch buffer holds `CTL_MAXNAME + 2` components while only
/// `CTL_MAXNAME` are advertised in the length cell. The kernel's own
/// name2oid reserves the same two spare words; the slack stays.
///
/// # Errors
/// `EmbeddedNul` before any kernel call if `name` contains a NUL byte;
/// otherwise whatever the kernel reports (`ENOENT` for unknown names).
pub(crate) fn resolve<K: KernelInterface>(
    kernel: &K,
    name: &str,
    args: &[i32],
) -> Result<Vec<c_int>> {
    let name_buf = nul_terminated(name.as_bytes())?;

    let mut scratch = vec![0u8; (CTL_MAXNAME + NAME_SCRATCH_SLACK) * INT_WIDTH];
    let mut len = CTL_MAXNAME * INT_WIDTH;

    // The request length excludes the terminator, matching the kernel's
    // name2oid contract; the terminator still sits in the buffer behind it.
    kernel
        .sysctl(
            &NAME2OID_MIB,
            Some(&mut scratch),
            Some(&mut len),
            Some(&name_buf[..name_buf.len() - 1]),
        )
        .map_err(SysctlError::Kernel)?;

    let mut mib: Vec<c_int> = scratch[..len]
        .chunks_exact(INT_WIDTH)
        .map(|chunk| {
            let mut bytes = [0u8; INT_WIDTH];
            bytes.copy_from_slice(chunk);
            c_int::from_ne_bytes(bytes)
        })
        .collect();

    mib.extend(args.iter().map(|&a| a as c_int));
    log::trace!("resolved {name:?} (+{} args) to {mib:?}", args.len());
    Ok(mib)
}
