//! Mock backend - in-process simulated parameter tree
//!
//! Implements the same call shape as the real kernel: the `{0,3}` name
//! translation, the in/out length cell, errno-style failures, read-only
//! nodes. The tree lives behind a mutex because the kernel itself is the
//! one shared resource in this design; the access layer above stays
//! stateless either way.
//!
//! The mock also counts invocations, so tests can assert that argument
//! validation rejects bad input *before* any kernel call happens.

use std::sync::Mutex;

use libc::c_int;

use crate::{Errno, KernelInterface, NAME2OID_MIB};

const INT_WIDTH: usize = core::mem::size_of::<c_int>();

struct MockNode {
    mib: Vec<c_int>,
    bytes: Vec<u8>,
    writable: bool,
    /// Extra bytes added to the size reported by a probe. Models parameters
    /// whose required-size answer is a hint larger than the data actually
    /// produced by the sized read.
    probe_slack: usize,
}

#[derive(Default)]
struct MockState {
    /// Dotted name -> address vector, consulted only by the `{0,3}` path.
    names: Vec<(String, Vec<c_int>)>,
    /// Value nodes, keyed by full address vector (selectors included).
    nodes: Vec<MockNode>,
    calls: u64,
}

/// Simulated kernel parameter tree.
pub struct MockKernel {
    state: Mutex<MockState>,
}

impl MockKernel {
    /// Empty tree.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Tree preloaded with a few well-known FreeBSD parameters, enough for
    /// end-to-end exercises without per-test setup.
    pub fn with_base_tree() -> Self {
        let kernel = Self::new();
        kernel.register("kern.ostype", &[1, 1], b"FreeBSD\0");
        kernel.register("kern.hostname", &[1, 10], b"demo.example.org\0");
        kernel.register("kern.ipc.soacceptqueue", &[1, 14, 1], &128u32.to_ne_bytes());
        kernel.register("kern.maxfiles", &[1, 7], &65536u32.to_ne_bytes());
        kernel
    }

    /// Register a writable node reachable by name.
    pub fn register(&self, name: &str, mib: &[c_int], bytes: &[u8]) {
        self.insert(name, mib, bytes, true, 0);
    }

    /// Register a node that rejects the set path with `EPERM`.
    pub fn register_read_only(&self, name: &str, mib: &[c_int], bytes: &[u8]) {
        self.insert(name, mib, bytes, false, 0);
    }

    /// Register a node whose size probe over-reports by `slack` bytes.
    pub fn register_padded(&self, name: &str, mib: &[c_int], bytes: &[u8], slack: usize) {
        self.insert(name, mib, bytes, true, slack);
    }

    /// Register a value at a selector-qualified address vector without a
    /// name of its own (e.g. a per-instance child of a named parameter).
    pub fn register_instance(&self, mib: &[c_int], bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.nodes.push(MockNode {
            mib: mib.to_vec(),
            bytes: bytes.to_vec(),
            writable: true,
            probe_slack: 0,
        });
    }

    fn insert(&self, name: &str, mib: &[c_int], bytes: &[u8], writable: bool, probe_slack: usize) {
        let mut state = self.state.lock().unwrap();
        state.names.push((name.to_string(), mib.to_vec()));
        state.nodes.push(MockNode {
            mib: mib.to_vec(),
            bytes: bytes.to_vec(),
            writable,
            probe_slack,
        });
    }

    /// Number of kernel calls the tree has served so far.
    pub fn calls(&self) -> u64 {
        self.state.lock().unwrap().calls
    }

    /// Current raw bytes stored at `mib`, if any.
    pub fn value_at(&self, mib: &[c_int]) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .iter()
            .find(|n| n.mib == mib)
            .map(|n| n.bytes.clone())
    }

    fn translate(
        state: &MockState,
        old: Option<&mut [u8]>,
        old_len: Option<&mut usize>,
        new: Option<&[u8]>,
    ) -> Result<(), Errno> {
        let (Some(old), Some(old_len), Some(new)) = (old, old_len, new) else {
            return Err(Errno(libc::EINVAL));
        };
        // The request length excludes the terminator, but a trailing NUL in
        // the buffer is tolerated the way the kernel tolerates it.
        let name_bytes = match new.split_last() {
            Some((&0, head)) => head,
            _ => new,
        };
        let Ok(name) = core::str::from_utf8(name_bytes) else {
            return Err(Errno(libc::ENOENT));
        };
        let Some((_, mib)) = state.names.iter().find(|(n, _)| n == name) else {
            return Err(Errno(libc::ENOENT));
        };

        let needed = mib.len() * INT_WIDTH;
        if *old_len < needed {
            return Err(Errno(libc::ENOMEM));
        }
        for (chunk, component) in old.chunks_exact_mut(INT_WIDTH).zip(mib.iter()) {
            chunk.copy_from_slice(&component.to_ne_bytes());
        }
        *old_len = needed;
        Ok(())
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelInterface for MockKernel {
    fn sysctl(
        &self,
        mib: &[c_int],
        old: Option<&mut [u8]>,
        old_len: Option<&mut usize>,
        new: Option<&[u8]>,
    ) -> Result<(), Errno> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;

        if mib == NAME2OID_MIB.as_slice() {
            return Self::translate(&state, old, old_len, new);
        }

        let Some(index) = state.nodes.iter().position(|n| n.mib == mib) else {
            return Err(Errno(libc::ENOENT));
        };

        // Read side first: probe or sized copy.
        if let Some(old_len) = old_len {
            let node = &state.nodes[index];
            match old {
                None => {
                    // Size probe. The reported requirement is a hint and may
                    // exceed what the sized read will actually produce.
                    *old_len = node.bytes.len() + node.probe_slack;
                }
                Some(old) => {
                    let n = node.bytes.len().min(*old_len);
                    old[..n].copy_from_slice(&node.bytes[..n]);
                    let truncated = n < node.bytes.len();
                    *old_len = n;
                    if truncated {
                        return Err(Errno(libc::ENOMEM));
                    }
                }
            }
        }

        // Set side.
        if let Some(new) = new {
            let node = &mut state.nodes[index];
            if !node.writable {
                return Err(Errno(libc::EPERM));
            }
            node.bytes = new.to_vec();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(kernel: &MockKernel, name: &str) -> Result<Vec<c_int>, Errno> {
        let mut scratch = vec![0u8; 8 * INT_WIDTH];
        let mut len = scratch.len();
        kernel.sysctl(
            &NAME2OID_MIB,
            Some(&mut scratch),
            Some(&mut len),
            Some(name.as_bytes()),
        )?;
        Ok(scratch[..len]
            .chunks_exact(INT_WIDTH)
            .map(|c| c_int::from_ne_bytes(c.try_into().unwrap()))
            .collect())
    }

    #[test]
    fn translates_registered_names() {
        let kernel = MockKernel::with_base_tree();
        assert_eq!(resolve(&kernel, "kern.ostype").unwrap(), vec![1, 1]);
        assert_eq!(
            resolve(&kernel, "kern.ipc.soacceptqueue").unwrap(),
            vec![1, 14, 1]
        );
    }

    #[test]
    fn unknown_name_is_enoent() {
        let kernel = MockKernel::with_base_tree();
        let err = resolve(&kernel, "kern.nonsense").unwrap_err();
        assert_eq!(err, Errno(libc::ENOENT));
    }

    #[test]
    fn probe_then_read_honors_length_cell() {
        let kernel = MockKernel::with_base_tree();

        let mut needed = 0usize;
        kernel
            .sysctl(&[1, 1], None, Some(&mut needed), None)
            .unwrap();
        assert_eq!(needed, b"FreeBSD\0".len());

        let mut buf = vec![0u8; needed];
        let mut len = needed;
        kernel
            .sysctl(&[1, 1], Some(&mut buf), Some(&mut len), None)
            .unwrap();
        assert_eq!(&buf[..len], b"FreeBSD\0");
    }

    #[test]
    fn padded_probe_over_reports() {
        let kernel = MockKernel::new();
        kernel.register_padded("kern.padded", &[9, 9], b"abc", 5);

        let mut needed = 0usize;
        kernel
            .sysctl(&[9, 9], None, Some(&mut needed), None)
            .unwrap();
        assert_eq!(needed, 8);

        let mut buf = vec![0u8; needed];
        let mut len = needed;
        kernel
            .sysctl(&[9, 9], Some(&mut buf), Some(&mut len), None)
            .unwrap();
        assert_eq!(len, 3);
    }

    #[test]
    fn read_only_node_rejects_set() {
        let kernel = MockKernel::new();
        kernel.register_read_only("security.locked", &[3, 1], b"x");
        let err = kernel
            .sysctl(&[3, 1], None, None, Some(b"y"))
            .unwrap_err();
        assert_eq!(err, Errno(libc::EPERM));
        assert_eq!(kernel.value_at(&[3, 1]).unwrap(), b"x");
    }

    #[test]
    fn counts_every_invocation() {
        let kernel = MockKernel::with_base_tree();
        assert_eq!(kernel.calls(), 0);
        let mut needed = 0usize;
        let _ = kernel.sysctl(&[1, 1], None, Some(&mut needed), None);
        let _ = kernel.sysctl(&[42, 42], None, Some(&mut needed), None);
        assert_eq!(kernel.calls(), 2);
    }
}
