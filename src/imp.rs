// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Backend interfaces.

Layouts and caches never talk to a GPU API directly.  They copy descriptors through a
[Device] and reserve shader-visible descriptor space from a [DescriptorHeap].

The software backend is always built; it keeps descriptor memory on the CPU and can
read it back, which is what the tests rely on.  The wgpu backend is behind
`backend_wgpu`.
*/

use crate::DescriptorHeapError;
use crate::bindings::{CpuDescriptorHandle, DescriptorHeapType};
use std::fmt::Debug;

/// The part of a device the binding layer needs.
pub trait Device: Debug + Send + Sync {
    /// Copies one descriptor of `heap_type` from `src` to `dst`.
    fn copy_descriptors_simple(
        &self,
        dst: CpuDescriptorHandle,
        src: CpuDescriptorHandle,
        heap_type: DescriptorHeapType,
    );

    /// Distance in bytes between two adjacent descriptors of `heap_type`.
    fn descriptor_increment(&self, heap_type: DescriptorHeapType) -> u32;
}

/// A contiguous run of descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    pub first: CpuDescriptorHandle,
    pub count: u32,
    pub increment: u32,
}

impl DescriptorRange {
    pub fn handle(&self, offset: u32) -> CpuDescriptorHandle {
        debug_assert!(
            offset < self.count,
            "offset {offset} is outside a range of {} descriptors",
            self.count
        );
        self.first.offset(offset, self.increment)
    }
}

/// Shader-visible descriptor memory.
pub trait DescriptorHeap: Debug {
    fn allocate(
        &mut self,
        heap_type: DescriptorHeapType,
        count: u32,
    ) -> Result<DescriptorRange, DescriptorHeapError>;
}

pub mod software;

#[cfg(all(feature = "backend_wgpu", not(target_arch = "wasm32")))]
pub mod wgpu;
