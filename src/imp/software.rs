// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! A backend whose descriptor memory lives on the CPU.
//!
//! Every descriptor written here remembers the handle it was originally created at, so
//! after any number of copies [SoftwareDevice::read_descriptor] tells which object a
//! shader-visible slot refers to.

use crate::DescriptorHeapError;
use crate::bindings::{
    BindFlags, Buffer, BufferView, BufferViewType, CpuDescriptorHandle, DescriptorHeapType,
    Sampler, TextureView, TextureViewType, Usage,
};
use crate::imp::{DescriptorHeap, DescriptorRange, Device};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const CBV_SRV_UAV_INCREMENT: u32 = 32;
const SAMPLER_INCREMENT: u32 = 16;
const FIRST_HANDLE: u64 = 0x1000;

/// Contents of one software descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoftwareDescriptor {
    pub heap_type: DescriptorHeapType,
    /// Handle the descriptor was created at.
    pub source: CpuDescriptorHandle,
}

#[derive(Debug)]
pub struct SoftwareDevice {
    next_handle: AtomicU64,
    memory: Mutex<HashMap<CpuDescriptorHandle, SoftwareDescriptor>>,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        SoftwareDevice {
            next_handle: AtomicU64::new(FIRST_HANDLE),
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Reserves address space for `count` descriptors.
    fn reserve(&self, heap_type: DescriptorHeapType, count: u32) -> CpuDescriptorHandle {
        let bytes = count as u64 * self.descriptor_increment(heap_type) as u64;
        CpuDescriptorHandle(self.next_handle.fetch_add(bytes, Ordering::Relaxed))
    }

    fn create_descriptor(&self, heap_type: DescriptorHeapType) -> CpuDescriptorHandle {
        let handle = self.reserve(heap_type, 1);
        self.memory.lock().unwrap().insert(
            handle,
            SoftwareDescriptor {
                heap_type,
                source: handle,
            },
        );
        handle
    }

    pub fn read_descriptor(&self, handle: CpuDescriptorHandle) -> Option<SoftwareDescriptor> {
        self.memory.lock().unwrap().get(&handle).copied()
    }

    /// Creates a buffer.  Uniform buffers get a constant buffer view unless their usage is
    /// [Usage::Dynamic], whose views are created at draw time.
    pub fn create_buffer(
        &self,
        name: impl Into<String>,
        bind_flags: BindFlags,
        usage: Usage,
    ) -> Arc<SoftwareBuffer> {
        let cbv = if bind_flags.contains(BindFlags::UNIFORM_BUFFER) && usage != Usage::Dynamic {
            self.create_descriptor(DescriptorHeapType::CbvSrvUav)
        } else {
            CpuDescriptorHandle::NULL
        };
        Arc::new(SoftwareBuffer {
            name: name.into(),
            bind_flags,
            usage,
            cbv,
        })
    }

    pub fn create_texture_view(
        &self,
        name: impl Into<String>,
        view_type: TextureViewType,
        sampler: Option<Arc<dyn Sampler>>,
    ) -> Arc<SoftwareTextureView> {
        Arc::new(SoftwareTextureView {
            name: name.into(),
            view_type,
            handle: self.create_descriptor(DescriptorHeapType::CbvSrvUav),
            sampler,
        })
    }

    pub fn create_buffer_view(
        &self,
        name: impl Into<String>,
        view_type: BufferViewType,
    ) -> Arc<SoftwareBufferView> {
        Arc::new(SoftwareBufferView {
            name: name.into(),
            view_type,
            handle: self.create_descriptor(DescriptorHeapType::CbvSrvUav),
        })
    }

    pub fn create_sampler(&self, name: impl Into<String>) -> Arc<SoftwareSampler> {
        Arc::new(SoftwareSampler {
            name: name.into(),
            handle: self.create_descriptor(DescriptorHeapType::Sampler),
        })
    }
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for SoftwareDevice {
    fn copy_descriptors_simple(
        &self,
        dst: CpuDescriptorHandle,
        src: CpuDescriptorHandle,
        heap_type: DescriptorHeapType,
    ) {
        let mut memory = self.memory.lock().unwrap();
        let descriptor = memory.get(&src).copied();
        debug_assert!(
            descriptor.is_some_and(|d| d.heap_type == heap_type),
            "source descriptor {src:?} is missing or not a {heap_type:?} descriptor"
        );
        match descriptor {
            Some(descriptor) => {
                memory.insert(dst, descriptor);
            }
            None => {
                memory.remove(&dst);
            }
        }
    }

    fn descriptor_increment(&self, heap_type: DescriptorHeapType) -> u32 {
        match heap_type {
            DescriptorHeapType::CbvSrvUav => CBV_SRV_UAV_INCREMENT,
            DescriptorHeapType::Sampler => SAMPLER_INCREMENT,
        }
    }
}

/// Shader-visible descriptor space carved out of a [SoftwareDevice].
#[derive(Debug)]
pub struct SoftwareDescriptorHeap {
    device: Arc<SoftwareDevice>,
    cbv_srv_uav_available: u32,
    sampler_available: u32,
}

impl SoftwareDescriptorHeap {
    pub fn new(device: Arc<SoftwareDevice>, cbv_srv_uav_capacity: u32, sampler_capacity: u32) -> Self {
        SoftwareDescriptorHeap {
            device,
            cbv_srv_uav_available: cbv_srv_uav_capacity,
            sampler_available: sampler_capacity,
        }
    }

    pub fn available(&self, heap_type: DescriptorHeapType) -> u32 {
        match heap_type {
            DescriptorHeapType::CbvSrvUav => self.cbv_srv_uav_available,
            DescriptorHeapType::Sampler => self.sampler_available,
        }
    }
}

impl DescriptorHeap for SoftwareDescriptorHeap {
    fn allocate(
        &mut self,
        heap_type: DescriptorHeapType,
        count: u32,
    ) -> Result<DescriptorRange, DescriptorHeapError> {
        let available = match heap_type {
            DescriptorHeapType::CbvSrvUav => &mut self.cbv_srv_uav_available,
            DescriptorHeapType::Sampler => &mut self.sampler_available,
        };
        if count > *available {
            return Err(DescriptorHeapError::OutOfDescriptors {
                heap_type,
                requested: count,
                available: *available,
            });
        }
        *available -= count;
        Ok(DescriptorRange {
            first: self.device.reserve(heap_type, count),
            count,
            increment: self.device.descriptor_increment(heap_type),
        })
    }
}

#[derive(Debug)]
pub struct SoftwareBuffer {
    name: String,
    bind_flags: BindFlags,
    usage: Usage,
    cbv: CpuDescriptorHandle,
}

impl Buffer for SoftwareBuffer {
    fn name(&self) -> &str {
        &self.name
    }
    fn bind_flags(&self) -> BindFlags {
        self.bind_flags
    }
    fn usage(&self) -> Usage {
        self.usage
    }
    fn cbv_handle(&self) -> CpuDescriptorHandle {
        self.cbv
    }
}

#[derive(Debug)]
pub struct SoftwareTextureView {
    name: String,
    view_type: TextureViewType,
    handle: CpuDescriptorHandle,
    sampler: Option<Arc<dyn Sampler>>,
}

impl TextureView for SoftwareTextureView {
    fn name(&self) -> &str {
        &self.name
    }
    fn view_type(&self) -> TextureViewType {
        self.view_type
    }
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle {
        self.handle
    }
    fn sampler(&self) -> Option<Arc<dyn Sampler>> {
        self.sampler.clone()
    }
}

#[derive(Debug)]
pub struct SoftwareBufferView {
    name: String,
    view_type: BufferViewType,
    handle: CpuDescriptorHandle,
}

impl BufferView for SoftwareBufferView {
    fn name(&self) -> &str {
        &self.name
    }
    fn view_type(&self) -> BufferViewType {
        self.view_type
    }
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle {
        self.handle
    }
}

#[derive(Debug)]
pub struct SoftwareSampler {
    name: String,
    handle: CpuDescriptorHandle,
}

impl Sampler for SoftwareSampler {
    fn name(&self) -> &str {
        &self.name
    }
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle {
        self.handle
    }
}
