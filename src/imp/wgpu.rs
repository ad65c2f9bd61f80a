// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
wgpu backend.

wgpu has no descriptor handles of its own.  [WgpuDevice] hands out handles into a
registry of wgpu resources, and descriptor copies copy registry entries.  Once a binding
instance is filled in, [WgpuDevice::create_bind_group] turns one of its root tables into
a `wgpu::BindGroup`, using the table offset as the binding index.

The registry only holds weak references.  A descriptor, and every copy of it, stays valid
while the wrapper that created it is alive; the resource cache keeps the wrapper alive for
as long as it is bound.  Dead entries are pruned as the registry grows.
*/

use crate::DescriptorHeapError;
use crate::bindings::shader_resources::{AddressMode, FilterType};
use crate::bindings::{
    BindFlags, Buffer, BufferView, BufferViewType, CpuDescriptorHandle, DescriptorHeapType,
    RootTable, Sampler, SamplerDesc, TextureView, TextureViewType, Usage,
};
use crate::imp::{DescriptorHeap, DescriptorRange, Device};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Registry size below which dead entries are left alone.
const MIN_PRUNE_LEN: usize = 64;

trait RegistryEntry: Clone {
    type Live;
    fn heap_type(&self) -> DescriptorHeapType;
    fn upgrade(&self) -> Option<Self::Live>;
    fn is_live(&self) -> bool;
}

/// Handle-to-resource map that does not own its resources.
#[derive(Debug)]
struct DescriptorRegistry<E> {
    entries: HashMap<CpuDescriptorHandle, E>,
    prune_at: usize,
}

impl<E: RegistryEntry> DescriptorRegistry<E> {
    fn new() -> Self {
        DescriptorRegistry {
            entries: HashMap::new(),
            prune_at: MIN_PRUNE_LEN,
        }
    }

    fn insert(&mut self, handle: CpuDescriptorHandle, entry: E) {
        if self.entries.len() >= self.prune_at {
            self.prune();
            self.prune_at = (self.entries.len() * 2).max(MIN_PRUNE_LEN);
        }
        self.entries.insert(handle, entry);
    }

    /// Copies `src` into `dst`.  `dst` is cleared when `src` is unknown or dead.
    fn copy(&mut self, dst: CpuDescriptorHandle, src: CpuDescriptorHandle, heap_type: DescriptorHeapType) {
        match self.entries.get(&src).filter(|e| e.is_live()).cloned() {
            Some(entry) => {
                debug_assert_eq!(entry.heap_type(), heap_type);
                self.insert(dst, entry);
            }
            None => {
                self.entries.remove(&dst);
            }
        }
    }

    fn get(&self, handle: CpuDescriptorHandle) -> Option<E::Live> {
        self.entries.get(&handle)?.upgrade()
    }

    fn prune(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live());
        logwise::trace_sync!(
            "Pruned {count} dead descriptors",
            count = before - self.entries.len()
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

enum WgpuDescriptor {
    Buffer(Arc<wgpu::Buffer>),
    TextureView(Arc<wgpu::TextureView>),
    Sampler(Arc<wgpu::Sampler>),
}

#[derive(Debug, Clone)]
enum WeakDescriptor {
    Buffer(Weak<wgpu::Buffer>),
    TextureView(Weak<wgpu::TextureView>),
    Sampler(Weak<wgpu::Sampler>),
}

impl RegistryEntry for WeakDescriptor {
    type Live = WgpuDescriptor;

    fn heap_type(&self) -> DescriptorHeapType {
        match self {
            WeakDescriptor::Sampler(_) => DescriptorHeapType::Sampler,
            WeakDescriptor::Buffer(_) | WeakDescriptor::TextureView(_) => DescriptorHeapType::CbvSrvUav,
        }
    }

    fn upgrade(&self) -> Option<WgpuDescriptor> {
        Some(match self {
            WeakDescriptor::Buffer(b) => WgpuDescriptor::Buffer(b.upgrade()?),
            WeakDescriptor::TextureView(v) => WgpuDescriptor::TextureView(v.upgrade()?),
            WeakDescriptor::Sampler(s) => WgpuDescriptor::Sampler(s.upgrade()?),
        })
    }

    fn is_live(&self) -> bool {
        match self {
            WeakDescriptor::Buffer(b) => b.strong_count() > 0,
            WeakDescriptor::TextureView(v) => v.strong_count() > 0,
            WeakDescriptor::Sampler(s) => s.strong_count() > 0,
        }
    }
}

#[derive(Debug)]
pub struct WgpuDevice {
    device: wgpu::Device,
    next_handle: AtomicU64,
    registry: Mutex<DescriptorRegistry<WeakDescriptor>>,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device) -> Self {
        WgpuDevice {
            device,
            next_handle: AtomicU64::new(1),
            registry: Mutex::new(DescriptorRegistry::new()),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn reserve(&self, count: u32) -> CpuDescriptorHandle {
        CpuDescriptorHandle(self.next_handle.fetch_add(count as u64, Ordering::Relaxed))
    }

    fn register(&self, descriptor: WeakDescriptor) -> CpuDescriptorHandle {
        let handle = self.reserve(1);
        self.registry.lock().unwrap().insert(handle, descriptor);
        handle
    }

    /// Wraps a buffer.  Its bind flags follow the wgpu usages it was created with.
    pub fn wrap_buffer(
        &self,
        name: impl Into<String>,
        buffer: wgpu::Buffer,
        usage: Usage,
    ) -> Arc<WgpuBuffer> {
        let bind_flags = bind_flags(buffer.usage());
        let buffer = Arc::new(buffer);
        let cbv = if bind_flags.contains(BindFlags::UNIFORM_BUFFER) {
            self.register(WeakDescriptor::Buffer(Arc::downgrade(&buffer)))
        } else {
            CpuDescriptorHandle::NULL
        };
        Arc::new(WgpuBuffer {
            name: name.into(),
            buffer,
            bind_flags,
            usage,
            cbv,
        })
    }

    pub fn wrap_texture_view(
        &self,
        name: impl Into<String>,
        view: wgpu::TextureView,
        view_type: TextureViewType,
        sampler: Option<Arc<dyn Sampler>>,
    ) -> Arc<WgpuTextureView> {
        let view = Arc::new(view);
        Arc::new(WgpuTextureView {
            name: name.into(),
            handle: self.register(WeakDescriptor::TextureView(Arc::downgrade(&view))),
            view,
            view_type,
            sampler,
        })
    }

    /// Wraps a storage buffer as a buffer view.
    pub fn wrap_buffer_view(
        &self,
        name: impl Into<String>,
        buffer: wgpu::Buffer,
        view_type: BufferViewType,
    ) -> Arc<WgpuBufferView> {
        let buffer = Arc::new(buffer);
        Arc::new(WgpuBufferView {
            name: name.into(),
            handle: self.register(WeakDescriptor::Buffer(Arc::downgrade(&buffer))),
            buffer,
            view_type,
        })
    }

    pub fn create_sampler(&self, name: impl Into<String>, desc: &SamplerDesc) -> Arc<WgpuSampler> {
        let name = name.into();
        let filter = filter_mode(desc.filter);
        let address_mode = address_mode(desc.address_mode);
        // wgpu rejects anisotropy unless every filter is linear.
        let anisotropy_clamp = match desc.filter {
            FilterType::Anisotropic => desc.max_anisotropy.clamp(1, u16::MAX as u32) as u16,
            FilterType::Point | FilterType::Linear => 1,
        };
        let s = wgpu::SamplerDescriptor {
            label: Some(&name),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: filter,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            anisotropy_clamp,
            border_color: (desc.address_mode == AddressMode::Border)
                .then_some(wgpu::SamplerBorderColor::TransparentBlack),
        };
        let sampler = Arc::new(self.device.create_sampler(&s));
        Arc::new(WgpuSampler {
            handle: self.register(WeakDescriptor::Sampler(Arc::downgrade(&sampler))),
            name,
            sampler,
        })
    }

    /// Builds a bind group from one root table of a binding instance's cache.
    ///
    /// Shader-visible copies are used where the table has them.  Empty cells, constant
    /// buffers without a view and descriptors whose resource was dropped are left out.
    pub fn create_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        table: &RootTable,
        label: Option<&str>,
    ) -> wgpu::BindGroup {
        let descriptors: Vec<(u32, WgpuDescriptor)> = {
            let registry = self.registry.lock().unwrap();
            table
                .resources()
                .iter()
                .enumerate()
                .filter_map(|(offset, cell)| {
                    let offset = offset as u32;
                    let handle = table.shader_visible_handle(offset).unwrap_or(cell.cpu_handle);
                    if cell.is_empty() || handle.is_null() {
                        return None;
                    }
                    registry.get(handle).map(|d| (offset, d))
                })
                .collect()
        };
        let entries: Vec<wgpu::BindGroupEntry<'_>> = descriptors
            .iter()
            .map(|(binding, descriptor)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: match descriptor {
                    WgpuDescriptor::Buffer(buffer) => buffer.as_entire_binding(),
                    WgpuDescriptor::TextureView(view) => wgpu::BindingResource::TextureView(view),
                    WgpuDescriptor::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler),
                },
            })
            .collect();
        logwise::trace_sync!(
            "create_bind_group: {count} entries",
            count = entries.len()
        );
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout,
            entries: &entries,
        })
    }
}

impl Device for WgpuDevice {
    fn copy_descriptors_simple(
        &self,
        dst: CpuDescriptorHandle,
        src: CpuDescriptorHandle,
        heap_type: DescriptorHeapType,
    ) {
        self.registry.lock().unwrap().copy(dst, src, heap_type);
    }

    fn descriptor_increment(&self, _heap_type: DescriptorHeapType) -> u32 {
        1
    }
}

fn bind_flags(usages: wgpu::BufferUsages) -> BindFlags {
    let mut flags = BindFlags::empty();
    flags.set(BindFlags::UNIFORM_BUFFER, usages.contains(wgpu::BufferUsages::UNIFORM));
    flags.set(BindFlags::VERTEX_BUFFER, usages.contains(wgpu::BufferUsages::VERTEX));
    flags.set(BindFlags::INDEX_BUFFER, usages.contains(wgpu::BufferUsages::INDEX));
    flags.set(BindFlags::INDIRECT_DRAW_ARGS, usages.contains(wgpu::BufferUsages::INDIRECT));
    flags.set(
        BindFlags::SHADER_RESOURCE | BindFlags::UNORDERED_ACCESS,
        usages.contains(wgpu::BufferUsages::STORAGE),
    );
    flags
}

fn filter_mode(filter: FilterType) -> wgpu::FilterMode {
    match filter {
        FilterType::Point => wgpu::FilterMode::Nearest,
        FilterType::Linear | FilterType::Anisotropic => wgpu::FilterMode::Linear,
    }
}

fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Wrap => wgpu::AddressMode::Repeat,
        AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::Border => wgpu::AddressMode::ClampToBorder,
    }
}

/// Shader-visible handle space on a [WgpuDevice].
#[derive(Debug)]
pub struct WgpuDescriptorHeap {
    device: Arc<WgpuDevice>,
    cbv_srv_uav_available: u32,
    sampler_available: u32,
}

impl WgpuDescriptorHeap {
    pub fn new(device: Arc<WgpuDevice>, cbv_srv_uav_capacity: u32, sampler_capacity: u32) -> Self {
        WgpuDescriptorHeap {
            device,
            cbv_srv_uav_available: cbv_srv_uav_capacity,
            sampler_available: sampler_capacity,
        }
    }
}

impl DescriptorHeap for WgpuDescriptorHeap {
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
            first: self.device.reserve(count),
            count,
            increment: 1,
        })
    }
}

#[derive(Debug)]
pub struct WgpuBuffer {
    name: String,
    buffer: Arc<wgpu::Buffer>,
    bind_flags: BindFlags,
    usage: Usage,
    cbv: CpuDescriptorHandle,
}

impl WgpuBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl Buffer for WgpuBuffer {
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
pub struct WgpuTextureView {
    name: String,
    view: Arc<wgpu::TextureView>,
    view_type: TextureViewType,
    handle: CpuDescriptorHandle,
    sampler: Option<Arc<dyn Sampler>>,
}

impl WgpuTextureView {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl TextureView for WgpuTextureView {
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
pub struct WgpuBufferView {
    name: String,
    buffer: Arc<wgpu::Buffer>,
    view_type: BufferViewType,
    handle: CpuDescriptorHandle,
}

impl WgpuBufferView {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl BufferView for WgpuBufferView {
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
pub struct WgpuSampler {
    name: String,
    sampler: Arc<wgpu::Sampler>,
    handle: CpuDescriptorHandle,
}

impl WgpuSampler {
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl Sampler for WgpuSampler {
    fn name(&self) -> &str {
        &self.name
    }
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle {
        self.handle
    }
}
