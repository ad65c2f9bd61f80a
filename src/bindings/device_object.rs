// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Device objects that can be bound to shader variables.
//!
//! The layout never creates buffers, views or samplers.  It only needs to ask an
//! object what it is, what it was created for, and where its CPU descriptor lives.
//! Backends implement the traits here; [DeviceObject] is the owning, type-tagged
//! reference that resource caches and resource mappings pass around.

use std::fmt::Debug;
use std::sync::Arc;

/// Address of a descriptor in CPU-visible descriptor memory.
///
/// Zero is the null handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CpuDescriptorHandle(pub u64);

impl CpuDescriptorHandle {
    pub const NULL: CpuDescriptorHandle = CpuDescriptorHandle(0);

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Handle of the descriptor `descriptors` slots after this one.
    pub const fn offset(self, descriptors: u32, increment: u32) -> Self {
        CpuDescriptorHandle(self.0 + descriptors as u64 * increment as u64)
    }
}

bitflags::bitflags! {
    /// What a buffer may be bound as.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindFlags: u32 {
        const VERTEX_BUFFER = 1 << 0;
        const INDEX_BUFFER = 1 << 1;
        const UNIFORM_BUFFER = 1 << 2;
        const SHADER_RESOURCE = 1 << 3;
        const UNORDERED_ACCESS = 1 << 4;
        const INDIRECT_DRAW_ARGS = 1 << 5;
    }
}

/// How a buffer's memory is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    /// Contents never change after creation.
    Static,
    /// Updated by the GPU or by occasional uploads.
    Default,
    /// Rewritten by the CPU every frame.  Dynamic constant buffers get their
    /// descriptor at draw time, so their cached handle may be null.
    Dynamic,
    CpuAccessible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureViewType {
    ShaderResource,
    RenderTarget,
    DepthStencil,
    UnorderedAccess,
}

impl TextureViewType {
    pub const fn literal_name(self) -> &'static str {
        match self {
            TextureViewType::ShaderResource => "shader resource view",
            TextureViewType::RenderTarget => "render target view",
            TextureViewType::DepthStencil => "depth stencil view",
            TextureViewType::UnorderedAccess => "unordered access view",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferViewType {
    ShaderResource,
    UnorderedAccess,
}

impl BufferViewType {
    pub const fn literal_name(self) -> &'static str {
        match self {
            BufferViewType::ShaderResource => "shader resource view",
            BufferViewType::UnorderedAccess => "unordered access view",
        }
    }
}

pub trait Buffer: Debug + Send + Sync {
    fn name(&self) -> &str;
    fn bind_flags(&self) -> BindFlags;
    fn usage(&self) -> Usage;
    /// Constant buffer view descriptor.  Null for buffers without one.
    fn cbv_handle(&self) -> CpuDescriptorHandle;
}

pub trait TextureView: Debug + Send + Sync {
    fn name(&self) -> &str;
    fn view_type(&self) -> TextureViewType;
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle;
    /// Sampler to bind alongside this view when the shader pairs one with the texture.
    fn sampler(&self) -> Option<Arc<dyn Sampler>>;
}

pub trait BufferView: Debug + Send + Sync {
    fn name(&self) -> &str;
    fn view_type(&self) -> BufferViewType;
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle;
}

pub trait Sampler: Debug + Send + Sync {
    fn name(&self) -> &str;
    fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle;
}

/// An owning reference to any bindable device object.
///
/// Two `DeviceObject`s are equal when they refer to the same object.
#[derive(Debug, Clone)]
pub enum DeviceObject {
    Buffer(Arc<dyn Buffer>),
    TextureView(Arc<dyn TextureView>),
    BufferView(Arc<dyn BufferView>),
    Sampler(Arc<dyn Sampler>),
}

impl DeviceObject {
    pub fn name(&self) -> &str {
        match self {
            DeviceObject::Buffer(b) => b.name(),
            DeviceObject::TextureView(v) => v.name(),
            DeviceObject::BufferView(v) => v.name(),
            DeviceObject::Sampler(s) => s.name(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DeviceObject::Buffer(_) => "buffer",
            DeviceObject::TextureView(_) => "texture view",
            DeviceObject::BufferView(_) => "buffer view",
            DeviceObject::Sampler(_) => "sampler",
        }
    }

    /// Address of the referenced object, without the vtable.
    fn address(&self) -> *const () {
        match self {
            DeviceObject::Buffer(b) => Arc::as_ptr(b) as *const (),
            DeviceObject::TextureView(v) => Arc::as_ptr(v) as *const (),
            DeviceObject::BufferView(v) => Arc::as_ptr(v) as *const (),
            DeviceObject::Sampler(s) => Arc::as_ptr(s) as *const (),
        }
    }

    pub fn same_object(&self, other: &DeviceObject) -> bool {
        self.address() == other.address()
    }
}

impl PartialEq for DeviceObject {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl Eq for DeviceObject {}

impl From<Arc<dyn Buffer>> for DeviceObject {
    fn from(value: Arc<dyn Buffer>) -> Self {
        DeviceObject::Buffer(value)
    }
}

impl From<Arc<dyn TextureView>> for DeviceObject {
    fn from(value: Arc<dyn TextureView>) -> Self {
        DeviceObject::TextureView(value)
    }
}

impl From<Arc<dyn BufferView>> for DeviceObject {
    fn from(value: Arc<dyn BufferView>) -> Self {
        DeviceObject::BufferView(value)
    }
}

impl From<Arc<dyn Sampler>> for DeviceObject {
    fn from(value: Arc<dyn Sampler>) -> Self {
        DeviceObject::Sampler(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NamedSampler(&'static str);
    impl Sampler for NamedSampler {
        fn name(&self) -> &str {
            self.0
        }
        fn cpu_descriptor_handle(&self) -> CpuDescriptorHandle {
            CpuDescriptorHandle(1)
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn equality_is_identity() {
        let a: Arc<dyn Sampler> = Arc::new(NamedSampler("linear"));
        let b: Arc<dyn Sampler> = Arc::new(NamedSampler("linear"));
        let a1 = DeviceObject::from(a.clone());
        let a2 = DeviceObject::Sampler(a);
        let b1 = DeviceObject::Sampler(b);
        assert_eq!(a1, a2);
        assert_ne!(a1, b1);
        assert_eq!(a1.type_name(), "sampler");
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn handle_offsets_scale_by_increment() {
        let base = CpuDescriptorHandle(0x1000);
        assert_eq!(base.offset(3, 32), CpuDescriptorHandle(0x1000 + 96));
        assert!(CpuDescriptorHandle::NULL.is_null());
        assert!(!base.is_null());
    }
}
