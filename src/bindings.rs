/*! Defines resource layouts, binding caches and the types they are built from */

pub mod variable_type;
pub mod resource_kind;
pub mod device_object;
pub mod shader_resources;
pub mod root_signature;
pub mod resource_mapping;
pub mod resource_cache;
pub mod layout_config;
mod layout_arena;
pub mod layout_records;
pub mod resource_layout;
mod slot_commit;
pub mod binding_engine;
mod static_resources;
pub mod diagnostics;

pub use binding_engine::BindShaderResourcesFlags;
pub use device_object::{
    BindFlags, Buffer, BufferView, BufferViewType, CpuDescriptorHandle, DeviceObject, Sampler,
    TextureView, TextureViewType, Usage,
};
pub use diagnostics::{BindingError, Diagnostics};
pub use layout_config::{LayoutConfig, VariableLookup};
pub use layout_records::{ResourceRecord, SamplerRecord};
pub use resource_cache::{CacheContentType, CachedResource, ResourceCache, RootTable};
pub use resource_kind::{
    DescriptorHeapType, DescriptorRangeType, ResourceKind, ShaderType, descriptor_range_type,
};
pub use resource_layout::{LayoutTarget, ShaderResourceLayout, ShaderVariable};
pub use resource_mapping::{ResourceMapping, ResourceMappingTable};
pub use root_signature::{
    DescriptorRangeDesc, RootParameter, RootSignature, RootSignatureBuilder, RootSlot, StaticSampler,
};
pub use shader_resources::{
    SamplerAttribs, SamplerDesc, ShaderResourceAttribs, ShaderResourceSource, ShaderResources,
};
pub use variable_type::{AllowedVariableTypes, ShaderVariableType};

#[cfg(test)]
pub(crate) mod test_support;
