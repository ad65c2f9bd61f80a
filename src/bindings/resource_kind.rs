// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource kinds and the descriptor ranges and heaps they map onto.

use std::fmt::Display;

/// The kind of descriptor a cache cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ConstantBuffer = 0,
    TextureSrv = 1,
    BufferSrv = 2,
    TextureUav = 3,
    BufferUav = 4,
    Sampler = 5,
}

impl ResourceKind {
    pub const COUNT: usize = 6;

    pub const fn literal_name(self) -> &'static str {
        match self {
            ResourceKind::ConstantBuffer => "constant buffer",
            ResourceKind::TextureSrv => "texture SRV",
            ResourceKind::BufferSrv => "buffer SRV",
            ResourceKind::TextureUav => "texture UAV",
            ResourceKind::BufferUav => "buffer UAV",
            ResourceKind::Sampler => "sampler",
        }
    }

    /// Name of the device object a slot of this kind accepts.
    pub const fn expected_object_name(self) -> &'static str {
        match self {
            ResourceKind::ConstantBuffer => "buffer",
            ResourceKind::TextureSrv | ResourceKind::TextureUav => "texture view",
            ResourceKind::BufferSrv | ResourceKind::BufferUav => "buffer view",
            ResourceKind::Sampler => "sampler",
        }
    }

    pub const fn heap_type(self) -> DescriptorHeapType {
        descriptor_range_type(self).heap_type()
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.literal_name())
    }
}

/// Descriptor range types.
///
/// The discriminants double as the root indices of the four tables of a static
/// resource cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    Srv = 0,
    Uav = 1,
    Cbv = 2,
    Sampler = 3,
}

impl DescriptorRangeType {
    pub const COUNT: usize = 4;

    pub const ALL: [DescriptorRangeType; Self::COUNT] = [
        DescriptorRangeType::Srv,
        DescriptorRangeType::Uav,
        DescriptorRangeType::Cbv,
        DescriptorRangeType::Sampler,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn heap_type(self) -> DescriptorHeapType {
        match self {
            DescriptorRangeType::Sampler => DescriptorHeapType::Sampler,
            _ => DescriptorHeapType::CbvSrvUav,
        }
    }
}

/// Descriptor heaps.  Samplers live in their own heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorHeapType {
    CbvSrvUav,
    Sampler,
}

const RANGE_TYPES: [DescriptorRangeType; ResourceKind::COUNT] = [
    DescriptorRangeType::Cbv,     // ConstantBuffer
    DescriptorRangeType::Srv,     // TextureSrv
    DescriptorRangeType::Srv,     // BufferSrv
    DescriptorRangeType::Uav,     // TextureUav
    DescriptorRangeType::Uav,     // BufferUav
    DescriptorRangeType::Sampler, // Sampler
];

/// Maps a resource kind to the descriptor range it is allocated from.
pub const fn descriptor_range_type(kind: ResourceKind) -> DescriptorRangeType {
    RANGE_TYPES[kind as usize]
}

/// Pipeline stage a shader runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum ShaderType {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
}

impl ShaderType {
    pub const fn literal_name(self) -> &'static str {
        match self {
            ShaderType::Vertex => "vertex shader",
            ShaderType::Pixel => "pixel shader",
            ShaderType::Geometry => "geometry shader",
            ShaderType::Hull => "hull shader",
            ShaderType::Domain => "domain shader",
            ShaderType::Compute => "compute shader",
        }
    }
}

impl Display for ShaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.literal_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn range_types_follow_view_class() {
        assert_eq!(descriptor_range_type(ResourceKind::ConstantBuffer), DescriptorRangeType::Cbv);
        assert_eq!(descriptor_range_type(ResourceKind::TextureSrv), DescriptorRangeType::Srv);
        assert_eq!(descriptor_range_type(ResourceKind::BufferSrv), DescriptorRangeType::Srv);
        assert_eq!(descriptor_range_type(ResourceKind::TextureUav), DescriptorRangeType::Uav);
        assert_eq!(descriptor_range_type(ResourceKind::BufferUav), DescriptorRangeType::Uav);
        assert_eq!(descriptor_range_type(ResourceKind::Sampler), DescriptorRangeType::Sampler);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn only_samplers_use_sampler_heap() {
        for range in DescriptorRangeType::ALL {
            let expected = if range == DescriptorRangeType::Sampler {
                DescriptorHeapType::Sampler
            } else {
                DescriptorHeapType::CbvSrvUav
            };
            assert_eq!(range.heap_type(), expected);
        }
        assert_eq!(ResourceKind::Sampler.heap_type(), DescriptorHeapType::Sampler);
        assert_eq!(ResourceKind::BufferUav.heap_type(), DescriptorHeapType::CbvSrvUav);
    }
}
