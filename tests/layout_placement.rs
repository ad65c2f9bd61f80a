// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Where layouts put resources, for both static caches and root signatures.

use resource_binding::bindings::{
    AllowedVariableTypes, CacheContentType, DescriptorHeapType, LayoutConfig, LayoutTarget,
    ResourceCache, ResourceKind, RootParameter, RootSignature, SamplerAttribs, SamplerDesc,
    ShaderResourceAttribs, ShaderResourceLayout, ShaderResources, ShaderType, ShaderVariableType,
};
use resource_binding::imp::software::{SoftwareDescriptorHeap, SoftwareDevice};
use resource_binding::{DescriptorHeapError, PipelineError, PipelineState, Shader};
use std::sync::Arc;

use ShaderVariableType::{Dynamic, Mutable, Static};

fn attribs(name: &str, bind_point: u32, bind_count: u32, ty: ShaderVariableType) -> ShaderResourceAttribs {
    ShaderResourceAttribs::new(name, bind_point, bind_count, ty)
}

fn lighting_shader() -> Arc<ShaderResources> {
    Arc::new(
        ShaderResources::builder("Lighting", ShaderType::Pixel)
            .constant_buffer(attribs("g_Frame", 0, 1, Static))
            .constant_buffer(attribs("g_Bones", 1, 2, Mutable))
            .texture_srv_with_sampler(
                attribs("g_Environment", 0, 1, Static),
                SamplerAttribs::new("g_Environment_sampler", 0, 1, Static),
            )
            .texture_srv_with_sampler(
                attribs("g_Cascades", 2, 3, Static),
                SamplerAttribs::new_static(
                    "g_Cascades_sampler",
                    3,
                    Static,
                    SamplerDesc::default(),
                ),
            )
            .texture_uav(attribs("g_Accumulation", 1, 1, Dynamic))
            .buffer_uav(attribs("g_Counters", 4, 2, Static))
            .build()
            .unwrap(),
    )
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn static_cache_is_addressed_by_bind_point() {
    let device = Arc::new(SoftwareDevice::new());
    let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
    let layout = ShaderResourceLayout::new(
        device,
        lighting_shader(),
        Static.into(),
        LayoutTarget::StaticCache(&mut cache),
        &LayoutConfig::default(),
    );

    // srv, uav, cbv, sampler
    let sizes: Vec<_> = cache.root_tables().iter().map(|t| t.len()).collect();
    assert_eq!(sizes, vec![5, 6, 1, 1]);
    assert_eq!(
        cache.root_table(3).heap_type(),
        Some(DescriptorHeapType::Sampler)
    );
    assert!(cache.root_tables().iter().all(|t| t.shader_visible_range().is_none()));

    let placed: Vec<_> = layout
        .resources(Static)
        .iter()
        .map(|r| (r.name().to_string(), r.kind(), r.root_index(), r.offset()))
        .collect();
    assert_eq!(
        placed,
        vec![
            ("g_Frame".to_string(), ResourceKind::ConstantBuffer, 2, 0),
            ("g_Environment".to_string(), ResourceKind::TextureSrv, 0, 0),
            ("g_Cascades".to_string(), ResourceKind::TextureSrv, 0, 2),
            ("g_Counters".to_string(), ResourceKind::BufferUav, 1, 4),
        ]
    );
    // Only the runtime sampler has a record.
    assert_eq!(layout.sampler_count(Static), 1);
    let environment = layout.variable("g_Environment").unwrap();
    assert_eq!(environment.kind(), ResourceKind::TextureSrv);
    assert!(layout.paired_sampler(&layout.resources(Static)[2]).is_none());
    assert_eq!(layout.resource_count(Mutable), 0);
    assert_eq!(layout.resource_count(Dynamic), 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn cloning_the_static_subset_keeps_every_address() {
    let device = Arc::new(SoftwareDevice::new());
    let mut signature = RootSignature::new();
    let reference = ShaderResourceLayout::new(
        device,
        lighting_shader(),
        AllowedVariableTypes::ALL,
        LayoutTarget::RootSignature(&mut signature),
        &LayoutConfig::default(),
    );
    let cache = ResourceCache::new(CacheContentType::SrbResources);
    let clone = reference.clone_subset(Static.into(), &cache);

    let tuples = |layout: &ShaderResourceLayout| -> Vec<_> {
        layout
            .resources(Static)
            .iter()
            .map(|r| {
                (
                    r.name().to_string(),
                    r.root_index(),
                    r.offset(),
                    r.sampler_index(),
                )
            })
            .collect()
    };
    assert_eq!(tuples(&clone), tuples(&reference));
    assert_eq!(clone.resource_count(Mutable), 0);
    assert_eq!(clone.resource_count(Dynamic), 0);
    assert_eq!(clone.sampler_count(Static), reference.sampler_count(Static));
    assert!(clone.variable("g_Accumulation").is_none());
    assert!(clone.variable("g_Cascades").is_some());
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn root_signature_groups_tables_by_shader_and_dynamism() {
    let device = Arc::new(SoftwareDevice::new());
    let vertex = ShaderResources::builder("Skinning", ShaderType::Vertex)
        .constant_buffer(attribs("g_Frame", 0, 1, Static))
        .buffer_uav(attribs("g_Skin", 0, 1, Mutable))
        .build()
        .unwrap();
    let config = LayoutConfig::default();
    let shaders = vec![
        Arc::new(Shader::new(device.clone(), Arc::new(vertex), &config)),
        Arc::new(Shader::new(device.clone(), lighting_shader(), &config)),
    ];
    let pipeline = Arc::new(PipelineState::new(device.clone(), "deferred", shaders, &config).unwrap());
    let signature = pipeline.root_signature();

    let root_views = signature
        .parameters()
        .iter()
        .filter(|p| matches!(p, RootParameter::ConstantBufferView { .. }))
        .count();
    assert_eq!(root_views, 2);

    let tables: Vec<_> = signature
        .parameters()
        .iter()
        .filter_map(|p| match p {
            RootParameter::DescriptorTable {
                shader_type,
                heap_type,
                dynamic,
                size,
                ..
            } => Some((*shader_type, *heap_type, *dynamic, *size)),
            RootParameter::ConstantBufferView { .. } => None,
        })
        .collect();
    assert_eq!(
        tables,
        vec![
            (ShaderType::Vertex, DescriptorHeapType::CbvSrvUav, false, 1),
            // g_Bones[2], g_Environment, g_Cascades[3], g_Counters[2]
            (ShaderType::Pixel, DescriptorHeapType::CbvSrvUav, false, 8),
            (ShaderType::Pixel, DescriptorHeapType::Sampler, false, 1),
            (ShaderType::Pixel, DescriptorHeapType::CbvSrvUav, true, 1),
        ]
    );
    assert_eq!(signature.static_samplers().len(), 1);
    assert_eq!(signature.static_samplers()[0].texture_name, "g_Cascades");

    let mut heap = SoftwareDescriptorHeap::new(device.clone(), 64, 8);
    let binding = pipeline.create_shader_resource_binding(&mut heap, false).unwrap();
    assert_eq!(heap.available(DescriptorHeapType::CbvSrvUav), 64 - 9);
    assert_eq!(heap.available(DescriptorHeapType::Sampler), 7);
    let visible = binding
        .cache()
        .root_tables()
        .iter()
        .filter(|t| t.shader_visible_range().is_some())
        .count();
    assert_eq!(visible, 3);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn small_heap_fails_instance_creation() {
    let device = Arc::new(SoftwareDevice::new());
    let config = LayoutConfig::default();
    let shader = Arc::new(Shader::new(device.clone(), lighting_shader(), &config));
    let pipeline = Arc::new(PipelineState::new(device.clone(), "lighting", vec![shader], &config).unwrap());

    let mut heap = SoftwareDescriptorHeap::new(device, 4, 8);
    let error = pipeline
        .create_shader_resource_binding(&mut heap, false)
        .unwrap_err();
    assert!(matches!(
        error,
        PipelineError::DescriptorHeap(DescriptorHeapError::OutOfDescriptors {
            heap_type: DescriptorHeapType::CbvSrvUav,
            requested: 8,
            available: 4,
        })
    ));
}
