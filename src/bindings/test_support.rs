// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Shared fixtures for the unit tests.

use crate::bindings::device_object::{BindFlags, BufferViewType, DeviceObject, TextureViewType, Usage};
use crate::bindings::resource_kind::ShaderType;
use crate::bindings::resource_mapping::ResourceMappingTable;
use crate::bindings::shader_resources::{
    SamplerAttribs, ShaderResourceAttribs, ShaderResourceSource, ShaderResources,
};
use crate::bindings::variable_type::ShaderVariableType;
use crate::imp::Device;
use crate::imp::software::SoftwareDevice;
use std::sync::Arc;

pub(crate) fn device() -> Arc<dyn Device> {
    Arc::new(SoftwareDevice::new())
}

pub(crate) fn attribs(
    name: &str,
    bind_point: u32,
    bind_count: u32,
    ty: ShaderVariableType,
) -> ShaderResourceAttribs {
    ShaderResourceAttribs::new(name, bind_point, bind_count, ty)
}

/// A pixel shader with every kind of resource and every variable type.
///
/// | Variable     | Kind        | Type    | Register | Sampler                 |
/// |--------------|-------------|---------|----------|-------------------------|
/// | g_Camera     | CB          | static  | b0       |                         |
/// | g_Material   | CB          | mutable | b1       |                         |
/// | g_PerDraw    | CB          | dynamic | b2       |                         |
/// | g_Albedo     | texture SRV | mutable | t0       | g_Albedo_sampler, s0    |
/// | g_Shadow     | texture SRV | static  | t1       | g_Shadow_sampler, s1    |
/// | g_Decals[4]  | texture SRV | mutable | t3       | g_Decals_sampler, s2    |
/// | g_Output     | texture UAV | dynamic | u0       |                         |
/// | g_Lights     | buffer SRV  | dynamic | t2       |                         |
pub(crate) fn pixel_shader_resources() -> Arc<dyn ShaderResourceSource> {
    use ShaderVariableType::*;
    let resources = ShaderResources::builder("PS", ShaderType::Pixel)
        .constant_buffer(attribs("g_Camera", 0, 1, Static))
        .constant_buffer(attribs("g_Material", 1, 1, Mutable))
        .constant_buffer(attribs("g_PerDraw", 2, 1, Dynamic))
        .texture_srv_with_sampler(
            attribs("g_Albedo", 0, 1, Mutable),
            SamplerAttribs::new("g_Albedo_sampler", 0, 1, Mutable),
        )
        .texture_srv_with_sampler(
            attribs("g_Shadow", 1, 1, Static),
            SamplerAttribs::new("g_Shadow_sampler", 1, 1, Static),
        )
        .texture_srv_with_sampler(
            attribs("g_Decals", 3, 4, Mutable),
            SamplerAttribs::new("g_Decals_sampler", 2, 1, Mutable),
        )
        .texture_uav(attribs("g_Output", 0, 1, Dynamic))
        .buffer_srv(attribs("g_Lights", 2, 1, Dynamic))
        .build()
        .expect("fixture resources are valid");
    Arc::new(resources)
}

/// Device objects matching [pixel_shader_resources].
pub(crate) struct Objects {
    pub device: Arc<SoftwareDevice>,
    pub linear_sampler: DeviceObject,
    pub camera: DeviceObject,
    pub material: DeviceObject,
    pub per_draw: DeviceObject,
    pub vertex_buffer: DeviceObject,
    pub albedo: DeviceObject,
    pub normal: DeviceObject,
    pub shadow: DeviceObject,
    /// Shader resource view without a sampler.
    pub unsampled: DeviceObject,
    /// Shader resource view with a sampler other than `linear_sampler`.
    pub point_sampled: DeviceObject,
    pub render_target: DeviceObject,
    pub output: DeviceObject,
    pub lights: DeviceObject,
    pub more_lights: DeviceObject,
}

impl Objects {
    pub fn new() -> Self {
        let device = Arc::new(SoftwareDevice::new());
        let linear = device.create_sampler("linear");
        let point = device.create_sampler("point");
        let sampled = |name: &str| {
            DeviceObject::TextureView(device.create_texture_view(
                name,
                TextureViewType::ShaderResource,
                Some(linear.clone()),
            ))
        };
        let uniform = |name: &str, usage: Usage| {
            DeviceObject::Buffer(device.create_buffer(name, BindFlags::UNIFORM_BUFFER, usage))
        };
        Objects {
            linear_sampler: DeviceObject::Sampler(linear.clone()),
            camera: uniform("camera", Usage::Default),
            material: uniform("material", Usage::Static),
            per_draw: uniform("per draw", Usage::Dynamic),
            vertex_buffer: DeviceObject::Buffer(device.create_buffer(
                "vertices",
                BindFlags::VERTEX_BUFFER,
                Usage::Static,
            )),
            albedo: sampled("albedo"),
            normal: sampled("normal"),
            shadow: sampled("shadow"),
            unsampled: DeviceObject::TextureView(device.create_texture_view(
                "unsampled",
                TextureViewType::ShaderResource,
                None,
            )),
            point_sampled: DeviceObject::TextureView(device.create_texture_view(
                "point sampled",
                TextureViewType::ShaderResource,
                Some(point),
            )),
            render_target: DeviceObject::TextureView(device.create_texture_view(
                "render target",
                TextureViewType::RenderTarget,
                None,
            )),
            output: DeviceObject::TextureView(device.create_texture_view(
                "output",
                TextureViewType::UnorderedAccess,
                None,
            )),
            lights: DeviceObject::BufferView(
                device.create_buffer_view("lights", BufferViewType::ShaderResource),
            ),
            more_lights: DeviceObject::BufferView(
                device.create_buffer_view("more lights", BufferViewType::ShaderResource),
            ),
            device,
        }
    }

    /// Maps every variable of [pixel_shader_resources].
    pub fn mapping(&self) -> ResourceMappingTable {
        let mut mapping = ResourceMappingTable::new();
        mapping
            .add_resource("g_Camera", self.camera.clone())
            .add_resource("g_Material", self.material.clone())
            .add_resource("g_PerDraw", self.per_draw.clone())
            .add_resource("g_Albedo", self.albedo.clone())
            .add_resource("g_Shadow", self.shadow.clone())
            .add_resource_array(
                "g_Decals",
                0,
                [
                    self.albedo.clone(),
                    self.normal.clone(),
                    self.albedo.clone(),
                    self.normal.clone(),
                ],
            )
            .add_resource("g_Output", self.output.clone())
            .add_resource("g_Lights", self.lights.clone());
        mapping
    }
}
