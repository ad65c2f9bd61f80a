// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Reflected shader resources.
//!
//! Layouts do not reflect shaders themselves.  They consume a
//! [ShaderResourceSource], which enumerates the resources a shader declares grouped
//! by kind.  [ShaderResources] is a plain in-memory implementation, filled either by a
//! reflection backend or by hand through [ShaderResources::builder].

use crate::ShaderResourcesError;
use crate::bindings::resource_kind::{ResourceKind, ShaderType};
use crate::bindings::variable_type::{AllowedVariableTypes, ShaderVariableType};
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// Suffix that names the sampler paired with a texture: `g_Tex` is sampled with `g_Tex_sampler`.
pub const SAMPLER_SUFFIX: &str = "_sampler";

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderResourceAttribs {
    pub name: Arc<str>,
    /// First register the resource occupies.
    pub bind_point: u32,
    /// Array size; 1 for non-arrays.
    pub bind_count: u32,
    pub variable_type: ShaderVariableType,
    sampler_id: Option<u32>,
}

impl ShaderResourceAttribs {
    pub fn new(
        name: impl Into<Arc<str>>,
        bind_point: u32,
        bind_count: u32,
        variable_type: ShaderVariableType,
    ) -> Self {
        ShaderResourceAttribs {
            name: name.into(),
            bind_point,
            bind_count,
            variable_type,
            sampler_id: None,
        }
    }

    /// Index of the sampler paired with this texture in [ShaderResourceSource::sampler].
    pub fn sampler_id(&self) -> Option<u32> {
        self.sampler_id
    }

    /// Name of one element, as used in diagnostics: `name` or `name[i]` for arrays.
    pub fn print_name(&self, array_index: u32) -> String {
        if self.bind_count > 1 {
            format!("{}[{}]", self.name, array_index)
        } else {
            self.name.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    Point,
    #[default]
    Linear,
    Anisotropic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    Wrap,
    Mirror,
    #[default]
    Clamp,
    Border,
}

/// Description of a sampler that is baked into the root signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDesc {
    pub filter: FilterType,
    pub address_mode: AddressMode,
    pub max_anisotropy: u32,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        SamplerDesc {
            filter: FilterType::default(),
            address_mode: AddressMode::default(),
            max_anisotropy: 1,
        }
    }
}

/// A sampler declared next to a texture.
///
/// Static samplers carry their description and never occupy cache space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerAttribs {
    pub attribs: ShaderResourceAttribs,
    pub static_desc: Option<SamplerDesc>,
}

impl SamplerAttribs {
    /// A sampler that is bound at runtime from the texture view it pairs with.
    pub fn new(
        name: impl Into<Arc<str>>,
        bind_point: u32,
        bind_count: u32,
        variable_type: ShaderVariableType,
    ) -> Self {
        SamplerAttribs {
            attribs: ShaderResourceAttribs::new(name, bind_point, bind_count, variable_type),
            static_desc: None,
        }
    }

    pub fn new_static(
        name: impl Into<Arc<str>>,
        bind_point: u32,
        variable_type: ShaderVariableType,
        desc: SamplerDesc,
    ) -> Self {
        SamplerAttribs {
            attribs: ShaderResourceAttribs::new(name, bind_point, 1, variable_type),
            static_desc: Some(desc),
        }
    }

    pub fn is_static(&self) -> bool {
        self.static_desc.is_some()
    }
}

/// Enumerates the resources a shader declares.
///
/// Implementations must visit resources in the same order every time they are asked.
/// Layouts walk the source twice, once to count and once to place, and rely on the
/// two walks agreeing.
pub trait ShaderResourceSource: Debug + Send + Sync {
    fn shader_type(&self) -> ShaderType;
    fn shader_name(&self) -> &str;
    fn sampler(&self, id: u32) -> &SamplerAttribs;
    /// Visits every resource whose variable type is in `allowed`: constant buffers, then
    /// texture SRVs, texture UAVs, buffer SRVs and buffer UAVs.
    fn for_each_resource(
        &self,
        allowed: AllowedVariableTypes,
        visit: &mut dyn FnMut(ResourceKind, &ShaderResourceAttribs),
    );
}

#[derive(Debug, Clone)]
pub struct ShaderResources {
    shader_name: String,
    shader_type: ShaderType,
    constant_buffers: Vec<ShaderResourceAttribs>,
    texture_srvs: Vec<ShaderResourceAttribs>,
    texture_uavs: Vec<ShaderResourceAttribs>,
    buffer_srvs: Vec<ShaderResourceAttribs>,
    buffer_uavs: Vec<ShaderResourceAttribs>,
    samplers: Vec<SamplerAttribs>,
}

impl ShaderResources {
    pub fn builder(shader_name: impl Into<String>, shader_type: ShaderType) -> ShaderResourcesBuilder {
        ShaderResourcesBuilder {
            resources: ShaderResources {
                shader_name: shader_name.into(),
                shader_type,
                constant_buffers: Vec::new(),
                texture_srvs: Vec::new(),
                texture_uavs: Vec::new(),
                buffer_srvs: Vec::new(),
                buffer_uavs: Vec::new(),
                samplers: Vec::new(),
            },
            names: HashSet::new(),
            error: None,
        }
    }

    /// Number of non-sampler resources.
    pub fn resource_count(&self) -> usize {
        self.constant_buffers.len()
            + self.texture_srvs.len()
            + self.texture_uavs.len()
            + self.buffer_srvs.len()
            + self.buffer_uavs.len()
    }

    pub fn samplers(&self) -> &[SamplerAttribs] {
        &self.samplers
    }
}

impl ShaderResourceSource for ShaderResources {
    fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    fn shader_name(&self) -> &str {
        &self.shader_name
    }

    fn sampler(&self, id: u32) -> &SamplerAttribs {
        &self.samplers[id as usize]
    }

    fn for_each_resource(
        &self,
        allowed: AllowedVariableTypes,
        visit: &mut dyn FnMut(ResourceKind, &ShaderResourceAttribs),
    ) {
        let groups = [
            (ResourceKind::ConstantBuffer, &self.constant_buffers),
            (ResourceKind::TextureSrv, &self.texture_srvs),
            (ResourceKind::TextureUav, &self.texture_uavs),
            (ResourceKind::BufferSrv, &self.buffer_srvs),
            (ResourceKind::BufferUav, &self.buffer_uavs),
        ];
        for (kind, resources) in groups {
            for attribs in resources
                .iter()
                .filter(|a| allowed.contains(a.variable_type))
            {
                visit(kind, attribs);
            }
        }
    }
}

/// Collects resources for a [ShaderResources].
///
/// The first invalid declaration is remembered and returned from [Self::build].
#[derive(Debug)]
pub struct ShaderResourcesBuilder {
    resources: ShaderResources,
    names: HashSet<Arc<str>>,
    error: Option<ShaderResourcesError>,
}

impl ShaderResourcesBuilder {
    pub fn constant_buffer(self, attribs: ShaderResourceAttribs) -> Self {
        self.push(attribs, |r| &mut r.constant_buffers)
    }

    pub fn texture_srv(self, attribs: ShaderResourceAttribs) -> Self {
        self.push(attribs, |r| &mut r.texture_srvs)
    }

    /// Declares a texture together with the sampler it is sampled with.
    pub fn texture_srv_with_sampler(
        mut self,
        mut texture: ShaderResourceAttribs,
        sampler: SamplerAttribs,
    ) -> Self {
        if self.error.is_none() {
            self.error = Self::check_sampler(&texture, &sampler);
        }
        if self.error.is_some() {
            return self;
        }
        if !self.claim_name(&sampler.attribs) {
            return self;
        }
        texture.sampler_id = Some(self.resources.samplers.len() as u32);
        self.resources.samplers.push(sampler);
        self.push(texture, |r| &mut r.texture_srvs)
    }

    pub fn texture_uav(self, attribs: ShaderResourceAttribs) -> Self {
        self.push(attribs, |r| &mut r.texture_uavs)
    }

    pub fn buffer_srv(self, attribs: ShaderResourceAttribs) -> Self {
        self.push(attribs, |r| &mut r.buffer_srvs)
    }

    pub fn buffer_uav(self, attribs: ShaderResourceAttribs) -> Self {
        self.push(attribs, |r| &mut r.buffer_uavs)
    }

    pub fn build(self) -> Result<ShaderResources, ShaderResourcesError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.resources),
        }
    }

    fn push(
        mut self,
        attribs: ShaderResourceAttribs,
        group: impl FnOnce(&mut ShaderResources) -> &mut Vec<ShaderResourceAttribs>,
    ) -> Self {
        if self.error.is_some() || !self.claim_name(&attribs) {
            return self;
        }
        group(&mut self.resources).push(attribs);
        self
    }

    fn claim_name(&mut self, attribs: &ShaderResourceAttribs) -> bool {
        if attribs.bind_count == 0 {
            self.error = Some(ShaderResourcesError::ZeroBindCount {
                name: attribs.name.to_string(),
            });
            return false;
        }
        if attribs.bind_point.checked_add(attribs.bind_count).is_none() {
            self.error = Some(ShaderResourcesError::BindRangeOverflow {
                name: attribs.name.to_string(),
                bind_point: attribs.bind_point,
                bind_count: attribs.bind_count,
            });
            return false;
        }
        if !self.names.insert(attribs.name.clone()) {
            self.error = Some(ShaderResourcesError::DuplicateName {
                name: attribs.name.to_string(),
            });
            return false;
        }
        true
    }

    fn check_sampler(
        texture: &ShaderResourceAttribs,
        sampler: &SamplerAttribs,
    ) -> Option<ShaderResourcesError> {
        let expected_name = format!("{}{}", texture.name, SAMPLER_SUFFIX);
        if &*sampler.attribs.name != expected_name.as_str() {
            return Some(ShaderResourcesError::SamplerName {
                texture: texture.name.to_string(),
                sampler: sampler.attribs.name.to_string(),
            });
        }
        if sampler.attribs.variable_type != texture.variable_type {
            return Some(ShaderResourcesError::InconsistentSamplerType {
                texture: texture.name.to_string(),
                sampler: sampler.attribs.name.to_string(),
                texture_type: texture.variable_type,
                sampler_type: sampler.attribs.variable_type,
            });
        }
        let count = sampler.attribs.bind_count;
        if count != 1 && count != texture.bind_count {
            return Some(ShaderResourcesError::SamplerBindCount {
                texture: texture.name.to_string(),
                sampler: sampler.attribs.name.to_string(),
                texture_count: texture.bind_count,
                sampler_count: count,
            });
        }
        None
    }
}
