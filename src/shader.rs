// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::bindings::{
    BindShaderResourcesFlags, CacheContentType, DeviceObject, Diagnostics, LayoutConfig,
    LayoutTarget, ResourceCache, ResourceMapping, ShaderResourceLayout, ShaderResourceSource,
    ShaderType, ShaderVariableType,
};
use crate::imp::Device;
use std::sync::{Arc, Mutex};

/**
A shader and the resources bound to its static variables.

Static variables are shared by every pipeline and binding instance that uses the shader.
They are bound here, once, and copied into each binding instance's cache when the
instance is initialized.

A `Shader` is usually shared as `Arc<Shader>` between pipelines; the static cache is
behind a mutex.
*/
#[derive(Debug)]
pub struct Shader {
    resources: Arc<dyn ShaderResourceSource>,
    static_layout: ShaderResourceLayout,
    static_cache: Mutex<ResourceCache>,
}

impl Shader {
    pub fn new(
        device: Arc<dyn Device>,
        resources: Arc<dyn ShaderResourceSource>,
        config: &LayoutConfig,
    ) -> Self {
        let mut static_cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let static_layout = ShaderResourceLayout::new(
            device,
            resources.clone(),
            ShaderVariableType::Static.into(),
            LayoutTarget::StaticCache(&mut static_cache),
            config,
        );
        Shader {
            resources,
            static_layout,
            static_cache: Mutex::new(static_cache),
        }
    }

    pub fn name(&self) -> &str {
        self.resources.shader_name()
    }

    pub fn shader_type(&self) -> ShaderType {
        self.resources.shader_type()
    }

    pub fn resources(&self) -> &Arc<dyn ShaderResourceSource> {
        &self.resources
    }

    /// Layout of the static variables, addressed by bind point.
    pub fn static_layout(&self) -> &ShaderResourceLayout {
        &self.static_layout
    }

    pub fn static_variable_count(&self) -> usize {
        self.static_layout.variable_count()
    }

    pub fn set_static(&self, name: &str, object: Option<&DeviceObject>) -> Diagnostics {
        self.set_static_element(name, 0, object)
    }

    pub fn set_static_element(
        &self,
        name: &str,
        array_index: u32,
        object: Option<&DeviceObject>,
    ) -> Diagnostics {
        let mut cache = self.static_cache.lock().unwrap();
        self.static_layout
            .set_variable(&mut cache, name, array_index, object)
    }

    /// Binds the static variables from `mapping`.
    pub fn bind_resources(
        &self,
        mapping: Option<&dyn ResourceMapping>,
        flags: BindShaderResourcesFlags,
    ) -> Diagnostics {
        let mut cache = self.static_cache.lock().unwrap();
        self.static_layout.bind_resources(&mut cache, mapping, flags)
    }

    pub fn is_static_bound(&self, name: &str, array_index: u32) -> bool {
        let cache = self.static_cache.lock().unwrap();
        self.static_layout
            .variable(name)
            .is_some_and(|v| v.is_bound(&cache, array_index))
    }

    pub fn verify_static_bindings(&self) -> Diagnostics {
        let cache = self.static_cache.lock().unwrap();
        self.static_layout.verify_bindings(&cache)
    }

    /// Runs `f` with the static cache locked.
    pub fn with_static_cache<R>(&self, f: impl FnOnce(&ResourceCache) -> R) -> R {
        let cache = self.static_cache.lock().unwrap();
        f(&cache)
    }
}
