// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::DescriptorHeapError;
use crate::PipelineState;
use crate::bindings::{
    AllowedVariableTypes, BindShaderResourcesFlags, BindingError, CacheContentType, DeviceObject,
    Diagnostics, ResourceCache, ResourceMapping, ShaderResourceLayout, ShaderType,
    ShaderVariable, ShaderVariableType,
};
use crate::imp::DescriptorHeap;
use std::sync::Arc;

/**
One set of resources for a pipeline.

The instance owns a cache laid out by the pipeline's root signature, and per-shader layouts
cloned from the pipeline's reference layouts.  Mutable and dynamic variables are set here.
Static variables are set on the [crate::Shader] and copied in by
[Self::initialize_static_resources].
*/
#[derive(Debug)]
pub struct ShaderResourceBinding {
    pipeline: Arc<PipelineState>,
    cache: ResourceCache,
    /// Mutable and dynamic variables, one layout per shader.
    layouts: Vec<ShaderResourceLayout>,
    /// Static variables, one layout per shader.
    static_layouts: Vec<ShaderResourceLayout>,
    static_resources_initialized: bool,
}

fn find_layout(layouts: &[ShaderResourceLayout], shader_type: ShaderType) -> Option<&ShaderResourceLayout> {
    layouts.iter().find(|l| l.shader_type() == shader_type)
}

impl ShaderResourceBinding {
    pub fn new(
        pipeline: Arc<PipelineState>,
        heap: &mut dyn DescriptorHeap,
    ) -> Result<Self, DescriptorHeapError> {
        let mut cache = ResourceCache::new(CacheContentType::SrbResources);
        pipeline
            .root_signature()
            .init_resource_cache(&mut cache, heap)?;
        let instance_types =
            AllowedVariableTypes::from_types(&[ShaderVariableType::Mutable, ShaderVariableType::Dynamic]);
        let layouts = pipeline
            .layouts()
            .iter()
            .map(|layout| layout.clone_subset(instance_types, &cache))
            .collect();
        let static_layouts = pipeline
            .layouts()
            .iter()
            .map(|layout| layout.clone_subset(ShaderVariableType::Static.into(), &cache))
            .collect();
        Ok(ShaderResourceBinding {
            pipeline,
            cache,
            layouts,
            static_layouts,
            static_resources_initialized: false,
        })
    }

    pub fn pipeline(&self) -> &Arc<PipelineState> {
        &self.pipeline
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Layout of the mutable and dynamic variables of one shader.
    pub fn layout(&self, shader_type: ShaderType) -> Option<&ShaderResourceLayout> {
        find_layout(&self.layouts, shader_type)
    }

    pub fn static_resources_initialized(&self) -> bool {
        self.static_resources_initialized
    }

    /// Copies every shader's static resources into this instance.
    pub fn initialize_static_resources(&mut self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for (layout, shader) in self.static_layouts.iter().zip(self.pipeline.shaders()) {
            debug_assert_eq!(layout.shader_type(), shader.shader_type());
            let cache = &mut self.cache;
            diagnostics.append(shader.with_static_cache(|static_cache| {
                layout.copy_static_resource_descriptor_handles(
                    cache,
                    shader.static_layout(),
                    static_cache,
                )
            }));
        }
        self.static_resources_initialized = true;
        diagnostics
    }

    /// A mutable or dynamic variable of one of the pipeline's shaders.
    pub fn variable(&self, shader_type: ShaderType, name: &str) -> Option<ShaderVariable<'_>> {
        self.layout(shader_type)?.variable(name)
    }

    pub fn set_variable(
        &mut self,
        shader_type: ShaderType,
        name: &str,
        array_index: u32,
        object: Option<&DeviceObject>,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let Some(layout) = find_layout(&self.layouts, shader_type) else {
            diagnostics.report(BindingError::VariableNotFound {
                name: name.to_string(),
                shader: self.pipeline.name().to_string(),
                shader_type,
            });
            return diagnostics;
        };
        if let Some(variable) = layout.find_variable(name, &mut diagnostics) {
            diagnostics.append(variable.set_element(&mut self.cache, array_index, object));
        }
        diagnostics
    }

    pub fn is_bound(&self, shader_type: ShaderType, name: &str, array_index: u32) -> bool {
        self.variable(shader_type, name)
            .is_some_and(|v| v.is_bound(&self.cache, array_index))
    }

    /// Binds the mutable and dynamic variables of every shader from `mapping`.
    pub fn bind_resources(
        &mut self,
        mapping: Option<&dyn ResourceMapping>,
        flags: BindShaderResourcesFlags,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for layout in &self.layouts {
            diagnostics.append(layout.bind_resources(&mut self.cache, mapping, flags));
        }
        diagnostics
    }

    /// Reports every unbound element of every variable, static ones included.
    pub fn verify_bindings(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for layout in self.static_layouts.iter().chain(&self.layouts) {
            diagnostics.append(layout.verify_bindings(&self.cache));
        }
        diagnostics
    }
}
