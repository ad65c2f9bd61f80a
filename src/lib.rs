/*! resource_binding maps a shader's declared resources onto descriptor tables and keeps
  the bound objects alive while they are in use.

Explicit GPU APIs do not let shaders reach resources by name.  Every constant buffer, view and
sampler a shader declares has to land in a slot of some descriptor table, and the application
has to put the right descriptor in that slot before drawing.  This crate is the layer between
"the shader wants `g_Albedo`" and "root table 3, offset 7 holds a copy of this view's descriptor".

# Variable types

Each shader variable carries one of three variable types, which decide where it lives and
how often it may change:

| Type    | Stored in                                    | Expected to change            |
|---------|----------------------------------------------|-------------------------------|
| Static  | The shader's static cache, by bind point     | Once, before any binding use  |
| Mutable | A binding instance's cache, by root address  | Once per binding instance     |
| Dynamic | A binding instance's cache, by root address  | Any time, typically per draw  |

Rebinding a non-dynamic variable is allowed but reported, because a descriptor that was
already copied into shader-visible memory may be in flight.

# Moving parts

* [bindings::ShaderResourceLayout] is built once per shader (against a static cache) or once per
  pipeline per shader (against a [bindings::RootSignature]).  It counts, places and indexes
  the records for every resource.
* [bindings::ResourceCache] holds the bound objects and their descriptor handles.
* [bindings::ShaderResourceLayout::bind_resources] resolves variables through a
  [bindings::ResourceMapping] and commits them with validation.
* [Shader], [PipelineState] and [ShaderResourceBinding] tie these together the way a renderer
  uses them.

# Backends

The layer talks to the GPU through the traits in [imp].  A software backend that keeps
descriptor memory on the CPU is always available and is what the tests run against.  The
`backend_wgpu` feature adds objects backed by wgpu.

*/

pub mod bindings;
pub mod imp;
mod error;
mod shader;
mod pipeline;
mod shader_resource_binding;

pub use error::{DescriptorHeapError, PipelineError, ShaderResourcesError};
pub use pipeline::PipelineState;
pub use shader::Shader;
pub use shader_resource_binding::ShaderResourceBinding;
