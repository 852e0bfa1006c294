pub mod binding;
pub mod context;
pub mod cube;
pub mod depth;
pub mod error;
pub mod instances;
pub mod lights;
pub mod pipeline_builder;
pub mod program;
pub mod renderer;
pub mod uniforms;

pub use binding::{AttributeLayout, GeometryBinding};
pub use context::{request_device, RenderContext};
pub use cube::{CubeMesh, RegionLayout, VertexAttributeSet, CUBE_VERTEX_COUNT};
pub use depth::{Depth, DEPTH_FORMAT};
pub use error::RenderError;
pub use instances::{InstanceRaw, InstanceStaging, InstanceTransformBuffer, MAX_INSTANCES};
pub use lights::{LightSlots, MAX_LIGHTS};
pub use program::{BoundProgram, ProgramTargets, ShaderDiagnostic, ShaderStage, ShadingProgram};
pub use renderer::Renderer;
pub use uniforms::{PhongUniform, ShaderUniformState};
