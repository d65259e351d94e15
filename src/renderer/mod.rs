//! 渲染器模块
//!
//! 与具体图形 API 无关的渲染数据：顶点格式、全屏四边形几何、
//! 着色器程序描述和每帧的绘制序列。具体 API 调用在 `gfx` 模块中。

pub mod pipeline;
pub mod vertex;

pub use pipeline::{DepthStencilPreset, DrawPass, ShaderProgramDesc, FRAME_PASSES};
pub use vertex::{screen_quad, QuadRect, VertexPositionTexture};
