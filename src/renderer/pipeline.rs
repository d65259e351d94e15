//! 渲染管线描述
//!
//! 与图形 API 无关的管线数据：着色器程序的编译参数、两种深度模板预设、
//! 以及每帧固定执行的两次绘制。D3D11 后端把这些描述翻译成具体的 API 调用。

use crate::core::config::{GraphicsConfig, ShaderProgramConfig};
use super::vertex::QUAD_VERTEX_COUNT;

/// 顶点着色器入口
pub const VS_ENTRY: &str = "VS";
/// 像素着色器入口
pub const PS_ENTRY: &str = "PS";
/// 顶点着色器 profile（Shader Model 4.0）
pub const VS_PROFILE: &str = "vs_4_0";
/// 像素着色器 profile（Shader Model 4.0）
pub const PS_PROFILE: &str = "ps_4_0";

/// 一个着色器程序的描述：同一个效果文件编译出 VS + PS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgramDesc {
    pub path: String,
    pub constant_buffer_size: u32,
}

impl ShaderProgramDesc {
    /// `(入口, profile)`，按编译顺序：先 VS 后 PS
    pub fn stages(&self) -> [(&'static str, &'static str); 2] {
        [(VS_ENTRY, VS_PROFILE), (PS_ENTRY, PS_PROFILE)]
    }
}

impl From<&ShaderProgramConfig> for ShaderProgramDesc {
    fn from(config: &ShaderProgramConfig) -> Self {
        Self {
            path: config.path.clone(),
            constant_buffer_size: config.constant_buffer_size,
        }
    }
}

/// 深度模板状态预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthStencilPreset {
    /// 深度测试开启（LESS_EQUAL），写入全部深度
    DepthTested,
    /// 深度测试关闭，深度写入掩码为零
    DepthDisabled,
}

impl DepthStencilPreset {
    pub fn depth_enable(&self) -> bool {
        matches!(self, DepthStencilPreset::DepthTested)
    }

    pub fn depth_write(&self) -> bool {
        matches!(self, DepthStencilPreset::DepthTested)
    }

    /// 两种预设共享的模板写掩码
    pub fn stencil_write_mask(&self) -> u8 {
        0xFF
    }
}

/// 一次绘制：深度状态 + 着色器程序下标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPass {
    pub depth_state: DepthStencilPreset,
    pub program: usize,
    pub vertex_count: u32,
}

/// 每帧的固定绘制序列
///
/// 第一遍使用深度测试 + 程序 0，第二遍关闭深度 + 程序 1。
pub const FRAME_PASSES: [DrawPass; 2] = [
    DrawPass {
        depth_state: DepthStencilPreset::DepthTested,
        program: 0,
        vertex_count: QUAD_VERTEX_COUNT,
    },
    DrawPass {
        depth_state: DepthStencilPreset::DepthDisabled,
        program: 1,
        vertex_count: QUAD_VERTEX_COUNT,
    },
];

/// 从图形配置得到两个着色器程序的描述
pub fn shader_programs(graphics: &GraphicsConfig) -> Vec<ShaderProgramDesc> {
    graphics.shaders.iter().map(ShaderProgramDesc::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_passes() {
        assert_eq!(FRAME_PASSES[0].depth_state, DepthStencilPreset::DepthTested);
        assert_eq!(FRAME_PASSES[0].program, 0);
        assert_eq!(FRAME_PASSES[1].depth_state, DepthStencilPreset::DepthDisabled);
        assert_eq!(FRAME_PASSES[1].program, 1);
        assert!(FRAME_PASSES.iter().all(|p| p.vertex_count == 4));
    }

    #[test]
    fn test_depth_presets() {
        assert!(DepthStencilPreset::DepthTested.depth_enable());
        assert!(DepthStencilPreset::DepthTested.depth_write());
        assert!(!DepthStencilPreset::DepthDisabled.depth_enable());
        assert!(!DepthStencilPreset::DepthDisabled.depth_write());
        assert_eq!(DepthStencilPreset::DepthDisabled.stencil_write_mask(), 0xFF);
    }

    #[test]
    fn test_default_shader_programs() {
        let programs = shader_programs(&GraphicsConfig::default());
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0].path, "RebuildZBuffer.fx");
        assert_eq!(programs[0].constant_buffer_size, 112);
        assert_eq!(programs[1].path, "CameraMotionBlur.fx");
        assert_eq!(programs[1].constant_buffer_size, 224);
        assert_eq!(programs[0].stages(), [("VS", "vs_4_0"), ("PS", "ps_4_0")]);
    }
}
