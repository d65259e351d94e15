//! Direct3D 11 渲染器
//!
//! 持有设备上下文、两个着色器程序、两个深度模板状态和四边形顶点缓冲区。
//! 每帧固定执行 [`FRAME_PASSES`] 中的两次绘制，然后以配置的同步间隔呈现。

use tracing::{debug, info};
use windows::{
    Win32::Foundation::*, Win32::Graphics::Direct3D::*, Win32::Graphics::Direct3D11::*,
    Win32::Graphics::Dxgi::*,
};

use super::buffer::create_vertex_buffer;
use super::context::D3d11Context;
use super::created;
use super::shader::{create_shader, ShaderProgram};
use crate::core::config::GraphicsConfig;
use crate::core::error::{ConfigError, Result};
use crate::core::math::Vector2;
use crate::dx_call;
use crate::gfx::backend::{RenderBackend, Viewport};
use crate::renderer::pipeline::{shader_programs, DepthStencilPreset, FRAME_PASSES};
use crate::renderer::vertex::{QuadRect, VertexPositionTexture};

/// Direct3D 11 渲染器
///
/// 设备资源在 `context` 之前声明，保证先于设备释放。
pub struct D3d11Renderer {
    programs: Vec<ShaderProgram>,
    depth_tested: ID3D11DepthStencilState,
    depth_disabled: ID3D11DepthStencilState,
    vertex_buffer: ID3D11Buffer,
    vsync_interval: u32,
    context: D3d11Context,
}

impl D3d11Renderer {
    /// 初始化设备和交换链，然后创建着色器程序、顶点缓冲区和深度模板状态
    pub fn new(hwnd: HWND, width: u32, height: u32, graphics: &GraphicsConfig) -> Result<Self> {
        let descs = shader_programs(graphics);
        if let Some(missing) = FRAME_PASSES.iter().find(|pass| pass.program >= descs.len()) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.shaders".to_string(),
                reason: format!("draw pass needs shader program {}", missing.program),
            }
            .into());
        }

        let context = D3d11Context::new(hwnd, width, height, graphics)?;
        let device = context.device();

        let programs = descs
            .iter()
            .map(|desc| create_shader(device, desc))
            .collect::<Result<Vec<_>>>()?;

        let quad = &graphics.quad;
        let vertex_buffer = create_vertex_buffer(
            device,
            context.context(),
            QuadRect::from_array(quad.rect),
            Vector2::new(quad.uv_top_left[0], quad.uv_top_left[1]),
            Vector2::new(quad.uv_bottom_right[0], quad.uv_bottom_right[1]),
        )?;

        let depth_tested = create_depth_stencil_state(device, DepthStencilPreset::DepthTested)?;
        let depth_disabled = create_depth_stencil_state(device, DepthStencilPreset::DepthDisabled)?;

        let (width, height) = context.size();
        info!(
            programs = ?programs.iter().map(ShaderProgram::path).collect::<Vec<_>>(),
            msaa_quality = context.msaa_quality(),
            width,
            height,
            "D3D11 renderer ready"
        );

        Ok(Self {
            programs,
            depth_tested,
            depth_disabled,
            vertex_buffer,
            vsync_interval: graphics.vsync_interval,
            context,
        })
    }

    fn depth_state(&self, preset: DepthStencilPreset) -> &ID3D11DepthStencilState {
        match preset {
            DepthStencilPreset::DepthTested => &self.depth_tested,
            DepthStencilPreset::DepthDisabled => &self.depth_disabled,
        }
    }
}

impl RenderBackend for D3d11Renderer {
    fn on_resize(&mut self, width: u32, height: u32) -> Result<Viewport> {
        self.context.resize(width, height)
    }

    fn viewport(&self) -> Viewport {
        self.context.viewport()
    }

    fn render_frame(&mut self) -> Result<()> {
        let context = self.context.context();

        unsafe {
            context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(self.vertex_buffer.clone())),
                Some(&VertexPositionTexture::STRIDE),
                Some(&0),
            );
            context.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP);
        }

        for pass in FRAME_PASSES.iter() {
            unsafe { context.OMSetDepthStencilState(self.depth_state(pass.depth_state), 0) };
            self.programs[pass.program].bind(context);
            unsafe { context.Draw(pass.vertex_count, 0) };
        }

        unsafe {
            dx_call!(self
                .context
                .swap_chain()
                .Present(self.vsync_interval, DXGI_PRESENT(0))
                .ok())
        }?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "Direct3D 11"
    }
}

fn create_depth_stencil_state(
    device: &ID3D11Device,
    preset: DepthStencilPreset,
) -> Result<ID3D11DepthStencilState> {
    let stencil_op = D3D11_DEPTH_STENCILOP_DESC {
        StencilFailOp: D3D11_STENCIL_OP_KEEP,
        StencilDepthFailOp: D3D11_STENCIL_OP_KEEP,
        StencilPassOp: D3D11_STENCIL_OP_KEEP,
        StencilFunc: D3D11_COMPARISON_ALWAYS,
    };

    let desc = D3D11_DEPTH_STENCIL_DESC {
        DepthEnable: preset.depth_enable().into(),
        DepthWriteMask: if preset.depth_write() {
            D3D11_DEPTH_WRITE_MASK_ALL
        } else {
            D3D11_DEPTH_WRITE_MASK_ZERO
        },
        DepthFunc: D3D11_COMPARISON_LESS_EQUAL,
        StencilEnable: false.into(),
        StencilReadMask: 0,
        StencilWriteMask: preset.stencil_write_mask(),
        FrontFace: stencil_op,
        BackFace: stencil_op,
    };

    let mut state = None;
    unsafe { dx_call!(device.CreateDepthStencilState(&desc, Some(&mut state))) }?;
    let state = created(state, "CreateDepthStencilState")?;

    debug!(?preset, "Depth stencil state created");
    Ok(state)
}
