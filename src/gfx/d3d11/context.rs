//! Direct3D 11 设备与交换链
//!
//! # 初始化流程
//!
//! 1. 以硬件驱动创建设备和即时上下文，特性级别必须恰好为 11.0
//! 2. 查询 R8G8B8A8_UNORM 的 4x MSAA 质量级别
//! 3. 通过创建设备所用适配器的 DXGI 工厂创建交换链（单后台缓冲、DISCARD、窗口模式）
//! 4. 按客户区尺寸创建渲染目标视图、深度模板缓冲和视口
//!
//! 设备失败和特性级别不符走 [`InitError`]，其余 API 失败统一由 `dx_call!` 包裹。

use std::mem::ManuallyDrop;

use tracing::{debug, error, info, warn};
use windows::{
    core::*, Win32::Foundation::*, Win32::Graphics::Direct3D::*,
    Win32::Graphics::Direct3D11::*, Win32::Graphics::Dxgi::Common::*, Win32::Graphics::Dxgi::*,
};

use super::created;
use crate::core::config::GraphicsConfig;
use crate::core::error::{InitError, Result};
use crate::dx_call;
use crate::gfx::Viewport;

/// 后台缓冲区格式
pub const BACK_BUFFER_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;
/// 深度模板缓冲区格式
pub const DEPTH_STENCIL_FORMAT: DXGI_FORMAT = DXGI_FORMAT_D24_UNORM_S8_UINT;

const MSAA_SAMPLE_COUNT: u32 = 4;
const SWAP_CHAIN_BUFFER_COUNT: u32 = 1;

/// Direct3D 11 设备上下文
///
/// 释放顺序：渲染目标视图、深度模板视图、交换链、深度缓冲，
/// 然后清空上下文状态，最后释放上下文和设备。
pub struct D3d11Context {
    render_target_view: Option<ID3D11RenderTargetView>,
    depth_stencil_view: Option<ID3D11DepthStencilView>,
    swap_chain: ManuallyDrop<IDXGISwapChain>,
    depth_stencil_buffer: Option<ID3D11Texture2D>,
    context: ID3D11DeviceContext,
    device: ID3D11Device,
    viewport: Viewport,
    enable_4x_msaa: bool,
    msaa_quality: u32,
    width: u32,
    height: u32,
}

impl D3d11Context {
    /// 创建设备、交换链，并按给定客户区尺寸建立视图和视口
    pub fn new(hwnd: HWND, width: u32, height: u32, graphics: &GraphicsConfig) -> Result<Self> {
        info!("Initializing Direct3D 11...");

        let (device, context) = create_device(graphics.debug_layer)?;

        let msaa_quality = unsafe {
            dx_call!(device.CheckMultisampleQualityLevels(BACK_BUFFER_FORMAT, MSAA_SAMPLE_COUNT))
        }?;
        if msaa_quality == 0 {
            warn!("4x MSAA is not supported for the back buffer format");
        }
        debug!(msaa_quality, "4x MSAA quality level");

        let sample_desc = sample_desc(graphics.enable_4x_msaa, msaa_quality);
        let swap_chain = create_swap_chain(&device, hwnd, width, height, sample_desc)?;

        let mut ctx = Self {
            render_target_view: None,
            depth_stencil_view: None,
            swap_chain: ManuallyDrop::new(swap_chain),
            depth_stencil_buffer: None,
            context,
            device,
            viewport: Viewport::default(),
            enable_4x_msaa: graphics.enable_4x_msaa,
            msaa_quality,
            width,
            height,
        };
        ctx.resize(width, height)?;

        info!("Direct3D 11 initialized successfully");
        Ok(ctx)
    }

    pub fn device(&self) -> &ID3D11Device {
        &self.device
    }

    pub fn context(&self) -> &ID3D11DeviceContext {
        &self.context
    }

    pub fn swap_chain(&self) -> &IDXGISwapChain {
        &self.swap_chain
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// 4x MSAA 质量级别
    pub fn msaa_quality(&self) -> u32 {
        self.msaa_quality
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 重建与尺寸相关的资源
    ///
    /// 释放旧的渲染目标视图和深度模板缓冲，调整交换链大小，
    /// 重新创建视图、绑定到输出合并阶段，并设置覆盖整个客户区的视口。
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Viewport> {
        debug!(width, height, "Resizing swap chain");

        self.render_target_view = None;
        self.depth_stencil_view = None;
        self.depth_stencil_buffer = None;

        unsafe {
            // 交换链后台缓冲区上不能残留任何引用
            self.context.OMSetRenderTargets(None, None::<&ID3D11DepthStencilView>);
            dx_call!(self.swap_chain.ResizeBuffers(
                SWAP_CHAIN_BUFFER_COUNT,
                width,
                height,
                BACK_BUFFER_FORMAT,
                DXGI_SWAP_CHAIN_FLAG(0)
            ))?;
        }

        let back_buffer: ID3D11Texture2D = unsafe { dx_call!(self.swap_chain.GetBuffer(0)) }?;
        let mut render_target_view = None;
        unsafe {
            dx_call!(self.device.CreateRenderTargetView(
                &back_buffer,
                None,
                Some(&mut render_target_view)
            ))?;
        }
        let render_target_view = created(render_target_view, "CreateRenderTargetView")?;
        drop(back_buffer);

        let depth_desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DEPTH_STENCIL_FORMAT,
            SampleDesc: sample_desc(self.enable_4x_msaa, self.msaa_quality),
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };

        let mut depth_stencil_buffer = None;
        unsafe {
            dx_call!(self.device.CreateTexture2D(&depth_desc, None, Some(&mut depth_stencil_buffer)))?;
        }
        let depth_stencil_buffer = created(depth_stencil_buffer, "CreateTexture2D")?;

        let mut depth_stencil_view = None;
        unsafe {
            dx_call!(self.device.CreateDepthStencilView(
                &depth_stencil_buffer,
                None,
                Some(&mut depth_stencil_view)
            ))?;
        }
        let depth_stencil_view = created(depth_stencil_view, "CreateDepthStencilView")?;

        let viewport = Viewport::full_client(width, height);
        unsafe {
            self.context
                .OMSetRenderTargets(Some(&[Some(render_target_view.clone())]), &depth_stencil_view);
            self.context.RSSetViewports(Some(&[to_d3d11_viewport(&viewport)]));
        }

        self.render_target_view = Some(render_target_view);
        self.depth_stencil_view = Some(depth_stencil_view);
        self.depth_stencil_buffer = Some(depth_stencil_buffer);
        self.viewport = viewport;
        self.width = width;
        self.height = height;

        Ok(viewport)
    }
}

impl Drop for D3d11Context {
    fn drop(&mut self) {
        self.render_target_view = None;
        self.depth_stencil_view = None;
        // drop 之后不再访问交换链
        unsafe { ManuallyDrop::drop(&mut self.swap_chain) };
        self.depth_stencil_buffer = None;
        unsafe { self.context.ClearState() };
        debug!("Direct3D 11 context released");
    }
}

fn create_device(debug_layer: bool) -> Result<(ID3D11Device, ID3D11DeviceContext)> {
    let mut flags = D3D11_CREATE_DEVICE_BGRA_SUPPORT;
    if debug_layer {
        flags |= D3D11_CREATE_DEVICE_DEBUG;
        debug!("D3D11 debug layer requested");
    }

    let mut device = None;
    let mut context = None;
    let mut feature_level = D3D_FEATURE_LEVEL::default();

    let result = unsafe {
        D3D11CreateDevice(
            None,
            D3D_DRIVER_TYPE_HARDWARE,
            HMODULE::default(),
            flags,
            None,
            D3D11_SDK_VERSION,
            Some(&mut device),
            Some(&mut feature_level),
            Some(&mut context),
        )
    };
    if let Err(e) = result {
        error!("D3D11CreateDevice failed: {}", e);
        return Err(InitError::CreateDevice.into());
    }

    if feature_level != D3D_FEATURE_LEVEL_11_0 {
        error!(?feature_level, "Direct3D feature level 11.0 is required");
        return Err(InitError::FeatureLevelUnsupported.into());
    }

    match (device, context) {
        (Some(device), Some(context)) => {
            info!(?feature_level, "D3D11 device created");
            Ok((device, context))
        }
        _ => {
            error!("D3D11CreateDevice returned no device");
            Err(InitError::CreateDevice.into())
        }
    }
}

fn create_swap_chain(
    device: &ID3D11Device,
    hwnd: HWND,
    width: u32,
    height: u32,
    sample_desc: DXGI_SAMPLE_DESC,
) -> Result<IDXGISwapChain> {
    let desc = DXGI_SWAP_CHAIN_DESC {
        BufferDesc: DXGI_MODE_DESC {
            Width: width,
            Height: height,
            RefreshRate: DXGI_RATIONAL {
                Numerator: 60,
                Denominator: 1,
            },
            Format: BACK_BUFFER_FORMAT,
            ScanlineOrdering: DXGI_MODE_SCANLINE_ORDER_UNSPECIFIED,
            Scaling: DXGI_MODE_SCALING_UNSPECIFIED,
        },
        SampleDesc: sample_desc,
        BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
        BufferCount: SWAP_CHAIN_BUFFER_COUNT,
        OutputWindow: hwnd,
        Windowed: true.into(),
        SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
        Flags: 0,
    };

    // 必须使用创建设备时的那个工厂：Device -> Adapter -> Factory
    let dxgi_device: IDXGIDevice = dx_call!(device.cast())?;
    let adapter: IDXGIAdapter = unsafe { dx_call!(dxgi_device.GetParent()) }?;
    let factory: IDXGIFactory = unsafe { dx_call!(adapter.GetParent()) }?;

    let mut swap_chain = None;
    unsafe {
        dx_call!(factory.CreateSwapChain(device, &desc, &mut swap_chain).ok())?;
    }
    let swap_chain = created(swap_chain, "CreateSwapChain")?;

    debug!(width, height, "Swap chain created");
    Ok(swap_chain)
}

fn sample_desc(enable_4x_msaa: bool, msaa_quality: u32) -> DXGI_SAMPLE_DESC {
    if enable_4x_msaa {
        DXGI_SAMPLE_DESC {
            Count: MSAA_SAMPLE_COUNT,
            Quality: msaa_quality.saturating_sub(1),
        }
    } else {
        DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        }
    }
}

fn to_d3d11_viewport(viewport: &Viewport) -> D3D11_VIEWPORT {
    D3D11_VIEWPORT {
        TopLeftX: viewport.top_left_x,
        TopLeftY: viewport.top_left_y,
        Width: viewport.width,
        Height: viewport.height,
        MinDepth: viewport.min_depth,
        MaxDepth: viewport.max_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WindowConfig;
    use crate::window::win32::Win32Window;

    #[test]
    #[ignore = "needs a Direct3D 11 device and a desktop session"]
    fn test_resize_then_release() {
        let window = Win32Window::new(&WindowConfig::default()).unwrap();
        let graphics = GraphicsConfig {
            debug_layer: false,
            ..GraphicsConfig::default()
        };

        let mut ctx = D3d11Context::new(window.hwnd(), 800, 600, &graphics).unwrap();
        assert_eq!(ctx.size(), (800, 600));

        let viewport = ctx.resize(1024, 768).unwrap();
        assert_eq!((viewport.width, viewport.height), (1024.0, 768.0));
        assert_eq!(ctx.viewport(), viewport);
        assert!(ctx.render_target_view.is_some() && ctx.depth_stencil_view.is_some());

        // 交换链在上下文状态清空之前释放，之后再释放设备
        let device = ctx.device().clone();
        drop(ctx);
        assert!(unsafe { device.GetDeviceRemovedReason() }.is_ok());
    }
}
