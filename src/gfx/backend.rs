//! 图形后端的统一抽象接口
//!
//! 应用层只通过 [`RenderBackend`] 与设备交互：窗口尺寸变化时重建与尺寸相关的资源，
//! 空闲时渲染一帧。D3D11 后端实现它，测试使用记录调用的替身实现。

use crate::core::error::Result;

/// 视口
///
/// 字段与 `D3D11_VIEWPORT` 一一对应。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// 覆盖整个客户区、深度范围 [0, 1] 的视口
    pub fn full_client(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::full_client(0, 0)
    }
}

/// 图形后端的统一接口
pub trait RenderBackend {
    /// 按新的客户区尺寸重建渲染目标视图、深度缓冲和视口
    ///
    /// 返回新设置的视口。
    fn on_resize(&mut self, width: u32, height: u32) -> Result<Viewport>;

    /// 当前生效的视口
    fn viewport(&self) -> Viewport;

    /// 渲染并呈现一帧
    fn render_frame(&mut self) -> Result<()>;

    /// 获取后端的名称，用于日志输出
    fn backend_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_client_viewport() {
        let viewport = Viewport::full_client(1280, 720);
        assert_eq!(viewport.top_left_x, 0.0);
        assert_eq!(viewport.top_left_y, 0.0);
        assert_eq!(viewport.width, 1280.0);
        assert_eq!(viewport.height, 720.0);
        assert_eq!(viewport.min_depth, 0.0);
        assert_eq!(viewport.max_depth, 1.0);
    }
}
