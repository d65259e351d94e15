//! 图形后端模块
//!
//! - `backend`：与平台无关的 [`RenderBackend`] trait 和 [`Viewport`]
//! - `d3d11`：Direct3D 11 实现，仅在 Windows 上编译
//!
//! `App` 只依赖 `RenderBackend`，因此帧循环和窗口状态机可以在任何平台上测试。

pub mod backend;
#[cfg(target_os = "windows")]
pub mod d3d11;

pub use backend::{RenderBackend, Viewport};
#[cfg(target_os = "windows")]
pub use d3d11::D3d11Renderer;
