//! d3d_app - 最小的 Direct3D 11 演示程序
//!
//! 打开一个 Win32 窗口，初始化 D3D11 设备和交换链，编译两个着色器效果，
//! 每帧用固定的两次绘制渲染全屏四边形。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（配置、日志、错误处理、数学类型）
//! - `window`: 平台无关的窗口消息模型，以及 Win32 实现
//! - `app`: 窗口状态机和帧循环
//! - `gfx`: 图形后端抽象层和 D3D11 实现
//! - `renderer`: 平台无关的顶点、四边形和绘制序列描述
//!
//! # 使用示例
//!
//! ```no_run
//! use d3d_app::app::WindowState;
//! use d3d_app::window::{SizeKind, WindowMessage};
//!
//! let mut state = WindowState::new(800, 600);
//! state.apply(&WindowMessage::EnterSizeMove, true);
//! state.apply(
//!     &WindowMessage::Size { kind: SizeKind::Restored, width: 1024, height: 768 },
//!     true,
//! );
//! assert!(state.resizing);
//! ```

pub mod app;
pub mod core;
pub mod gfx;
pub mod renderer;
pub mod window;
