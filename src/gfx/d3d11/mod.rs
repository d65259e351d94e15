//! Direct3D 11 图形 API 实现模块
//!
//! - `context`：设备、即时上下文、交换链，以及与窗口尺寸相关的视图和视口
//! - `shader`：从效果文件编译 VS/PS，创建输入布局和常量缓冲区
//! - `buffer`：动态顶点缓冲区
//! - `renderer`：深度模板状态和每帧的固定绘制

pub mod buffer;
pub mod context;
pub mod renderer;
pub mod shader;

// 重新导出常用类型
pub use context::D3d11Context;
pub use renderer::D3d11Renderer;
pub use shader::ShaderProgram;

use windows::Win32::Foundation::E_POINTER;

use crate::core::error::GraphicsCallError;

/// 取出 `Create*` 调用写入的输出参数
///
/// 调用返回成功却没有写入对象时视为 `E_POINTER` 失败，
/// 错误中记录调用方的文件和行号。
#[track_caller]
pub(crate) fn created<T>(out: Option<T>, expression: &str) -> Result<T, GraphicsCallError> {
    let location = std::panic::Location::caller();
    out.ok_or_else(|| {
        GraphicsCallError::new(
            expression,
            location.file(),
            location.line(),
            &windows::core::Error::from(E_POINTER),
        )
    })
}
