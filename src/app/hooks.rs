//! 应用扩展点
//!
//! 派生应用通过实现 [`AppHooks`] 注入自己的行为，而不是继承 `App`。
//! 所有方法都有空的默认实现。

use crate::gfx::Viewport;
use crate::window::MouseButtons;

/// 注入到 `App` 中的行为对象
pub trait AppHooks {
    /// 鼠标按下（左 / 中 / 右键）
    fn on_mouse_down(&mut self, _buttons: MouseButtons, _x: i32, _y: i32) {}

    /// 鼠标释放
    fn on_mouse_up(&mut self, _buttons: MouseButtons, _x: i32, _y: i32) {}

    /// 鼠标移动
    fn on_mouse_move(&mut self, _buttons: MouseButtons, _x: i32, _y: i32) {}

    /// 后端完成一次尺寸相关资源的重建之后调用
    fn on_resized(&mut self, _viewport: &Viewport) {}
}

/// 不做任何事的默认行为
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl AppHooks for DefaultHooks {}
