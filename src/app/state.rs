//! 窗口状态机
//!
//! 记录客户区尺寸和暂停 / 最小化 / 最大化 / 拖拽中几个标志，
//! 并决定每条消息是否需要重建与尺寸相关的设备资源。

use crate::window::{MouseButtons, SizeKind, WindowMessage};

/// 一条消息处理后需要 `App` 执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// 只更新了状态
    None,
    /// 需要按当前客户区尺寸重建资源
    Resize,
    /// 请求退出消息循环
    Quit(i32),
    MouseDown(MouseButtons, i32, i32),
    MouseUp(MouseButtons, i32, i32),
    MouseMove(MouseButtons, i32, i32),
}

/// 窗口状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub client_width: u32,
    pub client_height: u32,
    pub paused: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub resizing: bool,
}

impl WindowState {
    pub fn new(client_width: u32, client_height: u32) -> Self {
        Self {
            client_width,
            client_height,
            paused: false,
            minimized: false,
            maximized: false,
            resizing: false,
        }
    }

    /// 应用一条消息
    ///
    /// `device_ready` 为 false 时（窗口创建期间、设备尚未建立）尺寸消息只记录尺寸。
    pub fn apply(&mut self, message: &WindowMessage, device_ready: bool) -> Reaction {
        match *message {
            WindowMessage::Activate { active } => {
                self.paused = !active;
                Reaction::None
            }
            WindowMessage::Size { kind, width, height } => {
                self.client_width = width;
                self.client_height = height;
                if !device_ready {
                    return Reaction::None;
                }
                self.apply_size(kind)
            }
            WindowMessage::EnterSizeMove => {
                self.paused = true;
                self.resizing = true;
                Reaction::None
            }
            WindowMessage::ExitSizeMove => {
                self.paused = false;
                self.resizing = false;
                Reaction::Resize
            }
            WindowMessage::Destroy => Reaction::Quit(0),
            WindowMessage::MouseDown { buttons, x, y } => Reaction::MouseDown(buttons, x, y),
            WindowMessage::MouseUp { buttons, x, y } => Reaction::MouseUp(buttons, x, y),
            WindowMessage::MouseMove { buttons, x, y } => Reaction::MouseMove(buttons, x, y),
        }
    }

    fn apply_size(&mut self, kind: SizeKind) -> Reaction {
        match kind {
            SizeKind::Minimized => {
                self.paused = true;
                self.minimized = true;
                self.maximized = false;
                Reaction::None
            }
            SizeKind::Maximized => {
                self.paused = false;
                self.minimized = false;
                self.maximized = true;
                Reaction::Resize
            }
            SizeKind::Restored => {
                if self.minimized {
                    self.paused = false;
                    self.minimized = false;
                    Reaction::Resize
                } else if self.maximized {
                    self.paused = false;
                    self.maximized = false;
                    Reaction::Resize
                } else if self.resizing {
                    // 拖拽过程中会连续收到 WM_SIZE，等 WM_EXITSIZEMOVE 再统一重建
                    Reaction::None
                } else {
                    // SetWindowPos、全屏切换等 API 调用
                    Reaction::Resize
                }
            }
            SizeKind::MaxShow | SizeKind::MaxHide => Reaction::None,
        }
    }
}
