//! 窗口与消息模块
//!
//! 把原生窗口消息抽象成与平台无关的 [`WindowMessage`]，
//! 并用 [`MessagePump`] 描述帧循环所依赖的消息源。
//!
//! # 消息流
//!
//! ```text
//! PeekMessage ─▶ DispatchMessage ─▶ 窗口过程 ─▶ 收件箱 (WindowMessage)
//!                                                    │
//!                           App::handle_message ◀────┘
//! ```
//!
//! 需要同步应答的消息（`WM_MENUCHAR`、`WM_GETMINMAXINFO`）在窗口过程里直接处理，
//! 其余消息排入收件箱，由 `App` 在同一线程上按顺序消费。

#[cfg(target_os = "windows")]
pub mod win32;

/// 窗口允许拖拽到的最小宽度和高度
pub const MIN_TRACK_SIZE: i32 = 200;

/// `WM_SIZE` 的尺寸变化类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Restored,
    Minimized,
    Maximized,
    /// 其他窗口最大化 / 还原时发给弹出窗口的通知
    MaxShow,
    MaxHide,
}

impl SizeKind {
    /// 从 `WM_SIZE` 的 `wParam` 解码，未知值返回 `None`
    pub fn from_wparam(wparam: usize) -> Option<Self> {
        match wparam {
            0 => Some(SizeKind::Restored),
            1 => Some(SizeKind::Minimized),
            2 => Some(SizeKind::Maximized),
            3 => Some(SizeKind::MaxShow),
            4 => Some(SizeKind::MaxHide),
            _ => None,
        }
    }
}

/// 鼠标按钮 / 修饰键状态，原样保留 `wParam` 的位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseButtons(pub usize);

/// 与平台无关的窗口消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage {
    /// 窗口激活 / 失活
    Activate { active: bool },
    /// 客户区尺寸变化
    Size { kind: SizeKind, width: u32, height: u32 },
    /// 用户开始拖拽边框或标题栏
    EnterSizeMove,
    /// 用户松开边框或标题栏
    ExitSizeMove,
    /// 窗口正在销毁
    Destroy,
    MouseDown { buttons: MouseButtons, x: i32, y: i32 },
    MouseUp { buttons: MouseButtons, x: i32, y: i32 },
    MouseMove { buttons: MouseButtons, x: i32, y: i32 },
}

/// 帧循环从消息源得到的一次结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpEvent {
    /// 分发了一条原生消息，附带窗口过程排入的消息
    Dispatched(Vec<WindowMessage>),
    /// 收到退出消息，附带退出码
    Quit(i32),
    /// 没有待处理的消息
    Idle,
}

/// 帧循环依赖的消息源
pub trait MessagePump {
    /// 非阻塞地取出并分发一条消息
    fn pump(&mut self) -> PumpEvent;

    /// 取出窗口过程已排入但尚未消费的消息
    fn drain(&mut self) -> Vec<WindowMessage>;

    /// 请求以给定退出码结束消息循环
    fn request_quit(&mut self, exit_code: i32);
}

/// 窗口的最小拖拽尺寸
///
/// 无论系统给出的建议值是多少，最小尺寸都被固定为 200×200。
pub fn min_track_size(_requested: (i32, i32)) -> (i32, i32) {
    (MIN_TRACK_SIZE, MIN_TRACK_SIZE)
}

/// 从 `lParam` 取出有符号的 x / y 坐标（`GET_X_LPARAM` / `GET_Y_LPARAM`）
pub fn point_from_lparam(lparam: isize) -> (i32, i32) {
    let x = (lparam & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32;
    (x, y)
}

/// 从 `lParam` 取出无符号的宽 / 高（`LOWORD` / `HIWORD`）
pub fn size_from_lparam(lparam: isize) -> (u32, u32) {
    let width = (lparam & 0xFFFF) as u32;
    let height = ((lparam >> 16) & 0xFFFF) as u32;
    (width, height)
}

/// `WM_ACTIVATE` 是否表示激活
///
/// `LOWORD(wParam)` 为 `WA_INACTIVE`（0）时失活，高位是最小化标志，不参与判断。
pub fn is_activation(wparam: usize) -> bool {
    (wparam & 0xFFFF) != 0
}

/// `MAKELRESULT(low, high)`
pub fn make_lresult(low: u16, high: u16) -> isize {
    ((high as u32) << 16 | low as u32) as isize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_track_size_is_always_clamped() {
        for requested in [(0, 0), (1, 1), (199, 1000), (200, 200), (4096, 50)] {
            assert_eq!(min_track_size(requested), (200, 200));
        }
    }

    #[test]
    fn test_point_from_lparam_sign_extends() {
        assert_eq!(point_from_lparam(0x0020_0010), (16, 32));
        // x = -1, y = -2 (多显示器下坐标可能为负)
        assert_eq!(point_from_lparam(0xFFFE_FFFF), (-1, -2));
    }

    #[test]
    fn test_size_from_lparam() {
        assert_eq!(size_from_lparam((600 << 16) | 800), (800, 600));
        assert_eq!(size_from_lparam(0), (0, 0));
    }

    #[test]
    fn test_size_kind_from_wparam() {
        assert_eq!(SizeKind::from_wparam(0), Some(SizeKind::Restored));
        assert_eq!(SizeKind::from_wparam(1), Some(SizeKind::Minimized));
        assert_eq!(SizeKind::from_wparam(2), Some(SizeKind::Maximized));
        assert_eq!(SizeKind::from_wparam(4), Some(SizeKind::MaxHide));
        assert_eq!(SizeKind::from_wparam(5), None);
    }

    #[test]
    fn test_is_activation() {
        assert!(!is_activation(0));
        // WA_ACTIVE / WA_CLICKACTIVE
        assert!(is_activation(1));
        assert!(is_activation(2));
        // 最小化状态下失活：HIWORD 非零，LOWORD 为 WA_INACTIVE
        assert!(!is_activation(0x0001_0000));
    }

    #[test]
    fn test_make_lresult() {
        // MAKELRESULT(0, MNC_CLOSE)，MNC_CLOSE = 1
        assert_eq!(make_lresult(0, 1), 0x0001_0000);
    }
}
