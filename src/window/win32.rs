//! Win32 窗口实现
//!
//! 注册窗口类、创建主窗口，并把窗口过程收到的消息解码成 [`WindowMessage`]
//! 排入收件箱。收件箱的地址在创建窗口时作为 `lpParam` 传入，
//! 由窗口过程在 `WM_NCCREATE` 中保存到 `GWLP_USERDATA`，不依赖任何全局变量。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, error, info};
use windows::{
    core::*,
    Win32::Foundation::*,
    Win32::Graphics::Gdi::{GetStockObject, UpdateWindow, HBRUSH, NULL_BRUSH},
    Win32::System::LibraryLoader::GetModuleHandleW,
    Win32::UI::WindowsAndMessaging::*,
};

use super::{
    is_activation, make_lresult, min_track_size, point_from_lparam, size_from_lparam,
    MessagePump, MouseButtons, PumpEvent, SizeKind, WindowMessage,
};
use crate::core::config::WindowConfig;
use crate::core::error::{InitError, Result};

const CLASS_NAME: PCWSTR = w!("D3DWndClassName");

/// 窗口过程与消息循环共享的收件箱
type Inbox = RefCell<VecDeque<WindowMessage>>;

/// 主窗口
pub struct Win32Window {
    hwnd: HWND,
    instance: HINSTANCE,
    inbox: Rc<Inbox>,
}

impl Win32Window {
    /// 注册窗口类并创建、显示主窗口
    ///
    /// 窗口大小按客户区计算，创建期间产生的消息留在收件箱中，
    /// 由调用方通过 [`MessagePump::drain`] 取出。
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let instance: HINSTANCE = match unsafe { GetModuleHandleW(None) } {
            Ok(module) => module.into(),
            Err(e) => {
                error!("GetModuleHandleW failed: {}", e);
                return Err(InitError::RegisterClass.into());
            }
        };

        register_class(instance)?;

        let (Ok(right), Ok(bottom)) = (i32::try_from(config.width), i32::try_from(config.height))
        else {
            error!(width = config.width, height = config.height, "Client size out of range");
            return Err(InitError::CreateWindow.into());
        };
        let mut rect = RECT {
            left: 0,
            top: 0,
            right,
            bottom,
        };
        if let Err(e) = unsafe { AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false) } {
            error!("AdjustWindowRect failed: {}", e);
            return Err(InitError::CreateWindow.into());
        }

        let inbox: Rc<Inbox> = Rc::new(RefCell::new(VecDeque::new()));
        let title = HSTRING::from(config.title.as_str());

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                CLASS_NAME,
                &title,
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                rect.right - rect.left,
                rect.bottom - rect.top,
                None,
                None,
                Some(instance),
                Some(Rc::as_ptr(&inbox) as *const _),
            )
        };
        let hwnd = match hwnd {
            Ok(hwnd) => hwnd,
            Err(e) => {
                error!("CreateWindowExW failed: {}", e);
                return Err(InitError::CreateWindow.into());
            }
        };

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }

        info!(
            width = config.width,
            height = config.height,
            title = %config.title,
            "Window created"
        );

        Ok(Self {
            hwnd,
            instance,
            inbox,
        })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn instance(&self) -> HINSTANCE {
        self.instance
    }

    /// 与本窗口共享收件箱的消息源
    pub fn pump(&self) -> Win32Pump {
        Win32Pump {
            inbox: Rc::clone(&self.inbox),
        }
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        // 窗口已被用户关闭时会失败，忽略即可
        let _ = unsafe { DestroyWindow(self.hwnd) };
    }
}

fn register_class(instance: HINSTANCE) -> Result<()> {
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default();
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default();

    let wc = WNDCLASSW {
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: instance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: HBRUSH(unsafe { GetStockObject(NULL_BRUSH) }.0),
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
    };

    if unsafe { RegisterClassW(&wc) } == 0 {
        error!("RegisterClassW failed: {:?}", unsafe { GetLastError() });
        return Err(InitError::RegisterClass.into());
    }
    Ok(())
}

/// 把一条原生消息解码成平台无关的消息，不关心的消息返回 `None`
fn decode(message: u32, wparam: WPARAM, lparam: LPARAM) -> Option<WindowMessage> {
    let buttons = MouseButtons(wparam.0);
    let (x, y) = point_from_lparam(lparam.0);

    let decoded = match message {
        WM_ACTIVATE => WindowMessage::Activate {
            active: is_activation(wparam.0),
        },
        WM_SIZE => {
            let (width, height) = size_from_lparam(lparam.0);
            WindowMessage::Size {
                kind: SizeKind::from_wparam(wparam.0)?,
                width,
                height,
            }
        }
        WM_ENTERSIZEMOVE => WindowMessage::EnterSizeMove,
        WM_EXITSIZEMOVE => WindowMessage::ExitSizeMove,
        WM_DESTROY => WindowMessage::Destroy,
        WM_LBUTTONDOWN | WM_MBUTTONDOWN | WM_RBUTTONDOWN => {
            WindowMessage::MouseDown { buttons, x, y }
        }
        WM_LBUTTONUP | WM_MBUTTONUP | WM_RBUTTONUP => WindowMessage::MouseUp { buttons, x, y },
        WM_MOUSEMOVE => WindowMessage::MouseMove { buttons, x, y },
        _ => return None,
    };
    Some(decoded)
}

extern "system" fn wndproc(hwnd: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match message {
        WM_NCCREATE => {
            unsafe {
                let create_struct = &*(lparam.0 as *const CREATESTRUCTW);
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, create_struct.lpCreateParams as _);
            }
            return unsafe { DefWindowProcW(hwnd, message, wparam, lparam) };
        }
        WM_NCDESTROY => {
            unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
            return unsafe { DefWindowProcW(hwnd, message, wparam, lparam) };
        }
        // Alt + 未匹配的助记键时不发出提示音
        WM_MENUCHAR => return LRESULT(make_lresult(0, MNC_CLOSE as u16)),
        WM_GETMINMAXINFO => {
            let info = lparam.0 as *mut MINMAXINFO;
            if !info.is_null() {
                unsafe {
                    let requested = ((*info).ptMinTrackSize.x, (*info).ptMinTrackSize.y);
                    let (x, y) = min_track_size(requested);
                    (*info).ptMinTrackSize.x = x;
                    (*info).ptMinTrackSize.y = y;
                }
            }
            return LRESULT(0);
        }
        _ => {}
    }

    // WM_NCCREATE 之前和 WM_NCDESTROY 之后没有收件箱
    let user_data = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) };
    let inbox = std::ptr::NonNull::<Inbox>::new(user_data as _);

    match (inbox, decode(message, wparam, lparam)) {
        (Some(inbox), Some(decoded)) => {
            unsafe { inbox.as_ref() }.borrow_mut().push_back(decoded);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, message, wparam, lparam) },
    }
}

/// 基于 `PeekMessageW` 的非阻塞消息源
pub struct Win32Pump {
    inbox: Rc<Inbox>,
}

impl Win32Pump {
    fn take_inbox(&self) -> Vec<WindowMessage> {
        self.inbox.borrow_mut().drain(..).collect()
    }
}

impl MessagePump for Win32Pump {
    fn pump(&mut self) -> PumpEvent {
        let mut msg = MSG::default();

        if unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
            if msg.message == WM_QUIT {
                return PumpEvent::Quit(msg.wParam.0 as i32);
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            return PumpEvent::Dispatched(self.take_inbox());
        }

        // PeekMessageW 会直接分发跨线程发送的消息，它们同样落在收件箱里
        let pending = self.take_inbox();
        if pending.is_empty() {
            PumpEvent::Idle
        } else {
            PumpEvent::Dispatched(pending)
        }
    }

    fn drain(&mut self) -> Vec<WindowMessage> {
        self.take_inbox()
    }

    fn request_quit(&mut self, exit_code: i32) {
        debug!(exit_code, "PostQuitMessage");
        unsafe { PostQuitMessage(exit_code) };
    }
}

/// 模态消息框
///
/// `caption` 为 `None` 时使用系统默认标题（"Error"）。
pub fn message_box(text: &str, caption: Option<&str>) {
    let text = HSTRING::from(text);
    let _ = match caption {
        Some(caption) => unsafe { MessageBoxW(None, &text, &HSTRING::from(caption), MB_OK) },
        None => unsafe { MessageBoxW(None, &text, PCWSTR::null(), MB_OK) },
    };
}
