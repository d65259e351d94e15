//! 应用生命周期
//!
//! [`App`] 持有窗口状态、图形后端和注入的扩展行为：
//!
//! - `handle_message`：按窗口状态机处理一条消息，必要时让后端重建尺寸相关资源
//! - `run`：帧循环。有消息就分发，没有消息就渲染一帧，直到收到退出消息
//!
//! `App` 本身不接触任何原生 API，窗口和设备由 `window::win32` 与 `gfx::d3d11` 提供。

pub mod hooks;
pub mod state;

pub use hooks::{AppHooks, DefaultHooks};
pub use state::{Reaction, WindowState};

use tracing::{debug, info, trace};

use crate::core::error::Result;
use crate::core::Config;
use crate::gfx::{RenderBackend, Viewport};
use crate::window::{MessagePump, PumpEvent, WindowMessage};

/// 一条消息的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Handled,
    /// 请求以给定退出码结束消息循环
    Quit(i32),
}

/// 应用
pub struct App<B: RenderBackend, H: AppHooks = DefaultHooks> {
    config: Config,
    state: WindowState,
    backend: Option<B>,
    hooks: H,
    frames: u64,
}

impl<B: RenderBackend, H: AppHooks> App<B, H> {
    /// 用配置中的初始客户区尺寸创建应用，此时还没有图形后端
    pub fn new(config: Config, hooks: H) -> Self {
        let state = WindowState::new(config.window.width, config.window.height);
        Self {
            config,
            state,
            backend: None,
            hooks,
            frames: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// 当前视口，后端未建立时为 `None`
    pub fn viewport(&self) -> Option<Viewport> {
        self.backend.as_ref().map(|b| b.viewport())
    }

    /// 已渲染的帧数
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// 挂上已完成初始化的图形后端
    ///
    /// 后端在构造时已经按当前客户区尺寸建立了视图和视口。
    pub fn attach_backend(&mut self, backend: B) {
        info!(backend = backend.backend_name(), "Graphics backend attached");
        self.backend = Some(backend);
    }

    /// 处理一条窗口消息
    pub fn handle_message(&mut self, message: WindowMessage) -> Result<MessageOutcome> {
        let reaction = self.state.apply(&message, self.backend.is_some());
        trace!(?message, ?reaction, "Window message");

        match reaction {
            Reaction::None => {}
            Reaction::Resize => self.resize()?,
            Reaction::Quit(code) => {
                info!("Window destroyed, requesting quit");
                return Ok(MessageOutcome::Quit(code));
            }
            Reaction::MouseDown(buttons, x, y) => self.hooks.on_mouse_down(buttons, x, y),
            Reaction::MouseUp(buttons, x, y) => self.hooks.on_mouse_up(buttons, x, y),
            Reaction::MouseMove(buttons, x, y) => self.hooks.on_mouse_move(buttons, x, y),
        }

        Ok(MessageOutcome::Handled)
    }

    /// 处理消息源中已排队的消息（窗口创建期间产生的 WM_SIZE 等）
    pub fn process_pending<P: MessagePump>(&mut self, pump: &mut P) -> Result<()> {
        for message in pump.drain() {
            if let MessageOutcome::Quit(code) = self.handle_message(message)? {
                pump.request_quit(code);
            }
        }
        Ok(())
    }

    /// 帧循环
    ///
    /// 返回退出消息携带的退出码。任何图形错误都会立即结束循环并向上传播。
    pub fn run<P: MessagePump>(&mut self, pump: &mut P) -> Result<i32> {
        info!("Entering main loop...");

        loop {
            match pump.pump() {
                PumpEvent::Quit(code) => {
                    info!(exit_code = code, frames = self.frames, "Main loop finished");
                    return Ok(code);
                }
                PumpEvent::Dispatched(messages) => {
                    for message in messages {
                        if let MessageOutcome::Quit(code) = self.handle_message(message)? {
                            pump.request_quit(code);
                        }
                    }
                }
                PumpEvent::Idle => self.render_frame()?,
            }
        }
    }

    fn render_frame(&mut self) -> Result<()> {
        if let Some(backend) = self.backend.as_mut() {
            backend.render_frame()?;
            self.frames += 1;
            trace!(frame = self.frames, "Frame presented");
        }
        Ok(())
    }

    fn resize(&mut self) -> Result<()> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };

        let (width, height) = (self.state.client_width, self.state.client_height);
        debug!(width, height, "Recreating size-dependent resources");

        let viewport = backend.on_resize(width, height)?;
        self.hooks.on_resized(&viewport);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{AppError, GraphicsCallError};
    use crate::window::{MouseButtons, SizeKind};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct RecordingBackend {
        resizes: Vec<(u32, u32)>,
        frames: usize,
        viewport: Viewport,
        fail_on_frame: Option<usize>,
    }

    impl RenderBackend for RecordingBackend {
        fn on_resize(&mut self, width: u32, height: u32) -> Result<Viewport> {
            self.resizes.push((width, height));
            self.viewport = Viewport::full_client(width, height);
            Ok(self.viewport)
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn render_frame(&mut self) -> Result<()> {
            self.frames += 1;
            if self.fail_on_frame == Some(self.frames) {
                return Err(AppError::Graphics(GraphicsCallError {
                    expression: "self.swap_chain.Present(0, DXGI_PRESENT(0)).ok()".to_string(),
                    file: file!(),
                    line: 1,
                    code: -1,
                    message: "device removed".to_string(),
                }));
            }
            Ok(())
        }

        fn backend_name(&self) -> &str {
            "Recording"
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        downs: Vec<(i32, i32)>,
        ups: Vec<(i32, i32)>,
        moves: Vec<(i32, i32)>,
        resized: Vec<Viewport>,
    }

    impl AppHooks for RecordingHooks {
        fn on_mouse_down(&mut self, _buttons: MouseButtons, x: i32, y: i32) {
            self.downs.push((x, y));
        }

        fn on_mouse_up(&mut self, _buttons: MouseButtons, x: i32, y: i32) {
            self.ups.push((x, y));
        }

        fn on_mouse_move(&mut self, _buttons: MouseButtons, x: i32, y: i32) {
            self.moves.push((x, y));
        }

        fn on_resized(&mut self, viewport: &Viewport) {
            self.resized.push(*viewport);
        }
    }

    /// 按脚本返回事件的消息源；脚本耗尽后报告退出码 -1
    #[derive(Default)]
    struct ScriptedPump {
        script: VecDeque<PumpEvent>,
        pending: Vec<WindowMessage>,
        posted_quit: Option<i32>,
    }

    impl ScriptedPump {
        fn new(script: Vec<PumpEvent>) -> Self {
            Self {
                script: script.into(),
                ..Default::default()
            }
        }
    }

    impl MessagePump for ScriptedPump {
        fn pump(&mut self) -> PumpEvent {
            if let Some(code) = self.posted_quit.take() {
                return PumpEvent::Quit(code);
            }
            self.script.pop_front().unwrap_or(PumpEvent::Quit(-1))
        }

        fn drain(&mut self) -> Vec<WindowMessage> {
            std::mem::take(&mut self.pending)
        }

        fn request_quit(&mut self, exit_code: i32) {
            self.posted_quit = Some(exit_code);
        }
    }

    fn app_with_backend() -> App<RecordingBackend, RecordingHooks> {
        let mut app = App::new(Config::default(), RecordingHooks::default());
        let mut backend = RecordingBackend::default();
        backend.on_resize(800, 600).unwrap();
        app.attach_backend(backend);
        app
    }

    fn resizes(app: &App<RecordingBackend, RecordingHooks>) -> &[(u32, u32)] {
        &app.backend().unwrap().resizes
    }

    fn size(kind: SizeKind, width: u32, height: u32) -> WindowMessage {
        WindowMessage::Size { kind, width, height }
    }

    #[test]
    fn test_viewport_tracks_client_size_after_resize() {
        let mut app = app_with_backend();

        for (w, h) in [(1024, 768), (640, 480), (1920, 1080)] {
            app.handle_message(size(SizeKind::Restored, w, h)).unwrap();
            let viewport = app.viewport().unwrap();
            assert_eq!((viewport.width, viewport.height), (w as f32, h as f32));
            assert_eq!((viewport.min_depth, viewport.max_depth), (0.0, 1.0));
        }
        assert_eq!(app.hooks().resized.len(), 3);
    }

    #[test]
    fn test_no_resize_while_dragging() {
        let mut app = app_with_backend();
        let before = resizes(&app).len();

        app.handle_message(WindowMessage::EnterSizeMove).unwrap();
        for w in 801..=850 {
            app.handle_message(size(SizeKind::Restored, w, 600)).unwrap();
        }
        assert_eq!(resizes(&app).len(), before);

        app.handle_message(WindowMessage::ExitSizeMove).unwrap();
        assert_eq!(resizes(&app).len(), before + 1);
        assert_eq!(resizes(&app).last(), Some(&(850, 600)));
    }

    #[test]
    fn test_minimize_then_restore_resizes_once() {
        let mut app = app_with_backend();
        let before = resizes(&app).len();

        app.handle_message(size(SizeKind::Minimized, 0, 0)).unwrap();
        assert!(app.state().paused && app.state().minimized && !app.state().maximized);
        assert_eq!(resizes(&app).len(), before);

        app.handle_message(size(SizeKind::Restored, 800, 600)).unwrap();
        assert!(!app.state().paused && !app.state().minimized);
        assert_eq!(resizes(&app).len(), before + 1);
    }

    #[test]
    fn test_messages_before_backend_only_record_size() {
        let mut app: App<RecordingBackend, RecordingHooks> =
            App::new(Config::default(), RecordingHooks::default());

        app.handle_message(size(SizeKind::Restored, 784, 561)).unwrap();

        assert_eq!(app.state().client_width, 784);
        assert_eq!(app.state().client_height, 561);
        assert!(app.viewport().is_none());
        assert!(app.hooks().resized.is_empty());
    }

    #[test]
    fn test_mouse_messages_reach_hooks() {
        let mut app = app_with_backend();
        let buttons = MouseButtons(0x0001);

        app.handle_message(WindowMessage::MouseDown { buttons, x: 10, y: 20 }).unwrap();
        app.handle_message(WindowMessage::MouseMove { buttons, x: 11, y: 21 }).unwrap();
        app.handle_message(WindowMessage::MouseUp { buttons, x: 12, y: 22 }).unwrap();

        assert_eq!(app.hooks().downs, vec![(10, 20)]);
        assert_eq!(app.hooks().moves, vec![(11, 21)]);
        assert_eq!(app.hooks().ups, vec![(12, 22)]);
    }

    #[test]
    fn test_run_renders_when_idle_and_returns_quit_code() {
        let mut app = app_with_backend();
        let mut pump = ScriptedPump::new(vec![
            PumpEvent::Idle,
            PumpEvent::Dispatched(vec![WindowMessage::Activate { active: true }]),
            PumpEvent::Idle,
            PumpEvent::Idle,
            PumpEvent::Quit(3),
            PumpEvent::Idle,
        ]);

        let code = app.run(&mut pump).unwrap();

        assert_eq!(code, 3);
        assert_eq!(app.frame_count(), 3);
        assert_eq!(app.backend().unwrap().frames, 3);
    }

    #[test]
    fn test_destroy_posts_quit_zero() {
        let mut app = app_with_backend();
        let mut pump = ScriptedPump::new(vec![
            PumpEvent::Idle,
            PumpEvent::Dispatched(vec![WindowMessage::Destroy]),
            PumpEvent::Idle,
        ]);

        let code = app.run(&mut pump).unwrap();

        assert_eq!(code, 0);
        assert_eq!(app.frame_count(), 1);
    }

    #[test]
    fn test_render_failure_ends_loop() {
        let mut app = app_with_backend();
        let mut pump = ScriptedPump::new(vec![PumpEvent::Idle; 5]);
        app.backend.as_mut().unwrap().fail_on_frame = Some(2);

        let err = app.run(&mut pump).unwrap_err();

        match err {
            AppError::Graphics(e) => assert!(e.to_string().contains("Present")),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(pump.script.len(), 3);
    }

    #[test]
    fn test_process_pending_handles_queued_messages() {
        let mut app: App<RecordingBackend, RecordingHooks> =
            App::new(Config::default(), RecordingHooks::default());
        let mut pump = ScriptedPump::default();
        pump.pending = vec![
            WindowMessage::Activate { active: false },
            size(SizeKind::Restored, 780, 560),
        ];

        app.process_pending(&mut pump).unwrap();

        assert!(app.state().paused);
        assert_eq!(app.state().client_width, 780);
        assert!(pump.drain().is_empty());
    }
}
