//! d3d_app - Direct3D 11 演示程序入口
//!
//! # 使用方法
//!
//! ```bash
//! # 使用默认配置（config.toml 不存在时使用内置默认值）
//! cargo run
//!
//! # 指定配置文件，开启 4x MSAA
//! cargo run -- --config demo.toml --msaa
//! ```
//!
//! # 退出码
//!
//! - 正常退出：`WM_QUIT` 携带的退出码
//! - 初始化失败（窗口类、窗口、设备、特性级别）：弹出消息框后返回 0
//! - 图形 API 调用失败：弹出标题为 "Error" 的消息框后返回 1
//! - 配置无法解析或无效：返回 1

use d3d_app::core::{log, AppError, Config};
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载配置文件（`--config` 指定，否则 config.toml；文件不存在时用默认值，无法解析时退出）
/// 2. 应用命令行参数覆盖并验证
/// 3. 初始化日志系统
/// 4. 创建窗口和 D3D11 后端，进入帧循环
fn main() {
    let args: Vec<String> = std::env::args().collect();

    // 1. 加载配置（在初始化日志之前）
    let config_path =
        Config::config_path_from_args(&args).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let mut config = match Config::from_file_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    // 2. 应用命令行参数
    config.apply_args(&args);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 3. 初始化日志系统
    log::init_logger(&config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), config = %config_path, "d3d_app starting...");

    let exit_code = match run(config) {
        Ok(code) => code,
        Err(e) => report(&e),
    };

    info!(exit_code, "d3d_app exiting");
    std::process::exit(exit_code);
}

#[cfg(target_os = "windows")]
fn run(config: Config) -> d3d_app::core::Result<i32> {
    use d3d_app::app::{App, DefaultHooks};
    use d3d_app::gfx::D3d11Renderer;
    use d3d_app::window::win32::Win32Window;

    let window = Win32Window::new(&config.window)?;
    tracing::debug!(hwnd = ?window.hwnd(), instance = ?window.instance(), "Main window ready");
    let mut pump = window.pump();

    let mut app: App<D3d11Renderer> = App::new(config, DefaultHooks);
    // 窗口创建期间的 WM_SIZE 只记录尺寸
    app.process_pending(&mut pump)?;

    let (width, height) = (app.state().client_width, app.state().client_height);
    let renderer = D3d11Renderer::new(window.hwnd(), width, height, &app.config().graphics)?;
    app.attach_backend(renderer);

    app.run(&mut pump)
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) -> d3d_app::core::Result<i32> {
    Err(d3d_app::core::InitError::UnsupportedPlatform.into())
}

/// 按错误路径报告并得到退出码
fn report(err: &AppError) -> i32 {
    match err {
        AppError::Init(e) => {
            error!("Initialization failed: {}", e);
            show_message(&e.to_string(), None);
        }
        AppError::Graphics(e) => {
            error!(
                expression = %e.expression,
                file = e.file,
                line = e.line,
                code = e.code,
                "Graphics call failed: {}",
                e.message
            );
            show_message(&e.to_string(), Some("Error"));
        }
        other => error!("{}", other),
    }
    err.exit_code()
}

#[cfg(target_os = "windows")]
fn show_message(text: &str, caption: Option<&str>) {
    d3d_app::window::win32::message_box(text, caption);
}

#[cfg(not(target_os = "windows"))]
fn show_message(text: &str, _caption: Option<&str>) {
    eprintln!("{}", text);
}
