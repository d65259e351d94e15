//! 错误处理模块
//!
//! 定义了应用中使用的统一错误类型。
//!
//! # 两条错误路径
//!
//! - [`InitError`]：窗口类注册、窗口创建、设备创建失败。弹出消息框后
//!   初始化返回失败，进程以 0 退出（见 [`AppError::exit_code`]）。
//! - [`GraphicsCallError`]：被 [`dx_call!`](crate::dx_call) 包裹的图形 API
//!   调用失败。携带失败表达式的源码文本、文件、行号和系统错误信息，
//!   一路 `?` 传播到 `main`，显示后终止。
//!
//! 两者刻意保持为不同的类型，调用方可以按可恢复 / 致命分别处理。

use std::fmt;

/// 应用统一的 Result 类型
pub type Result<T> = std::result::Result<T, AppError>;

/// 应用的顶层错误类型
#[derive(Debug)]
pub enum AppError {
    /// 初始化失败（可恢复路径）
    Init(InitError),

    /// 图形 API 调用失败（致命路径）
    Graphics(GraphicsCallError),

    /// 配置错误
    Config(ConfigError),

    /// IO 错误
    Io(std::io::Error),
}

/// 初始化阶段的失败
///
/// 原样对应需要以消息框提示用户的几种情况，`Display` 即消息框文本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// 窗口类注册失败
    RegisterClass,

    /// 窗口创建失败
    CreateWindow,

    /// D3D11 设备创建失败
    CreateDevice,

    /// 设备不支持 11.0 特性级别
    FeatureLevelUnsupported,

    /// 当前平台没有原生窗口 / 图形后端
    UnsupportedPlatform,
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 被包裹的图形 API 调用失败
///
/// 由 [`dx_call!`](crate::dx_call) 构造，不需要手动创建。
#[derive(Debug, Clone)]
pub struct GraphicsCallError {
    /// 失败调用的源码文本
    pub expression: String,
    /// 调用所在的源文件
    pub file: &'static str,
    /// 调用所在的行号
    pub line: u32,
    /// HRESULT
    pub code: i32,
    /// 系统提供的错误描述
    pub message: String,
}

/// 能从中取出 HRESULT 和系统错误描述的失败值
///
/// `dx_call!` 只要求错误类型实现这个 trait，
/// 因此宏本身与 `windows` crate 解耦，可以在任何平台上测试。
pub trait FailureCode {
    /// 原始错误码
    fn code(&self) -> i32;

    /// 人类可读的错误描述
    fn message(&self) -> String;
}

#[cfg(target_os = "windows")]
impl FailureCode for windows::core::Error {
    fn code(&self) -> i32 {
        windows::core::Error::code(self).0
    }

    fn message(&self) -> String {
        windows::core::Error::message(self)
    }
}

impl GraphicsCallError {
    /// 从失败值和调用点信息构造
    pub fn new<E: FailureCode>(expression: &str, file: &'static str, line: u32, failure: &E) -> Self {
        Self {
            expression: expression.to_string(),
            file,
            line,
            code: failure.code(),
            message: failure.message(),
        }
    }
}

/// 包裹一次可能失败的图形 API 调用
///
/// 表达式必须求值为 `Result<T, E>`，其中 `E: FailureCode`。
/// 失败时得到 [`GraphicsCallError`]，记录表达式文本与调用点的文件和行号。
/// 宏本身求值为 `Result<T, GraphicsCallError>`，调用方自行 `?`。
///
/// ```ignore
/// let back_buffer: ID3D11Texture2D = dx_call!(swap_chain.GetBuffer(0))?;
/// ```
#[macro_export]
macro_rules! dx_call {
    ($call:expr) => {
        match $call {
            Ok(value) => Ok(value),
            Err(failure) => Err($crate::core::error::GraphicsCallError::new(
                stringify!($call),
                file!(),
                line!(),
                &failure,
            )),
        }
    };
}

impl AppError {
    /// 进程退出码
    ///
    /// 初始化失败在提示用户后按正常结束处理（0）；当前平台不受支持、
    /// 图形调用失败、配置错误和 IO 错误都返回 1。
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Init(InitError::UnsupportedPlatform) => 1,
            AppError::Init(_) => 0,
            AppError::Graphics(_) | AppError::Config(_) | AppError::Io(_) => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Init(e) => write!(f, "Initialization failed: {}", e),
            AppError::Graphics(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::RegisterClass => write!(f, "RegisterClass Failed."),
            InitError::CreateWindow => write!(f, "CreateWindow Failed."),
            InitError::CreateDevice => write!(f, "D3D11CreateDevice Failed."),
            InitError::FeatureLevelUnsupported => {
                write!(f, "Direct3D Feature Level 11 unsupported.")
            }
            InitError::UnsupportedPlatform => {
                write!(f, "Direct3D 11 requires Windows.")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed in {}; line {}; error: {}",
            self.expression, self.file, self.line, self.message
        )
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Graphics(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for InitError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsCallError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<InitError> for AppError {
    fn from(err: InitError) -> Self {
        AppError::Init(err)
    }
}

impl From<GraphicsCallError> for AppError {
    fn from(err: GraphicsCallError) -> Self {
        AppError::Graphics(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}
