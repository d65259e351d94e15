//! 配置管理模块
//!
//! 提供应用配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//! 所有字段都有默认值，缺失或不完整的配置文件等价于内置常量。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "D3D11 Application"
//!
//! [graphics]
//! enable_4x_msaa = false
//! debug_layer = true
//! vsync_interval = 0
//!
//! [[graphics.shaders]]
//! path = "RebuildZBuffer.fx"
//! constant_buffer_size = 112
//!
//! [[graphics.shaders]]
//! path = "CameraMotionBlur.fx"
//! constant_buffer_size = 224
//!
//! [graphics.quad]
//! rect = [0, 0, 1600, 900]
//! uv_top_left = [0.0, 0.0]
//! uv_bottom_right = [1.0, 1.0]
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{AppError, ConfigError, Result};

/// 客户区边长上限，与 D3D11 二维纹理的最大尺寸一致
pub const MAX_WINDOW_DIMENSION: u32 = 16384;

/// DXGI `Present` 接受的最大同步间隔
pub const MAX_VSYNC_INTERVAL: u32 = 4;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 客户区宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 客户区高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 是否启用 4x MSAA
    #[serde(default)]
    pub enable_4x_msaa: bool,

    /// 创建设备时是否带上 D3D11 调试层
    #[serde(default = "default_debug_layer")]
    pub debug_layer: bool,

    /// `Present` 的同步间隔，0 表示不等待垂直同步
    #[serde(default)]
    pub vsync_interval: u32,

    /// 每帧依次使用的两个着色器程序
    #[serde(default = "default_shaders")]
    pub shaders: Vec<ShaderProgramConfig>,

    /// 全屏四边形
    #[serde(default)]
    pub quad: QuadConfig,
}

/// 单个着色器程序：一个效果文件 + 每个阶段的常量缓冲区大小
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderProgramConfig {
    /// 效果文件路径（相对工作目录）
    pub path: String,

    /// 常量缓冲区字节数
    pub constant_buffer_size: u32,
}

/// 屏幕空间四边形配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadConfig {
    /// 像素矩形 [left, top, right, bottom]
    #[serde(default = "default_quad_rect")]
    pub rect: [i32; 4],

    /// 左上角纹理坐标
    #[serde(default = "default_uv_top_left")]
    pub uv_top_left: [f32; 2],

    /// 右下角纹理坐标
    #[serde(default = "default_uv_bottom_right")]
    pub uv_bottom_right: [f32; 2],
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "D3D11 Application".to_string() }
fn default_debug_layer() -> bool { cfg!(debug_assertions) }
fn default_shaders() -> Vec<ShaderProgramConfig> {
    vec![
        ShaderProgramConfig { path: "RebuildZBuffer.fx".to_string(), constant_buffer_size: 112 },
        ShaderProgramConfig { path: "CameraMotionBlur.fx".to_string(), constant_buffer_size: 224 },
    ]
}
fn default_quad_rect() -> [i32; 4] { [0, 0, 1600, 900] }
fn default_uv_top_left() -> [f32; 2] { [0.0, 0.0] }
fn default_uv_bottom_right() -> [f32; 2] { [1.0, 1.0] }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_log_file() -> String { "d3d_app.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            enable_4x_msaa: false,
            debug_layer: default_debug_layer(),
            vsync_interval: 0,
            shaders: default_shaders(),
            quad: QuadConfig::default(),
        }
    }
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            rect: default_quad_rect(),
            uv_top_left: default_uv_top_left(),
            uv_bottom_right: default_uv_bottom_right(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use d3d_app::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), d3d_app::core::AppError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path_str.clone()).into(),
            _ => AppError::Io(e),
        })?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，文件不存在时使用默认配置
    ///
    /// 文件存在但无法解析时返回错误，不会悄悄丢弃其中的设置。
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::from_file(path) {
            Err(AppError::Config(ConfigError::FileNotFound(_))) => Ok(Self::default()),
            other => other,
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 在命令行参数中查找 `--config <path>`
    pub fn config_path_from_args<I>(args: I) -> Option<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let idx = args.iter().position(|a| a == "--config")?;
        args.get(idx + 1).cloned()
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--width <value>`: 设置客户区宽度
    /// - `--height <value>`: 设置客户区高度
    /// - `--msaa`: 启用 4x MSAA
    /// - `--debug-layer`: 启用 D3D11 调试层
    ///
    /// 无法解析的数值被忽略。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--msaa") {
            self.graphics.enable_4x_msaa = true;
        }

        if args.iter().any(|a| a == "--debug-layer") {
            self.graphics.debug_layer = true;
        }

        if let Some(idx) = args.iter().position(|a| a == "--width") {
            if let Some(width) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.window.width = width;
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--height") {
            if let Some(height) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.window.height = height;
            }
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(
                "window.width/height",
                "Window dimensions must be greater than 0",
            ));
        }

        if self.window.width > MAX_WINDOW_DIMENSION || self.window.height > MAX_WINDOW_DIMENSION {
            return Err(invalid(
                "window.width/height",
                "Window dimensions must not exceed 16384",
            ));
        }

        if self.graphics.vsync_interval > MAX_VSYNC_INTERVAL {
            return Err(invalid(
                "graphics.vsync_interval",
                "Sync interval must be between 0 and 4",
            ));
        }

        if self.graphics.shaders.len() != 2 {
            return Err(invalid(
                "graphics.shaders",
                "Exactly two shader programs are drawn per frame",
            ));
        }

        for shader in &self.graphics.shaders {
            if shader.path.is_empty() {
                return Err(invalid("graphics.shaders.path", "Shader path must not be empty"));
            }
            // 常量缓冲区大小必须是 16 的整数倍
            if shader.constant_buffer_size == 0 || shader.constant_buffer_size % 16 != 0 {
                return Err(invalid(
                    "graphics.shaders.constant_buffer_size",
                    "Constant buffer size must be a non-zero multiple of 16",
                ));
            }
        }

        let [left, top, right, bottom] = self.graphics.quad.rect;
        if right <= left || bottom <= top {
            return Err(invalid("graphics.quad.rect", "Quad rectangle must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> AppError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "D3D11 Application");
        assert!(!config.graphics.enable_4x_msaa);
        assert_eq!(config.graphics.vsync_interval, 0);
        assert_eq!(config.graphics.shaders[0].constant_buffer_size, 112);
        assert_eq!(config.graphics.shaders[1].constant_buffer_size, 224);
        assert_eq!(config.graphics.quad.rect, [0, 0, 1600, 900]);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.shaders.pop();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.shaders[0].constant_buffer_size = 100;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.quad.rect = [10, 10, 10, 900];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vsync_interval_limit() {
        let mut config = Config::default();
        config.graphics.vsync_interval = MAX_VSYNC_INTERVAL;
        assert!(config.validate().is_ok());

        config.graphics.vsync_interval = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("graphics.vsync_interval"));
    }

    #[test]
    fn test_window_dimension_limit() {
        let mut config = Config::default();
        config.window.width = MAX_WINDOW_DIMENSION;
        config.window.height = MAX_WINDOW_DIMENSION;
        assert!(config.validate().is_ok());

        config.window.width = 3_000_000_000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.apply_args(["d3d_app", "--height", "16385"]);
        assert!(config.validate().is_err());
    }

    fn temp_config_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("d3d_app_{}_{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = temp_config_path("missing");
        let _ = std::fs::remove_file(&path);

        let config = Config::from_file_or_default(&path).unwrap();
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_unparsable_file_is_reported() {
        let path = temp_config_path("bad_value");
        std::fs::write(
            &path,
            "[window]\nwidth = 1024\n\n[graphics]\nenable_4x_msaa = \"yes\"\n",
        )
        .unwrap();

        let result = Config::from_file_or_default(&path);
        let _ = std::fs::remove_file(&path);

        match result {
            Err(AppError::Config(ConfigError::ParseError(_))) => {}
            other => panic!("expected a parse error, got {:?}", other.map(|c| c.window.width)),
        }
    }

    #[test]
    fn test_save_then_load_keeps_settings() {
        let path = temp_config_path("saved");
        let mut config = Config::default();
        config.window.width = 1280;
        config.window.title = "Motion Blur".to_string();
        config.graphics.enable_4x_msaa = true;
        config.graphics.vsync_interval = 1;
        config.graphics.quad.rect = [0, 0, 1280, 720];
        config.logging.level = LogLevel::Debug;

        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path);
        let _ = std::fs::remove_file(&path);
        let loaded = loaded.unwrap();

        assert_eq!(loaded.window.width, 1280);
        assert_eq!(loaded.window.title, "Motion Blur");
        assert!(loaded.graphics.enable_4x_msaa);
        assert_eq!(loaded.graphics.vsync_interval, 1);
        assert_eq!(loaded.graphics.shaders, config.graphics.shaders);
        assert_eq!(loaded.graphics.quad, config.graphics.quad);
        assert_eq!(loaded.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [window]
            width = 1024

            [graphics]
            enable_4x_msaa = true
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert!(config.graphics.enable_4x_msaa);
        assert_eq!(config.graphics.shaders.len(), 2);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml_str("[window\nwidth = ").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to parse config"));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["d3d_app", "--width", "1280", "--height", "abc", "--msaa"]);

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert!(config.graphics.enable_4x_msaa);
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(
            Config::config_path_from_args(["d3d_app", "--config", "demo.toml"]),
            Some("demo.toml".to_string())
        );
        assert_eq!(Config::config_path_from_args(["d3d_app", "--config"]), None);
    }
}
