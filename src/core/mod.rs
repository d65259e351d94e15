//! 核心功能模块
//!
//! 与具体图形 API 无关的基础设施：配置、日志、错误处理和数学类型。
//!
//! # 模块组织
//!
//! - `config`：配置管理，支持从配置文件加载应用设置
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `error`：错误处理，定义统一的错误类型和 `dx_call!` 宏
//! - `math`：向量类型

pub mod config;
pub mod error;
pub mod log;
pub mod math;

// 重新导出常用类型，方便使用
pub use config::{Config, LogLevel};
pub use error::{AppError, ConfigError, GraphicsCallError, InitError, Result};
pub use math::Vector2;
