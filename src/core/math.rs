//! 数学类型
//!
//! 基于 `nalgebra`，只保留四边形几何需要的向量别名。

pub use nalgebra::Vector2 as Vec2;

/// 二维向量（纹理坐标、屏幕坐标）
pub type Vector2 = Vec2<f32>;
