//! 顶点数据定义
//!
//! 本模块定义了全屏四边形使用的顶点结构体，以及从像素矩形生成四个顶点的函数。
//!
//! # 设计说明
//!
//! - 使用 `#[repr(C)]` 确保内存布局与 HLSL 输入布局一致
//! - 实现 `Pod` 和 `Zeroable` trait 以支持零拷贝写入映射后的顶点缓冲区
//! - 纹理坐标使用数学库的 `Vector2` 传入

use bytemuck::{Pod, Zeroable};
use crate::core::math::Vector2;

/// 四边形的顶点个数（三角形带）
pub const QUAD_VERTEX_COUNT: u32 = 4;

/// 位置 + 纹理坐标顶点
///
/// # 内存布局
///
/// - `position`：偏移 0，3 个 f32（对应 `POSITION`，R32G32B32_FLOAT）
/// - `tex_coord`：偏移 12，2 个 f32（对应 `TEXCOORD`，R32G32_FLOAT）
///
/// 总大小：20 字节
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionTexture {
    /// 屏幕空间位置，z 恒为 0
    pub position: [f32; 3],
    /// 纹理坐标
    pub tex_coord: [f32; 2],
}

impl VertexPositionTexture {
    /// 字节步长，绑定顶点缓冲区时使用
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    /// `TEXCOORD` 元素的字节偏移
    pub const TEX_COORD_OFFSET: u32 = 12;

    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, 0.0],
            tex_coord: [u, v],
        }
    }
}

/// 像素矩形
///
/// 与 Win32 `RECT` 同义：`right`/`bottom` 为开区间边界。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl QuadRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// 从配置中的 `[left, top, right, bottom]` 数组构造
    pub fn from_array(rect: [i32; 4]) -> Self {
        Self::new(rect[0], rect[1], rect[2], rect[3])
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// 生成屏幕空间四边形的四个顶点
///
/// 顶点按三角形带顺序排列：左上、右上、左下、右下。
/// 每个角的纹理坐标取自对应的 UV 角：
///
/// ```text
/// 0 (left, top)    ── 1 (right, top)
///   │            ╱     │
/// 2 (left, bottom) ── 3 (right, bottom)
/// ```
///
/// # 示例
///
/// ```
/// use d3d_app::core::Vector2;
/// use d3d_app::renderer::vertex::{screen_quad, QuadRect};
///
/// let quad = screen_quad(
///     QuadRect::new(0, 0, 1600, 900),
///     Vector2::new(0.0, 0.0),
///     Vector2::new(1.0, 1.0),
/// );
/// assert_eq!(quad[3].position, [1600.0, 900.0, 0.0]);
/// ```
pub fn screen_quad(
    rect: QuadRect,
    uv_top_left: Vector2,
    uv_bottom_right: Vector2,
) -> [VertexPositionTexture; 4] {
    let left = rect.left as f32;
    let top = rect.top as f32;
    let right = rect.right as f32;
    let bottom = rect.bottom as f32;

    [
        VertexPositionTexture::new(left, top, uv_top_left.x, uv_top_left.y),
        VertexPositionTexture::new(right, top, uv_bottom_right.x, uv_top_left.y),
        VertexPositionTexture::new(left, bottom, uv_top_left.x, uv_bottom_right.y),
        VertexPositionTexture::new(right, bottom, uv_bottom_right.x, uv_bottom_right.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(mem::size_of::<VertexPositionTexture>(), 20, "Vertex size should be 20 bytes");
        assert_eq!(mem::align_of::<VertexPositionTexture>(), 4);
        assert_eq!(VertexPositionTexture::STRIDE, 20);

        let vertex = VertexPositionTexture::default();
        let vertex_ptr = &vertex as *const VertexPositionTexture as usize;
        let tex_ptr = &vertex.tex_coord as *const [f32; 2] as usize;
        assert_eq!(tex_ptr - vertex_ptr, VertexPositionTexture::TEX_COORD_OFFSET as usize);
    }

    #[test]
    fn test_default_screen_quad() {
        let quad = screen_quad(
            QuadRect::new(0, 0, 1600, 900),
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
        );

        // 左上、右上、左下、右下
        assert_eq!(quad[0], VertexPositionTexture::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(quad[1], VertexPositionTexture::new(1600.0, 0.0, 1.0, 0.0));
        assert_eq!(quad[2], VertexPositionTexture::new(0.0, 900.0, 0.0, 1.0));
        assert_eq!(quad[3], VertexPositionTexture::new(1600.0, 900.0, 1.0, 1.0));
    }

    #[test]
    fn test_offset_rect_and_partial_uv() {
        let quad = screen_quad(
            QuadRect::new(100, 50, 300, 250),
            Vector2::new(0.25, 0.5),
            Vector2::new(0.75, 1.0),
        );

        assert_eq!(quad[0].position, [100.0, 50.0, 0.0]);
        assert_eq!(quad[1].tex_coord, [0.75, 0.5]);
        assert_eq!(quad[2].tex_coord, [0.25, 1.0]);
        assert_eq!(quad[3].position, [300.0, 250.0, 0.0]);
        assert!(quad.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_quad_bytes() {
        let quad = screen_quad(
            QuadRect::from_array([0, 0, 2, 2]),
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
        );
        let bytes: &[u8] = bytemuck::cast_slice(&quad);
        assert_eq!(bytes.len(), 4 * 20);
    }

    #[test]
    fn test_rect_size() {
        let rect = QuadRect::new(10, 20, 110, 70);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 50);
    }
}
