//! 顶点缓冲区

use tracing::debug;
use windows::Win32::Graphics::Direct3D11::*;

use super::created;
use crate::core::error::Result;
use crate::core::math::Vector2;
use crate::dx_call;
use crate::renderer::vertex::{screen_quad, QuadRect, VertexPositionTexture};

/// 创建 4 个顶点的动态顶点缓冲区，并立即通过映射写入屏幕空间四边形
pub fn create_vertex_buffer(
    device: &ID3D11Device,
    context: &ID3D11DeviceContext,
    rect: QuadRect,
    uv_top_left: Vector2,
    uv_bottom_right: Vector2,
) -> Result<ID3D11Buffer> {
    let vertices = screen_quad(rect, uv_top_left, uv_bottom_right);
    let bytes: &[u8] = bytemuck::cast_slice(&vertices);

    let desc = D3D11_BUFFER_DESC {
        ByteWidth: bytes.len() as u32,
        Usage: D3D11_USAGE_DYNAMIC,
        BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
        CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
        MiscFlags: 0,
        StructureByteStride: 0,
    };

    let mut buffer = None;
    unsafe { dx_call!(device.CreateBuffer(&desc, None, Some(&mut buffer))) }?;
    let buffer = created(buffer, "CreateBuffer")?;

    let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
    unsafe {
        dx_call!(context.Map(&buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped)))?;
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData as *mut u8, bytes.len());
        context.Unmap(&buffer, 0);
    }

    debug!(
        ?rect,
        width = rect.width(),
        height = rect.height(),
        stride = VertexPositionTexture::STRIDE,
        "Quad vertex buffer created"
    );
    Ok(buffer)
}
