//! 着色器程序
//!
//! 一个效果文件编译出 `VS` 和 `PS` 两个入口（Shader Model 4.0），
//! 配一个 POSITION/TEXCOORD 输入布局和每个阶段各一个常量缓冲区。

use tracing::{debug, error, info, warn};
use windows::{
    core::*, Win32::Graphics::Direct3D::Fxc::*, Win32::Graphics::Direct3D::*,
    Win32::Graphics::Direct3D11::*, Win32::Graphics::Dxgi::Common::*,
};

use super::created;
use crate::core::error::Result;
use crate::dx_call;
use crate::renderer::pipeline::ShaderProgramDesc;
use crate::renderer::vertex::VertexPositionTexture;

/// 调试信息 + 向后兼容 + 关闭优化
const COMPILE_FLAGS: u32 =
    D3DCOMPILE_DEBUG | D3DCOMPILE_ENABLE_BACKWARDS_COMPATIBILITY | D3DCOMPILE_SKIP_OPTIMIZATION;

/// 编译完成的着色器程序，创建后不再修改
pub struct ShaderProgram {
    pub vertex_shader: ID3D11VertexShader,
    pub pixel_shader: ID3D11PixelShader,
    pub input_layout: ID3D11InputLayout,
    pub vs_constant_buffer: ID3D11Buffer,
    pub ps_constant_buffer: ID3D11Buffer,
    path: String,
}

impl ShaderProgram {
    /// 效果文件路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 绑定到即时上下文：VS、PS、输入布局和两个阶段的 0 号常量缓冲区
    pub fn bind(&self, context: &ID3D11DeviceContext) {
        unsafe {
            context.VSSetShader(&self.vertex_shader, None);
            context.PSSetShader(&self.pixel_shader, None);
            context.IASetInputLayout(&self.input_layout);
            context.VSSetConstantBuffers(0, Some(&[Some(self.vs_constant_buffer.clone())]));
            context.PSSetConstantBuffers(0, Some(&[Some(self.ps_constant_buffer.clone())]));
        }
    }
}

/// 编译效果文件并创建着色器程序
pub fn create_shader(device: &ID3D11Device, desc: &ShaderProgramDesc) -> Result<ShaderProgram> {
    info!(path = %desc.path, cb_size = desc.constant_buffer_size, "Creating shader program");

    let [(vs_entry, vs_profile), (ps_entry, ps_profile)] = desc.stages();

    let vs_blob = compile_from_file(&desc.path, vs_entry, vs_profile)?;
    let vs_bytecode = blob_bytes(&vs_blob);
    let mut vertex_shader = None;
    unsafe { dx_call!(device.CreateVertexShader(vs_bytecode, None, Some(&mut vertex_shader))) }?;
    let vertex_shader = created(vertex_shader, "CreateVertexShader")?;

    let input_elements = [
        D3D11_INPUT_ELEMENT_DESC {
            SemanticName: s!("POSITION"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: 0,
            InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
        D3D11_INPUT_ELEMENT_DESC {
            SemanticName: s!("TEXCOORD"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: VertexPositionTexture::TEX_COORD_OFFSET,
            InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
    ];
    let mut input_layout = None;
    unsafe {
        dx_call!(device.CreateInputLayout(&input_elements, vs_bytecode, Some(&mut input_layout)))
    }?;
    let input_layout = created(input_layout, "CreateInputLayout")?;

    let ps_blob = compile_from_file(&desc.path, ps_entry, ps_profile)?;
    let mut pixel_shader = None;
    unsafe {
        dx_call!(device.CreatePixelShader(blob_bytes(&ps_blob), None, Some(&mut pixel_shader)))
    }?;
    let pixel_shader = created(pixel_shader, "CreatePixelShader")?;

    let vs_constant_buffer = create_constant_buffer(device, desc.constant_buffer_size)?;
    let ps_constant_buffer = create_constant_buffer(device, desc.constant_buffer_size)?;

    Ok(ShaderProgram {
        vertex_shader,
        pixel_shader,
        input_layout,
        vs_constant_buffer,
        ps_constant_buffer,
        path: desc.path.clone(),
    })
}

/// 创建默认用途、GPU 只读、无初始数据的常量缓冲区
///
/// `size` 必须是 16 的倍数。
pub fn create_constant_buffer(device: &ID3D11Device, size: u32) -> Result<ID3D11Buffer> {
    let desc = D3D11_BUFFER_DESC {
        ByteWidth: size,
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
        StructureByteStride: 0,
    };

    let mut buffer = None;
    unsafe { dx_call!(device.CreateBuffer(&desc, None, Some(&mut buffer))) }?;
    let buffer = created(buffer, "CreateBuffer")?;

    debug!(size, "Constant buffer created");
    Ok(buffer)
}

/// 从文件编译一个入口
///
/// 编译器输出的诊断信息写入日志：失败时为 error，成功但有警告时为 warn。
fn compile_from_file(path: &str, entry: &str, profile: &str) -> Result<ID3DBlob> {
    let file = HSTRING::from(path);
    let entry_z = format!("{entry}\0");
    let profile_z = format!("{profile}\0");

    let mut code = None;
    let mut errors = None;
    let compiled = unsafe {
        dx_call!(D3DCompileFromFile(
            &file,
            None,
            None,
            PCSTR(entry_z.as_ptr()),
            PCSTR(profile_z.as_ptr()),
            COMPILE_FLAGS,
            0,
            &mut code,
            Some(&mut errors)
        ))
    };

    if let Some(errors) = errors.as_ref() {
        let diagnostics = String::from_utf8_lossy(blob_bytes(errors));
        if compiled.is_err() {
            error!(path, entry, profile, "Shader compile error:\n{}", diagnostics);
        } else {
            warn!(path, entry, profile, "Shader compile warning:\n{}", diagnostics);
        }
    }

    compiled?;
    debug!(path, entry, profile, "Shader compiled");
    Ok(created(code, "D3DCompileFromFile")?)
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}
