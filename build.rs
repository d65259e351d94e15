/// Build script for d3d_app
///
/// # Shader Compilation Strategy:
/// - D3D11: HLSL effects are compiled at runtime via D3DCompileFromFile,
///   so the build only has to notice when the default effect files change.
fn main() {
    println!("cargo:rerun-if-changed=RebuildZBuffer.fx");
    println!("cargo:rerun-if-changed=CameraMotionBlur.fx");
}
