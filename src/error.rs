use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Setup and frame steps that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RegisterClass,
    CreateWindow,
    ClientRect,
    CreateDevice,
    GetBackBuffer,
    CreateRenderTargetView,
    CreateDepthTexture,
    CreateDepthStencilView,
    CreateVertexBuffer,
    CompileShader,
    CreateVertexShader,
    CreatePixelShader,
    CreateInputLayout,
    Present,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::RegisterClass => "window class registration",
            Stage::CreateWindow => "window creation",
            Stage::ClientRect => "client area query",
            Stage::CreateDevice => "device and swap chain creation",
            Stage::GetBackBuffer => "back buffer fetch",
            Stage::CreateRenderTargetView => "render target view creation",
            Stage::CreateDepthTexture => "depth buffer creation",
            Stage::CreateDepthStencilView => "depth stencil view creation",
            Stage::CreateVertexBuffer => "vertex buffer creation",
            Stage::CompileShader => "shader compilation",
            Stage::CreateVertexShader => "vertex shader creation",
            Stage::CreatePixelShader => "pixel shader creation",
            Stage::CreateInputLayout => "input layout creation",
            Stage::Present => "present",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(windows)]
    #[error("{stage} failed: {source}")]
    Graphics {
        stage: Stage,
        #[source]
        source: windows::core::Error,
    },

    #[error("shader source {file} not found (searched {})", display_paths(.searched))]
    ShaderNotFound { file: String, searched: Vec<PathBuf> },

    #[error("failed to compile {}: {message}", .file.display())]
    ShaderCompile { file: PathBuf, message: String },

    #[error("string contains an interior nul: {0}")]
    InvalidName(#[from] widestring::error::ContainsNul<u16>),

    #[error("Direct3D 11 rendering is only available on Windows")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, Error>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tags a `windows` failure with the step it came from.
#[cfg(windows)]
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

#[cfg(windows)]
impl<T> StageContext<T> for windows::core::Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|source| Error::Graphics { stage, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_reads_as_phrase() {
        assert_eq!(Stage::CreateDevice.to_string(), "device and swap chain creation");
        assert_eq!(Stage::Present.to_string(), "present");
    }

    #[test]
    fn shader_not_found_lists_every_path() {
        let err = Error::ShaderNotFound {
            file: "vertexshader.hlsl".to_string(),
            searched: vec![PathBuf::from("a/vertexshader.hlsl"), PathBuf::from("b/vertexshader.hlsl")],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("shader source vertexshader.hlsl not found"));
        assert!(msg.contains("a/vertexshader.hlsl, b/vertexshader.hlsl"));
    }

    #[test]
    fn compile_error_keeps_compiler_output() {
        let err = Error::ShaderCompile {
            file: PathBuf::from("pixelshader.hlsl"),
            message: "error X3000: syntax error".to_string(),
        };
        assert_eq!(err.to_string(), "failed to compile pixelshader.hlsl: error X3000: syntax error");
    }

    #[test]
    fn interior_nul_converts() {
        let err: Error = widestring::U16CString::from_str("My\0Class").unwrap_err().into();
        assert!(matches!(err, Error::InvalidName(_)));
    }
}
