#[cfg(windows)]
use windows::{
    core::{PCSTR, PCWSTR}, Win32::Foundation::E_POINTER,
    Win32::Graphics::Direct3D::Fxc::*, Win32::Graphics::Direct3D::ID3DBlob,
};
use std::path::{Path, PathBuf};

use crate::config::SHADER_DIR;
use crate::error::Error;
#[cfg(windows)]
use crate::error::{Stage, StageContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub fn file_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertexshader.hlsl",
            ShaderStage::Pixel => "pixelshader.hlsl",
        }
    }

    // entry and profile are nul-terminated for PCSTR
    fn entry_point_c(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "myVertexShader\0",
            ShaderStage::Pixel => "myPixelShader\0",
        }
    }

    fn profile_c(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_5_0\0",
            ShaderStage::Pixel => "ps_5_0\0",
        }
    }

    pub fn entry_point(self) -> &'static str {
        self.entry_point_c().trim_end_matches('\0')
    }

    pub fn profile(self) -> &'static str {
        self.profile_c().trim_end_matches('\0')
    }
}

/// Directories searched for shader sources, in order.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(SHADER_DIR));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir.join(SHADER_DIR));
    }
    dirs.push(Path::new(env!("CARGO_MANIFEST_DIR")).join(SHADER_DIR));
    dirs
}

pub fn locate_in(file: &str, dirs: &[PathBuf]) -> Result<PathBuf, Error> {
    let searched: Vec<PathBuf> = dirs.iter().map(|d| d.join(file)).collect();
    match searched.iter().find(|p| p.is_file()) {
        Some(p) => Ok(p.clone()),
        None => Err(Error::ShaderNotFound { file: file.to_string(), searched }),
    }
}

pub fn locate(stage: ShaderStage) -> Result<PathBuf, Error> {
    locate_in(stage.file_name(), &search_dirs())
}

#[cfg(windows)]
pub fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

#[cfg(windows)]
pub fn compile(stage: ShaderStage) -> Result<ID3DBlob, Error> {
    let path = locate(stage)?;
    log::info!("compiling {} ({}, {})", path.display(), stage.entry_point(), stage.profile());

    let compile_flags = if cfg!(debug_assertions) {
        D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
    } else {
        0
    };

    let wide_path = widestring::U16CString::from_os_str(path.as_os_str())?;
    let mut code: Option<ID3DBlob> = None;
    let mut errors: Option<ID3DBlob> = None;
    let result = unsafe {
        D3DCompileFromFile(
            PCWSTR(wide_path.as_ptr()),
            None,
            None,
            PCSTR(stage.entry_point_c().as_ptr()),
            PCSTR(stage.profile_c().as_ptr()),
            compile_flags,
            0,
            &mut code,
            Some(&mut errors),
        )
    };

    if let Err(e) = result {
        return Err(match errors {
            Some(blob) => {
                let message = String::from_utf8_lossy(blob_bytes(&blob))
                    .trim_end_matches('\0')
                    .trim()
                    .to_string();
                Error::ShaderCompile { file: path, message }
            }
            None => Error::Graphics { stage: Stage::CompileShader, source: e },
        });
    }
    if let Some(blob) = &errors {
        // warnings only
        log::warn!("{}", String::from_utf8_lossy(blob_bytes(blob)).trim_end_matches('\0').trim());
    }

    code.ok_or_else(|| windows::core::Error::from(E_POINTER)).stage(Stage::CompileShader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_match_shader_model_5() {
        assert_eq!(ShaderStage::Vertex.entry_point(), "myVertexShader");
        assert_eq!(ShaderStage::Vertex.profile(), "vs_5_0");
        assert_eq!(ShaderStage::Pixel.entry_point(), "myPixelShader");
        assert_eq!(ShaderStage::Pixel.profile(), "ps_5_0");
    }

    #[test]
    fn shipped_sources_define_entry_points() {
        let vs = include_str!("../shaders/vertexshader.hlsl");
        let ps = include_str!("../shaders/pixelshader.hlsl");
        assert!(vs.contains(ShaderStage::Vertex.entry_point()));
        assert!(vs.contains("POSITION") && vs.contains("COLOR"));
        assert!(ps.contains(ShaderStage::Pixel.entry_point()));
        assert!(ps.contains("SV_Target"));
    }

    #[test]
    fn locate_finds_both_sources() {
        for stage in [ShaderStage::Vertex, ShaderStage::Pixel] {
            let path = locate(stage).unwrap();
            assert!(path.ends_with(Path::new(SHADER_DIR).join(stage.file_name())));
        }
    }

    #[test]
    fn locate_skips_missing_directories() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join(SHADER_DIR);
        let dirs = vec![PathBuf::from("does-not-exist"), manifest.clone(), manifest.join("nested")];
        let path = locate_in("pixelshader.hlsl", &dirs).unwrap();
        assert_eq!(path, manifest.join("pixelshader.hlsl"));
    }

    #[test]
    fn missing_source_reports_searched_paths() {
        let dirs = vec![PathBuf::from("x"), PathBuf::from("y")];
        match locate_in("geometryshader.hlsl", &dirs) {
            Err(Error::ShaderNotFound { file, searched }) => {
                assert_eq!(file, "geometryshader.hlsl");
                assert_eq!(searched, vec![PathBuf::from("x/geometryshader.hlsl"), PathBuf::from("y/geometryshader.hlsl")]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
