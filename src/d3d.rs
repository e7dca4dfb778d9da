use windows::{
    core::{Interface, PCSTR}, Win32::Foundation::*, Win32::Graphics::Direct3D::*,
    Win32::Graphics::Direct3D11::*, Win32::Graphics::Dxgi::Common::*, Win32::Graphics::Dxgi::*,
};
use libc::c_void;

use crate::config::*;
use crate::error::{Error, Result, Stage, StageContext};
use crate::shader::{self, ShaderStage};
use crate::vertex::{self, AttributeFormat, Vertex, INPUT_LAYOUT, TRIANGLE, VERTEX_COUNT};
use crate::window::client_size;

pub trait D3DBase {
    fn clear(&mut self);
    fn draw(&mut self, vertex_count: u32);
    fn present(&mut self) -> Result<()>;
}

pub trait D3DTest {
    fn get_image(&self) -> (&ID3D11Device, &ID3D11DeviceContext, &ID3D11Texture2D);
}

pub struct D3D {
    pub device: ID3D11Device,
    context: ID3D11DeviceContext,
    swap_chain: IDXGISwapChain,
    back_buffer: ID3D11Texture2D,
    rtv: ID3D11RenderTargetView,
    #[allow(dead_code)]
    depth_tex: ID3D11Texture2D,
    dsv: ID3D11DepthStencilView,
    width: u32,
    height: u32,
    resource: Option<Resource>,
}

// Only held so the bound objects outlive the render loop
#[allow(dead_code)]
struct Resource {
    vertex_buffer: ID3D11Buffer,
    vertex_shader: ID3D11VertexShader,
    pixel_shader: ID3D11PixelShader,
    input_layout: ID3D11InputLayout,
}

/// Unwraps a creation out-parameter that the driver left empty despite success.
fn created<T>(out: Option<T>, stage: Stage) -> Result<T> {
    out.ok_or_else(|| Error::Graphics { stage, source: windows::core::Error::from(E_POINTER) })
}

fn create_device_and_swap_chain(
    desc: &DXGI_SWAP_CHAIN_DESC,
    driver_type: D3D_DRIVER_TYPE,
    flags: D3D11_CREATE_DEVICE_FLAG,
) -> windows::core::Result<(Option<ID3D11Device>, Option<ID3D11DeviceContext>, Option<IDXGISwapChain>)> {
    let feature_levels = [D3D_FEATURE_LEVEL_11_0];
    let mut swap_chain: Option<IDXGISwapChain> = None;
    let mut device: Option<ID3D11Device> = None;
    let mut context: Option<ID3D11DeviceContext> = None;
    let mut feature_level = D3D_FEATURE_LEVEL::default();
    unsafe {
        D3D11CreateDeviceAndSwapChain(
            None,
            driver_type,
            None,
            flags,
            Some(&feature_levels),
            D3D11_SDK_VERSION,
            Some(desc),
            Some(&mut swap_chain),
            Some(&mut device),
            Some(&mut feature_level),
            Some(&mut context),
        )
    }?;
    log::debug!("feature level 0x{:x}", feature_level.0);
    Ok((device, context, swap_chain))
}

impl Drop for D3D {
    fn drop(&mut self) {
        unsafe {
            self.context.ClearState();
            self.context.Flush();
        }
    }
}

impl D3D {
    pub fn new(hwnd: HWND, is_sw: bool) -> Result<Self> {
        let (width, height) = client_size(hwnd)?;
        log::info!("client area {}x{}", width, height);

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: width,
                Height: height,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: REFRESH_RATE_NUMERATOR,
                    Denominator: REFRESH_RATE_DENOMINATOR,
                },
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                ScanlineOrdering: DXGI_MODE_SCANLINE_ORDER_UNSPECIFIED,
                Scaling: DXGI_MODE_SCALING_UNSPECIFIED,
            },
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: BUFFER_COUNT,
            OutputWindow: hwnd,
            Windowed: BOOL(1),
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            Flags: 0,
        };

        let driver_type = if is_sw { D3D_DRIVER_TYPE_WARP } else { D3D_DRIVER_TYPE_HARDWARE };
        let created_with_debug = if cfg!(debug_assertions) {
            match create_device_and_swap_chain(&swap_chain_desc, driver_type, D3D11_CREATE_DEVICE_DEBUG) {
                Ok(r) => {
                    log::info!("Enable debug");
                    Some(r)
                }
                Err(e) if e.code() == DXGI_ERROR_SDK_COMPONENT_MISSING => {
                    log::warn!("Cannot enable debug layer. Maybe the graphics tools are not installed.");
                    None
                }
                Err(e) => return Err(Error::Graphics { stage: Stage::CreateDevice, source: e }),
            }
        } else {
            None
        };
        let (device, context, swap_chain) = match created_with_debug {
            Some(r) => r,
            None => create_device_and_swap_chain(&swap_chain_desc, driver_type, D3D11_CREATE_DEVICE_FLAG(0))
                .stage(Stage::CreateDevice)?,
        };
        let device = created(device, Stage::CreateDevice)?;
        let context = created(context, Stage::CreateDevice)?;
        let swap_chain = created(swap_chain, Stage::CreateDevice)?;

        if let Ok(desc) = device
            .cast::<IDXGIDevice>()
            .and_then(|d| unsafe { d.GetAdapter() })
            .and_then(|a| unsafe { a.GetDesc() })
        {
            let name = desc.Description.split(|n| *n == 0).next().unwrap_or(&[]);
            log::info!("Adapter name: {}", String::from_utf16_lossy(name));
        }

        let back_buffer: ID3D11Texture2D = unsafe { swap_chain.GetBuffer(0) }.stage(Stage::GetBackBuffer)?;
        let mut rtv: Option<ID3D11RenderTargetView> = None;
        unsafe { device.CreateRenderTargetView(&back_buffer, None, Some(&mut rtv)) }
            .stage(Stage::CreateRenderTargetView)?;
        let rtv = created(rtv, Stage::CreateRenderTargetView)?;

        let depth_desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };
        let mut depth_tex: Option<ID3D11Texture2D> = None;
        unsafe { device.CreateTexture2D(&depth_desc, None, Some(&mut depth_tex)) }
            .stage(Stage::CreateDepthTexture)?;
        let depth_tex = created(depth_tex, Stage::CreateDepthTexture)?;
        let mut dsv: Option<ID3D11DepthStencilView> = None;
        unsafe { device.CreateDepthStencilView(&depth_tex, None, Some(&mut dsv)) }
            .stage(Stage::CreateDepthStencilView)?;
        let dsv = created(dsv, Stage::CreateDepthStencilView)?;

        unsafe { context.OMSetRenderTargets(Some(&[Some(rtv.clone())]), &dsv) };
        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: width as f32,
            Height: height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        unsafe { context.RSSetViewports(Some(&[viewport])) };

        let mut d3d = D3D {
            device,
            context,
            swap_chain,
            back_buffer,
            rtv,
            depth_tex,
            dsv,
            width,
            height,
            resource: None,
        };

        // Show the cleared back buffer before any geometry exists
        d3d.clear();
        d3d.present()?;

        Ok(d3d)
    }

    /// Uploads the triangle, builds both shaders and binds the whole pipeline.
    pub fn setup(&mut self) -> Result<()> {
        let vertices = vertex::as_bytes(&TRIANGLE);
        let vb_desc = D3D11_BUFFER_DESC {
            ByteWidth: Vertex::STRIDE * VERTEX_COUNT,
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        let init = D3D11_SUBRESOURCE_DATA {
            pSysMem: vertices.as_ptr() as *const c_void,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        };
        let mut vertex_buffer: Option<ID3D11Buffer> = None;
        unsafe { self.device.CreateBuffer(&vb_desc, Some(&init), Some(&mut vertex_buffer)) }
            .stage(Stage::CreateVertexBuffer)?;
        let vertex_buffer = created(vertex_buffer, Stage::CreateVertexBuffer)?;
        log::debug!("vertex buffer: {} bytes, stride {}", vertices.len(), Vertex::STRIDE);

        let buffers = [Some(vertex_buffer.clone())];
        let stride = Vertex::STRIDE;
        let offset = 0u32;
        unsafe {
            self.context.IASetVertexBuffers(0, 1, Some(buffers.as_ptr()), Some(&stride), Some(&offset))
        };

        let vs_blob = shader::compile(ShaderStage::Vertex)?;
        let mut vertex_shader: Option<ID3D11VertexShader> = None;
        unsafe { self.device.CreateVertexShader(shader::blob_bytes(&vs_blob), None, Some(&mut vertex_shader)) }
            .stage(Stage::CreateVertexShader)?;
        let vertex_shader = created(vertex_shader, Stage::CreateVertexShader)?;

        let ps_blob = shader::compile(ShaderStage::Pixel)?;
        let mut pixel_shader: Option<ID3D11PixelShader> = None;
        unsafe { self.device.CreatePixelShader(shader::blob_bytes(&ps_blob), None, Some(&mut pixel_shader)) }
            .stage(Stage::CreatePixelShader)?;
        let pixel_shader = created(pixel_shader, Stage::CreatePixelShader)?;

        let ie_desc: Vec<D3D11_INPUT_ELEMENT_DESC> = INPUT_LAYOUT
            .iter()
            .map(|attr| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(attr.semantic.as_ptr()),
                SemanticIndex: 0,
                Format: match attr.format {
                    AttributeFormat::Float3 => DXGI_FORMAT_R32G32B32_FLOAT,
                    AttributeFormat::Float4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
                },
                InputSlot: 0,
                AlignedByteOffset: attr.offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();
        let mut input_layout: Option<ID3D11InputLayout> = None;
        unsafe { self.device.CreateInputLayout(&ie_desc, shader::blob_bytes(&vs_blob), Some(&mut input_layout)) }
            .stage(Stage::CreateInputLayout)?;
        let input_layout = created(input_layout, Stage::CreateInputLayout)?;

        unsafe {
            self.context.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            self.context.IASetInputLayout(&input_layout);
            self.context.VSSetShader(&vertex_shader, None);
            self.context.PSSetShader(&pixel_shader, None);
        }
        log::info!("pipeline ready ({}x{})", self.width, self.height);

        self.resource = Some(Resource { vertex_buffer, vertex_shader, pixel_shader, input_layout });
        Ok(())
    }
}

impl D3DBase for D3D {
    fn clear(&mut self) {
        unsafe {
            self.context.ClearRenderTargetView(&self.rtv, &DEFAULT_RT_CLEAR_COLOR);
            self.context.ClearDepthStencilView(
                &self.dsv,
                (D3D11_CLEAR_DEPTH.0 | D3D11_CLEAR_STENCIL.0) as u32,
                DEFAULT_DEPTH_CLEAR,
                DEFAULT_STENCIL_CLEAR,
            );
        }
    }

    fn draw(&mut self, vertex_count: u32) {
        unsafe { self.context.Draw(vertex_count, 0) };
    }

    fn present(&mut self) -> Result<()> {
        unsafe { self.swap_chain.Present(PRESENT_SYNC_INTERVAL, DXGI_PRESENT(0)) }
            .ok()
            .stage(Stage::Present)
    }
}

impl D3DTest for D3D {
    fn get_image(&self) -> (&ID3D11Device, &ID3D11DeviceContext, &ID3D11Texture2D) {
        (&self.device, &self.context, &self.back_buffer)
    }
}
