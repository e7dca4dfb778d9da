pub mod config;
pub mod error;
pub mod shader;
pub mod vertex;
#[cfg(windows)]
pub mod window;
#[cfg(windows)]
pub mod d3d;

use crate::error::Result;

/// Opens the window, builds the pipeline and renders until the window closes.
/// Returns the exit code carried by `WM_QUIT`.
#[cfg(windows)]
pub fn default_main() -> Result<i32> {
    use windows::Win32::UI::WindowsAndMessaging::{MSG, WM_QUIT};
    use crate::d3d::{D3D, D3DBase};
    use crate::vertex::VERTEX_COUNT;

    let main_window_handle = window::setup_window()?;
    let mut d3d = D3D::new(main_window_handle, false)?;
    d3d.setup()?;

    let mut msg = MSG::default();
    loop {
        if msg.message == WM_QUIT {
            break;
        }
        if !window::pump_message(&mut msg) {
            d3d.clear();
            d3d.draw(VERTEX_COUNT);
            d3d.present()?;
        }
    }
    log::info!("quit, wParam {}", msg.wParam.0);

    Ok(msg.wParam.0 as i32)
}

#[cfg(not(windows))]
pub fn default_main() -> Result<i32> {
    Err(error::Error::Unsupported)
}

#[cfg(all(test, windows))]
mod tests {

    use windows::{
        Win32::Graphics::Direct3D11::*, Win32::Graphics::Dxgi::Common::*,
        Win32::UI::WindowsAndMessaging::*,
    };
    use crypto::{digest::Digest, sha1::Sha1};
    use crate::config::DEFAULT_RT_CLEAR_COLOR;
    use crate::d3d::*;
    use crate::vertex::VERTEX_COUNT;
    use crate::window::*;

    struct Image {
        width: u32,
        height: u32,
        pixels: Vec<[u8; 4]>,
        sha1: String,
    }

    impl Image {
        fn at(&self, x: u32, y: u32) -> [u8; 4] {
            self.pixels[(y * self.width + x) as usize]
        }
    }

    #[test]
    fn test_image() {
        let mut msg = MSG::default();
        let main_window_handle = setup_window().unwrap();
        let mut d3d = D3D::new(main_window_handle, true).unwrap();
        d3d.setup().unwrap();
        while pump_message(&mut msg) {}

        let mut images = Vec::new();
        for _ in 0..2 {
            d3d.clear();
            d3d.draw(VERTEX_COUNT);
            let img = d3d.get_image();
            images.push(read_image(img.0, img.1, img.2));
            d3d.present().unwrap();
        }
        drop(d3d);

        unsafe { DestroyWindow(main_window_handle) }.unwrap();
        while msg.message != WM_QUIT {
            pump_message(&mut msg);
        }
        assert_eq!(msg.wParam.0, 0);

        // static scene, so every frame is identical
        assert_eq!(images[0].sha1, images[1].sha1);

        let image = &images[1];
        let clear: Vec<u8> = DEFAULT_RT_CLEAR_COLOR.iter().map(|c| (c * 255.0).round() as u8).collect();
        assert_eq!(image.at(0, 0).to_vec(), clear);
        assert_eq!(image.at(image.width - 1, image.height - 1).to_vec(), clear);

        // centre of the viewport: half red, a quarter each of green and blue
        let [r, g, b, a] = image.at(image.width / 2, image.height / 2);
        assert!((110..=145).contains(&r), "r = {}", r);
        assert!(r > g && r > b);
        assert!((g as i32 - b as i32).abs() <= 2, "g = {}, b = {}", g, b);
        assert_eq!(a, 255);

        // just below the top vertex
        let [r, g, b, _] = image.at(image.width / 2, image.height / 4 + 8);
        assert!(r > 230 && g < 20 && b < 20, "{:?}", (r, g, b));
    }

    fn read_image(device: &ID3D11Device, context: &ID3D11DeviceContext, image: &ID3D11Texture2D) -> Image {
        let mut desc = D3D11_TEXTURE2D_DESC::default();
        unsafe { image.GetDesc(&mut desc) };
        assert_eq!(desc.MipLevels, 1);
        assert_eq!(desc.Format, DXGI_FORMAT_R8G8B8A8_UNORM);

        // Create a readable copy
        desc.Usage = D3D11_USAGE_STAGING;
        desc.BindFlags = 0;
        desc.CPUAccessFlags = D3D11_CPU_ACCESS_READ.0 as u32;
        desc.MiscFlags = 0;
        let mut staging: Option<ID3D11Texture2D> = None;
        unsafe { device.CreateTexture2D(&desc, None, Some(&mut staging)) }.unwrap();
        let staging = staging.unwrap();
        unsafe { context.CopyResource(&staging, image) };

        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe { context.Map(&staging, 0, D3D11_MAP_READ, 0, Some(&mut mapped)) }.unwrap();
        let mut sha1 = Sha1::new();
        let mut pixels = Vec::with_capacity((desc.Width * desc.Height) as usize);
        for y in 0..desc.Height as usize {
            for x in 0..desc.Width as usize {
                let pt = (mapped.pData as usize + y * mapped.RowPitch as usize + x * 4) as *const [u8; 4];
                let s: [u8; 4] = unsafe { *pt };
                sha1.input(&s);
                pixels.push(s);
            }
        }
        unsafe { context.Unmap(&staging, 0) };

        Image { width: desc.Width, height: desc.Height, pixels, sha1: sha1.result_str() }
    }

}
