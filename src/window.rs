use windows::{
    core::PCWSTR, Win32::Foundation::*, Win32::System::LibraryLoader::*,
    Win32::UI::Input::KeyboardAndMouse::SetFocus, Win32::UI::WindowsAndMessaging::*,
};
use widestring::U16CString;

use crate::config::*;
use crate::error::{Error, Result, Stage, StageContext};

extern "system" fn wndproc(
    window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM, ) -> LRESULT {
    match message {
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            LRESULT::default()
        }
        _ => {
            unsafe { DefWindowProcW(window, message, wparam, lparam) }
        }
    }
}

pub fn setup_window() -> Result<HWND> {
    let class_name = U16CString::from_str(WINDOW_CLASS_NAME)?;
    let title = U16CString::from_str(WINDOW_TITLE)?;

    let instance = unsafe { GetModuleHandleW(None) }.stage(Stage::RegisterClass)?;
    let wcex = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(wndproc),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.stage(Stage::RegisterClass)?,
        lpszClassName: PCWSTR(class_name.as_ptr()),
        ..Default::default()
    };
    if unsafe { RegisterClassExW(&wcex) } == 0 {
        return Err(Error::Graphics {
            stage: Stage::RegisterClass,
            source: windows::core::Error::from_win32(),
        });
    }

    let hwnd = unsafe { CreateWindowExW(
        WS_EX_APPWINDOW,
        PCWSTR(class_name.as_ptr()),
        PCWSTR(title.as_ptr()),
        WS_OVERLAPPEDWINDOW, WINDOW_X, WINDOW_Y, WINDOW_WIDTH, WINDOW_HEIGHT,
        None, None, instance, None
    ) }.stage(Stage::CreateWindow)?;
    log::info!("created window {:?} ({}x{} at {},{})", hwnd, WINDOW_WIDTH, WINDOW_HEIGHT, WINDOW_X, WINDOW_Y);

    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
        let _ = SetFocus(hwnd);
    }

    Ok(hwnd)
}

pub fn client_size(hwnd: HWND) -> Result<(u32, u32)> {
    let mut rect = RECT::default();
    unsafe { GetClientRect(hwnd, &mut rect) }.stage(Stage::ClientRect)?;
    let width = (rect.right - rect.left) as u32;
    let height = (rect.bottom - rect.top) as u32;
    Ok((width, height))
}

/// Handles at most one pending message. Returns false when the queue was empty.
pub fn pump_message(msg: &mut MSG) -> bool {
    if unsafe { PeekMessageW(msg, None, 0, 0, PM_REMOVE) }.as_bool() {
        unsafe {
            let _ = TranslateMessage(msg);
            DispatchMessageW(msg);
        }
        true
    } else {
        false
    }
}
