//! Fixed parameters of the sample. Nothing here is read at runtime.

pub const WINDOW_CLASS_NAME: &str = "MyWndClass";
pub const WINDOW_TITLE: &str = "Awesome!";
pub const WINDOW_X: i32 = 200;
pub const WINDOW_Y: i32 = 200;
/// Outer window size; the swap chain uses whatever client area is left.
pub const WINDOW_WIDTH: i32 = 800;
pub const WINDOW_HEIGHT: i32 = 600;

pub const BUFFER_COUNT: u32 = 1;
pub const REFRESH_RATE_NUMERATOR: u32 = 60;
pub const REFRESH_RATE_DENOMINATOR: u32 = 1;
pub const PRESENT_SYNC_INTERVAL: u32 = 0;

/// RGBA, roughly #161618.
pub const DEFAULT_RT_CLEAR_COLOR: [f32; 4] = [0.08627451, 0.08627451, 0.09411765, 1.0];
pub const DEFAULT_DEPTH_CLEAR: f32 = 1.0;
pub const DEFAULT_STENCIL_CLEAR: u8 = 0;

pub const SHADER_DIR: &str = "shaders";

pub const FAILURE_EXIT_CODE: i32 = -1;
