use directx_math::{XMFLOAT3, XMFLOAT4};

#[repr(C)]
#[derive(Clone, Copy)]
pub struct Vertex {
    pub position: XMFLOAT3,
    pub color: XMFLOAT4,
}

pub const VERTEX_COUNT: u32 = 3;

pub const TRIANGLE: [Vertex; VERTEX_COUNT as usize] = [
    // upper mid, red
    Vertex {
        position: XMFLOAT3 { x: 0.0, y: 0.5, z: 0.5 },
        color: XMFLOAT4 { x: 1.0, y: 0.0, z: 0.0, w: 1.0 },
    },
    // right bottom, green
    Vertex {
        position: XMFLOAT3 { x: 0.5, y: -0.5, z: 0.5 },
        color: XMFLOAT4 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 },
    },
    // left bottom, blue
    Vertex {
        position: XMFLOAT3 { x: -0.5, y: -0.5, z: 0.5 },
        color: XMFLOAT4 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 },
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float3,
    Float4,
}

/// One per-vertex input element, all in slot 0.
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribute {
    /// Nul-terminated so the pointer can go straight to the driver.
    pub semantic: &'static str,
    pub format: AttributeFormat,
    pub offset: u32,
}

pub const INPUT_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        semantic: "POSITION\0",
        format: AttributeFormat::Float3,
        offset: std::mem::offset_of!(Vertex, position) as u32,
    },
    VertexAttribute {
        semantic: "COLOR\0",
        format: AttributeFormat::Float4,
        offset: std::mem::offset_of!(Vertex, color) as u32,
    },
];

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;
}

pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    // Vertex is repr(C) plain f32 data with no padding
    unsafe {
        std::slice::from_raw_parts(
            vertices.as_ptr() as *const u8,
            std::mem::size_of_val(vertices),
        )
    }
}
