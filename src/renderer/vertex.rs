//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
///
/// Positions are canvas units (800x600, y down) until `RenderState` maps them to NDC.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    use crate::sim::entity::{Color, rgb};

    pub const SKY_TOP: Color = rgb(0x020210);
    pub const SKY_BOTTOM: Color = rgb(0x0c0c2e);
    pub const SNOW: Color = rgb(0xffffff);

    pub const ELF_BODY: Color = rgb(0x4caf50);
    pub const ELF_FACE: Color = rgb(0xffdbac);
    pub const ELF_HAT: Color = rgb(0x2e7d32);
    pub const ELF_GLOW: Color = [0.0, 1.0, 0.0, 0.35];

    pub const ANTAGONIST_BODY: Color = rgb(0x4caf50);
    pub const ANTAGONIST_HEAD: Color = rgb(0x388e3c);
    pub const ANTAGONIST_EYES: Color = rgb(0xffeb3b);
    pub const ANTAGONIST_HAT: Color = rgb(0xc62828);
    pub const VACUUM: Color = rgb(0x37474f);
    pub const VACUUM_NOZZLE: Color = rgb(0xb0bec5);
    pub const TETHER: Color = [1.0, 1.0, 1.0, 0.3];

    pub const WINDOW: Color = rgb(0xfce570);
    pub const DOOR: Color = rgb(0x4a2511);
    pub const TRUNK: Color = rgb(0x4e342e);

    pub const PLATFORM_LOCKED: Color = rgb(0xb71c1c);
    pub const PLATFORM_OPEN: Color = rgb(0xffffff);
    pub const STRIPE_LOCKED: Color = rgb(0xff0000);
    pub const STRIPE_OPEN: Color = rgb(0x4caf50);

    pub const BIRD: Color = rgb(0x212121);
    pub const WING: Color = rgb(0x616161);
    pub const SNOWBALL: Color = rgb(0xffffff);
    pub const LAUNCHER: Color = rgb(0xff9800);
    pub const WALKER: Color = rgb(0xd32f2f);

    pub const SLEIGH_BODY: Color = rgb(0xb71c1c);
    pub const SLEIGH_BACK: Color = rgb(0x8e0000);
    pub const SANTA: Color = rgb(0xd32f2f);
    pub const BEARD: Color = rgb(0xffffff);
    pub const RUNNER: Color = rgb(0xfbc02d);
    pub const FLAME: Color = rgb(0xff9800);

    pub const BANNER: Color = [0.0, 0.0, 0.0, 0.85];
    pub const DIM: Color = [0.0, 0.0, 0.0, 0.6];
    pub const TEXT: Color = rgb(0xffffff);
    pub const CRASH_TEXT: Color = rgb(0xff1744);
}
