// qfiles.rs — MD2 model file records
//
// All records are little-endian on disk. They are read with
// `bytemuck::pod_read_unaligned` and then normalized field by field with
// `to_native`.

use bytemuck::{Pod, Zeroable};

use crate::endian::{little_float, little_long, little_short, little_ulong};

// ============================================================
// MD2 model format
// ============================================================

/// MD2 magic: "IDP2" in little-endian
pub const IDALIASHEADER: i32 = (b'2' as i32) << 24 | (b'P' as i32) << 16 | (b'D' as i32) << 8 | b'I' as i32;
pub const ALIAS_VERSION: i32 = 8;

pub const MAX_SKINNAME: usize = 64;
pub const FRAME_NAME_LEN: usize = 16;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DStVert {
    pub s: i16,
    pub t: i16,
}

impl DStVert {
    pub fn to_native(self) -> Self {
        Self {
            s: little_short(self.s),
            t: little_short(self.t),
        }
    }
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DTriangle {
    pub index_xyz: [i16; 3],
    pub index_st: [i16; 3],
}

impl DTriangle {
    pub fn to_native(self) -> Self {
        Self {
            index_xyz: self.index_xyz.map(little_short),
            index_st: self.index_st.map(little_short),
        }
    }
}

/// Compressed vertex. Single bytes, so no swapping is ever needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct DTriVertx {
    pub v: [u8; 3],
    pub lightnormalindex: u8,
}

/// Frame header; `num_xyz` DTriVertx records follow it.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DAliasFrame {
    pub scale: [f32; 3],
    pub translate: [f32; 3],
    pub name: [u8; FRAME_NAME_LEN],
}

impl DAliasFrame {
    pub fn to_native(self) -> Self {
        Self {
            scale: self.scale.map(little_float),
            translate: self.translate.map(little_float),
            name: self.name,
        }
    }
}

/// One vertex of a draw-command group.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DGlCmdVertex {
    pub s: f32,
    pub t: f32,
    pub index: u32,
}

impl DGlCmdVertex {
    pub fn to_native(self) -> Self {
        Self {
            s: little_float(self.s),
            t: little_float(self.t),
            index: little_ulong(self.index),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub struct DMdl {
    pub ident: i32,
    pub version: i32,
    pub skinwidth: i32,
    pub skinheight: i32,
    pub framesize: i32,
    pub num_skins: i32,
    pub num_xyz: i32,
    pub num_st: i32,
    pub num_tris: i32,
    pub num_glcmds: i32,
    pub num_frames: i32,
    pub ofs_skins: i32,
    pub ofs_st: i32,
    pub ofs_tris: i32,
    pub ofs_frames: i32,
    pub ofs_glcmds: i32,
    pub ofs_end: i32,
}

impl DMdl {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Byte swap every header field.
    pub fn to_native(self) -> Self {
        Self {
            ident: little_long(self.ident),
            version: little_long(self.version),
            skinwidth: little_long(self.skinwidth),
            skinheight: little_long(self.skinheight),
            framesize: little_long(self.framesize),
            num_skins: little_long(self.num_skins),
            num_xyz: little_long(self.num_xyz),
            num_st: little_long(self.num_st),
            num_tris: little_long(self.num_tris),
            num_glcmds: little_long(self.num_glcmds),
            num_frames: little_long(self.num_frames),
            ofs_skins: little_long(self.ofs_skins),
            ofs_st: little_long(self.ofs_st),
            ofs_tris: little_long(self.ofs_tris),
            ofs_frames: little_long(self.ofs_frames),
            ofs_glcmds: little_long(self.ofs_glcmds),
            ofs_end: little_long(self.ofs_end),
        }
    }
}

/// Decode a fixed-size, NUL-padded name field.
pub fn name_from_bytes(raw: &[u8]) -> String {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len]).into_owned()
}

// =============================================================================
// Tests
// =============================================================================
