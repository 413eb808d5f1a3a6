// model.rs — MD2 alias model loading
//
// The file is read whole, every header field and record is byte swapped
// individually, and the triangle adjacency graph is built once before the
// model is handed out. A model is either fully loaded or not returned at all.

use std::fs;
use std::path::Path;

use bytemuck::Pod;
use log::{info, warn};

use md2shadow_common::config::Config;
use md2shadow_common::endian::read_i32_le;
use md2shadow_common::mathlib::{transform_vertex, Vec3};
use md2shadow_common::qfiles::*;

use crate::adjacency::{build_adjacency, AdjacencyGraph};
use crate::error::Md2Error;
use crate::visibility::VisibilityBuffer;

/// Scale applied to every model after frame decompression.
pub const MODEL_UNIT_SCALE: f32 = 0.05;

// =============================================================
//  Load options
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub unit_scale: f32,
    /// Check ident and version before trusting the header.
    pub strict: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            unit_scale: MODEL_UNIT_SCALE,
            strict: true,
        }
    }
}

impl From<&Config> for LoadOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            unit_scale: cfg.md2_scale,
            strict: cfg.md2_strict,
        }
    }
}

// =============================================================
//  In-memory model
// =============================================================

/// Placement of a model in the world. Rotation is Euler degrees, applied
/// X, then Y, then Z, about the model origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl ModelPose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    #[inline]
    pub fn transform(&self, v: &Vec3) -> Vec3 {
        transform_vertex(v, &self.position, &self.rotation)
    }
}

/// One keyframe pose.
#[derive(Debug, Clone)]
pub struct Frame {
    pub scale: Vec3,
    pub translate: Vec3,
    pub name: String,
    pub verts: Vec<DTriVertx>,
}

impl Frame {
    /// Model-space position of vertex `index`.
    #[inline]
    pub fn vertex(&self, index: usize, unit_scale: f32) -> Vec3 {
        let raw = &self.verts[index].v;
        [
            (raw[0] as f32 * self.scale[0] + self.translate[0]) * unit_scale,
            (raw[1] as f32 * self.scale[1] + self.translate[1]) * unit_scale,
            (raw[2] as f32 * self.scale[2] + self.translate[2]) * unit_scale,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub index_xyz: [usize; 3],
    pub index_st: [usize; 3],
}

impl Triangle {
    pub fn new(index_xyz: [usize; 3]) -> Self {
        Self {
            index_xyz,
            index_st: [0; 3],
        }
    }

    /// Consecutive vertex pairs: (v0,v1), (v1,v2), (v2,v0).
    #[inline]
    pub fn edges(&self) -> [(usize, usize); 3] {
        let v = &self.index_xyz;
        [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommandKind {
    Strip,
    Fan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommandVertex {
    pub s: f32,
    pub t: f32,
    pub index: usize,
}

/// A triangle fan or strip over one frame's vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommandGroup {
    pub kind: DrawCommandKind,
    pub verts: Vec<DrawCommandVertex>,
}

#[derive(Debug)]
pub struct Md2Model {
    name: String,
    skin_width: i32,
    skin_height: i32,
    skins: Vec<String>,
    st: Vec<DStVert>,
    frames: Vec<Frame>,
    triangles: Vec<Triangle>,
    glcmds: Vec<DrawCommandGroup>,
    adjacency: AdjacencyGraph,
    pub(crate) visibility: VisibilityBuffer,
    unit_scale: f32,
}

impl Md2Model {
    /// Assemble a model from already decoded parts, checking every vertex
    /// index and building the adjacency graph.
    pub fn from_parts(
        name: &str,
        frames: Vec<Frame>,
        triangles: Vec<Triangle>,
        glcmds: Vec<DrawCommandGroup>,
        unit_scale: f32,
    ) -> Result<Self, Md2Error> {
        let num_xyz = match frames.first() {
            Some(f) if !f.verts.is_empty() => f.verts.len(),
            Some(_) => return Err(empty(name, "vertices")),
            None => return Err(empty(name, "frames")),
        };
        if triangles.is_empty() {
            return Err(empty(name, "triangles"));
        }

        for f in &frames {
            if f.verts.len() != num_xyz {
                return Err(Md2Error::BadIndex {
                    name: name.to_string(),
                    what: "frame vertex count",
                    index: f.verts.len() as i64,
                    limit: num_xyz,
                });
            }
        }
        for tri in &triangles {
            for &i in &tri.index_xyz {
                check_index(name, "triangle vertex", i as i64, num_xyz)?;
            }
        }
        for cmd in &glcmds {
            for v in &cmd.verts {
                check_index(name, "draw command vertex", v.index as i64, num_xyz)?;
            }
        }

        let adjacency = build_adjacency(&triangles)?;
        let visibility = VisibilityBuffer::new(triangles.len())?;

        Ok(Self {
            name: name.to_string(),
            skin_width: 0,
            skin_height: 0,
            skins: Vec::new(),
            st: Vec::new(),
            frames,
            triangles,
            glcmds,
            adjacency,
            visibility,
            unit_scale,
        })
    }

    /// Load a model from disk.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, Md2Error> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| Md2Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let model = Self::from_bytes(&path.display().to_string(), &data, options)?;
        info!(
            "loaded {}: {} frames, {} verts, {} tris, {} edges, {} draw commands",
            model.name,
            model.num_frames(),
            model.num_vertices(),
            model.triangles.len(),
            model.adjacency.len(),
            model.glcmds.len()
        );
        Ok(model)
    }

    /// Parse an in-memory MD2 image.
    pub fn from_bytes(name: &str, buffer: &[u8], options: &LoadOptions) -> Result<Self, Md2Error> {
        let header = section(name, buffer, "header", 0, DMdl::SIZE)?;
        let header = bytemuck::pod_read_unaligned::<DMdl>(header).to_native();

        if options.strict {
            if header.ident != IDALIASHEADER {
                return Err(Md2Error::BadIdent {
                    name: name.to_string(),
                    found: header.ident,
                });
            }
            if header.version != ALIAS_VERSION {
                return Err(Md2Error::BadVersion {
                    name: name.to_string(),
                    found: header.version,
                    expected: ALIAS_VERSION,
                });
            }
        }

        let num_xyz = count(name, "vertices", header.num_xyz)?;
        let num_tris = count(name, "triangles", header.num_tris)?;
        let num_frames = count(name, "frames", header.num_frames)?;
        let num_st = header.num_st.max(0) as usize;
        let num_skins = header.num_skins.max(0) as usize;

        // skin names
        let raw = section(name, buffer, "skins", header.ofs_skins, num_skins * MAX_SKINNAME)?;
        let mut skins = Vec::new();
        skins.try_reserve_exact(num_skins).map_err(Md2Error::resource("skins"))?;
        skins.extend(raw.chunks_exact(MAX_SKINNAME).map(name_from_bytes));

        // base s and t vertices
        let st = read_records::<DStVert>(name, buffer, "texture coordinates", header.ofs_st, num_st)?
            .into_iter()
            .map(DStVert::to_native)
            .collect::<Vec<_>>();

        // frames; vertex bytes are copied verbatim
        let frame_header_size = std::mem::size_of::<DAliasFrame>();
        let frame_size = frame_header_size + num_xyz * std::mem::size_of::<DTriVertx>();
        let frames_len = num_frames.checked_mul(frame_size).ok_or(Md2Error::Truncated {
            name: name.to_string(),
            what: "frames",
            offset: header.ofs_frames as i64,
            len: usize::MAX,
            file_len: buffer.len(),
        })?;
        let all_frames = section(name, buffer, "frames", header.ofs_frames, frames_len)?;

        let mut frames = Vec::new();
        frames.try_reserve_exact(num_frames).map_err(Md2Error::resource("frames"))?;
        for raw in all_frames.chunks_exact(frame_size) {
            let fh = bytemuck::pod_read_unaligned::<DAliasFrame>(&raw[..frame_header_size]).to_native();

            let mut verts = Vec::new();
            verts.try_reserve_exact(num_xyz).map_err(Md2Error::resource("frame vertices"))?;
            verts.extend(
                raw[frame_header_size..]
                    .chunks_exact(std::mem::size_of::<DTriVertx>())
                    .map(bytemuck::pod_read_unaligned::<DTriVertx>),
            );

            frames.push(Frame {
                scale: fh.scale,
                translate: fh.translate,
                name: name_from_bytes(&fh.name),
                verts,
            });
        }

        // triangle lists
        let raw_tris = read_records::<DTriangle>(name, buffer, "triangles", header.ofs_tris, num_tris)?;
        let mut triangles = Vec::new();
        triangles.try_reserve_exact(num_tris).map_err(Md2Error::resource("triangles"))?;
        for tri in raw_tris {
            let tri = tri.to_native();
            let mut index_xyz = [0usize; 3];
            let mut index_st = [0usize; 3];
            for j in 0..3 {
                index_xyz[j] = check_index(name, "triangle vertex", tri.index_xyz[j] as i64, num_xyz)?;
                index_st[j] = if num_st > 0 {
                    check_index(name, "triangle texcoord", tri.index_st[j] as i64, num_st)?
                } else {
                    0
                };
            }
            triangles.push(Triangle { index_xyz, index_st });
        }

        let glcmds = load_glcmds(name, buffer, &header, num_xyz)?;

        let mut model = Self::from_parts(name, frames, triangles, glcmds, options.unit_scale)?;
        model.skin_width = header.skinwidth;
        model.skin_height = header.skinheight;
        model.skins = skins;
        model.st = st;
        Ok(model)
    }

    // ---------------------------------------------------------
    //  Accessors
    // ---------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skins(&self) -> &[String] {
        &self.skins
    }

    pub fn skin_size(&self) -> (i32, i32) {
        (self.skin_width, self.skin_height)
    }

    pub fn texcoords(&self) -> &[DStVert] {
        &self.st
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Vertices per frame; identical for every frame.
    pub fn num_vertices(&self) -> usize {
        self.frames[0].verts.len()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn draw_commands(&self) -> &[DrawCommandGroup] {
        &self.glcmds
    }

    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }

    /// Visibility flags from the last [`Md2Model::classify`] call.
    pub fn visibility(&self) -> &VisibilityBuffer {
        &self.visibility
    }

    pub fn unit_scale(&self) -> f32 {
        self.unit_scale
    }

    /// World-space position of vertex `index` in `frame`.
    ///
    /// Panics if `frame` is out of range.
    #[inline]
    pub fn world_vertex(&self, frame: usize, index: usize, pose: &ModelPose) -> Vec3 {
        pose.transform(&self.frames[frame].vertex(index, self.unit_scale))
    }

    /// World-space corners of triangle `tri` in `frame`.
    pub fn world_triangle(&self, frame: usize, tri: usize, pose: &ModelPose) -> [Vec3; 3] {
        self.triangles[tri]
            .index_xyz
            .map(|i| self.world_vertex(frame, i, pose))
    }
}

// =============================================================
//  Section readers
// =============================================================

fn empty(name: &str, what: &'static str) -> Md2Error {
    Md2Error::EmptyModel {
        name: name.to_string(),
        what,
    }
}

fn count(name: &str, what: &'static str, n: i32) -> Result<usize, Md2Error> {
    if n <= 0 {
        return Err(empty(name, what));
    }
    Ok(n as usize)
}

fn check_index(name: &str, what: &'static str, index: i64, limit: usize) -> Result<usize, Md2Error> {
    if index < 0 || index as u64 >= limit as u64 {
        return Err(Md2Error::BadIndex {
            name: name.to_string(),
            what,
            index,
            limit,
        });
    }
    Ok(index as usize)
}

fn section<'a>(name: &str, buffer: &'a [u8], what: &'static str, offset: i32, len: usize) -> Result<&'a [u8], Md2Error> {
    section_at(name, buffer, what, offset as i64, len)
}

fn section_at<'a>(name: &str, buffer: &'a [u8], what: &'static str, offset: i64, len: usize) -> Result<&'a [u8], Md2Error> {
    let truncated = || Md2Error::Truncated {
        name: name.to_string(),
        what,
        offset,
        len,
        file_len: buffer.len(),
    };

    let start = usize::try_from(offset).map_err(|_| truncated())?;
    let end = start.checked_add(len).ok_or_else(truncated)?;
    buffer.get(start..end).ok_or_else(truncated)
}

fn read_records<T: Pod>(name: &str, buffer: &[u8], what: &'static str, offset: i32, n: usize) -> Result<Vec<T>, Md2Error> {
    let size = std::mem::size_of::<T>();
    let len = n.checked_mul(size).ok_or(Md2Error::Truncated {
        name: name.to_string(),
        what,
        offset: offset as i64,
        len: usize::MAX,
        file_len: buffer.len(),
    })?;
    let raw = section(name, buffer, what, offset, len)?;

    let mut out = Vec::new();
    out.try_reserve_exact(n).map_err(Md2Error::resource(what))?;
    out.extend(raw.chunks_exact(size).map(bytemuck::pod_read_unaligned::<T>));
    Ok(out)
}

/// Read draw-command groups until the zero-count terminator. A negative
/// count is a fan of `-count` vertices, a positive one a strip. The stream
/// is bounded by `num_glcmds` 32-bit words.
fn load_glcmds(name: &str, buffer: &[u8], header: &DMdl, num_xyz: usize) -> Result<Vec<DrawCommandGroup>, Md2Error> {
    let mut glcmds = Vec::new();
    let words = header.num_glcmds.max(0) as i64;
    if words == 0 {
        return Ok(glcmds);
    }

    let start = header.ofs_glcmds as i64;
    let limit = start + words * 4;
    let vert_size = std::mem::size_of::<DGlCmdVertex>();
    let mut pos = start;

    loop {
        if pos >= limit {
            warn!("{}: draw commands have no terminator", name);
            break;
        }

        let num = read_i32_le(buffer, pos as usize).ok_or(Md2Error::Truncated {
            name: name.to_string(),
            what: "draw command count",
            offset: pos,
            len: 4,
            file_len: buffer.len(),
        })?;
        pos += 4;
        if num == 0 {
            break;
        }

        let kind = if num < 0 {
            DrawCommandKind::Fan
        } else {
            DrawCommandKind::Strip
        };
        let n = num.unsigned_abs() as usize;
        let len = n * vert_size;
        if pos + len as i64 > limit {
            return Err(Md2Error::Truncated {
                name: name.to_string(),
                what: "draw command group",
                offset: pos,
                len,
                file_len: buffer.len(),
            });
        }
        let raw = section_at(name, buffer, "draw command group", pos, len)?;
        pos += len as i64;

        let mut verts = Vec::new();
        verts.try_reserve_exact(n).map_err(Md2Error::resource("draw commands"))?;
        for chunk in raw.chunks_exact(vert_size) {
            let v = bytemuck::pod_read_unaligned::<DGlCmdVertex>(chunk).to_native();
            verts.push(DrawCommandVertex {
                s: v.s,
                t: v.t,
                index: check_index(name, "draw command vertex", v.index as i64, num_xyz)?,
            });
        }

        glcmds.try_reserve(1).map_err(Md2Error::resource("draw commands"))?;
        glcmds.push(DrawCommandGroup { kind, verts });
    }

    Ok(glcmds)
}
