// fixtures.rs — synthetic MD2 images and models shared by the tests

use md2shadow_common::qfiles::{DMdl, DTriVertx, ALIAS_VERSION, FRAME_NAME_LEN, IDALIASHEADER, MAX_SKINNAME};

use crate::model::{Frame, LoadOptions, Md2Model, Triangle, MODEL_UNIT_SCALE};

pub struct ImageFrame {
    pub scale: [f32; 3],
    pub translate: [f32; 3],
    pub name: &'static str,
    pub verts: Vec<[u8; 3]>,
}

pub struct ImageGlCmd {
    pub fan: bool,
    pub verts: Vec<(f32, f32, u32)>,
}

/// Field-level description of an MD2 file, serialized little-endian.
pub struct Md2Image {
    pub ident: i32,
    pub version: i32,
    pub skin_width: i32,
    pub skin_height: i32,
    pub skins: Vec<&'static str>,
    pub st: Vec<[i16; 2]>,
    /// xyz indices followed by st indices
    pub triangles: Vec<[i16; 6]>,
    pub frames: Vec<ImageFrame>,
    pub glcmds: Vec<ImageGlCmd>,
    /// Extra words after the terminator, counted in `num_glcmds`.
    pub glcmd_trailer: Vec<i32>,
    pub omit_glcmd_terminator: bool,
}

impl Md2Image {
    fn num_xyz(&self) -> usize {
        self.frames.first().map_or(0, |f| f.verts.len())
    }

    fn skins_offset(&self) -> usize {
        DMdl::SIZE
    }

    fn st_offset(&self) -> usize {
        self.skins_offset() + self.skins.len() * MAX_SKINNAME
    }

    fn tris_offset(&self) -> usize {
        self.st_offset() + self.st.len() * 4
    }

    pub fn frames_offset(&self) -> usize {
        self.tris_offset() + self.triangles.len() * 12
    }

    fn frame_size(&self) -> usize {
        40 + self.num_xyz() * 4
    }

    fn glcmds_offset(&self) -> usize {
        self.frames_offset() + self.frames.len() * self.frame_size()
    }

    fn glcmd_words(&self) -> Vec<i32> {
        let mut words = Vec::new();
        for cmd in &self.glcmds {
            let n = cmd.verts.len() as i32;
            words.push(if cmd.fan { -n } else { n });
            for &(s, t, index) in &cmd.verts {
                words.push(s.to_bits() as i32);
                words.push(t.to_bits() as i32);
                words.push(index as i32);
            }
        }
        if !self.omit_glcmd_terminator {
            words.push(0);
        }
        words.extend_from_slice(&self.glcmd_trailer);
        words
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let words = self.glcmd_words();
        let ofs_end = self.glcmds_offset() + words.len() * 4;

        let header = [
            self.ident,
            self.version,
            self.skin_width,
            self.skin_height,
            self.frame_size() as i32,
            self.skins.len() as i32,
            self.num_xyz() as i32,
            self.st.len() as i32,
            self.triangles.len() as i32,
            words.len() as i32,
            self.frames.len() as i32,
            self.skins_offset() as i32,
            self.st_offset() as i32,
            self.tris_offset() as i32,
            self.frames_offset() as i32,
            self.glcmds_offset() as i32,
            ofs_end as i32,
        ];

        let mut out = Vec::with_capacity(ofs_end);
        for field in header {
            out.extend_from_slice(&field.to_le_bytes());
        }
        for skin in &self.skins {
            let mut raw = [0u8; MAX_SKINNAME];
            raw[..skin.len()].copy_from_slice(skin.as_bytes());
            out.extend_from_slice(&raw);
        }
        for st in &self.st {
            out.extend_from_slice(&st[0].to_le_bytes());
            out.extend_from_slice(&st[1].to_le_bytes());
        }
        for tri in &self.triangles {
            for i in tri {
                out.extend_from_slice(&i.to_le_bytes());
            }
        }
        for frame in &self.frames {
            for f in frame.scale.iter().chain(frame.translate.iter()) {
                out.extend_from_slice(&f.to_le_bytes());
            }
            let mut name = [0u8; FRAME_NAME_LEN];
            name[..frame.name.len()].copy_from_slice(frame.name.as_bytes());
            out.extend_from_slice(&name);
            for v in &frame.verts {
                out.extend_from_slice(v);
                out.push(0);
            }
        }
        for w in words {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out
    }
}

/// Unit tetrahedron A(0,0,0) B(1,0,0) C(0,1,0) D(0,0,1) with outward,
/// counter-clockwise faces. Frame 1 is the same shape twice as large.
pub fn tetrahedron_image() -> Md2Image {
    let verts = vec![[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]];
    Md2Image {
        ident: IDALIASHEADER,
        version: ALIAS_VERSION,
        skin_width: 64,
        skin_height: 32,
        skins: vec!["models/tetra/skin.pcx"],
        st: vec![[0, 0], [32, 0], [0, 16]],
        triangles: vec![
            [0, 2, 1, 0, 2, 1],
            [0, 1, 3, 0, 1, 2],
            [0, 3, 2, 0, 2, 1],
            [1, 2, 3, 0, 1, 2],
        ],
        frames: vec![
            ImageFrame {
                scale: [20.0; 3],
                translate: [0.0; 3],
                name: "pose1",
                verts: verts.clone(),
            },
            ImageFrame {
                scale: [40.0; 3],
                translate: [0.0; 3],
                name: "pose2",
                verts,
            },
        ],
        glcmds: vec![
            ImageGlCmd {
                fan: true,
                verts: vec![(0.0, 0.0, 0), (0.5, 0.0, 2), (0.0, 0.5, 1)],
            },
            ImageGlCmd {
                fan: false,
                verts: vec![(0.0, 0.0, 0), (0.5, 0.0, 1), (0.0, 0.5, 2), (0.5, 0.5, 3)],
            },
        ],
        glcmd_trailer: Vec::new(),
        omit_glcmd_terminator: false,
    }
}

pub fn tetrahedron() -> Md2Model {
    Md2Model::from_bytes("tetra.md2", &tetrahedron_image().to_bytes(), &LoadOptions::default())
        .expect("tetrahedron fixture loads")
}

/// Two triangles sharing the edge {1,2}; every other edge has one owner.
pub fn open_quad() -> Md2Model {
    let mut image = tetrahedron_image();
    image.triangles = vec![[0, 1, 2, 0, 1, 2], [1, 3, 2, 0, 1, 2]];
    image.frames[0].verts = vec![[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]];
    image.frames[1].verts = image.frames[0].verts.clone();
    image.glcmds.clear();
    Md2Model::from_bytes("quad.md2", &image.to_bytes(), &LoadOptions::default())
        .expect("quad fixture loads")
}

/// (0,0,0), (1,0,0), (0,1,0), wound counter-clockwise seen from +Z.
pub fn single_triangle() -> Md2Model {
    let vert = |v: [u8; 3]| DTriVertx {
        v,
        lightnormalindex: 0,
    };
    let frame = Frame {
        scale: [20.0; 3],
        translate: [0.0; 3],
        name: "base".to_string(),
        verts: vec![vert([0, 0, 0]), vert([1, 0, 0]), vert([0, 1, 0])],
    };
    Md2Model::from_parts(
        "triangle",
        vec![frame],
        vec![Triangle::new([0, 1, 2])],
        Vec::new(),
        MODEL_UNIT_SCALE,
    )
    .expect("triangle fixture builds")
}
