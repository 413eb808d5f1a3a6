// backend.rs — draw submission interface
//
// The renderer never talks to a graphics API directly. Everything it draws
// goes through `RenderBackend`; `RecordingBackend` keeps a log of the calls
// for the headless driver and the tests.

use md2shadow_common::mathlib::Vec3;

use crate::model::DrawCommandKind;
use crate::shadow::{ShadowVolume, CAP_FRONT_FACE, SILHOUETTE_FRONT_FACE};
use crate::skin::SkinVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Increment,
    Decrement,
}

/// Cull mode and the stencil update applied where the depth test fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowPass {
    pub cull: CullFace,
    pub depth_fail: StencilOp,
}

/// Depth-fail stencil counting: back faces increment, front faces decrement.
pub const SHADOW_PASSES: [ShadowPass; 2] = [
    ShadowPass {
        cull: CullFace::Front,
        depth_fail: StencilOp::Increment,
    },
    ShadowPass {
        cull: CullFace::Back,
        depth_fail: StencilOp::Decrement,
    },
];

pub trait RenderBackend {
    /// One textured fan or strip of the model skin.
    fn draw_skin_group(&mut self, kind: DrawCommandKind, verts: &[SkinVertex]);

    /// Color and depth writes off, stencil test on.
    fn begin_shadow_volumes(&mut self) {}

    fn set_shadow_pass(&mut self, pass: &ShadowPass);

    fn set_front_face(&mut self, face: FrontFace);

    fn draw_quads(&mut self, quads: &[[Vec3; 4]]);

    fn draw_triangles(&mut self, tris: &[[Vec3; 3]]);

    /// Restore the state `begin_shadow_volumes` changed.
    fn end_shadow_volumes(&mut self) {}
}

/// Draw `volume` once per stencil pass.
pub fn submit_shadow_volume<B: RenderBackend + ?Sized>(backend: &mut B, volume: &ShadowVolume) {
    for pass in &SHADOW_PASSES {
        backend.set_shadow_pass(pass);

        backend.set_front_face(SILHOUETTE_FRONT_FACE);
        backend.draw_quads(&volume.silhouette);

        backend.set_front_face(CAP_FRONT_FACE);
        backend.draw_triangles(&volume.near_cap);
        backend.draw_triangles(&volume.far_cap);
    }
}

// =============================================================
//  Recording backend
// =============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SkinGroup { kind: DrawCommandKind, verts: usize },
    BeginShadowVolumes,
    ShadowPass(ShadowPass),
    FrontFace(FrontFace),
    Quads(usize),
    Triangles(usize),
    EndShadowVolumes,
}

/// Backend that only remembers what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn skin_groups(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::SkinGroup { .. }))
            .count()
    }

    pub fn quads(&self) -> usize {
        self.calls
            .iter()
            .map(|c| match c {
                DrawCall::Quads(n) => *n,
                _ => 0,
            })
            .sum()
    }

    pub fn triangles(&self) -> usize {
        self.calls
            .iter()
            .map(|c| match c {
                DrawCall::Triangles(n) => *n,
                _ => 0,
            })
            .sum()
    }

    pub fn passes(&self) -> Vec<ShadowPass> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::ShadowPass(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn draw_skin_group(&mut self, kind: DrawCommandKind, verts: &[SkinVertex]) {
        self.calls.push(DrawCall::SkinGroup {
            kind,
            verts: verts.len(),
        });
    }

    fn begin_shadow_volumes(&mut self) {
        self.calls.push(DrawCall::BeginShadowVolumes);
    }

    fn set_shadow_pass(&mut self, pass: &ShadowPass) {
        self.calls.push(DrawCall::ShadowPass(*pass));
    }

    fn set_front_face(&mut self, face: FrontFace) {
        self.calls.push(DrawCall::FrontFace(face));
    }

    fn draw_quads(&mut self, quads: &[[Vec3; 4]]) {
        self.calls.push(DrawCall::Quads(quads.len()));
    }

    fn draw_triangles(&mut self, tris: &[[Vec3; 3]]) {
        self.calls.push(DrawCall::Triangles(tris.len()));
    }

    fn end_shadow_volumes(&mut self) {
        self.calls.push(DrawCall::EndShadowVolumes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume() -> ShadowVolume {
        ShadowVolume {
            silhouette: vec![[[0.0; 3]; 4]; 3],
            near_cap: vec![[[0.0; 3]; 3]; 1],
            far_cap: vec![[[0.0; 3]; 3]; 3],
        }
    }

    #[test]
    fn volume_is_drawn_once_per_pass() {
        let mut backend = RecordingBackend::new();
        submit_shadow_volume(&mut backend, &volume());

        assert_eq!(backend.passes(), SHADOW_PASSES.to_vec());
        assert_eq!(backend.quads(), 6);
        assert_eq!(backend.triangles(), 8);
    }

    #[test]
    fn first_pass_culls_front_and_increments() {
        assert_eq!(SHADOW_PASSES[0].cull, CullFace::Front);
        assert_eq!(SHADOW_PASSES[0].depth_fail, StencilOp::Increment);
        assert_eq!(SHADOW_PASSES[1].cull, CullFace::Back);
        assert_eq!(SHADOW_PASSES[1].depth_fail, StencilOp::Decrement);
    }

    #[test]
    fn silhouette_then_caps_with_their_winding() {
        let mut backend = RecordingBackend::new();
        submit_shadow_volume(&mut backend, &volume());
        assert_eq!(
            &backend.calls[..6],
            &[
                DrawCall::ShadowPass(SHADOW_PASSES[0]),
                DrawCall::FrontFace(FrontFace::Clockwise),
                DrawCall::Quads(3),
                DrawCall::FrontFace(FrontFace::CounterClockwise),
                DrawCall::Triangles(1),
                DrawCall::Triangles(3),
            ]
        );
    }
}
