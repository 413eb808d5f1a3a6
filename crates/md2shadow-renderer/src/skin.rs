// skin.rs — textured model drawing from the draw-command stream

use log::debug;

use md2shadow_common::mathlib::Vec3;

use crate::backend::RenderBackend;
use crate::model::{Md2Model, ModelPose};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinVertex {
    pub position: Vec3,
    pub st: [f32; 2],
}

/// Draw every fan and strip of `frame`. Returns false, drawing nothing, when
/// the frame does not exist.
pub fn render_skin<B: RenderBackend + ?Sized>(
    model: &Md2Model,
    frame: usize,
    pose: &ModelPose,
    backend: &mut B,
) -> bool {
    if frame >= model.num_frames() {
        debug!(
            "{}: no frame {} ({} frames)",
            model.name(),
            frame,
            model.num_frames()
        );
        return false;
    }

    let mut verts = Vec::new();
    for group in model.draw_commands() {
        verts.clear();
        verts.extend(group.verts.iter().map(|v| SkinVertex {
            position: model.world_vertex(frame, v.index, pose),
            st: [v.s, v.t],
        }));
        backend.draw_skin_group(group.kind, &verts);
    }
    true
}
