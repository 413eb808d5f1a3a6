// visibility.rs — per-triangle facing classification

use bitflags::bitflags;

use md2shadow_common::mathlib::{Plane, Vec3};

use crate::error::Md2Error;
use crate::model::{Md2Model, ModelPose};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TriangleFlags: u8 {
        /// Front face is toward the viewpoint.
        const VISIBLE = 0x01;
        /// Already drawn this pass.
        const DRAWN   = 0x02;
    }
}

/// Inputs the flags were computed for. Compared with float `==`, so the
/// pose and viewpoint must be finite for a key to match itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityKey {
    pub frame: usize,
    pub pose: ModelPose,
    pub viewpoint: Vec3,
}

/// One flag set per triangle, reused between passes.
#[derive(Debug, Clone, Default)]
pub struct VisibilityBuffer {
    flags: Vec<TriangleFlags>,
    key: Option<VisibilityKey>,
}

impl VisibilityBuffer {
    pub fn new(num_triangles: usize) -> Result<Self, Md2Error> {
        let mut flags = Vec::new();
        flags
            .try_reserve_exact(num_triangles)
            .map_err(Md2Error::resource("triangle flags"))?;
        flags.resize(num_triangles, TriangleFlags::empty());
        Ok(Self { flags, key: None })
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> &[TriangleFlags] {
        &self.flags
    }

    #[inline]
    pub fn is_visible(&self, tri: usize) -> bool {
        self.flags[tri].contains(TriangleFlags::VISIBLE)
    }

    pub fn mark_drawn(&mut self, tri: usize) {
        self.flags[tri].insert(TriangleFlags::DRAWN);
    }

    pub fn visible_count(&self) -> usize {
        self.flags
            .iter()
            .filter(|f| f.contains(TriangleFlags::VISIBLE))
            .count()
    }

    /// Frame, pose and viewpoint of the last classification.
    pub fn key(&self) -> Option<&VisibilityKey> {
        self.key.as_ref()
    }
}

/// Flag every triangle of `model` at `frame` that faces `viewpoint`.
///
/// The plane is built from the corners in reverse order, so a triangle wound
/// counter-clockwise seen from outside is visible from outside. A viewpoint
/// exactly on the plane counts as not visible.
///
/// Panics if `frame` is out of range.
pub fn classify_triangles(
    model: &Md2Model,
    frame: usize,
    pose: &ModelPose,
    viewpoint: &Vec3,
    out: &mut VisibilityBuffer,
) {
    assert!(
        frame < model.num_frames(),
        "frame {} out of range ({} frames)",
        frame,
        model.num_frames()
    );

    let num_tris = model.triangles().len();
    if out.flags.len() != num_tris {
        out.flags.resize(num_tris, TriangleFlags::empty());
    }

    for (i, flags) in out.flags.iter_mut().enumerate() {
        let [v0, v1, v2] = model.world_triangle(frame, i, pose);
        let plane = Plane::from_points(&v2, &v1, &v0, false);

        flags.remove(TriangleFlags::DRAWN);
        flags.set(TriangleFlags::VISIBLE, plane.side(viewpoint) > 0.0);
    }

    out.key = Some(VisibilityKey {
        frame,
        pose: *pose,
        viewpoint: *viewpoint,
    });
}

impl Md2Model {
    /// Classify into the model's own buffer.
    pub fn classify(&mut self, frame: usize, pose: &ModelPose, viewpoint: &Vec3) {
        let mut buffer = std::mem::take(&mut self.visibility);
        classify_triangles(self, frame, pose, viewpoint, &mut buffer);
        self.visibility = buffer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{single_triangle, tetrahedron};

    fn visible(model: &Md2Model) -> Vec<bool> {
        (0..model.triangles().len())
            .map(|i| model.visibility().is_visible(i))
            .collect()
    }

    #[test]
    fn single_triangle_faces_positive_z() {
        let mut model = single_triangle();
        let pose = ModelPose::default();
        model.classify(0, &pose, &[0.0, 0.0, 1.0]);
        assert!(model.visibility().is_visible(0));
        model.classify(0, &pose, &[0.0, 0.0, -1.0]);
        assert!(!model.visibility().is_visible(0));
    }

    #[test]
    fn viewpoint_outside_sees_faces_toward_it() {
        let mut model = tetrahedron();
        model.classify(0, &ModelPose::default(), &[2.0, 2.0, 2.0]);
        // only the slanted face BCD faces (2,2,2)
        assert_eq!(visible(&model), vec![false, false, false, true]);
        assert_eq!(model.visibility().visible_count(), 1);
    }

    #[test]
    fn viewpoint_below_sees_base() {
        let mut model = tetrahedron();
        model.classify(0, &ModelPose::default(), &[0.2, 0.2, -5.0]);
        assert_eq!(visible(&model), vec![true, false, false, false]);
    }

    #[test]
    fn viewpoint_inside_sees_nothing() {
        let mut model = tetrahedron();
        model.classify(0, &ModelPose::default(), &[0.1, 0.1, 0.1]);
        assert_eq!(model.visibility().visible_count(), 0);
    }

    #[test]
    fn viewpoint_on_plane_is_not_visible() {
        let mut model = tetrahedron();
        // z = 0 is the plane of triangle 0
        model.classify(0, &ModelPose::default(), &[5.0, 5.0, 0.0]);
        assert!(!model.visibility().is_visible(0));
    }

    #[test]
    fn pose_moves_the_planes() {
        let mut model = tetrahedron();
        let pose = ModelPose::new([0.0, 0.0, 10.0], [0.0; 3]);
        // the base now sits at z = 10, so a viewpoint at z = 5 is below it
        model.classify(0, &pose, &[0.2, 0.2, 5.0]);
        assert!(model.visibility().is_visible(0));
    }

    #[test]
    fn classification_resets_drawn_and_records_key() {
        let mut model = tetrahedron();
        model.visibility.mark_drawn(2);
        let pose = ModelPose::default();
        model.classify(1, &pose, &[2.0, 2.0, 2.0]);

        assert!(model
            .visibility()
            .flags()
            .iter()
            .all(|f| !f.contains(TriangleFlags::DRAWN)));
        let key = model.visibility().key().unwrap();
        assert_eq!(key.frame, 1);
        assert_eq!(key.viewpoint, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn separate_buffer_leaves_model_buffer_alone() {
        let model = tetrahedron();
        let mut buffer = VisibilityBuffer::new(model.triangles().len()).unwrap();
        classify_triangles(&model, 0, &ModelPose::default(), &[2.0, 2.0, 2.0], &mut buffer);
        assert_eq!(buffer.visible_count(), 1);
        assert!(model.visibility().key().is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn frame_out_of_range_panics() {
        let mut model = tetrahedron();
        model.classify(2, &ModelPose::default(), &[2.0, 2.0, 2.0]);
    }
}
