// shadow.rs — stencil shadow volume extraction
//
// A silhouette edge is a shared edge whose two owners disagree about facing
// the light. Each one becomes a quad stretched away from the light; the lit
// triangles close the near end and the unlit ones, pushed out the same
// distance, close the far end.

use md2shadow_common::mathlib::{vector_ma, vector_normalize, vector_subtract, Vec3};

use crate::backend::FrontFace;
use crate::model::{Md2Model, ModelPose};
use crate::visibility::VisibilityBuffer;

/// Default extrusion distance.
pub const SHADOW_EXTRUDE: f32 = 150.0;

/// Silhouette quads are wound clockwise seen from outside the volume.
pub const SILHOUETTE_FRONT_FACE: FrontFace = FrontFace::Clockwise;
pub const CAP_FRONT_FACE: FrontFace = FrontFace::CounterClockwise;

/// Geometry of one light's shadow volume, ready for submission.
#[derive(Debug, Clone, Default)]
pub struct ShadowVolume {
    /// (far b, near b, near a, far a) per silhouette edge.
    pub silhouette: Vec<[Vec3; 4]>,
    pub near_cap: Vec<[Vec3; 3]>,
    pub far_cap: Vec<[Vec3; 3]>,
}

impl ShadowVolume {
    pub fn clear(&mut self) {
        self.silhouette.clear();
        self.near_cap.clear();
        self.far_cap.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.silhouette.is_empty() && self.near_cap.is_empty() && self.far_cap.is_empty()
    }
}

/// Push `v` `distance` units further along the ray from `light`. A vertex
/// sitting on the light stays where it is.
#[inline]
pub fn project_to_infinity(v: &Vec3, light: &Vec3, distance: f32) -> Vec3 {
    let mut dir = vector_subtract(v, light);
    vector_normalize(&mut dir);
    vector_ma(v, distance, &dir)
}

/// Extract the shadow volume of `model` at `frame` lit from `light` into
/// `out`, replacing its previous contents.
///
/// `visibility` must hold a classification for the same frame, pose and
/// light position; anything else is a caller bug and panics. The match is
/// exact float equality, so a NaN pose or light never matches.
pub fn extrude_shadow_volume(
    model: &Md2Model,
    visibility: &VisibilityBuffer,
    frame: usize,
    pose: &ModelPose,
    light: &Vec3,
    distance: f32,
    out: &mut ShadowVolume,
) {
    let key = visibility
        .key()
        .unwrap_or_else(|| panic!("{}: shadow volume before classification", model.name()));
    assert!(
        key.frame == frame && key.pose == *pose && key.viewpoint == *light,
        "{}: visibility computed for frame {} from {:?}, extruding frame {} from {:?} (NaN never matches)",
        model.name(),
        key.frame,
        key.viewpoint,
        frame,
        light
    );
    assert_eq!(
        visibility.len(),
        model.triangles().len(),
        "{}: visibility buffer sized for another model",
        model.name()
    );

    out.clear();

    let triangles = model.triangles();
    let world = |i: usize| model.world_vertex(frame, i, pose);

    for edge in model.adjacency().edges() {
        // boundary edges never produce a silhouette
        let Some((t0, t1)) = edge.owners() else {
            continue;
        };

        let lit0 = visibility.is_visible(t0);
        if lit0 == visibility.is_visible(t1) {
            continue;
        }

        // walk the edge the way the unlit owner does
        let unlit = if lit0 { t1 } else { t0 };
        let [u, v] = edge.vertices;
        let (a, b) = triangles[unlit]
            .edges()
            .into_iter()
            .find(|&(a, b)| (a == u && b == v) || (a == v && b == u))
            .unwrap_or_else(|| panic!("edge {:?} not found in triangle {}", edge.vertices, unlit));

        let near_a = world(a);
        let near_b = world(b);
        let far_a = project_to_infinity(&near_a, light, distance);
        let far_b = project_to_infinity(&near_b, light, distance);

        out.silhouette.push([far_b, near_b, near_a, far_a]);
    }

    for (i, tri) in triangles.iter().enumerate() {
        let corners = tri.index_xyz.map(world);
        if visibility.is_visible(i) {
            out.near_cap.push(corners);
        } else {
            out.far_cap.push(corners.map(|c| project_to_infinity(&c, light, distance)));
        }
    }
}

impl Md2Model {
    /// Extract from the model's own visibility buffer.
    pub fn shadow_volume(&self, frame: usize, pose: &ModelPose, light: &Vec3, distance: f32, out: &mut ShadowVolume) {
        extrude_shadow_volume(self, &self.visibility, frame, pose, light, distance, out);
    }
}
