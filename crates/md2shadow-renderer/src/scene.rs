// scene.rs — per-frame composition: skin, then one shadow volume per light

use std::path::Path;

use log::{debug, info, trace};
use rayon::prelude::*;

use md2shadow_common::config::Config;
use md2shadow_common::mathlib::{deg2rad, Vec3};

use crate::anim::AnimationCursor;
use crate::backend::{submit_shadow_volume, RenderBackend};
use crate::error::Md2Error;
use crate::lights::{LightHandle, LightSet};
use crate::model::{LoadOptions, Md2Model, ModelPose};
use crate::shadow::{extrude_shadow_volume, ShadowVolume};
use crate::skin::render_skin;
use crate::visibility::{classify_triangles, VisibilityBuffer};

pub const MODEL_POSITION: Vec3 = [0.0, -0.8, 2.0];
pub const MODEL_ROTATION: Vec3 = [-90.0, -90.0, 0.0];

const LIGHT_RADIUS: f32 = 15.0;
const LIGHT_HEIGHT: f32 = 0.33;
/// Degrees per frame for each orbiting light.
const LIGHT_SPEEDS: [f32; 3] = [0.5, -0.5, 2.0];

/// A light circling the model. The flat orbit squeezes x and pins z.
#[derive(Debug, Clone, Copy)]
struct Orbit {
    handle: LightHandle,
    angle: f32,
    speed: f32,
    flat: bool,
}

impl Orbit {
    fn position(&self) -> Vec3 {
        orbit_position(self.angle, self.flat)
    }
}

fn orbit_position(angle: f32, flat: bool) -> Vec3 {
    let (s, c) = deg2rad(angle).sin_cos();
    if flat {
        [c * LIGHT_RADIUS * 0.125, LIGHT_HEIGHT, 0.0]
    } else {
        [c * LIGHT_RADIUS, LIGHT_HEIGHT, s * LIGHT_RADIUS]
    }
}

/// What one `render` call produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: usize,
    pub skin_drawn: bool,
    pub lights: usize,
    pub silhouette_quads: usize,
    pub near_cap: usize,
    pub far_cap: usize,
}

impl FrameStats {
    fn add_volume(&mut self, volume: &ShadowVolume) {
        self.lights += 1;
        self.silhouette_quads += volume.silhouette.len();
        self.near_cap += volume.near_cap.len();
        self.far_cap += volume.far_cap.len();
    }
}

pub struct Scene {
    config: Config,
    model: Option<Md2Model>,
    pose: ModelPose,
    cursor: AnimationCursor,
    lights: LightSet,
    orbits: Vec<Orbit>,
    lighting: bool,
    volume: ShadowVolume,
}

impl Scene {
    /// Empty scene with the three orbiting white lights.
    pub fn new(config: Config) -> Self {
        let mut lights = LightSet::new();
        let orbits = LIGHT_SPEEDS
            .iter()
            .enumerate()
            .filter_map(|(i, &speed)| {
                let flat = i == 2;
                let handle = lights.create(orbit_position(0.0, flat))?;
                Some(Orbit {
                    handle,
                    angle: 0.0,
                    speed,
                    flat,
                })
            })
            .collect();

        Self {
            lighting: config.lighting,
            cursor: AnimationCursor::idle(),
            config,
            model: None,
            pose: ModelPose::new(MODEL_POSITION, MODEL_ROTATION),
            lights,
            orbits,
            volume: ShadowVolume::default(),
        }
    }

    /// Replace the model with the one at `path`. On failure the current
    /// model stays as it was.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<(), Md2Error> {
        let model = Md2Model::load(path, &LoadOptions::from(&self.config))?;
        self.set_model(model);
        Ok(())
    }

    pub fn set_model(&mut self, model: Md2Model) {
        self.cursor = AnimationCursor::new(self.config.anim, model.num_frames());
        self.model = Some(model);
    }

    pub fn model(&self) -> Option<&Md2Model> {
        self.model.as_ref()
    }

    /// Switch animations. Without a model the id is kept for the next
    /// `set_model`.
    pub fn set_animation(&mut self, id: u32) {
        self.config.anim = id;
        if let Some(model) = &self.model {
            self.cursor = AnimationCursor::new(id, model.num_frames());
        }
    }

    pub fn frame(&self) -> usize {
        self.cursor.frame()
    }

    pub fn pose(&self) -> &ModelPose {
        &self.pose
    }

    pub fn set_pose(&mut self, pose: ModelPose) {
        self.pose = pose;
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightSet {
        &mut self.lights
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    pub fn toggle_lighting(&mut self) -> bool {
        self.lighting = !self.lighting;
        info!("lighting {}", if self.lighting { "on" } else { "off" });
        self.lighting
    }

    /// Draw the current frame.
    pub fn render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> FrameStats {
        let frame = self.cursor.frame();
        let mut stats = FrameStats {
            frame,
            ..FrameStats::default()
        };

        let Some(model) = self.model.as_mut() else {
            return stats;
        };
        let pose = self.pose;

        stats.skin_drawn = render_skin(model, frame, &pose, backend);
        if !self.lighting {
            return stats;
        }

        let lights = self.lights.positions();
        let distance = self.config.shadow_extrude;

        backend.begin_shadow_volumes();
        if self.config.shadow_parallel && lights.len() > 1 {
            let model: &Md2Model = model;
            let volumes: Vec<ShadowVolume> = lights
                .par_iter()
                .map(|light| {
                    let mut visibility = VisibilityBuffer::default();
                    classify_triangles(model, frame, &pose, light, &mut visibility);
                    let mut volume = ShadowVolume::default();
                    extrude_shadow_volume(model, &visibility, frame, &pose, light, distance, &mut volume);
                    volume
                })
                .collect();

            for volume in &volumes {
                submit_shadow_volume(backend, volume);
                stats.add_volume(volume);
            }
        } else {
            for light in &lights {
                model.classify(frame, &pose, light);
                model.shadow_volume(frame, &pose, light, distance, &mut self.volume);
                submit_shadow_volume(backend, &self.volume);
                stats.add_volume(&self.volume);
            }
        }
        backend.end_shadow_volumes();

        trace!("{:?}", stats);
        stats
    }

    /// Step the light orbits and the animation by one tick.
    pub fn advance(&mut self) {
        for orbit in &mut self.orbits {
            orbit.angle += orbit.speed;
            self.lights.set_position(orbit.handle, orbit.position());
        }
        let frame = self.cursor.advance();
        debug!("frame {}", frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCall, RecordingBackend, SHADOW_PASSES};
    use crate::fixtures::{tetrahedron, tetrahedron_image};

    fn close(a: &Vec3, b: &Vec3) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < 1e-4)
    }

    fn scene_with(config: Config) -> Scene {
        let mut scene = Scene::new(config);
        scene.set_model(tetrahedron());
        // keep the lights outside the small test model
        scene.set_pose(ModelPose::default());
        scene
    }

    #[test]
    fn lights_start_on_their_orbits() {
        let scene = Scene::new(Config::default());
        let positions = scene.lights().positions();
        assert_eq!(positions.len(), 3);
        assert!(close(&positions[0], &[15.0, 0.33, 0.0]));
        assert!(close(&positions[2], &[15.0 * 0.125, 0.33, 0.0]));
    }

    #[test]
    fn advance_moves_lights_by_their_speed() {
        let mut scene = Scene::new(Config::default());
        for _ in 0..180 {
            scene.advance();
        }
        let positions = scene.lights().positions();
        // light 0 went +90 degrees, light 1 -90, light 2 a full turn
        assert!(close(&positions[0], &[0.0, 0.33, 15.0]));
        assert!(close(&positions[1], &[0.0, 0.33, -15.0]));
        assert!(close(&positions[2], &[15.0 * 0.125, 0.33, 0.0]));
    }

    #[test]
    fn render_without_model_draws_nothing() {
        let mut scene = Scene::new(Config::default());
        let mut backend = RecordingBackend::new();
        let stats = scene.render(&mut backend);
        assert!(!stats.skin_drawn);
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn skin_then_two_passes_per_light() {
        let mut scene = scene_with(Config::default());
        let mut backend = RecordingBackend::new();
        let stats = scene.render(&mut backend);

        assert!(stats.skin_drawn);
        assert_eq!(stats.lights, 3);
        assert_eq!(backend.skin_groups(), 2);
        assert!(matches!(backend.calls[0], DrawCall::SkinGroup { .. }));
        assert_eq!(backend.calls[2], DrawCall::BeginShadowVolumes);
        assert_eq!(backend.calls.last(), Some(&DrawCall::EndShadowVolumes));

        let passes = backend.passes();
        assert_eq!(passes.len(), 6);
        for pair in passes.chunks(2) {
            assert_eq!(pair, &SHADOW_PASSES[..]);
        }
        // every triangle lands in exactly one cap per light
        assert_eq!(stats.near_cap + stats.far_cap, 3 * 4);
        assert!(stats.silhouette_quads > 0);
    }

    #[test]
    fn lighting_off_skips_shadows() {
        let mut scene = scene_with(Config::default());
        assert!(!scene.toggle_lighting());
        let mut backend = RecordingBackend::new();
        let stats = scene.render(&mut backend);
        assert!(stats.skin_drawn);
        assert_eq!(stats.lights, 0);
        assert!(backend.passes().is_empty());
    }

    #[test]
    fn parallel_lights_match_sequential() {
        let mut sequential = scene_with(Config::default());
        let mut config = Config::default();
        config.shadow_parallel = true;
        let mut parallel = scene_with(config);

        for _ in 0..5 {
            let mut a = RecordingBackend::new();
            let mut b = RecordingBackend::new();
            assert_eq!(sequential.render(&mut a), parallel.render(&mut b));
            assert_eq!(a.calls, b.calls);
            sequential.advance();
            parallel.advance();
        }
    }

    #[test]
    fn failed_load_keeps_current_model() {
        let mut scene = scene_with(Config::default());
        let path = std::env::temp_dir().join("md2shadow_test_scene_missing.md2");
        let _ = std::fs::remove_file(&path);

        assert!(matches!(scene.load_model(&path), Err(Md2Error::Io { .. })));
        let model = scene.model().unwrap();
        assert_eq!(model.name(), "tetra.md2");
        assert_eq!(model.triangles().len(), 4);
    }

    #[test]
    fn load_model_replaces_and_resets_animation() {
        let path = std::env::temp_dir().join("md2shadow_test_scene_load.md2");
        std::fs::write(&path, tetrahedron_image().to_bytes()).unwrap();

        let mut scene = scene_with(Config::default());
        scene.advance();
        assert_eq!(scene.frame(), 1);
        scene.load_model(&path).unwrap();
        assert_eq!(scene.frame(), 0);
        assert_eq!(scene.model().unwrap().name(), path.display().to_string());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn animation_waits_for_a_model() {
        let mut scene = Scene::new(Config::default());
        assert_eq!(scene.frame(), 0);
        scene.set_animation(crate::anim::AnimationId::Jump as u32);
        scene.advance();
        assert_eq!(scene.frame(), 0);

        // jump is 66..=67, clamped onto the last of the fixture's two frames
        scene.set_model(tetrahedron());
        assert_eq!(scene.frame(), 1);
    }

    #[test]
    fn animation_stays_within_model_frames() {
        let mut scene = scene_with(Config::default());
        scene.set_animation(crate::anim::AnimationId::Walk as u32);
        let mut backend = RecordingBackend::new();
        for _ in 0..4 {
            assert!(scene.frame() < 2);
            scene.render(&mut backend);
            scene.advance();
        }
    }
}
