// anim.rs — named animation frame ranges

use log::warn;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid animation id {0}")]
pub struct InvalidAnimation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AnimationId {
    Stand = 0,
    Walk,
    Jump,
    FlipOff,
    Taunt,
    CrouchStand,
    CrouchWalk,
    Pain,
    Death1,
    Death2,
    Death3,
    Wave,
    Attack,
}

/// Inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationRange {
    pub start: usize,
    pub end: usize,
}

impl AnimationRange {
    const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, frame: usize) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}

const ANIMATIONS: [(AnimationId, &str, AnimationRange); 13] = [
    (AnimationId::Stand, "stand", AnimationRange::new(0, 39)),
    (AnimationId::Walk, "walk", AnimationRange::new(40, 45)),
    (AnimationId::Jump, "jump", AnimationRange::new(66, 67)),
    (AnimationId::FlipOff, "flip-off", AnimationRange::new(72, 83)),
    (AnimationId::Taunt, "taunt", AnimationRange::new(95, 111)),
    (AnimationId::CrouchStand, "crouch-stand", AnimationRange::new(135, 153)),
    (AnimationId::CrouchWalk, "crouch-walk", AnimationRange::new(154, 159)),
    (AnimationId::Pain, "pain", AnimationRange::new(54, 57)),
    (AnimationId::Death1, "death1", AnimationRange::new(178, 183)),
    (AnimationId::Death2, "death2", AnimationRange::new(184, 189)),
    (AnimationId::Death3, "death3", AnimationRange::new(190, 197)),
    (AnimationId::Wave, "wave", AnimationRange::new(112, 122)),
    (AnimationId::Attack, "attack", AnimationRange::new(46, 53)),
];

impl AnimationId {
    pub const ALL: [AnimationId; 13] = [
        AnimationId::Stand,
        AnimationId::Walk,
        AnimationId::Jump,
        AnimationId::FlipOff,
        AnimationId::Taunt,
        AnimationId::CrouchStand,
        AnimationId::CrouchWalk,
        AnimationId::Pain,
        AnimationId::Death1,
        AnimationId::Death2,
        AnimationId::Death3,
        AnimationId::Wave,
        AnimationId::Attack,
    ];

    pub fn range(self) -> AnimationRange {
        ANIMATIONS[self as usize].2
    }

    pub fn name(self) -> &'static str {
        ANIMATIONS[self as usize].1
    }
}

impl TryFrom<u32> for AnimationId {
    type Error = InvalidAnimation;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(InvalidAnimation(id))
    }
}

/// Frame range of animation `id`. Unknown ids give the zero range.
pub fn lookup(id: u32) -> AnimationRange {
    match AnimationId::try_from(id) {
        Ok(anim) => anim.range(),
        Err(e) => {
            warn!("{}, using frame 0", e);
            AnimationRange::default()
        }
    }
}

// =============================================================
//  Playback
// =============================================================

/// Steps one whole frame per tick through a range, wrapping to its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCursor {
    range: AnimationRange,
    frame: usize,
}

impl AnimationCursor {
    /// Start `id` on a model with `num_frames` frames. The range is clamped
    /// to frames that exist.
    pub fn new(id: u32, num_frames: usize) -> Self {
        let mut range = lookup(id);
        let last = num_frames.saturating_sub(1);
        if range.end > last {
            warn!(
                "animation {} ends at frame {} but the model has {} frames",
                id, range.end, num_frames
            );
            range.end = last;
            range.start = range.start.min(last);
        }
        Self {
            range,
            frame: range.start,
        }
    }

    /// Parked on frame 0 until there is a model to animate.
    pub fn idle() -> Self {
        Self {
            range: AnimationRange::default(),
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn range(&self) -> AnimationRange {
        self.range
    }

    /// Move to the next frame and return it.
    pub fn advance(&mut self) -> usize {
        self.frame = if self.frame >= self.range.end {
            self.range.start
        } else {
            self.frame + 1
        };
        self.frame
    }
}
