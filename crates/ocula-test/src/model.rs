//! Recording model - a stand-in skeleton that remembers every rotation

use ocula_core::{Bone, Rotation3D, Skeleton};

/// Skeleton that records rotations instead of rendering them
#[derive(Debug, Clone, Default)]
pub struct RecordingModel {
    bones: Vec<Bone>,
    pub applied: Vec<(Bone, Rotation3D)>,
}

impl RecordingModel {
    /// Humanoid with both eyes
    pub fn with_eyes() -> Self {
        RecordingModel {
            bones: Bone::eyes().to_vec(),
            applied: Vec::new(),
        }
    }

    /// Model missing every eye bone
    pub fn without_eyes() -> Self {
        Self::default()
    }

    pub fn with_bones(bones: &[Bone]) -> Self {
        RecordingModel {
            bones: bones.to_vec(),
            applied: Vec::new(),
        }
    }

    pub fn rotations_for(&self, bone: Bone) -> impl Iterator<Item = &Rotation3D> {
        self.applied
            .iter()
            .filter(move |(b, _)| *b == bone)
            .map(|(_, r)| r)
    }
}

impl Skeleton for RecordingModel {
    fn has_bone(&self, bone: Bone) -> bool {
        self.bones.contains(&bone)
    }

    fn apply_rotation(&mut self, bone: Bone, delta: Rotation3D) {
        self.applied.push((bone, delta));
    }
}
