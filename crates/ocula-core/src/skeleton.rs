//! Skeleton boundary - the host model as seen from OCULA
//!
//! The bone hierarchy and its rendering live outside this workspace. OCULA
//! only asks whether a bone exists and hands out rotation deltas for the
//! bones it owns.

use crate::Rotation3D;

/// Humanoid bones OCULA drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bone {
    LeftEye,
    RightEye,
}

impl Bone {
    /// Both eye bones; ocular features need all of them
    pub fn eyes() -> &'static [Bone] {
        &[Bone::LeftEye, Bone::RightEye]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bone::LeftEye => "LeftEye",
            Bone::RightEye => "RightEye",
        }
    }
}

/// Capability query and transform sink for the currently loaded model
pub trait Skeleton {
    fn has_bone(&self, bone: Bone) -> bool;

    /// Post-multiply `delta` onto the bone's local rotation
    fn apply_rotation(&mut self, bone: Bone, delta: Rotation3D);
}

/// Load/unload notifications from the external model loader
pub trait ModelLifecycle {
    /// A model finished loading; (re)acquire whatever bones are needed
    fn on_attach(&mut self, skeleton: &dyn Skeleton);

    /// The current model is about to be released
    fn on_detach(&mut self);
}

/// True when the skeleton carries every bone in `bones`
pub fn has_all_bones(skeleton: &dyn Skeleton, bones: &[Bone]) -> bool {
    bones.iter().all(|bone| skeleton.has_bone(*bone))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneEyed;

    impl Skeleton for OneEyed {
        fn has_bone(&self, bone: Bone) -> bool {
            bone == Bone::LeftEye
        }

        fn apply_rotation(&mut self, _bone: Bone, _delta: Rotation3D) {}
    }

    #[test]
    fn test_has_all_bones() {
        assert!(has_all_bones(&OneEyed, &[Bone::LeftEye]));
        assert!(!has_all_bones(&OneEyed, Bone::eyes()));
    }

    #[test]
    fn test_bone_names() {
        assert_eq!(Bone::LeftEye.as_str(), "LeftEye");
        assert_eq!(Bone::RightEye.as_str(), "RightEye");
    }
}
