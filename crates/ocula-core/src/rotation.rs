//! Rotation - unit quaternion for bone-local rotation deltas

use std::ops::Mul;

/// Unit quaternion rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation3D {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Rotation3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation3D {
    pub const IDENTITY: Rotation3D = Rotation3D {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Rotation of `angle` radians about the X axis
    pub fn about_x(angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self { w: c, x: s, y: 0.0, z: 0.0 }
    }

    /// Rotation of `angle` radians about the Y axis
    pub fn about_y(angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self { w: c, x: 0.0, y: s, z: 0.0 }
    }

    /// Rotation of `angle` radians about the Z axis
    pub fn about_z(angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self { w: c, x: 0.0, y: 0.0, z: s }
    }

    /// Euler angles in radians, applied Z first, then X, then Y
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        Self::about_y(y) * Self::about_x(x) * Self::about_z(z)
    }

    /// Euler angles in degrees, same axis order as [`Rotation3D::from_euler`]
    pub fn from_euler_degrees(x: f32, y: f32, z: f32) -> Self {
        Self::from_euler(x.to_radians(), y.to_radians(), z.to_radians())
    }

    pub fn dot(&self, other: &Rotation3D) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn conjugate(&self) -> Rotation3D {
        Rotation3D {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Smallest angle in radians between two orientations
    pub fn angle_to(&self, other: &Rotation3D) -> f32 {
        // atan2 stays accurate for the sub-milliradian offsets jitter produces
        let d = self.conjugate() * *other;
        let v = (d.x * d.x + d.y * d.y + d.z * d.z).sqrt();
        2.0 * v.atan2(d.w.abs())
    }

    /// Spherical linear interpolation, `t` clamped to [0, 1]
    pub fn slerp(&self, other: &Rotation3D, t: f32) -> Rotation3D {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mut dot = self.dot(other);

        let other = if dot < 0.0 {
            dot = -dot;
            Rotation3D {
                w: -other.w,
                x: -other.x,
                y: -other.y,
                z: -other.z,
            }
        } else {
            *other
        };

        if dot > 0.9995 {
            // Nearly parallel: nlerp avoids dividing by sin(θ) ≈ 0
            let result = Rotation3D {
                w: self.w + (other.w - self.w) * t,
                x: self.x + (other.x - self.x) * t,
                y: self.y + (other.y - self.y) * t,
                z: self.z + (other.z - self.z) * t,
            };
            return result.normalize();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Rotation3D {
            w: self.w * s0 + other.w * s1,
            x: self.x * s0 + other.x * s1,
            y: self.y * s0 + other.y * s1,
            z: self.z * s0 + other.z * s1,
        }
    }

    pub fn normalize(&self) -> Rotation3D {
        let len = self.dot(self).sqrt();
        if len < 0.0001 || !len.is_finite() {
            return Rotation3D::identity();
        }
        Rotation3D {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`
impl Mul for Rotation3D {
    type Output = Rotation3D;

    fn mul(self, rhs: Rotation3D) -> Rotation3D {
        Rotation3D {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}
