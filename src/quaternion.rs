use std::ops::Mul;

use ultraviolet::Vec3;

/// Rotation quaternion stored as vector part `v` and scalar part `w`.
///
/// Every quaternion built by this crate is unit length, which is what lets
/// `inverse` get away with a conjugate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub v: Vec3,
    pub w: f32,
}

impl Quaternion {
    pub fn identity() -> Self {
        Quaternion {
            v: Vec3::zero(),
            w: 1.0,
        }
    }

    /// `axis` must already be normalized, a zero axis gives a degenerate rotation.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half_angle = angle / 2.0;
        Quaternion {
            v: axis * half_angle.sin(),
            w: half_angle.cos(),
        }
    }

    fn pure(p: Vec3) -> Self {
        Quaternion { v: p, w: 0.0 }
    }

    pub fn inverse(&self) -> Self {
        Quaternion {
            v: -self.v,
            w: self.w,
        }
    }

    /// Rotates `p` by this quaternion: `q * (p, 0) * q⁻¹`.
    pub fn rotate(&self, p: Vec3) -> Vec3 {
        (*self * Quaternion::pure(p) * self.inverse()).v
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion {
            v: rhs.v * self.w + self.v * rhs.w + self.v.cross(rhs.v),
            w: self.w * rhs.w - self.v.dot(rhs.v),
        }
    }
}

/// Carries a local-frame vector back out through a chain of joint rotations.
///
/// `chain` is ordered root to leaf, the same order the rotations were applied
/// on the way in. The leaf's inverse is applied first.
pub fn unwind(chain: &[Quaternion], p: Vec3) -> Vec3 {
    chain
        .iter()
        .rev()
        .fold(p, |acc, q| q.inverse().rotate(acc))
}
