use smallvec::SmallVec;
use ultraviolet::Vec3;

use crate::{
    primatives::{Cylinder, Disc, Paraboloid, Plane, Ray, Sphere},
    quaternion::{unwind, Quaternion},
};

pub use self::hitable::{merge, Hit, Hittable};

pub mod hitable;

/// Most figures have no more than this many joints, deeper chains spill to the heap.
const INLINE_JOINTS: usize = 8;

/// A primitive owned by a joint, positioned in that joint's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Part {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Paraboloid(Paraboloid),
    Disc(Disc),
}

impl Hittable for Part {
    fn ray_test(&self, ray: &Ray) -> Hit {
        match self {
            Part::Sphere(sphere) => sphere.ray_test(ray),
            Part::Cylinder(cylinder) => cylinder.ray_test(ray),
            Part::Paraboloid(paraboloid) => paraboloid.ray_test(ray),
            Part::Disc(disc) => disc.ray_test(ray),
        }
    }
}

/// One rigid segment of the figure.
///
/// The segment's frame is reached from its parent's frame by translating by
/// `offset` and then rotating by `axis` through `speed * time` radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub axis: Vec3,
    pub speed: f32,
    pub offset: Vec3,
    pub parts: Vec<Part>,
}

impl Joint {
    pub fn new(axis: Vec3, speed: f32, offset: Vec3, parts: Vec<Part>) -> Self {
        Joint {
            axis: axis.normalized(),
            speed,
            offset,
            parts,
        }
    }

    pub fn rotation(&self, time: f32) -> Quaternion {
        Quaternion::from_axis_angle(self.axis, time * self.speed)
    }
}

/// The articulated figure: a static ground, a pivot marker and a chain of joints.
///
/// `joints[0]` is the turntable base, every later joint hangs off the one
/// before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub ground: Plane,
    pub pivot: Sphere,
    pub joints: Vec<Joint>,
}

impl Figure {
    /// Turntable base carrying a two bone arm with a paraboloid head.
    pub fn robot_arm() -> Self {
        let up = Vec3::new(0.0, 1.0, 0.0);
        let bone = Part::Cylinder(Cylinder {
            center: Vec3::zero(),
            radius: 0.05,
            height: 1.5,
        });
        let elbow_offset = Vec3::new(0.0, -1.5, 0.0);

        Figure {
            ground: Plane {
                origin: Vec3::new(0.0, -0.2, 0.0),
                normal: up,
            },
            pivot: Sphere {
                center: Vec3::zero(),
                radius: 0.15,
            },
            joints: vec![
                Joint::new(
                    Vec3::new(0.0, 4.0, 0.0),
                    1.0,
                    Vec3::zero(),
                    vec![
                        Part::Disc(Disc {
                            origin: Vec3::zero(),
                            normal: up,
                            radius: 1.2,
                        }),
                        Part::Cylinder(Cylinder {
                            center: Vec3::new(0.0, -0.2, 0.0),
                            radius: 1.2,
                            height: 0.2,
                        }),
                    ],
                ),
                Joint::new(
                    Vec3::new(0.0, 3.0, 1.0),
                    4.0,
                    Vec3::zero(),
                    vec![
                        bone,
                        Part::Sphere(Sphere {
                            center: Vec3::new(0.0, 1.5, 0.0),
                            radius: 0.15,
                        }),
                    ],
                ),
                Joint::new(
                    Vec3::new(0.0, 1.0, 1.0),
                    4.0,
                    elbow_offset,
                    vec![
                        bone,
                        Part::Sphere(Sphere {
                            center: Vec3::new(0.0, 1.5, 0.0),
                            radius: 0.2,
                        }),
                    ],
                ),
                Joint::new(
                    Vec3::new(0.0, 4.0, 1.0),
                    4.0,
                    elbow_offset,
                    vec![Part::Paraboloid(Paraboloid {
                        center: Vec3::zero(),
                        height: 0.55,
                    })],
                ),
            ],
        }
    }

    /// Closest hit of a world-space ray against the whole figure at `time`.
    ///
    /// The returned normal is in world space. `t < 0` means the ray escapes.
    pub fn hit_scene(&self, ray: &Ray, time: f32) -> Hit {
        let mut chain: SmallVec<[Quaternion; INLINE_JOINTS]> = SmallVec::new();
        let mut local = *ray;
        let mut hit = Hit::miss();

        for joint in &self.joints {
            let q = joint.rotation(time);
            local = local.transformed(q, joint.offset);
            chain.push(q);

            for part in &joint.parts {
                let candidate = part.ray_test(&local).map_normal(|n| unwind(&chain, n));
                hit = merge(hit, candidate);
            }
        }

        // Pivot and ground are tested in world space, the ground never turns with the base.
        hit = merge(hit, self.pivot.ray_test(ray));
        merge(hit, self.ground.ray_test(ray))
    }

    pub fn pose(&self, time: f32) -> Pose<'_> {
        Pose { figure: self, time }
    }
}

impl Default for Figure {
    fn default() -> Self {
        Figure::robot_arm()
    }
}

/// A figure frozen at one instant, usable anywhere a plain `Hittable` is.
#[derive(Debug, Clone, Copy)]
pub struct Pose<'a> {
    pub figure: &'a Figure,
    pub time: f32,
}

impl Hittable for Pose<'_> {
    fn ray_test(&self, ray: &Ray) -> Hit {
        self.figure.hit_scene(ray, self.time)
    }
}
