use ultraviolet::Vec3;

use crate::{
    constants::{EPSILON, NO_HIT},
    quaternion::Quaternion,
    render_objects::{Hit, Hittable},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Moves the ray into a child frame: translate the origin by `offset`
    /// (expressed in the current frame), then rotate origin and direction by `q`.
    pub fn transformed(&self, q: Quaternion, offset: Vec3) -> Ray {
        Ray {
            origin: q.rotate(self.origin + offset),
            direction: q.rotate(self.direction),
        }
    }
}

/// Both roots of `a t² + b t + c = 0`, smaller first.
///
/// `None` for a negative discriminant or a vanishing `a`.
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() < EPSILON {
        return None;
    }
    let descrim = b * b - 4.0 * a * c;
    if descrim < 0.0 {
        return None;
    }
    let desc_sqrt = descrim.sqrt();
    let t1 = (-b - desc_sqrt) / (2.0 * a);
    let t2 = (-b + desc_sqrt) / (2.0 * a);
    Some((t1.min(t2), t1.max(t2)))
}

/// Smallest non-negative root whose hit point lies within `[base, base + height]` vertically.
fn nearest_capped_root(ray: &Ray, roots: &[f32], base: f32, height: f32) -> f32 {
    roots
        .iter()
        .copied()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .filter(|t| {
            let y = ray.at(*t).y;
            y >= base && y <= base + height
        })
        .fold(NO_HIT, |best, t| if best < 0.0 || t < best { t } else { best })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Hittable for Sphere {
    fn ray_test(&self, ray: &Ray) -> Hit {
        let line = ray.origin - self.center;
        let a = ray.direction.mag_sq();
        let b = 2.0 * line.dot(ray.direction);
        let c = line.mag_sq() - self.radius * self.radius;

        let Some((near, far)) = solve_quadratic(a, b, c) else {
            return Hit::miss();
        };
        // Origin inside the sphere: the near root is behind us.
        let t = if near >= 0.0 { near } else { far };
        if !(t >= 0.0) {
            return Hit::miss();
        }
        Hit::new(t, (ray.at(t) - self.center).normalized())
    }
}

/// Lateral surface of a vertical cylinder standing on `center`, no caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub center: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Hittable for Cylinder {
    fn ray_test(&self, ray: &Ray) -> Hit {
        let oc = Vec3::new(
            ray.origin.x - self.center.x,
            0.0,
            ray.origin.z - self.center.z,
        );
        let dir = Vec3::new(ray.direction.x, 0.0, ray.direction.z);
        let a = dir.mag_sq();
        let b = 2.0 * oc.dot(dir);
        let c = oc.mag_sq() - self.radius * self.radius;

        let Some((t1, t2)) = solve_quadratic(a, b, c) else {
            return Hit::miss();
        };
        let t = nearest_capped_root(ray, &[t1, t2], self.center.y, self.height);
        if t < 0.0 {
            return Hit::miss();
        }
        let mut normal = ray.at(t) - self.center;
        normal.y = 0.0;
        Hit::new(t, normal.normalized())
    }
}

/// Upward opening paraboloid `y - c.y = (x - c.x)² + (z - c.z)²`, cut at `height` above the apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paraboloid {
    pub center: Vec3,
    pub height: f32,
}

impl Hittable for Paraboloid {
    fn ray_test(&self, ray: &Ray) -> Hit {
        let ox = ray.origin.x - self.center.x;
        let oz = ray.origin.z - self.center.z;
        let d = ray.direction;

        let a = d.x * d.x + d.z * d.z;
        let b = 2.0 * ox * d.x + 2.0 * oz * d.z - d.y;
        let c = ox * ox + oz * oz - (ray.origin.y - self.center.y);

        let t = if a.abs() < EPSILON {
            // Vertical ray, the equation is linear in t.
            if b.abs() < EPSILON {
                return Hit::miss();
            }
            nearest_capped_root(ray, &[-c / b], self.center.y, self.height)
        } else {
            match solve_quadratic(a, b, c) {
                Some((t1, t2)) => {
                    nearest_capped_root(ray, &[t1, t2], self.center.y, self.height)
                }
                None => return Hit::miss(),
            }
        };
        if t < 0.0 {
            return Hit::miss();
        }

        let tangent_x = Vec3::new(1.0, 2.0 * (ox + d.x * t), 0.0);
        let tangent_z = Vec3::new(0.0, 2.0 * (oz + d.z * t), 1.0);
        Hit::new(t, tangent_x.cross(tangent_z).normalized())
    }
}

/// Infinite plane through `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Signed ray parameter of the plane crossing, `NO_HIT` when the ray runs parallel.
    fn crossing(&self, ray: &Ray) -> f32 {
        let div: f32 = ray.direction.dot(self.normal);
        if div.abs() < EPSILON {
            return NO_HIT;
        }
        let t = (self.origin - ray.origin).dot(self.normal) / div;
        if t.is_finite() {
            t
        } else {
            NO_HIT
        }
    }
}

impl Hittable for Plane {
    fn ray_test(&self, ray: &Ray) -> Hit {
        let t = self.crossing(ray);
        if t < 0.0 {
            return Hit::miss();
        }
        Hit::new(t, self.normal)
    }
}

/// Plane bounded to a circle of `radius` around `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub origin: Vec3,
    pub normal: Vec3,
    pub radius: f32,
}

impl Hittable for Disc {
    fn ray_test(&self, ray: &Ray) -> Hit {
        let plane = Plane {
            origin: self.origin,
            normal: self.normal,
        };
        let t = plane.crossing(ray);
        if t < 0.0 {
            return Hit::miss();
        }
        let target = ray.at(t) - self.origin;
        if target.mag_sq() <= self.radius * self.radius {
            Hit::new(t, self.normal)
        } else {
            Hit::miss()
        }
    }
}
