//! Direct lighting with a single hard-shadowed point light.

use ultraviolet::{Vec3, Vec4};

use crate::{
    constants::{AMBIENT, LIGHT_INTENSITY, SHADOW_BIAS, SHININESS},
    primatives::Ray,
    render_objects::{Hit, Hittable},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
}

impl Light {
    /// The key light circling above the figure.
    pub fn orbiting(time: f32) -> Self {
        Light {
            position: Vec3::new(time.cos() * 5.0, 7.0, time.sin() * 5.0),
        }
    }
}

fn diffuse_tint() -> Vec3 {
    Vec3::new(0.0, 1.0, 1.0)
}

/// Flips `normal` so it faces back along `direction`.
pub fn face_forward(normal: Vec3, direction: Vec3) -> Vec3 {
    if normal.dot(direction) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Shades a primary ray hit. Misses come back fully transparent.
///
/// `scene` is traced once more for the shadow ray.
pub fn glow(scene: &impl Hittable, ray: &Ray, hit: Hit, light: &Light) -> Vec4 {
    if !hit.is_hit() {
        return Vec4::new(0.0, 0.0, 0.0, 0.0);
    }
    let normal = hit.normal;
    let hit_pos = ray.at(hit.t);
    let to_light = light.position - hit_pos;
    let dist_to_light = to_light.mag();
    let to_light = to_light / dist_to_light;

    let cos_theta = to_light.dot(normal).max(0.0);
    let halfway = (-ray.direction + to_light + Vec3::new(0.0, 0.0, 0.5)).normalized();
    let cos_delta = normal.dot(halfway).max(0.0);

    let shadow_ray = Ray::new(hit_pos + normal * SHADOW_BIAS, to_light);
    let light_intensity = if scene.ray_test(&shadow_ray).is_hit() {
        0.0
    } else {
        LIGHT_INTENSITY
    };

    // Ambient rides on the attenuated diffuse vector, it is not a separate term.
    let diffuse = diffuse_tint() * (cos_theta / (dist_to_light * dist_to_light)) * light_intensity
        + Vec3::broadcast(AMBIENT);
    let specular = Vec3::one() * (cos_delta.powf(SHININESS) * light_intensity);

    let rgb = diffuse + specular;
    Vec4::new(rgb.x, rgb.y, rgb.z, 1.0)
}
