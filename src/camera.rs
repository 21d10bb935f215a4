use ultraviolet::{Vec2, Vec3};

use crate::{constants::FIELD_OF_VIEW, primatives::Ray};

/// Fixed pinhole camera looking down -z.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub origin: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            origin: Vec3::new(0.0, 2.0, 5.0),
            fov: FIELD_OF_VIEW,
        }
    }
}

impl Camera {
    /// Ray through a viewport coordinate in [0,1]², with (0,0) at the bottom left.
    pub fn primary_ray(&self, tex_coord: Vec2) -> Ray {
        let direction = Vec3::new(
            tex_coord.x * 2.0 - 1.0,
            tex_coord.y * 2.0 - 1.0,
            -(self.fov / 2.0).tan(),
        );
        Ray::new(self.origin, direction.normalized())
    }

    /// Viewport coordinate of a pixel centre. Image rows grow downward, the viewport grows upward.
    pub fn tex_coord(x: usize, y: usize, width: usize, height: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / width as f32,
            1.0 - (y as f32 + 0.5) / height as f32,
        )
    }
}
