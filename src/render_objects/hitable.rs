use ultraviolet::Vec3;

use crate::{constants::NO_HIT, primatives::Ray};

pub trait Hittable {
    fn ray_test(&self, ray: &Ray) -> Hit;
}

/// Ray parameter and surface normal of an intersection.
///
/// `t < 0` means no intersection. NaN is also treated as a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub normal: Vec3,
}

impl Hit {
    pub fn new(t: f32, normal: Vec3) -> Self {
        Hit { t, normal }
    }

    pub fn miss() -> Self {
        Hit {
            t: NO_HIT,
            normal: Vec3::zero(),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.t >= 0.0
    }

    pub fn map_normal(self, f: impl FnOnce(Vec3) -> Vec3) -> Self {
        if self.is_hit() {
            Hit::new(self.t, f(self.normal))
        } else {
            self
        }
    }
}

impl Default for Hit {
    fn default() -> Self {
        Hit::miss()
    }
}

/// Keeps the nearer of two candidate hits. Exact ties go to `first`.
pub fn merge(first: Hit, second: Hit) -> Hit {
    match (first.is_hit(), second.is_hit()) {
        (false, false) => Hit::miss(),
        (true, false) => first,
        (false, true) => second,
        (true, true) => {
            if second.t < first.t {
                second
            } else {
                first
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n1() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.0)
    }

    fn n2() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    #[test]
    fn both_missing() {
        let merged = merge(Hit::new(-1.0, n1()), Hit::new(-1.0, n2()));
        assert_eq!(merged.t, -1.0);
        assert!(!merged.is_hit());
    }

    #[test]
    fn one_missing() {
        assert_eq!(merge(Hit::new(2.0, n1()), Hit::new(-1.0, n2())), Hit::new(2.0, n1()));
        assert_eq!(merge(Hit::new(-1.0, n1()), Hit::new(2.0, n2())), Hit::new(2.0, n2()));
    }

    #[test]
    fn nearer_wins() {
        assert_eq!(merge(Hit::new(3.0, n1()), Hit::new(1.0, n2())), Hit::new(1.0, n2()));
        assert_eq!(merge(Hit::new(1.0, n1()), Hit::new(3.0, n2())), Hit::new(1.0, n1()));
    }

    #[test]
    fn tie_keeps_first() {
        assert_eq!(merge(Hit::new(1.5, n1()), Hit::new(1.5, n2())), Hit::new(1.5, n1()));
    }

    #[test]
    fn zero_distance_counts_as_hit() {
        assert_eq!(merge(Hit::new(0.0, n1()), Hit::miss()), Hit::new(0.0, n1()));
    }

    #[test]
    fn nan_never_wins() {
        let nan = Hit::new(f32::NAN, n2());
        assert_eq!(merge(Hit::new(4.0, n1()), nan), Hit::new(4.0, n1()));
        assert_eq!(merge(nan, Hit::new(4.0, n1())), Hit::new(4.0, n1()));
        assert!(!merge(nan, Hit::miss()).is_hit());
    }

    #[test]
    fn fold_is_order_independent_without_ties() {
        let hits = [
            Hit::new(5.0, n1()),
            Hit::miss(),
            Hit::new(0.5, n2()),
            Hit::new(2.0, n1()),
        ];
        let forward = hits.iter().copied().fold(Hit::miss(), merge);
        let backward = hits.iter().rev().copied().fold(Hit::miss(), merge);
        assert_eq!(forward, Hit::new(0.5, n2()));
        assert_eq!(forward, backward);
    }

    #[test]
    fn map_normal_skips_misses() {
        let flipped = Hit::new(1.0, n1()).map_normal(|n| -n);
        assert_eq!(flipped.normal, -n1());
        assert_eq!(Hit::miss().map_normal(|_| n2()), Hit::miss());
    }
}
