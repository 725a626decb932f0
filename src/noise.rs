//! Value noise for procedural flow fields.
//!
//! Lattice values come from an integer hash, so the same seed always yields the
//! same field. The third coordinate is usually time, which lets a field evolve
//! smoothly between frames.

/// Hash of an integer lattice point, in [0.0, 1.0)
#[inline]
pub fn lattice_hash(x: i64, y: i64, z: i64, seed: u32) -> f64 {
    let mut h = u64::from(seed).wrapping_add(x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h = h.wrapping_add(y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h = h.wrapping_add(z as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Quintic fade 6t⁵ - 15t⁴ + 10t³, zero slope and curvature at 0 and 1
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// 3D value noise in [0.0, 1.0]
pub fn value_noise_3d(x: f64, y: f64, z: f64, seed: u32) -> f64 {
    let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
    let (ix, iy, iz) = (x0 as i64, y0 as i64, z0 as i64);
    let (tx, ty, tz) = (fade(x - x0), fade(y - y0), fade(z - z0));

    let corner = |dx: i64, dy: i64, dz: i64| lattice_hash(ix + dx, iy + dy, iz + dz, seed);

    let near = lerp(
        lerp(corner(0, 0, 0), corner(1, 0, 0), tx),
        lerp(corner(0, 1, 0), corner(1, 1, 0), tx),
        ty,
    );
    let far = lerp(
        lerp(corner(0, 0, 1), corner(1, 0, 1), tx),
        lerp(corner(0, 1, 1), corner(1, 1, 1), tx),
        ty,
    );
    lerp(near, far, tz)
}

/// Fractional Brownian motion: `octaves` layers of [`value_noise_3d`], each at
/// double the frequency and half the amplitude. Normalised back into [0, 1].
pub fn fbm_3d(x: f64, y: f64, z: f64, octaves: u32, seed: u32) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    let mut total = 0.0;
    for octave in 0..octaves.max(1) {
        value += amplitude
            * value_noise_3d(
                x * frequency,
                y * frequency,
                z * frequency,
                seed.wrapping_add(octave),
            );
        total += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_in_range() {
        assert_eq!(lattice_hash(10, 20, 30, 42), lattice_hash(10, 20, 30, 42));
        assert_ne!(lattice_hash(10, 20, 30, 42), lattice_hash(10, 20, 30, 43));
        for x in -10..10 {
            for y in -10..10 {
                let v = lattice_hash(x, y, 0, 12345);
                assert!((0.0..1.0).contains(&v));
            }
        }
    }

    #[test]
    fn fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn noise_hits_lattice_values() {
        assert_eq!(value_noise_3d(3.0, -2.0, 1.0, 7), lattice_hash(3, -2, 1, 7));
    }

    #[test]
    fn noise_is_continuous() {
        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let a = fbm_3d(x, 0.3, 0.0, 4, 999);
            let b = fbm_3d(x + 0.001, 0.3, 0.0, 4, 999);
            assert!((a - b).abs() < 0.05, "discontinuity at x={}", x);
            assert!((0.0..=1.0).contains(&a));
        }
    }
}
