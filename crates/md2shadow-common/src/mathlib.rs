// mathlib.rs — vector, plane and rotation helpers

// ============================================================
// Basic types
// ============================================================

pub type Vec3 = [f32; 3];

pub const VEC3_ORIGIN: Vec3 = [0.0, 0.0, 0.0];

#[inline]
pub fn deg2rad(a: f32) -> f32 {
    a * (std::f32::consts::PI / 180.0)
}

// ============================================================
// Vector operations
// ============================================================

#[inline]
pub fn dot_product(a: &Vec3, b: &Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn vector_subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn vector_add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// veca + scale * vecb
#[inline]
pub fn vector_ma(veca: &Vec3, scale: f32, vecb: &Vec3) -> Vec3 {
    [
        veca[0] + scale * vecb[0],
        veca[1] + scale * vecb[1],
        veca[2] + scale * vecb[2],
    ]
}

pub fn vector_scale(v: &Vec3, scale: f32) -> Vec3 {
    [v[0] * scale, v[1] * scale, v[2] * scale]
}

pub fn vector_length(v: &Vec3) -> f32 {
    dot_product(v, v).sqrt()
}

/// Normalize in place, returns original length. A zero vector is left as is.
pub fn vector_normalize(v: &mut Vec3) -> f32 {
    let length = vector_length(v);
    if length != 0.0 {
        let ilength = 1.0 / length;
        v[0] *= ilength;
        v[1] *= ilength;
        v[2] *= ilength;
    }
    length
}

pub fn cross_product(v1: &Vec3, v2: &Vec3) -> Vec3 {
    [
        v1[1] * v2[2] - v1[2] * v2[1],
        v1[2] * v2[0] - v1[0] * v2[2],
        v1[0] * v2[1] - v1[1] * v2[0],
    ]
}

// ============================================================
// Planes
// ============================================================

/// Plane in `normal . p + d = 0` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane through three points. The normal is `(v3 - v1) x (v2 - v1)`;
    /// it is only normalized when `normalize` is set.
    pub fn from_points(v1: &Vec3, v2: &Vec3, v3: &Vec3, normalize: bool) -> Self {
        let d1 = vector_subtract(v2, v1);
        let d2 = vector_subtract(v3, v1);

        let mut normal = cross_product(&d2, &d1);
        if normalize {
            vector_normalize(&mut normal);
        }

        Self {
            normal,
            d: -dot_product(&normal, v1),
        }
    }

    /// Signed half-space value of `p`. Only the sign is meaningful for an
    /// unnormalized plane.
    #[inline]
    pub fn side(&self, p: &Vec3) -> f32 {
        dot_product(&self.normal, p) + self.d
    }
}

// ============================================================
// Model transforms
// ============================================================

/// Rotate `v` about the local origin by Euler angles in degrees, X first,
/// then Y, then Z.
pub fn rotate_xyz(v: &Vec3, angles: &Vec3) -> Vec3 {
    let mut out = *v;

    let (s, c) = deg2rad(angles[0]).sin_cos();
    let tmp = out;
    out[2] = tmp[2] * c + tmp[1] * s;
    out[1] = tmp[1] * c - tmp[2] * s;

    let (s, c) = deg2rad(angles[1]).sin_cos();
    let tmp = out;
    out[0] = tmp[0] * c + tmp[2] * s;
    out[2] = tmp[2] * c - tmp[0] * s;

    let (s, c) = deg2rad(angles[2]).sin_cos();
    let tmp = out;
    out[0] = tmp[0] * c + tmp[1] * s;
    out[1] = tmp[1] * c - tmp[0] * s;

    out
}

/// Rotate (XYZ order) then translate to `origin`.
pub fn transform_vertex(v: &Vec3, origin: &Vec3, angles: &Vec3) -> Vec3 {
    vector_add(&rotate_xyz(v, angles), origin)
}
