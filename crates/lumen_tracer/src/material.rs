//! Surface and medium scattering.

use crate::hit::HitEvent;
use crate::texture::Texture;
use lumen_math::{Pcg32, Ray, Vec3, MIN_VECTOR_LENGTH_SQUARED};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// How light interacts with a surface or a participating medium.
///
/// Every albedo is a [`Texture`], so each scattering kind comes in solid,
/// image and noise flavours.
#[derive(Clone, Debug)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Texture },
    /// Mirror with optional roughness (0.0 = perfect mirror, 1.0 = very rough).
    Metal { albedo: Texture, fuzz: f32 },
    /// Clear refractive material (1.0 = air, 1.5 = glass, 2.4 = diamond).
    Dielectric { refraction_index: f32 },
    /// Light source. Terminates paths.
    Emissive { color: Color },
    /// Phase function of a fog volume: scatters uniformly in all directions.
    Isotropic { albedo: Texture },
}

/// Outcome of a scatter query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scatter {
    /// The path continues along `ray`, with throughput scaled by `attenuation`.
    Bounce {
        emitted: Color,
        attenuation: Color,
        ray: Ray,
    },
    /// The path ends here.
    Absorb { emitted: Color },
}

impl Material {
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    pub fn metal(albedo: impl Into<Texture>, fuzz: f32) -> Self {
        let clamped = fuzz.clamp(0.0, 1.0);
        if clamped != fuzz {
            log::warn!("Metal fuzz {fuzz} outside [0, 1], clamped to {clamped}");
        }
        Material::Metal {
            albedo: albedo.into(),
            fuzz: clamped,
        }
    }

    pub fn dielectric(refraction_index: f32) -> Self {
        if !(refraction_index > 0.0) {
            log::warn!("Dielectric with non-positive refraction index {refraction_index}");
        }
        Material::Dielectric { refraction_index }
    }

    pub fn emissive(color: Color) -> Self {
        Material::Emissive { color }
    }

    pub fn isotropic(albedo: impl Into<Texture>) -> Self {
        Material::Isotropic {
            albedo: albedo.into(),
        }
    }

    /// Light emitted at a hit. Black for everything but emitters.
    pub fn emitted(&self) -> Color {
        match self {
            Material::Emissive { color } => *color,
            _ => Color::ZERO,
        }
    }

    /// Scatter `ray_in` at `hit`.
    pub fn scatter(&self, ray_in: &Ray, hit: &HitEvent, rng: &mut Pcg32) -> Scatter {
        match self {
            Material::Lambertian { albedo } => {
                let direction = loop {
                    let d = hit.normal + rng.unit_vector_3d();
                    let len_sq = d.length_squared();
                    if len_sq > MIN_VECTOR_LENGTH_SQUARED {
                        break d / len_sq.sqrt();
                    }
                };
                bounce(albedo.value(hit.uv, hit.point), Ray::new(hit.point, direction))
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction.normalize(), hit.normal) + *fuzz * rng.unit_vector_3d();

                // Perturbed into the surface
                if reflected.dot(hit.normal) < 0.0 || reflected.length_squared() <= MIN_VECTOR_LENGTH_SQUARED {
                    return Scatter::Absorb {
                        emitted: Color::ZERO,
                    };
                }
                bounce(albedo.value(hit.uv, hit.point), Ray::new(hit.point, reflected.normalize()))
            }
            Material::Dielectric { refraction_index } => {
                let eta_ratio = if hit.is_front_face() {
                    1.0 / refraction_index
                } else {
                    *refraction_index
                };
                let direction =
                    refract_or_reflect(ray_in.direction.normalize(), hit.normal, eta_ratio, rng.next_f32());
                bounce(Color::ONE, Ray::new(hit.point, direction))
            }
            Material::Emissive { color } => Scatter::Absorb { emitted: *color },
            Material::Isotropic { albedo } => {
                bounce(albedo.value(hit.uv, hit.point), Ray::new(hit.point, rng.unit_vector_3d()))
            }
        }
    }
}

#[inline]
fn bounce(attenuation: Color, ray: Ray) -> Scatter {
    Scatter::Bounce {
        emitted: Color::ZERO,
        attenuation,
        ray,
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Schlick's approximation for reflectance.
///
/// `cosine` is the cosine of the angle between the incoming ray and the
/// normal it arrives against, in [0, 1].
#[inline]
pub fn reflectance(cosine: f32, eta_ratio: f32) -> f32 {
    let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Refract unit vector `v` through a surface with normal `n` facing against
/// it, or reflect on total internal reflection or when `reflectance_random`
/// falls under the Fresnel reflectance.
///
/// A random value of 0 always reflects; a value of 1 or more never chooses
/// reflection by chance.
pub fn refract_or_reflect(v: Vec3, n: Vec3, eta_ratio: f32, reflectance_random: f32) -> Vec3 {
    let cos_theta = v.dot(n).max(-1.0);
    let r_out_perp = eta_ratio * (v - cos_theta * n);
    let perp_len_sq = r_out_perp.length_squared();

    let cannot_refract = perp_len_sq > 1.0;
    let reflects_by_chance = reflectance_random <= 0.0
        || (reflectance_random < 1.0 && reflectance((-cos_theta).min(1.0), eta_ratio) > reflectance_random);

    if cannot_refract || reflects_by_chance {
        reflect(v, n)
    } else {
        r_out_perp - (1.0 - perp_len_sq).sqrt() * n
    }
}
