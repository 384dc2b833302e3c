//! Renders a small CSG scene and writes it to `csg_showcase.png`.
//!
//! Shows a carved box, a rounded box drilled through by two cylinders, a
//! glass ball and a fog ball on a checkered floor lit by an area light.

use anyhow::Result;
use lumen_tracer::{
    color_to_rgba, trace_batch, Background, Color, Cuboid, Cylinder, ImageTexture, Material, MaterialRef, Pcg32,
    PerlinNoiseTexture, Quad, Ray, Scene, ShapeArena, Sphere, TraceConfig, Vec3,
};

const WIDTH: u32 = 400;
const HEIGHT: u32 = 225;
const SAMPLES: u32 = 16;

/// Pinhole camera without defocus.
struct Camera {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov_degrees: f32, aspect: f32) -> Self {
        let half_height = (vfov_degrees.to_radians() / 2.0).tan();
        let half_width = aspect * half_height;

        let w = (look_from - look_at).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        Self {
            origin: look_from,
            lower_left: look_from - half_width * u - half_height * v - w,
            horizontal: 2.0 * half_width * u,
            vertical: 2.0 * half_height * v,
        }
    }

    /// Ray through normalized image coordinates, `(0, 0)` at the top left.
    fn ray(&self, s: f32, t: f32) -> Ray {
        let target = self.lower_left + s * self.horizontal + (1.0 - t) * self.vertical;
        Ray::new(self.origin, target - self.origin)
    }
}

fn checker_texture() -> Result<ImageTexture> {
    let image = image::RgbaImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgba([230, 230, 230, 255])
        } else {
            image::Rgba([40, 60, 90, 255])
        }
    });
    Ok(ImageTexture::from_rgba8(&image)?)
}

fn build_scene() -> Result<Scene> {
    let mut rng = Pcg32::new(2024, 0);

    let materials = vec![
        Material::lambertian(checker_texture()?),
        Material::lambertian(PerlinNoiseTexture::new(
            [Color::new(0.9, 0.85, 0.7), Color::new(0.3, 0.2, 0.1)],
            6.0,
            7,
            &mut rng,
        )),
        Material::metal(Color::new(0.8, 0.3, 0.3), 0.2),
        Material::dielectric(1.5),
        Material::isotropic(Color::splat(0.9)),
        Material::emissive(Color::splat(6.0)),
        Material::metal(Color::new(0.9, 0.7, 0.3), 0.05),
        Material::lambertian(Color::new(0.2, 0.4, 0.8)),
    ];

    let mut arena = ShapeArena::new();

    let floor = arena.add(Quad::new(
        Vec3::new(-10.0, 0.0, -10.0),
        Vec3::new(0.0, 0.0, 20.0),
        Vec3::new(20.0, 0.0, 0.0),
        MaterialRef(0),
    ));

    // Box with a spherical bite taken out of its top corner
    let block = arena.add(Cuboid::from_corners(
        Vec3::new(-2.5, 0.0, -0.5),
        Vec3::new(-1.5, 1.0, 0.5),
        MaterialRef(1),
    ));
    let bite = arena.add(Sphere::new(Vec3::new(-2.0, 1.0, 0.0), 0.6, MaterialRef(2)));
    let carved = arena.difference(&[block, bite])?;

    // Rounded box drilled along two axes
    let body = arena.add(Cuboid::from_corners(
        Vec3::new(-0.6, 0.0, -0.6),
        Vec3::new(0.6, 1.2, 0.6),
        MaterialRef(6),
    ));
    let rounding = arena.add(Sphere::new(Vec3::new(0.0, 0.6, 0.0), 0.8, MaterialRef(6)));
    let rounded = arena.intersection(&[body, rounding])?;
    let vertical = arena.add(Cylinder::between(
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(0.0, 1.7, 0.0),
        0.3,
        MaterialRef(7),
    ));
    let horizontal = arena.add(Cylinder::between(
        Vec3::new(-1.0, 0.6, 0.0),
        Vec3::new(1.0, 0.6, 0.0),
        0.3,
        MaterialRef(7),
    ));
    let drills = arena.union(&[vertical, horizontal])?;
    let drilled = arena.difference(&[rounded, drills])?;

    let glass = arena.add(Sphere::new(Vec3::new(2.0, 0.6, 0.0), 0.6, MaterialRef(3)));

    let fog_shape = arena.add(Sphere::new(Vec3::new(1.0, 0.5, -2.0), 0.5, MaterialRef(4)));
    let fog = arena.volume(fog_shape, 2.0)?;

    let light = arena.add(Quad::new(
        Vec3::new(-1.0, 3.0, -1.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        MaterialRef(5),
    ));

    Ok(Scene::new(
        arena,
        vec![floor, carved, drilled, glass, fog, light],
        materials,
    )?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scene = build_scene()?;
    let camera = Camera::new(
        Vec3::new(0.0, 2.5, 6.0),
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::Y,
        40.0,
        WIDTH as f32 / HEIGHT as f32,
    );

    // Jittered samples, grouped per pixel
    let mut jitter = Pcg32::new(7, 0);
    let mut rays = Vec::with_capacity((WIDTH * HEIGHT * SAMPLES) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            for _ in 0..SAMPLES {
                let s = (x as f32 + jitter.next_f32()) / WIDTH as f32;
                let t = (y as f32 + jitter.next_f32()) / HEIGHT as f32;
                rays.push(camera.ray(s, t));
            }
        }
    }

    let config = TraceConfig {
        max_depth: 20,
        background: Background::Sky,
        ..Default::default()
    };
    log::info!("Rendering {}x{} @ {} spp", WIDTH, HEIGHT, SAMPLES);
    let colors = trace_batch(&scene, &rays, &config, 42);

    let image = image::RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let start = ((y * WIDTH + x) * SAMPLES) as usize;
        let sum = colors[start..start + SAMPLES as usize]
            .iter()
            .fold(Color::ZERO, |acc, c| acc + *c);
        image::Rgba(color_to_rgba(sum / SAMPLES as f32))
    });

    let path = "csg_showcase.png";
    image.save(path)?;
    log::info!("Saved {path}");

    Ok(())
}
