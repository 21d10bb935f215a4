use std::ops::Range;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use image::{ImageBuffer, RgbaImage};
use log::{debug, trace};
use ultraviolet::Vec4;

use crate::{
    camera::Camera,
    error::RenderError,
    render_objects::{Figure, Hittable},
    shading::{face_forward, glow, Light},
};

const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub tile_size: usize,
    pub threads: usize,
}

impl RenderSettings {
    pub fn new(
        width: usize,
        height: usize,
        tile_size: usize,
        threads: usize,
    ) -> Result<Self, RenderError> {
        for (name, value) in [
            ("width", width),
            ("height", height),
            ("tile size", tile_size),
            ("thread count", threads),
        ] {
            if value == 0 {
                return Err(RenderError::InvalidSettings(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(Self {
            width,
            height,
            tile_size,
            threads,
        })
    }
}

/// Colour of one pixel: primary ray, closest hit, then shading.
pub fn shade_pixel(
    figure: &Figure,
    camera: &Camera,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    time: f32,
) -> Vec4 {
    let ray = camera.primary_ray(Camera::tex_coord(x, y, width, height));
    let pose = figure.pose(time);
    let mut hit = pose.ray_test(&ray);
    hit.normal = face_forward(hit.normal, ray.direction);
    glow(&pose, &ray, hit, &Light::orbiting(time))
}

fn to_rgba8(col: Vec4) -> [u8; CHANNELS] {
    [col.x, col.y, col.z, col.w].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

struct RenderTile {
    pixel_x: usize,
    pixel_y: usize,
    pixel_width: usize,
    pixel_height: usize,
}

impl RenderTile {
    fn x_range(&self) -> Range<usize> {
        self.pixel_x..self.pixel_x + self.pixel_width
    }
    fn y_range(&self) -> Range<usize> {
        self.pixel_y..self.pixel_y + self.pixel_height
    }
}

/// Shared frame buffer handed out to workers one tile at a time.
#[derive(Clone)]
pub struct RenderImage {
    width: usize,
    height: usize,
    tile_size: usize,
    tile_count_x: usize,
    tile_count_y: usize,
    buffer: Arc<Mutex<RgbaImage>>,
    next_tile: Arc<AtomicUsize>,
    finished_tiles: Arc<AtomicUsize>,
}

impl RenderImage {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            tile_size: settings.tile_size,
            tile_count_x: settings.width.div_ceil(settings.tile_size),
            tile_count_y: settings.height.div_ceil(settings.tile_size),
            next_tile: Arc::new(AtomicUsize::new(0)),
            finished_tiles: Arc::new(AtomicUsize::new(0)),
            buffer: Arc::new(Mutex::new(ImageBuffer::new(
                settings.width as u32,
                settings.height as u32,
            ))),
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count_x * self.tile_count_y
    }

    pub fn finished_tiles(&self) -> usize {
        self.finished_tiles.load(Ordering::Relaxed)
    }

    fn get_tile(&self) -> Option<RenderTile> {
        let index = self.next_tile.fetch_add(1, Ordering::Relaxed);
        if index >= self.tile_count() {
            return None;
        }

        let tile_x = index.rem_euclid(self.tile_count_x);
        let tile_y = index.div_euclid(self.tile_count_x);

        let pixel_x = tile_x * self.tile_size;
        let pixel_y = tile_y * self.tile_size;
        let tile_width = (pixel_x + self.tile_size).min(self.width) - pixel_x;
        let tile_height = (pixel_y + self.tile_size).min(self.height) - pixel_y;

        Some(RenderTile {
            pixel_x,
            pixel_y,
            pixel_width: tile_width,
            pixel_height: tile_height,
        })
    }

    fn write_tile(&self, tile: &RenderTile, data: &[u8]) -> Result<(), RenderError> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| RenderError::ThreadPanicked)?;
        let mut flat = buffer.as_flat_samples_mut();
        let slice = flat.as_mut_slice();
        for (source_y, target_y) in tile.y_range().enumerate() {
            let target_start = CHANNELS * (target_y * self.width + tile.pixel_x);
            let target_end = target_start + CHANNELS * tile.pixel_width;

            let source_start = CHANNELS * source_y * tile.pixel_width;
            let source_end = source_start + CHANNELS * tile.pixel_width;

            slice[target_start..target_end].copy_from_slice(&data[source_start..source_end]);
        }
        self.finished_tiles.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<RgbaImage, RenderError> {
        let buffer = self
            .buffer
            .lock()
            .map_err(|_| RenderError::ThreadPanicked)?;
        Ok(buffer.clone())
    }

    pub fn save(&self, output_path: &Path) -> Result<(), RenderError> {
        self.snapshot()?
            .save(output_path)
            .map_err(|source| RenderError::Save {
                path: output_path.to_path_buf(),
                source,
            })
    }
}

/// Everything a worker needs to shade one frame.
#[derive(Clone)]
pub struct FrameJob {
    pub figure: Arc<Figure>,
    pub camera: Camera,
    pub time: f32,
}

pub fn spawn_render_thread(
    id: usize,
    render_image: RenderImage,
    job: FrameJob,
    exit_flag: Arc<AtomicBool>,
) -> thread::JoinHandle<Result<(), RenderError>> {
    thread::spawn(move || {
        let mut tile_buffer: Vec<u8> =
            vec![0; CHANNELS * render_image.tile_size * render_image.tile_size];
        let mut tiles = 0usize;
        while let Some(render_tile) = render_image.get_tile() {
            let mut tile_pixel_index: usize = 0;

            for y in render_tile.y_range() {
                if exit_flag.load(Ordering::Relaxed) {
                    debug!("worker {id} stopping after {tiles} tiles");
                    return Err(RenderError::Interrupted);
                }
                for x in render_tile.x_range() {
                    let col = shade_pixel(
                        &job.figure,
                        &job.camera,
                        x,
                        y,
                        render_image.width,
                        render_image.height,
                        job.time,
                    );
                    tile_buffer[tile_pixel_index..tile_pixel_index + CHANNELS]
                        .copy_from_slice(&to_rgba8(col));
                    tile_pixel_index += CHANNELS;
                }
            }
            render_image.write_tile(&render_tile, &tile_buffer)?;
            tiles += 1;
            trace!(
                "worker {id} finished tile at ({}, {})",
                render_tile.pixel_x,
                render_tile.pixel_y
            );
        }
        debug!("worker {id} done, {tiles} tiles");
        Ok(())
    })
}

/// A frame being rendered by a pool of workers.
pub struct FrameRender {
    image: RenderImage,
    threads: Vec<thread::JoinHandle<Result<(), RenderError>>>,
}

impl FrameRender {
    pub fn start(settings: &RenderSettings, job: FrameJob, exit_flag: Arc<AtomicBool>) -> Self {
        let image = RenderImage::new(settings);
        let threads = (0..settings.threads)
            .map(|id| spawn_render_thread(id, image.clone(), job.clone(), exit_flag.clone()))
            .collect::<Vec<_>>();
        FrameRender { image, threads }
    }

    pub fn image(&self) -> &RenderImage {
        &self.image
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|thread| thread.is_finished())
    }

    /// Waits for every worker. The first worker error wins.
    pub fn finish(self) -> Result<RgbaImage, RenderError> {
        let mut result = Ok(());
        for thread in self.threads {
            let outcome = thread.join().map_err(|_| RenderError::ThreadPanicked)?;
            if result.is_ok() {
                result = outcome;
            }
        }
        result?;
        self.image.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TIME_OFFSET;
    use image::Rgba;

    fn settings(width: usize, height: usize, tile_size: usize, threads: usize) -> RenderSettings {
        RenderSettings::new(width, height, tile_size, threads).unwrap()
    }

    fn job() -> FrameJob {
        FrameJob {
            figure: Arc::new(Figure::robot_arm()),
            camera: Camera::default(),
            time: TIME_OFFSET,
        }
    }

    #[test]
    fn rejects_empty_settings() {
        assert!(RenderSettings::new(0, 10, 4, 1).is_err());
        assert!(RenderSettings::new(10, 10, 0, 1).is_err());
        assert!(RenderSettings::new(10, 10, 4, 0).is_err());
        assert!(RenderSettings::new(10, 10, 4, 1).is_ok());
    }

    #[test]
    fn tiles_cover_ragged_edges() {
        let image = RenderImage::new(&settings(10, 7, 4, 1));
        assert_eq!(image.tile_count(), 6);
        let mut covered = 0;
        while let Some(tile) = image.get_tile() {
            assert!(tile.x_range().end <= 10);
            assert!(tile.y_range().end <= 7);
            covered += tile.pixel_width * tile.pixel_height;
        }
        assert_eq!(covered, 70);
    }

    #[test]
    fn rgba_quantisation_clamps() {
        assert_eq!(to_rgba8(Vec4::new(-1.0, 0.5, 2.0, 1.0)), [0, 128, 255, 255]);
        assert_eq!(to_rgba8(Vec4::new(0.0, 0.0, 0.0, 0.0)), [0, 0, 0, 0]);
    }

    #[test]
    fn background_is_transparent_and_base_is_opaque() {
        let job = job();
        // Top centre looks over the figure into empty sky.
        let sky = shade_pixel(&job.figure, &job.camera, 32, 0, 64, 64, job.time);
        assert_eq!(sky.w, 0.0);
        let base = shade_pixel(&job.figure, &job.camera, 35, 44, 64, 64, job.time);
        assert_eq!(base.w, 1.0);
        assert!(base.y >= base.x);
    }

    #[test]
    fn threaded_render_matches_single_pixels() {
        let settings = settings(24, 16, 5, 3);
        let job = job();
        let render = FrameRender::start(&settings, job.clone(), Arc::new(AtomicBool::new(false)));
        let image = render.finish().unwrap();
        assert_eq!(image.dimensions(), (24, 16));
        assert!(image.pixels().any(|p| p.0[3] == 0));
        assert!(image.pixels().any(|p| p.0[3] == 255));
        for (x, y) in [(0, 0), (12, 8), (13, 12), (23, 15), (7, 14)] {
            let expected = to_rgba8(shade_pixel(&job.figure, &job.camera, x, y, 24, 16, job.time));
            assert_eq!(image.get_pixel(x as u32, y as u32), &Rgba(expected));
        }
    }

    #[test]
    fn interrupted_render_reports_it() {
        let render = FrameRender::start(&settings(8, 8, 4, 2), job(), Arc::new(AtomicBool::new(true)));
        assert!(matches!(render.finish(), Err(RenderError::Interrupted)));
    }
}
