use clap::Parser;
use crossterm::{cursor, terminal, ExecutableCommand, QueueableCommand};
use image::RgbaImage;
use log::{error, info, warn};
use std::io::{stdout, Stdout, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod camera;
mod cli;
mod constants;
mod error;
mod frame;
mod logger;
mod primatives;
mod quaternion;
mod render;
mod render_objects;
mod shading;

use camera::Camera;
use cli::CliArguments;
use error::RenderError;
use frame::FrameClock;
use render::{FrameJob, FrameRender, RenderSettings};
use render_objects::Figure;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

fn draw_progress(
    stdout: &mut Stdout,
    completed_tiles: usize,
    total_tiles: usize,
    elapsed: f32,
) -> Result<(), RenderError> {
    let total = (elapsed / completed_tiles.max(1) as f32) * total_tiles as f32;

    let term_width = terminal::size().map(|(w, _)| w).unwrap_or(32) as usize;
    let msg_time = format!("{completed_tiles}/{total_tiles} Tiles in {elapsed:0.2}s / {total:0.2}s");
    let progress_width = term_width.saturating_sub(msg_time.len() + 3).max(8);
    let render_progress =
        (progress_width as f32 * completed_tiles as f32 / total_tiles as f32).ceil() as usize;

    let msg_progress = (0..progress_width)
        .map(|i| if i < render_progress { '#' } else { ' ' })
        .collect::<String>();

    stdout.queue(cursor::SavePosition)?;
    stdout.write_all(format!("{msg_time} [{msg_progress}]").as_bytes())?;
    stdout.queue(cursor::RestorePosition)?;
    stdout.flush()?;

    stdout.queue(cursor::RestorePosition)?;
    stdout.queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;
    Ok(())
}

fn save_image(image: &RgbaImage, output_path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save(output_path).map_err(|source| RenderError::Save {
        path: output_path.to_path_buf(),
        source,
    })
}

fn render_animation(args: &CliArguments, exit_flag: Arc<AtomicBool>) -> Result<(), RenderError> {
    let settings = RenderSettings::new(args.width, args.height, args.tile_size, args.thread_count())?;
    if args.frames == 0 {
        return Err(RenderError::InvalidSettings(
            "frame count must be at least 1".to_string(),
        ));
    }

    let figure = Arc::new(Figure::robot_arm());
    let camera = Camera::default();
    let mut clock = FrameClock::new(args.start_frame);

    info!("Starting render");
    info!("\tImage size: {}x{}", settings.width, settings.height);
    info!("\tFrames:     {} from frame {}", args.frames, args.start_frame);
    info!("\tThreads:    {}", settings.threads);

    let mut stdout = stdout();
    stdout.execute(cursor::Hide)?;

    for _ in 0..args.frames {
        let output_path = args.frame_output_path(clock.frame());
        let start_time = Instant::now();
        let job = FrameJob {
            figure: figure.clone(),
            camera,
            time: clock.time(),
        };
        let render = FrameRender::start(&settings, job, exit_flag.clone());
        let total_tiles = render.image().tile_count();

        let mut counter: usize = 0;
        while !render.is_finished() {
            let completed_tiles = render.image().finished_tiles();
            let elapsed = start_time.elapsed().as_secs_f32();
            draw_progress(&mut stdout, completed_tiles, total_tiles, elapsed)?;

            if args.incremental && counter.rem_euclid(8) == 0 {
                if let Err(e) = render.image().save(&output_path) {
                    warn!("incremental save failed: {e}");
                }
            }
            counter += 1;
            std::thread::sleep(PROGRESS_INTERVAL);
        }

        let image = render.finish()?;
        save_image(&image, &output_path)?;
        info!(
            "Frame {} (t = {:0.3}) rendered in {:0.2}s, saved to \"{}\"",
            clock.frame(),
            clock.time(),
            start_time.elapsed().as_secs_f32(),
            output_path.display()
        );
        clock.advance();
    }

    stdout.execute(cursor::Show)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArguments::parse();
    logger::init_logger(args.log_level.into());

    let exit_flag = Arc::new(AtomicBool::new(false));
    {
        let handler_exit_flag = exit_flag.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = stdout().execute(cursor::Show);
            handler_exit_flag.store(true, Ordering::Relaxed)
        }) {
            error!("{}", RenderError::from(e));
            return ExitCode::FAILURE;
        }
    }

    let result = render_animation(&args, exit_flag);
    let _ = stdout().execute(cursor::Show);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
