use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

const FRAME_PLACEHOLDER: &str = "{frame}";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(about = "Multithreaded analytic ray tracer for an animated robot arm")]
pub struct CliArguments {
    #[clap(short = 'W', long, default_value = "512")]
    pub width: usize,

    #[clap(short = 'H', long, default_value = "512")]
    pub height: usize,

    /// Value of the frame counter for the first rendered frame
    #[clap(short = 'f', long, default_value = "0")]
    pub start_frame: u64,

    /// Number of consecutive frames to render
    #[clap(short = 'n', long, default_value = "1")]
    pub frames: u64,

    /// Output image, `{frame}` is replaced by the frame number
    #[clap(short = 'o', long, default_value = "render.png")]
    pub output: String,

    #[clap(short = 't', long, default_value = "16")]
    pub tile_size: usize,

    /// Save the partially rendered frame while it is in progress
    #[clap(long, action)]
    pub incremental: bool,

    #[clap(long)]
    pub threads: Option<usize>,

    #[clap(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl CliArguments {
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or(
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
        )
    }

    pub fn frame_output_path(&self, frame: u64) -> PathBuf {
        frame_output_path(&self.output, frame, self.frames > 1)
    }
}

/// Output path for one frame.
///
/// `{frame}` in the template becomes the zero padded frame number. Without
/// the placeholder, an animation gets `_NNNNN` before the extension and a
/// single frame keeps the template as is.
pub fn frame_output_path(template: &str, frame: u64, animated: bool) -> PathBuf {
    let number = format!("{frame:05}");
    if template.contains(FRAME_PLACEHOLDER) {
        return PathBuf::from(template.replace(FRAME_PLACEHOLDER, &number));
    }
    if !animated {
        return PathBuf::from(template);
    }

    let path = Path::new(template);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{number}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{number}"),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArguments::parse_from(["armtracer"]);
        assert_eq!(args.width, 512);
        assert_eq!(args.height, 512);
        assert_eq!(args.start_frame, 0);
        assert_eq!(args.frames, 1);
        assert_eq!(args.tile_size, 16);
        assert!(!args.incremental);
        assert!(args.thread_count() >= 1);
        assert_eq!(args.frame_output_path(0), PathBuf::from("render.png"));
    }

    #[test]
    fn parses_flags() {
        let args = CliArguments::parse_from([
            "armtracer",
            "-W",
            "320",
            "-H",
            "200",
            "--frames",
            "3",
            "-f",
            "60",
            "--threads",
            "2",
            "--log-level",
            "debug",
            "-o",
            "out/arm.png",
        ]);
        assert_eq!((args.width, args.height), (320, 200));
        assert_eq!(args.thread_count(), 2);
        assert!(matches!(args.log_level, LogLevel::Debug));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
        assert_eq!(args.frame_output_path(61), PathBuf::from("out/arm_00061.png"));
    }

    #[test]
    fn placeholder_is_replaced() {
        assert_eq!(
            frame_output_path("frames/{frame}.png", 7, false),
            PathBuf::from("frames/00007.png")
        );
        assert_eq!(
            frame_output_path("shot-{frame}.png", 123456, true),
            PathBuf::from("shot-123456.png")
        );
    }

    #[test]
    fn animation_without_placeholder_or_extension() {
        assert_eq!(frame_output_path("render", 2, true), PathBuf::from("render_00002"));
        assert_eq!(frame_output_path("render", 2, false), PathBuf::from("render"));
    }
}
