//! Video output: raw grayscale frames piped into an ffmpeg child process.

use anyhow::{bail, Context, Result};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use silichonk_core::Cell;
use silichonk_world::Grid;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ChildStdin;
use std::thread::JoinHandle;
use tracing::{info, warn};

/// Playback rate of the encoded movie
pub const VIDEO_FPS: u32 = 30;

/// One byte per cell, row-major, using each state's display intensity
pub fn frame_bytes(grid: &Grid) -> Vec<u8> {
    grid.rows()
        .flat_map(|row| row.iter().copied().map(Cell::intensity))
        .collect()
}

/// ffmpeg invocation reading `size x size` gray frames from stdin and
/// writing H.264 to `path`.
///
/// Cells are scaled up 2x with nearest-neighbor sampling so the output
/// dimensions are always even, which yuv420p requires.
pub fn encoder_command(path: &Path, size: usize, fps: u32) -> FfmpegCommand {
    let dims = format!("{size}x{size}");
    let mut command = FfmpegCommand::new();
    command
        .hide_banner()
        .args(["-f", "rawvideo", "-pix_fmt", "gray", "-s", dims.as_str()])
        .args(["-r", fps.to_string().as_str()])
        .input("-")
        .args(["-vf", "scale=iw*2:ih*2:flags=neighbor"])
        .codec_video("libx264")
        .args(["-pix_fmt", "yuv420p"])
        .overwrite()
        .arg(path);
    command
}

pub struct VideoEncoder {
    path: PathBuf,
    size: usize,
    frames: u64,
    child: FfmpegChild,
    stdin: Option<ChildStdin>,
    errors: Option<JoinHandle<usize>>,
}

impl VideoEncoder {
    pub fn spawn(path: &Path, size: usize) -> Result<Self> {
        let mut child = encoder_command(path, size, VIDEO_FPS)
            .spawn()
            .context("Failed to start ffmpeg (is it installed and on PATH?)")?;
        let stdin = child.take_stdin().context("ffmpeg stdin is not piped")?;

        // stderr events are handed over one at a time, so they must be
        // drained while frames are written
        let events = child.iter().context("Failed to read ffmpeg output")?;
        let errors = std::thread::spawn(move || {
            let mut count = 0;
            for message in events.filter_errors() {
                warn!(error = %message, "ffmpeg reported an error");
                count += 1;
            }
            count
        });

        info!(path = %path.display(), size, fps = VIDEO_FPS, "Recording video");

        Ok(Self {
            path: path.to_path_buf(),
            size,
            frames: 0,
            child,
            stdin: Some(stdin),
            errors: Some(errors),
        })
    }

    pub fn write_frame(&mut self, grid: &Grid) -> Result<()> {
        if grid.size() != self.size {
            bail!(
                "frame is {}x{}, video is {}x{}",
                grid.size(),
                grid.size(),
                self.size,
                self.size
            );
        }
        let stdin = self
            .stdin
            .as_mut()
            .context("Video encoder already finished")?;
        stdin
            .write_all(&frame_bytes(grid))
            .context("Failed to send frame to ffmpeg")?;
        self.frames += 1;
        Ok(())
    }

    /// Close the input stream and wait for ffmpeg to finish the file
    pub fn finish(mut self) -> Result<u64> {
        drop(self.stdin.take());

        let error_count = match self.errors.take() {
            Some(handle) => handle.join().unwrap_or(0),
            None => 0,
        };
        let status = self.child.wait().context("Failed to wait for ffmpeg")?;
        if !status.success() {
            bail!(
                "ffmpeg exited with {} after {} errors",
                status,
                error_count
            );
        }

        info!(path = %self.path.display(), frames = self.frames, "Video written");
        Ok(self.frames)
    }
}
