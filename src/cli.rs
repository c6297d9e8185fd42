use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single task on an input file
    Run {
        /// Task to perform (see `tasks`)
        #[arg(short, long)]
        task: String,

        /// Zip, image or video to process
        #[arg(short, long)]
        input: PathBuf,

        /// Audio file for add_background_music, trim_to_audio and speed_to_fit
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Frames per second; 0 keeps the original or task default (gif defaults to 12)
        #[arg(long)]
        fps: Option<u32>,

        /// Duration in seconds for trim_to_length, image_to_video and slideshow
        #[arg(short, long)]
        duration: Option<u32>,

        /// Background music volume relative to the original audio
        #[arg(long)]
        volume_ratio: Option<f64>,

        /// Directory to create workspaces in
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Reuse the workspace directory itself, emptying it first
        #[arg(long)]
        shared: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available tasks and the input they expect
    Tasks,

    /// Check that ffmpeg and ffprobe can be run
    Check,

    /// Remove the workspace directory and everything in it.
    ///
    /// Isolated runs each leave a directory under the workspace root; nothing
    /// prunes them except this command.
    Clean {
        /// Directory to remove instead of the configured one
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}
