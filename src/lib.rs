//! FrameKit - Task-dispatching toolkit over ffmpeg
//!
//! Maps a closed set of video and image tasks onto ffmpeg invocations:
//! validates the input, prepares a workspace, runs the command(s) and
//! collects the produced files.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod task;
pub mod validate;
pub mod workspace;
pub mod playlist;
pub mod media;
pub mod error;
