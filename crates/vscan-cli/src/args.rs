use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vscan_session::RerunPolicy;

#[derive(Parser, Debug)]
#[command(name = "vscan")]
#[command(author, version, about = "Upload videos for suspicious-object screening")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Videos to upload, in processing order
    pub videos: Vec<PathBuf>,

    /// Subtitle (.srt) for the video given at the same position
    #[arg(long = "srt", value_name = "FILE")]
    pub subtitles: Vec<PathBuf>,

    /// Analysis service origin
    #[arg(long, env = "VSCAN_SERVER_URL")]
    pub server: Option<String>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// skip-completed or reattempt-all
    #[arg(long, env = "VSCAN_RERUN_POLICY")]
    pub rerun_policy: Option<RerunPolicy>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the analysis service answers
    Health {
        #[arg(long, env = "VSCAN_SERVER_URL")]
        server: Option<String>,
    },

    /// Fetch and summarize a stored analysis document
    Result {
        /// Document name on the server, e.g. flight_result.json
        name: String,

        #[arg(long, env = "VSCAN_SERVER_URL")]
        server: Option<String>,

        /// Print the aggregated events as JSON
        #[arg(long)]
        json: bool,
    },
}
