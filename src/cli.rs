// yapt/src/cli.rs
use crate::core::{Action, RunConfig, ThumbnailSpec};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "yapt", version, about = "Yet another photo tool: rename, touch, optimize and thumbnail image trees")]
#[command(after_help = "Without --run nothing in the source tree is modified.")]
pub struct Cli {
    /// Really apply changes (default is a dry run)
    #[arg(short = 'y', long)]
    pub run: bool,

    /// Scan subfolders
    #[arg(
        short,
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub recursive: bool,

    /// Source directories kept when mirroring into the target
    #[arg(short, long, default_value_t = 1)]
    pub flat: usize,

    /// Worker threads, 0 processes files on the main thread
    #[arg(short = 'x', long, default_value_t = 5)]
    pub threads: usize,

    /// File or root directory to process
    #[arg(short, long)]
    pub source: PathBuf,

    /// Destination folder
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Action to perform
    #[arg(short, long, value_enum, default_value_t = ActionArg::Thumbnails)]
    pub action: ActionArg,

    /// Thumbnail bounding box width
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Thumbnail bounding box height
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// JPEG quality used when re-encoding
    #[arg(short, long, default_value_t = 95)]
    pub quality: u8,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Count,
    List,
    Checknames,
    Rename,
    Touch,
    Optimize,
    Thumbnails,
    Flatcp,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Count => Action::Count,
            ActionArg::List => Action::List,
            ActionArg::Checknames => Action::CheckNames,
            ActionArg::Rename => Action::Rename,
            ActionArg::Touch => Action::Touch,
            ActionArg::Optimize => Action::Optimize,
            ActionArg::Thumbnails => Action::Thumbnails,
            ActionArg::Flatcp => Action::FlatCopy,
        }
    }
}

impl Cli {
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            dry_run: !self.run,
            recursive: self.recursive,
            flat: self.flat,
            threads: self.threads,
            target: self.target.clone(),
            thumbnail: ThumbnailSpec::new(self.width, self.height),
            quality: self.quality,
            show_progress: !self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_are_a_recursive_dry_run_of_thumbnails() {
        let cli = Cli::try_parse_from(["yapt", "-s", "/photos"]).unwrap();
        assert_eq!(cli.action, ActionArg::Thumbnails);

        let config = cli.to_config();
        assert!(config.dry_run);
        assert!(config.recursive);
        assert_eq!(config.flat, 1);
        assert_eq!(config.threads, 5);
        assert_eq!(config.thumbnail, ThumbnailSpec::new(800, 600));
        assert!(config.target.is_none());
    }

    #[test]
    fn short_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "yapt", "-y", "-r", "false", "-f", "2", "-x", "0", "-s", "/photos", "-t", "/out", "-a",
            "rename",
        ])
        .unwrap();
        let config = cli.to_config();
        assert!(!config.dry_run);
        assert!(!config.recursive);
        assert_eq!(config.flat, 2);
        assert_eq!(config.threads, 0);
        assert_eq!(config.target.as_deref(), Some(std::path::Path::new("/out")));
        assert_eq!(Action::from(cli.action), Action::Rename);
    }

    #[test]
    fn recursive_works_as_a_bare_flag() {
        let cli = Cli::try_parse_from(["yapt", "-r", "-s", "/photos"]).unwrap();
        assert!(cli.recursive);
        assert_eq!(cli.source, PathBuf::from("/photos"));

        let cli = Cli::try_parse_from(["yapt", "-s", "/photos", "--recursive"]).unwrap();
        assert!(cli.recursive);

        let cli = Cli::try_parse_from(["yapt", "--recursive", "false", "-s", "/photos"]).unwrap();
        assert!(!cli.recursive);
    }

    #[test]
    fn restored_actions_parse() {
        for (name, action) in [
            ("count", Action::Count),
            ("checknames", Action::CheckNames),
            ("flatcp", Action::FlatCopy),
        ] {
            let cli = Cli::try_parse_from(["yapt", "-s", ".", "-a", name]).unwrap();
            assert_eq!(Action::from(cli.action), action);
        }
    }

    #[test]
    fn source_is_required() {
        assert!(Cli::try_parse_from(["yapt"]).is_err());
    }
}
