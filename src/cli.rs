use clap::Parser;

use tscp::project::TSCONFIG;
use tscp::ProjectSelection;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// What the invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mirror once and exit
    Copy,
    /// Mirror, then keep mirroring until interrupted
    Watch,
}

/// tscp - copy non-TypeScript files to your outDir
#[derive(Parser, Debug)]
#[command(name = "tscp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Keep watching for changes after the initial copy
    #[arg(short, long)]
    pub watch: bool,

    /// Copy every project referenced by the configuration
    #[arg(short, long)]
    pub build: bool,

    /// Configuration file or directory to resolve
    #[arg(short, long, value_name = "PATH")]
    pub project: Option<String>,

    /// Output format for CI
    #[arg(long)]
    pub json: bool,

    /// Color output mode
    #[arg(long, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Extra arguments; the last one names the project when --project is absent
    #[arg(value_name = "PROJECT")]
    pub rest: Vec<String>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.watch {
            Mode::Watch
        } else {
            Mode::Copy
        }
    }

    pub fn selection(&self) -> ProjectSelection {
        if self.build {
            ProjectSelection::References
        } else {
            ProjectSelection::Single
        }
    }

    /// `--project`, else the last positional argument, else `tsconfig.json`.
    pub fn project_arg(&self) -> &str {
        self.project
            .as_deref()
            .or(self.rest.last().map(String::as_str))
            .unwrap_or(TSCONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["tscp"]).unwrap();
        assert_eq!(cli.mode(), Mode::Copy);
        assert_eq!(cli.selection(), ProjectSelection::Single);
        assert_eq!(cli.project_arg(), "tsconfig.json");
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_watch_and_build() {
        let cli = Cli::try_parse_from(["tscp", "-w", "--build"]).unwrap();
        assert_eq!(cli.mode(), Mode::Watch);
        assert_eq!(cli.selection(), ProjectSelection::References);
    }

    #[test]
    fn test_cli_project_flag_wins() {
        let cli = Cli::try_parse_from(["tscp", "-p", "tsconfig.build.json", "other.json"]).unwrap();
        assert_eq!(cli.project_arg(), "tsconfig.build.json");
    }

    #[test]
    fn test_cli_last_positional_is_project() {
        let cli = Cli::try_parse_from(["tscp", "--watch", "first.json", "packages/app"]).unwrap();
        assert_eq!(cli.project_arg(), "packages/app");
        assert_eq!(cli.mode(), Mode::Watch);
    }

    #[test]
    fn test_cli_verbose_and_color() {
        let cli = Cli::try_parse_from(["tscp", "-vv", "--color", "never", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, Some(ColorWhen::Never));
        assert!(cli.json);
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["tscp", "--minify"]).is_err());
    }
}
