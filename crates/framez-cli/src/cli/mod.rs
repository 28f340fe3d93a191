use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `fz` binary.
#[derive(Debug, Parser)]
#[command(name = "fz", version, about = "Framez - share short posts and photos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use framez_auth::Route;
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["fz", "--format", "table", "--limit", "10", "--verbose", "feed"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Feed));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["fz", "status", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.format, OutputFormat::Raw);
        assert!(flags.quiet);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["fz", "--format", "xml", "feed"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn signup_requires_every_field() {
        let parsed = Cli::try_parse_from(["fz", "signup", "--email", "a@b.c", "--password", "secret1"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "fz",
            "signup",
            "--email",
            "a@b.c",
            "--password",
            "secret1",
            "--username",
            "ada",
            "--full-name",
            "Ada Lovelace",
        ])
        .expect("cli should parse");
        let Commands::Signup(args) = cli.command else {
            panic!("expected signup");
        };
        assert_eq!(args.full_name, "Ada Lovelace");
    }

    #[test]
    fn post_takes_content_and_optional_image() {
        let cli = Cli::try_parse_from(["fz", "post", "hello there", "--image", "/tmp/cat.png"])
            .expect("cli should parse");
        let Commands::Post(args) = cli.command else {
            panic!("expected post");
        };
        assert_eq!(args.content, "hello there");
        assert_eq!(args.image.as_deref(), Some(std::path::Path::new("/tmp/cat.png")));
    }

    #[test]
    fn commands_map_to_screens() {
        let route = |argv: &[&str]| Cli::try_parse_from(argv).expect("parse").command.route();
        assert_eq!(route(&["fz", "feed"]), Some(Route::Feed));
        assert_eq!(route(&["fz", "profile"]), Some(Route::Profile));
        assert_eq!(route(&["fz", "post", "x"]), Some(Route::Create));
        assert_eq!(route(&["fz", "login", "--email", "e", "--password", "p"]), Some(Route::Login));
        assert_eq!(route(&["fz", "status"]), None);
        assert_eq!(route(&["fz", "logout"]), None);
    }
}
