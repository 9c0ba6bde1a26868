mod output;
mod theme;

use anyhow::{Context, Result};
use clap::{
    builder::{
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
        Styles,
    },
    error::ErrorKind,
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser,
};
use colored::{control::ShouldColorize, Color as ThemeColor};
use std::io;
use std::path::PathBuf;

use genmethods_build::generate_methods;
use output::{GlobalOptions, OutputManager};
use theme::THEME;

const USAGE: &str = "usage: genmethods [package path]";

#[derive(Parser, Debug)]
#[command(name = "genmethods")]
#[command(version)]
#[command(
    about = "Generate a print_type method for every struct in a package",
    long_about = r#"Scans a Rust package directory (a folder with mod.rs, lib.rs or main.rs),
finds every struct declared at its top level and writes method_gen.rs next to
the entry file with one method per struct.

The artifact is regenerated from scratch on every run. Add `mod method_gen;`
to the entry file to compile it in.

A genmethods.toml in the package directory can change the output file,
method template, ordering and extra imports."#
)]
struct Cli {
    /// Directory of the package to generate methods for
    package_path: PathBuf,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// List every declaration found in the package
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn parse_with_styles() -> Self {
        match build_cli_command().try_get_matches() {
            Ok(matches) => match Cli::from_arg_matches(&matches) {
                Ok(cli) => cli,
                Err(_) => print_usage_and_exit(),
            },
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display help: {print_err}");
                    }
                    std::process::exit(0);
                }
                _ => print_usage_and_exit(),
            },
        }
    }
}

/// Wrong argument counts are not an error: print the one-line usage and succeed.
fn print_usage_and_exit() -> ! {
    println!("{USAGE}");
    std::process::exit(0);
}

fn build_cli_command() -> Command {
    let color = if detect_color_support() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    Cli::command().color(color).styles(help_styles())
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.primary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(color_to_clap_color(color)))
}

/// Map a `colored` color onto the ANSI palette clap styles with.
fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    let (base, bright) = match color {
        ThemeColor::TrueColor { r, g, b } => return ClapColor::Rgb(RgbColor(r, g, b)),
        ThemeColor::Black => (AnsiColor::Black, false),
        ThemeColor::Red => (AnsiColor::Red, false),
        ThemeColor::Green => (AnsiColor::Green, false),
        ThemeColor::Yellow => (AnsiColor::Yellow, false),
        ThemeColor::Blue => (AnsiColor::Blue, false),
        ThemeColor::Magenta => (AnsiColor::Magenta, false),
        ThemeColor::Cyan => (AnsiColor::Cyan, false),
        ThemeColor::White => (AnsiColor::White, false),
        ThemeColor::BrightBlack => (AnsiColor::Black, true),
        ThemeColor::BrightRed => (AnsiColor::Red, true),
        ThemeColor::BrightGreen => (AnsiColor::Green, true),
        ThemeColor::BrightYellow => (AnsiColor::Yellow, true),
        ThemeColor::BrightBlue => (AnsiColor::Blue, true),
        ThemeColor::BrightMagenta => (AnsiColor::Magenta, true),
        ThemeColor::BrightCyan => (AnsiColor::Cyan, true),
        ThemeColor::BrightWhite => (AnsiColor::White, true),
    };
    ClapColor::Ansi(base.bright(bright))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();
    let output = OutputManager::new(GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(&cli, &output) {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(cli: &Cli, output: &OutputManager) -> Result<()> {
    let generated = generate_methods(&cli.package_path)
        .run()
        .with_context(|| format!("generating methods for {}", cli.package_path.display()))?;

    for declaration in generated.catalog.declarations() {
        output.verbose(&format!("{}: {}", declaration.name, declaration.describe()));
    }

    output.heading("target");
    for name in generated.struct_names() {
        output.bullet(name);
    }
    output.success(&format!("wrote: {}", generated.output_path.display()));
    Ok(())
}
