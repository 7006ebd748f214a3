use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "certfolio",
    version,
    about = "certificate gallery renderer",
    long_about = "Certfolio loads a JSON document of certificates and renders it as a categorized, sortable, collapsible gallery.\n\nExamples:\n  certfolio -s data/certificados.json\n  certfolio -s https://example.com/certificados.json -o gallery.html\n  certfolio --sort title --expand-all -A json\n  certfolio -i -o gallery.html\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 's',
        long = "src",
        visible_alias = "source",
        value_name = "PATH|URL",
        help_heading = "Input",
        help = "Certificate document, a local path or an http(s) URL (defaults to data/certificados.json)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.certfolio/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file (at --config or ~/.certfolio/config.yml) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Input",
        help = "Request timeout in seconds when the source is a URL."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the gallery to a file instead of the terminal."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'S',
        long = "srt",
        visible_alias = "sort",
        value_name = "KEY",
        help_heading = "View",
        help = "Initial sort key (date, institution, title)."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'E',
        long = "ea",
        visible_alias = "expand-all",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "View",
        help = "Open every category instead of only the first."
    )]
    pub expand_all: Option<bool>,

    #[arg(
        long = "thm",
        visible_alias = "theme",
        value_name = "THEME",
        help_heading = "View",
        help = "Set and persist the color theme (dark, light)."
    )]
    pub theme: Option<String>,

    #[arg(
        short = 'P',
        long = "prf",
        visible_alias = "preferences",
        value_name = "FILE",
        help_heading = "View",
        help = "Preference store file (defaults to ~/.certfolio/preferences.yml)."
    )]
    pub preferences: Option<String>,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "Session",
        help = "Keep a session open and read sort/toggle/theme commands from stdin."
    )]
    pub interactive: bool,
}
