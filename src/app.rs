use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, OutputFormat, Renderer};
use crate::prefs::{FilePreferenceStore, Theme};
use crate::runner::{Options, Runner};
use crate::session::{self, Command, Outcome};
use crate::state::{Controller, LoadPhase};
use crate::transform::SortKey;
use crate::view;

fn print_banner(no_color: bool) {
    const BANNER: &str = r#"
                   __  ____      ___
  ________  _____/ /_/ __/___  / (_)___
 / ___/ _ \/ ___/ __/ /_/ __ \/ / / __ \
/ /__/  __/ /  / /_/ __/ /_/ / / / /_/ /
\___/\___/_/   \__/_/  \____/_/_/\____/
       v0.1.0 - certificate gallery renderer
    "#;
    if no_color {
        print!("{}", BANNER);
    } else {
        let _ = write!(&mut rainbowcoat::stdout(), "{}", BANNER);
    }
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push_str(&long_about.to_string());
        out.push('\n');
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n\n", cmd.get_name()));

    let visible = cmd.get_arguments().filter(|arg| !arg.is_hide_set());
    let sections = visible.into_group_map_by(|arg| {
        arg.get_help_heading().unwrap_or("Options").to_string()
    });
    let mut headings: Vec<&str> = Vec::new();
    for arg in cmd.get_arguments().filter(|arg| !arg.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options");
        if !headings.contains(&heading) {
            headings.push(heading);
        }
    }

    for heading in headings {
        out.push_str(heading);
        out.push_str(":\n");
        for arg in sections.get(heading).into_iter().flatten() {
            let mut names: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                names.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                names.push(format!("--{long}"));
            }
            for alias in arg.get_visible_aliases().unwrap_or_default() {
                names.push(format!("--{alias}"));
            }
            let mut flags = names.into_iter().unique().join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                let optional = arg.get_num_args().map(|r| r.min_values() == 0).unwrap_or(false);
                if optional {
                    flags.push_str(&format!(" [<{value_name}>]"));
                } else {
                    flags.push_str(&format!(" <{value_name}>"));
                }
            }
            out.push_str(&format!("  {flags}\n"));
            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str(&format!("          {}\n", help.trim()));
                }
            }
            out.push('\n');
        }
    }

    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: String,
    timeout: u64,
    output: Option<String>,
    output_format: OutputFormat,
    sort: SortKey,
    expand_all: bool,
    theme: Option<Theme>,
    preferences_path: PathBuf,
    interactive: bool,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let source = args
        .source
        .or(cfg.source)
        .unwrap_or_else(|| crate::loader::DEFAULT_SOURCE.to_string());
    let source = match crate::loader::Source::parse(&source) {
        crate::loader::Source::Url(url) => url,
        crate::loader::Source::Path(path) => config::expand_tilde_string(&path),
    };
    let timeout = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(crate::loader::DEFAULT_TIMEOUT_SECONDS);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let sort_raw = args.sort.or(cfg.sort).unwrap_or_else(|| "date".to_string());
    let sort = sort_raw
        .parse::<SortKey>()
        .map_err(|e| format!("invalid sort '{sort_raw}': {e}"))?;
    let expand_all = args.expand_all.or(cfg.expand_all).unwrap_or(false);

    let theme = match args.theme.or(cfg.theme) {
        Some(raw) => Some(
            Theme::parse(&raw)
                .ok_or_else(|| format!("invalid theme '{raw}', expected dark or light"))?,
        ),
        None => None,
    };

    let preferences_path = match args.preferences.or(cfg.preferences) {
        Some(p) => config::expand_tilde(&p),
        None => config::default_preferences_path()
            .unwrap_or_else(|| PathBuf::from(".certfolio-preferences.yml")),
    };

    Ok(RunConfig {
        source,
        timeout,
        output,
        output_format,
        sort,
        expand_all,
        theme,
        preferences_path,
        interactive: args.interactive,
        no_color,
    })
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "certfolio=warn",
        1 => "certfolio=debug",
        _ => "certfolio=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Replaces whatever was shown before with `bytes`.
async fn present(output: Option<&str>, bytes: &[u8]) -> Result<(), String> {
    match output {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .map_err(|e| format!("failed to write output file {path}: {e}")),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("failed to write to stdout: {e}"))
        }
    }
}

async fn render_and_present(
    controller: &Controller,
    renderer: &dyn Renderer,
    output: Option<&str>,
) -> Result<(), String> {
    let tree = view::build_view(controller.state());
    present(output, &renderer.render(&tree)).await
}

async fn run_session(
    controller: &mut Controller,
    renderer: &dyn Renderer,
    output: Option<&str>,
) -> Result<(), String> {
    eprintln!("{}", session::HELP.dimmed());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", ">".bold().green());
        let line = match lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read command: {e}"))?
        {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{} {}", "[ERR]".bold().red(), e);
                continue;
            }
        };
        let outcome = match session::apply(controller, command) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{} {}", "[WRN]".bold().yellow(), e);
                Outcome::Rerender
            }
        };
        match outcome {
            Outcome::Rerender => render_and_present(controller, renderer, output).await?,
            Outcome::Unchanged => {}
            Outcome::Help => eprintln!("{}", session::HELP),
            Outcome::Quit => break,
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    if run.output.is_some() {
        print_banner(run.no_color);
    }

    format_kv_line("Source", &run.source);
    format_kv_line("Sort", run.sort.as_str());
    format_kv_line(
        "Output",
        &format!(
            "{} ({:?})",
            run.output.as_deref().unwrap_or("stdout"),
            run.output_format
        ),
    );
    format_kv_line("Prefs", &run.preferences_path.display().to_string());
    eprintln!();

    let runner = Runner::new(Options {
        source: run.source.clone(),
        timeout_seconds: run.timeout,
        sort: run.sort,
        expand_all: run.expand_all,
        theme: run.theme,
    })
    .map_err(|e| e.to_string())?;

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {elapsed} {msg}")
            .map_err(|e| format!("invalid progress template: {e}"))?,
    );
    pb.set_message("Cargando certificados...");
    pb.enable_steady_tick(Duration::from_millis(120));

    let store = FilePreferenceStore::new(run.preferences_path.clone());
    let result = runner.run(Box::new(store)).await;
    pb.finish_and_clear();
    let mut controller = result.map_err(|e| e.to_string())?;

    let renderer = run.output_format.renderer();
    let output = run.output.as_deref();
    render_and_present(&controller, renderer.as_ref(), output).await?;

    match &controller.state().phase {
        LoadPhase::Failed(message) => return Err(message.clone()),
        LoadPhase::Empty => eprintln!("{} {}", "[INF]".bold().yellow(), view::EMPTY_MESSAGE),
        LoadPhase::Loaded | LoadPhase::Loading => {
            format_kv_line("Loaded", &controller.state().records.len().to_string());
        }
    }

    if run.interactive {
        run_session(&mut controller, renderer.as_ref(), output).await?;
    }

    if let Some(path) = output {
        eprintln!();
        eprintln!(":: Completed :: gallery written to {} ::", path.bold().cyan());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path, use --config".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!(":: Config :: {}", path.display());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
