use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::prefs::Theme;
use crate::transform::SortKey;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.sort.as_deref() {
        raw.parse::<SortKey>()
            .map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(raw) = args.theme.as_deref() {
        if Theme::parse(raw).is_none() {
            return Err(format!("invalid --theme '{raw}', expected dark or light"));
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(source) = args.source.as_deref() {
        if source.trim().is_empty() {
            return Err("invalid --source, expected a path or URL".to_string());
        }
    }
    Ok(())
}
