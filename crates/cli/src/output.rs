//! Text vs JSON rendering, shared across every subcommand.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a single item: pretty JSON, or hand off to `render_text`.
pub fn show<T: Serialize>(
    format: OutputFormat,
    item: &T,
    render_text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
        OutputFormat::Text => render_text(item),
    }
    Ok(())
}

/// Render a list: pretty JSON array, or a per-row text callback with an
/// empty-list message.
pub fn list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    render_row: impl Fn(&T),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{empty_msg}");
            } else {
                for item in items {
                    render_row(item);
                }
            }
        }
    }
    Ok(())
}
