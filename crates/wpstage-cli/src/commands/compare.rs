use crate::formatters::{print_json, OutputFormat};
use anyhow::Result;
use colored::*;
use serde_json::json;

pub fn run(local: &str, remote: Option<&str>, format: OutputFormat) -> Result<()> {
    let newer = wpstage_version::is_newer(local, remote);

    match format {
        OutputFormat::Json => print_json(&json!({
            "local": local,
            "local_normalized": wpstage_version::normalize(local),
            "remote": remote,
            "remote_normalized": remote.map(wpstage_version::normalize),
            "is_newer": newer,
        }))?,
        OutputFormat::Human => {
            let against = remote.unwrap_or("nothing published");
            if newer {
                println!("{} {local} is newer than {against}", "✓".green());
            } else {
                println!("{} {local} is not newer than {against}", "✗".yellow());
            }
        }
    }
    Ok(())
}
