use crate::formatters::{human, print_json, OutputFormat};
use anyhow::{Context, Result};
use std::path::Path;
use wpstage_builder::describe;
use wpstage_config::validate_source_dir;

pub fn run(dir: &Path, format: OutputFormat) -> Result<()> {
    let dir = validate_source_dir(dir).with_context(|| format!("Cannot describe {}", dir.display()))?;
    let nodes = describe(&dir);

    match format {
        OutputFormat::Json => print_json(&nodes)?,
        OutputFormat::Human => {
            print!("{}", human::render_tree(&nodes));
            let files: usize = nodes.iter().map(|n| n.file_count()).sum();
            println!("\n{files} file(s)");
        }
    }
    Ok(())
}
