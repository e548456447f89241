//! Human-readable output.

use colored::*;
use wpstage_core::{AnalysisResult, BuildOutput, ItemRecord, ItemStatus, TreeNode, VALID_THRESHOLD};
use wpstage_jobs::JobEvent;
use wpstage_remote::PublishReceipt;

pub fn score_label(score: u8) -> ColoredString {
    let text = format!("{score}/10");
    match score {
        10 => text.green().bold(),
        s if s >= VALID_THRESHOLD => text.yellow(),
        _ => text.red(),
    }
}

pub fn status_label(status: ItemStatus) -> ColoredString {
    let text = status.as_str();
    match status {
        ItemStatus::Built | ItemStatus::Published => text.green(),
        ItemStatus::ReadyToUpload => text.cyan(),
        ItemStatus::NeedsReview => text.yellow(),
        ItemStatus::Failed => text.red(),
        _ => text.normal(),
    }
}

fn field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("  {:<12} {}", format!("{label}:"), value);
    }
}

pub fn print_analysis(result: &AnalysisResult) {
    println!("\n{}", "Analysis".bold());
    println!("{}", "=".repeat(40));
    println!("  {:<12} {}", "Score:", score_label(result.score));
    println!("  {:<12} {}", "Reason:", result.reason);

    let kind = result.kind.map(|k| k.as_str());
    field("Type", kind);
    field("Name", result.name.as_deref());
    field("Slug", result.slug.as_deref());
    field("Version", result.version.as_deref());
    field("Author", result.author.as_deref());
    field("Text domain", result.text_domain.as_deref());

    if let Some(found) = &result.found_in_file {
        println!("  {:<12} {}", "Header:", found.display());
    }
    if result.candidate_names.len() > 1 {
        println!("  {:<12} {}", "Candidates:", result.candidate_names.join(", "));
    }
    for archive in &result.nested_archives {
        println!("  {} nested archive: {}", "!".yellow(), archive.display());
    }
    if let Some(newer) = result.is_newer {
        let label = if newer { "newer".green() } else { "not newer".yellow() };
        println!("  {:<12} {}", "Remote:", label);
    }

    let verdict = if result.is_auto_buildable() {
        "ready to build".green()
    } else if result.is_valid {
        "needs review".yellow()
    } else {
        "not installable".red()
    };
    println!("\n  {verdict}");
}

pub fn print_build(output: &BuildOutput) {
    println!("{} {}", "✓".green(), "Build complete".bold());
    println!("  Archive:  {}", output.archive_path.display());
    println!("  SHA-256:  {}", output.archive_sha256);
    println!("  Files:    {}", output.file_count);
    if let Some(tree) = &output.tree_path {
        println!("  Tree:     {}", tree.display());
    }
    match &output.source_path {
        Some(source) => println!("  Source:   {}", source.display()),
        None => println!("  Source:   {}", "not extracted".dimmed()),
    }
}

/// Human size: bytes below 1 KiB, otherwise KiB/MiB with one decimal.
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

/// Indented listing of a tree description, folders suffixed with `/`.
pub fn render_tree(nodes: &[TreeNode]) -> String {
    fn walk(nodes: &[TreeNode], indent: usize, out: &mut String) {
        for node in nodes {
            let pad = "  ".repeat(indent);
            match node {
                TreeNode::Folder { name, children, .. } => {
                    out.push_str(&format!("{pad}{name}/\n"));
                    walk(children, indent + 1, out);
                }
                TreeNode::File { name, size, .. } => {
                    out.push_str(&format!("{pad}{name} ({})\n", format_size(*size)));
                }
            }
        }
    }

    let mut out = String::new();
    walk(nodes, 0, &mut out);
    out
}

pub fn print_items(records: &[ItemRecord]) {
    if records.is_empty() {
        println!("No items.");
        return;
    }

    println!(
        "{:<34} {:<16} {:<6} {:<24} {}",
        "ID".bold(),
        "STATUS".bold(),
        "SCORE".bold(),
        "SLUG".bold(),
        "VERSION".bold()
    );
    for record in records {
        let score = record.score.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:<34} {:<16} {:<6} {:<24} {}",
            record.id,
            status_label(record.status),
            score,
            record.slug.as_deref().unwrap_or("-"),
            record.version.as_deref().unwrap_or("-"),
        );
    }
    println!("\nTotal: {} item(s)", records.len());
}

pub fn print_item(record: &ItemRecord) {
    println!("{} ({})", record.original_filename.bold(), record.id);
    println!("  Status:   {}", status_label(record.status));
    if let Some(score) = record.score {
        println!("  Score:    {}", score_label(score));
    }
    field("Slug", record.slug.as_deref());
    field("Version", record.version.as_deref());
    field("Type", record.kind.map(|k| k.as_str()));
    field("Log", record.analysis_log.as_deref());
    println!("  Upload:   {}", record.upload_path.display());
    println!("  Created:  {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:  {}", record.updated_at.format("%Y-%m-%d %H:%M:%S"));
}

pub fn print_event(event: &JobEvent) {
    match event {
        JobEvent::Started {
            job_id,
            item_id,
            action,
        } => println!("{} {} {} {}", "▶".cyan(), job_id.dimmed(), action, item_id),
        JobEvent::Log { job_id, message } => println!("  {} {}", job_id.dimmed(), message),
        JobEvent::Done { job_id, .. } => println!("{} {} done", "✓".green(), job_id.dimmed()),
        JobEvent::Error { job_id, error } => {
            println!("{} {} {}", "✗".red(), job_id.dimmed(), error.red())
        }
    }
}

pub fn print_publish(receipt: &PublishReceipt) {
    println!("{} {}", "✓".green(), "Published".bold());
    println!("  Archive:  {}", receipt.archive_key);
    if let Some(tree) = &receipt.tree_key {
        println!("  Tree:     {tree}");
    }
    if let Some(banner) = &receipt.banner_url {
        println!("  Banner:   {banner}");
    }
    println!("  Source:   {} file(s)", receipt.source_files);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_render_tree() {
        let nodes = vec![TreeNode::Folder {
            name: "akismet".to_string(),
            path: "akismet".to_string(),
            children: vec![
                TreeNode::Folder {
                    name: "views".to_string(),
                    path: "akismet/views".to_string(),
                    children: vec![TreeNode::File {
                        name: "notice.php".to_string(),
                        path: "akismet/views/notice.php".to_string(),
                        size: 12,
                    }],
                },
                TreeNode::File {
                    name: "akismet.php".to_string(),
                    path: "akismet/akismet.php".to_string(),
                    size: 2048,
                },
            ],
        }];

        assert_eq!(
            render_tree(&nodes),
            "akismet/\n  views/\n    notice.php (12 B)\n  akismet.php (2.0 KiB)\n"
        );
    }
}
