mod cli;

use crate::cli::{Cli, Format};
use anyhow::{Context, Result};
use presubmit_diff::{DiffRequest, DiffResult, FileState, GitilesResolver, create_diffs, ui};
use presubmit_diff::{error, info, status};
use std::fs;
use std::io::{self, Write};

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = cli.config();
    let resolver = GitilesResolver::new(&config);
    let request = DiffRequest::new(
        cli.host.as_str(),
        cli.repo.as_str(),
        cli.git_ref.as_str(),
        cli.root.as_path(),
        cli.files.iter().cloned(),
    );

    let file_word = if request.paths.len() == 1 { "file" } else { "files" };
    let spinner = ui::spinner(&format!(
        "diffing {} {} against {}...",
        request.paths.len(),
        file_word,
        request.git_ref
    ));
    let result = create_diffs(&resolver, &request, &config);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result.with_context(|| {
        format!(
            "failed to diff against {}/{} at {}",
            request.host, request.repository, request.git_ref
        )
    })?;

    if cli.verbose {
        report(&result);
    }

    let output = match cli.format {
        Format::Patch => result.to_patch(),
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(&result).context("failed to serialize diffs")?;
            json.push('\n');
            json
        }
    };

    match &cli.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout()
            .write_all(output.as_bytes())
            .context("failed to write to stdout")?,
    }

    Ok(())
}

/// one line per file, like `git status --short`
fn report(result: &DiffResult) {
    let changed = result
        .iter()
        .filter(|file| file.state != FileState::Unchanged)
        .count();
    status!("{} of {} files differ:", changed, result.len());
    for file in result {
        info!("{} {} ({})", file.state.status_char(), file.path, file.state);
    }
}
