use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use inquire::{MultiSelect, Select, Text};
use tracing_subscriber::EnvFilter;

use modup::core::applier::UpdateApplier;
use modup::core::config::{default_mods_dir, normalize_api_key, Config, Disposal};
use modup::core::downloader::Downloader;
use modup::core::error::{UpdaterError, UpdaterResult};
use modup::core::http::build_http_client;
use modup::core::loader::ModLoader;
use modup::core::matcher::Matcher;
use modup::core::pipeline::{Pipeline, DEFAULT_CONCURRENCY};
use modup::core::platform::{CurseforgeClient, ModPlatform, ModrinthClient};
use modup::core::report::{MatchResult, MatchStatus, RunSummary};
use modup::core::scanner;

/// Checks for updates of locally installed Minecraft mods on CurseForge and
/// Modrinth, and optionally downloads them while backing up the old files.
#[derive(Parser)]
#[command(name = "modup", version, about)]
struct Cli {
    /// Mods directory to scan (defaults to the standard .minecraft/mods).
    #[arg(long)]
    mods_dir: Option<PathBuf>,

    /// Target Minecraft version; prompted for interactively when omitted.
    #[arg(long)]
    mc_version: Option<String>,

    /// CurseForge API key; lookups degrade to Modrinth-only without one.
    #[arg(long, env = "CURSEFORGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum number of concurrent platform lookups.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Move superseded files to a .trash folder instead of a per-version
    /// backup folder.
    #[arg(long)]
    trash: bool,

    /// Apply every available update without prompting.
    #[arg(long, short = 'y')]
    yes: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modup=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> UpdaterResult<()> {
    let mods_dir = cli.mods_dir.unwrap_or_else(default_mods_dir);
    let api_key = normalize_api_key(cli.api_key);

    let mods = scanner::scan(&mods_dir)?;
    if mods.is_empty() {
        println!("No mod archives found in {}", mods_dir.display());
        return Ok(());
    }

    let loader = ModLoader::detect_dominant(mods.iter().map(|m| m.file_name.as_str()));
    let detected_version = scanner::detect_game_version(&mods);
    println!(
        "Found {} mods in {} ({}, {})",
        style(mods.len()).bold(),
        mods_dir.display(),
        detected_version
            .as_deref()
            .map(|v| format!("Minecraft {v}"))
            .unwrap_or_else(|| "unknown Minecraft version".to_string()),
        loader
            .map(|l| format!("{l} loader"))
            .unwrap_or_else(|| "unknown loader".to_string()),
    );

    let target_version = match cli.mc_version {
        Some(version) => version,
        None => {
            let mut prompt = Text::new("Target Minecraft version:");
            if let Some(detected) = detected_version.as_deref() {
                prompt = prompt.with_default(detected);
            }
            match prompt_or_cancel(prompt.prompt())? {
                Some(version) => version,
                None => {
                    println!("Aborted.");
                    return Ok(());
                }
            }
        }
    };

    if api_key.is_none() {
        println!(
            "{}",
            style("No CurseForge API key set; falling back to Modrinth lookups.").dim()
        );
    }

    let config = Config {
        mods_dir,
        curseforge_api_key: api_key,
        concurrency: cli.concurrency,
        disposal: if cli.trash {
            Disposal::Trash
        } else {
            Disposal::Backup {
                label: detected_version.unwrap_or_else(|| "backup".to_string()),
            }
        },
        assume_yes: cli.yes,
    };

    let client = build_http_client()?;
    let platforms: Vec<Arc<dyn ModPlatform>> = vec![
        Arc::new(CurseforgeClient::new(
            client.clone(),
            config.curseforge_api_key.clone(),
        )),
        Arc::new(ModrinthClient::new(client.clone())),
    ];
    let pipeline = Pipeline::new(Matcher::new(platforms, loader), loader)
        .with_concurrency(config.concurrency);

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!(
        "Checking {} mods for Minecraft {}...",
        mods.len(),
        target_version
    ));
    let results = pipeline.check(mods, &target_version).await;
    spinner.finish_and_clear();

    for result in &results {
        println!("{}", status_line(result));
    }
    let summary = RunSummary::tally(&results);
    println!("\n{}", style(&summary).bold());

    let updates: Vec<&MatchResult> = results
        .iter()
        .filter(|r| r.status == MatchStatus::UpdateAvailable)
        .collect();
    if updates.is_empty() {
        return Ok(());
    }

    let selected = match select_updates(&updates, config.assume_yes)? {
        Some(selected) if !selected.is_empty() => selected,
        _ => {
            println!("Nothing to update.");
            return Ok(());
        }
    };

    let downloader = Downloader::new(client);
    let applier = UpdateApplier::new(&downloader, &config.mods_dir, config.disposal.clone());

    let bar = ProgressBar::new(selected.len() as u64);
    let mut applied = 0usize;
    let mut failures: Vec<(String, UpdaterError)> = Vec::new();
    for result in selected {
        let Some(candidate) = &result.candidate else {
            continue;
        };
        bar.set_message(candidate.file_name.clone());
        match applier.apply(&result.local_mod, candidate).await {
            Ok(_) => applied += 1,
            Err(e) => failures.push((result.local_mod.file_name.clone(), e)),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if applied > 0 {
        println!("{} Updated {} mod(s)", style("✓").green(), applied);
    }
    for (file_name, error) in &failures {
        // Per-mod failures are reported but never fail the run.
        println!("{} {}: {}", style("✗").red(), file_name, error);
    }

    Ok(())
}

/// Which of the available updates to apply, mirroring the original
/// all / some / none flow. `None` means the user backed out of a prompt.
fn select_updates<'a>(
    updates: &[&'a MatchResult],
    assume_yes: bool,
) -> UpdaterResult<Option<Vec<&'a MatchResult>>> {
    if assume_yes {
        return Ok(Some(updates.to_vec()));
    }

    let choice = prompt_or_cancel(
        Select::new(
            "What do you want to do?",
            vec!["Update all mods", "Select mods to update", "Don't update"],
        )
        .prompt(),
    )?;
    match choice {
        Some("Update all mods") => Ok(Some(updates.to_vec())),
        Some("Select mods to update") => {
            let labels: Vec<String> = updates
                .iter()
                .map(|r| {
                    let new_name = r
                        .candidate
                        .as_ref()
                        .map(|c| c.file_name.as_str())
                        .unwrap_or("?");
                    format!("{} -> {}", r.local_mod.file_name, new_name)
                })
                .collect();
            let picked =
                prompt_or_cancel(MultiSelect::new("Select the mods to update:", labels).raw_prompt())?;
            Ok(picked.map(|options| {
                options
                    .into_iter()
                    .map(|option| updates[option.index])
                    .collect()
            }))
        }
        _ => Ok(None),
    }
}

fn status_line(result: &MatchResult) -> String {
    let name = &result.local_mod.file_name;
    match &result.status {
        MatchStatus::UpdateAvailable => {
            let candidate = result
                .candidate
                .as_ref()
                .map(|c| c.file_name.as_str())
                .unwrap_or("?");
            let note = if result.local_mod.installed_version.is_none() {
                " (installed version unknown)"
            } else {
                ""
            };
            format!(
                "{} {} -> {}{}",
                style("update").green().bold(),
                style(name).yellow(),
                style(candidate).green(),
                note
            )
        }
        MatchStatus::UpToDate => format!("{} {}", style("ok    ").dim(), name),
        MatchStatus::NotFound => format!(
            "{} {} (check manually)",
            style("missed").yellow(),
            name
        ),
        MatchStatus::Ambiguous { candidates } => format!(
            "{} {} (candidates: {})",
            style("vague ").yellow(),
            name,
            candidates.join(", ")
        ),
        MatchStatus::Failed { reason } => {
            format!("{} {}: {}", style("error ").red(), name, reason)
        }
    }
}

fn prompt_or_cancel<T>(result: Result<T, inquire::InquireError>) -> UpdaterResult<Option<T>> {
    use inquire::InquireError;
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(UpdaterError::Other(e.to_string())),
    }
}
