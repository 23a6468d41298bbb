use crate::checkout::{
    CheckoutConfig, CheckoutOrchestrator, CheckoutOutcome, CheckoutState, ConnectionType,
    Transition,
};
use crate::cli::{CheckoutArgs, ResolveArgs};
use crate::error::Result;
use crate::maven::{
    ArtifactCoordinate, ArtifactResolver, HttpArtifactResolver, RemoteRepository, read_pom,
};
use crate::scm::{GitScmClient, ScmVersion};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Execute the checkout workflow
pub fn execute_checkout<P: AsRef<Path>>(project_path: P, args: CheckoutArgs) -> Result<()> {
    let base_dir = project_path.as_ref().to_path_buf();
    println!(
        "{}",
        "Checking out module sources from SCM...".cyan().bold()
    );

    let resolver = build_resolver(&args.repository, args.local_repository.clone(), &base_dir)?;
    print_repositories(resolver.repositories());

    let scm_version = match (&args.scm_version_type, &args.scm_version) {
        (Some(kind), Some(value)) => Some(ScmVersion::from_type_and_value(kind, value)?),
        _ => None,
    };

    let mut config = CheckoutConfig::new(base_dir.clone());
    config.connection_url = args.connection_url;
    config.connection_type = if args.artifact_coords.is_some() {
        ConnectionType::DeveloperConnection
    } else {
        ConnectionType::Connection
    };
    config.artifact_coords = args.artifact_coords;
    config.use_export = args.use_export;
    config.checkout_directory = args.checkout_directory;
    config.skip_checkout_if_exists = args.skip_checkout_if_exists;
    config.scm_version = scm_version;
    config.as_snapshot = args.as_snapshot;
    config.register_module = args.register_module;
    config.includes = args.includes;
    config.excludes = args.excludes;
    if config.as_snapshot {
        config.project_pom = Some(base_dir.join("pom.xml"));
    }

    let use_export = config.use_export;
    let as_snapshot = config.as_snapshot;
    let registering = config.register_module.is_some();
    let mut orchestrator =
        CheckoutOrchestrator::new(config, Box::new(resolver), Box::new(GitScmClient::new()));

    let mut step = 1;
    loop {
        let label = step_label(orchestrator.state(), use_export, as_snapshot, registering);
        let spinner = label.map(|text| {
            let header = format!("{}. {}", step, text);
            step += 1;
            start_step(&header)
        });

        let transition = orchestrator.advance();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match transition? {
            Transition::Entered(_) => continue,
            Transition::Finished(outcome) => {
                print_outcome(&outcome);
                return Ok(());
            }
        }
    }
}

/// Execute the resolve workflow: fetch the descriptor and report its SCM
/// connection info without touching the working tree.
pub fn execute_resolve<P: AsRef<Path>>(project_path: P, args: ResolveArgs) -> Result<()> {
    let base_dir = project_path.as_ref().to_path_buf();
    println!("{}", "Resolving artifact coordinates...".cyan().bold());

    let resolver = build_resolver(&args.repository, args.local_repository, &base_dir)?;
    print_repositories(resolver.repositories());

    let coordinate = ArtifactCoordinate::parse(&args.artifact_coords)?;

    let spinner = start_step("1. Downloading the project descriptor...");
    let resolved = resolver.resolve(&coordinate);
    spinner.finish_and_clear();
    let resolved = resolved?;

    let model = read_pom(&resolved.pom_path)?;

    println!(
        "{}",
        format!(
            "✓ Resolved {}:{}:{}",
            coordinate.group_id, coordinate.artifact_id, resolved.version
        )
        .green()
    );
    println!("   Descriptor: {}", resolved.pom_path.display());

    match &model.scm {
        Some(scm) => {
            println!("\n{}", "SCM connection:".cyan().bold());
            if let Some(connection) = &scm.connection {
                println!("   connection:          {}", connection.bright_cyan());
            }
            if let Some(developer) = &scm.developer_connection {
                println!("   developerConnection: {}", developer.bright_cyan());
            }
            if let Some(url) = &scm.url {
                println!("   url:                 {}", url.dimmed());
            }
            if let Some(tag) = &scm.tag {
                println!("   tag:                 {}", tag.dimmed());
            }
        }
        None => {
            println!(
                "\n{}",
                "⚠ The descriptor declares no <scm> section".yellow()
            );
        }
    }

    Ok(())
}

fn build_resolver(
    repositories: &[String],
    local_repository: Option<PathBuf>,
    base_dir: &Path,
) -> Result<HttpArtifactResolver> {
    let remotes = repositories
        .iter()
        .map(|url| RemoteRepository {
            name: repository_name(url),
            url: url.clone(),
        })
        .collect();

    let local = local_repository.unwrap_or_else(|| base_dir.join("target").join("local-repo"));
    HttpArtifactResolver::with_repositories(remotes, local)
}

fn repository_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| "remote".to_string())
}

fn print_repositories(repositories: &[RemoteRepository]) {
    println!("   Resolving from {} repositories:", repositories.len());
    for repo in repositories {
        println!("   • {} ({})", repo.name.bright_cyan(), repo.url.dimmed());
    }
}

/// Step header for the state the orchestrator is about to leave. States that
/// run unconditionally get a header; the patch states only fire in the
/// snapshot workflow and announce themselves when reached.
fn step_label(
    state: CheckoutState,
    use_export: bool,
    as_snapshot: bool,
    registering: bool,
) -> Option<String> {
    match state {
        CheckoutState::Idle => Some("Resolving the checkout source...".to_string()),
        CheckoutState::CoordinatesResolved => {
            Some("Extracting the SCM connection from the descriptor...".to_string())
        }
        CheckoutState::ConnectionConfigured => {
            Some("Preparing the checkout directory...".to_string())
        }
        CheckoutState::DirectoryPrepared => Some(if use_export {
            "Exporting sources from SCM...".to_string()
        } else {
            "Checking out sources from SCM...".to_string()
        }),
        CheckoutState::CheckedOut if as_snapshot => {
            Some("Rewriting the module version to a snapshot...".to_string())
        }
        CheckoutState::PatchedModule => {
            Some("Rewriting the dependency declaration...".to_string())
        }
        CheckoutState::PatchedConsumer if registering => {
            Some("Registering the module in the aggregator POM...".to_string())
        }
        _ => None,
    }
}

fn start_step(header: &str) -> ProgressBar {
    println!("\n{}", header.yellow());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("   {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_outcome(outcome: &CheckoutOutcome) {
    match outcome {
        CheckoutOutcome::Skipped { destination } => {
            println!(
                "\n{}",
                format!(
                    "⚠ Checkout skipped: {} already exists",
                    destination.display()
                )
                .yellow()
            );
        }
        CheckoutOutcome::Completed {
            destination,
            files_checked_out,
            provider_message,
            version_change,
            module_registered,
        } => {
            println!(
                "{}",
                format!(
                    "✓ {} file(s) checked out into {}",
                    files_checked_out,
                    destination.display()
                )
                .green()
            );
            if let Some(message) = provider_message {
                println!("   {}", message.dimmed());
            }

            if let Some(change) = version_change {
                println!("\n{}", "Snapshot rewrite:".cyan().bold());
                println!(
                    "  • {}:{} {} → {}",
                    change.group_id.white().bold(),
                    change.artifact_id.white().bold(),
                    change.old_version.red(),
                    change.new_version.green().bold()
                );
                if *module_registered {
                    println!(
                        "  • {}",
                        format!("module '{}' registered in the aggregator", change.artifact_id)
                            .green()
                    );
                }
            }

            println!("\n{}", "✨ Checkout completed successfully!".green().bold());
        }
    }
}
