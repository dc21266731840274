//! nupack CLI - resolve and install packages from NuGet-style feeds.

mod commands;
mod output;

use anyhow::Context;
use clap::Parser;
use commands::{Cli, Commands, DependencyBehavior, InstallArgs, SourceCommands};
use nupack_provider::{
    DestinationMode, InstallRequest, PackageName, Provider, ProtocolVersion, ResolutionPolicy,
    Settings, SourceOptions, TargetFramework, VersionRange,
};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use url::Url;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create runtime");

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load().context("loading settings")?;
    let mut provider = Provider::new(settings);

    match cli.command {
        Commands::Install(args) => install(&provider, args).await,
        Commands::Search(args) => {
            let results = provider
                .search(&args.query, args.prerelease, sources_filter(&args.sources))
                .await?;
            for message in &results.source_errors {
                eprintln!("warning: {message}");
            }
            if results.hits.is_empty() {
                println!("no packages matched");
            } else {
                println!("{}", output::search_table(&results));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::List(args) => {
            let destination = args
                .destination
                .map_or(DestinationMode::GlobalStore, DestinationMode::Directory);
            let records = provider.enumerate_installed(&destination)?;
            if records.is_empty() {
                println!("no packages installed");
            } else {
                println!("{}", output::installed_table(&records));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Source(action) => source_command(&mut provider, action),
    }
}

async fn install(provider: &Provider, args: InstallArgs) -> anyhow::Result<ExitCode> {
    let name = PackageName::parse(&args.package)
        .with_context(|| format!("invalid package name '{}'", args.package))?;

    let mut request = InstallRequest::new(name)
        .with_prerelease(args.prerelease)
        .with_policy(match args.dependency_behavior {
            DependencyBehavior::Lowest => ResolutionPolicy::Lowest,
            DependencyBehavior::Highest => ResolutionPolicy::Highest,
        })
        .with_framework(TargetFramework::new(&args.framework));

    if let Some(raw) = &args.version {
        let range = VersionRange::parse(raw)
            .with_context(|| format!("invalid version or range '{raw}'"))?;
        request = request.with_version(range);
    }
    if let Some(sources) = sources_filter(&args.sources) {
        request = request.with_sources(sources.to_vec());
    }
    if let Some(dir) = args.destination {
        request = request.with_destination(DestinationMode::Directory(dir));
    }

    // Ctrl-C cancels in-flight queries and downloads; completed
    // extractions stay.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let report = provider.install_or_save(&request, &cancel).await?;
    println!("{}", output::install_table(&report));

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        for failure in report.failures() {
            eprintln!(
                "error: {}: {}",
                failure.identity,
                failure.error.as_deref().unwrap_or("unknown failure")
            );
        }
        Ok(ExitCode::FAILURE)
    }
}

fn source_command(
    provider: &mut Provider,
    action: SourceCommands,
) -> anyhow::Result<ExitCode> {
    match action {
        SourceCommands::Add {
            name,
            location,
            protocol_version,
            trusted,
        } => {
            let location = Url::parse(&location)
                .with_context(|| format!("invalid source location '{location}'"))?;
            let options = SourceOptions {
                location: None,
                protocol_version: parse_protocol(protocol_version)?,
            };
            provider.register_source(&name, location, &options, trusted)?;
            println!("registered source '{name}'");
        }
        SourceCommands::Remove { name } => {
            let removed = provider.unregister_source(&name)?;
            println!("removed source '{}' ({})", removed.name, removed.location);
        }
        SourceCommands::Set {
            name,
            location,
            protocol_version,
        } => {
            let location = location
                .map(|raw| {
                    Url::parse(&raw).with_context(|| format!("invalid source location '{raw}'"))
                })
                .transpose()?;
            let options = SourceOptions {
                location,
                protocol_version: parse_protocol(protocol_version)?,
            };
            provider.set_source(&name, &options)?;
            println!("updated source '{name}'");
        }
        SourceCommands::Enable { name } => {
            provider.set_source_enabled(&name, true)?;
            println!("enabled source '{name}'");
        }
        SourceCommands::Disable { name } => {
            provider.set_source_enabled(&name, false)?;
            println!("disabled source '{name}'");
        }
        SourceCommands::List => {
            println!("{}", output::sources_table(provider.sources()));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_protocol(raw: Option<u32>) -> anyhow::Result<Option<ProtocolVersion>> {
    raw.map(|value| {
        ProtocolVersion::try_from(value)
            .with_context(|| format!("unsupported protocol version {value}"))
    })
    .transpose()
}

fn sources_filter(sources: &[String]) -> Option<&[String]> {
    if sources.is_empty() {
        None
    } else {
        Some(sources)
    }
}
