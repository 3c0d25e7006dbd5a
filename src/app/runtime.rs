use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use archiver_core::{
    ArchiverConfig, CliVideoMuxer, CredentialCache, HttpClient, ListingClient, Materializer,
    OutputLayout, PaginationDriver, PostListOptions, RedgifsClient, RunOptions, Source,
    load_config, run_post_list,
};
use clap::Parser;
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{exit_handler, progress_manager, report, terminal};
use crate::cli::Args;

/// What the process archives this time.
#[derive(Debug)]
pub(crate) enum RunMode {
    PostList(PostListOptions),
    Feeds(RunOptions),
}

impl RunMode {
    fn output_dir<'a>(&'a self, args: &'a Args) -> &'a PathBuf {
        match self {
            Self::PostList(_) => &args.output,
            Self::Feeds(options) => &options.output_dir,
        }
    }
}

pub(crate) async fn run_archiver() -> Result<ProcessExit> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    let default_level = terminal::resolve_default_log_level(&args, config.detailed_logs);
    terminal::init_tracing(default_level, terminal::is_no_color_requested(&args));
    debug!(?args, "CLI arguments parsed");

    config.validate().context("configuration rejected")?;
    let mode = select_mode(&args, &config)?;
    info!("Post archiver starting");

    let listing = ListingClient::new().context("failed to build listing client")?;
    let materializer = Arc::new(build_materializer(
        config,
        mode.output_dir(&args).clone(),
        listing.clone(),
    )?);
    let post_delay = Duration::from_millis(args.delay_ms);

    let summary = match mode {
        RunMode::PostList(options) => {
            run_post_list(listing, materializer, &options, post_delay).await?
        }
        RunMode::Feeds(options) => {
            info!(
                sources = options.sources.len(),
                target = %options.target_label(),
                sort = %options.sort,
                time = %options.window,
                output = %options.output_dir.display(),
                "starting feed run"
            );
            let driver = PaginationDriver::new(listing, materializer, options);
            let use_spinner = terminal::should_use_spinner(
                io::stderr().is_terminal(),
                args.quiet || args.no_progress,
                terminal::is_dumb_terminal(),
            );
            let (handle, stop) =
                progress_manager::spawn_progress_ui(use_spinner, driver.subscribe());
            let result = driver.run().await;
            progress_manager::stop_progress_ui(handle, &stop).await;
            result?
        }
    };

    report::print_run_summary(&summary);
    Ok(exit_handler::determine_exit_outcome(&summary.totals))
}

/// Post list (flag, then config) wins over a preset, which wins over CLI sources.
pub(crate) fn select_mode(args: &Args, config: &ArchiverConfig) -> Result<RunMode> {
    if let Some(path) = &args.post_list {
        return Ok(RunMode::PostList(PostListOptions {
            enabled: true,
            path: path.clone(),
            repeat_forever: args.repeat,
            time_between_runs_ms: args.interval_ms,
        }));
    }
    if config.post_list.enabled {
        return Ok(RunMode::PostList(config.post_list.clone()));
    }

    let mut options = if let Some(preset) = &config.preset {
        info!("Using preset run from config");
        RunOptions::from_preset(preset, args.output.clone())
    } else {
        RunOptions {
            sources: args.sources.iter().map(|s| Source::parse(s)).collect(),
            target: (args.limit > 0).then_some(args.limit),
            sort: args.sort,
            window: args.time,
            repeat_forever: args.repeat,
            time_between_runs: Duration::from_millis(args.interval_ms),
            output_dir: args.output.clone(),
            post_delay: Duration::default(),
        }
    };
    options.post_delay = Duration::from_millis(args.delay_ms);

    if options.sources.is_empty() {
        bail!(
            "no sources given: pass community names (e.g. `rust`) or user feeds (`u/name`), \
             or set a preset in the config file"
        );
    }
    Ok(RunMode::Feeds(options))
}

fn build_materializer(
    config: ArchiverConfig,
    output_dir: PathBuf,
    listing: ListingClient,
) -> Result<Materializer> {
    let layout = OutputLayout::new(output_dir, config.separate_clean_nsfw);
    let downloads = HttpClient::new().context("failed to build download client")?;
    let want_provider = config.download_redgifs_videos;
    let want_streaming = config.download_streaming_videos_experimental;

    let mut materializer = Materializer::new(Arc::new(config), layout, listing, downloads);
    if want_provider {
        let credentials = Arc::new(CredentialCache::default());
        let provider = RedgifsClient::new(credentials).context("failed to build provider client")?;
        materializer = materializer.with_provider(provider);
    }
    if want_streaming {
        match CliVideoMuxer::from_path() {
            Ok(muxer) => materializer = materializer.with_muxer(Arc::new(muxer)),
            Err(e) => warn!(error = %e, "streaming videos will be saved as redirects"),
        }
    }
    Ok(materializer)
}
