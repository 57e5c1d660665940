//! The `run` command: one discovery job from the command line.
//!
//! Creators are printed to stdout as JSON lines as soon as they leave
//! enrichment (or all at once when sorting), followed by one report line.
//! A job whose status is `error` exits non-zero after printing its report.

use std::cmp::Ordering;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use scout_adapters::AdapterRegistry;
use scout_core::{AppConfig, EnrichedCreator, KeywordSet, Platform, TargetTier};
use scout_pipeline::{
    expand_keywords, JobOutput, JobRequest, ParallelPipeline, PipelineConfig,
    SequentialPipeline, TemplateExpander,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Stream in the order creators finish enrichment
    Found,
    /// Newest content first, then average engagement
    Recency,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Platform to search (tiktok, instagram, youtube)
    #[arg(long)]
    pub platform: Platform,

    /// Search keyword; repeat for several
    #[arg(long = "keyword", required = true)]
    pub keywords: Vec<String>,

    /// Treat the first keyword as a seed and add related keywords
    #[arg(long)]
    pub expand: bool,

    /// Number of creators to find: 100, 500 or 1000
    #[arg(long, default_value = "100")]
    pub target: TargetTier,

    /// Skip bio lookups
    #[arg(long)]
    pub no_enrichment: bool,

    /// Fetch keywords one at a time instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    #[arg(long, value_enum, default_value_t = SortOrder::Found)]
    pub sort: SortOrder,
}

pub(crate) async fn build_keywords(
    args: &RunArgs,
    max_keywords: usize,
) -> anyhow::Result<KeywordSet> {
    if args.expand {
        let seed = args.keywords.first().map(String::as_str).unwrap_or_default();
        let expanded = expand_keywords(&TemplateExpander::default(), seed, max_keywords).await?;
        // Explicit extra keywords still count against the cap after the seed's expansions.
        let merged = expanded
            .iter()
            .map(str::to_owned)
            .chain(args.keywords.iter().skip(1).cloned());
        return Ok(KeywordSet::new(merged, max_keywords)?);
    }
    Ok(KeywordSet::new(&args.keywords, max_keywords)?)
}

/// Newest content first; ties (including creators without dated content)
/// broken by average engagement.
pub(crate) fn sort_by_recency(creators: &mut [EnrichedCreator], now: DateTime<Utc>) {
    creators.sort_by(|a, b| {
        b.summary
            .recency_score(now)
            .partial_cmp(&a.summary.recency_score(now))
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.summary
                    .average_engagement()
                    .cmp(&a.summary.average_engagement())
            })
    });
}

fn print_creator(job_id: Uuid, creator: &EnrichedCreator) -> anyhow::Result<()> {
    let line = json!({ "type": "creator", "job_id": job_id, "creator": creator });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

pub(crate) async fn run_job(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    if !config.enabled_platforms.contains(&args.platform) {
        anyhow::bail!(
            "platform {} is not enabled (SCOUT_ENABLED_PLATFORMS)",
            args.platform
        );
    }

    let registry = AdapterRegistry::from_config(config).context("failed to build adapters")?;
    let keywords = build_keywords(&args, config.max_keywords).await?;
    let request = JobRequest::new(args.platform, keywords, args.target.results())
        .with_bio_enrichment(config.enable_bio_enrichment && !args.no_enrichment);
    let pipeline_config = PipelineConfig::from(config);

    let job_id = Uuid::new_v4();
    let span = tracing::info_span!("job", %job_id, platform = %args.platform);

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let output = async {
        info!(
            keywords = ?request.keywords.as_slice(),
            target = request.target_results,
            "job accepted"
        );
        if args.sequential {
            SequentialPipeline::new(registry, pipeline_config)
                .run_with_cancel(request, cancel)
                .await
                .map_err(anyhow::Error::from)
        } else {
            stream_parallel(registry, pipeline_config, request, cancel, job_id, args.sort).await
        }
    }
    .instrument(span)
    .await;
    ctrl_c.abort();
    let JobOutput {
        mut creators,
        report,
    } = output?;

    if args.sequential || args.sort == SortOrder::Recency {
        if args.sort == SortOrder::Recency {
            sort_by_recency(&mut creators, Utc::now());
        }
        for creator in &creators {
            print_creator(job_id, creator)?;
        }
    }

    let line = json!({ "type": "report", "job_id": job_id, "report": &report });
    println!("{}", serde_json::to_string(&line)?);

    report.into_result()?;
    Ok(())
}

/// Run the parallel pipeline, printing creators as they arrive unless they
/// must be sorted first. Returns every creator either way.
async fn stream_parallel(
    registry: AdapterRegistry,
    config: PipelineConfig,
    request: JobRequest,
    cancel: CancellationToken,
    job_id: Uuid,
    sort: SortOrder,
) -> anyhow::Result<JobOutput> {
    let mut handle = ParallelPipeline::new(registry, config).spawn_with_cancel(request, cancel)?;

    let mut updates = handle.subscribe();
    let progress_log = tokio::spawn(
        async move {
            let mut last = 0u8;
            while updates.changed().await.is_ok() {
                let p = updates.borrow_and_update().clone();
                if p.percent_complete >= last.saturating_add(10) || p.status.is_terminal() {
                    last = p.percent_complete;
                    info!(
                        percent = p.percent_complete,
                        found = p.creators_found,
                        enriched = p.creators_enriched,
                        keywords_settled = p.keywords_completed + p.keywords_failed,
                        keywords = p.keywords_dispatched,
                        "progress"
                    );
                }
                if p.status.is_terminal() {
                    break;
                }
            }
        }
        .in_current_span(),
    );

    let mut creators = Vec::new();
    while let Some(creator) = handle.next_creator().await {
        if sort == SortOrder::Found {
            print_creator(job_id, &creator)?;
        }
        creators.push(creator);
    }
    let report = handle.finish().await?;
    if let Err(e) = progress_log.await {
        warn!(error = %e, "progress logger failed");
    }
    Ok(JobOutput { creators, report })
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("interrupt received; stopping job and flushing results");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
    }
}
