//! Command handlers for the CLI.
//!
//! Each handler runs one pipeline stage directly against the configured
//! ledger. Ctrl-C cancels the run; rows already written stay in the ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use vgate_collab::{Guarded, ServiceCollaborator};
use vgate_core::{AppConfig, NichesFile, RepurposedContent};
use vgate_pipeline::{niche_for_day, plan_week, CsvLedger, LedgerHandle, Pipeline, PipelineSettings};

pub(crate) struct Context {
    pipeline: Pipeline<ServiceCollaborator>,
    niches: NichesFile,
    cancel: CancellationToken,
}

impl Context {
    /// Build the pipeline from configuration. Must be called inside the runtime.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let niches = vgate_core::load_niches(&config.niches_path)?;
        let collab = ServiceCollaborator::from_config(config)?;
        let guarded = Arc::new(Guarded::new(
            collab,
            Duration::from_secs(config.collab_timeout_secs),
        ));
        let settings = PipelineSettings::from_config(config);
        let ledger = LedgerHandle::spawn(
            CsvLedger::new(config.ledger_path.clone()),
            settings.threshold,
        );

        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received; finishing in-flight work");
                    cancel.cancel();
                }
            }
        });

        Ok(Self {
            pipeline: Pipeline::new(guarded, ledger, settings),
            niches,
            cancel,
        })
    }

    fn todays_niche(&self) -> anyhow::Result<String> {
        niche_for_day(&self.niches, Utc::now().date_naive())
            .map(|n| n.name.clone())
            .ok_or_else(|| anyhow::anyhow!("niche catalogue is empty"))
    }
}

fn print_variants(variants: &[RepurposedContent], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(variants)?);
        return Ok(());
    }
    for v in variants {
        println!(
            "{:<10} q={:.3} views={:<7} eng={:.4} rev={:<8.2} {}",
            v.channel.as_str(),
            v.quality_score,
            v.metrics.views,
            v.metrics.engagement_rate,
            v.metrics.revenue,
            v.title
        );
    }
    Ok(())
}

pub(crate) async fn run_generate(
    ctx: &Context,
    niche: Option<&str>,
    channels: Option<usize>,
    ideas: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let niche = match niche {
        Some(n) => n.to_string(),
        None => ctx.todays_niche()?,
    };

    let variants = if let Some(channel_count) = channels {
        ctx.pipeline
            .manual_generate(&niche, channel_count, &ctx.cancel)
            .await?
    } else {
        let settings = ctx.pipeline.settings();
        let report = ctx
            .pipeline
            .generate(
                &niche,
                ideas.unwrap_or(settings.ideas_per_run),
                &settings.channels,
                &ctx.cancel,
            )
            .await?;
        eprintln!("{report}");
        report.variants
    };

    print_variants(&variants, json)
}

pub(crate) async fn run_track(ctx: &Context) -> anyhow::Result<()> {
    let report = ctx.pipeline.track(Utc::now(), &ctx.cancel).await?;
    println!("{report}");
    Ok(())
}

pub(crate) fn run_plan(ctx: &Context, start: Option<NaiveDate>) -> anyhow::Result<()> {
    let start = start.unwrap_or_else(|| Utc::now().date_naive());
    let plan = plan_week(&ctx.niches, start);
    for day in &plan.days {
        println!(
            "{} {} {:<28} {}",
            day.date,
            day.date.format("%a"),
            day.niche,
            day.keywords.join(", ")
        );
    }
    Ok(())
}

pub(crate) async fn run_analyze(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let summary = ctx.pipeline.analyze(Utc::now()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} .. {}",
        summary.window_start.format("%Y-%m-%d %H:%M"),
        summary.window_end.format("%Y-%m-%d %H:%M")
    );
    println!("{summary}");
    println!("mean engagement {:.4}", summary.mean_engagement);
    for channel in &summary.channels {
        println!(
            "  {:<10} rows={:<4} views={:<8} revenue={:.2}",
            channel.channel.as_str(),
            channel.rows,
            channel.views,
            channel.revenue
        );
    }
    if let Some(top) = &summary.top_content {
        println!("top: {} ({:.2}) {}", top.title, top.revenue, top.content_id);
    }
    Ok(())
}
