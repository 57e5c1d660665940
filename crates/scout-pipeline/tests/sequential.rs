mod support;

use std::sync::Arc;
use std::time::Duration;

use scout_core::Platform;
use scout_pipeline::{JobStatus, PipelineConfig, SequentialPipeline, StopReason};
use support::{assert_unique, config, paged, registry, request, MockAdapter, Script};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn later_keywords_are_skipped_once_target_is_met() {
    let adapter = Arc::new(
        MockAdapter::new(Platform::Tiktok)
            .script("first", Script::Pages(paged(0..50, 25)))
            .script("second", Script::Pages(paged(100..150, 25))),
    );
    let output = SequentialPipeline::new(registry(&adapter), config())
        .run(request(&["first", "second"], 50))
        .await
        .unwrap();

    assert_eq!(output.report.status, JobStatus::Completed);
    assert_eq!(output.creators.len(), 50);
    assert_eq!(adapter.fetches(), 2);
    let second = &output.report.keywords[1];
    assert_eq!(second.pages_fetched, 0);
    assert_eq!(second.stop_reason, StopReason::TargetReached);
    assert!(output
        .creators
        .iter()
        .all(|c| c.summary.matched_keyword == "first"));
}

#[tokio::test]
async fn creators_keep_the_keyword_that_found_them_first() {
    let adapter = Arc::new(
        MockAdapter::new(Platform::Tiktok)
            .script("first", Script::Pages(paged(0..10, 10)))
            .script("second", Script::Pages(paged(5..15, 10))),
    );
    let output = SequentialPipeline::new(registry(&adapter), config())
        .run(request(&["first", "second"], 100))
        .await
        .unwrap();

    assert_unique(&output.creators);
    assert_eq!(output.creators.len(), 15);
    let five = output
        .creators
        .iter()
        .find(|c| c.summary.external_id == "5")
        .unwrap();
    assert_eq!(five.summary.matched_keyword, "first");
}

#[tokio::test]
async fn failed_keyword_does_not_stop_the_rest() {
    let adapter = Arc::new(
        MockAdapter::new(Platform::Tiktok)
            .script("broken", Script::Broken)
            .script("fine", Script::Pages(paged(0..10, 10))),
    );
    let output = SequentialPipeline::new(registry(&adapter), config())
        .run(request(&["broken", "fine"], 100))
        .await
        .unwrap();

    assert_eq!(output.report.status, JobStatus::Partial);
    assert_eq!(output.creators.len(), 10);
    assert!(output.report.keywords[0].failed());
}

#[tokio::test(start_paused = true)]
async fn runtime_cap_skips_remaining_keywords_and_enrichment() {
    let adapter = Arc::new(
        MockAdapter::new(Platform::Tiktok)
            .script("a", Script::Pages(paged(0..20, 10)))
            .script("b", Script::Pages(paged(100..120, 10)))
            .fetch_delay(Duration::from_secs(1)),
    );
    let config = PipelineConfig {
        runtime_cap: Duration::from_millis(2_500),
        ..config()
    };
    let output = SequentialPipeline::new(registry(&adapter), config)
        .run(request(&["a", "b"], 100))
        .await
        .unwrap();

    assert!(output.report.deadline_hit);
    assert_eq!(output.report.status, JobStatus::Partial);
    assert_eq!(output.report.keywords[1].stop_reason, StopReason::Stopped);
    assert_eq!(output.creators.len(), 20);
    assert_eq!(adapter.bios(), 0);
    assert!(output.creators.iter().all(|c| !c.bio_enriched));
}

#[tokio::test]
async fn pre_cancelled_job_fetches_nothing() {
    let adapter = Arc::new(
        MockAdapter::new(Platform::Tiktok).script("a", Script::Pages(paged(0..10, 10))),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();
    let output = SequentialPipeline::new(registry(&adapter), config())
        .run_with_cancel(request(&["a"], 10), cancel)
        .await
        .unwrap();

    assert!(output.report.cancelled);
    assert_eq!(adapter.fetches(), 0);
    assert_eq!(output.report.status, JobStatus::Partial);
    assert!(output.creators.is_empty());
}
