use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use llm_interface::{GenerationRequest, Generator, TextGenerator};
use notifier::{Notification, NotificationChannel, Notifier};
use rand::rngs::StdRng;
use rand::SeedableRng;
use social_client::{ContentSource, FetchWindow, Listener};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use xthreads_agent::{build_sources, Pipeline, SourceMode};
use xthreads_core::{
    AppConfig, ContentFilter, CoreError, Engagement, FileConfig, RawPost, Secrets, SnapshotStore,
    Stage,
};

const COPY: &str = "Struggling to post daily? Batch your writing on Sunday and schedule the week.";

struct FixedSource {
    platform: &'static str,
    posts: Vec<RawPost>,
}

#[async_trait]
impl ContentSource for FixedSource {
    fn platform(&self) -> &str {
        self.platform
    }

    async fn fetch(&self, _window: &FetchWindow) -> Result<Vec<RawPost>, CoreError> {
        Ok(self.posts.clone())
    }
}

struct CannedWriter;

#[async_trait]
impl TextGenerator for CannedWriter {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, CoreError> {
        Ok(COPY.to_string())
    }
}

struct Inbox {
    seen: Arc<Mutex<Vec<Notification>>>,
}

#[async_trait]
impl NotificationChannel for Inbox {
    fn name(&self) -> &str {
        "inbox"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), CoreError> {
        self.seen.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn tweet(id: &str, text: &str, likes: u64) -> RawPost {
    RawPost {
        id: id.to_string(),
        platform: "twitter".to_string(),
        text: text.to_string(),
        title: None,
        author: "founder".to_string(),
        engagement: Engagement {
            likes,
            ..Engagement::default()
        },
        created_at: Utc::now() - Duration::hours(2),
        url: None,
        source: Some("content creation".to_string()),
    }
}

fn config(dir: &TempDir) -> FileConfig {
    let mut config = FileConfig::default();
    config.paths.data_dir = dir.path().join("data");
    config.paths.log_dir = dir.path().join("logs");
    config
}

fn listener(config: &FileConfig, sources: Vec<Box<dyn ContentSource>>) -> Listener {
    let window = FetchWindow::lookback(Utc::now(), &config.scraping);
    sources.into_iter().fold(
        Listener::new(ContentFilter::new(&config.content_filters), window),
        Listener::with_source,
    )
}

fn generator(config: &FileConfig) -> Generator {
    Generator::new(Box::new(CannedWriter), &config.generation)
        .with_retry_delay(std::time::Duration::ZERO)
}

fn live_sources() -> Vec<Box<dyn ContentSource>> {
    vec![Box::new(FixedSource {
        platform: "twitter",
        posts: vec![
            tweet("1", "How do you plan a week of content creation threads?", 10),
            tweet("2", "Building in public: my content creation workflow", 200),
            tweet("3", "Who wins the election this year", 500),
        ],
    })]
}

#[tokio::test]
async fn test_full_run_writes_every_stage() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let notifier = Notifier::new().with_channel(Box::new(Inbox {
        seen: Arc::clone(&seen),
    }));

    let pipeline = Pipeline::from_config(
        &config,
        date(),
        listener(&config, live_sources()),
        generator(&config),
        notifier,
    );
    let output = pipeline.run(&mut StdRng::seed_from_u64(7)).await.unwrap();

    // The political post never reaches analysis.
    assert_eq!(output.trending["twitter"].len(), 2);
    assert_eq!(output.reflection.platform_insights["twitter"].high_performers.len(), 1);

    assert_eq!(output.plans["twitter"].len(), 3);
    assert_eq!(output.plans["reddit"].len(), 1);
    assert!(output.generated.values().flatten().all(|p| p.is_success()));

    let store = pipeline.store();
    for (stage, name) in [
        (Stage::Raw, "twitter"),
        (Stage::Processed, "reflection"),
        (Stage::Plans, "content_plan"),
        (Stage::Generated, "generated_posts"),
    ] {
        assert!(store.path_for(stage, name).exists(), "missing {name} snapshot");
    }
    assert_eq!(output.exported_files.len(), 4);
    assert!(output.exported_files.iter().all(|p| p.exists()));

    let summary = output.summary();
    assert_eq!((summary.successful, summary.total), (4, 4));
    assert_eq!(summary.success_rate(), "100.0%");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], Notification::Completion(s) if s.total == 4));
}

#[tokio::test]
async fn test_same_seed_same_plan() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let mut plans = Vec::new();
    for _ in 0..2 {
        let pipeline = Pipeline::from_config(
            &config,
            date(),
            listener(&config, live_sources()),
            generator(&config),
            Notifier::new(),
        );
        let output = pipeline.run(&mut StdRng::seed_from_u64(42)).await.unwrap();
        plans.push(output.plans);
    }
    assert_eq!(plans[0], plans[1]);
}

#[tokio::test]
async fn test_replay_reads_saved_raw_posts() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let live = Pipeline::from_config(
        &config,
        date(),
        listener(&config, live_sources()),
        generator(&config),
        Notifier::new(),
    );
    let first = live.run(&mut StdRng::seed_from_u64(1)).await.unwrap();

    let app = AppConfig {
        file: config.clone(),
        secrets: Secrets::default(),
    };
    let store = SnapshotStore::new(&config.paths.data_dir, date());
    let sources = build_sources(&app, &store, SourceMode::Replay).unwrap();
    let replay = Pipeline::from_config(
        &config,
        date(),
        listener(&config, sources),
        generator(&config),
        Notifier::new(),
    )
    .with_raw_snapshots(false);
    let second = replay.run(&mut StdRng::seed_from_u64(1)).await.unwrap();

    assert_eq!(second.trending["twitter"], first.trending["twitter"]);
    // No reddit snapshot was ever written, so that platform replays empty.
    assert!(second.trending["reddit"].is_empty());
    assert_eq!(second.plans, first.plans);
}

#[tokio::test]
async fn test_failed_stage_sends_error_notification() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    // a plain file where the data directory should be
    std::fs::write(&config.paths.data_dir, "not a directory").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let notifier = Notifier::new().with_channel(Box::new(Inbox {
        seen: Arc::clone(&seen),
    }));
    let pipeline = Pipeline::from_config(
        &config,
        date(),
        listener(&config, live_sources()),
        generator(&config),
        notifier,
    );

    let err = pipeline
        .run_or_notify(&mut StdRng::seed_from_u64(7))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Io(_)));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], Notification::Error { .. }));
    assert!(!pipeline.store().path_for(Stage::Plans, "content_plan").exists());
}
