use chrono::NaiveDate;
use content_planner::ContentPlanner;
use exporter::Exporter;
use insight_engine::{Reflection, Reflector};
use llm_interface::Generator;
use notifier::{Notification, Notifier, RunSummary};
use rand::Rng;
use social_client::Listener;
use std::path::PathBuf;
use tracing::{error, info};
use xthreads_core::{
    CoreError, FileConfig, GeneratedPost, PlatformPosts, PostPlan, RawPost, SnapshotStore, Stage,
};

/// Everything one run produced, stage by stage.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trending: PlatformPosts<RawPost>,
    pub reflection: Reflection,
    pub plans: PlatformPosts<PostPlan>,
    pub generated: PlatformPosts<GeneratedPost>,
    pub exported_files: Vec<PathBuf>,
}

impl RunOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_posts(&self.generated, self.exported_files.clone())
    }
}

/// Listen, reflect, plan, generate, export and notify, strictly in order.
/// Each stage's output is snapshotted under the data directory before the
/// next stage starts.
pub struct Pipeline {
    listener: Listener,
    reflector: Reflector,
    planner: ContentPlanner,
    generator: Generator,
    exporter: Exporter,
    notifier: Notifier,
    store: SnapshotStore,
    save_raw: bool,
}

impl Pipeline {
    pub fn from_config(
        config: &FileConfig,
        date: NaiveDate,
        listener: Listener,
        generator: Generator,
        notifier: Notifier,
    ) -> Self {
        Self {
            listener,
            reflector: Reflector::from_config(config),
            planner: ContentPlanner::new(config.platforms.clone()),
            generator,
            exporter: Exporter::new(config.paths.export_dir(), date),
            notifier,
            store: SnapshotStore::new(&config.paths.data_dir, date),
            save_raw: true,
        }
    }

    /// Replayed runs read the raw snapshots and must not rewrite them.
    pub fn with_raw_snapshots(mut self, enabled: bool) -> Self {
        self.save_raw = enabled;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Runs every stage; a failing stage sends an error notification through
    /// every channel before the error is returned.
    pub async fn run_or_notify<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<RunOutput, CoreError> {
        match self.run(rng).await {
            Ok(output) => Ok(output),
            Err(e) => {
                error!("❌ Pipeline failed: {}", e);
                self.notifier.notify(&Notification::error(e.to_string())).await;
                Err(e)
            }
        }
    }

    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunOutput, CoreError> {
        info!("🚀 Starting xthreads-agent run for {}", self.store.date());

        info!("🎧 Listening for trending content...");
        let trending = self.listener.scrape_all().await;
        if self.save_raw {
            for (platform, posts) in &trending {
                self.store.save(Stage::Raw, platform, posts)?;
            }
        }
        info!("✅ Scraped content from {} platforms", trending.len());

        info!("🤔 Analyzing content...");
        let reflection = self.reflector.reflect(&trending);
        self.store.save(Stage::Processed, "reflection", &reflection)?;

        info!("📋 Planning content...");
        let plans = self.planner.plan(&reflection, rng);
        self.store.save(Stage::Plans, "content_plan", &plans)?;
        info!("✅ Content plan created for {} platforms", plans.len());

        info!("✍️ Generating posts...");
        let generated = self.generator.generate_all(&plans).await;
        self.store.save(Stage::Generated, "generated_posts", &generated)?;
        info!(
            "✅ Generated {} posts",
            generated.values().map(Vec::len).sum::<usize>()
        );

        info!("📤 Exporting content calendar...");
        let exported_files = self.exporter.export(&generated)?;

        let output = RunOutput {
            trending,
            reflection,
            plans,
            generated,
            exported_files,
        };

        info!("📢 Sending notifications...");
        self.notifier
            .notify(&Notification::Completion(output.summary()))
            .await;

        info!("🎉 Pipeline completed successfully");
        Ok(output)
    }
}
