use anyhow::{bail, Context, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::detect::ShotAnnotator;
use crate::export::{self, BucketRow};
use crate::overlay;
use crate::preview;
use crate::reconcile;
use crate::shots::ShotList;
use crate::store::{self, DataStore};

/// The workflow entry points behind the CLI actions.
///
/// Each action runs to completion or fails the whole invocation; files are
/// written only after the step that produces them has fully succeeded.
pub struct App {
    store: DataStore,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = DataStore::new(config.output.data_dir.clone());
        Self { store, config }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Run remote shot-change detection and persist the original shot list.
    pub async fn detect(
        &self,
        annotator: &dyn ShotAnnotator,
        uri: &str,
        model: Option<&str>,
    ) -> Result<PathBuf> {
        let model = model.unwrap_or(&self.config.detection.default_model);

        info!("🎬 Shot change detection starting on URI: {}", uri);
        info!("Using model: {}", model);

        let spans = annotator.annotate(uri, model).await?;
        let list = ShotList::from_annotations(uri, model, &spans);

        self.store.ensure_folder(uri).await?;
        let path = self.store.original_path(uri, model);
        list.save(&path).await?;

        info!("✅ Detection completed!");
        info!("Data written to '{}'", path.display());
        Ok(path)
    }

    /// Generate overlay documents for every original under the URI folder.
    ///
    /// An existing overlay is only replaced after the human confirms;
    /// declining skips that file and keeps their edits.
    pub async fn generate_overlays(&self, uri: &str) -> Result<Vec<PathBuf>> {
        let originals = self.originals_or_fail(uri)?;
        let mut written = Vec::new();

        for original in originals {
            let model_escaped = store::model_stem(&original, "original_")
                .with_context(|| format!("unexpected file name {}", original.display()))?;
            let overlay_path = self.store.overlay_path(uri, &model_escaped);

            if overlay_path.exists() {
                info!(
                    "An OVERLAY file '{}' already exists.",
                    overlay_path.display()
                );
                if !confirm("Overwrite with newly generated OVERLAY file? [y/N] > ")? {
                    continue;
                }
            }

            info!(
                "Generating OVERLAY for '{}'...",
                store::unescape_model(&model_escaped)
            );
            let list = ShotList::load(&original).await?;
            fs::write(&overlay_path, overlay::render(&list))
                .await
                .with_context(|| format!("failed to write overlay {}", overlay_path.display()))?;
            written.push(overlay_path);
        }

        Ok(written)
    }

    /// Reconcile every overlay against its original and persist the
    /// corrected shot lists.
    ///
    /// Each corrected file is written only after its reconciliation fully
    /// succeeded; a failure aborts the invocation without touching files
    /// already written.
    pub async fn apply_overlays(&self, uri: &str) -> Result<Vec<PathBuf>> {
        let originals = self.originals_or_fail(uri)?;
        let mut written = Vec::new();

        for original in originals {
            let model_escaped = store::model_stem(&original, "original_")
                .with_context(|| format!("unexpected file name {}", original.display()))?;
            let overlay_path = self.store.overlay_path(uri, &model_escaped);
            let document = fs::read_to_string(&overlay_path)
                .await
                .with_context(|| format!("failed to read overlay {}", overlay_path.display()))?;

            let list = ShotList::load(&original).await?;
            let outcome = reconcile::reconcile(&list.shots, &document)
                .with_context(|| format!("overlay {} failed", overlay_path.display()))?;

            let corrected = list.with_correction(outcome.shots, outcome.provenance);
            let corrected_path = self.store.corrected_path(uri, &model_escaped);
            corrected.save(&corrected_path).await?;
            written.push(corrected_path);
        }

        Ok(written)
    }

    /// Interactive correction pass: generate overlays, hand off to the
    /// human, then reconcile once they signal completion.
    pub async fn correct(&self, uri: &str) -> Result<()> {
        self.generate_overlays(uri).await?;

        open_folder(&self.store.folder_for(uri)).await;
        println!("\nEdit the OVERLAY file(s) and save it");
        wait_for_enter("After editing, press enter here to continue...")?;

        self.apply_overlays(uri).await?;
        info!("✅ Corrected file(s) was saved!");
        Ok(())
    }

    /// Generate ASS subtitle previews from corrected lists, falling back
    /// to the originals when no correction pass has run yet.
    pub async fn preview(&self, uri: &str) -> Result<Vec<PathBuf>> {
        let files = self.corrected_or_originals(uri)?;
        let mut written = Vec::new();

        for (file, model_escaped) in files {
            let list = ShotList::load(&file).await?;
            let sub_path = self.store.preview_path(uri, &model_escaped);
            fs::write(&sub_path, preview::render(&list))
                .await
                .with_context(|| format!("failed to write preview {}", sub_path.display()))?;

            info!(
                "Preview subtitle successfully exported for '{}'",
                sub_path.display()
            );
            written.push(sub_path);
        }

        open_folder(&self.store.folder_for(uri)).await;
        Ok(written)
    }

    /// Export per-bucket shot counts for every shot list under the URI.
    pub async fn export(&self, uri: &str, duration: f64, buckets: usize) -> Result<PathBuf> {
        let files = self.corrected_or_originals(uri)?;
        let mut rows = Vec::new();

        for (file, _) in files {
            let list = ShotList::load(&file).await?;
            rows.push(BucketRow::for_list(&list, duration, buckets));
        }

        let csv_path = self.store.export_path(uri);
        fs::write(&csv_path, export::render_csv(&rows, buckets))
            .await
            .with_context(|| format!("failed to write export {}", csv_path.display()))?;

        info!("📊 Bucket statistics written to '{}'", csv_path.display());
        Ok(csv_path)
    }

    fn originals_or_fail(&self, uri: &str) -> Result<Vec<PathBuf>> {
        let folder = self.store.folder_for(uri);
        if !folder.exists() {
            bail!(
                "No shot change detection data found for this URI!\n\
                 Please run the detection function for this video first if you haven't done it."
            );
        }

        let originals = self.store.find_lists(uri, "original_");
        if originals.is_empty() {
            bail!(
                "No shot change detection data found for this URI!\n\
                 Please run the detection function for this video first if you haven't done it."
            );
        }
        Ok(originals)
    }

    /// Corrected lists win over originals; each entry carries its escaped
    /// model name for derived file naming.
    fn corrected_or_originals(&self, uri: &str) -> Result<Vec<(PathBuf, String)>> {
        let folder = self.store.folder_for(uri);
        if !folder.exists() {
            bail!(
                "No shot change detection data found for this URI!\n\
                 Please run the detection function for this video first if you haven't done it."
            );
        }

        let corrected = self.store.find_lists(uri, "corrected_");
        let (files, prefix) = if corrected.is_empty() {
            (self.store.find_lists(uri, "original_"), "original_")
        } else {
            (corrected, "corrected_")
        };
        if files.is_empty() {
            bail!(
                "No shot change detection data found for this URI!\n\
                 Please run the detection function for this video first if you haven't done it."
            );
        }

        files
            .into_iter()
            .map(|file| {
                let stem = store::model_stem(&file, prefix)
                    .with_context(|| format!("unexpected file name {}", file.display()))?;
                Ok((file, stem))
            })
            .collect()
    }
}

/// Ask a yes/no question on the terminal; anything but `y` declines.
fn confirm(question: &str) -> Result<bool> {
    print!("{}", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Block until the human presses enter.
fn wait_for_enter(message: &str) -> Result<()> {
    println!("{}", message);
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(())
}

/// Best-effort open of the data folder in the platform file manager.
async fn open_folder(folder: &Path) {
    let command = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    match tokio::process::Command::new(command)
        .arg(folder)
        .status()
        .await
    {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("file manager exited with {}", status),
        Err(e) => warn!("could not open '{}': {}", folder.display(), e),
    }
}
