use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::translation::core::LogEntry;
use crate::translation::{DocumentReport, DocumentTranslator};

// @module: Application controller for XLIFF translation

/// Name of the file collecting per-document fallbacks
pub const ISSUES_LOG_FILE: &str = "xlifftr.issues.log";

/// Outcome of a run over one or more documents
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Output documents written
    pub written: Vec<PathBuf>,
    /// Outputs skipped because they already existed
    pub skipped: usize,
    /// Documents (per language) that could not be translated
    pub failed: usize,
    /// Reports of the written documents
    pub reports: Vec<DocumentReport>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared translator; its cache spans every file and language
    translator: DocumentTranslator,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let translator = DocumentTranslator::from_config(&config)?;
        Ok(Self { config, translator })
    }

    /// Create a controller around an existing translator
    pub fn with_translator(config: Config, translator: DocumentTranslator) -> Self {
        Self { config, translator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one document into every configured target language
    ///
    /// Outputs go next to the input unless `output_dir` is given.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<RunSummary> {
        let multi_progress = MultiProgress::new();
        let start_time = Instant::now();

        if FileManager::detect_file_type(&input_file)? == FileType::Unknown {
            warn!("{:?} does not look like an XLIFF document, trying anyway", input_file);
        }

        let output_dir = output_dir.unwrap_or_else(|| parent_dir(&input_file));
        let mut summary = RunSummary::default();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite, &mut summary)
            .await?;

        if summary.failed > 0 {
            return Err(anyhow!(
                "Translation of {:?} failed for {} language(s)",
                input_file,
                summary.failed
            ));
        }

        info!(
            "Translation completed in {}.",
            Self::format_duration(start_time.elapsed())
        );
        Ok(summary)
    }

    /// Translate one document into each target language, recording results
    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let input = FileManager::read_bytes(input_file)?;
        FileManager::ensure_dir(output_dir)?;

        for target_language in &self.config.target_languages {
            let output_path = FileManager::generate_output_path(input_file, output_dir, target_language);
            if output_path.exists() && !force_overwrite {
                warn!(
                    "Skipping {}, translation already exists (use -f to force overwrite)",
                    output_path.display()
                );
                summary.skipped += 1;
                continue;
            }

            match self
                .translate_with_progress(&input, target_language, multi_progress)
                .await
            {
                Ok((bytes, report)) => {
                    FileManager::write_bytes(&output_path, &bytes)?;
                    info!("{}", report.summary());
                    if report.has_issues() {
                        self.report_issues(&report.issues, output_dir, input_file, target_language);
                    }
                    info!("Success: {}", output_path.display());
                    summary.written.push(output_path);
                    summary.reports.push(report);
                }
                Err(e) => {
                    error!("Failed to translate {:?} into {}: {:#}", input_file, target_language, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(())
    }

    /// Translate one document with a segment progress bar
    async fn translate_with_progress(
        &self,
        input: &[u8],
        target_language: &str,
        multi_progress: &MultiProgress,
    ) -> Result<(Vec<u8>, DocumentReport)> {
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message(format!("Translating to {}", target_language));

        info!(
            "xlifftr: {} {} -> {}",
            self.config.translation.provider.display_name(),
            self.config.source_language,
            target_language
        );

        let pb = progress_bar.clone();
        let result = self
            .translator
            .translate_bytes(input, target_language, move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;

        // Cleared so only the folder bar stays visible in batch runs
        progress_bar.finish_and_clear();
        result
    }

    /// Log fallbacks and append them to the issues log beside the output
    fn report_issues(&self, issues: &[LogEntry], output_dir: &Path, input_file: &Path, target_language: &str) {
        info!("Translation completed with {} issue(s).", issues.len());

        if log::max_level() >= log::LevelFilter::Debug {
            for issue in issues {
                debug!("{}", issue.message);
            }
        }

        let log_file_path = output_dir.join(ISSUES_LOG_FILE);
        let context = format!(
            "{} -> {} via {}",
            input_file.display(),
            target_language,
            self.config.translation.provider.display_name()
        );
        match Self::write_logs_to_file(issues, &log_file_path, &context) {
            Ok(()) => info!("Issues written to {}", log_file_path.display()),
            Err(e) => warn!("Failed to write issues to file: {}", e),
        }
    }

    /// Append a block of log entries to a log file
    pub fn write_logs_to_file(logs: &[LogEntry], file_path: &Path, context: &str) -> Result<()> {
        FileManager::append_to_log_file(file_path, &format!("Context: {}", context))?;
        for entry in logs {
            FileManager::append_to_log_file(file_path, &format!("[{}] {}", entry.level, entry.message))
                .with_context(|| format!("Failed to write issues log: {:?}", file_path))?;
        }
        Ok(())
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Translate every XLIFF document below a directory
    ///
    /// Files that look like earlier outputs (`name.<lang>.xlf`) are not
    /// treated as inputs.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files: Vec<PathBuf> = FileManager::find_xliff_files(&input_dir)?
            .into_iter()
            .filter(|path| !FileManager::is_generated_output(path, &self.config.target_languages))
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No XLIFF files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = RunSummary::default();
        let mut error_count = 0;

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            // Keep the folder layout when writing elsewhere
            let target_dir = match &output_dir {
                Some(root) => {
                    let relative = parent_dir(file)
                        .strip_prefix(&input_dir)
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    root.join(relative)
                }
                None => parent_dir(file),
            };

            if let Err(e) = self
                .run_with_progress(file, &target_dir, &multi_progress, force_overwrite, &mut summary)
                .await
            {
                error!("Error processing file {}: {:#}", file_name, e);
                error_count += 1;
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let summary_message = format!(
            "Folder processing completed: {} written, {} skipped, {} failed",
            summary.written.len(),
            summary.skipped,
            summary.failed + error_count
        );
        info!("{}", summary_message);

        // The input tree is only touched when outputs go next to the inputs
        let log_dir = output_dir.as_deref().unwrap_or(input_dir.as_path());
        if let Err(e) = FileManager::ensure_dir(log_dir) {
            warn!("Failed to create folder log directory: {}", e);
        }
        let log_file_path = log_dir.join(ISSUES_LOG_FILE);
        let folder_log = vec![LogEntry::info(format!(
            "{} - Duration: {}",
            summary_message,
            Self::format_duration(start_time.elapsed())
        ))];
        if let Err(e) = Self::write_logs_to_file(
            &folder_log,
            &log_file_path,
            &format!("Folder Processing: {}", input_dir.display()),
        ) {
            warn!("Failed to write folder logs to file: {}", e);
        }

        summary.failed += error_count;
        Ok(summary)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
