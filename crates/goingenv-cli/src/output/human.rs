//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::ProjectStatus;
use anyhow::Result;
use console::style;
use console::Term;
use goingenv_core::util::format_size;
use goingenv_core::FileRecord;
use goingenv_core::FileStats;
use goingenv_core::Manifest;
use goingenv_core::Mismatch;
use goingenv_core::UnpackReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn bullet(&self, text: &str) {
        self.line(&format!("  - {text}"));
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_scan_result(&self, records: &[FileRecord], stats: &FileStats) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!("Found {} environment files:", records.len()));
        for record in records {
            if self.verbose {
                self.bullet(&format!(
                    "{} ({}) - {} - {}...",
                    record.relative_path,
                    format_size(record.size),
                    record.mod_time.format("%Y-%m-%d %H:%M:%S"),
                    &record.checksum[..8.min(record.checksum.len())],
                ));
            } else {
                self.bullet(&format!(
                    "{} ({})",
                    record.relative_path,
                    format_size(record.size)
                ));
            }
        }
        self.line(&format!("Total size: {}", format_size(stats.total_size)));

        Ok(())
    }

    fn format_pack_result(
        &self,
        output_path: &Path,
        file_count: usize,
        total_size: u64,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Packed {} files to {}",
                style("✓").green().bold(),
                file_count,
                output_path.display()
            ));
        } else {
            self.line(&format!(
                "Packed {} files to {}",
                file_count,
                output_path.display()
            ));
        }
        self.line(&format!("  Logical size: {}", format_size(total_size)));

        Ok(())
    }

    fn format_unpack_result(
        &self,
        report: &UnpackReport,
        mismatches: Option<&[Mismatch]>,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Extracted {} files",
                style("✓").green().bold(),
                report.extracted.len()
            ));
        } else {
            self.line(&format!("Extracted {} files", report.extracted.len()));
        }

        if self.verbose {
            for name in &report.extracted {
                self.bullet(name);
            }
        }

        for name in &report.skipped_existing {
            self.format_warning(&format!("skipped existing file: {name}"));
        }
        if report.filtered > 0 {
            self.line(&format!(
                "  {} files excluded by filters",
                report.filtered
            ));
        }

        match mismatches {
            Some([]) => self.format_success("All checksums verified"),
            Some(mismatches) => {
                self.format_warning("Verification found mismatches:");
                for mismatch in mismatches {
                    self.bullet(&mismatch.to_string());
                }
            }
            None => {}
        }

        Ok(())
    }

    fn format_manifest(&self, archive_path: &Path, manifest: &Manifest, long: bool) -> Result<()> {
        self.line(&format!("Archive: {}", archive_path.display()));
        self.line(&format!(
            "Created: {}",
            manifest.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if !manifest.description.is_empty() {
            self.line(&format!("Description: {}", manifest.description));
        }
        self.line(&format!("Version: {}", manifest.version));
        self.line(&format!(
            "Files: {} ({})",
            manifest.files.len(),
            format_size(manifest.total_size)
        ));

        for file in &manifest.files {
            if long {
                self.bullet(&format!(
                    "{} ({}) - {} - {}...",
                    file.relative_path,
                    format_size(file.size),
                    file.mod_time.format("%Y-%m-%d %H:%M:%S"),
                    &file.checksum[..8.min(file.checksum.len())],
                ));
            } else {
                self.bullet(&file.relative_path);
            }
        }

        Ok(())
    }

    fn format_status(&self, status: &ProjectStatus) -> Result<()> {
        if status.initialized {
            self.format_success("Project is initialized");
        } else {
            self.format_warning("Project is not initialized (run 'goingenv init')");
        }

        let stats: &FileStats = &status.stats;
        self.line(&format!(
            "Detected {} environment files ({})",
            stats.total_files,
            format_size(stats.total_size)
        ));
        for (category, count) in &stats.by_category {
            self.bullet(&format!("{category}: {count}"));
        }

        if self.verbose {
            for record in &status.records {
                self.bullet(&format!(
                    "{} ({})",
                    record.relative_path,
                    format_size(record.size)
                ));
            }
        }

        if status.archives.is_empty() {
            self.line("No archives in the store directory");
        } else {
            self.line(&format!("Archives ({}):", status.archives.len()));
            for archive in &status.archives {
                self.bullet(&archive.display().to_string());
            }
        }

        Ok(())
    }

    fn format_success(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            self.line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }

    fn format_note(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(message);
    }
}
