//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::ProjectStatus;
use anyhow::Result;
use goingenv_core::FileRecord;
use goingenv_core::FileStats;
use goingenv_core::Manifest;
use goingenv_core::Mismatch;
use goingenv_core::UnpackReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_scan_result(&self, records: &[FileRecord], stats: &FileStats) -> Result<()> {
        #[derive(Serialize)]
        struct ScanOutput<'a> {
            files: &'a [FileRecord],
            stats: &'a FileStats,
        }

        let output = JsonOutput::success("scan", ScanOutput { files: records, stats });
        Self::output(&output)
    }

    fn format_pack_result(
        &self,
        output_path: &Path,
        file_count: usize,
        total_size: u64,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct PackOutput<'a> {
            archive: &'a Path,
            file_count: usize,
            total_size: u64,
        }

        let output = JsonOutput::success(
            "pack",
            PackOutput {
                archive: output_path,
                file_count,
                total_size,
            },
        );
        Self::output(&output)
    }

    fn format_unpack_result(
        &self,
        report: &UnpackReport,
        mismatches: Option<&[Mismatch]>,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct UnpackOutput<'a> {
            extracted: &'a [String],
            skipped_existing: &'a [String],
            filtered: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            mismatches: Option<Vec<String>>,
        }

        let output = JsonOutput::success(
            "unpack",
            UnpackOutput {
                extracted: &report.extracted,
                skipped_existing: &report.skipped_existing,
                filtered: report.filtered,
                mismatches: mismatches
                    .map(|items| items.iter().map(ToString::to_string).collect()),
            },
        );
        Self::output(&output)
    }

    fn format_manifest(&self, archive_path: &Path, manifest: &Manifest, _long: bool) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput<'a> {
            archive: &'a Path,
            manifest: &'a Manifest,
        }

        let output = JsonOutput::success(
            "list",
            ListOutput {
                archive: archive_path,
                manifest,
            },
        );
        Self::output(&output)
    }

    fn format_status(&self, status: &ProjectStatus) -> Result<()> {
        let output = JsonOutput::success("status", status);
        Self::output(&output)
    }

    fn format_success(&self, message: &str) {
        #[derive(Serialize)]
        struct MessageData<'a> {
            message: &'a str,
        }

        let output = JsonOutput::success("message", MessageData { message });
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        let output = JsonOutput {
            operation: "warning".to_string(),
            status: super::formatter::Status::Warning,
            data: Some(WarningData { message }),
        };
        let _ = Self::output(&output);
    }

    fn format_note(&self, _message: &str) {
        // Informational chatter has no place in machine-readable output.
    }
}
