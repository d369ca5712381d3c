//! `innkeeper validate` command - Check registration drafts offline

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::commands::address::load_tree;
use crate::cli::helpers::{print_rejections, print_step_errors};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::address::{AddressHierarchy, AddressLevel, ParishSelection};
use crate::entities::image::FileRejection;
use crate::schema::validator::{StepValidator, ValidationErrors};
use crate::wizard::{Draft, WizardStep};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Draft files or directories to validate (default: current directory)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Address tree JSON; warns when a parish is not in it
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

/// Result of checking one draft
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_error: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    errors: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip)]
    steps: Vec<(WizardStep, ValidationErrors)>,
    #[serde(skip)]
    rejections: Vec<FileRejection>,
}

impl FileReport {
    fn error_count(&self) -> usize {
        usize::from(self.load_error.is_some())
            + self.steps.iter().map(|(_, e)| e.len()).sum::<usize>()
            + self.rejections.len()
    }

    fn passed(&self) -> bool {
        self.error_count() == 0
    }
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let validator = StepValidator::new();
    let hierarchy = args.tree.as_deref().map(load_tree).transpose()?;
    let files = expand_paths(&args.paths);

    if files.is_empty() {
        return Err(miette::miette!("No draft files (*.yaml, *.yml) found"));
    }

    let reports: Vec<FileReport> = files
        .iter()
        .map(|path| check_file(path, &validator, hierarchy.as_ref()))
        .collect();

    let mut stats = ValidationStats::default();
    for report in &reports {
        stats.files_checked += 1;
        stats.total_errors += report.error_count();
        stats.total_warnings += report.warnings.len();
        if report.passed() {
            stats.files_passed += 1;
        } else {
            stats.files_failed += 1;
        }
    }

    if global.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports).into_diagnostic()?);
    } else {
        if !global.quiet {
            println!(
                "{} Validating {} draft(s)...\n",
                style("→").blue(),
                files.len()
            );
        }
        for report in &reports {
            print_report(report, args.summary);
        }
        if !global.quiet {
            print_summary(&stats);
        }
    }

    if stats.files_failed > 0 {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        if !global.quiet && global.format != OutputFormat::Json {
            println!("{} All drafts passed validation!", style("✓").green().bold());
        }
        Ok(())
    }
}

fn check_file(path: &Path, validator: &StepValidator, hierarchy: Option<&AddressHierarchy>) -> FileReport {
    let mut report = FileReport {
        path: path.to_path_buf(),
        ..Default::default()
    };

    let draft = match Draft::load(path) {
        Ok(draft) => draft,
        Err(e) => {
            report.load_error = Some(e.to_string());
            return report;
        }
    };

    let (images, rejections) = draft.image_set();
    report.steps = validator.validate_all_by_step(&draft.form, &images);
    report.rejections = rejections;

    for (step, errors) in &report.steps {
        let entry = report.errors.entry(step.key().to_string()).or_default();
        for (field, message) in errors.iter() {
            entry.insert(field.to_string(), message.to_string());
        }
    }
    if !report.rejections.is_empty() {
        let entry = report.errors.entry("files".to_string()).or_default();
        for rejection in &report.rejections {
            entry.insert(rejection.file_name.clone(), rejection.message.clone());
        }
    }

    if let Some(hierarchy) = hierarchy {
        let address = &draft.form.address;
        let parish = address.parish_name.trim();
        let known = if address.parish_is_verified() {
            hierarchy.get(AddressLevel::Parish, &address.parish_id).is_some()
        } else {
            matches!(hierarchy.match_parish_input(parish), ParishSelection::Matched(_))
        };
        if !parish.is_empty() && !known {
            report
                .warnings
                .push(format!("Parish '{}' is not in the address hierarchy", parish));
        }
    }

    report
}

fn print_report(report: &FileReport, summary: bool) {
    if summary {
        return;
    }
    if let Some(error) = &report.load_error {
        println!("{} {} - {}", style("✗").red(), report.path.display(), error);
        return;
    }

    if report.passed() {
        println!("{} {}", style("✓").green(), report.path.display());
    } else {
        println!(
            "{} {} - {} error(s)",
            style("✗").red(),
            report.path.display(),
            report.error_count()
        );
        for (step, errors) in &report.steps {
            print_step_errors(*step, errors);
        }
        print_rejections(&report.rejections);
    }
    for warning in &report.warnings {
        println!("    {}", style(warning).yellow());
    }
}

fn print_summary(stats: &ValidationStats) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    if stats.total_warnings > 0 {
        println!("  Total warnings: {}", style(stats.total_warnings).yellow());
    }
    println!();
}

fn is_draft_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Expand paths - if a directory is given, find all drafts in it, skipping
/// hidden files and directories
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| {
                    let name = e.file_name().to_string_lossy();
                    !name.starts_with('.') || e.depth() == 0
                })
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if is_draft_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if path.exists() {
            files.push(path.clone());
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_paths_skips_hidden_and_other_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("lodge.yaml"), "").unwrap();
        std::fs::write(tmp.path().join("camp.yml"), "").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(tmp.path().join(".backup")).unwrap();
        std::fs::write(tmp.path().join(".backup/old.yaml"), "").unwrap();

        let files = expand_paths(&[tmp.path().to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["camp.yml", "lodge.yaml"]);
    }

    #[test]
    fn test_check_file_reports_unreadable_draft() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.yaml");
        std::fs::write(&path, "business: [unclosed").unwrap();

        let report = check_file(&path, &StepValidator::new(), None);
        assert!(report.load_error.is_some());
        assert!(!report.passed());
    }

    #[test]
    fn test_check_file_groups_errors_by_step() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.yaml");
        std::fs::write(&path, "business:\n  legalName: Lakeside Lodge\n").unwrap();

        let report = check_file(&path, &StepValidator::new(), None);
        assert!(!report.passed());
        assert!(report.errors.contains_key("business"));
        assert!(report.errors.contains_key("images"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_check_file_warns_about_unknown_parish() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("draft.yaml");
        std::fs::write(&path, "address:\n  parishName: Atlantis\n").unwrap();

        let hierarchy = crate::entities::address::tests::sample_hierarchy();
        let report = check_file(&path, &StepValidator::new(), Some(&hierarchy));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Atlantis"));
    }
}
