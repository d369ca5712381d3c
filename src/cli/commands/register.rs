//! `innkeeper register` command - Register a business
//!
//! Runs the step-by-step wizard in the terminal, or submits a YAML draft
//! non-interactively with `--from`. `--dry-run` validates the draft offline
//! and prints the payload that would be sent.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::api::{load_address_hierarchy, load_reference_data, ApiClient};
use crate::cli::commands::address::load_tree;
use crate::cli::helpers::{connect, print_rejections, print_step_errors};
use crate::cli::prompt::{Outcome, WizardPrompt};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, SessionContext, SessionStore};
use crate::entities::address::{AddressHierarchy, ParishSelection};
use crate::entities::image::FileRejection;
use crate::schema::validator::StepValidator;
use crate::wizard::{
    Confirmation, ConfirmationRenderer, Draft, RegistrationWizard, SubmissionAssembler, SubmitError,
};

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Start from (or, with --yes, submit) a YAML draft
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Validate the draft and print the payload without contacting the server
    #[arg(long, requires = "from")]
    pub dry_run: bool,

    /// Address tree JSON used for parish matching in --dry-run
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,

    /// Submit the draft without prompting
    #[arg(long, short = 'y', requires = "from")]
    pub yes: bool,

    /// Save the form as a draft here if the wizard is cancelled
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

pub fn run(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    if args.dry_run {
        return run_dry(&args, global);
    }

    let config = Config::load();
    let client = connect(&config)?;
    let Some(user) = client.session().user() else {
        return Err(miette::miette!(
            help = "Run `innkeeper login` first",
            "You must be logged in to register a business"
        ));
    };

    let reference = load_reference_data(&client);
    let hierarchy = load_address_hierarchy(&client);
    let mut wizard = RegistrationWizard::new(
        StepValidator::new().with_reference(reference),
        hierarchy,
        SubmissionAssembler::new(user.email),
    );

    if let Some(path) = &args.from {
        let rejections = load_into(&mut wizard, path)?;
        if !global.quiet {
            print_rejections(&rejections);
        }
    }

    let confirmation = if args.yes {
        submit_draft(&mut wizard, &client)?
    } else {
        let outcome = WizardPrompt::new(&mut wizard).run(&client)?;
        match outcome {
            Outcome::Submitted(confirmation) => confirmation,
            Outcome::Cancelled => return cancelled(&wizard, args.save.as_deref(), global),
        }
    };

    print_confirmation(&confirmation, global)
}

/// Validate a draft offline and print the payload it would produce
fn run_dry(args: &RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let path = args
        .from
        .as_deref()
        .ok_or_else(|| miette::miette!("--dry-run needs a draft (--from FILE)"))?;
    let config = Config::load();

    let hierarchy = match &args.tree {
        Some(tree) => load_tree(tree)?,
        None => AddressHierarchy::default(),
    };
    let created_by = SessionContext::load(SessionStore::default_location())
        .user()
        .map(|u| u.email)
        .unwrap_or_else(|| config.author());

    let mut wizard = RegistrationWizard::new(
        StepValidator::new(),
        hierarchy,
        SubmissionAssembler::new(created_by),
    );
    let rejections = load_into(&mut wizard, path)?;
    if !global.quiet {
        // stdout carries the payload
        for rejection in &rejections {
            eprintln!("{} {}", style("!").yellow(), rejection.message);
        }
    }

    if let Err((step, errors)) = wizard.advance_to_last() {
        print_step_errors(step, &errors);
        return Err(miette::miette!(
            "Draft {} is incomplete: fix {} before submitting",
            path.display(),
            step.title()
        ));
    }

    let payload = wizard.preview();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload.describe()).into_diagnostic()?
    );
    Ok(())
}

/// Load a draft and re-run parish matching against the wizard's hierarchy
fn load_into(wizard: &mut RegistrationWizard, path: &Path) -> Result<Vec<FileRejection>> {
    let draft = Draft::load(path)?;
    let rejections = wizard.load_draft(&draft);

    let parish = draft.form.address.parish_name.trim().to_string();
    if !parish.is_empty() && !wizard.hierarchy().is_empty() {
        if let ParishSelection::FreeText(_) = wizard.enter_parish(&parish) {
            tracing::info!(parish = %parish, "parish not in the address hierarchy; submitting as free text");
        }
    }
    Ok(rejections)
}

fn submit_draft(wizard: &mut RegistrationWizard, client: &ApiClient) -> Result<Confirmation> {
    if let Err((step, errors)) = wizard.advance_to_last() {
        print_step_errors(step, &errors);
        return Err(miette::miette!("Draft is incomplete: fix {} before submitting", step.title()));
    }
    match wizard.submit(client) {
        Ok(confirmation) => Ok(confirmation),
        Err(SubmitError::Invalid(failing)) => {
            for (step, errors) in &failing {
                print_step_errors(*step, errors);
            }
            Err(SubmitError::Invalid(failing).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cancelled(wizard: &RegistrationWizard, save: Option<&Path>, global: &GlobalOpts) -> Result<()> {
    if let Some(path) = save {
        wizard.to_draft().save(path)?;
        if !global.quiet {
            println!(
                "{} Draft saved to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    } else if !global.quiet {
        println!("{} Registration cancelled", style("!").yellow());
    }
    Ok(())
}

fn print_confirmation(confirmation: &Confirmation, global: &GlobalOpts) -> Result<()> {
    if global.format == OutputFormat::Json {
        let value = json!({
            "businessName": confirmation.business_name,
            "clientReference": confirmation.reference.as_ref().map(|r| r.to_string()),
            "businessId": confirmation.business_id,
            "imageCount": confirmation.image_count,
            "coverImageIndex": confirmation.cover_index,
            "message": confirmation.server_message,
        });
        println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        return Ok(());
    }

    let renderer = ConfirmationRenderer::new().into_diagnostic()?;
    print!("{}", renderer.render(confirmation).into_diagnostic()?);
    Ok(())
}
