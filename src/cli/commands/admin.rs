//! `innkeeper admin` command - Back-office review of registrations

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::api::ApiClient;
use crate::cli::helpers::{connect, print_structured, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{ApprovalStatus, Config};
use crate::entities::admin::{ApprovalDecision, DashboardSummary, PendingBusiness};

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Show headline counters
    Dashboard,

    /// List registrations waiting for approval
    Pending,

    /// Approve one or more pending registrations
    Approve(ApproveArgs),

    /// Reject one or more pending registrations
    Reject(RejectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ApproveArgs {
    /// Business ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct RejectArgs {
    /// Business ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Reason sent to the owner (prompted for if omitted)
    #[arg(long, short = 'r')]
    pub reason: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: AdminCommands, global: &GlobalOpts) -> Result<()> {
    let client = admin_client()?;
    match cmd {
        AdminCommands::Dashboard => run_dashboard(&client, global),
        AdminCommands::Pending => run_pending(&client, global),
        AdminCommands::Approve(args) => {
            let decisions = args.ids.iter().map(ApprovalDecision::approve).collect();
            decide(&client, decisions, args.yes, global)
        }
        AdminCommands::Reject(args) => {
            let reason = match args.reason {
                Some(reason) if !reason.trim().is_empty() => reason,
                _ => Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt("Reason for rejection")
                    .interact_text()
                    .into_diagnostic()?,
            };
            let decisions = args
                .ids
                .iter()
                .map(|id| ApprovalDecision::reject(id, reason.clone()))
                .collect();
            decide(&client, decisions, args.yes, global)
        }
    }
}

/// Connected client whose session belongs to an admin
fn admin_client() -> Result<ApiClient> {
    let client = connect(&Config::load())?;
    match client.session().user() {
        None => Err(miette::miette!(
            help = "Run `innkeeper login` with an admin account",
            "You must be logged in"
        )),
        Some(user) if !user.is_admin() => Err(miette::miette!(
            "{} is not an admin account",
            user.email
        )),
        Some(_) => Ok(client),
    }
}

fn run_dashboard(client: &ApiClient, global: &GlobalOpts) -> Result<()> {
    let summary = client.dashboard()?;
    if print_structured(global.format, &summary)? {
        return Ok(());
    }

    let rows = dashboard_rows(&summary);
    if global.format == OutputFormat::Tsv {
        for (label, value) in rows {
            println!("{}\t{}", label, value);
        }
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Count"]);
    for (label, value) in &rows {
        builder.push_record([*label, value.as_str()]);
    }
    print_table(builder, global.format);
    Ok(())
}

fn dashboard_rows(summary: &DashboardSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Businesses", summary.total_businesses.to_string()),
        ("Pending approvals", summary.pending_approvals.to_string()),
        ("Users", summary.total_users.to_string()),
        ("Bookings", summary.total_bookings.to_string()),
        ("Transactions", summary.total_transactions.to_string()),
    ]
}

fn run_pending(client: &ApiClient, global: &GlobalOpts) -> Result<()> {
    let pending = client.pending_businesses()?;
    if print_structured(global.format, &pending)? {
        return Ok(());
    }

    if pending.is_empty() {
        if !global.quiet {
            println!("{} Nothing waiting for approval", style("✓").green());
        }
        return Ok(());
    }

    if global.format == OutputFormat::Tsv {
        for b in &pending {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                b.id, b.name, b.business_type, b.owner_email, b.submitted_at
            );
        }
        return Ok(());
    }

    print_table(pending_table(&pending), global.format);
    if !global.quiet {
        println!(
            "\n{} registration(s) pending. Use {} or {}.",
            style(pending.len()).cyan(),
            style("innkeeper admin approve <ID>").yellow(),
            style("innkeeper admin reject <ID>").yellow()
        );
    }
    Ok(())
}

fn pending_table(pending: &[PendingBusiness]) -> Builder {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Type", "Owner", "Submitted"]);
    for b in pending {
        builder.push_record([
            b.id.clone(),
            truncate_str(&b.name, 32),
            b.business_type.clone(),
            b.owner_email.clone(),
            b.submitted_at.clone(),
        ]);
    }
    builder
}

fn print_table(builder: Builder, format: OutputFormat) {
    let mut table = builder.build();
    if format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);
}

fn decide(
    client: &ApiClient,
    decisions: Vec<ApprovalDecision>,
    yes: bool,
    global: &GlobalOpts,
) -> Result<()> {
    let Some(first) = decisions.first() else {
        return Ok(());
    };
    let verb = if first.status == ApprovalStatus::Rejected {
        "Reject"
    } else {
        "Approve"
    };

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} {} registration(s)?", verb, decisions.len()))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    let mut failed = 0;
    for decision in &decisions {
        match client.decide(decision) {
            Ok(message) => {
                if !global.quiet {
                    println!("{} {}", style("✓").green(), message);
                }
            }
            Err(e) if e.requires_login() => return Err(e.into()),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", style("✗").red(), decision.business_id, e);
            }
        }
    }

    if failed > 0 {
        Err(miette::miette!("{} of {} decision(s) failed", failed, decisions.len()))
    } else {
        Ok(())
    }
}
