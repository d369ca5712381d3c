//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    address::AddressCommands,
    admin::AdminCommands,
    auth::LoginArgs,
    completions::CompletionsArgs,
    config::ConfigCommands,
    register::RegisterArgs,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "innkeeper")]
#[command(author, version, about = "Business onboarding for the hospitality marketplace")]
#[command(long_about = "Register a hotel, lodge or guest house with the marketplace through a step-by-step wizard, \
validate registration drafts offline, and work the admin approval queue.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a business (interactive wizard or from a draft file)
    Register(RegisterArgs),

    /// Validate registration drafts without submitting them
    Validate(ValidateArgs),

    /// Search and resolve the region → parish address hierarchy
    #[command(subcommand)]
    Address(AddressCommands),

    /// Admin dashboard and approval queue
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Log in to the marketplace
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (tables for lists)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}
