//! `innkeeper login` / `innkeeper logout` - Manage the stored session

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{connect, print_structured};
use crate::cli::GlobalOpts;
use crate::core::{Config, SessionContext, SessionStore};

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Account email (prompted for if omitted)
    pub email: Option<String>,

    /// Password (prompted for if omitted)
    #[arg(long, env = "INNKEEPER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let theme = ColorfulTheme::default();
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()
            .into_diagnostic()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()
            .into_diagnostic()?,
    };

    let client = connect(&Config::load())?;
    let session = client.login(email.trim(), &password)?;

    if print_structured(global.format, &session.user)? {
        return Ok(());
    }
    if !global.quiet {
        let name = if session.user.name.is_empty() {
            &session.user.email
        } else {
            &session.user.name
        };
        println!("{} Logged in as {}", style("✓").green(), style(name).cyan());
        if session.user.is_admin() {
            println!("  {}", style("Admin commands are available (innkeeper admin)").dim());
        }
    }
    Ok(())
}

pub fn run_logout(global: &GlobalOpts) -> Result<()> {
    let session = SessionContext::load(SessionStore::default_location());
    let user = session.user();
    session.end();

    if !global.quiet {
        match user {
            Some(user) => println!("{} Logged out {}", style("✓").green(), style(user.email).cyan()),
            None => println!("Not logged in"),
        }
    }
    Ok(())
}
