use clap::Parser;
use miette::Result;
use innkeeper::cli::commands;
use innkeeper::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    innkeeper::core::logging::init_tracing(global.verbose);

    match cli.command {
        Commands::Register(args) => commands::register::run(args, &global),
        Commands::Validate(args) => commands::validate::run(args, &global),
        Commands::Address(cmd) => commands::address::run(cmd, &global),
        Commands::Admin(cmd) => commands::admin::run(cmd, &global),
        Commands::Login(args) => commands::auth::run_login(args, &global),
        Commands::Logout => commands::auth::run_logout(&global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
