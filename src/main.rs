use clap::Parser;
use miette::Result;

use dit::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    // Install miette's fancy error handler for readable diagnostics
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

    match cli.command {
        Commands::Init(args) => dit::cli::commands::init::run(args),
        Commands::Project(cmd) => dit::cli::commands::project::run(cmd, &global),
        Commands::Phase(cmd) => dit::cli::commands::phase::run(cmd, &global),
        Commands::Spec(cmd) => dit::cli::commands::spec::run(cmd, &global),
        Commands::Item(cmd) => dit::cli::commands::item::run(cmd, &global),
        Commands::Report(cmd) => dit::cli::commands::report::run(cmd, &global),
        Commands::Checklist(cmd) => dit::cli::commands::checklist::run(cmd, &global),
        Commands::Submit(args) => args.run(&global),
        Commands::Approve(args) => args.run(&global),
        Commands::Revise(args) => args.run(&global),
        Commands::Export(args) => dit::cli::commands::export::run(args, &global),
        Commands::Team(cmd) => dit::cli::commands::team::run(cmd, &global),
        Commands::Completions(args) => dit::cli::commands::completions::run(args),
    }
}
