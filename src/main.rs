use clap::Parser;
use miette::Result;
use objctl::cli::commands::{alias, completions, replicate};
use objctl::cli::{logging, output, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();
    let global = cli.global;

    let no_color = global.no_color;
    miette::set_hook(Box::new(move |_| {
        let mut opts = miette::MietteHandlerOpts::new()
            .terminal_links(true)
            .unicode(true)
            .context_lines(2);
        if no_color {
            opts = opts.color(false);
        }
        Box::new(opts.build())
    }))?;

    if global.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    logging::init(&global);

    let result = match cli.command {
        Commands::Replicate(cmd) => replicate::run(cmd, &global),
        Commands::Alias(cmd) => alias::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    };

    match result {
        Err(err) if global.format.is_json() => {
            let stderr = std::io::stderr();
            output::write_error_json(&err, &mut stderr.lock())?;
            std::process::exit(1);
        }
        other => other,
    }
}
