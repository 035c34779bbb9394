mod args;
mod output;

use anyhow::Result;
use mailprobe_lib::{
    GuessRequest, detect_catch_all, detect_pattern, guess_email, parse_domain, resolve_mail_route,
    verify_email,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};
use crate::output::{Format, Report};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::parse(&cli.format)?;

    let report = match &cli.cmd {
        Commands::Verify { email } => {
            Report::Verify(verify_email(email, &cli.verify_options()?).await)
        }
        Commands::CatchAll { domain } => {
            Report::CatchAll(detect_catch_all(domain, &cli.verify_options()?).await)
        }
        Commands::Guess {
            first_name,
            last_name,
            domain,
        } => {
            let request = GuessRequest::new(first_name, last_name, domain);
            Report::Guess(guess_email(&request, &cli.verify_options()?).await)
        }
        Commands::DetectPattern { domain } => {
            Report::Pattern(detect_pattern(domain, &cli.verify_options()?).await)
        }
        Commands::Mx { domain } => {
            let domain = parse_domain(domain)?;
            let route = resolve_mail_route(&domain).await?;
            Report::Mx { domain, route }
        }
    };

    output::render(&report, format)?;

    // codes de sortie : 0 OK, 2 résultat négatif, 1 fatal
    if report.is_negative() {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
