mod commands;
mod terminal;

use anyhow::Context;

use commands::{CommandLine, run};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.to_config();

    anyhow::ensure!(
        commands.scope_file.is_file(),
        "scope file {} does not exist",
        commands.scope_file.display()
    );
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;

    let log_file = cfg.output_dir.join(logging::LOG_FILE);
    logging::init_logging(commands.verbose, cfg.quiet, Some(&log_file))?;

    print::banner(cfg.no_banner, cfg.quiet);
    run::run(&commands.scope_file, &cfg).await
}
