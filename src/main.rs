// src/main.rs

use procscript::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse();
    let log_file = args.log.clone();

    let code = match run_main(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("procscript error: {err:?}");
            1
        }
    };

    if let Some(path) = log_file {
        println!("The log is available in '{}'.", path.display());
    }
    std::process::exit(code);
}

async fn run_main(args: cli::CliArgs) -> anyhow::Result<i32> {
    let log = logging::init_logging(args.log_level, args.log.as_deref())?;
    let outcome = run(args, log).await?;
    Ok(outcome.exit_code())
}
