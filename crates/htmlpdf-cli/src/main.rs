use clap::Parser;
use eyre::Result;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();

    // Logs go to stderr; stdout may carry the PDF.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut job = args.build_job()?;

    if args.clean_temp {
        let removed = job.clean_all_temp_files()?;
        tracing::info!(removed, dir = %job.effective_temp_dir().display(), "temp files swept");
        return Ok(());
    }

    if job.objects().is_empty() {
        return Err(eyre::eyre!("nothing to render: pass --page or --cover"));
    }

    match (&args.output, args.direct) {
        (Some(path), true) => {
            job.save_as_direct(path).await?;
        }
        (Some(path), false) => {
            job.save_as(path).await?;
        }
        (None, _) => {
            let bytes = job.render().await?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&bytes).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
