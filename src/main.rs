use beamflow::cli::Args;
use beamflow::export::write_summary;
use beamflow::harness::sweep;
use beamflow::solver::LogProgress;
use tracing_subscriber::FmtSubscriber;

fn main() -> anyhow::Result<()> {
    let args = Args::cli_setup("beamflow")?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    #[cfg(feature = "profile-with-puffin")]
    let puffin_server = {
        let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        let server = puffin_http::Server::new(&server_addr)?;
        tracing::info!(
            "Run this to view profiling data:  puffin_viewer {server_addr}"
        );
        profiling::puffin::set_scopes_on(true);
        server
    };

    let config = args.simulation_config()?;
    let exporters = args.exporters();
    let summary = sweep(&config, &exporters, &mut LogProgress)?;
    write_summary(&args.summary_path(), &summary)?;

    #[cfg(feature = "profile-with-puffin")]
    {
        profiling::finish_frame!();
        tracing::info!("Flushing profiler");
        drop(puffin_server);
    }

    if !summary.all_succeeded() {
        tracing::warn!(
            failed = summary.runs.len() - summary.succeeded(),
            "some runs did not reach an accepted state"
        );
    }
    Ok(())
}
