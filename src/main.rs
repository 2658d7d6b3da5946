use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match hospital_stats_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            eprintln!("hospital-stats: {e}");
            ExitCode::FAILURE
        }
    }
}
