use clientex_lib::{cli, init_tracing, run, RunOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let matches = cli().get_matches();
    run(RunOptions::from_matches(&matches)).await
}
