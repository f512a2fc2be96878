use newsboard_cli::{command, init_tracing, load_config, run, Invocation};
use newsboard_trigger::HttpJobTrigger;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = command().get_matches();

    let invocation = match Invocation::from_matches(&matches) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };
    init_tracing(invocation.log_json);

    if let Err(e) = execute(&invocation).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn execute(invocation: &Invocation) -> anyhow::Result<()> {
    let config = load_config(invocation)?;
    let trigger = Arc::new(HttpJobTrigger::new(config.trigger.clone())?);
    let mut stdout = std::io::stdout();
    run(invocation, &config, trigger, &mut stdout).await
}
