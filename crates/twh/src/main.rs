use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use tokio::{io::BufReader, runtime::Runtime};

use twh_aws::AwsCliResolver;
use twh_core::{config::Config, console::Console, flow::WebhookSetup, Error};
use twh_telegram::BotApiClient;

fn main() -> ExitCode {
    let res = runtime()
        .context("failed to start async runtime")
        .and_then(|rt| {
            let res = rt.block_on(run());
            shutdown(rt);
            res
        });

    if let Some(message) = failure_message(&res) {
        println!("{message}");
    }
    let _ = std::io::stdout().flush();
    ExitCode::from(exit_status(&res))
}

fn runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Stdin reads run on a blocking thread that cannot be interrupted, so after
/// Ctrl-C the runtime must not wait for them.
fn shutdown(rt: Runtime) {
    rt.shutdown_background();
}

fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<Error>(), Some(Error::Cancelled))
}

fn exit_status(res: &anyhow::Result<()>) -> u8 {
    match res {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn failure_message(res: &anyhow::Result<()>) -> Option<String> {
    match res {
        Ok(()) => None,
        Err(e) if is_cancelled(e) => Some("\n\n❌ Setup cancelled by user.".to_string()),
        Err(e) => Some(format!("\n❌ Unexpected error: {e:#}")),
    }
}

async fn run() -> anyhow::Result<()> {
    twh_core::logging::init("twh")?;

    let cfg = Config::load().context("failed to load configuration")?;
    let api = BotApiClient::from_config(&cfg)?;
    let resolver = AwsCliResolver::from_config(&cfg);
    let setup = WebhookSetup::new(&api, &resolver, &cfg);

    let mut console = Console::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    // Handled API and lookup failures are already printed and still exit 0.
    let outcome = tokio::select! {
        res = setup.run(&mut console) => res?,
        _ = tokio::signal::ctrl_c() => return Err(Error::Cancelled.into()),
    };
    tracing::debug!(?outcome, "setup finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        sync::mpsc,
        time::{Duration, Instant},
    };

    use super::*;

    #[test]
    fn completed_flow_exits_zero_silently() {
        let res: anyhow::Result<()> = Ok(());
        assert_eq!(exit_status(&res), 0);
        assert!(failure_message(&res).is_none());
    }

    #[test]
    fn cancellation_exits_one_with_cancel_message() {
        let res: anyhow::Result<()> = Err(Error::Cancelled.into());
        assert_eq!(exit_status(&res), 1);
        assert_eq!(
            failure_message(&res).unwrap(),
            "\n\n❌ Setup cancelled by user."
        );
    }

    #[test]
    fn cancellation_is_recognised_under_context() {
        let res: anyhow::Result<()> =
            Err(anyhow::Error::from(Error::Cancelled).context("reading token"));
        assert_eq!(exit_status(&res), 1);
        assert!(failure_message(&res).unwrap().contains("cancelled by user"));
    }

    #[test]
    fn other_errors_exit_one_with_unexpected_message() {
        let res = Err::<(), _>(Error::Config("bad timeout".into()))
            .context("failed to load configuration");
        assert_eq!(exit_status(&res), 1);
        assert_eq!(
            failure_message(&res).unwrap(),
            "\n❌ Unexpected error: failed to load configuration: config error: bad timeout"
        );
    }

    #[test]
    fn shutdown_does_not_wait_for_blocked_reads() {
        let rt = runtime().unwrap();
        // Held until the end of the test so the blocking task never finishes.
        let (_keep_open, rx) = mpsc::channel::<()>();
        rt.spawn_blocking(move || {
            let _ = rx.recv();
        });

        let started = Instant::now();
        shutdown(rt);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
