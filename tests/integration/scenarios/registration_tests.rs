use crate::infrastructure::signal_assertions::*;
use crate::infrastructure::ProcessTestHarness;
use anyhow::Result;
use nix::errno::Errno;
use std::time::Duration;

const EXIT_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn uncatchable_signal_fails_registration() -> Result<()> {
    let mut harness = ProcessTestHarness::new()?;
    harness.set_environment("SIGWHO_SIGNAL", "SIGKILL");

    let process = harness.spawn_reporter().await?;
    let output = process.wait_for_output(EXIT_TIMEOUT).await?;

    assert_registration_failure(&output, Errno::EINVAL);
    Ok(())
}

#[tokio::test]
async fn unstoppable_signal_fails_registration() -> Result<()> {
    let mut harness = ProcessTestHarness::new()?;
    harness.set_environment("SIGWHO_SIGNAL", "SIGSTOP");

    let process = harness.spawn_reporter().await?;
    let output = process.wait_for_output(EXIT_TIMEOUT).await?;

    assert_registration_failure(&output, Errno::EINVAL);
    Ok(())
}

#[tokio::test]
async fn unknown_signal_name_fails_registration() -> Result<()> {
    let mut harness = ProcessTestHarness::new()?;
    harness.set_environment("SIGWHO_SIGNAL", "SIGWIBBLE");

    let process = harness.spawn_reporter().await?;
    let output = process.wait_for_output(EXIT_TIMEOUT).await?;

    assert_registration_failure(&output, Errno::EINVAL);
    Ok(())
}

#[tokio::test]
async fn failed_registration_never_reaches_the_idle_wait() -> Result<()> {
    let mut harness = ProcessTestHarness::new()?;
    harness.set_environment("SIGWHO_SIGNAL", "SIGKILL");

    let mut process = harness.spawn_reporter().await?;

    // No signal is ever sent; exit well inside one poll quantum proves the
    // failure path skipped the idle loop entirely
    let exit_status = process
        .wait_for_exit_timeout(Duration::from_millis(900))
        .await?;

    match exit_status {
        Some(status) => assert_eq!(status.code(), Some(Errno::EINVAL as i32)),
        None => panic!("Reporter entered the idle wait despite failed registration"),
    }
    Ok(())
}
