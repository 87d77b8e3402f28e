//! HTTP latency injection: sleep, then issue the request through the channel.

use std::thread;
use std::time::Duration;

use crate::channel::{preflight, Channel};
use crate::cli::HttpDelayArgs;
use crate::errors::ActionError;
use crate::invocation::Invocation;
use crate::response::ExperimentResult;

pub fn delay(
    invocation: &Invocation,
    args: &HttpDelayArgs,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
        return Err(ActionError::ParameterInvalid {
            name: "url",
            reason: format!("`{}` is not an http(s) url", args.url),
        });
    }
    let millis: u64 = args.time.parse().map_err(|_| ActionError::ParameterInvalid {
        name: "time",
        reason: format!("`{}` is not a positive integer of milliseconds", args.time),
    })?;
    if millis == 0 {
        return Err(ActionError::ParameterInvalid {
            name: "time",
            reason: "delay must be positive".to_string(),
        });
    }
    preflight(channel, &["curl"])?;

    tracing::info!(uid = %invocation.uid, millis, url = %args.url, "delay http request");
    thread::sleep(Duration::from_millis(millis));
    Ok(ExperimentResult::from_channel(
        channel.run("curl", &args.url),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockChannel;
    use crate::invocation::Mode;

    fn invocation() -> Invocation {
        Invocation::new(Some("http-test".to_string()), Mode::Create)
    }

    fn args(url: &str, time: &str) -> HttpDelayArgs {
        HttpDelayArgs {
            url: url.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn rejects_non_http_urls() {
        let channel = MockChannel::new();
        let err = delay(&invocation(), &args("ftp://host/x", "10"), &channel).unwrap_err();
        assert!(matches!(
            err,
            ActionError::ParameterInvalid { name: "url", .. }
        ));
    }

    #[test]
    fn rejects_unparsable_delay() {
        let channel = MockChannel::new();
        for time in ["abc", "-5", "0"] {
            let err = delay(&invocation(), &args("https://host/x", time), &channel).unwrap_err();
            assert!(matches!(
                err,
                ActionError::ParameterInvalid { name: "time", .. }
            ));
        }
        assert!(channel.command_lines().is_empty());
    }

    #[test]
    fn sleeps_then_requests_through_channel() {
        let channel = MockChannel::new();
        let result = delay(&invocation(), &args("https://host/x", "1"), &channel).expect("delay");
        assert!(result.success);
        assert_eq!(channel.command_lines(), vec!["curl https://host/x".to_string()]);
    }
}
