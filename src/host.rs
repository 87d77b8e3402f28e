//! Host reboot and shutdown actions.
//!
//! Both are single-command faults: the create phase schedules or triggers the
//! reboot/poweroff through the channel, and destroy is a no-op acknowledged by
//! the dispatcher (a rebooted host cannot be un-rebooted).

use regex::Regex;

use crate::channel::{preflight, Channel};
use crate::cli::{HostRestartArgs, HostStopArgs};
use crate::errors::ActionError;
use crate::invocation::Invocation;
use crate::response::ExperimentResult;

/// Accepted shutdown schedules: `now`, `+<minutes>` (or bare minutes), HH:MM.
const TIME_SPEC: &str = r"^(now|\+?\d{1,5}|([01]?\d|2[0-3]):[0-5]\d)$";

pub fn restart(
    invocation: &Invocation,
    args: &HostRestartArgs,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    match args.time.as_deref() {
        Some(time) => {
            validate_time_spec(time)?;
            preflight(channel, &["shutdown"])?;
            tracing::info!(uid = %invocation.uid, time, "schedule host restart");
            Ok(ExperimentResult::from_channel(
                channel.run("shutdown", &format!("-r {time}")),
            ))
        }
        None => {
            preflight(channel, &["reboot"])?;
            tracing::info!(uid = %invocation.uid, "restart host now");
            Ok(ExperimentResult::from_channel(channel.run("reboot", "")))
        }
    }
}

pub fn stop(
    invocation: &Invocation,
    args: &HostStopArgs,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    match args.time.as_deref() {
        Some(time) => {
            validate_time_spec(time)?;
            preflight(channel, &["shutdown"])?;
            let flags = if args.forced { "-h -f" } else { "-h" };
            tracing::info!(uid = %invocation.uid, time, forced = args.forced, "schedule host stop");
            Ok(ExperimentResult::from_channel(
                channel.run("shutdown", &format!("{flags} {time}")),
            ))
        }
        None => {
            preflight(channel, &["poweroff"])?;
            tracing::info!(uid = %invocation.uid, forced = args.forced, "stop host now");
            let args = if args.forced { "-f" } else { "" };
            Ok(ExperimentResult::from_channel(channel.run("poweroff", args)))
        }
    }
}

fn validate_time_spec(value: &str) -> Result<(), ActionError> {
    let valid = Regex::new(TIME_SPEC)
        .map(|pattern| pattern.is_match(value))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ActionError::ParameterInvalid {
            name: "time",
            reason: format!("`{value}` is not now, +<minutes> or HH:MM"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockChannel;
    use crate::invocation::Mode;

    fn invocation() -> Invocation {
        Invocation::new(Some("host-test".to_string()), Mode::Create)
    }

    #[test]
    fn accepts_common_time_specs() {
        for spec in ["now", "1", "+5", "20:35", "0:00"] {
            assert!(validate_time_spec(spec).is_ok(), "rejected {spec}");
        }
    }

    #[test]
    fn rejects_malformed_time_specs() {
        for spec in ["later", "25:00", "12:7", "-3", ""] {
            let err = validate_time_spec(spec).unwrap_err();
            assert_eq!(err.code(), 46, "accepted {spec}");
        }
    }

    #[test]
    fn scheduled_restart_uses_shutdown() {
        let channel = MockChannel::new();
        let args = HostRestartArgs {
            time: Some("+1".to_string()),
        };
        let result = restart(&invocation(), &args, &channel).expect("restart");
        assert!(result.success);
        assert_eq!(channel.command_lines(), vec!["shutdown -r +1".to_string()]);
    }

    #[test]
    fn immediate_restart_uses_reboot() {
        let channel = MockChannel::new();
        let args = HostRestartArgs { time: None };
        restart(&invocation(), &args, &channel).expect("restart");
        assert_eq!(channel.command_lines(), vec!["reboot".to_string()]);
    }

    #[test]
    fn forced_stop_appends_force_flag() {
        let channel = MockChannel::new();
        let args = HostStopArgs {
            time: Some("22:00".to_string()),
            forced: true,
        };
        stop(&invocation(), &args, &channel).expect("stop");
        assert_eq!(channel.command_lines(), vec!["shutdown -h -f 22:00".to_string()]);

        let channel = MockChannel::new();
        let args = HostStopArgs {
            time: None,
            forced: true,
        };
        stop(&invocation(), &args, &channel).expect("stop");
        assert_eq!(channel.command_lines(), vec!["poweroff -f".to_string()]);
    }

    #[test]
    fn missing_shutdown_command_fails_preflight() {
        let channel = MockChannel::without(&["shutdown"]);
        let args = HostStopArgs {
            time: Some("now".to_string()),
            forced: false,
        };
        let err = stop(&invocation(), &args, &channel).unwrap_err();
        assert!(matches!(err, ActionError::ChannelUnavailable(_)));
        assert!(channel.command_lines().is_empty());
    }
}
