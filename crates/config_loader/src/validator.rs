//! Configuration validation
//!
//! Rules:
//! - every dispatcher level has at least one receiver
//! - file paths are non-empty
//! - UDP addresses resolve
//! - filters name at least one level
//! - `interval_ms > 0` in timer mode, `queue_capacity > 0`
//! - every format pattern compiles

use std::net::ToSocketAddrs;

use contracts::{ContractError, LogConfig, LoggerMode, PatternFormatter, ReceiverConfig};

/// Validate a `LogConfig`
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &LogConfig) -> Result<(), ContractError> {
    validate_scheduling(config)?;
    validate_format("format", config.format.as_deref())?;
    validate_receivers("receivers", &config.receivers)
}

fn validate_scheduling(config: &LogConfig) -> Result<(), ContractError> {
    if config.mode == LoggerMode::AsyncTimer && config.interval_ms == 0 {
        return Err(ContractError::config_validation(
            "interval_ms",
            "interval_ms must be > 0 in async_timer mode",
        ));
    }
    if config.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_format(field: &str, pattern: Option<&str>) -> Result<(), ContractError> {
    match pattern {
        Some(pattern) => PatternFormatter::new(pattern)
            .map(|_| ())
            .map_err(|e| ContractError::config_validation(field, e.to_string())),
        None => Ok(()),
    }
}

fn validate_receivers(field: &str, receivers: &[ReceiverConfig]) -> Result<(), ContractError> {
    if receivers.is_empty() {
        return Err(ContractError::config_validation(
            field,
            "at least one receiver is required",
        ));
    }

    for (idx, receiver) in receivers.iter().enumerate() {
        let path = format!("{field}[{idx}]");
        validate_receiver(&path, receiver)?;
    }
    Ok(())
}

fn validate_receiver(path: &str, receiver: &ReceiverConfig) -> Result<(), ContractError> {
    match receiver {
        ReceiverConfig::Console(_) | ReceiverConfig::Tracing(_) => Ok(()),
        ReceiverConfig::File(file) => {
            if file.path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    format!("{path}.path"),
                    "file path cannot be empty",
                ));
            }
            Ok(())
        }
        ReceiverConfig::Udp(udp) => validate_udp_addr(path, &udp.addr),
        ReceiverConfig::Dispatcher(dispatcher) => {
            validate_format(&format!("{path}.format"), dispatcher.format.as_deref())?;
            validate_receivers(&format!("{path}.receivers"), &dispatcher.receivers)
        }
        ReceiverConfig::Filter(filter) => {
            if filter.levels.is_empty() {
                return Err(ContractError::config_validation(
                    format!("{path}.levels"),
                    "filter must forward at least one level",
                ));
            }
            validate_format(&format!("{path}.format"), filter.format.as_deref())?;
            validate_receivers(&format!("{path}.receivers"), &filter.receivers)
        }
    }
}

fn validate_udp_addr(path: &str, addr: &str) -> Result<(), ContractError> {
    let resolved = addr
        .to_socket_addrs()
        .map(|mut addrs| addrs.next().is_some())
        .unwrap_or(false);
    if !resolved {
        return Err(ContractError::config_validation(
            format!("{path}.addr"),
            format!("'{addr}' is not a valid host:port address"),
        ));
    }
    Ok(())
}
