// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient logging

/// Log a message with emergency severity
///
/// # Examples
/// ```ignore
/// log_emergency!(handler, "System is down");
/// ```
#[macro_export]
macro_rules! log_emergency {
    ($handler:expr, $msg:expr) => {
        $handler.emergency($msg)
    };
}

/// Log a message with alert severity
///
/// # Examples
/// ```ignore
/// log_alert!(handler, "Intrusion detected");
/// ```
#[macro_export]
macro_rules! log_alert {
    ($handler:expr, $msg:expr) => {
        $handler.alert($msg)
    };
}

/// Log a message with critical severity
///
/// # Examples
/// ```ignore
/// log_critical!(handler, "Worker crashed");
/// ```
#[macro_export]
macro_rules! log_critical {
    ($handler:expr, $msg:expr) => {
        $handler.critical($msg)
    };
}

/// Log a message with error severity
///
/// # Examples
/// ```ignore
/// log_error!(handler, "Failed to bind socket");
/// ```
#[macro_export]
macro_rules! log_error {
    ($handler:expr, $msg:expr) => {
        $handler.error($msg)
    };
}

/// Log a message with warning severity
///
/// # Examples
/// ```ignore
/// log_warning!(handler, "Buffer near capacity");
/// ```
#[macro_export]
macro_rules! log_warning {
    ($handler:expr, $msg:expr) => {
        $handler.warning($msg)
    };
}

/// Log a message with notice severity
///
/// # Examples
/// ```ignore
/// log_notice!(handler, "Worker restarted");
/// ```
#[macro_export]
macro_rules! log_notice {
    ($handler:expr, $msg:expr) => {
        $handler.notice($msg)
    };
}

/// Log a message with info severity
///
/// # Examples
/// ```ignore
/// log_info!(handler, "Rule added");
/// ```
#[macro_export]
macro_rules! log_info {
    ($handler:expr, $msg:expr) => {
        $handler.info($msg)
    };
}

/// Log a message with debug severity
///
/// # Examples
/// ```ignore
/// log_debug!(handler, "Parsing packet");
/// ```
#[macro_export]
macro_rules! log_debug {
    ($handler:expr, $msg:expr) => {
        $handler.debug($msg)
    };
}

/// Log a message with key-value pairs
///
/// # Examples
/// ```ignore
/// log_kv!(handler, Severity::Info, "Packet received",
///         "src" => "10.0.0.1", "port" => 5000i64);
/// ```
#[macro_export]
macro_rules! log_kv {
    ($handler:expr, $severity:expr, $msg:expr, $($key:expr => $value:expr),+) => {{
        let attrs: &[$crate::Attr] = &[$($crate::Attr::new($key, $value)),+];
        $handler.log_kv($severity, $msg, attrs)
    }};
}
