// macros.rs
// Purpose: Call-site logging macros that capture the source location

/// Log through a [`SessionWriter`](crate::SessionWriter) at an explicit severity.
///
/// Arguments are converted with `Arg::from` only when the severity is enabled.
///
/// ```
/// use spudlog::{log_event, Session, Severity};
///
/// let session = Session::default();
/// let writer = session.writer("main");
/// log_event!(writer, Severity::Info, "gui", "Starting GUI, {} frames", 1);
/// ```
#[macro_export]
macro_rules! log_event {
    ($writer:expr, $severity:expr, $category:expr, $format:literal $(, $arg:expr)* $(,)?) => {{
        let writer = &$writer;
        let severity = $severity;
        if writer.enabled(severity) {
            writer.log(
                severity,
                $category,
                $crate::StaticLocation::new(module_path!(), file!(), line!()),
                $format,
                &[$($crate::Arg::from($arg)),*],
            );
        }
    }};
}

#[macro_export]
macro_rules! log_t {
    ($writer:expr, $category:expr, $($rest:tt)+) => {
        $crate::log_event!($writer, $crate::Severity::Trace, $category, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_d {
    ($writer:expr, $category:expr, $($rest:tt)+) => {
        $crate::log_event!($writer, $crate::Severity::Debug, $category, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_i {
    ($writer:expr, $category:expr, $($rest:tt)+) => {
        $crate::log_event!($writer, $crate::Severity::Info, $category, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_w {
    ($writer:expr, $category:expr, $($rest:tt)+) => {
        $crate::log_event!($writer, $crate::Severity::Warning, $category, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_e {
    ($writer:expr, $category:expr, $($rest:tt)+) => {
        $crate::log_event!($writer, $crate::Severity::Error, $category, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_c {
    ($writer:expr, $category:expr, $($rest:tt)+) => {
        $crate::log_event!($writer, $crate::Severity::Critical, $category, $($rest)+)
    };
}
