//! Unified status codes for error classification.
//!
//! Status code format: XX_YYY (5-digit)
//! - XX = Category (00-99)
//! - YYY = Code within category (000-999)
//!
//! Category layout:
//! - General/Core (01-04): Common, Input, IO, Execution
//! - Business (10-12): Config, Registry, Routing

use strum::AsRefStr;
use strum::EnumIter;
use strum::FromRepr;

/// Status code metadata.
#[derive(Debug, Clone, Copy)]
pub struct StatusMeta {
    pub retryable: bool,
    pub log_error: bool,
    pub category: StatusCategory,
}

/// Status code category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// Success (00_xxx)
    Success,
    /// Common/internal errors (01_xxx)
    Common,
    /// Parameter/validation errors (02_xxx)
    Input,
    /// IO/storage errors (03_xxx)
    IO,
    /// Backend process execution errors (04_xxx)
    Execution,
    /// Configuration errors (10_xxx)
    Config,
    /// Resource registry errors (11_xxx)
    Registry,
    /// Router errors (12_xxx)
    Routing,
}

macro_rules! define_status_codes {
    ($(
        $(#[$attr:meta])*
        $name:ident = $value:expr => {
            retryable: $retry:expr,
            log_error: $log:expr,
            category: $cat:ident $(,)?
        }
    ),* $(,)?) => {
        /// Status codes for error classification.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, FromRepr)]
        #[repr(i32)]
        pub enum StatusCode {
            $($(#[$attr])* $name = $value,)*
        }

        impl StatusCode {
            /// Returns the metadata for this status code.
            pub const fn meta(&self) -> StatusMeta {
                match self {
                    $(Self::$name => StatusMeta {
                        retryable: $retry,
                        log_error: $log,
                        category: StatusCategory::$cat,
                    },)*
                }
            }

            /// Returns the string name of this status code.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }

        // Compile-time check for duplicate status code values
        const _: () = {
            const CODES: &[i32] = &[$($value),*];
            const fn check_unique() {
                let mut i = 0;
                while i < CODES.len() {
                    let mut j = i + 1;
                    while j < CODES.len() {
                        if CODES[i] == CODES[j] {
                            panic!("Duplicate status code value detected");
                        }
                        j += 1;
                    }
                    i += 1;
                }
            }
            check_unique();
        };
    };
}

define_status_codes! {
    /// Operation completed successfully.
    Success = 0 => { retryable: false, log_error: false, category: Success },

    /// Unexpected internal error.
    Internal = 1_000 => { retryable: false, log_error: true, category: Common },
    /// Unsupported or not-yet-implemented operation.
    Unsupported = 1_001 => { retryable: false, log_error: true, category: Common },

    /// Invalid argument or malformed input.
    InvalidInput = 2_000 => { retryable: false, log_error: false, category: Input },

    /// Generic I/O failure.
    IoError = 3_000 => { retryable: true, log_error: true, category: IO },
    /// Expected file missing on disk.
    FileNotFound = 3_001 => { retryable: false, log_error: false, category: IO },

    /// Backend executable could not be spawned.
    SpawnFailed = 4_000 => { retryable: false, log_error: true, category: Execution },
    /// Backend process exited with a non-zero code.
    ProcessFailed = 4_001 => { retryable: true, log_error: false, category: Execution },
    /// Backend stream violated its declared dialect.
    ProtocolError = 4_002 => { retryable: false, log_error: true, category: Execution },
    /// Execution exceeded its deadline.
    Timeout = 4_003 => { retryable: true, log_error: false, category: Execution },
    /// Execution was cancelled by the caller.
    Cancelled = 4_004 => { retryable: false, log_error: false, category: Execution },

    /// Configuration file missing or malformed.
    InvalidConfig = 10_000 => { retryable: false, log_error: true, category: Config },

    /// Resource descriptor could not be parsed.
    ResourceParse = 11_000 => { retryable: false, log_error: false, category: Registry },
    /// Registry cache unreadable or fingerprint mismatch.
    CacheInvalid = 11_001 => { retryable: true, log_error: false, category: Registry },

    /// No viable routing candidate.
    NoViableCandidate = 12_000 => { retryable: false, log_error: false, category: Routing },
}

#[cfg(test)]
#[path = "status_code.test.rs"]
mod tests;
