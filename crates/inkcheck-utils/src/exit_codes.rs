//! Exit code constants for inkcheck.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Command completed (artifact outcomes do not affect this) |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 69 | `TOOLCHAIN_UNAVAILABLE` | Build/audit/scaffold tool could not be launched |
//! | 70 | `LLM_FAILURE` | Language model request failed |
//! | 74 | `IO_FAILURE` | Workspace or output directory could not be written |

/// Process exit code.
///
/// The numeric values follow `sysexits.h` where one exists.
///
/// ```rust
/// use inkcheck_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::TOOLCHAIN_UNAVAILABLE.as_i32(), 69);
/// assert_eq!(ExitCode::from_i32(74), ExitCode::IO_FAILURE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - command completed
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Toolchain unavailable - `EX_UNAVAILABLE`
    pub const TOOLCHAIN_UNAVAILABLE: ExitCode = ExitCode(69);

    /// LLM failure - provider request failed
    pub const LLM_FAILURE: ExitCode = ExitCode(70);

    /// IO failure - `EX_IOERR`
    pub const IO_FAILURE: ExitCode = ExitCode(74);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
