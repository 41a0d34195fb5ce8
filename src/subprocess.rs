//! Shared helpers for driving external CLI tools.

use std::process::Output;

use regex::Regex;

use crate::{error::JobError, prelude::*};

/// Check the outcome of an external tool invocation.
///
/// Standard output and standard error are logged at debug level. A non-zero
/// exit status is a [`JobError::ToolFailure`] carrying the tool's error
/// output. Some tools (notably poppler's) exit zero while printing errors,
/// so standard error may optionally be scanned against `error_regex` as well.
pub fn check_tool_output(
    tool: &'static str,
    output: &Output,
    error_regex: Option<&Regex>,
) -> Result<(), JobError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!(tool, output = %stdout, "standard output from tool");
    if !stderr.trim().is_empty() {
        debug!(tool, output = %stderr, "standard error from tool");
    }

    if output.status.success() {
        if let Some(regex) = error_regex
            && regex.is_match(&stderr)
        {
            return Err(JobError::ToolFailure {
                tool,
                message: format!("printed error output:\n{}", stderr.trim()),
            });
        }
        Ok(())
    } else if let Some(exit_code) = output.status.code() {
        Err(JobError::ToolFailure {
            tool,
            message: format!("exit code {}:\n{}", exit_code, stderr.trim()),
        })
    } else {
        Err(JobError::ToolFailure {
            tool,
            message: format!("terminated by signal:\n{}", stderr.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::process::ExitStatusExt as _;
    use std::process::ExitStatus;

    use super::*;

    fn fake_output(code: i32, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: vec![],
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn zero_exit_is_ok() {
        assert!(check_tool_output("fake", &fake_output(0, ""), None).is_ok());
    }

    #[test]
    fn nonzero_exit_reports_tool_and_stderr() {
        let err = check_tool_output("fake", &fake_output(2, "boom"), None)
            .expect_err("should fail");
        let message = err.to_string();
        assert!(message.contains("fake failed"), "got: {}", message);
        assert!(message.contains("boom"), "got: {}", message);
    }

    #[test]
    fn error_regex_catches_zero_exit_failures() {
        let regex = Regex::new(r"(?i)error").unwrap();
        let result =
            check_tool_output("fake", &fake_output(0, "Syntax Error: bad xref"), Some(&regex));
        assert!(result.is_err());
    }
}
