//! Output helpers shared by commands
//!
//! JSON documents are written with one-space indentation. Errors in JSON
//! mode are written to stderr as `{"status": "error", "error": {...}}`.

use miette::{Diagnostic, IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::io::Write;

/// Serialize `value` as indented JSON followed by a newline
pub fn write_json<T, W>(value: &T, out: &mut W) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write + ?Sized,
{
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, formatter);
    value
        .serialize(&mut ser)
        .into_diagnostic()
        .wrap_err("Unable to marshal into JSON")?;
    writeln!(out).into_diagnostic()
}

#[derive(Debug, Serialize)]
struct ErrorOutput {
    status: &'static str,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cause: Vec<String>,
}

impl ErrorOutput {
    fn from_diagnostic(err: &(dyn Diagnostic + 'static)) -> Self {
        // Wrapped errors carry their code on the innermost diagnostic
        let mut code = err.code().map(|c| c.to_string());
        let mut cause = Vec::new();
        let mut source = err.source();
        while let Some(e) = source {
            cause.push(e.to_string());
            source = e.source();
        }
        if code.is_none() {
            code = err
                .diagnostic_source()
                .and_then(|d| d.code())
                .map(|c| c.to_string());
        }

        Self {
            status: "error",
            error: ErrorDetail {
                message: err.to_string(),
                code,
                cause,
            },
        }
    }
}

/// Write a structured JSON error to `out`
pub fn write_error_json<W: Write + ?Sized>(err: &miette::Report, out: &mut W) -> Result<()> {
    write_json(&ErrorOutput::from_diagnostic(&**err), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgeFilterError;

    #[test]
    fn test_json_uses_single_space_indent() {
        let mut out = Vec::new();
        write_json(&serde_json::json!({"a": {"b": 1}}), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "{\n \"a\": {\n  \"b\": 1\n }\n}\n");
    }

    #[test]
    fn test_error_json() {
        let report = miette::Report::new(AgeFilterError::Zero);
        let mut out = Vec::new();
        write_error_json(&report, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["message"], "older-than cannot be set to zero");
        assert_eq!(value["error"]["code"], "objctl::resync::older_than_zero");
    }

    #[test]
    fn test_error_json_includes_cause_chain() {
        let report = Err::<(), _>(AgeFilterError::Zero)
            .wrap_err("Unable to reset replication for `myminio/mybucket`")
            .unwrap_err();
        let mut out = Vec::new();
        write_error_json(&report, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value["error"]["message"],
            "Unable to reset replication for `myminio/mybucket`"
        );
        assert_eq!(value["error"]["cause"][0], "older-than cannot be set to zero");
    }
}
