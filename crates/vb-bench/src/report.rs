//! Human and JSON renderings of a [`BenchReport`].

use crate::result::BenchReport;
use serde::Serialize;
use std::io::{self, Write};

/// `normal:` section, one `"<rank>: <label> <ms>ms"` line per success.
/// Writes nothing when there are no successes.
pub fn write_normal<W: Write>(mut out: W, report: &BenchReport) -> io::Result<()> {
    if report.normal.is_empty() {
        return Ok(());
    }
    writeln!(out, "normal:")?;
    for (i, stat) in report.normal.iter().enumerate() {
        writeln!(
            out,
            "{}: {} {}ms",
            i + 1,
            stat.endpoint.label(),
            stat.elapsed.as_millis()
        )?;
    }
    Ok(())
}

/// `error:` section, one `"<rank>: <label> <error>"` line per failure.
pub fn write_errors<W: Write>(mut out: W, report: &BenchReport) -> io::Result<()> {
    if report.errors.is_empty() {
        return Ok(());
    }
    writeln!(out, "error:")?;
    for (i, failure) in report.errors.iter().enumerate() {
        writeln!(out, "{}: {} {}", i + 1, failure.endpoint.label(), failure.error)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ReportJson<'a> {
    pub normal: Vec<NormalJson<'a>>,
    pub errors: Vec<ErrorJson<'a>>,
}

#[derive(Debug, Serialize)]
pub struct NormalJson<'a> {
    pub rank: usize,
    pub ps: &'a str,
    pub add: &'a str,
    pub port: u32,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorJson<'a> {
    pub ps: &'a str,
    pub add: &'a str,
    pub port: u32,
    pub kind: String,
    pub error: String,
}

impl<'a> From<&'a BenchReport> for ReportJson<'a> {
    fn from(report: &'a BenchReport) -> Self {
        Self {
            normal: report
                .normal
                .iter()
                .enumerate()
                .map(|(i, s)| NormalJson {
                    rank: i + 1,
                    ps: &s.endpoint.ps,
                    add: &s.endpoint.add,
                    port: s.endpoint.port,
                    elapsed_ms: s.elapsed.as_millis() as u64,
                })
                .collect(),
            errors: report
                .errors
                .iter()
                .map(|f| ErrorJson {
                    ps: &f.endpoint.ps,
                    add: &f.endpoint.add,
                    port: f.endpoint.port,
                    kind: f.error.kind.to_string(),
                    error: f.error.message.clone(),
                })
                .collect(),
        }
    }
}

pub fn to_json(report: &BenchReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportJson::from(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ProbeFailure, ProbeStat};
    use std::time::Duration;
    use vb_engine::{ProbeError, ProbeErrorKind};
    use vb_subscribe::VmessEndpoint;

    fn ep(ps: &str) -> VmessEndpoint {
        VmessEndpoint {
            ps: ps.into(),
            add: format!("{ps}.example.net"),
            port: 443,
            ..Default::default()
        }
    }

    fn sample() -> BenchReport {
        BenchReport {
            normal: vec![
                ProbeStat {
                    endpoint: ep("B"),
                    elapsed: Duration::from_millis(10),
                },
                ProbeStat {
                    endpoint: ep("A"),
                    elapsed: Duration::from_micros(50_900),
                },
            ],
            errors: vec![ProbeFailure {
                endpoint: ep("C"),
                error: ProbeError::new(ProbeErrorKind::Timeout, "operation timed out"),
            }],
        }
    }

    #[test]
    fn human_lines() {
        let report = sample();
        let mut out = Vec::new();
        write_normal(&mut out, &report).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "normal:\n1: B 10ms\n2: A 50ms\n");

        let mut err = Vec::new();
        write_errors(&mut err, &report).unwrap();
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "error:\n1: C ping err: operation timed out\n"
        );
    }

    #[test]
    fn empty_sections_print_nothing() {
        let mut out = Vec::new();
        write_normal(&mut out, &BenchReport::default()).unwrap();
        write_errors(&mut out, &BenchReport::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn json_form() {
        let v: serde_json::Value = serde_json::from_str(&to_json(&sample()).unwrap()).unwrap();
        assert_eq!(v["normal"][0]["ps"], "B");
        assert_eq!(v["normal"][1]["rank"], 2);
        assert_eq!(v["normal"][1]["elapsed_ms"], 50);
        assert_eq!(v["errors"][0]["kind"], "timeout");
    }
}
