//! Metric descriptors, samples, and the Prometheus text exposition format.
//!
//! Descriptors are built once at startup and shared read-only across every
//! scrape cycle; samples borrow their descriptor and live for one render.

use std::collections::HashMap;
use std::fmt::Write;

/// How a metric family is interpreted by the scraping system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Summary,
}

impl MetricKind {
    fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Summary => "summary",
        }
    }
}

/// A static metric definition: fully-qualified name, help text, kind, and
/// the ordered label schema shared by every sample of the family.
#[derive(Debug, Clone)]
pub struct Desc {
    pub fq_name: String,
    pub help: String,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl Desc {
    pub fn new(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        kind: MetricKind,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            fq_name: build_fq_name(namespace, subsystem, name),
            help: help.to_string(),
            kind,
            labels,
        }
    }
}

/// Join non-empty name parts with underscores, e.g.
/// `("logstash", "jvm", "threads_count")` becomes `logstash_jvm_threads_count`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// The observed value carried by a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Scalar(f64),
    /// Event count and cumulative sum, rendered as `_count` and `_sum`.
    Summary { count: u64, sum: f64 },
}

/// One labeled observation of a metric family.
#[derive(Debug, Clone)]
pub struct Sample<'a> {
    pub desc: &'a Desc,
    pub value: SampleValue,
    pub labels: Vec<String>,
}

impl<'a> Sample<'a> {
    /// A scalar (counter or gauge) sample. The label values must match the
    /// descriptor's label schema in length and order.
    pub fn new(desc: &'a Desc, value: f64, labels: Vec<String>) -> Self {
        debug_assert_eq!(desc.labels.len(), labels.len(), "{}", desc.fq_name);
        Self {
            desc,
            value: SampleValue::Scalar(value),
            labels,
        }
    }

    /// A summary sample with an observation count and a cumulative sum.
    pub fn summary(desc: &'a Desc, count: u64, sum: f64, labels: Vec<String>) -> Self {
        debug_assert_eq!(desc.labels.len(), labels.len(), "{}", desc.fq_name);
        Self {
            desc,
            value: SampleValue::Summary { count, sum },
            labels,
        }
    }
}

/// Render samples in the Prometheus text exposition format.
///
/// Samples are grouped by family so each `# HELP` / `# TYPE` header appears
/// exactly once, in first-seen order, even when samples of one family are
/// interleaved in the input.
pub fn render(samples: &[Sample<'_>]) -> String {
    let mut families: Vec<(&Desc, Vec<&Sample<'_>>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples {
        match index.get(sample.desc.fq_name.as_str()) {
            Some(&i) => families[i].1.push(sample),
            None => {
                index.insert(sample.desc.fq_name.as_str(), families.len());
                families.push((sample.desc, vec![sample]));
            }
        }
    }

    let mut out = String::new();
    for (desc, group) in families {
        let _ = writeln!(out, "# HELP {} {}", desc.fq_name, desc.help);
        let _ = writeln!(out, "# TYPE {} {}", desc.fq_name, desc.kind.as_str());
        for sample in group {
            let labels = format_labels(desc.labels, &sample.labels);
            match sample.value {
                SampleValue::Scalar(value) => {
                    let _ = writeln!(out, "{}{} {}", desc.fq_name, labels, value);
                }
                SampleValue::Summary { count, sum } => {
                    let _ = writeln!(out, "{}_count{} {}", desc.fq_name, labels, count);
                    let _ = writeln!(out, "{}_sum{} {}", desc.fq_name, labels, sum);
                }
            }
        }
    }
    out
}

fn format_labels(names: &[&str], values: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = names
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{}=\"{}\"", name, escape_label_value(value)))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

/// Escape a label value for the text format. Backslash, double-quote, and
/// newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
