//! OS-process statistics: file descriptors, memory, CPU, and load averages.

use crate::exposition::{Desc, MetricKind, Sample};
use crate::stats::Process;

use super::NAMESPACE;

#[derive(Debug)]
pub struct ProcessDescs {
    open_file_descriptors: Desc,
    max_file_descriptors: Desc,
    total_virtual_memory: Desc,
    process_time: Desc,
    cpu_usage: Desc,
    load_average: Desc,
}

impl ProcessDescs {
    pub fn new() -> Self {
        let desc = |name, help, kind, labels| Desc::new(NAMESPACE, "process", name, help, kind, labels);
        Self {
            open_file_descriptors: desc(
                "open_file_descriptors",
                "Current open file descriptors",
                MetricKind::Gauge,
                &[],
            ),
            max_file_descriptors: desc("max_file_descriptors", "Max file descriptors", MetricKind::Gauge, &[]),
            total_virtual_memory: desc(
                "total_virtual_memory_bytes",
                "Was the used virtual memory.",
                MetricKind::Gauge,
                &[],
            ),
            process_time: desc(
                "process_time_seconds",
                "Was the total process time.",
                MetricKind::Counter,
                &[],
            ),
            cpu_usage: desc("cpu_usage_ratio", "Was the CPU usage", MetricKind::Gauge, &[]),
            load_average: desc(
                "load_average",
                "Was the system load average",
                MetricKind::Gauge,
                &["load"],
            ),
        }
    }

    pub fn collect<'a>(&'a self, process: &Process, out: &mut Vec<Sample<'a>>) {
        out.push(Sample::new(
            &self.open_file_descriptors,
            process.open_file_descriptors as f64,
            vec![],
        ));
        out.push(Sample::new(
            &self.max_file_descriptors,
            process.max_file_descriptors as f64,
            vec![],
        ));
        out.push(Sample::new(
            &self.total_virtual_memory,
            process.mem.total_virtual_in_bytes as f64,
            vec![],
        ));
        out.push(Sample::new(
            &self.process_time,
            process.cpu.total_in_millis as f64 / 1000.0,
            vec![],
        ));
        out.push(Sample::new(
            &self.cpu_usage,
            process.cpu.percent as f64 / 100.0,
            vec![],
        ));

        let load = &process.cpu.load_average;
        for (window, value) in [("1", load.load_1m), ("5", load.load_5m), ("15", load.load_15m)] {
            out.push(Sample::new(&self.load_average, value, vec![window.to_string()]));
        }
    }
}
