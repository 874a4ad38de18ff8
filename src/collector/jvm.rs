//! JVM runtime statistics: threads, heap, memory pools, and GC.

use crate::exposition::{Desc, MetricKind, Sample};
use crate::stats::{Jvm, JvmPool};

use super::NAMESPACE;

#[derive(Debug)]
pub struct JvmDescs {
    threads_count: Desc,
    heap_used_ratio: Desc,
    heap_committed_bytes: Desc,
    heap_used_bytes: Desc,
    pool_used_bytes: Desc,
    pool_committed_bytes: Desc,
    pool_max_bytes: Desc,
    gc: Desc,
}

impl JvmDescs {
    pub fn new() -> Self {
        let gauge = |name, help, labels| Desc::new(NAMESPACE, "jvm", name, help, MetricKind::Gauge, labels);
        Self {
            threads_count: gauge("threads_count", "Current JVM thread count.", &[]),
            heap_used_ratio: gauge("heap_used_ratio", "Current JVM heap usage ratio.", &[]),
            heap_committed_bytes: gauge("heap_committed_bytes", "Current JVM heap committed size", &[]),
            heap_used_bytes: gauge("heap_used_bytes", "Current JVM heap used size", &[]),
            pool_used_bytes: gauge("memory_pool_used_bytes", "Current JVM heap pool used size", &["pool"]),
            pool_committed_bytes: gauge(
                "memory_pool_committed_bytes",
                "Current JVM heap pool committed size",
                &["pool"],
            ),
            pool_max_bytes: gauge("memory_pool_max_bytes", "Current JVM heap pool max size", &["pool"]),
            gc: Desc::new(
                NAMESPACE,
                "jvm",
                "gc_collection_duration_seconds",
                "GC collection duration.",
                MetricKind::Summary,
                &["collector"],
            ),
        }
    }

    pub fn collect<'a>(&'a self, jvm: &Jvm, out: &mut Vec<Sample<'a>>) {
        out.push(Sample::new(&self.threads_count, jvm.threads.count as f64, vec![]));

        out.push(Sample::new(
            &self.heap_used_ratio,
            jvm.mem.heap_used_percent as f64 / 100.0,
            vec![],
        ));
        out.push(Sample::new(
            &self.heap_committed_bytes,
            jvm.mem.heap_committed_in_bytes as f64,
            vec![],
        ));
        out.push(Sample::new(
            &self.heap_used_bytes,
            jvm.mem.heap_used_in_bytes as f64,
            vec![],
        ));

        self.collect_pool("young", &jvm.mem.pools.young, out);
        self.collect_pool("survivor", &jvm.mem.pools.survivor, out);
        self.collect_pool("old", &jvm.mem.pools.old, out);

        for (generation, gc) in [
            ("young", &jvm.gc.collectors.young),
            ("old", &jvm.gc.collectors.old),
        ] {
            out.push(Sample::summary(
                &self.gc,
                gc.collection_count,
                gc.collection_time_in_millis as f64 / 1000.0,
                vec![generation.to_string()],
            ));
        }
    }

    fn collect_pool<'a>(&'a self, name: &str, pool: &JvmPool, out: &mut Vec<Sample<'a>>) {
        out.push(Sample::new(
            &self.pool_used_bytes,
            pool.used_in_bytes as f64,
            vec![name.to_string()],
        ));
        out.push(Sample::new(
            &self.pool_committed_bytes,
            pool.committed_in_bytes as f64,
            vec![name.to_string()],
        ));
        out.push(Sample::new(
            &self.pool_max_bytes,
            pool.max_in_bytes as f64,
            vec![name.to_string()],
        ));
    }
}
