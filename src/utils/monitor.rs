use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Timing and memory of one compiler phase.
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub elapsed: Duration,
    pub memory_mb: u64,
}

/// Records per-phase timing and memory when enabled.
pub struct PhaseMonitor {
    enabled: bool,
    start_time: Instant,
    phases: Mutex<Vec<PhaseStats>>,
    #[cfg(feature = "cli")]
    system: Mutex<System>,
    #[cfg(feature = "cli")]
    pid: Option<Pid>,
}

impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start_time: Instant::now(),
            phases: Mutex::new(Vec::new()),
            #[cfg(feature = "cli")]
            system: Mutex::new(System::new()),
            #[cfg(feature = "cli")]
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "cli")]
    fn memory_mb(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        let Ok(mut system) = self.system.lock() else {
            return 0;
        };
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system
            .process(pid)
            .map(|process| process.memory() / 1024 / 1024)
            .unwrap_or(0)
    }

    #[cfg(not(feature = "cli"))]
    fn memory_mb(&self) -> u64 {
        0
    }

    /// Marks the start of a phase; pass the returned instant to [`finish`](Self::finish).
    pub fn start(&self) -> Instant {
        Instant::now()
    }

    pub fn finish(&self, phase: &str, started: Instant) {
        if !self.enabled {
            return;
        }
        let stats = PhaseStats {
            phase: phase.to_string(),
            elapsed: started.elapsed(),
            memory_mb: self.memory_mb(),
        };
        tracing::info!(
            "📊 {} - Time: {:?}, Memory: {}MB",
            stats.phase,
            stats.elapsed,
            stats.memory_mb
        );
        if let Ok(mut phases) = self.phases.lock() {
            phases.push(stats);
        }
    }

    pub fn phases(&self) -> Vec<PhaseStats> {
        self.phases.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.phases().iter().map(|p| p.memory_mb).max().unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.start_time.elapsed(),
            peak
        );
    }
}

impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = PhaseMonitor::default();
        let started = monitor.start();
        monitor.finish("lex", started);
        assert!(monitor.phases().is_empty());
        assert!(!monitor.is_enabled());
    }

    #[test]
    fn test_enabled_monitor_records_phases_in_order() {
        let monitor = PhaseMonitor::new(true);
        monitor.finish("lex", monitor.start());
        monitor.finish("parse", monitor.start());
        let names: Vec<String> = monitor.phases().into_iter().map(|p| p.phase).collect();
        assert_eq!(names, vec!["lex", "parse"]);
    }
}
