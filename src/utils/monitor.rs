use crate::domain::model::MemoryUsage;
use crate::domain::ports::Diagnostics;
use crate::utils::error::{AppError, Result};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessesToUpdate, System};

/// 以 sysinfo 讀取目前行程的記憶體與啟動時間
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Pid,
    start_time: Instant,
}

impl SystemMonitor {
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid().map_err(|e| AppError::DiagnosticsError {
            message: format!("Failed to get current PID: {}", e),
        })?;

        Ok(Self {
            system: Mutex::new(System::new()),
            pid,
            start_time: Instant::now(),
        })
    }
}

impl Diagnostics for SystemMonitor {
    fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn memory(&self) -> Result<MemoryUsage> {
        let mut system = self.system.lock().map_err(|_| AppError::DiagnosticsError {
            message: "System monitor lock poisoned".to_string(),
        })?;

        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);

        let process = system
            .process(self.pid)
            .ok_or_else(|| AppError::DiagnosticsError {
                message: format!("Process {} not found", self.pid),
            })?;

        Ok(MemoryUsage {
            rss: process.memory(),
            virtual_memory: process.virtual_memory(),
            system_total: system.total_memory(),
            system_used: system.used_memory(),
        })
    }
}
