use std::path::PathBuf;

/// Tells the scheduler whether the controlled game is still running.
pub trait ProcessProbe: Send + Sync {
    fn is_alive(&self) -> bool;
}

/// Liveness through procfs.
#[derive(Debug, Clone)]
pub struct PidProbe {
    pid: u32,
    proc_root: PathBuf,
}

impl PidProbe {
    pub fn new(pid: u32) -> PidProbe {
        PidProbe {
            pid,
            proc_root: PathBuf::from("/proc"),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl ProcessProbe for PidProbe {
    fn is_alive(&self) -> bool {
        self.proc_root.join(self.pid.to_string()).is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_alive() {
        let probe = PidProbe::new(std::process::id());
        assert!(probe.is_alive());
    }

    #[test]
    fn missing_process_is_dead() {
        let probe = PidProbe {
            pid: 42,
            proc_root: std::env::temp_dir().join("crowdplay-no-such-proc"),
        };
        assert!(!probe.is_alive());
    }
}
