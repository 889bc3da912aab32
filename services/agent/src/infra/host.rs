//! Host-level probing: capacity sampling, advertised-IP detection, GPU
//! detection and the TCP port scanner.

use std::net::UdpSocket;
use std::sync::Mutex;
use std::time::Duration;

use sysinfo::System;

use crate::domain::repository::PortScanner;

/// Probe deadline for one port-free check.
const PORT_PROBE_DEADLINE: Duration = Duration::from_millis(200);

/// Capacity part of the snapshot that comes from the OS rather than the
/// container engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSample {
    pub total_cpu: u32,
    /// Instantaneous global CPU usage expressed in vCPUs.
    pub used_cpu: f64,
    pub total_mem_mb: u64,
    pub used_mem_mb: u64,
}

/// Cached [`sysinfo::System`]; CPU usage is a delta measurement, so the
/// same instance must be refreshed across samples to mean anything.
pub struct HostStats {
    sys: Mutex<System>,
}

impl HostStats {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }

    pub fn sample(&self) -> HostSample {
        let mut sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let total_cpu = sys.cpus().len().max(1) as u32;
        let used_cpu = f64::from(sys.global_cpu_usage()) / 100.0 * f64::from(total_cpu);
        let total_mem_mb = sys.total_memory() / (1024 * 1024);
        let available_mb = sys.available_memory() / (1024 * 1024);

        HostSample {
            total_cpu,
            used_cpu,
            total_mem_mb,
            used_mem_mb: total_mem_mb.saturating_sub(available_mb),
        }
    }
}

impl Default for HostStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort local IP: UDP-connect toward a public address and read the
/// socket's local half. No packet is sent; falls back to loopback.
pub fn local_ip_probe() -> String {
    fn probe() -> Option<String> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        Some(socket.local_addr().ok()?.ip().to_string())
    }
    probe().unwrap_or_else(|| "127.0.0.1".to_owned())
}

/// GPU capability heuristic: `nvidia-smi` somewhere on PATH.
pub fn gpu_tooling_present() -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join("nvidia-smi").is_file())
}

/// Real scanner: a port is free iff a TCP connect to `127.0.0.1:port`
/// fails within the probe deadline.
#[derive(Clone, Copy, Default)]
pub struct TcpPortScanner;

impl PortScanner for TcpPortScanner {
    async fn is_free(&self, port: u16) -> bool {
        let connect = tokio::net::TcpStream::connect(("127.0.0.1", port));
        !matches!(
            tokio::time::timeout(PORT_PROBE_DEADLINE, connect).await,
            Ok(Ok(_))
        )
    }
}
