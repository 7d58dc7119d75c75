//! Connectivity probe consulted right before every weather request.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Answers whether an IP-capable transport is currently up.
///
/// Implementations must query live state on every call; the result is
/// never cached between attempts.
pub trait NetworkMonitor: Send + Sync {
    fn is_network_available(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Other,
}

impl Transport {
    pub fn carries_internet(&self) -> bool {
        !matches!(self, Transport::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceStatus {
    pub name: String,
    pub transport: Transport,
    pub up: bool,
}

pub fn any_transport_up(interfaces: &[InterfaceStatus]) -> bool {
    interfaces.iter().any(|i| i.up && i.transport.carries_internet())
}

// ARPHRD_* values from <linux/if_arp.h>.
const ARPHRD_ETHER: u32 = 1;
const ARPHRD_RAWIP: u32 = 519;

/// Reads interface state from Linux sysfs (`/sys/class/net`).
#[derive(Debug, Clone)]
pub struct SysfsNetworkMonitor {
    root: PathBuf,
}

impl Default for SysfsNetworkMonitor {
    fn default() -> Self {
        Self::new("/sys/class/net")
    }
}

impl SysfsNetworkMonitor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn interfaces(&self) -> std::io::Result<Vec<InterfaceStatus>> {
        let mut out = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "lo" {
                continue;
            }

            let dir = entry.path();
            out.push(InterfaceStatus {
                transport: classify(&name, &dir),
                up: is_up(&dir),
                name,
            });
        }

        Ok(out)
    }
}

impl NetworkMonitor for SysfsNetworkMonitor {
    fn is_network_available(&self) -> bool {
        match self.interfaces() {
            Ok(interfaces) => {
                let available = any_transport_up(&interfaces);
                tracing::debug!(?interfaces, available, "network probe");
                available
            }
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "cannot enumerate network interfaces");
                false
            }
        }
    }
}

fn classify(name: &str, dir: &Path) -> Transport {
    if dir.join("wireless").exists() || dir.join("phy80211").exists() {
        return Transport::Wifi;
    }

    let kind = read_trimmed(&dir.join("type")).and_then(|t| t.parse::<u32>().ok());

    if name.starts_with("wwan")
        || name.starts_with("rmnet")
        || name.starts_with("ppp")
        || kind == Some(ARPHRD_RAWIP)
    {
        return Transport::Cellular;
    }

    // Bridges, veth pairs and tunnels report ARPHRD_ETHER too but have no
    // backing device.
    if kind == Some(ARPHRD_ETHER) && dir.join("device").exists() {
        return Transport::Ethernet;
    }

    Transport::Other
}

fn is_up(dir: &Path) -> bool {
    match read_trimmed(&dir.join("operstate")).as_deref() {
        Some("up") => true,
        Some("unknown") => read_trimmed(&dir.join("carrier")).as_deref() == Some("1"),
        _ => false,
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeIface<'a> {
        name: &'a str,
        kind: u32,
        operstate: &'a str,
        carrier: Option<&'a str>,
        wireless: bool,
        device: bool,
    }

    impl<'a> FakeIface<'a> {
        fn ether(name: &'a str, operstate: &'a str) -> Self {
            Self { name, kind: ARPHRD_ETHER, operstate, carrier: None, wireless: false, device: true }
        }

        fn write(&self, root: &Path) {
            let dir = root.join(self.name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("type"), format!("{}\n", self.kind)).unwrap();
            fs::write(dir.join("operstate"), format!("{}\n", self.operstate)).unwrap();
            if let Some(carrier) = self.carrier {
                fs::write(dir.join("carrier"), carrier).unwrap();
            }
            if self.wireless {
                fs::create_dir_all(dir.join("wireless")).unwrap();
            }
            if self.device {
                fs::create_dir_all(dir.join("device")).unwrap();
            }
        }
    }

    fn sysfs(ifaces: &[FakeIface<'_>]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for iface in ifaces {
            iface.write(root.path());
        }
        root
    }

    #[test]
    fn wired_link_up_is_available() {
        let root = sysfs(&[FakeIface::ether("eth0", "up")]);
        let monitor = SysfsNetworkMonitor::new(root.path());

        assert!(monitor.is_network_available());
    }

    #[test]
    fn loopback_only_is_unavailable() {
        let root = sysfs(&[FakeIface { kind: 772, ..FakeIface::ether("lo", "unknown") }]);
        let monitor = SysfsNetworkMonitor::new(root.path());

        assert!(monitor.interfaces().unwrap().is_empty());
        assert!(!monitor.is_network_available());
    }

    #[test]
    fn virtual_bridge_does_not_count() {
        let root = sysfs(&[
            FakeIface { device: false, ..FakeIface::ether("docker0", "up") },
            FakeIface::ether("eth0", "down"),
        ]);
        let monitor = SysfsNetworkMonitor::new(root.path());

        assert!(!monitor.is_network_available());
    }

    #[test]
    fn wifi_and_cellular_are_classified() {
        let root = sysfs(&[
            FakeIface { wireless: true, ..FakeIface::ether("wlp2s0", "dormant") },
            FakeIface {
                kind: ARPHRD_RAWIP,
                carrier: Some("1\n"),
                ..FakeIface::ether("wwan0", "unknown")
            },
        ]);
        let monitor = SysfsNetworkMonitor::new(root.path());

        let mut ifaces = monitor.interfaces().unwrap();
        ifaces.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(ifaces[0].transport, Transport::Wifi);
        assert!(!ifaces[0].up);
        assert_eq!(ifaces[1].transport, Transport::Cellular);
        assert!(ifaces[1].up);
        assert!(monitor.is_network_available());
    }

    #[test]
    fn unreadable_root_is_unavailable() {
        let monitor = SysfsNetworkMonitor::new("/definitely/not/a/sysfs/root");
        assert!(!monitor.is_network_available());
    }

    #[test]
    fn other_transports_are_ignored() {
        let interfaces = vec![InterfaceStatus {
            name: "tun0".into(),
            transport: Transport::Other,
            up: true,
        }];

        assert!(!any_transport_up(&interfaces));
    }
}
