use std::fmt;
use std::str::FromStr;

/// Namespace reserved for slotcast slots, shared by every scope.
pub const SLOT_LOCATION: &str = r"\mailslot\slotcast\v1\";

/// Target segment meaning "every machine in the network domain".
pub const NETWORK_TARGET: &str = "*";

/// Fallback machine name when the platform does not report one.
const UNKNOWN_MACHINE: &str = "localhost";

/// Which machines a send targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Only the current machine.
    #[default]
    Local,
    /// Every machine reachable in the current network domain or workgroup.
    NetworkDomain,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::NetworkDomain => "network",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Scope::Local),
            "network" | "network-domain" | "domain" => Ok(Scope::NetworkDomain),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

/// Resolver inputs that depend on the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Name embedded in local-scope addresses. Default: the host name.
    pub machine_name: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            machine_name: machine_name(),
        }
    }
}

/// Derives slot addresses for one scope.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    scope: Scope,
    base: String,
}

impl AddressResolver {
    pub fn new(scope: Scope, config: &ResolverConfig) -> Self {
        let target = match scope {
            Scope::Local => config.machine_name.as_str(),
            Scope::NetworkDomain => NETWORK_TARGET,
        };
        Self {
            scope,
            base: format!(r"\\{target}{SLOT_LOCATION}"),
        }
    }

    /// The address prefix every channel of this scope shares.
    pub fn base_address(&self) -> &str {
        &self.base
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Full address of `channel` within this scope.
    ///
    /// The channel name is taken verbatim; validation belongs to the caller.
    pub fn resolve(&self, channel: &str) -> ResolvedAddress {
        ResolvedAddress {
            scope: self.scope,
            channel_offset: self.base.len(),
            full: format!("{}{channel}", self.base),
        }
    }
}

/// A fully resolved slot address, e.g. `\\HOST\mailslot\slotcast\v1\updates`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedAddress {
    scope: Scope,
    channel_offset: usize,
    full: String,
}

impl ResolvedAddress {
    pub fn as_str(&self) -> &str {
        &self.full
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn channel(&self) -> &str {
        &self.full[self.channel_offset..]
    }

    /// Name-safe form of the address used for named OS objects.
    ///
    /// Path separators become `.`, so every process that resolves the same
    /// address derives the same name.
    pub fn object_name(&self) -> String {
        self.full.replace('\\', ".")
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// The current machine's name, as reported by the platform.
pub fn machine_name() -> String {
    platform_machine_name().unwrap_or_else(|| UNKNOWN_MACHINE.to_string())
}

#[cfg(unix)]
fn platform_machine_name() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes; gethostname
    // writes at most that many.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..end]).trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(windows)]
fn platform_machine_name() -> Option<String> {
    std::env::var("COMPUTERNAME")
        .ok()
        .filter(|name| !name.trim().is_empty())
}

#[cfg(not(any(unix, windows)))]
fn platform_machine_name() -> Option<String> {
    None
}
