//! Snapshot assembly
//!
//! Runs the register plan, fetching every planned register concurrently on
//! the blocking pool, then decodes the collected dumps into one `Snapshot`.
//! Per-module temperatures and per-tachometer speeds need a first round of
//! answers, so they go out in a second wave.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sw_error::{Result, SwitchInfoError};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::constants::thermal;
use crate::data::{FanReading, Snapshot};
use crate::decode;
use crate::plan::{fan_speed_params, module_temperature_params, plan_for, Category, IndexParams, RegisterPlan};
use crate::register::{RawRegister, RegisterDefinition, RegisterName};
use crate::tool::{PortCountSource, RegisterTool};
use crate::version::ToolVersion;

/// Identifies one fetch; keys of a run never collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchKey {
    Register(RegisterName),
    /// MTMP for a 1-based module
    Module(u32),
    /// MFSM for a tachometer
    Tacho(u32),
}

impl FetchKey {
    pub fn register(&self) -> RegisterName {
        match self {
            FetchKey::Register(r) => *r,
            FetchKey::Module(_) => RegisterName::Mtmp,
            FetchKey::Tacho(_) => RegisterName::Mfsm,
        }
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKey::Register(r) => write!(f, "{}", r),
            FetchKey::Module(m) => write!(f, "MTMP (module {})", m),
            FetchKey::Tacho(t) => write!(f, "MFSM (tacho {})", t),
        }
    }
}

/// What the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub category: Category,
    pub module_temps: bool,
}

impl SnapshotRequest {
    pub fn new(category: Category) -> Self {
        Self { category, module_temps: false }
    }

    pub fn with_module_temps(mut self, enabled: bool) -> Self {
        self.module_temps = enabled;
        self
    }

    fn wants_module_temps(&self) -> bool {
        self.module_temps && self.category.allows_module_temps()
    }
}

fn join_error(what: impl fmt::Display, e: tokio::task::JoinError) -> SwitchInfoError {
    SwitchInfoError::Generic(format!("{} task failed: {}", what, e))
}

fn timeout_error(what: impl fmt::Display, limit: Duration) -> SwitchInfoError {
    SwitchInfoError::Timeout(format!("{} did not answer within {}s", what, limit.as_secs_f32()))
}

/// Turns a register plan into a `Snapshot`
pub struct Assembler {
    tool: Arc<dyn RegisterTool>,
    ports: Arc<dyn PortCountSource>,
    version: ToolVersion,
    timeout: Option<Duration>,
}

impl Assembler {
    pub fn new(tool: Arc<dyn RegisterTool>, ports: Arc<dyn PortCountSource>, version: ToolVersion) -> Self {
        Self {
            tool,
            ports,
            version,
            timeout: None,
        }
    }

    /// Bound every external call; `None` waits forever
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn collect(&self, request: SnapshotRequest) -> Result<Snapshot> {
        let category = request.category;
        let plan = plan_for(category, self.version);
        info!("Collecting {} snapshot: {} registers", category, plan.len());

        let jobs = plan
            .iter()
            .map(|(register, params)| (FetchKey::Register(register), params.clone()))
            .collect();
        let dumps = self.fetch_wave(jobs).await?;
        let dump = |r: RegisterName| dumps.get(&FetchKey::Register(r));

        let mut snapshot = Snapshot::empty(category);
        let reports_firmware = matches!(category, Category::Inventory | Category::Status | Category::All);
        let reports_uptime = !matches!(category, Category::Inventory);

        if let Some(mgir) = dump(RegisterName::Mgir) {
            if reports_firmware {
                snapshot.identity.firmware = decode::decode_firmware(mgir)?;
            }
            if matches!(category, Category::Inventory | Category::All) {
                snapshot.identity.psid = decode::decode_psid(mgir)?;
            }
            if reports_uptime {
                snapshot.uptime = decode::decode_uptime(mgir)?;
            }
        }
        if let Some(msgi) = dump(RegisterName::Msgi) {
            decode::apply_msgi(&mut snapshot.identity, msgi)?;
        }
        if let Some(spzr) = dump(RegisterName::Spzr) {
            snapshot.identity.guid = decode::decode_guid(spzr)?;
            snapshot.identity.node_description = decode::decode_node_description(spzr)?;
        }
        if let Some(msps) = dump(RegisterName::Msps) {
            snapshot.power_supplies =
                decode::decode_power_supplies(msps, decode::PsuScope::for_category(category))?;
        }
        if let Some(mtmp) = dump(RegisterName::Mtmp) {
            snapshot.thermal = Some(decode::decode_asic(mtmp, dump(RegisterName::Mtcap))?);
        }
        if let Some(fore) = dump(RegisterName::Fore) {
            snapshot.fan_alarm = decode::decode_fan_alarm(fore)?;
        }

        // Port count and fan layout are independent of each other
        let (port_count, tachometers) = tokio::try_join!(
            self.port_count(&plan, dump(RegisterName::Mgpir)),
            self.tachometers(&plan, dump(RegisterName::Mfcr)),
        )?;
        snapshot.identity.port_count = port_count;

        let mut follow_up = Vec::new();
        if request.wants_module_temps() {
            let mut modules = port_count.unwrap_or(0);
            if modules > thermal::MAX_MODULES {
                warn!(
                    "Port count {} exceeds {} module cages, querying the first {}",
                    modules,
                    thermal::MAX_MODULES,
                    thermal::MAX_MODULES
                );
                modules = thermal::MAX_MODULES;
            }
            debug!("Querying temperatures of {} modules", modules);
            follow_up.extend((1..=modules).map(|m| (FetchKey::Module(m), module_temperature_params(m, self.version))));
        }
        if let Some(tachometers) = &tachometers {
            debug!("Active tachometers: {:?}", tachometers);
            follow_up.extend(tachometers.iter().map(|&t| (FetchKey::Tacho(t), fan_speed_params(t, self.version))));
            snapshot.fans = Some(FanReading::default());
        }

        for (key, dump) in self.fetch_wave(follow_up).await? {
            match key {
                FetchKey::Module(m) => {
                    if let (Some(celsius), Some(thermal)) =
                        (decode::decode_module_temperature(&dump)?, snapshot.thermal.as_mut())
                    {
                        thermal.modules.insert(m, celsius);
                    }
                }
                FetchKey::Tacho(t) => {
                    if let (Some(rpm), Some(fans)) = (decode::decode_fan_speed(&dump)?, snapshot.fans.as_mut()) {
                        fans.rpm.insert(t, rpm);
                    }
                }
                FetchKey::Register(_) => {}
            }
        }

        Ok(snapshot)
    }

    /// `None` when the category does not report a port count
    async fn port_count(&self, plan: &RegisterPlan, mgpir: Option<&RawRegister>) -> Result<Option<u32>> {
        if !plan.contains(RegisterName::Mgpir) {
            return Ok(None);
        }
        let mgpir = mgpir.cloned();
        let ports = Arc::clone(&self.ports);
        let count = self
            .blocking("port count", move || decode::resolve_port_count(mgpir.as_ref(), ports.as_ref()))
            .await?;
        Ok(Some(count))
    }

    /// `None` when the category does not report fans
    async fn tachometers(&self, plan: &RegisterPlan, mfcr: Option<&RawRegister>) -> Result<Option<Vec<u32>>> {
        let Some(mfcr) = mfcr.filter(|_| plan.contains(RegisterName::Mfcr)) else {
            return Ok(None);
        };
        let tool = Arc::clone(&self.tool);
        let definition: RegisterDefinition = self
            .blocking("MFCR definition", move || tool.definition(RegisterName::Mfcr))
            .await?;
        Ok(Some(decode::active_tachometers(mfcr, &definition)?))
    }

    /// Fetch every job concurrently. Errors are reported in key order, so the
    /// first failing register of the plan wins. A failed MGPIR is dropped.
    async fn fetch_wave(&self, jobs: Vec<(FetchKey, IndexParams)>) -> Result<BTreeMap<FetchKey, RawRegister>> {
        let mut set = JoinSet::new();
        for (key, params) in jobs {
            let tool = Arc::clone(&self.tool);
            let register = key.register();
            match self.timeout {
                None => {
                    set.spawn_blocking(move || (key, tool.get(register, &params)));
                }
                Some(limit) => {
                    set.spawn(async move {
                        let job = tokio::task::spawn_blocking(move || tool.get(register, &params));
                        let result = match tokio::time::timeout(limit, job).await {
                            Ok(joined) => joined.map_err(|e| join_error(key, e)).and_then(|r| r),
                            Err(_) => Err(timeout_error(key, limit)),
                        };
                        (key, result)
                    });
                }
            }
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = set.join_next().await {
            let (key, result) = joined.map_err(|e| join_error("register fetch", e))?;
            results.insert(key, result);
        }

        let mut dumps = BTreeMap::new();
        for (key, result) in results {
            match result {
                Ok(dump) => {
                    dumps.insert(key, dump);
                }
                Err(e) if key == FetchKey::Register(RegisterName::Mgpir) && !matches!(e, SwitchInfoError::Timeout(_)) => {
                    warn!("MGPIR unavailable, port count will come from the fallback source: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(dumps)
    }

    /// Run one blocking call on the blocking pool under the configured timeout
    async fn blocking<T, F>(&self, what: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let job = tokio::task::spawn_blocking(f);
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, job)
                .await
                .map_err(|_| timeout_error(what, limit))?,
            None => job.await,
        };
        joined.map_err(|e| join_error(what, e))?
    }
}
