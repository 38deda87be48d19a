//! Exportable resource kinds and the pipeline that exports them
//!
//! Each [`ResourceKind`] names its listing sources, optional detail
//! hydration, auxiliary data and the transform that turns the collected
//! records into sheets.

use std::fmt;

use clap::ValueEnum;
use clap::builder::PossibleValue;
use serde::Serialize;
use serde_json::Value;

use crate::client::PageStrategy;
use crate::output::SheetBundle;

pub mod orchestrator;
pub mod transform;
pub mod value;

pub use orchestrator::{ExportOutcome, ExportStatus, Exporter, RunContext, Stage, run};

use transform::exclusions;

/// Entities endpoint and how many ids it accepts per request
#[derive(Debug, Clone, Copy)]
pub struct Details {
    pub endpoint: &'static str,
    pub batch_size: usize,
}

/// One listing endpoint feeding an export
#[derive(Debug, Clone, Copy)]
pub struct Source {
    /// Section label; exclusion sheets are named after it
    pub name: &'static str,
    pub endpoint: &'static str,
    pub strategy: PageStrategy,
    pub page_size: usize,
    /// Set when the listing returns ids that need hydrating
    pub details: Option<Details>,
}

const fn combined(name: &'static str, endpoint: &'static str, page_size: usize) -> Source {
    Source {
        name,
        endpoint,
        strategy: PageStrategy::ShortPage,
        page_size,
        details: None,
    }
}

const fn exclusion(name: &'static str, endpoint: &'static str, details: &'static str) -> Source {
    Source {
        name,
        endpoint,
        strategy: PageStrategy::ShortPage,
        page_size: 100,
        // Entities endpoints cap query length; one id per request
        details: Some(Details {
            endpoint: details,
            batch_size: 1,
        }),
    }
}

const PREVENTION: [Source; 1] = [combined("prevention policies", "/policy/combined/prevention/v1", 5000)];
const RESPONSE: [Source; 1] = [combined("response policies", "/policy/combined/response/v1", 5000)];
const SENSOR_UPDATE: [Source; 1] = [combined(
    "sensor update policies",
    "/policy/combined/sensor-update/v2",
    5000,
)];
const DEVICE_CONTROL: [Source; 1] = [combined(
    "device control policies",
    "/policy/combined/device-control/v1",
    5000,
)];
const EXCLUSIONS: [Source; 4] = [
    exclusion(
        exclusions::CERTIFICATE,
        "/exclusions/queries/cert-based-exclusions/v1",
        "/exclusions/entities/cert-based-exclusions/v1",
    ),
    exclusion(
        exclusions::MACHINE_LEARNING,
        "/policy/queries/ml-exclusions/v1",
        "/policy/entities/ml-exclusions/v1",
    ),
    exclusion(
        exclusions::IOA,
        "/policy/queries/ioa-exclusions/v1",
        "/policy/entities/ioa-exclusions/v1",
    ),
    exclusion(
        exclusions::SENSOR_VISIBILITY,
        "/policy/queries/sv-exclusions/v1",
        "/policy/entities/sv-exclusions/v1",
    ),
];
const HOST_GROUPS: [Source; 1] = [Source {
    name: "host groups",
    endpoint: "/devices/combined/host-groups/v1",
    strategy: PageStrategy::TotalCount,
    page_size: 100,
    details: None,
}];
const IOA_RULES: [Source; 1] = [Source {
    name: "IOA rule groups",
    endpoint: "/ioarules/queries/rule-groups/v1",
    strategy: PageStrategy::ShortPage,
    page_size: 500,
    details: Some(Details {
        endpoint: "/ioarules/entities/rule-groups/v1",
        batch_size: 1,
    }),
}];
const IOCS: [Source; 1] = [combined("indicators", "/iocs/combined/indicator/v1", 2000)];

/// Listing of hosts with their assigned prevention policy
pub const PREVENTION_MEMBERS: &str = "/policy/combined/prevention-members/v1";
pub const PREVENTION_MEMBERS_PAGE_SIZE: usize = 5000;
/// Device listing whose reported total is the installed host count
pub const DEVICES: &str = "/devices/combined/devices/v1";

/// Extra data a kind needs besides its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxRequest {
    None,
    /// Prevention policy assignment per host; failure is tolerated
    PreventionMembers,
    /// Installed host total
    InstalledHosts,
}

/// Fetched auxiliary data
#[derive(Debug, Clone, PartialEq)]
pub enum AuxData {
    None,
    /// `None` when the members listing failed
    PreventionMembers(Option<Vec<Value>>),
    InstalledHosts(u64),
}

/// Records gathered from one source
#[derive(Debug, Clone)]
pub struct SourceRecords {
    pub source: Source,
    /// Items the listing returned (records or ids)
    pub listed: usize,
    pub records: Vec<Value>,
}

/// Everything a transform consumes
#[derive(Debug, Clone)]
pub struct Collected {
    pub sections: Vec<SourceRecords>,
    pub aux: AuxData,
}

impl Collected {
    /// Records of the first (for most kinds the only) source
    pub fn primary(&self) -> &[Value] {
        self.sections
            .first()
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }
}

/// Exportable resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Prevention policies (settings by platform)
    Prevention,
    /// Real time response policies
    Response,
    /// Sensor update policies
    SensorUpdate,
    /// USB device control policies
    #[value(alias = "usb")]
    DeviceControl,
    /// Certificate, ML, IOA and sensor visibility exclusions
    Exclusions,
    /// Host groups and installed host total
    HostGroups,
    /// Custom IOA rules
    IoaRules,
    /// Indicators of compromise
    Iocs,
}

impl ResourceKind {
    /// Every kind, in export-all order.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Prevention,
        ResourceKind::Response,
        ResourceKind::SensorUpdate,
        ResourceKind::DeviceControl,
        ResourceKind::Exclusions,
        ResourceKind::HostGroups,
        ResourceKind::IoaRules,
        ResourceKind::Iocs,
    ];

    /// Output file prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::Prevention => "crowdstrike_policies",
            ResourceKind::Response => "crowdstrike_response_policies",
            ResourceKind::SensorUpdate => "crowdstrike_sensor_update_policies",
            ResourceKind::DeviceControl => "crowdstrike_usb_policies",
            ResourceKind::Exclusions => "crowdstrike_exclusions",
            ResourceKind::HostGroups => "crowdstrike_hostgroups",
            ResourceKind::IoaRules => "crowdstrike_ioa_rules",
            ResourceKind::Iocs => "crowdstrike_iocs",
        }
    }

    /// CLI name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Prevention => "prevention",
            ResourceKind::Response => "response",
            ResourceKind::SensorUpdate => "sensor-update",
            ResourceKind::DeviceControl => "device-control",
            ResourceKind::Exclusions => "exclusions",
            ResourceKind::HostGroups => "host-groups",
            ResourceKind::IoaRules => "ioa-rules",
            ResourceKind::Iocs => "iocs",
        }
    }

    pub fn sources(&self) -> &'static [Source] {
        match self {
            ResourceKind::Prevention => &PREVENTION,
            ResourceKind::Response => &RESPONSE,
            ResourceKind::SensorUpdate => &SENSOR_UPDATE,
            ResourceKind::DeviceControl => &DEVICE_CONTROL,
            ResourceKind::Exclusions => &EXCLUSIONS,
            ResourceKind::HostGroups => &HOST_GROUPS,
            ResourceKind::IoaRules => &IOA_RULES,
            ResourceKind::Iocs => &IOCS,
        }
    }

    pub fn aux(&self) -> AuxRequest {
        match self {
            ResourceKind::Prevention => AuxRequest::PreventionMembers,
            ResourceKind::HostGroups => AuxRequest::InstalledHosts,
            _ => AuxRequest::None,
        }
    }

    /// Turn collected records into sheets. Pure.
    pub fn transform(&self, collected: &Collected) -> SheetBundle {
        let records = collected.primary();
        match self {
            ResourceKind::Prevention => {
                let members = match &collected.aux {
                    AuxData::PreventionMembers(members) => members.as_deref(),
                    _ => None,
                };
                transform::prevention::transform(records, members)
            }
            ResourceKind::Response => transform::response::transform(records),
            ResourceKind::SensorUpdate => transform::sensor_update::transform(records),
            ResourceKind::DeviceControl => transform::device_control::transform(records),
            ResourceKind::Exclusions => {
                let sections: Vec<(&str, &[Value])> = collected
                    .sections
                    .iter()
                    .filter(|s| s.listed > 0)
                    .map(|s| (s.source.name, s.records.as_slice()))
                    .collect();
                transform::exclusions::transform(&sections)
            }
            ResourceKind::HostGroups => {
                let total = match collected.aux {
                    AuxData::InstalledHosts(total) => total,
                    _ => 0,
                };
                transform::host_groups::transform(records, total)
            }
            ResourceKind::IoaRules => transform::ioa_rules::transform(records),
            ResourceKind::Iocs => transform::iocs::transform(records),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What `csexport export` was asked for: one kind or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    All,
    Kind(ResourceKind),
}

impl ExportTarget {
    pub fn kinds(&self) -> Vec<ResourceKind> {
        match self {
            ExportTarget::All => ResourceKind::ALL.to_vec(),
            ExportTarget::Kind(kind) => vec![*kind],
        }
    }
}

impl ValueEnum for ExportTarget {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            ExportTarget::All,
            ExportTarget::Kind(ResourceKind::Prevention),
            ExportTarget::Kind(ResourceKind::Response),
            ExportTarget::Kind(ResourceKind::SensorUpdate),
            ExportTarget::Kind(ResourceKind::DeviceControl),
            ExportTarget::Kind(ResourceKind::Exclusions),
            ExportTarget::Kind(ResourceKind::HostGroups),
            ExportTarget::Kind(ResourceKind::IoaRules),
            ExportTarget::Kind(ResourceKind::Iocs),
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            ExportTarget::All => Some(PossibleValue::new("all").help("Every resource kind, one file each")),
            ExportTarget::Kind(kind) => kind.to_possible_value(),
        }
    }
}
