//! Matching desired names to zones and records, and picking stale records
//!
//! Pure functions over one pass's fetched state. Given the same inputs they
//! produce the same tasks in the same order (desired names are a `BTreeSet`).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::IpAddr;

use tracing::{debug, warn};

use crate::config::normalize_name;
use crate::model::{Record, SkipReason, UpdateTask, Zone};

/// Desired names resolved to the zone that hosts them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneAssignment {
    /// Desired name → owning zone
    pub by_name: BTreeMap<String, Zone>,
    /// Desired names no zone is a suffix of
    pub unmatched: Vec<String>,
}

impl ZoneAssignment {
    /// Zones hosting at least one desired name, each once, ordered by id
    pub fn relevant_zones(&self) -> Vec<Zone> {
        let unique: BTreeMap<&str, &Zone> = self
            .by_name
            .values()
            .map(|zone| (zone.id.as_str(), zone))
            .collect();
        unique.into_values().cloned().collect()
    }
}

/// Result of comparing fetched records with the public IP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Stale records, ordered by desired name
    pub tasks: Vec<UpdateTask>,
    /// Desired names whose record already points at the IP
    pub in_sync: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Whether `name` lives under `zone_name` (label-aware suffix match)
pub fn zone_contains(zone_name: &str, name: &str) -> bool {
    let zone_name = normalize_name(zone_name);
    if zone_name.is_empty() {
        return false;
    }
    let name = normalize_name(name);
    name == zone_name
        || name
            .strip_suffix(zone_name.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Pick the zone hosting `name`.
///
/// The longest matching zone name wins, so `home.lab.example.com` goes to
/// `lab.example.com` rather than `example.com` when both are visible. Zones
/// with identical names resolve to the smallest id.
pub fn match_zone<'a>(name: &str, zones: &'a [Zone]) -> Option<&'a Zone> {
    zones
        .iter()
        .filter(|zone| zone_contains(&zone.name, name))
        .max_by(|a, b| {
            normalize_name(&a.name)
                .len()
                .cmp(&normalize_name(&b.name).len())
                .then_with(|| b.id.cmp(&a.id))
        })
}

/// Resolve every desired name to its zone
pub fn assign_zones(desired: &BTreeSet<String>, zones: &[Zone]) -> ZoneAssignment {
    let mut assignment = ZoneAssignment::default();

    for name in desired {
        match match_zone(name, zones) {
            Some(zone) => {
                debug!("{} belongs to zone {} ({})", name, zone.name, zone.id);
                assignment.by_name.insert(name.clone(), zone.clone());
            }
            None => {
                warn!("No zone visible to the token hosts {}, skipping", name);
                assignment.unmatched.push(name.clone());
            }
        }
    }

    assignment
}

/// Find the record named `name` that can hold `ip`.
///
/// Only A records are eligible for an IPv4 address and only AAAA records for an
/// IPv6 one. If several match, the first in provider order is used.
pub fn find_record<'a>(name: &str, records: &'a [Record], ip: IpAddr) -> Option<&'a Record> {
    let mut candidates = records
        .iter()
        .filter(|record| normalize_name(&record.name) == name && record.holds_family_of(ip));

    let first = candidates.next()?;
    let extra = candidates.count();
    if extra > 0 {
        warn!(
            "{} has {} more {} record(s); only {} is managed",
            name,
            extra,
            first.record_type,
            first.id
        );
    }
    Some(first)
}

/// Compare each assigned name's record with `ip`
///
/// `records_by_zone` maps zone id to that zone's records; a zone missing from
/// the map is treated as empty.
pub fn compute_updates(
    assignment: &ZoneAssignment,
    records_by_zone: &HashMap<String, Vec<Record>>,
    ip: IpAddr,
) -> Diff {
    let mut diff = Diff {
        skipped: assignment
            .unmatched
            .iter()
            .map(|name| (name.clone(), SkipReason::NoMatchingZone))
            .collect(),
        ..Diff::default()
    };

    for (name, zone) in &assignment.by_name {
        let records = records_by_zone
            .get(&zone.id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let Some(record) = find_record(name, records, ip) else {
            warn!("No record named {} in zone {}, skipping", name, zone.name);
            diff.skipped.push((name.clone(), SkipReason::NoMatchingRecord));
            continue;
        };

        if record.is_in_sync(ip) {
            debug!("{} already points to {}", name, ip);
            diff.in_sync.push(name.clone());
            continue;
        }

        debug!("{} is stale ({} != {})", name, record.content, ip);
        diff.tasks.push(UpdateTask {
            zone: zone.clone(),
            record: record.clone(),
            new_content: ip.to_string(),
        });
    }

    diff
}

/// Full matching and diff over one pass's fetched state
pub fn diff(
    desired: &BTreeSet<String>,
    zones: &[Zone],
    records_by_zone: &HashMap<String, Vec<Record>>,
    ip: IpAddr,
) -> Diff {
    compute_updates(&assign_zones(desired, zones), records_by_zone, ip)
}
