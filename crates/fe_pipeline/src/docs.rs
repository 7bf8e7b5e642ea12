//! Result documents: `RosterDoc` (`ROS:` id) and `PairDoc` (`PAIR:` id).
//!
//! Ids hash the canonical JSON of the document body only. `generated_at` and
//! the engine stamp sit outside the body, so the same roster always gets the
//! same id.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use fe_algo::PairResult;
use fe_core::{AllocationMethod, AllocationResult, AllocationSpec, CandidateRecord, Role, Tolerance};
use fe_io::hasher::content_id;

use crate::summary::{missing_prices, BudgetSummary, MissingPrice};
use crate::{PipelineError, ENGINE_NAME, ENGINE_VERSION};

/// RFC 3339 UTC timestamp, second precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStamp {
    pub name: String,
    pub version: String,
}

impl EngineStamp {
    pub fn current() -> Self {
        Self { name: ENGINE_NAME.to_string(), version: ENGINE_VERSION.to_string() }
    }
}

/// One roster slot as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDoc {
    pub role: Role,
    pub name: String,
    pub team: String,
    pub fantasy_rating: f64,
    pub appearances: u32,
    pub price: f64,
}

impl From<&CandidateRecord> for SlotDoc {
    fn from(c: &CandidateRecord) -> Self {
        Self {
            role: c.role,
            name: c.name.clone(),
            team: c.team.clone(),
            fantasy_rating: c.fantasy_rating,
            appearances: c.appearances,
            price: c.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub satisfied_tolerance: Tolerance,
    pub used_fallback: bool,
    pub method: AllocationMethod,
    pub attempts: u32,
    pub penalty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Warnings {
    /// Only filled when a price list was supplied.
    pub missing_prices: Vec<MissingPrice>,
}

/// Hashed part of a roster document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterBody {
    pub mode: String,
    pub seed: String,
    pub catalog_sha256: String,
    pub slots: Vec<SlotDoc>,
    pub total: f64,
    pub shares: BTreeMap<Role, f64>,
    pub diagnostics: Diagnostics,
    pub summary: BudgetSummary,
    pub warnings: Warnings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterDoc {
    pub id: String,
    pub generated_at: String,
    pub engine: EngineStamp,
    #[serde(flatten)]
    pub body: RosterBody,
}

impl RosterDoc {
    pub fn build(
        mode: &str,
        result: &AllocationResult,
        spec: &AllocationSpec,
        catalog_sha256: &str,
        price_list: Option<&BTreeMap<String, f64>>,
    ) -> Result<Self, PipelineError> {
        let roster = &result.roster;
        let shares = Role::ALL.iter().map(|&r| (r, roster.share(r))).collect();
        let body = RosterBody {
            mode: mode.to_string(),
            seed: result.seed.clone(),
            catalog_sha256: catalog_sha256.to_string(),
            slots: roster.iter().map(SlotDoc::from).collect(),
            total: roster.total(),
            shares,
            diagnostics: Diagnostics {
                satisfied_tolerance: result.satisfied_tolerance,
                used_fallback: result.used_fallback,
                method: result.method,
                attempts: result.attempts,
                penalty: result.penalty,
            },
            summary: BudgetSummary::of(roster, spec),
            warnings: Warnings {
                missing_prices: price_list.map(|l| missing_prices(roster, l)).unwrap_or_default(),
            },
        };
        let id = content_id("ROS", &body)?;
        Ok(Self { id, generated_at: now_rfc3339(), engine: EngineStamp::current(), body })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityDoc {
    pub min_distinct: f64,
    /// Shared slot count.
    pub overlap: usize,
    pub overlap_fraction: f64,
    pub satisfied: bool,
    /// `seeded`, `widened_budget` or `cheapest_fallback`.
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairDoc {
    pub id: String,
    pub generated_at: String,
    pub engine: EngineStamp,
    pub first: RosterDoc,
    pub second: RosterDoc,
    pub diversity: DiversityDoc,
}

/// What a pair id covers: the two roster ids and the diversity outcome.
#[derive(Serialize)]
struct PairNoId<'a> {
    first: &'a str,
    second: &'a str,
    diversity: &'a DiversityDoc,
}

impl PairDoc {
    pub fn build(
        first: RosterDoc,
        second: RosterDoc,
        pair: &PairResult,
        min_distinct: f64,
    ) -> Result<Self, PipelineError> {
        let diversity = DiversityDoc {
            min_distinct,
            overlap: pair.overlap,
            overlap_fraction: pair.overlap_fraction,
            satisfied: pair.diversity_satisfied,
            stage: pair.stage.as_str().to_string(),
        };
        let id = content_id(
            "PAIR",
            &PairNoId { first: &first.id, second: &second.id, diversity: &diversity },
        )?;
        Ok(Self {
            id,
            generated_at: now_rfc3339(),
            engine: EngineStamp::current(),
            first,
            second,
            diversity,
        })
    }
}
