//! Record reconciliation
//!
//! Turns classified addresses plus the directory's current records for a
//! hostname into an ordered [`ReconciliationPlan`], then applies the plan one
//! directory call at a time.
//!
//! ## Planning rules
//!
//! For every existing record named after the hostname, in listing order:
//!
//! | record | candidate present | candidate absent |
//! |--------|-------------------|------------------|
//! | A      | update to v4      | delete           |
//! | AAAA   | update to v6      | delete           |
//!
//! A family with a candidate but no existing record gets a create after the
//! scan. Every same-type duplicate receives the same treatment; the planner
//! never picks a single canonical record.
//!
//! ## Application
//!
//! Operations run sequentially in plan order. The first failing call aborts
//! the rest. Operations already applied stay applied.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::ClassifiedAddresses;
use crate::error::Error;
use crate::traits::{DnsDirectory, DnsRecord, RecordType};

/// A single planned directory mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlannedOperation {
    /// Create a record for a family with no existing record
    Create {
        record_type: RecordType,
        content: String,
    },
    /// Overwrite an existing record's content
    Update {
        record_id: String,
        record_type: RecordType,
        previous_content: String,
        content: String,
    },
    /// Remove a record whose family was not reported
    Delete {
        record_id: String,
        record_type: RecordType,
        previous_content: String,
    },
}

impl PlannedOperation {
    /// Record type the operation acts on
    pub fn record_type(&self) -> RecordType {
        match self {
            PlannedOperation::Create { record_type, .. }
            | PlannedOperation::Update { record_type, .. }
            | PlannedOperation::Delete { record_type, .. } => *record_type,
        }
    }

    /// Content the record will hold afterwards (`None` for deletes)
    pub fn target_content(&self) -> Option<&str> {
        match self {
            PlannedOperation::Create { content, .. } | PlannedOperation::Update { content, .. } => {
                Some(content)
            }
            PlannedOperation::Delete { .. } => None,
        }
    }

    /// True for an update whose content equals the current content
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            PlannedOperation::Update { previous_content, content, .. } if previous_content == content
        )
    }
}

impl fmt::Display for PlannedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedOperation::Create { record_type, content } => {
                write!(f, "create {} {}", record_type, content)
            }
            PlannedOperation::Update {
                record_id,
                record_type,
                previous_content,
                content,
            } => write!(
                f,
                "update {} {} {} -> {}",
                record_type, record_id, previous_content, content
            ),
            PlannedOperation::Delete {
                record_id,
                record_type,
                previous_content,
            } => write!(f, "delete {} {} ({})", record_type, record_id, previous_content),
        }
    }
}

/// Ordered operations for one hostname
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    hostname: String,
    operations: Vec<PlannedOperation>,
    existing_records: usize,
}

impl ReconciliationPlan {
    /// Hostname the plan was built for
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Planned operations in execution order
    pub fn operations(&self) -> &[PlannedOperation] {
        &self.operations
    }

    /// Number of existing records the plan was derived from
    pub fn existing_records(&self) -> usize {
        self.existing_records
    }

    /// Number of planned operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True when there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Compute the plan for `hostname`
///
/// Records whose name does not match `hostname` are ignored.
pub fn reconcile(
    hostname: &str,
    classified: &ClassifiedAddresses,
    existing: &[DnsRecord],
) -> ReconciliationPlan {
    let mut operations = Vec::new();
    let mut a_satisfied = false;
    let mut aaaa_satisfied = false;
    let mut existing_records = 0;

    for record in existing.iter().filter(|r| r.is_named(hostname)) {
        existing_records += 1;

        match classified.for_record_type(record.record_type) {
            Some(candidate) => {
                match record.record_type {
                    RecordType::A => a_satisfied = true,
                    RecordType::Aaaa => aaaa_satisfied = true,
                }
                operations.push(PlannedOperation::Update {
                    record_id: record.id.clone(),
                    record_type: record.record_type,
                    previous_content: record.content.clone(),
                    content: candidate.value().to_string(),
                });
            }
            None => operations.push(PlannedOperation::Delete {
                record_id: record.id.clone(),
                record_type: record.record_type,
                previous_content: record.content.clone(),
            }),
        }
    }

    if let Some(v4) = &classified.v4
        && !a_satisfied
    {
        operations.push(PlannedOperation::Create {
            record_type: RecordType::A,
            content: v4.value().to_string(),
        });
    }

    if let Some(v6) = &classified.v6
        && !aaaa_satisfied
    {
        operations.push(PlannedOperation::Create {
            record_type: RecordType::Aaaa,
            content: v6.value().to_string(),
        });
    }

    ReconciliationPlan {
        hostname: hostname.to_string(),
        operations,
        existing_records,
    }
}

/// An operation that the directory accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedOperation {
    /// The planned operation
    pub operation: PlannedOperation,
    /// Record as returned by the directory (`None` for deletes)
    pub record: Option<DnsRecord>,
}

/// A directory call failed part-way through a plan
#[derive(Debug, Error)]
#[error("reconciliation aborted after {applied} of {planned} operation(s): {source}")]
pub struct ReconcileError {
    /// Operations applied before the failure
    pub applied: usize,
    /// Operations in the plan
    pub planned: usize,
    /// The failing call's error
    #[source]
    pub source: Error,
}

impl ReconcileError {
    /// Unwrap the underlying directory error
    pub fn into_inner(self) -> Error {
        self.source
    }
}

/// Apply `plan` against `directory`, stopping at the first failure
pub async fn apply(
    directory: &dyn DnsDirectory,
    zone_id: &str,
    plan: &ReconciliationPlan,
) -> Result<Vec<AppliedOperation>, ReconcileError> {
    let hostname = plan.hostname();
    let mut applied = Vec::with_capacity(plan.len());

    for operation in plan.operations() {
        debug!("Applying {} for {} via {}", operation, hostname, directory.provider_name());

        match apply_one(directory, zone_id, hostname, operation).await {
            Ok(record) => {
                log_applied(hostname, operation);
                applied.push(AppliedOperation {
                    operation: operation.clone(),
                    record,
                });
            }
            Err(source) => {
                if !applied.is_empty() {
                    warn!(
                        "Partial update for {}: {} of {} operation(s) applied before failure",
                        hostname,
                        applied.len(),
                        plan.len()
                    );
                }
                return Err(ReconcileError {
                    applied: applied.len(),
                    planned: plan.len(),
                    source,
                });
            }
        }
    }

    Ok(applied)
}

async fn apply_one(
    directory: &dyn DnsDirectory,
    zone_id: &str,
    hostname: &str,
    operation: &PlannedOperation,
) -> Result<Option<DnsRecord>, Error> {
    match operation {
        PlannedOperation::Create { record_type, content } => directory
            .create_record(zone_id, *record_type, hostname, content)
            .await
            .map(Some),
        PlannedOperation::Update {
            record_id,
            record_type,
            content,
            ..
        } => directory
            .update_record(zone_id, record_id, *record_type, hostname, content)
            .await
            .map(Some),
        PlannedOperation::Delete { record_id, .. } => directory
            .delete_record(zone_id, record_id)
            .await
            .map(|()| None),
    }
}

fn log_applied(hostname: &str, operation: &PlannedOperation) {
    match operation {
        PlannedOperation::Create { record_type, content } => {
            info!("Created {} record for {} with {}", record_type, hostname, content);
        }
        PlannedOperation::Update {
            record_type,
            previous_content,
            content,
            ..
        } => {
            info!(
                "Updated {} record for {} to {} (was: {})",
                record_type, hostname, content, previous_content
            );
        }
        PlannedOperation::Delete {
            record_id,
            record_type,
            previous_content,
        } => {
            info!(
                "Deleted {} record {} for {} (was: {})",
                record_type, record_id, hostname, previous_content
            );
        }
    }
}
