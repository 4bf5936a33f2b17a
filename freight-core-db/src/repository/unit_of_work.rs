use async_trait::async_trait;
use uuid::Uuid;

use crate::models::audit::AuditLogModel;
use crate::models::package::{ConsolidatedPackageModel, ConsolidationHistoryModel, PackageModel};
use freight_core_api::{CommitError, ConsolidationEventDetails};

/// A write staged into a unit of work.
#[derive(Debug, Clone)]
pub enum StagedOp {
    /// Insert a new consolidated group. The store assigns the consolidated
    /// tracking number (`CONS-YYYYMMDD-NNNN`) inside the committing
    /// transaction so numbers cannot collide.
    InsertConsolidatedPackage(ConsolidatedPackageModel),

    UpdateConsolidatedPackage(ConsolidatedPackageModel),

    UpdatePackage(PackageModel),

    /// Append one history record. The store assigns the chain hashes and
    /// the audit log reference at commit time.
    AppendHistory {
        consolidated_package_id: Uuid,
        performed_by_person_id: Uuid,
        details: ConsolidationEventDetails,
    },
}

/// Optimistic concurrency check re-evaluated at commit time: the package's
/// linkage field must still hold the value the operation observed during
/// its pre-check, otherwise the whole commit is rejected with a conflict.
#[derive(Debug, Clone, Copy)]
pub struct LinkageGuard {
    pub package_id: Uuid,
    pub expected_consolidated_package_id: Option<Uuid>,
}

/// Cache entries to drop once the owning transaction has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheInvalidation {
    ConsolidatedPackage(Uuid),
    Customer(Uuid),
    All,
}

/// All-or-nothing change set for one engine operation: entity writes, the
/// history append and one audit log, plus the cache invalidations to apply
/// strictly after the commit succeeds.
#[derive(Debug)]
pub struct UnitOfWork {
    pub audit_log: AuditLogModel,
    pub ops: Vec<StagedOp>,
    pub linkage_guards: Vec<LinkageGuard>,
    pub invalidations: Vec<CacheInvalidation>,
}

impl UnitOfWork {
    pub fn new(actor_id: Uuid) -> Self {
        Self {
            audit_log: AuditLogModel::new(actor_id),
            ops: Vec::new(),
            linkage_guards: Vec::new(),
            invalidations: Vec::new(),
        }
    }

    pub fn stage(&mut self, op: StagedOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn guard_linkage(&mut self, package_id: Uuid, expected: Option<Uuid>) -> &mut Self {
        self.linkage_guards.push(LinkageGuard {
            package_id,
            expected_consolidated_package_id: expected,
        });
        self
    }

    pub fn invalidate(&mut self, invalidation: CacheInvalidation) -> &mut Self {
        if !self.invalidations.contains(&invalidation) {
            self.invalidations.push(invalidation);
        }
        self
    }
}

/// Result of a committed unit of work.
#[derive(Debug)]
pub struct CommitOutcome {
    pub audit_log_id: Uuid,

    /// Inserted and updated groups with store-assigned fields populated
    pub consolidated_packages: Vec<ConsolidatedPackageModel>,

    /// History records as sealed into the chain
    pub history: Vec<ConsolidationHistoryModel>,

    /// Drained invalidations for the caller to apply after the commit
    pub invalidations: Vec<CacheInvalidation>,
}

/// Backends apply a unit of work atomically: every staged write, the
/// history append and the audit log land together, or the whole commit is
/// rejected and no state changes.
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    async fn commit(&self, unit_of_work: UnitOfWork) -> Result<CommitOutcome, CommitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_invalidations_are_collapsed() {
        let customer_id = Uuid::new_v4();
        let mut uow = UnitOfWork::new(Uuid::new_v4());
        uow.invalidate(CacheInvalidation::Customer(customer_id))
            .invalidate(CacheInvalidation::Customer(customer_id))
            .invalidate(CacheInvalidation::All);
        assert_eq!(uow.invalidations.len(), 2);
    }

    #[test]
    fn audit_log_carries_the_actor() {
        let actor_id = Uuid::new_v4();
        let uow = UnitOfWork::new(actor_id);
        assert_eq!(uow.audit_log.performed_by_person_id, actor_id);
    }
}
