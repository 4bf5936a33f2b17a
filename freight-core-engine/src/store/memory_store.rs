use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use heapless::String as HeaplessString;
use parking_lot::RwLock;
use uuid::Uuid;

use freight_core_api::CommitError;
use freight_core_db::models::audit::AuditLogModel;
use freight_core_db::models::customer::CustomerModel;
use freight_core_db::models::package::{
    ConsolidatedPackageModel, ConsolidationHistoryModel, PackageModel,
};
use freight_core_db::models::person::PersonModel;
use freight_core_db::repository::pagination::{Page, PageRequest};
use freight_core_db::repository::{
    CommitOutcome, ConsolidatedPackageRepository, ConsolidationHistoryRepository,
    CustomerRepository, PackageRepository, PersonRepository, StagedOp, TransactionalStore,
    UnitOfWork,
};

/// In-memory transactional backend.
///
/// All state lives behind one `RwLock`. `commit` takes the write lock,
/// re-checks every linkage guard inside the same critical section that
/// performs the writes, and applies the staged ops to a draft copy of the
/// state that is swapped in only when every op succeeds. The lock is never
/// held across an await point.
pub struct MemoryStore {
    state: RwLock<StoreState>,
    /// Repository reads served so far; lets cache tests observe hits
    reads: AtomicU64,
}

#[derive(Default, Clone)]
struct StoreState {
    packages: HashMap<Uuid, PackageModel>,
    consolidated_packages: HashMap<Uuid, ConsolidatedPackageModel>,
    /// Ordered per group; insertion order is timestamp order
    history: HashMap<Uuid, Vec<ConsolidationHistoryModel>>,
    customers: HashMap<Uuid, CustomerModel>,
    persons: HashMap<Uuid, PersonModel>,
    audit_logs: HashMap<Uuid, AuditLogModel>,
    /// Per-day sequence for consolidated tracking numbers; never reused
    daily_sequences: HashMap<NaiveDate, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            reads: AtomicU64::new(0),
        }
    }

    /// Number of repository reads served from persisted state.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    // Package intake and account management are external collaborators;
    // the seed methods below are their interface into this store.

    pub fn seed_customer(&self, customer: CustomerModel) {
        self.state.write().customers.insert(customer.id, customer);
    }

    pub fn seed_person(&self, person: PersonModel) {
        self.state.write().persons.insert(person.id, person);
    }

    pub fn seed_package(&self, package: PackageModel) {
        self.state.write().packages.insert(package.id, package);
    }

    fn next_tracking_number(
        state: &mut StoreState,
        date: NaiveDate,
    ) -> Result<HeaplessString<50>, CommitError> {
        let sequence = state.daily_sequences.entry(date).or_insert(0);
        *sequence += 1;
        let number = format!("CONS-{}-{:04}", date.format("%Y%m%d"), sequence);
        HeaplessString::try_from(number.as_str())
            .map_err(|_| CommitError::Storage("tracking number exceeds field bounds".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageRepository for MemoryStore {
    async fn load_package(
        &self,
        id: Uuid,
    ) -> Result<Option<PackageModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        Ok(self.state.read().packages.get(&id).cloned())
    }

    async fn load_packages(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<PackageModel>>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        Ok(ids.iter().map(|id| state.packages.get(id).cloned()).collect())
    }

    async fn list_packages(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<PackageModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        let mut packages: Vec<PackageModel> = state
            .packages
            .values()
            .filter(|package| customer_id.is_none_or(|id| package.customer_id == id))
            .cloned()
            .collect();
        packages.sort_by_key(|package| package.created_at);
        Ok(packages)
    }

    async fn find_by_consolidated_package_id(
        &self,
        consolidated_package_id: Uuid,
    ) -> Result<Vec<PackageModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        let mut packages: Vec<PackageModel> = state
            .packages
            .values()
            .filter(|package| package.consolidated_package_id == Some(consolidated_package_id))
            .cloned()
            .collect();
        packages.sort_by_key(|package| package.created_at);
        Ok(packages)
    }

    async fn find_available_for_consolidation(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<PackageModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        let mut packages: Vec<PackageModel> = state
            .packages
            .values()
            .filter(|package| {
                package.customer_id == customer_id
                    && !package.is_consolidated
                    && !package.status.is_terminal()
            })
            .cloned()
            .collect();
        packages.sort_by_key(|package| package.created_at);
        Ok(packages)
    }
}

#[async_trait]
impl ConsolidatedPackageRepository for MemoryStore {
    async fn load_consolidated_package(
        &self,
        id: Uuid,
    ) -> Result<Option<ConsolidatedPackageModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        Ok(self.state.read().consolidated_packages.get(&id).cloned())
    }

    async fn list_consolidated_packages(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<ConsolidatedPackageModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        let mut groups: Vec<ConsolidatedPackageModel> = state
            .consolidated_packages
            .values()
            .filter(|group| customer_id.is_none_or(|id| group.customer_id == id))
            .cloned()
            .collect();
        groups.sort_by_key(|group| group.consolidated_at);
        Ok(groups)
    }
}

#[async_trait]
impl ConsolidationHistoryRepository for MemoryStore {
    async fn find_history(
        &self,
        consolidated_package_id: Uuid,
    ) -> Result<Vec<ConsolidationHistoryModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        Ok(state
            .history
            .get(&consolidated_package_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn load_history_page(
        &self,
        consolidated_package_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ConsolidationHistoryModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        let records = state
            .history
            .get(&consolidated_package_id)
            .map(|chain| chain.as_slice())
            .unwrap_or_default();
        let total = records.len();
        let items: Vec<ConsolidationHistoryModel> = records
            .iter()
            .rev()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect();
        Ok(Page::new(items, total, page.limit, page.offset))
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn load_customer(
        &self,
        id: Uuid,
    ) -> Result<Option<CustomerModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        Ok(self.state.read().customers.get(&id).cloned())
    }
}

#[async_trait]
impl PersonRepository for MemoryStore {
    async fn load_person(
        &self,
        id: Uuid,
    ) -> Result<Option<PersonModel>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        Ok(self.state.read().persons.get(&id).cloned())
    }

    async fn load_persons(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<PersonModel>>, Box<dyn std::error::Error + Send + Sync>> {
        self.record_read();
        let state = self.state.read();
        Ok(ids.iter().map(|id| state.persons.get(id).cloned()).collect())
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn commit(&self, unit_of_work: UnitOfWork) -> Result<CommitOutcome, CommitError> {
        let UnitOfWork {
            audit_log,
            ops,
            linkage_guards,
            invalidations,
        } = unit_of_work;

        let mut state = self.state.write();

        // Re-check every linkage guard inside the critical section. A
        // competing commit may have linked or released a package after this
        // operation's pre-check.
        for guard in &linkage_guards {
            let package = state.packages.get(&guard.package_id).ok_or_else(|| {
                CommitError::NotFound(format!("package {} not found", guard.package_id))
            })?;
            if package.consolidated_package_id != guard.expected_consolidated_package_id {
                return Err(CommitError::Conflict(format!(
                    "package {} is already consolidated",
                    package.tracking_number.as_str()
                )));
            }
        }

        // Apply to a draft so a failing op cannot leave partial state.
        let mut draft = state.clone();
        let mut outcome = CommitOutcome {
            audit_log_id: audit_log.id,
            consolidated_packages: Vec::new(),
            history: Vec::new(),
            invalidations,
        };

        for op in ops {
            match op {
                StagedOp::InsertConsolidatedPackage(mut group) => {
                    let date = group.consolidated_at.date_naive();
                    group.tracking_number = Self::next_tracking_number(&mut draft, date)?;
                    draft.consolidated_packages.insert(group.id, group.clone());
                    outcome.consolidated_packages.push(group);
                }
                StagedOp::UpdateConsolidatedPackage(group) => {
                    if !draft.consolidated_packages.contains_key(&group.id) {
                        return Err(CommitError::NotFound(format!(
                            "consolidated package {} not found",
                            group.id
                        )));
                    }
                    draft.consolidated_packages.insert(group.id, group.clone());
                    outcome.consolidated_packages.push(group);
                }
                StagedOp::UpdatePackage(package) => {
                    if !draft.packages.contains_key(&package.id) {
                        return Err(CommitError::NotFound(format!(
                            "package {} not found",
                            package.id
                        )));
                    }
                    draft.packages.insert(package.id, package);
                }
                StagedOp::AppendHistory {
                    consolidated_package_id,
                    performed_by_person_id,
                    details,
                } => {
                    let mut record = ConsolidationHistoryModel::new(
                        consolidated_package_id,
                        performed_by_person_id,
                        details,
                    );
                    let chain = draft.history.entry(consolidated_package_id).or_default();
                    record
                        .chain_from_antecedent(chain.last(), audit_log.id)
                        .map_err(CommitError::Storage)?;
                    chain.push(record.clone());
                    outcome.history.push(record);
                }
            }
        }

        draft.audit_logs.insert(audit_log.id, audit_log);
        *state = draft;
        Ok(outcome)
    }
}
