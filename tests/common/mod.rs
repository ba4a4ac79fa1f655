//! In-memory `ContractStore` shared by the signing tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;
use uuid::Uuid;

use glee_backend::models::contract_signatures::{
    self, AdminSignatureFields, MemberSignatureFields, RecordStatus,
};
use glee_backend::models::contracts::{self, ContractStatus};
use glee_backend::signing::{ContractStore, DraftFields};

#[derive(Default)]
pub struct MemoryStore {
    contracts: Mutex<HashMap<Uuid, contracts::Model>>,
    records: Mutex<HashMap<Uuid, contract_signatures::Model>>,
    /// When set, every load waits here after reading, so concurrent callers
    /// all see the same revision.
    load_barrier: Option<Arc<Barrier>>,
    fail_loads: AtomicBool,
    fail_commits: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_barrier(parties: usize) -> Self {
        Self {
            load_barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn insert_contract(&self, content: &str, status: ContractStatus) -> Uuid {
        let id = Uuid::new_v4();
        let contract = contracts::Model {
            id,
            title: "Fall Tour Participation Agreement".to_string(),
            content: content.to_string(),
            status,
            member_id: Some(Uuid::new_v4()),
            created_by: Uuid::new_v4(),
            revision: 0,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.contracts.lock().unwrap().insert(id, contract);
        id
    }

    pub fn contract(&self, id: Uuid) -> contracts::Model {
        self.contracts.lock().unwrap()[&id].clone()
    }

    pub fn find_contract(&self, id: Uuid) -> Option<contracts::Model> {
        self.contracts.lock().unwrap().get(&id).cloned()
    }

    pub fn record(&self, contract_id: Uuid) -> Option<contract_signatures::Model> {
        self.records.lock().unwrap().get(&contract_id).cloned()
    }

    pub fn fail_loads(&self) {
        self.fail_loads.store(true, Ordering::SeqCst);
    }

    pub fn fail_commits(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn empty_record(contract_id: Uuid) -> contract_signatures::Model {
        contract_signatures::Model {
            id: Uuid::new_v4(),
            contract_id,
            admin_signature_data: None,
            admin_signed_at: None,
            member_signature_data: None,
            member_signed_at: None,
            status: RecordStatus::Pending,
            date_signed: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

#[async_trait]
impl ContractStore for MemoryStore {
    async fn load_contract(&self, id: Uuid) -> Result<Option<contracts::Model>, DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(DbErr::Custom("connection refused".to_string()));
        }
        let contract = self.contracts.lock().unwrap().get(&id).cloned();

        if let Some(barrier) = &self.load_barrier {
            barrier.wait().await;
        }
        Ok(contract)
    }

    async fn upsert_admin_signature(
        &self,
        fields: AdminSignatureFields,
    ) -> Result<contract_signatures::Model, DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(fields.contract_id)
            .or_insert_with(|| Self::empty_record(fields.contract_id));

        record.admin_signature_data = Some(fields.signature_data);
        record.admin_signed_at = Some(fields.signed_at);
        record.date_signed = Some(fields.date_signed);
        record.status = RecordStatus::Completed;
        record.updated_at = Some(Utc::now());
        Ok(record.clone())
    }

    async fn upsert_member_signature(
        &self,
        fields: MemberSignatureFields,
    ) -> Result<contract_signatures::Model, DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(fields.contract_id)
            .or_insert_with(|| Self::empty_record(fields.contract_id));

        record.member_signature_data = Some(fields.signature_data);
        record.member_signed_at = Some(fields.signed_at);
        record.updated_at = Some(Utc::now());
        Ok(record.clone())
    }

    async fn commit_contract(
        &self,
        id: Uuid,
        expected_revision: i64,
        content: String,
        status: ContractStatus,
    ) -> Result<Option<contracts::Model>, DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(DbErr::Custom("connection reset by peer".to_string()));
        }

        let mut contracts = self.contracts.lock().unwrap();
        let Some(contract) = contracts.get_mut(&id) else {
            return Ok(None);
        };
        if contract.revision != expected_revision {
            return Ok(None);
        }

        contract.content = content;
        contract.status = status;
        contract.revision += 1;
        contract.updated_at = Some(Utc::now());
        Ok(Some(contract.clone()))
    }

    async fn commit_draft(
        &self,
        id: Uuid,
        expected_revision: i64,
        draft: DraftFields,
    ) -> Result<Option<contracts::Model>, DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut contracts = self.contracts.lock().unwrap();
        let Some(contract) = contracts.get_mut(&id) else {
            return Ok(None);
        };
        if contract.revision != expected_revision || contract.status != ContractStatus::Draft {
            return Ok(None);
        }

        contract.title = draft.title;
        contract.content = draft.content;
        contract.member_id = draft.member_id;
        contract.revision += 1;
        contract.updated_at = Some(Utc::now());
        Ok(Some(contract.clone()))
    }

    async fn delete_draft(&self, id: Uuid, expected_revision: i64) -> Result<bool, DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut contracts = self.contracts.lock().unwrap();
        let still_draft = contracts.get(&id).is_some_and(|c| {
            c.revision == expected_revision && c.status == ContractStatus::Draft
        });
        if still_draft {
            contracts.remove(&id);
        }
        Ok(still_draft)
    }
}
