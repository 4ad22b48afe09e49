// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Firestore backend for the remote progress ledger.
//!
//! Documents live in a single collection, keyed `{uid}_{urlencoded problem
//! id}`, and carry `user_id`/`problem_id` fields for queries.

use crate::error::{AppError, Result};
use crate::models::{ProblemId, ProgressRecord};
use crate::time_utils;
use serde::{Deserialize, Serialize};

/// Stored document: one record plus its owning identity and problem keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressDoc {
    user_id: String,
    problem_id: String,
    #[serde(flatten)]
    record: ProgressRecord,
}

/// Firestore-backed ledger client.
#[derive(Clone)]
pub struct FirestoreLedger {
    client: firestore::FirestoreDb,
    collection: String,
}

impl FirestoreLedger {
    /// Connect to Firestore.
    ///
    /// For local development with the emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(project_id: &str, collection: &str) -> Result<Self> {
        // With the emulator variable set, use an unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::connect_emulator(project_id, collection).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Sync(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    /// Connect to the emulator with unauthenticated access.
    async fn connect_emulator(project_id: &str, collection: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Sync(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    /// Document ID: uid joined to the urlencoded problem id.
    fn doc_id(uid: &str, problem: &ProblemId) -> String {
        format!("{}_{}", uid, urlencoding::encode(problem.as_str()))
    }

    pub(crate) async fn get(
        &self,
        uid: &str,
        problem: &ProblemId,
    ) -> Result<Option<ProgressRecord>> {
        let doc: Option<ProgressDoc> = self
            .client
            .fluent()
            .select()
            .by_id_in(self.collection.as_str())
            .obj()
            .one(&Self::doc_id(uid, problem))
            .await
            .map_err(|e| AppError::Sync(e.to_string()))?;
        Ok(doc.map(|d| d.record))
    }

    pub(crate) async fn set(
        &self,
        uid: &str,
        problem: &ProblemId,
        record: &ProgressRecord,
    ) -> Result<()> {
        let doc = ProgressDoc {
            user_id: uid.to_string(),
            problem_id: problem.as_str().to_string(),
            record: record.clone(),
        };
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(self.collection.as_str())
            .document_id(Self::doc_id(uid, problem))
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Sync(e.to_string()))?;
        Ok(())
    }

    /// Fold time/view increments into a record, creating it when absent.
    ///
    /// Read-modify-write; a racing writer is repaired by the next
    /// reconciliation pass.
    pub(crate) async fn add_time(
        &self,
        uid: &str,
        problem: &ProblemId,
        secs: u64,
        views: u32,
    ) -> Result<()> {
        let mut record = self
            .get(uid, problem)
            .await?
            .unwrap_or_else(|| ProgressRecord::new(&time_utils::now_rfc3339()));
        record.time_spent_secs = record.time_spent_secs.saturating_add(secs);
        record.view_count = record.view_count.saturating_add(views);
        record.last_updated = time_utils::now_rfc3339();
        self.set(uid, problem, &record).await
    }

    /// All records for one identity.
    pub(crate) async fn fetch_all(&self, uid: &str) -> Result<Vec<(ProblemId, ProgressRecord)>> {
        let uid = uid.to_string();
        let docs: Vec<ProgressDoc> = self
            .client
            .fluent()
            .select()
            .from(self.collection.as_str())
            .filter(move |q| q.for_all([q.field("user_id").eq(uid.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Sync(e.to_string()))?;

        Ok(docs
            .into_iter()
            .map(|d| (ProblemId::new(d.problem_id), d.record))
            .collect())
    }
}
