use crate::{
    auth::AuthService,
    db::DbPool,
    entities::{
        vendor_documents::{self, DocumentStatus},
        vendors::{self, VendorStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Registration payload for a new vendor account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterVendorInput {
    #[validate(length(min = 1, max = 255))]
    pub business_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub gst_number: String,
    #[validate(length(min = 1, max = 50))]
    pub license_number: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadDocumentInput {
    #[validate(length(min = 1, max = 100))]
    pub doc_type: String,
    #[validate(length(min = 1, max = 1000))]
    pub file_url: String,
}

/// A vendor together with its uploaded documents.
#[derive(Debug, Clone, Serialize)]
pub struct VendorDetail {
    #[serde(flatten)]
    pub vendor: vendors::Model,
    pub documents: Vec<vendor_documents::Model>,
}

/// Service for vendor onboarding: registration, document verification and
/// the admin approval gate.
#[derive(Clone)]
pub struct VendorService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    auth: Arc<AuthService>,
}

impl VendorService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, auth: Arc<AuthService>) -> Self {
        Self {
            db_pool,
            event_sender,
            auth,
        }
    }

    /// Registers a new vendor account. The account starts in `PENDING` status
    /// and cannot bid until an admin approves it.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterVendorInput) -> Result<vendors::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let password_hash = self.auth.hash_password(&input.password)?;

        let vendor = vendors::ActiveModel {
            business_name: Set(input.business_name),
            email: Set(input.email.to_lowercase()),
            password_hash: Set(password_hash),
            gst_number: Set(input.gst_number),
            license_number: Set(input.license_number),
            address: Set(input.address),
            status: Set(VendorStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(vendor_id = vendor.id, "vendor registered");
        self.publish(Event::VendorRegistered {
            vendor_id: vendor.id,
        })
        .await;

        Ok(vendor)
    }

    /// Attaches a compliance document to the vendor's profile, pending
    /// verification.
    #[instrument(skip(self, input))]
    pub async fn upload_document(
        &self,
        vendor_id: i32,
        input: UploadDocumentInput,
    ) -> Result<vendor_documents::Model, ServiceError> {
        input.validate()?;
        let doc_type = input.doc_type.trim().to_string();
        let file_url = input.file_url.trim().to_string();
        if doc_type.is_empty() || file_url.is_empty() {
            return Err(ServiceError::ValidationError(
                "Document type and file URL must not be blank".to_string(),
            ));
        }
        let now = Utc::now();

        // The vendor must still exist (tokens can outlive account removal).
        vendors::Entity::find_by_id(vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        let document = vendor_documents::ActiveModel {
            vendor_id: Set(vendor_id),
            doc_type: Set(doc_type),
            file_url: Set(file_url),
            status: Set(DocumentStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        self.publish(Event::VendorDocumentUploaded {
            vendor_id,
            doc_id: document.id,
        })
        .await;

        Ok(document)
    }

    /// Marks a document as verified by the given admin.
    #[instrument(skip(self))]
    pub async fn verify_document(
        &self,
        admin_id: i32,
        doc_id: i32,
        remarks: Option<String>,
    ) -> Result<vendor_documents::Model, ServiceError> {
        let document = self
            .set_document_status(admin_id, doc_id, DocumentStatus::Verified, remarks)
            .await?;
        self.publish(Event::VendorDocumentVerified {
            doc_id,
            verified_by: admin_id,
        })
        .await;
        Ok(document)
    }

    /// Marks a document as rejected by the given admin. Rejections must carry
    /// remarks so the vendor knows what to fix.
    #[instrument(skip(self))]
    pub async fn reject_document(
        &self,
        admin_id: i32,
        doc_id: i32,
        remarks: Option<String>,
    ) -> Result<vendor_documents::Model, ServiceError> {
        let remarks = require_remarks(remarks)?;
        let document = self
            .set_document_status(admin_id, doc_id, DocumentStatus::Rejected, Some(remarks))
            .await?;
        self.publish(Event::VendorDocumentRejected {
            doc_id,
            verified_by: admin_id,
        })
        .await;
        Ok(document)
    }

    async fn set_document_status(
        &self,
        admin_id: i32,
        doc_id: i32,
        status: DocumentStatus,
        remarks: Option<String>,
    ) -> Result<vendor_documents::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let document = vendor_documents::Entity::find_by_id(doc_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Document {} not found", doc_id)))?;

        // Lock the owning vendor row: document decisions and the approval
        // gate both contend on it, so they serialize.
        vendors::Entity::find_by_id(document.vendor_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vendor {} not found", document.vendor_id))
            })?;

        let mut active: vendor_documents::ActiveModel = document.into();
        active.status = Set(status);
        active.verified_by = Set(Some(admin_id));
        active.verified_at = Set(Some(Utc::now()));
        active.remarks = Set(remarks);
        active.updated_at = Set(Utc::now());
        let document = active.update(&txn).await?;
        txn.commit().await?;
        Ok(document)
    }

    /// Approves a vendor for bidding. Approval is gated on the document set:
    /// the vendor needs at least one document and every document must be
    /// verified.
    #[instrument(skip(self))]
    pub async fn approve_vendor(
        &self,
        vendor_id: i32,
        remarks: Option<String>,
    ) -> Result<vendors::Model, ServiceError> {
        // The vendor row is locked while the document set is read, so a
        // concurrent document rejection waits behind the approval (and vice
        // versa) instead of slipping between check and status flip.
        let txn = self.db_pool.begin().await?;

        let vendor = vendors::Entity::find_by_id(vendor_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        let documents = vendor
            .find_related(vendor_documents::Entity)
            .all(&txn)
            .await?;

        if documents.is_empty() {
            return Err(ServiceError::VendorNotEligible(
                "Vendor has no documents on file".to_string(),
            ));
        }
        if documents
            .iter()
            .any(|doc| doc.status != DocumentStatus::Verified)
        {
            return Err(ServiceError::VendorNotEligible(
                "All vendor documents must be verified before approval".to_string(),
            ));
        }

        let mut active: vendors::ActiveModel = vendor.into();
        active.status = Set(VendorStatus::Approved);
        active.updated_at = Set(Utc::now());
        let vendor = active.update(&txn).await?;
        txn.commit().await?;

        info!(vendor_id, remarks = remarks.as_deref(), "vendor approved");
        self.publish(Event::VendorApproved { vendor_id }).await;

        Ok(vendor)
    }

    /// Rejects a vendor's application. Like document rejection, this requires
    /// remarks explaining the decision.
    #[instrument(skip(self))]
    pub async fn reject_vendor(
        &self,
        vendor_id: i32,
        remarks: Option<String>,
    ) -> Result<vendors::Model, ServiceError> {
        let remarks = require_remarks(remarks)?;
        let vendor = vendors::Entity::find_by_id(vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        let mut active: vendors::ActiveModel = vendor.into();
        active.status = Set(VendorStatus::Rejected);
        active.updated_at = Set(Utc::now());
        let vendor = active.update(&*self.db_pool).await?;

        info!(vendor_id, remarks = %remarks, "vendor rejected");

        self.publish(Event::VendorRejected { vendor_id }).await;

        Ok(vendor)
    }

    /// Lists vendors, newest first. The filter accepts `ALL` or one of the
    /// status names; anything else is a validation error.
    #[instrument(skip(self))]
    pub async fn list_vendors(
        &self,
        status_filter: Option<String>,
    ) -> Result<Vec<vendors::Model>, ServiceError> {
        let status = match status_filter.as_deref().map(str::to_uppercase).as_deref() {
            None | Some("ALL") => None,
            Some("PENDING") => Some(VendorStatus::Pending),
            Some("APPROVED") => Some(VendorStatus::Approved),
            Some("REJECTED") => Some(VendorStatus::Rejected),
            Some(other) => {
                return Err(ServiceError::ValidationError(format!(
                    "Unknown vendor status filter: {}",
                    other
                )))
            }
        };

        let mut query = vendors::Entity::find().order_by_desc(vendors::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(vendors::Column::Status.eq(status));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    /// Fetches a vendor together with its uploaded documents.
    #[instrument(skip(self))]
    pub async fn get_vendor_detail(&self, vendor_id: i32) -> Result<VendorDetail, ServiceError> {
        let vendor = vendors::Entity::find_by_id(vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;
        let documents = vendor
            .find_related(vendor_documents::Entity)
            .order_by_asc(vendor_documents::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(VendorDetail { vendor, documents })
    }

    /// Looks up a vendor by login email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<vendors::Model>, ServiceError> {
        Ok(vendors::Entity::find()
            .filter(vendors::Column::Email.eq(email.to_lowercase()))
            .one(&*self.db_pool)
            .await?)
    }

    /// The mutation is already committed when events go out; a delivery
    /// failure is logged rather than surfaced as an error.
    async fn publish(&self, event: Event) {
        if let Err(err) = self.event_sender.send(event).await {
            warn!(error = %err, "event delivery failed");
        }
    }
}

fn require_remarks(remarks: Option<String>) -> Result<String, ServiceError> {
    match remarks {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ServiceError::ValidationError(
            "Rejection requires remarks".to_string(),
        )),
    }
}
