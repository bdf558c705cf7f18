use crate::error::{BillingError, BillingResult};
use crate::models::*;
use crate::repository::BillingStore;
use directory_service::StudentDirectory;
use notification_service::{NotificationKind, NotificationSender};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Billing service
///
/// Orchestrates bill issuance and settlement over the billing store,
/// resolving notification recipients through the student directory.
pub struct BillingService {
    store: Arc<dyn BillingStore>,
    directory: Arc<dyn StudentDirectory>,
    notifier: Arc<dyn NotificationSender>,
}

impl BillingService {
    pub fn new(
        store: Arc<dyn BillingStore>,
        directory: Arc<dyn StudentDirectory>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
        }
    }

    /// Issue a new bill to a student.
    ///
    /// The bill starts `Unpaid`; `bill_type` falls back to "SPP" when
    /// absent. The student and, when linked, the parent are notified on a
    /// best-effort basis: lookup or delivery failures never fail the bill.
    pub async fn create_bill(&self, input: CreateBillInput) -> BillingResult<Bill> {
        if input.title.trim().is_empty() {
            return Err(BillingError::validation("Title is required"));
        }
        if input.amount <= Decimal::ZERO {
            return Err(BillingError::validation("Amount must be greater than zero"));
        }

        let bill_type = match input.bill_type {
            Some(t) if !t.trim().is_empty() => t,
            _ => "SPP".to_string(),
        };

        let new = NewBill {
            student_id: input.student_id,
            title: input.title,
            bill_type,
            academic_year_id: input.academic_year_id,
            amount: input.amount,
            due_date: input.due_date,
        };

        let bill = self.store.create_bill(&new).await?;
        self.notify_bill_created(&bill).await;
        Ok(bill)
    }

    async fn notify_bill_created(&self, bill: &Bill) {
        let student = match self.directory.student_by_id(bill.student_id).await {
            Ok(Some(student)) => student,
            Ok(None) => return,
            Err(e) => {
                warn!(student_id = %bill.student_id, error = %e, "student lookup failed, skipping bill notification");
                return;
            }
        };

        if let Err(e) = self
            .notifier
            .send(
                student.user_id,
                "Tagihan Baru",
                &format!("Anda memiliki tagihan baru: {}", bill.title),
                NotificationKind::Bill,
                &bill.id.to_string(),
            )
            .await
        {
            warn!(user_id = %student.user_id, error = %e, "failed to notify student of new bill");
        }

        let Some(parent_id) = student.parent_id else {
            return;
        };

        let parent = match self.directory.parent_by_id(parent_id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return,
            Err(e) => {
                warn!(%parent_id, error = %e, "parent lookup failed, skipping bill notification");
                return;
            }
        };

        if let Err(e) = self
            .notifier
            .send(
                parent.user_id,
                "Tagihan Baru untuk Anak Anda",
                &format!("Tagihan baru untuk {}: {}", student.name, bill.title),
                NotificationKind::Bill,
                &bill.id.to_string(),
            )
            .await
        {
            warn!(user_id = %parent.user_id, error = %e, "failed to notify parent of new bill");
        }
    }

    /// Bills for every student of a unit
    pub async fn all_bills(&self, unit_id: i32) -> BillingResult<Vec<BillWithStudent>> {
        self.store.bills_by_unit(unit_id).await
    }

    /// Bills of one student
    pub async fn student_bills(&self, student_id: Uuid) -> BillingResult<Vec<BillWithStudent>> {
        self.store.bills_by_student(student_id).await
    }

    /// Bills of the student owned by the given user
    pub async fn student_bills_by_user(&self, user_id: Uuid) -> BillingResult<Vec<BillWithStudent>> {
        let student = self
            .directory
            .student_by_user(user_id)
            .await?
            .ok_or(BillingError::NotAStudent(user_id))?;
        self.student_bills(student.id).await
    }

    /// Union of the bills of every child of the parent owned by the given user
    pub async fn parent_bills(&self, user_id: Uuid) -> BillingResult<Vec<BillWithStudent>> {
        let parent = self
            .directory
            .parent_by_user(user_id)
            .await?
            .ok_or(BillingError::NotAParent(user_id))?;

        let children = self.directory.children_of_parent(parent.id).await?;
        if children.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<Uuid> = children.iter().map(|c| c.id).collect();
        self.store.bills_by_students(&student_ids).await
    }

    /// Record a settlement against a bill.
    ///
    /// The payment is stored `Success` and the bill becomes `Paid` whatever
    /// the amount: manual entries fully settle.
    pub async fn record_payment(
        &self,
        bill_id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment> {
        if amount <= Decimal::ZERO {
            return Err(BillingError::validation("Amount must be greater than zero"));
        }
        if method.trim().is_empty() {
            return Err(BillingError::validation("Payment method is required"));
        }

        self.store
            .bill_by_id(bill_id)
            .await?
            .ok_or(BillingError::NotFound("bill"))?;

        let payment = self.store.create_payment(bill_id, amount, method).await?;
        self.store.set_bill_status(bill_id, BillStatus::Paid).await?;
        Ok(payment)
    }

    pub async fn update_bill(&self, id: Uuid, update: BillUpdate) -> BillingResult<Bill> {
        if let Some(amount) = update.amount {
            if amount <= Decimal::ZERO {
                return Err(BillingError::validation("Amount must be greater than zero"));
            }
        }
        self.store.update_bill(id, &update).await
    }

    pub async fn delete_bill(&self, id: Uuid) -> BillingResult<()> {
        self.store.delete_bill(id).await
    }

    pub async fn update_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment> {
        if amount <= Decimal::ZERO {
            return Err(BillingError::validation("Amount must be greater than zero"));
        }
        if method.trim().is_empty() {
            return Err(BillingError::validation("Payment method is required"));
        }
        self.store.update_payment(id, amount, method).await
    }

    pub async fn delete_payment(&self, id: Uuid) -> BillingResult<()> {
        self.store.delete_payment(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryBillingStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use directory_service::{InMemoryDirectory, ParentRecord, StudentRecord};
    use notification_service::{NotificationError, NotificationResult};
    use rust_decimal_macros::dec;
    use tokio::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<(Uuid, String)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotificationSender for RecordingNotifier {
        async fn send(
            &self,
            user_id: Uuid,
            title: &str,
            _message: &str,
            _kind: NotificationKind,
            _reference_id: &str,
        ) -> NotificationResult<()> {
            self.sent.lock().await.push((user_id, title.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl NotificationSender for FailingNotifier {
        async fn send(
            &self,
            _user_id: Uuid,
            _title: &str,
            _message: &str,
            _kind: NotificationKind,
            _reference_id: &str,
        ) -> NotificationResult<()> {
            Err(NotificationError::Disabled)
        }
    }

    fn student(id: Uuid, user_id: Uuid, parent_id: Option<Uuid>) -> StudentRecord {
        StudentRecord {
            id,
            user_id,
            name: "Ahmad".to_string(),
            nisn: "0051234567".to_string(),
            parent_id,
            unit_id: 1,
            status: "Active".to_string(),
        }
    }

    fn bill_input(student_id: Uuid) -> CreateBillInput {
        CreateBillInput {
            student_id,
            title: "SPP Januari".to_string(),
            amount: dec!(500000),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            bill_type: None,
            academic_year_id: None,
        }
    }

    struct Fixture {
        service: BillingService,
        store: Arc<InMemoryBillingStore>,
        directory: Arc<InMemoryDirectory>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryBillingStore::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = BillingService::new(store.clone(), directory.clone(), notifier.clone());
        Fixture {
            service,
            store,
            directory,
            notifier,
        }
    }

    #[tokio::test]
    async fn create_bill_defaults_type_to_spp() {
        let f = fixture();
        let bill = f.service.create_bill(bill_input(Uuid::new_v4())).await.unwrap();
        assert_eq!(bill.bill_type, "SPP");
        assert_eq!(bill.status, BillStatus::Unpaid);
    }

    #[tokio::test]
    async fn create_bill_keeps_explicit_type() {
        let f = fixture();
        let mut input = bill_input(Uuid::new_v4());
        input.bill_type = Some("Uang Pangkal".to_string());
        let bill = f.service.create_bill(input).await.unwrap();
        assert_eq!(bill.bill_type, "Uang Pangkal");
    }

    #[tokio::test]
    async fn create_bill_rejects_blank_title() {
        let f = fixture();
        let mut input = bill_input(Uuid::new_v4());
        input.title = "  ".to_string();
        let err = f.service.create_bill(input).await.unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_bill_rejects_non_positive_amount() {
        let f = fixture();
        let mut input = bill_input(Uuid::new_v4());
        input.amount = Decimal::ZERO;
        let err = f.service.create_bill(input).await.unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_bill_notifies_student_and_parent() {
        let f = fixture();
        let student_id = Uuid::new_v4();
        let student_user = Uuid::new_v4();
        let parent_id = Uuid::new_v4();
        let parent_user = Uuid::new_v4();

        f.directory
            .insert_student(student(student_id, student_user, Some(parent_id)));
        f.directory.insert_parent(ParentRecord {
            id: parent_id,
            user_id: parent_user,
            name: "Budi".to_string(),
            phone: String::new(),
        });

        f.service.create_bill(bill_input(student_id)).await.unwrap();

        let sent = f.notifier.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, student_user);
        assert_eq!(sent[1].0, parent_user);
        assert_eq!(sent[1].1, "Tagihan Baru untuk Anak Anda");
    }

    #[tokio::test]
    async fn create_bill_without_parent_notifies_student_only() {
        let f = fixture();
        let student_id = Uuid::new_v4();
        let student_user = Uuid::new_v4();
        f.directory
            .insert_student(student(student_id, student_user, None));

        f.service.create_bill(bill_input(student_id)).await.unwrap();

        let sent = f.notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, student_user);
    }

    #[tokio::test]
    async fn create_bill_survives_notification_failure() {
        let store = Arc::new(InMemoryBillingStore::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let service =
            BillingService::new(store.clone(), directory.clone(), Arc::new(FailingNotifier));

        let student_id = Uuid::new_v4();
        directory.insert_student(student(student_id, Uuid::new_v4(), None));

        let bill = service.create_bill(bill_input(student_id)).await.unwrap();
        assert_eq!(
            store.bill_by_id(bill.id).await.unwrap().unwrap().status,
            BillStatus::Unpaid
        );
    }

    #[tokio::test]
    async fn create_bill_with_unknown_student_skips_notification() {
        let f = fixture();
        f.service.create_bill(bill_input(Uuid::new_v4())).await.unwrap();
        assert!(f.notifier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn record_payment_settles_bill_regardless_of_amount() {
        let f = fixture();
        let bill = f.service.create_bill(bill_input(Uuid::new_v4())).await.unwrap();

        // 100k against a 500k bill still fully settles it.
        let payment = f
            .service
            .record_payment(bill.id, dec!(100000), "Cash")
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.amount, dec!(100000));
        assert_eq!(
            f.store.bill_by_id(bill.id).await.unwrap().unwrap().status,
            BillStatus::Paid
        );
    }

    #[tokio::test]
    async fn record_payment_rejects_unknown_bill() {
        let f = fixture();
        let err = f
            .service
            .record_payment(Uuid::new_v4(), dec!(100000), "Cash")
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::NotFound("bill")));
    }

    #[tokio::test]
    async fn record_payment_rejects_non_positive_amount() {
        let f = fixture();
        let bill = f.service.create_bill(bill_input(Uuid::new_v4())).await.unwrap();
        let err = f
            .service
            .record_payment(bill.id, Decimal::ZERO, "Cash")
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn parent_bills_requires_parent_role() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        let err = f.service.parent_bills(user_id).await.unwrap_err();
        assert!(matches!(err, BillingError::NotAParent(id) if id == user_id));
    }

    #[tokio::test]
    async fn parent_bills_unions_children() {
        let f = fixture();
        let parent_id = Uuid::new_v4();
        let parent_user = Uuid::new_v4();
        f.directory.insert_parent(ParentRecord {
            id: parent_id,
            user_id: parent_user,
            name: "Budi".to_string(),
            phone: String::new(),
        });

        let child_a = Uuid::new_v4();
        let child_b = Uuid::new_v4();
        f.directory
            .insert_student(student(child_a, Uuid::new_v4(), Some(parent_id)));
        f.directory
            .insert_student(student(child_b, Uuid::new_v4(), Some(parent_id)));

        f.service.create_bill(bill_input(child_a)).await.unwrap();
        f.service.create_bill(bill_input(child_b)).await.unwrap();
        // Unrelated student's bill must not leak in.
        f.service.create_bill(bill_input(Uuid::new_v4())).await.unwrap();

        let bills = f.service.parent_bills(parent_user).await.unwrap();
        assert_eq!(bills.len(), 2);
    }

    #[tokio::test]
    async fn parent_bills_with_no_children_is_empty() {
        let f = fixture();
        let parent_user = Uuid::new_v4();
        f.directory.insert_parent(ParentRecord {
            id: Uuid::new_v4(),
            user_id: parent_user,
            name: "Budi".to_string(),
            phone: String::new(),
        });

        let bills = f.service.parent_bills(parent_user).await.unwrap();
        assert!(bills.is_empty());
    }

    #[tokio::test]
    async fn student_bills_by_user_requires_student_role() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        let err = f.service.student_bills_by_user(user_id).await.unwrap_err();
        assert!(matches!(err, BillingError::NotAStudent(id) if id == user_id));
    }

    #[tokio::test]
    async fn delete_bill_removes_its_payments() {
        let f = fixture();
        let bill = f.service.create_bill(bill_input(Uuid::new_v4())).await.unwrap();
        f.service
            .record_payment(bill.id, dec!(500000), "Transfer")
            .await
            .unwrap();
        assert_eq!(f.store.payment_count().await, 1);

        f.service.delete_bill(bill.id).await.unwrap();
        assert_eq!(f.store.payment_count().await, 0);
    }
}
