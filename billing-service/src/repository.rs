use crate::error::{BillingError, BillingResult};
use crate::models::*;
use async_trait::async_trait;
use chrono::Utc;
use database_layer::DatabasePool;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait BillingStore: Send + Sync {
    async fn create_bill(&self, new: &NewBill) -> BillingResult<Bill>;
    async fn bill_by_id(&self, id: Uuid) -> BillingResult<Option<Bill>>;
    async fn bills_by_unit(&self, unit_id: i32) -> BillingResult<Vec<BillWithStudent>>;
    async fn bills_by_student(&self, student_id: Uuid) -> BillingResult<Vec<BillWithStudent>>;
    async fn bills_by_students(&self, student_ids: &[Uuid]) -> BillingResult<Vec<BillWithStudent>>;
    async fn update_bill(&self, id: Uuid, update: &BillUpdate) -> BillingResult<Bill>;
    async fn delete_bill(&self, id: Uuid) -> BillingResult<()>;
    async fn set_bill_status(&self, id: Uuid, status: BillStatus) -> BillingResult<()>;
    async fn create_payment(
        &self,
        bill_id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment>;
    async fn update_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment>;
    async fn delete_payment(&self, id: Uuid) -> BillingResult<()>;
}

pub struct PgBillingRepository {
    db: DatabasePool,
}

impl PgBillingRepository {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

const BILL_WITH_STUDENT_SELECT: &str = r#"
    SELECT b.*, u.name AS student_name, s.nisn AS student_nisn
    FROM bills b
    JOIN students s ON s.id = b.student_id
    JOIN users u ON u.id = s.user_id
"#;

#[async_trait]
impl BillingStore for PgBillingRepository {
    async fn create_bill(&self, new: &NewBill) -> BillingResult<Bill> {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            INSERT INTO bills (student_id, title, bill_type, academic_year_id, amount, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.student_id)
        .bind(&new.title)
        .bind(&new.bill_type)
        .bind(new.academic_year_id)
        .bind(new.amount)
        .bind(new.due_date)
        .bind(BillStatus::Unpaid)
        .fetch_one(self.db.pool())
        .await?;
        Ok(bill)
    }

    async fn bill_by_id(&self, id: Uuid) -> BillingResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(bill)
    }

    async fn bills_by_unit(&self, unit_id: i32) -> BillingResult<Vec<BillWithStudent>> {
        let bills = sqlx::query_as::<_, BillWithStudent>(&format!(
            "{BILL_WITH_STUDENT_SELECT} WHERE s.unit_id = $1 ORDER BY b.created_at DESC"
        ))
        .bind(unit_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(bills)
    }

    async fn bills_by_student(&self, student_id: Uuid) -> BillingResult<Vec<BillWithStudent>> {
        let bills = sqlx::query_as::<_, BillWithStudent>(&format!(
            "{BILL_WITH_STUDENT_SELECT} WHERE b.student_id = $1 ORDER BY b.created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(bills)
    }

    async fn bills_by_students(&self, student_ids: &[Uuid]) -> BillingResult<Vec<BillWithStudent>> {
        let bills = sqlx::query_as::<_, BillWithStudent>(&format!(
            "{BILL_WITH_STUDENT_SELECT} WHERE b.student_id = ANY($1) ORDER BY b.created_at DESC"
        ))
        .bind(student_ids.to_vec())
        .fetch_all(self.db.pool())
        .await?;
        Ok(bills)
    }

    async fn update_bill(&self, id: Uuid, update: &BillUpdate) -> BillingResult<Bill> {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills
            SET
                title = COALESCE($1, title),
                bill_type = COALESCE($2, bill_type),
                academic_year_id = COALESCE($3, academic_year_id),
                amount = COALESCE($4, amount),
                due_date = COALESCE($5, due_date),
                updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.bill_type)
        .bind(update.academic_year_id)
        .bind(update.amount)
        .bind(update.due_date)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        bill.ok_or(BillingError::NotFound("bill"))
    }

    async fn delete_bill(&self, id: Uuid) -> BillingResult<()> {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(BillingError::NotFound("bill"));
        }
        Ok(())
    }

    async fn set_bill_status(&self, id: Uuid, status: BillStatus) -> BillingResult<()> {
        let result = sqlx::query("UPDATE bills SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(BillingError::NotFound("bill"));
        }
        Ok(())
    }

    async fn create_payment(
        &self,
        bill_id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (bill_id, amount, payment_method, status, paid_at)
            VALUES ($1, $2, $3, $4, now())
            RETURNING *
            "#,
        )
        .bind(bill_id)
        .bind(amount)
        .bind(method)
        .bind(PaymentStatus::Success)
        .fetch_one(self.db.pool())
        .await?;
        Ok(payment)
    }

    async fn update_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $1, payment_method = $2, updated_at = now()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(amount)
        .bind(method)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        payment.ok_or(BillingError::NotFound("payment"))
    }

    async fn delete_payment(&self, id: Uuid) -> BillingResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(BillingError::NotFound("payment"));
        }
        Ok(())
    }
}

/// In-memory implementation for development/testing.
///
/// The unit filter and the student columns of [`BillWithStudent`] come from
/// students registered up front with [`InMemoryBillingStore::register_student`].
#[derive(Default)]
pub struct InMemoryBillingStore {
    bills: Mutex<HashMap<Uuid, Bill>>,
    payments: Mutex<HashMap<Uuid, Payment>>,
    students: Mutex<HashMap<Uuid, RegisteredStudent>>,
}

#[derive(Clone)]
struct RegisteredStudent {
    name: String,
    nisn: String,
    unit_id: i32,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_student(&self, id: Uuid, name: &str, nisn: &str, unit_id: i32) {
        self.students.lock().await.insert(
            id,
            RegisteredStudent {
                name: name.to_string(),
                nisn: nisn.to_string(),
                unit_id,
            },
        );
    }

    pub async fn payment_count(&self) -> usize {
        self.payments.lock().await.len()
    }

    async fn with_student(&self, bill: Bill) -> BillWithStudent {
        let students = self.students.lock().await;
        let student = students.get(&bill.student_id).cloned();
        BillWithStudent {
            bill,
            student_name: student.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            student_nisn: student.map(|s| s.nisn).unwrap_or_default(),
        }
    }

    async fn collect_bills<F>(&self, predicate: F) -> Vec<Bill>
    where
        F: Fn(&Bill) -> bool,
    {
        let mut bills: Vec<Bill> = self
            .bills
            .lock()
            .await
            .values()
            .filter(|b| predicate(b))
            .cloned()
            .collect();
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bills
    }
}

#[async_trait]
impl BillingStore for InMemoryBillingStore {
    async fn create_bill(&self, new: &NewBill) -> BillingResult<Bill> {
        let now = Utc::now();
        let bill = Bill {
            id: Uuid::new_v4(),
            student_id: new.student_id,
            title: new.title.clone(),
            bill_type: new.bill_type.clone(),
            academic_year_id: new.academic_year_id,
            amount: new.amount,
            due_date: new.due_date,
            status: BillStatus::Unpaid,
            payment_link: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.bills.lock().await.insert(bill.id, bill.clone());
        Ok(bill)
    }

    async fn bill_by_id(&self, id: Uuid) -> BillingResult<Option<Bill>> {
        Ok(self.bills.lock().await.get(&id).cloned())
    }

    async fn bills_by_unit(&self, unit_id: i32) -> BillingResult<Vec<BillWithStudent>> {
        let student_ids: Vec<Uuid> = {
            let students = self.students.lock().await;
            students
                .iter()
                .filter(|(_, s)| s.unit_id == unit_id)
                .map(|(id, _)| *id)
                .collect()
        };
        let bills = self
            .collect_bills(|b| student_ids.contains(&b.student_id))
            .await;
        let mut out = Vec::with_capacity(bills.len());
        for bill in bills {
            out.push(self.with_student(bill).await);
        }
        Ok(out)
    }

    async fn bills_by_student(&self, student_id: Uuid) -> BillingResult<Vec<BillWithStudent>> {
        let bills = self.collect_bills(|b| b.student_id == student_id).await;
        let mut out = Vec::with_capacity(bills.len());
        for bill in bills {
            out.push(self.with_student(bill).await);
        }
        Ok(out)
    }

    async fn bills_by_students(&self, student_ids: &[Uuid]) -> BillingResult<Vec<BillWithStudent>> {
        let bills = self
            .collect_bills(|b| student_ids.contains(&b.student_id))
            .await;
        let mut out = Vec::with_capacity(bills.len());
        for bill in bills {
            out.push(self.with_student(bill).await);
        }
        Ok(out)
    }

    async fn update_bill(&self, id: Uuid, update: &BillUpdate) -> BillingResult<Bill> {
        let mut bills = self.bills.lock().await;
        let bill = bills.get_mut(&id).ok_or(BillingError::NotFound("bill"))?;
        if let Some(title) = &update.title {
            bill.title = title.clone();
        }
        if let Some(bill_type) = &update.bill_type {
            bill.bill_type = bill_type.clone();
        }
        if let Some(academic_year_id) = update.academic_year_id {
            bill.academic_year_id = Some(academic_year_id);
        }
        if let Some(amount) = update.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = update.due_date {
            bill.due_date = due_date;
        }
        bill.updated_at = Utc::now();
        Ok(bill.clone())
    }

    async fn delete_bill(&self, id: Uuid) -> BillingResult<()> {
        self.bills
            .lock()
            .await
            .remove(&id)
            .ok_or(BillingError::NotFound("bill"))?;
        // Mirrors the schema's ON DELETE CASCADE.
        self.payments.lock().await.retain(|_, p| p.bill_id != id);
        Ok(())
    }

    async fn set_bill_status(&self, id: Uuid, status: BillStatus) -> BillingResult<()> {
        let mut bills = self.bills.lock().await;
        let bill = bills.get_mut(&id).ok_or(BillingError::NotFound("bill"))?;
        bill.status = status;
        bill.updated_at = Utc::now();
        Ok(())
    }

    async fn create_payment(
        &self,
        bill_id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment> {
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            bill_id,
            amount,
            payment_method: method.to_string(),
            status: PaymentStatus::Success,
            transaction_id: None,
            paid_at: now,
            created_at: now,
            updated_at: now,
        };
        self.payments.lock().await.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: &str,
    ) -> BillingResult<Payment> {
        let mut payments = self.payments.lock().await;
        let payment = payments
            .get_mut(&id)
            .ok_or(BillingError::NotFound("payment"))?;
        payment.amount = amount;
        payment.payment_method = method.to_string();
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn delete_payment(&self, id: Uuid) -> BillingResult<()> {
        self.payments
            .lock()
            .await
            .remove(&id)
            .ok_or(BillingError::NotFound("payment"))?;
        Ok(())
    }
}
