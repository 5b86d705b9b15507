//! Daily reminder scan.
//!
//! Walks the active contract book once per day, computes candidate trigger
//! dates at fixed offsets before due/expiry dates, and creates tasks through
//! the store's dedup constraint so repeated scans are idempotent. Intended
//! to run serialized (one scan in flight); the store-level constraint keeps
//! even overlapping scans from double-inserting.

use chrono::{Days, NaiveDate};

use roost_contracts::Contract;
use roost_core::DomainResult;
use roost_customers::{Channel, Customer};
use roost_reminders::{
    payment_reminder_message, renewal_reminder_message, PaymentReminderPayload,
    ReminderTask, RenewalReminderPayload,
};

use super::store::{InsertOutcome, TaskStore};

/// Days before `next_due_date` a payment reminder fires.
pub const PAYMENT_REMINDER_OFFSETS_DAYS: [u64; 2] = [7, 3];

/// Days before `end_date` a renewal reminder fires.
pub const RENEWAL_REMINDER_OFFSETS_DAYS: [u64; 2] = [60, 30];

/// Result of one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanOutcome {
    pub payment_reminders_created: usize,
    pub renewal_reminders_created: usize,
    /// Contracts whose customer has no channel identity.
    pub skipped_no_channel: usize,
    /// Candidates already covered by a pending/executed task.
    pub skipped_existing: usize,
}

/// Scans active contracts and schedules reminder tasks.
pub struct ReminderScheduler<S: TaskStore> {
    store: S,
    channel: Channel,
}

impl<S: TaskStore> ReminderScheduler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            channel: Channel::Line,
        }
    }

    /// Scan `contracts` (each joined with its customer) as of `today`.
    ///
    /// Store failures surface unmodified; dedup hits do not.
    pub fn scan(
        &self,
        contracts: &[(Contract, Customer)],
        today: NaiveDate,
    ) -> DomainResult<ScanOutcome> {
        let mut outcome = ScanOutcome::default();

        for (contract, customer) in contracts {
            if !contract.is_active() {
                continue;
            }
            if customer.channel_identity(self.channel).is_none() {
                outcome.skipped_no_channel += 1;
                continue;
            }

            if let Some(next_due) = contract.next_due_date() {
                for days_before in PAYMENT_REMINDER_OFFSETS_DAYS {
                    let Some(trigger) = next_due.checked_sub_days(Days::new(days_before))
                    else {
                        continue;
                    };
                    if trigger < today {
                        continue;
                    }
                    self.schedule_payment_reminder(
                        contract,
                        customer,
                        trigger,
                        next_due,
                        days_before as u32,
                        &mut outcome,
                    )?;
                }
            }

            if let Some(end_date) = contract.end_date() {
                for days_before in RENEWAL_REMINDER_OFFSETS_DAYS {
                    let Some(trigger) = end_date.checked_sub_days(Days::new(days_before))
                    else {
                        continue;
                    };
                    if trigger < today {
                        continue;
                    }
                    self.schedule_renewal_reminder(
                        contract,
                        customer,
                        trigger,
                        end_date,
                        days_before as u32,
                        &mut outcome,
                    )?;
                }
            }
        }

        Ok(outcome)
    }

    fn schedule_payment_reminder(
        &self,
        contract: &Contract,
        customer: &Customer,
        trigger: NaiveDate,
        due_on: NaiveDate,
        days_before: u32,
        outcome: &mut ScanOutcome,
    ) -> DomainResult<()> {
        let payload = PaymentReminderPayload {
            customer_name: customer.name().to_string(),
            company_name: customer.company_name().map(str::to_string),
            contract_name: contract.name().to_string(),
            due_on,
            amount: contract.period_amount(),
            days_before,
            message: payment_reminder_message(
                customer.name(),
                customer.company_name(),
                due_on,
                contract.period_amount(),
            ),
        };
        let task = ReminderTask::payment_reminder(
            customer.id_typed(),
            contract.id_typed(),
            trigger,
            payload,
        );

        match self.store.insert_if_absent(task)? {
            InsertOutcome::Inserted(task_id) => {
                tracing::info!(
                    %task_id,
                    customer_id = %customer.id_typed(),
                    contract_id = %contract.id_typed(),
                    scheduled_on = %trigger,
                    days_before,
                    "created payment reminder task"
                );
                outcome.payment_reminders_created += 1;
            }
            InsertOutcome::AlreadyScheduled => outcome.skipped_existing += 1,
        }
        Ok(())
    }

    fn schedule_renewal_reminder(
        &self,
        contract: &Contract,
        customer: &Customer,
        trigger: NaiveDate,
        ends_on: NaiveDate,
        days_remaining: u32,
        outcome: &mut ScanOutcome,
    ) -> DomainResult<()> {
        let payload = RenewalReminderPayload {
            customer_name: customer.name().to_string(),
            company_name: customer.company_name().map(str::to_string),
            contract_name: contract.name().to_string(),
            ends_on,
            days_remaining,
            message: renewal_reminder_message(
                customer.name(),
                customer.company_name(),
                ends_on,
                days_remaining,
            ),
        };
        let task = ReminderTask::renewal_reminder(
            customer.id_typed(),
            contract.id_typed(),
            trigger,
            payload,
        );

        match self.store.insert_if_absent(task)? {
            InsertOutcome::Inserted(task_id) => {
                tracing::info!(
                    %task_id,
                    customer_id = %customer.id_typed(),
                    contract_id = %contract.id_typed(),
                    scheduled_on = %trigger,
                    days_remaining,
                    "created renewal reminder task"
                );
                outcome.renewal_reminders_created += 1;
            }
            InsertOutcome::AlreadyScheduled => outcome.skipped_existing += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::store::{InMemoryTaskStore, TaskFilter};
    use roost_contracts::BillingCadence;
    use roost_core::{BranchId, ContractId, CustomerId};
    use roost_reminders::{TaskStatus, TaskType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_customer(line: bool) -> Customer {
        let customer = Customer::new(CustomerId::new(), BranchId::new(), "Ada Chen").unwrap();
        if line {
            customer.with_line_user_id("U1234567890")
        } else {
            customer
        }
    }

    fn test_contract(customer: &Customer) -> Contract {
        Contract::new(
            ContractId::new(),
            customer.branch_id(),
            customer.id_typed(),
            "Hot desk A-12",
            BillingCadence::Monthly,
            15,
            12_000,
        )
        .unwrap()
    }

    #[test]
    fn creates_both_payment_offsets_when_due_date_is_far() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(true);
        let contract = test_contract(&customer).with_next_due_date(date(2024, 6, 15));

        let today = date(2024, 6, 1);
        let outcome = scheduler.scan(&[(contract, customer)], today).unwrap();

        assert_eq!(outcome.payment_reminders_created, 2);
        assert_eq!(outcome.renewal_reminders_created, 0);

        let tasks = store.list(&TaskFilter::default(), 10).unwrap();
        let mut scheduled: Vec<_> = tasks.iter().map(|t| t.scheduled_on()).collect();
        scheduled.sort();
        assert_eq!(scheduled, vec![date(2024, 6, 8), date(2024, 6, 12)]);
    }

    #[test]
    fn past_triggers_are_not_created() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(true);
        // 7-day trigger (June 3) is already behind today (June 10); only the
        // 3-day one (June 12) remains.
        let contract = test_contract(&customer).with_next_due_date(date(2024, 6, 15));

        let outcome = scheduler
            .scan(&[(contract, customer)], date(2024, 6, 10))
            .unwrap();
        assert_eq!(outcome.payment_reminders_created, 1);

        let tasks = store.list(&TaskFilter::default(), 10).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].scheduled_on(), date(2024, 6, 12));
    }

    #[test]
    fn renewal_sixty_day_offset_lands_today() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(true);
        let today = date(2024, 6, 1);
        // end_date = today + 60 days: the 60-day trigger is today, the
        // 30-day one is still a month out and gets created for its own day.
        let end = today + chrono::Duration::days(60);
        let contract = test_contract(&customer)
            .with_term(date(2024, 1, 1), end)
            .unwrap();

        let outcome = scheduler.scan(&[(contract, customer)], today).unwrap();
        assert_eq!(outcome.renewal_reminders_created, 2);

        let filter = TaskFilter {
            task_type: Some(TaskType::RenewalReminder),
            scheduled_on: Some(today),
            ..TaskFilter::default()
        };
        let todays = store.list(&filter, 10).unwrap();
        assert_eq!(todays.len(), 1);
        match todays[0].payload() {
            roost_reminders::ReminderPayload::Renewal(p) => {
                assert_eq!(p.days_remaining, 60);
                assert_eq!(p.ends_on, end);
            }
            _ => panic!("Expected renewal payload"),
        }
    }

    #[test]
    fn second_scan_creates_nothing_new() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(true);
        let contract = test_contract(&customer)
            .with_term(date(2024, 1, 1), date(2024, 8, 31))
            .unwrap()
            .with_next_due_date(date(2024, 6, 15));
        let book = vec![(contract, customer)];
        let today = date(2024, 6, 1);

        let first = scheduler.scan(&book, today).unwrap();
        assert!(first.payment_reminders_created + first.renewal_reminders_created > 0);

        let second = scheduler.scan(&book, today).unwrap();
        assert_eq!(second.payment_reminders_created, 0);
        assert_eq!(second.renewal_reminders_created, 0);
        assert_eq!(
            second.skipped_existing,
            first.payment_reminders_created + first.renewal_reminders_created
        );
    }

    #[test]
    fn customers_without_line_identity_are_skipped_silently() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(false);
        let contract = test_contract(&customer).with_next_due_date(date(2024, 6, 15));

        let outcome = scheduler
            .scan(&[(contract, customer)], date(2024, 6, 1))
            .unwrap();
        assert_eq!(outcome.payment_reminders_created, 0);
        assert_eq!(outcome.skipped_no_channel, 1);
        assert!(store.list(&TaskFilter::default(), 10).unwrap().is_empty());
    }

    #[test]
    fn inactive_contracts_are_ignored() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(true);
        let contract = test_contract(&customer)
            .with_next_due_date(date(2024, 6, 15))
            .with_active(false);

        let outcome = scheduler
            .scan(&[(contract, customer)], date(2024, 6, 1))
            .unwrap();
        assert_eq!(outcome, ScanOutcome::default());
    }

    #[test]
    fn payment_payload_carries_rendered_message() {
        let store = InMemoryTaskStore::arc();
        let scheduler = ReminderScheduler::new(store.clone());
        let customer = test_customer(true).with_company_name("Nimbus Studio");
        let contract = test_contract(&customer).with_next_due_date(date(2024, 6, 15));

        scheduler
            .scan(&[(contract, customer)], date(2024, 6, 1))
            .unwrap();

        let tasks = store.list(&TaskFilter::default(), 10).unwrap();
        let task = &tasks[0];
        assert_eq!(task.status(), TaskStatus::Pending);
        match task.payload() {
            roost_reminders::ReminderPayload::Payment(p) => {
                assert_eq!(p.amount, 12_000);
                assert_eq!(p.due_on, date(2024, 6, 15));
                assert!(p.message.contains("NT$ 12,000"));
                assert!(p.message.contains("Nimbus Studio"));
            }
            _ => panic!("Expected payment payload"),
        }
    }
}
