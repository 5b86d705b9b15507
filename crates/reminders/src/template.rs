//! Fixed message templates for reminder delivery.
//!
//! Rendered once at scheduling time and stored in the task payload, so the
//! dispatcher sends exactly what the scheduler decided.

use chrono::NaiveDate;

/// Render the payment reminder text for one contract.
pub fn payment_reminder_message(
    customer_name: &str,
    company_name: Option<&str>,
    due_on: NaiveDate,
    amount: u64,
) -> String {
    format!(
        "[Payment Reminder]\n\n\
         Dear {customer_name},\n\n\
         {subject} lease payment date is coming up.\n\n\
         Payment date: {date}\n\
         Amount due: NT$ {amount}\n\n\
         Please complete the payment before the due date. If you have any \
         questions, feel free to contact us.\n\n\
         Roost Workspace",
        subject = ownership_phrase(company_name),
        date = due_on.format("%Y/%m/%d"),
        amount = format_amount(amount),
    )
}

/// Render the renewal reminder text for one contract.
pub fn renewal_reminder_message(
    customer_name: &str,
    company_name: Option<&str>,
    ends_on: NaiveDate,
    days_remaining: u32,
) -> String {
    format!(
        "[Renewal Reminder]\n\n\
         Dear {customer_name},\n\n\
         {subject} lease is about to expire.\n\n\
         Expiry date: {date}\n\
         Days remaining: {days_remaining}\n\n\
         To renew, please contact us as early as possible so we can hold \
         your spot.\n\n\
         Roost Workspace",
        subject = ownership_phrase(company_name),
        date = ends_on.format("%Y/%m/%d"),
    )
}

fn ownership_phrase(company_name: Option<&str>) -> String {
    match company_name {
        Some(company) => format!("Your company {company}'s"),
        None => "Your".to_string(),
    }
}

/// Thousands-separated amount ("12000" -> "12,000").
fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
