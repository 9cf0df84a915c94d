use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{Validate, ValidationError, ValidationErrors};

use super::domain::{AmendmentDraft, JobSnapshot, ProposedChange, SalarySnapshot, ScheduleSnapshot};

const MAX_ANNUAL_LEAVE_DAYS: u16 = 366;

/// Form-level checks run before any storage call: text lengths, category
/// consistency, and the required `after` fields of the selected category.
pub fn validate_draft(draft: &AmendmentDraft) -> Result<(), ValidationErrors> {
    let mut errors = match draft.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    if draft.changes.category() != draft.type_modification {
        errors.add(
            "type_modification",
            field_error(
                "category_mismatch",
                format!(
                    "type_modification is {} but changes describe {}",
                    draft.type_modification,
                    draft.changes.category()
                ),
            ),
        );
    }

    match &draft.changes {
        ProposedChange::Salary(after) => check_salary(after, &mut errors),
        ProposedChange::Schedule(after) => check_schedule(after, &mut errors),
        ProposedChange::Job(after) => check_job(after, &mut errors),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_salary(after: &SalarySnapshot, errors: &mut ValidationErrors) {
    match after.salary_brut {
        None => errors.add("salary_brut", required("salary_brut")),
        Some(gross) if gross <= Decimal::ZERO => errors.add(
            "salary_brut",
            field_error("positive", "salary_brut must be greater than zero".to_string()),
        ),
        Some(_) => {}
    }

    if let Some(net) = after.salary_net {
        if net.is_sign_negative() {
            errors.add(
                "salary_net",
                field_error("non_negative", "salary_net cannot be negative".to_string()),
            );
        } else if after.salary_brut.is_some_and(|gross| net > gross) {
            errors.add(
                "salary_net",
                field_error(
                    "exceeds_gross",
                    "salary_net cannot exceed salary_brut".to_string(),
                ),
            );
        }
    }

    if after
        .currency
        .as_deref()
        .map_or(true, |currency| currency.trim().is_empty())
    {
        errors.add("currency", required("currency"));
    }
}

fn check_schedule(after: &ScheduleSnapshot, errors: &mut ValidationErrors) {
    if after.schedule_type.is_none() {
        errors.add("schedule_type", required("schedule_type"));
    }

    if after
        .annual_leave_days
        .is_some_and(|days| days > MAX_ANNUAL_LEAVE_DAYS)
    {
        errors.add(
            "annual_leave_days",
            field_error(
                "range",
                format!("annual_leave_days cannot exceed {MAX_ANNUAL_LEAVE_DAYS}"),
            ),
        );
    }
}

fn check_job(after: &JobSnapshot, errors: &mut ValidationErrors) {
    if after
        .poste
        .as_deref()
        .map_or(true, |poste| poste.trim().is_empty())
    {
        errors.add("poste", required("poste"));
    }
}

fn required(field: &str) -> ValidationError {
    field_error("required", format!("{field} is required"))
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}
