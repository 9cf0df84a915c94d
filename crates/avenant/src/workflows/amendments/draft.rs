use super::domain::{
    CategoryChange, ChangeSet, JobSnapshot, ModificationCategory, ProposedChange, SalarySnapshot,
    ScheduleSnapshot,
};
use crate::workflows::contracts::domain::{Contract, Department};

/// Assembles the before/after change set of an amendment from the contract's
/// current terms. Input is expected to have passed `validate_draft`.
pub struct AmendmentDraftBuilder<'a> {
    contract: &'a Contract,
    departments: &'a [Department],
}

impl<'a> AmendmentDraftBuilder<'a> {
    pub fn new(contract: &'a Contract, departments: &'a [Department]) -> Self {
        Self {
            contract,
            departments,
        }
    }

    /// Current contract values for a category, used to pre-populate `after`.
    pub fn defaults(&self, category: ModificationCategory) -> ProposedChange {
        match category {
            ModificationCategory::Salary => ProposedChange::Salary(self.salary_snapshot()),
            ModificationCategory::Schedule => ProposedChange::Schedule(self.schedule_snapshot()),
            ModificationCategory::Job => ProposedChange::Job(self.job_snapshot()),
        }
    }

    /// Build the change set. A `before` already captured by `existing` for the
    /// same category is reused verbatim; otherwise it is snapshotted now.
    pub fn build(&self, proposed: ProposedChange, existing: Option<&ChangeSet>) -> ChangeSet {
        match proposed {
            ProposedChange::Salary(after) => {
                let before = match existing {
                    Some(ChangeSet::Salary(change)) if !change.before.is_empty() => {
                        change.before.clone()
                    }
                    _ => self.salary_snapshot(),
                };
                ChangeSet::Salary(CategoryChange { before, after })
            }
            ProposedChange::Schedule(after) => {
                let before = match existing {
                    Some(ChangeSet::Schedule(change)) if !change.before.is_empty() => {
                        change.before.clone()
                    }
                    _ => self.schedule_snapshot(),
                };
                ChangeSet::Schedule(CategoryChange { before, after })
            }
            ProposedChange::Job(after) => {
                let before = match existing {
                    Some(ChangeSet::Job(change)) if !change.before.is_empty() => {
                        change.before.clone()
                    }
                    _ => self.job_snapshot(),
                };
                ChangeSet::Job(CategoryChange { before, after })
            }
        }
    }

    /// Build the change set of an amendment that amends `prior`. The new
    /// `before` is the prior `after`, with the fields it left unset taken from
    /// the contract. `None` when `prior` tracks another category.
    pub fn build_on(&self, proposed: ProposedChange, prior: &ChangeSet) -> Option<ChangeSet> {
        let changes = match (proposed, prior) {
            (ProposedChange::Salary(after), ChangeSet::Salary(prior)) => {
                let mut before = self.salary_snapshot();
                overlay(&mut before.salary_brut, &prior.after.salary_brut);
                overlay(&mut before.salary_net, &prior.after.salary_net);
                overlay(&mut before.currency, &prior.after.currency);
                overlay(&mut before.payment_method, &prior.after.payment_method);
                ChangeSet::Salary(CategoryChange { before, after })
            }
            (ProposedChange::Schedule(after), ChangeSet::Schedule(prior)) => {
                let mut before = self.schedule_snapshot();
                overlay(&mut before.schedule_type, &prior.after.schedule_type);
                overlay(&mut before.shift_work, &prior.after.shift_work);
                overlay(&mut before.annual_leave_days, &prior.after.annual_leave_days);
                overlay(&mut before.other_leaves, &prior.after.other_leaves);
                ChangeSet::Schedule(CategoryChange { before, after })
            }
            (ProposedChange::Job(after), ChangeSet::Job(prior)) => {
                let mut before = self.job_snapshot();
                overlay(&mut before.poste, &prior.after.poste);
                overlay(&mut before.department, &prior.after.department);
                overlay(&mut before.classification, &prior.after.classification);
                overlay(&mut before.work_mode, &prior.after.work_mode);
                ChangeSet::Job(CategoryChange { before, after })
            }
            _ => return None,
        };
        Some(changes)
    }

    fn salary_snapshot(&self) -> SalarySnapshot {
        let salary = &self.contract.salary;
        SalarySnapshot {
            salary_brut: Some(salary.salary_brut),
            salary_net: Some(salary.salary_net),
            currency: Some(salary.currency.clone()),
            payment_method: Some(salary.payment_method),
        }
    }

    fn schedule_snapshot(&self) -> ScheduleSnapshot {
        let schedule = &self.contract.schedule;
        ScheduleSnapshot {
            schedule_type: Some(schedule.schedule_type),
            shift_work: Some(schedule.shift_work),
            annual_leave_days: Some(schedule.annual_leave_days),
            other_leaves: schedule.other_leaves.clone(),
        }
    }

    fn job_snapshot(&self) -> JobSnapshot {
        let job = &self.contract.job;
        // Departments are recorded by display name; unknown ids are left out.
        let department = job.department_id.as_ref().and_then(|id| {
            self.departments
                .iter()
                .find(|department| &department.id == id)
                .map(|department| department.name.clone())
        });

        JobSnapshot {
            poste: Some(job.poste.clone()),
            department,
            classification: job.classification.clone(),
            work_mode: job.work_mode,
        }
    }
}

fn overlay<T: Clone>(field: &mut Option<T>, prior: &Option<T>) {
    if prior.is_some() {
        field.clone_from(prior);
    }
}
