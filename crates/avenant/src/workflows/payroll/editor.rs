use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::salary::{SalaryBreakdown, SalaryRecalculator};
use crate::workflows::contracts::domain::{Contract, PaymentFrequency, PaymentMethod};

/// Single edit applied to the salary section of a contract draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SalaryEdit {
    SetBaseSalary { amount: Option<Decimal> },
    SetCnssAffiliation { affiliated: bool },
    SetPrime { name: String, amount: Decimal },
    RemovePrime { name: String },
    SetCurrency { currency: String },
    SetPaymentMethod { method: PaymentMethod },
    SetPaymentFrequency { frequency: PaymentFrequency },
}

impl SalaryEdit {
    /// Only base salary and CNSS affiliation edits trigger a recomputation.
    pub fn triggers_recalculation(&self) -> bool {
        matches!(
            self,
            SalaryEdit::SetBaseSalary { .. } | SalaryEdit::SetCnssAffiliation { .. }
        )
    }
}

/// Reducer over a contract draft. Derived salary figures are recomputed as a
/// pure function of the draft after each triggering edit.
#[derive(Debug, Clone)]
pub struct ContractSalaryEditor {
    draft: Contract,
    recalculator: SalaryRecalculator,
    last_breakdown: Option<SalaryBreakdown>,
}

impl ContractSalaryEditor {
    pub fn new(contract: Contract, recalculator: SalaryRecalculator) -> Self {
        Self {
            draft: contract,
            recalculator,
            last_breakdown: None,
        }
    }

    pub fn draft(&self) -> &Contract {
        &self.draft
    }

    pub fn last_breakdown(&self) -> Option<SalaryBreakdown> {
        self.last_breakdown
    }

    pub fn apply(&mut self, edit: SalaryEdit) -> Option<SalaryBreakdown> {
        let recalculate = edit.triggers_recalculation();
        let salary = &mut self.draft.salary;

        match edit {
            SalaryEdit::SetBaseSalary { amount } => salary.base_salary = amount,
            SalaryEdit::SetCnssAffiliation { affiliated } => salary.cnss_affiliation = affiliated,
            SalaryEdit::SetPrime { name, amount } => {
                salary.primes.insert(name, amount);
            }
            SalaryEdit::RemovePrime { name } => {
                salary.primes.remove(&name);
            }
            SalaryEdit::SetCurrency { currency } => salary.currency = currency,
            SalaryEdit::SetPaymentMethod { method } => salary.payment_method = method,
            SalaryEdit::SetPaymentFrequency { frequency } => salary.payment_frequency = frequency,
        }

        if recalculate {
            if let Some(breakdown) = self.recalculator.apply(salary) {
                self.last_breakdown = Some(breakdown);
            }
        }

        self.last_breakdown
    }

    pub fn apply_all<I>(&mut self, edits: I) -> Option<SalaryBreakdown>
    where
        I: IntoIterator<Item = SalaryEdit>,
    {
        for edit in edits {
            self.apply(edit);
        }
        self.last_breakdown
    }

    pub fn into_contract(self) -> Contract {
        self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::contracts::domain::{
        ContractId, ContractStatus, EmployeeId, JobTerms, SalaryTerms, ScheduleTerms, ScheduleType,
    };
    use std::collections::BTreeMap;

    fn contract() -> Contract {
        Contract {
            id: ContractId("ctr-1".to_string()),
            employee_id: EmployeeId("emp-1".to_string()),
            status: ContractStatus::Active,
            job: JobTerms {
                poste: "Comptable".to_string(),
                department_id: None,
                classification: None,
                work_mode: None,
            },
            salary: SalaryTerms {
                base_salary: Some(Decimal::from(6_000)),
                primes: BTreeMap::new(),
                cnss_affiliation: false,
                salary_brut: Decimal::from(6_000),
                salary_net: Decimal::from(6_000),
                currency: "MAD".to_string(),
                payment_method: PaymentMethod::BankTransfer,
                payment_frequency: PaymentFrequency::Monthly,
            },
            schedule: ScheduleTerms {
                schedule_type: ScheduleType::FullTime,
                shift_work: false,
                annual_leave_days: 18,
                other_leaves: None,
            },
        }
    }

    #[test]
    fn base_salary_edit_recomputes_figures() {
        let mut editor = ContractSalaryEditor::new(contract(), SalaryRecalculator::default());
        editor.apply(SalaryEdit::SetCnssAffiliation { affiliated: true });
        let breakdown = editor
            .apply(SalaryEdit::SetBaseSalary {
                amount: Some(Decimal::from(10_000)),
            })
            .expect("breakdown after base edit");

        assert_eq!(breakdown.net, Decimal::new(955_200, 2));
        assert_eq!(editor.draft().salary.salary_brut, Decimal::from(10_000));
        assert_eq!(editor.draft().salary.salary_net, Decimal::new(955_200, 2));
    }

    #[test]
    fn prime_edit_waits_for_next_trigger() {
        let mut editor = ContractSalaryEditor::new(contract(), SalaryRecalculator::default());
        editor.apply(SalaryEdit::SetPrime {
            name: "transport".to_string(),
            amount: Decimal::from(400),
        });
        assert_eq!(editor.draft().salary.salary_brut, Decimal::from(6_000));

        editor.apply(SalaryEdit::SetCnssAffiliation { affiliated: false });
        assert_eq!(editor.draft().salary.salary_brut, Decimal::from(6_400));
    }

    #[test]
    fn clearing_base_salary_keeps_previous_figures() {
        let mut editor = ContractSalaryEditor::new(contract(), SalaryRecalculator::default());
        let outcome = editor.apply(SalaryEdit::SetBaseSalary { amount: None });

        assert!(outcome.is_none());
        let contract = editor.into_contract();
        assert_eq!(contract.salary.base_salary, None);
        assert_eq!(contract.salary.salary_brut, Decimal::from(6_000));
        assert_eq!(contract.salary.salary_net, Decimal::from(6_000));
    }
}
