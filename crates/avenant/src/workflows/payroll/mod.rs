//! Payroll impact of contract terms: gross/net derivation and the salary
//! draft reducer that keeps derived figures in sync with their inputs.

mod editor;
mod salary;

pub use editor::{ContractSalaryEditor, SalaryEdit};
pub use salary::{SalaryBreakdown, SalaryInputs, SalaryRecalculator, DEFAULT_CNSS_RATE};
