use crate::infra::{
    parse_amount, parse_date, parse_prime, InMemoryAdvanceRepository,
    InMemoryAmendmentRepository, InMemoryContractDirectory,
};
use avenant::error::AppError;
use avenant::workflows::advances::{
    AdvanceError, AdvanceKind, AdvanceService, AdvanceSubmission, PayPeriod,
};
use avenant::workflows::amendments::{
    AmendmentDraft, AmendmentError, AmendmentService, ModificationCategory, ProposedChange,
    SalarySnapshot, SignedDocumentUpload, SummaryPdfStore,
};
use avenant::workflows::contracts::{ContractDirectory, ContractId, EmployeeId};
use avenant::workflows::payroll::{
    ContractSalaryEditor, SalaryBreakdown, SalaryEdit, SalaryInputs, SalaryRecalculator,
};
use avenant::workflows::RepositoryError;
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SalaryArgs {
    /// Monthly base salary
    #[arg(long, value_parser = parse_amount)]
    pub(crate) base: Decimal,
    /// Prime added to gross salary, as name=amount (repeatable)
    #[arg(long = "prime", value_parser = parse_prime)]
    pub(crate) primes: Vec<(String, Decimal)>,
    /// Apply the CNSS employee deduction
    #[arg(long)]
    pub(crate) cnss: bool,
    /// Override the CNSS rate (defaults to 0.0448)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) rate: Option<Decimal>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Yearly advance cap used by the advance walkthrough
    #[arg(long, default_value_t = 3)]
    pub(crate) max_advances: u32,
    /// Skip the salary advance portion of the demo.
    #[arg(long)]
    pub(crate) skip_advances: bool,
}

pub(crate) fn run_salary_breakdown(args: SalaryArgs) -> Result<(), AppError> {
    let recalculator = args
        .rate
        .map(SalaryRecalculator::new)
        .unwrap_or_default();
    let inputs = SalaryInputs {
        base_salary: Some(args.base),
        primes: args.primes.into_iter().collect(),
        cnss_affiliation: args.cnss,
    };

    match recalculator.recalculate(&inputs) {
        Some(breakdown) => render_breakdown(&breakdown, recalculator.deduction_rate()),
        None => println!("Base salary must be greater than zero; nothing to compute."),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        max_advances,
        skip_advances,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Avenant workflow demo ({today})");

    let directory = Arc::new(InMemoryContractDirectory::seeded());
    let recalculator = SalaryRecalculator::default();
    let contract_id = ContractId("ctr-001".to_string());
    let contract = directory
        .contract(&contract_id)
        .map_err(AmendmentError::from)?
        .ok_or_else(|| AmendmentError::ContractNotFound(contract_id.clone()))?;

    println!(
        "\nContract {} ({}): gross {} {} / net {} {}",
        contract.id,
        contract.job.poste,
        contract.salary.salary_brut,
        contract.salary.currency,
        contract.salary.salary_net,
        contract.salary.currency
    );

    let mut editor = ContractSalaryEditor::new(contract.clone(), recalculator);
    editor.apply_all([
        SalaryEdit::SetPrime {
            name: "transport".to_string(),
            amount: Decimal::from(500),
        },
        SalaryEdit::SetCnssAffiliation { affiliated: true },
    ]);
    println!("Draft edit: add a transport prime and enable CNSS");
    match editor.last_breakdown() {
        Some(breakdown) => render_breakdown(&breakdown, recalculator.deduction_rate()),
        None => println!("  (no breakdown: base salary missing)"),
    }

    let amendments = AmendmentService::new(
        directory,
        Arc::new(InMemoryAmendmentRepository::default()),
        Arc::new(SummaryPdfStore),
    );

    let draft = AmendmentDraft {
        contract_id: contract_id.clone(),
        effective_date: today,
        subject: "Revalorisation salariale annuelle".to_string(),
        reason: "Promotion au poste de comptable principal".to_string(),
        justification: "Evaluation annuelle excellente et perimetre elargi".to_string(),
        type_modification: ModificationCategory::Salary,
        changes: ProposedChange::Salary(SalarySnapshot {
            salary_brut: Some(Decimal::from(9_000)),
            salary_net: Some(Decimal::from(9_000)),
            currency: Some(contract.salary.currency.clone()),
            payment_method: Some(contract.salary.payment_method),
        }),
        manager_required: true,
        rh_required: true,
        notes: None,
    };

    println!("\nAmendment lifecycle");
    let amendment = amendments.create(draft, Some("demo".to_string()))?;
    println!(
        "  avenant n°{} created as {} (category {})",
        amendment.numero,
        amendment.status,
        amendment.type_modification()
    );
    println!("    before: {}", amendment.changes.before_value());
    println!("    after:  {}", amendment.changes.after_value());

    let submitted = amendments.submit(&amendment.id)?;
    println!("  submitted -> {}", submitted.status);
    let validated = amendments.validate(&amendment.id)?;
    println!("  validated -> {}", validated.status);

    let (generated, document) = amendments.generate_document(&amendment.id)?;
    println!(
        "  generated -> {} ({} bytes, {})",
        generated.status, document.reference.size_bytes, document.reference.file_name
    );

    let signed = amendments.attach_signed(
        &amendment.id,
        SignedDocumentUpload {
            url: format!("https://files.invalid/{}", document.reference.file_name),
            name: document.reference.file_name.clone(),
        },
    )?;
    println!("  signed -> {}", signed.status);

    if let Err(err) = amendments.delete(&amendment.id) {
        println!("  delete refused: {err}");
    }

    println!("\nRegister export");
    print!("{}", amendments.export_register(&contract_id)?);

    if !skip_advances {
        run_advance_walkthrough(today, max_advances)?;
    }

    Ok(())
}

fn run_advance_walkthrough(today: NaiveDate, max_advances: u32) -> Result<(), AppError> {
    let service = AdvanceService::new(
        Arc::new(InMemoryAdvanceRepository::default()),
        Some(max_advances),
    );
    let employee = EmployeeId("emp-002".to_string());
    let period = PayPeriod {
        month: u8::try_from(today.month()).unwrap_or(1),
        year: today.year(),
    };

    println!("\nSalary advances (cap {max_advances} per year)");
    for attempt in 1..=max_advances.saturating_add(1) {
        let submission = AdvanceSubmission {
            employee_id: employee.clone(),
            kind: if attempt % 2 == 0 {
                AdvanceKind::Acompte
            } else {
                AdvanceKind::Avance
            },
            amount: Decimal::from(500),
            request_date: today,
            period,
        };

        match service.create(submission) {
            Ok(request) => println!(
                "  request {attempt}: {} {} ({})",
                request.kind.label(),
                request.id,
                request.status
            ),
            Err(err @ AdvanceError::QuotaExceeded { .. }) => {
                println!("  request {attempt}: rejected, {err}")
            }
            Err(AdvanceError::Repository(RepositoryError::Unavailable(reason))) => {
                println!("  request {attempt}: storage unavailable ({reason})");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let eligibility = service.eligibility(&employee, today);
    println!(
        "  eligibility: count {:?}, remaining {:?}, reached max {}",
        eligibility.count, eligibility.remaining, eligibility.reached_max
    );
    Ok(())
}

fn render_breakdown(breakdown: &SalaryBreakdown, rate: Decimal) {
    println!("  gross:     {}", breakdown.gross);
    println!("  deduction: {} (rate {})", breakdown.deduction, rate);
    println!("  net:       {}", breakdown.net);
}
