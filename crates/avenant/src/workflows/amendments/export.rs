use super::domain::Amendment;

const HEADER: [&str; 9] = [
    "numero",
    "effective_date",
    "type_modification",
    "status",
    "subject",
    "before",
    "after",
    "manager_required",
    "rh_required",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("register buffer could not be flushed: {0}")]
    Buffer(String),
    #[error("register is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Write the amendment register as CSV, one row per amendment in the order given.
pub fn write_register(amendments: &[Amendment]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for amendment in amendments {
        let numero = amendment.numero.to_string();
        let effective_date = amendment.effective_date.format("%Y-%m-%d").to_string();
        let before = amendment.changes.before_value().to_string();
        let after = amendment.changes.after_value().to_string();

        writer.write_record([
            numero.as_str(),
            effective_date.as_str(),
            amendment.type_modification().label(),
            amendment.status.label(),
            amendment.subject.as_str(),
            before.as_str(),
            after.as_str(),
            bool_label(amendment.manager_required),
            bool_label(amendment.rh_required),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn bool_label(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::amendments::domain::{
        AmendmentId, AmendmentStatus, CategoryChange, ChangeSet, SalarySnapshot,
    };
    use crate::workflows::contracts::domain::ContractId;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn amendment(numero: u32, subject: &str) -> Amendment {
        let now = Utc::now();
        Amendment {
            id: AmendmentId(format!("avn-test-{numero}")),
            contract_id: ContractId("ctr-1".to_string()),
            numero,
            effective_date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
            subject: subject.to_string(),
            reason: "Alignement sur la grille salariale".to_string(),
            justification: "Nouvelles responsabilites confiees".to_string(),
            changes: ChangeSet::Salary(CategoryChange {
                before: SalarySnapshot {
                    salary_brut: Some(Decimal::from(8_000)),
                    ..SalarySnapshot::default()
                },
                after: SalarySnapshot {
                    salary_brut: Some(Decimal::from(9_000)),
                    ..SalarySnapshot::default()
                },
            }),
            manager_required: true,
            rh_required: false,
            notes: None,
            status: AmendmentStatus::Validated,
            created_by: None,
            created_at: now,
            updated_at: now,
            generated_document: None,
            signed_document: None,
            amends: None,
        }
    }

    #[test]
    fn register_has_header_and_one_row_per_amendment() {
        let register = write_register(&[
            amendment(1, "Revalorisation, annuelle"),
            amendment(2, "Prime exceptionnelle"),
        ])
        .expect("register written");

        let mut lines = register.lines();
        assert_eq!(
            lines.next(),
            Some("numero,effective_date,type_modification,status,subject,before,after,manager_required,rh_required")
        );

        let mut reader = csv::Reader::from_reader(register.as_bytes());
        let rows: Vec<csv::StringRecord> = reader
            .records()
            .collect::<Result<_, _>>()
            .expect("rows parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][2], "salary");
        assert_eq!(&rows[0][4], "Revalorisation, annuelle");
        assert_eq!(&rows[0][5], r#"{"salary_brut":"8000"}"#);
        assert_eq!(&rows[1][7], "true");
    }

    #[test]
    fn empty_register_still_has_header() {
        let register = write_register(&[]).expect("register written");
        assert_eq!(register.lines().count(), 1);
    }
}
