use chrono::Utc;
use serde_json::Value;

use super::domain::{Amendment, DocumentRef};
use crate::workflows::contracts::domain::Contract;

/// Renders the printable amendment document.
pub trait DocumentStore: Send + Sync {
    fn generate(
        &self,
        amendment: &Amendment,
        contract: &Contract,
    ) -> Result<GeneratedDocument, DocumentError>;
}

/// Rendered bytes plus the reference persisted on the amendment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub reference: DocumentRef,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("document service unavailable: {0}")]
    Unavailable(String),
    #[error("document rendering failed: {0}")]
    Rendering(String),
}

/// Single-page PDF summary: header, motive, and the before/after table as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryPdfStore;

impl DocumentStore for SummaryPdfStore {
    fn generate(
        &self,
        amendment: &Amendment,
        contract: &Contract,
    ) -> Result<GeneratedDocument, DocumentError> {
        if amendment.contract_id != contract.id {
            return Err(DocumentError::Rendering(format!(
                "amendment {} belongs to contract {}, not {}",
                amendment.id, amendment.contract_id, contract.id
            )));
        }

        let bytes = render_summary_pdf(&summary_lines(amendment, contract));
        let reference = DocumentRef {
            file_name: format!("avenant-{}-{}.pdf", contract.id, amendment.numero),
            content_type: mime::APPLICATION_PDF.to_string(),
            size_bytes: bytes.len(),
            generated_at: Utc::now(),
        };

        Ok(GeneratedDocument { reference, bytes })
    }
}

fn summary_lines(amendment: &Amendment, contract: &Contract) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Avenant no {} au contrat {}",
            amendment.numero, amendment.contract_id
        ),
        format!("Salarie: {}", contract.employee_id),
        format!("Date d'effet: {}", amendment.effective_date.format("%d/%m/%Y")),
        format!("Type de modification: {}", amendment.type_modification()),
        format!("Statut: {}", amendment.status),
        String::new(),
        format!("Objet: {}", amendment.subject),
        format!("Motif: {}", amendment.reason),
        format!("Justification: {}", amendment.justification),
        String::new(),
        "Avant:".to_string(),
    ];
    lines.extend(field_lines(&amendment.changes.before_value()));
    lines.push("Apres:".to_string());
    lines.extend(field_lines(&amendment.changes.after_value()));

    if let Some(notes) = &amendment.notes {
        lines.push(String::new());
        lines.push(format!("Notes: {notes}"));
    }

    lines.push(String::new());
    lines.push(format!(
        "Validation manager requise: {}",
        yes_no(amendment.manager_required)
    ));
    lines.push(format!(
        "Validation RH requise: {}",
        yes_no(amendment.rh_required)
    ));
    lines
}

fn field_lines(snapshot: &Value) -> Vec<String> {
    match snapshot.as_object() {
        Some(fields) if !fields.is_empty() => fields
            .iter()
            .map(|(name, value)| match value {
                Value::String(text) => format!("  {name}: {text}"),
                other => format!("  {name}: {other}"),
            })
            .collect(),
        _ => vec!["  -".to_string()],
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "oui"
    } else {
        "non"
    }
}

/// Lay out `lines` on one A4 page with the standard Helvetica font.
pub fn render_summary_pdf(lines: &[String]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 11 Tf\n14 TL\n50 800 Td\n");
    for line in lines {
        content.push('(');
        content.push_str(&escape_text(line));
        content.push_str(") Tj T*\n");
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", index + 1, body));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    pdf.into_bytes()
}

// Base-14 fonts only cover Latin-1 reliably; fold accents and drop the rest.
fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            'à' | 'â' | 'ä' => escaped.push('a'),
            'é' | 'è' | 'ê' | 'ë' => escaped.push('e'),
            'î' | 'ï' => escaped.push('i'),
            'ô' | 'ö' => escaped.push('o'),
            'ù' | 'û' | 'ü' => escaped.push('u'),
            'ç' => escaped.push('c'),
            'À' | 'Â' => escaped.push('A'),
            'É' | 'È' | 'Ê' => escaped.push('E'),
            'Ç' => escaped.push('C'),
            ' '..='~' => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_has_header_xref_and_trailer() {
        let bytes = render_summary_pdf(&["Avenant no 1".to_string()]);
        let text = String::from_utf8(bytes).expect("ascii output");

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("(Avenant no 1) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));

        let startxref = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|offset| offset.parse::<usize>().ok())
            .expect("startxref offset");
        assert!(text[startxref..].starts_with("xref\n0 6\n"));
    }

    #[test]
    fn escapes_delimiters_and_folds_accents() {
        assert_eq!(escape_text("Prime (été)"), "Prime \\(ete\\)");
        assert_eq!(escape_text("a\\b"), "a\\\\b");
        assert_eq!(escape_text("€"), "?");
    }

    #[test]
    fn object_offsets_point_at_objects() {
        let text = String::from_utf8(render_summary_pdf(&[])).expect("ascii output");
        let xref = text.find("xref\n").expect("xref table");
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take(5)
            .map(|line| line[..10].parse().expect("offset"))
            .collect();

        for (index, offset) in entries.into_iter().enumerate() {
            assert!(text[offset..].starts_with(&format!("{} 0 obj", index + 1)));
        }
    }
}
