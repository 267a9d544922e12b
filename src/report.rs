//! "Comprehensive Medical Report" PDF for the last prediction run.

use std::io::BufWriter;

use printpdf::*;
use thiserror::Error;

use crate::prediction::PredictionReport;

pub const REPORT_TITLE: &str = "Comprehensive Medical Report";
pub const REPORT_FILENAME: &str = "medical_report.pdf";

const DISCLAIMER: &str = "This report is based on preliminary health assessments and may \
                          require further clinical evaluation.";

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP: Mm = Mm(280.0);
const BOTTOM: Mm = Mm(20.0);
const LEFT: Mm = Mm(20.0);
const INDENT: Mm = Mm(25.0);

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// Writes lines top-down, starting a new A4 page when the bottom is reached.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl<'a> PageCursor<'a> {
    fn line(&mut self, text: &str, size: f32, x: Mm, font: &IndirectFontRef, advance: Mm) {
        if self.y < BOTTOM {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
        self.layer.use_text(text, size, x, self.y, font);
        self.y -= advance;
    }

    fn gap(&mut self, space: Mm) {
        self.y -= space;
    }
}

/// Render the report as PDF bytes.
pub fn render_report_pdf(report: &PredictionReport) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(REPORT_TITLE, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Font(e.to_string()))?;

    let mut cursor = PageCursor {
        doc: &doc,
        layer: doc.get_page(page1).get_layer(layer1),
        y: TOP,
    };

    // Title, centred by eye on A4
    cursor.line(REPORT_TITLE, 16.0, Mm(55.0), &bold, Mm(14.0));

    let patient = &report.patient;
    cursor.line(&format!("Name: {}", patient.name), 12.0, LEFT, &font, Mm(7.0));
    let age = patient.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
    cursor.line(&format!("Age: {age}"), 12.0, LEFT, &font, Mm(7.0));
    let sex = patient.sex.as_deref().unwrap_or("-");
    cursor.line(&format!("Sex: {sex}"), 12.0, LEFT, &font, Mm(7.0));
    cursor.gap(Mm(5.0));

    for assessment in &report.assessments {
        let heading = format!("{} Assessment:", assessment.disease.display_name());
        cursor.line(&heading, 12.0, LEFT, &bold, Mm(7.0));

        for line in wrap_text(&format!("Verdict: {}", assessment.verdict), 85) {
            cursor.line(&line, 11.0, INDENT, &font, Mm(5.5));
        }
        cursor.line(&format!("Risk: {}", assessment.risk_line()), 11.0, INDENT, &font, Mm(5.5));
        let suggestion = format!("Treatment Suggestion: {}", assessment.treatment_suggestion);
        for line in wrap_text(&suggestion, 85) {
            cursor.line(&line, 11.0, INDENT, &font, Mm(5.5));
        }
        cursor.gap(Mm(5.0));
    }

    cursor.gap(Mm(5.0));
    for line in wrap_text(DISCLAIMER, 95) {
        cursor.line(&line, 10.0, LEFT, &italic, Mm(5.0));
    }
    cursor.line(
        &format!("Generated: {}", report.generated_at),
        8.0,
        LEFT,
        &font,
        Mm(4.0),
    );

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ReportError::Save(e.to_string()))
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Disease;
    use crate::prediction::{DiseaseAssessment, PatientSummary, RiskBand};

    fn sample_report(suggestion: &str) -> PredictionReport {
        PredictionReport {
            patient: PatientSummary {
                id: 1,
                name: "Grace Hopper".into(),
                age: Some(60),
                sex: Some("Female".into()),
            },
            assessments: Disease::ALL
                .iter()
                .map(|&disease| DiseaseAssessment {
                    disease,
                    prediction: 0,
                    verdict: disease.verdict(false).into(),
                    probability: 0.12,
                    risk_band: RiskBand::Low,
                    treatment_suggestion: suggestion.into(),
                })
                .collect(),
            generated_at: "2024-05-01 10:00:00".into(),
        }
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render_report_pdf(&sample_report("No further testing is needed.")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_suggestions_spill_onto_new_page() {
        let long = "Further testing is advised. ".repeat(200);
        let bytes = render_report_pdf(&sample_report(&long)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("one two three four five six", 9);
        assert_eq!(lines, vec!["one two", "three", "four five", "six"]);
        assert!(lines.iter().all(|l| l.len() <= 9));
    }

    #[test]
    fn wrap_empty_yields_single_blank() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
