//! Generates small real PDFs for upload tests.

use anyhow::Result;
use printpdf::{
    BuiltinFont, Layer, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem, TextMatrix,
    TextRenderingMode,
};

/// Generates a simple, single-page PDF with the given text content.
///
/// Uses the builtin Helvetica font so the content stream stores the text as
/// literal WinAnsi bytes; a subsetted embedded font would store glyph IDs,
/// which the extractor under test does not decode.
pub fn generate_test_pdf(text: &str) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new("Test PDF");
    let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
    let layer_def = Layer::new("Layer 1");
    let layer_id = doc.add_layer(&layer_def);

    let ops = vec![
        Op::BeginLayer {
            layer_id: layer_id.clone(),
        },
        Op::SetFontSizeBuiltinFont {
            size: Pt(12.0),
            font: BuiltinFont::Helvetica,
        },
        Op::StartTextSection,
        Op::SetTextMatrix {
            matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
        },
        Op::SetTextRenderingMode {
            mode: TextRenderingMode::Fill,
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
        Op::EndLayer { layer_id },
    ];

    page.ops = ops;
    doc.pages.push(page);

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    Ok(bytes)
}
