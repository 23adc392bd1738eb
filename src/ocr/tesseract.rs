/// Tesseract OCR engine
///
/// Word-level detections through leptess. Each word box becomes a
/// [`Detection`] with an axis-aligned polygon and Tesseract's 0-100 mean
/// confidence rescaled to 0.0-1.0.
use image::GrayImage;
use leptess::{capi, LepTess, Variable};
use std::path::PathBuf;

use super::{Detection, OcrEngine, OcrRegion};
use crate::geometry::Quad;
use crate::masking::encode_png;

pub struct TesseractEngine {
    tess: LepTess,
}

impl TesseractEngine {
    /// Create a new Tesseract engine
    ///
    /// # Arguments
    /// * `tessdata` - Directory holding `eng.traineddata`; `None` uses the system install
    pub fn new(tessdata: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Initializing Tesseract OCR...");

        let data_path = tessdata.as_deref().and_then(|p| p.to_str());
        let mut tess = LepTess::new(data_path, "eng")
            .map_err(|e| format!("failed to initialize tesseract: {:?}", e))?;

        // PSM 11 = sparse text; scoreboards are cells, not paragraphs
        tess.set_variable(Variable::TesseditPagesegMode, "11")
            .map_err(|e| format!("failed to set page segmentation mode: {:?}", e))?;

        tracing::info!("✓ Tesseract OCR initialized");
        Ok(Self { tess })
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(
        &mut self,
        region: OcrRegion,
        image: &GrayImage,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        // PNG in memory; each engine hands its own buffer to leptonica
        let png = encode_png(image)?;
        self.tess
            .set_image_from_mem(&png)
            .map_err(|e| format!("failed to load image into tesseract: {:?}", e))?;

        let boxes = match self
            .tess
            .get_component_boxes(capi::TessPageIteratorLevel_RIL_WORD, true)
        {
            Some(boxes) => boxes,
            None => return Ok(Vec::new()),
        };

        let mut detections = Vec::new();
        for b in &boxes {
            self.tess.set_rectangle(&b);
            let text = self.tess.get_utf8_text()?.trim().to_string();
            if text.is_empty() {
                continue;
            }

            let geometry = b.get_geometry();
            let confidence = self.tess.mean_text_conf() as f32 / 100.0;
            let polygon = Quad::from_box(
                geometry.x as f32,
                geometry.y as f32,
                geometry.w as f32,
                geometry.h as f32,
            );

            tracing::debug!("[ocr-word] {:?} {:.2} '{}'", region, confidence, text);
            detections.push(Detection::new(polygon, text, confidence));
        }

        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "TesseractEngine"
    }
}
