/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Letterbox preprocessing, inference, confidence filtering and NMS. Boxes
/// are mapped back to frame coordinates, clamped, and boxes smaller than
/// the minimum face size are dropped.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Gray used for letterbox padding (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    confidence: f64,
    min_size: u32,
    input_size: u32,
}

impl OnnxFaceDetector {
    /// Load a YOLO face ONNX model.
    ///
    /// The input resolution is read from the model's input shape (NCHW),
    /// falling back to 640 when the shape is dynamic.
    pub fn new(
        model_path: &Path,
        confidence: f64,
        min_size: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Loaded face model {} (input {}px, confidence {:.2}, min size {}px)",
            model_path.display(),
            input_size,
            confidence,
            min_size
        );

        Ok(Self {
            session,
            confidence,
            min_size,
            input_size,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected face model output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let lb = Letterbox {
            scale,
            pad_x: pad_x as f64,
            pad_y: pad_y as f64,
        };
        let mut raw = parse_detections(data, &shape, self.confidence, &lb);
        let kept = nms(&mut raw, NMS_IOU_THRESH);

        Ok(to_regions(&kept, frame.width(), frame.height(), self.min_size))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize into the padded area
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

struct Letterbox {
    scale: f64,
    pad_x: f64,
    pad_y: f64,
}

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

/// Decodes `[1, features, detections]` or `[1, detections, features]`
/// output rows of the form `[cx, cy, w, h, conf, ...]`.
fn parse_detections(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    lb: &Letterbox,
) -> Vec<RawDetection> {
    // Feature count is always the smaller axis
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Vec::new();
    }

    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data.get(idx).copied().unwrap_or(0.0) as f64
    };

    (0..num_dets)
        .filter_map(|i| {
            let conf = value(i, 4);
            if conf < confidence {
                return None;
            }
            let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
            Some(RawDetection {
                x1: ((cx - w / 2.0) - lb.pad_x) / lb.scale,
                y1: ((cy - h / 2.0) - lb.pad_y) / lb.scale,
                x2: ((cx + w / 2.0) - lb.pad_x) / lb.scale,
                y2: ((cy + h / 2.0) - lb.pad_y) / lb.scale,
                confidence: conf,
            })
        })
        .collect()
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<RawDetection> = Vec::new();
    for det in dets.iter() {
        if keep.iter().all(|k| bbox_iou(k, det) <= iou_thresh) {
            keep.push(det.clone());
        }
    }
    keep
}

fn bbox_iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

/// Clamp to the frame and drop anything below `min_size` on either side.
fn to_regions(dets: &[RawDetection], fw: u32, fh: u32, min_size: u32) -> Vec<Region> {
    dets.iter()
        .filter_map(|d| Region::from_corners(d.x1, d.y1, d.x2, d.y2).clamp_to(fw, fh))
        .filter(|r| r.width >= min_size as i32 && r.height >= min_size as i32)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    const IDENTITY: Letterbox = Letterbox {
        scale: 1.0,
        pad_x: 0.0,
        pad_y: 0.0,
    };

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 640: scale 3.2, new 640x320, pad_y 160
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 3, 0);
        let (tensor, scale, pad_x, pad_y) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(scale, 3.2, epsilon = 0.01);
        assert_eq!(pad_x, 0);
        assert_eq!(pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let frame = Frame::new(vec![255u8; 100 * 50 * 3], 100, 50, 3, 0);
        let (tensor, _, pad_x, pad_y) = letterbox(&frame, 640);

        let y = pad_y as usize + 1;
        let x = pad_x as usize + 1;
        assert_relative_eq!(tensor[[0, 0, y, x]], 1.0, epsilon = 0.01);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], PAD_VALUE, epsilon = 0.01);
    }

    /// Pads `rows` with zero-confidence rows so detections outnumber
    /// features, as in real model output.
    fn padded(rows: &[[f32; 5]]) -> Vec<[f32; 5]> {
        let mut out = rows.to_vec();
        out.resize(rows.len().max(8), [0.0; 5]);
        out
    }

    fn row_major(rows: &[[f32; 5]]) -> (Vec<f32>, Vec<usize>) {
        let rows = padded(rows);
        let data = rows.iter().flatten().copied().collect();
        (data, vec![1, rows.len(), 5])
    }

    fn transposed(rows: &[[f32; 5]]) -> (Vec<f32>, Vec<usize>) {
        let rows = padded(rows);
        let data = (0..5)
            .flat_map(|f| rows.iter().map(move |r| r[f]))
            .collect();
        (data, vec![1, 5, rows.len()])
    }

    #[test]
    fn test_parse_row_major_output() {
        let (data, shape) = row_major(&[
            [50.0, 50.0, 20.0, 20.0, 0.9],
            [10.0, 10.0, 4.0, 4.0, 0.1],
        ]);
        let dets = parse_detections(&data, &shape, 0.5, &IDENTITY);
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y2, 60.0);
    }

    #[test]
    fn test_parse_transposed_output() {
        let (data, shape) = transposed(&[
            [0.0, 0.0, 0.0, 0.0, 0.2],
            [100.0, 100.0, 40.0, 40.0, 0.8],
        ]);
        let dets = parse_detections(&data, &shape, 0.5, &IDENTITY);
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 80.0);
        assert_relative_eq!(dets[0].x2, 120.0);
    }

    #[test]
    fn test_parse_undoes_letterbox() {
        let lb = Letterbox {
            scale: 2.0,
            pad_x: 0.0,
            pad_y: 100.0,
        };
        let (data, shape) = transposed(&[[100.0, 200.0, 40.0, 40.0, 0.9]]);
        let dets = parse_detections(&data, &shape, 0.5, &lb);
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y1, 40.0);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let mut dets = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.8),
            det(5.0, 5.0, 105.0, 105.0, 0.9),
        ];
        let kept = nms(&mut dets, NMS_IOU_THRESH);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].confidence, 0.9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let mut dets = vec![
            det(0.0, 0.0, 50.0, 50.0, 0.9),
            det(200.0, 200.0, 250.0, 250.0, 0.8),
        ];
        assert_eq!(nms(&mut dets, NMS_IOU_THRESH).len(), 2);
    }

    #[test]
    fn test_nms_empty_input() {
        let mut dets: Vec<RawDetection> = Vec::new();
        assert!(nms(&mut dets, NMS_IOU_THRESH).is_empty());
    }

    #[test]
    fn test_bbox_iou_perfect() {
        let b = det(0.0, 0.0, 10.0, 10.0, 1.0);
        assert_relative_eq!(bbox_iou(&b, &b), 1.0);
    }

    #[test]
    fn test_to_regions_clamps_and_filters_small() {
        let dets = vec![
            det(-10.0, -10.0, 60.0, 60.0, 0.9), // clamped to 60x60
            det(100.0, 100.0, 120.0, 120.0, 0.9), // 20x20, too small
            det(500.0, 500.0, 600.0, 600.0, 0.9), // outside frame
        ];
        let regions = to_regions(&dets, 320, 240, 30);
        assert_eq!(regions, vec![Region::new(0, 0, 60, 60)]);
    }
}
