use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use vqa_generate::{BackendError, InferenceBackend, InferenceRequest, InferenceResponse};

pub fn write_jpeg(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = ImageBuffer::from_pixel(8, 8, Rgb([40u8, 120, 200]));
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// PNG bytes stored under a `.jpg` name, as happens in real uploads
pub fn write_png_named_jpg(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = ImageBuffer::from_pixel(8, 8, Rgba([200u8, 40, 40, 128]));
    DynamicImage::ImageRgba8(img)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// A `train630`-style tree with three numbered folders:
///
/// - `1`: vehicles, quality Excellent, counts 2 + 3
/// - `2`: vehicles, quality Good, counts 9 + 8 (primary image is a PNG)
/// - `3`: no vehicles, counts 40 + 40
///
/// plus a `notes` folder and a primary without partner in `1`.
pub fn sample_dataset() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("train630");

    write_jpeg(&root.join("1/00000001.jpg"));
    write_jpeg(&root.join("1/00000001 2.jpg"));
    write_jpeg(&root.join("1/00000005.jpg"));
    write_png_named_jpg(&root.join("2/00000002.jpg"));
    write_jpeg(&root.join("2/00000002 2.jpg"));
    write_jpeg(&root.join("3/00000003.jpg"));
    write_jpeg(&root.join("3/00000003 2.jpg"));
    write_jpeg(&root.join("notes/00000009.jpg"));
    write_jpeg(&root.join("notes/00000009 2.jpg"));

    let corpus = serde_json::json!([
        {
            "img1": "/data/upload/2/00000001.jpg",
            "Object_count": 2,
            "Object_type": {"choices": ["Vehicles"]},
            "Collaboration_who": "UAV-1",
            "Quality": "Excellent (5/5)"
        },
        {
            "img1": "/data/upload/2/00000001 2.jpg",
            "Object_count": "3",
            "Object_type": ["Vehicles"],
            "Collaboration_who": "UAV-2"
        },
        {
            "img1": "/data/upload/2/00000002.jpg",
            "Object_count": 9,
            "Object_type": {"choices": ["Vehicles", "Pedestrians"]},
            "PerceptionIssues": [{"rectanglelabels": ["Occlusion"]}],
            "Quality": "Good (4/5)"
        },
        {
            "img1": "/data/upload/2/00000002 2.jpg",
            "Object_count": 8,
            "Object_type": {"choices": ["Vehicles"]}
        },
        {
            "img1": "/data/upload/2/00000003.jpg",
            "Object_count": 40,
            "Object_type": {"choices": ["Buildings"]},
            "Quality": "Excellent (5/5)"
        },
        {
            "img1": "/data/upload/2/00000003 2.jpg",
            "Object_count": 40,
            "Object_type": {"choices": ["Buildings"]}
        },
        {
            "img1": "/data/upload/2/00000009.jpg",
            "Object_count": 99,
            "Object_type": {"choices": ["Vehicles"]},
            "Quality": "Excellent (5/5)"
        },
        {
            "img1": "/data/upload/2/00000009 2.jpg",
            "Object_count": 99,
            "Object_type": {"choices": ["Vehicles"]}
        },
        {"Object_count": 1},
        "not an object"
    ]);
    let annotations = temp.path().join("630-1.json");
    std::fs::write(&annotations, serde_json::to_string_pretty(&corpus).unwrap()).unwrap();

    (temp, annotations)
}

/// Replays scripted outcomes and keeps every request it receives
pub struct ScriptedBackend {
    script: RefCell<VecDeque<Result<InferenceResponse, BackendError>>>,
    pub requests: RefCell<Vec<InferenceRequest>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<InferenceResponse, BackendError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl InferenceBackend for ScriptedBackend {
    fn call(
        &self,
        request: &InferenceRequest,
        _timeout: Duration,
    ) -> Result<InferenceResponse, BackendError> {
        self.requests.borrow_mut().push(request.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Unavailable("script exhausted".to_string())))
    }
}

pub const SAMPLE_OUTPUT: &str = "**问题 1**： 两张图片中车辆总数是多少？
**选项**：
A. 3
B. 4
C. 5
D. 6
**正确答案**： C";
