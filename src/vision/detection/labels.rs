// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class labels for YOLO models

/// The 80 COCO classes used by pretrained Ultralytics checkpoints
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Default label list (COCO)
pub fn coco_labels() -> Vec<String> {
    COCO_CLASSES.iter().map(|s| s.to_string()).collect()
}

/// Parse the `names` metadata entry written by Ultralytics ONNX exports.
///
/// The value is a Python dict literal such as `{0: 'person', 1: 'bicycle'}`.
/// Returns `None` when the string is not in that shape or the ids are not
/// contiguous from zero.
pub fn parse_names_metadata(raw: &str) -> Option<Vec<String>> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;

    let mut entries: Vec<(usize, String)> = Vec::new();
    let mut rest = body.trim();

    while !rest.is_empty() {
        let (id_part, after_colon) = rest.split_once(':')?;
        let id: usize = id_part.trim().parse().ok()?;

        let value = after_colon.trim_start();
        let quote = value.chars().next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let value = &value[1..];
        let end = value.find(quote)?;
        entries.push((id, value[..end].to_string()));

        rest = value[end + 1..].trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }

    if entries.is_empty() {
        return None;
    }

    entries.sort_by_key(|(id, _)| *id);
    if entries.iter().enumerate().any(|(i, (id, _))| i != *id) {
        return None;
    }

    Some(entries.into_iter().map(|(_, name)| name).collect())
}
