//! Property tests for bounding box geometry

use proptest::prelude::*;
use smartcap_core::BBox;

fn bbox_strategy() -> impl Strategy<Value = BBox> {
    (0.0f32..1000.0, 0.0f32..1000.0, 0.0f32..300.0, 0.0f32..300.0)
        .prop_map(|(x, y, w, h)| BBox::new(x, y, x + w, y + h))
}

proptest! {
    #[test]
    fn iou_is_bounded(a in bbox_strategy(), b in bbox_strategy()) {
        let iou = a.iou(&b);
        prop_assert!(iou >= 0.0);
        prop_assert!(iou <= 1.0);
    }

    #[test]
    fn iou_is_symmetric(a in bbox_strategy(), b in bbox_strategy()) {
        prop_assert!((a.iou(&b) - b.iou(&a)).abs() < 1e-5);
    }

    #[test]
    fn iou_never_nan(x1 in -1e6f32..1e6, y1 in -1e6f32..1e6, x2 in -1e6f32..1e6, y2 in -1e6f32..1e6) {
        let a = BBox::new(x1, y1, x2, y2);
        let b = BBox::new(0.0, 0.0, 100.0, 100.0);
        prop_assert!(a.iou(&b).is_finite());
    }

    #[test]
    fn shifted_box_overlaps_less(a in bbox_strategy(), dx in 1.0f32..50.0) {
        prop_assume!(a.area() > 1.0);
        let shifted = BBox::new(a.x1 + dx, a.y1, a.x2 + dx, a.y2);
        prop_assert!(a.iou(&shifted) <= 1.0);
        prop_assert!(a.iou(&shifted) < a.iou(&a) + 1e-6);
    }
}
