//! Single-shape trials from before item lists existed.

use crate::params::{RawItem, TrialParams};

/// Turns trial-level `kind`/`size`/`gray`/`color` into one raw item.
///
/// `size` is the overall extent: a diameter for round shapes, a side or
/// length otherwise. Degree sizes map the same way and are converted later.
pub fn legacy_items(params: &TrialParams) -> Vec<RawItem> {
    let legacy = &params.legacy;
    let mut item = RawItem {
        kind: legacy.kind.clone(),
        gray: legacy.gray,
        color: legacy.color.clone(),
        ..RawItem::default()
    };

    let kind = legacy
        .kind
        .as_deref()
        .map(|k| k.trim().to_ascii_lowercase().replace(['_', '-'], ""))
        .unwrap_or_default();
    for (size, deg) in [(legacy.size, false), (legacy.size_deg, true)] {
        let Some(size) = size else { continue };
        let set = |px: &mut Option<f64>, deg_field: &mut Option<f64>, v: f64| {
            if deg { *deg_field = Some(v) } else { *px = Some(v) }
        };
        let it = &mut item;
        match kind.as_str() {
            "annulus" | "ring" => {
                set(&mut it.outer_radius, &mut it.outer_radius_deg, size / 2.0);
                set(&mut it.inner_radius, &mut it.inner_radius_deg, size / 4.0);
            }
            "rect" | "rectangle" | "square" | "outline" | "rectoutline" | "texture" | "grating"
            | "gabor" | "noise" => {
                set(&mut it.width, &mut it.width_deg, size);
                set(&mut it.height, &mut it.height_deg, size);
            }
            "triangle" => set(&mut it.edge, &mut it.edge_deg, size),
            "bar" | "line" | "stripe" => {
                set(&mut it.length, &mut it.length_deg, size);
                set(&mut it.width, &mut it.width_deg, size / 10.0);
            }
            "cross" | "plus" | "fixation" => {
                set(&mut it.arm_length, &mut it.arm_length_deg, size / 2.0);
                set(&mut it.arm_width, &mut it.arm_width_deg, size / 8.0);
            }
            _ => set(&mut it.radius, &mut it.radius_deg, size / 2.0),
        }
    }
    vec![item]
}
