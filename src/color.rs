use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::GroupId;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.65, 0.55).into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: primary id → Color32
// ---------------------------------------------------------------------------

/// One colour per primary id, so rows and bars of the same institution match.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<GroupId, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a GroupId>) -> Self {
        let ids: Vec<&GroupId> = ids.into_iter().collect();
        let mapping = ids
            .iter()
            .zip(generate_palette(ids.len()))
            .map(|(id, c)| ((*id).clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, id: &GroupId) -> Color32 {
        self.mapping.get(id).copied().unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }

    #[test]
    fn distinct_ids_get_distinct_colours() {
        let ids = [GroupId::Integer(1), GroupId::Integer(2), GroupId::from("X")];
        let map = ColorMap::new(&ids);
        assert_ne!(map.color_for(&ids[0]), map.color_for(&ids[1]));
        assert_ne!(map.color_for(&ids[1]), map.color_for(&ids[2]));
        assert_eq!(map.color_for(&GroupId::Integer(42)), Color32::GRAY);
    }
}
