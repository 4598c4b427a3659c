use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct `#rrggbb` colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → colour
// ---------------------------------------------------------------------------

/// Maps the categories of a bar chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, String>,
    default_color: String,
}

impl ColorMap {
    /// Assign colours to `labels` in the order given; repeats keep their first colour.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ordered: Vec<&str> = Vec::new();
        for label in labels {
            if !ordered.contains(&label) {
                ordered.push(label);
            }
        }
        let palette = generate_palette(ordered.len());
        let mapping = ordered
            .into_iter()
            .map(str::to_string)
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: "#808080".to_string(),
        }
    }

    /// Look up the colour for a category label.
    pub fn color_for(&self, label: &str) -> &str {
        self.mapping
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_palette_is_distinct_hex() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for c in &colors {
            assert_eq!(c.len(), 7);
            assert!(c.starts_with('#'));
        }
        let unique: BTreeSet<&String> = colors.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_color_map_lookup() {
        let map = ColorMap::new(["Asia", "Europe", "Asia"]);
        assert_ne!(map.color_for("Asia"), map.color_for("Europe"));
        assert_eq!(map.color_for("Oceania"), "#808080");
    }
}
