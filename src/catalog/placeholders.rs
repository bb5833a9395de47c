//! Placeholder images for products without photography.

pub(crate) const FALLBACK_CATEGORY: &str = "rings";

const FALLBACK_IMAGE: &str = "/assets/images/placeholder/ring-1.svg";

const RINGS: [&str; 3] = [
    FALLBACK_IMAGE,
    "/assets/images/placeholder/ring-2.svg",
    "/assets/images/placeholder/ring-3.svg",
];

const NECKLACES: [&str; 3] = [
    "/assets/images/placeholder/necklace-1.svg",
    "/assets/images/placeholder/necklace-2.svg",
    "/assets/images/placeholder/necklace-3.svg",
];

const EARRINGS: [&str; 2] = [
    "/assets/images/placeholder/earrings-1.svg",
    "/assets/images/placeholder/earrings-2.svg",
];

const BRACELETS: [&str; 2] = [
    "/assets/images/placeholder/bracelet-1.svg",
    "/assets/images/placeholder/bracelet-2.svg",
];

fn placeholders_for(category: &str) -> &'static [&'static str] {
    match category {
        "necklaces" => &NECKLACES,
        "earrings" => &EARRINGS,
        "bracelets" => &BRACELETS,
        _ => &RINGS,
    }
}

/// Placeholder for the `index`th image of a product in `category`.
///
/// Cycles through the category's placeholders; unknown categories use the ring placeholders.
pub fn placeholder_image(category: &str, index: usize) -> &'static str {
    let placeholders = placeholders_for(category);

    placeholders
        .get(index % placeholders.len())
        .copied()
        .unwrap_or(FALLBACK_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_category_placeholders() {
        assert_eq!(placeholder_image("earrings", 0), EARRINGS[0]);
        assert_eq!(placeholder_image("earrings", 1), EARRINGS[1]);
        assert_eq!(placeholder_image("earrings", 2), EARRINGS[0]);
    }

    #[test]
    fn unknown_category_uses_rings() {
        assert_eq!(placeholder_image("watches", 0), RINGS[0]);
        assert_eq!(placeholder_image(FALLBACK_CATEGORY, 4), RINGS[1]);
    }
}
