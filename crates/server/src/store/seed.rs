//! Sample catalog written at startup.

use catalog_core::{NewProduct, Price};

const SEED: [(&str, i64, &str, &str); 10] = [
    (
        "iPhone 14 Pro Max",
        1099,
        "space-black",
        "6.7-inch Super Retina XDR display, A16 Bionic chip, pro camera system.",
    ),
    (
        "iPhone SE (3rd generation)",
        429,
        "black",
        "Compact design with A15 Bionic, great value for everyday use.",
    ),
    (
        "MacBook Pro 14-inch (M2 Pro)",
        1999,
        "silver",
        "Powerful M2 Pro chip, Liquid Retina XDR display, up to 18-hour battery life.",
    ),
    (
        "MacBook Air 13-inch (M2)",
        1199,
        "midnight",
        "Thin and light with M2 chip, silent fanless design and great battery life.",
    ),
    (
        "iPad Pro 11-inch (M4)",
        799,
        "silver",
        "M4 chip, Liquid Retina display with ProMotion, powerful for creative work.",
    ),
    (
        "Apple Watch Series 9",
        399,
        "starlight",
        "Faster S9 chip, more accurate sensors, and brighter display.",
    ),
    (
        "AirPods Pro (2nd generation)",
        249,
        "white",
        "Active Noise Cancellation, improved audio quality and longer battery.",
    ),
    (
        "HomePod (2nd generation)",
        299,
        "white",
        "High-fidelity audio with computational audio and Siri smart home control.",
    ),
    (
        "iPhone 13",
        699,
        "blue",
        "A great all-rounder with excellent battery life and dual-camera system.",
    ),
    (
        "iPad (10th generation)",
        449,
        "pink",
        "Updated design, larger display, and capable for school and home use.",
    ),
];

/// The fixed sample catalog, without identifiers.
#[must_use]
pub fn seed_catalog() -> Vec<NewProduct> {
    SEED.iter()
        .map(|&(name, price, color, description)| NewProduct {
            name: name.to_string(),
            price: Price::from_units(price),
            color: color.to_string(),
            description: Some(description.to_string()),
            image_url: None,
        })
        .collect()
}
